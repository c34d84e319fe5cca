use crate::helpers::{api_get, body_json, spawn_app, MockMetobs};
use axum::http::StatusCode;
use metobs_gateway::{
    metobs::{
        ObservationResponse, ObservationStation, ObservationValue, StationSetEntry,
        StationSetResponse,
    },
    Period, AIR_TEMPERATURE, WIND_GUST,
};
use serde_json::json;
use tower::ServiceExt;

// 2023-11-14T22:13:20Z
const TS_NEW: i64 = 1_700_000_000_000;
// 2023-11-14T21:13:20Z
const TS_OLD: i64 = 1_699_996_400_000;

fn reading(date: i64, value: &str) -> ObservationValue {
    ObservationValue {
        date,
        value: Some(value.to_owned()),
        quality: Some("G".to_owned()),
    }
}

fn station_set(key: &str, name: &str, readings: Vec<ObservationValue>) -> StationSetResponse {
    StationSetResponse {
        station: vec![StationSetEntry {
            key: key.to_owned(),
            name: name.to_owned(),
            value: Some(readings),
        }],
    }
}

fn station_series(key: &str, name: &str, readings: Vec<ObservationValue>) -> ObservationResponse {
    ObservationResponse {
        station: ObservationStation {
            key: key.to_owned(),
            name: name.to_owned(),
        },
        value: Some(readings),
    }
}

#[tokio::test]
async fn latest_observations_return_one_merged_point_per_station() {
    let mut metobs = MockMetobs::new();
    metobs
        .expect_latest_observations()
        .withf(|parameter, period| {
            *parameter == AIR_TEMPERATURE && *period == Period::LatestHour
        })
        .returning(|_, _| {
            Ok(station_set(
                "1",
                "Stockholm",
                vec![reading(TS_OLD, "15.0"), reading(TS_NEW, "20.5")],
            ))
        });
    metobs
        .expect_latest_observations()
        .withf(|parameter, period| *parameter == WIND_GUST && *period == Period::LatestHour)
        .returning(|_, _| {
            Ok(station_set(
                "1",
                "Stockholm",
                vec![reading(TS_OLD, "5.0"), reading(TS_NEW, "8.3")],
            ))
        });

    let app = spawn_app(metobs);
    let response = app.oneshot(api_get("/api/stationObservations")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(
        body,
        json!([{
            "stationId": "1",
            "name": "Stockholm",
            "observations": [{
                "timestampUtc": "2023-11-14T22:13:20Z",
                "windGust": 8.3,
                "airTemp": 20.5
            }]
        }])
    );
}

#[tokio::test]
async fn latest_observations_serialize_missing_parameters_as_null() {
    let mut metobs = MockMetobs::new();
    metobs
        .expect_latest_observations()
        .withf(|parameter, _| *parameter == AIR_TEMPERATURE)
        .returning(|_, _| Ok(station_set("1", "Stockholm", vec![reading(TS_NEW, "20.5")])));
    metobs
        .expect_latest_observations()
        .withf(|parameter, _| *parameter == WIND_GUST)
        .returning(|_, _| Ok(StationSetResponse::default()));

    let app = spawn_app(metobs);
    let response = app.oneshot(api_get("/api/stationObservations")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(body[0]["observations"][0]["windGust"], json!(null));
    assert_eq!(body[0]["observations"][0]["airTemp"], json!(20.5));
}

#[tokio::test]
async fn station_observations_return_the_full_series_newest_first() {
    let mut metobs = MockMetobs::new();
    metobs
        .expect_station_observations()
        .withf(|parameter, station_id, period| {
            *parameter == AIR_TEMPERATURE && station_id == "1" && *period == Period::LatestHour
        })
        .returning(|_, _, _| {
            Ok(Some(station_series(
                "1",
                "Stockholm",
                vec![reading(TS_OLD, "18.0"), reading(TS_NEW, "20.5")],
            )))
        });
    metobs
        .expect_station_observations()
        .withf(|parameter, station_id, period| {
            *parameter == WIND_GUST && station_id == "1" && *period == Period::LatestHour
        })
        .returning(|_, _, _| {
            Ok(Some(station_series(
                "1",
                "Stockholm",
                vec![reading(TS_OLD, "5.0")],
            )))
        });

    let app = spawn_app(metobs);
    let response = app
        .oneshot(api_get("/api/stationObservations/1?range=lastHour"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = body_json(response).await;
    assert_eq!(
        body,
        json!({
            "stationId": "1",
            "name": "Stockholm",
            "observations": [
                {
                    "timestampUtc": "2023-11-14T22:13:20Z",
                    "windGust": null,
                    "airTemp": 20.5
                },
                {
                    "timestampUtc": "2023-11-14T21:13:20Z",
                    "windGust": 5.0,
                    "airTemp": 18.0
                }
            ]
        })
    );
}

#[tokio::test]
async fn unknown_station_is_not_found() {
    let mut metobs = MockMetobs::new();
    metobs
        .expect_station_observations()
        .returning(|_, _, _| Ok(None));

    let app = spawn_app(metobs);
    let response = app
        .oneshot(api_get("/api/stationObservations/999"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn last_day_range_selects_the_latest_day_period() {
    let mut metobs = MockMetobs::new();
    metobs
        .expect_station_observations()
        .withf(|parameter, station_id, period| {
            *parameter == AIR_TEMPERATURE && station_id == "1" && *period == Period::LatestDay
        })
        .times(1)
        .returning(|_, _, _| {
            Ok(Some(station_series(
                "1",
                "Stockholm",
                vec![reading(TS_NEW, "20.5")],
            )))
        });
    metobs
        .expect_station_observations()
        .withf(|parameter, station_id, period| {
            *parameter == WIND_GUST && station_id == "1" && *period == Period::LatestDay
        })
        .times(1)
        .returning(|_, _, _| Ok(None));

    let app = spawn_app(metobs);
    let response = app
        .oneshot(api_get("/api/stationObservations/1?range=lastDay"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn unrecognized_range_falls_back_to_the_latest_hour() {
    let mut metobs = MockMetobs::new();
    metobs
        .expect_station_observations()
        .withf(|_, _, period| *period == Period::LatestHour)
        .times(2)
        .returning(|_, _, _| {
            Ok(Some(station_series(
                "1",
                "Stockholm",
                vec![reading(TS_NEW, "20.5")],
            )))
        });

    let app = spawn_app(metobs);
    let response = app
        .oneshot(api_get("/api/stationObservations/1?range=sometimes"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}
