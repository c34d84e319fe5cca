use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use log::error;
use serde::Deserialize;
use std::sync::Arc;

use crate::{
    service::{self, LogMismatchSink},
    AppState, StationObservations,
};

const DEFAULT_RANGE: &str = "lastHour";

#[derive(Debug, Deserialize)]
pub struct ObservationsQuery {
    pub range: Option<String>,
}

#[utoipa::path(
    get,
    path = "/api/stationObservations",
    responses(
        (status = OK, description = "Latest merged observation per station, last hour", body = Vec<StationObservations>),
        (status = UNAUTHORIZED, description = "Missing API key"),
        (status = FORBIDDEN, description = "Invalid API key"),
        (status = INTERNAL_SERVER_ERROR, description = "Upstream provider failure")
    ))]
pub async fn get_latest_observations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<StationObservations>>, (StatusCode, String)> {
    let observations =
        service::observations::latest_observations(state.metobs.as_ref(), &LogMismatchSink)
            .await
            .map_err(|err| {
                error!("error fetching latest observations: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to fetch observations: {}", err),
                )
            })?;

    Ok(Json(observations))
}

#[utoipa::path(
    get,
    path = "/api/stationObservations/{stationId}",
    params(
        ("stationId" = String, Path, description = "Provider-assigned station id"),
        ("range" = Option<String>, Query, description = "Time range, lastHour (default) or lastDay"),
    ),
    responses(
        (status = OK, description = "Merged observation series for the station, newest first", body = StationObservations),
        (status = UNAUTHORIZED, description = "Missing API key"),
        (status = FORBIDDEN, description = "Invalid API key"),
        (status = NOT_FOUND, description = "Station unknown to both parameters"),
        (status = INTERNAL_SERVER_ERROR, description = "Upstream provider failure")
    ))]
pub async fn get_station_observations(
    State(state): State<Arc<AppState>>,
    Path(station_id): Path<String>,
    Query(query): Query<ObservationsQuery>,
) -> Result<Json<StationObservations>, (StatusCode, String)> {
    let range = query.range.as_deref().unwrap_or(DEFAULT_RANGE);

    let observations =
        service::observations::observations_for_station(state.metobs.as_ref(), &station_id, range)
            .await
            .map_err(|err| {
                error!("error fetching observations for {}: {}", station_id, err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    format!("Failed to fetch observations: {}", err),
                )
            })?;

    observations.map(Json).ok_or((
        StatusCode::NOT_FOUND,
        format!("Station not found: {}", station_id),
    ))
}
