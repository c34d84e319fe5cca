use serde::Serialize;
use std::collections::{hash_map::Entry, BTreeMap, HashMap};
use time::OffsetDateTime;
use utoipa::ToSchema;

use crate::metobs::{
    self, MetobsApi, ObservationResponse, Period, StationSetEntry, AIR_TEMPERATURE, WIND_GUST,
};
use crate::service::NameMismatchSink;

/// One merged reading. Nulls are serialized so callers can tell which
/// parameter was missing; at least one of the two scalars is always set.
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ObservationPoint {
    #[serde(with = "time::serde::rfc3339")]
    pub timestamp_utc: OffsetDateTime,
    pub wind_gust: Option<f64>,
    pub air_temp: Option<f64>,
}

/// A station with its merged observation series, newest first
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StationObservations {
    pub station_id: String,
    pub name: String,
    pub observations: Vec<ObservationPoint>,
}

/// Temperature and wind gust readings sharing one timestamp
#[derive(Debug, Clone, Copy, Default)]
struct PointValues {
    temperature: Option<f64>,
    wind_gust: Option<f64>,
}

impl PointValues {
    fn any(self) -> bool {
        self.temperature.is_some() || self.wind_gust.is_some()
    }
}

/// The latest merged observation for every station reporting either
/// parameter within the last hour.
pub async fn latest_observations(
    client: &dyn MetobsApi,
    sink: &dyn NameMismatchSink,
) -> Result<Vec<StationObservations>, metobs::Error> {
    let (temperature, wind) = tokio::try_join!(
        client.latest_observations(AIR_TEMPERATURE, Period::LatestHour),
        client.latest_observations(WIND_GUST, Period::LatestHour),
    )?;

    Ok(merge_latest(temperature.station, wind.station, sink))
}

/// The full merged series for one station, or `None` when the provider
/// knows the station for neither parameter.
pub async fn observations_for_station(
    client: &dyn MetobsApi,
    station_id: &str,
    range: &str,
) -> Result<Option<StationObservations>, metobs::Error> {
    let period = period_for(range);
    let (temperature, wind) = tokio::try_join!(
        client.station_observations(AIR_TEMPERATURE, station_id, period),
        client.station_observations(WIND_GUST, station_id, period),
    )?;

    Ok(merge_station_series(station_id, temperature, wind))
}

/// Unrecognized range selectors fall back to the last hour rather than
/// failing the request.
fn period_for(range: &str) -> Period {
    match range {
        "lastDay" => Period::LatestDay,
        _ => Period::LatestHour,
    }
}

struct MergedSeries {
    name: String,
    points: HashMap<i64, PointValues>,
}

impl MergedSeries {
    fn new(name: String) -> Self {
        Self {
            name,
            points: HashMap::new(),
        }
    }
}

/// Merge the two station-set feeds into one record per station id, keeping
/// only the newest point that carries at least one parsed value. Stations
/// with no usable point are kept with an empty series.
fn merge_latest(
    temperature: Vec<StationSetEntry>,
    wind: Vec<StationSetEntry>,
    sink: &dyn NameMismatchSink,
) -> Vec<StationObservations> {
    let mut stations: HashMap<String, MergedSeries> = HashMap::new();

    for StationSetEntry { key, name, value } in temperature {
        let station = stations
            .entry(key)
            .or_insert_with(|| MergedSeries::new(name));
        for reading in value.unwrap_or_default() {
            if let Some(temp) = parse_reading(reading.value.as_deref()) {
                station.points.insert(
                    reading.date,
                    PointValues {
                        temperature: Some(temp),
                        wind_gust: None,
                    },
                );
            }
        }
    }

    for StationSetEntry { key, name, value } in wind {
        let station = match stations.entry(key) {
            Entry::Occupied(existing) => {
                if existing.get().name != name {
                    sink.record(existing.key(), &existing.get().name, &name);
                }
                existing.into_mut()
            }
            Entry::Vacant(slot) => slot.insert(MergedSeries::new(name)),
        };
        for reading in value.unwrap_or_default() {
            if let Some(gust) = parse_reading(reading.value.as_deref()) {
                station
                    .points
                    .entry(reading.date)
                    .and_modify(|point| point.wind_gust = Some(gust))
                    .or_insert(PointValues {
                        temperature: None,
                        wind_gust: Some(gust),
                    });
            }
        }
    }

    stations
        .into_iter()
        .map(|(station_id, series)| {
            let observations = series
                .points
                .iter()
                .filter(|(_, values)| values.any())
                .max_by_key(|(date, _)| **date)
                .and_then(|(date, values)| observation_point(*date, *values))
                .into_iter()
                .collect();
            StationObservations {
                station_id,
                name: series.name,
                observations,
            }
        })
        .collect()
}

/// Merge two single-station responses into the full series, every
/// timestamp with at least one parsed value, newest first.
fn merge_station_series(
    station_id: &str,
    temperature: Option<ObservationResponse>,
    wind: Option<ObservationResponse>,
) -> Option<StationObservations> {
    if temperature.is_none() && wind.is_none() {
        return None;
    }

    let name = temperature
        .as_ref()
        .map(|response| response.station.name.clone())
        .or_else(|| wind.as_ref().map(|response| response.station.name.clone()))
        .unwrap_or_else(|| station_id.to_owned());

    let mut points: BTreeMap<i64, PointValues> = BTreeMap::new();

    if let Some(response) = temperature {
        for reading in response.value.unwrap_or_default() {
            if let Some(temp) = parse_reading(reading.value.as_deref()) {
                points.insert(
                    reading.date,
                    PointValues {
                        temperature: Some(temp),
                        wind_gust: None,
                    },
                );
            }
        }
    }

    if let Some(response) = wind {
        for reading in response.value.unwrap_or_default() {
            if let Some(gust) = parse_reading(reading.value.as_deref()) {
                points
                    .entry(reading.date)
                    .and_modify(|point| point.wind_gust = Some(gust))
                    .or_insert(PointValues {
                        temperature: None,
                        wind_gust: Some(gust),
                    });
            }
        }
    }

    let observations = points
        .into_iter()
        .rev()
        .filter(|(_, values)| values.any())
        .filter_map(|(date, values)| observation_point(date, values))
        .collect();

    Some(StationObservations {
        station_id: station_id.to_owned(),
        name,
        observations,
    })
}

/// A reading counts only if it is non-blank and parses as a float;
/// anything else is treated as absent.
fn parse_reading(raw: Option<&str>) -> Option<f64> {
    let trimmed = raw?.trim();
    if trimmed.is_empty() {
        return None;
    }
    trimmed.parse().ok()
}

/// Timestamps are Unix milliseconds UTC; values outside the representable
/// range drop the point.
fn observation_point(date_millis: i64, values: PointValues) -> Option<ObservationPoint> {
    let timestamp_utc =
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(date_millis) * 1_000_000).ok()?;
    Some(ObservationPoint {
        timestamp_utc,
        wind_gust: values.wind_gust,
        air_temp: values.temperature,
    })
}
