use serde::Serialize;
use std::collections::{hash_map::Entry, HashMap};
use utoipa::ToSchema;

use crate::metobs::{self, MetobsApi, StationEntry, AIR_TEMPERATURE, WIND_GUST};
use crate::service::NameMismatchSink;

/// A station known to at least one of the two parameters
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct Station {
    pub station_id: String,
    pub name: String,
}

/// Every station reporting air temperature or wind gust, deduplicated by
/// station id.
pub async fn all_stations(
    client: &dyn MetobsApi,
    sink: &dyn NameMismatchSink,
) -> Result<Vec<Station>, metobs::Error> {
    let (temperature, wind) = tokio::try_join!(
        client.stations(AIR_TEMPERATURE),
        client.stations(WIND_GUST),
    )?;

    Ok(merge_stations(temperature.station, wind.station, sink))
}

/// Union by station id. Temperature entries come first and own the display
/// name; wind-only stations are added as-is. Order of the result is
/// unspecified.
fn merge_stations(
    temperature: Vec<StationEntry>,
    wind: Vec<StationEntry>,
    sink: &dyn NameMismatchSink,
) -> Vec<Station> {
    let mut names: HashMap<String, String> = HashMap::new();

    for station in temperature {
        names.insert(station.key, station.name);
    }

    for station in wind {
        match names.entry(station.key) {
            Entry::Occupied(existing) => {
                if *existing.get() != station.name {
                    sink.record(existing.key(), existing.get(), &station.name);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(station.name);
            }
        }
    }

    names
        .into_iter()
        .map(|(station_id, name)| Station { station_id, name })
        .collect()
}
