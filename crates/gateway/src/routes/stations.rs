use axum::{extract::State, http::StatusCode, Json};
use log::error;
use std::sync::Arc;

use crate::{
    service::{self, LogMismatchSink},
    AppState, Station,
};

#[utoipa::path(
    get,
    path = "/api/stations",
    responses(
        (status = OK, description = "All stations reporting air temperature or wind gust, deduplicated by station id", body = Vec<Station>),
        (status = UNAUTHORIZED, description = "Missing API key"),
        (status = FORBIDDEN, description = "Invalid API key"),
        (status = INTERNAL_SERVER_ERROR, description = "Upstream provider failure")
    ))]
pub async fn get_stations(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Vec<Station>>, (StatusCode, String)> {
    let stations = service::stations::all_stations(state.metobs.as_ref(), &LogMismatchSink)
        .await
        .map_err(|err| {
            error!("error listing stations: {}", err);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                format!("Failed to fetch stations: {}", err),
            )
        })?;

    Ok(Json(stations))
}
