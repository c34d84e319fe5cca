use crate::{
    auth::{require_api_key, ApiKeys},
    metobs::{MetobsApi, MetobsClient},
    routes::{self, get_latest_observations, get_station_observations, get_stations},
    ObservationPoint, Station, StationObservations,
};
use anyhow::anyhow;
use axum::{
    body::Body,
    extract::Request,
    middleware::{self, Next},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use hyper::{
    header::{HeaderName, ACCEPT, CONTENT_TYPE},
    Method,
};
use log::info;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use utoipa::OpenApi;
use utoipa_scalar::{Scalar, Servable};

#[derive(Clone)]
pub struct AppState {
    pub metobs: Arc<dyn MetobsApi>,
    pub api_keys: ApiKeys,
}

#[derive(OpenApi)]
#[openapi(
    paths(
        routes::stations::get_stations,
        routes::observations::get_latest_observations,
        routes::observations::get_station_observations,
    ),
    components(
        schemas(
                Station,
                StationObservations,
                ObservationPoint,
            )
    ),
    tags(
        (name = "metobs gateway api", description = "a RESTful gateway exposing merged temperature and wind gust observations from the SMHI metobs open data API")
    )
)]
struct ApiDoc;

pub fn build_app_state(
    upstream_url: String,
    api_keys: Vec<String>,
) -> Result<AppState, anyhow::Error> {
    let metobs = Arc::new(
        MetobsClient::new(upstream_url).map_err(|e| anyhow!("error building metobs client: {}", e))?,
    );

    Ok(AppState {
        metobs,
        api_keys: ApiKeys::new(api_keys),
    })
}

pub fn app(app_state: AppState) -> Router {
    let api_docs = ApiDoc::openapi();
    let api_keys = app_state.api_keys.clone();
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::OPTIONS])
        .allow_headers([ACCEPT, CONTENT_TYPE, HeaderName::from_static("x-api-key")])
        .allow_origin(Any);

    Router::new()
        // API routes
        .route("/api/stations", get(get_stations))
        .route("/api/stationObservations", get(get_latest_observations))
        .route(
            "/api/stationObservations/{stationId}",
            get(get_station_observations),
        )
        // Raw OpenAPI document
        .route("/openapi/v1.json", get(openapi_json))
        .with_state(Arc::new(app_state))
        .merge(Scalar::with_url("/scalar", api_docs))
        .layer(middleware::from_fn_with_state(api_keys, require_api_key))
        .layer(middleware::from_fn(log_request))
        .layer(cors)
}

async fn openapi_json() -> Json<utoipa::openapi::OpenApi> {
    Json(ApiDoc::openapi())
}

async fn log_request(request: Request<Body>, next: Next) -> impl IntoResponse {
    let now = time::OffsetDateTime::now_utc();
    let path = request
        .uri()
        .path_and_query()
        .map(|p| p.as_str())
        .unwrap_or_default();
    info!(target: "http_request","new request, {} {}", request.method().as_str(), path);

    let response = next.run(request).await;
    let response_time = time::OffsetDateTime::now_utc() - now;
    info!(target: "http_response", "response, code: {}, time: {}", response.status().as_str(), response_time);

    response
}
