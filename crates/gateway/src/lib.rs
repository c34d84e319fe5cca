//! Metobs Gateway
//!
//! HTTP gateway over the SMHI metobs open-data API. Fetches the air
//! temperature and wind gust parameter feeds concurrently and reconciles
//! them into per-station views behind a pre-shared-key gate.

pub mod auth;
pub mod metobs;
pub mod routes;
pub mod service;
mod startup;
mod utils;

pub use auth::{require_api_key, ApiKeys, API_KEY_HEADER};
pub use metobs::{MetobsApi, MetobsClient, Period, AIR_TEMPERATURE, WIND_GUST};
pub use service::observations::{ObservationPoint, StationObservations};
pub use service::stations::Station;
pub use service::{LogMismatchSink, NameMismatchSink};
pub use startup::{app, build_app_state, AppState};
pub use utils::{get_config_info, get_log_level, setup_logger, Cli};
