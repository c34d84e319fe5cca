use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT};
use reqwest::{Client, StatusCode};
use reqwest_middleware::{ClientBuilder, ClientWithMiddleware};
use reqwest_retry::{policies::ExponentialBackoff, RetryTransientMiddleware};
use serde::Deserialize;
use std::time::Duration;

/// Parameter id for hourly air temperature (degrees Celsius)
pub const AIR_TEMPERATURE: u32 = 1;
/// Parameter id for wind gust speed (metres per second)
pub const WIND_GUST: u32 = 21;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const MAX_TRANSIENT_RETRIES: u32 = 3;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("metobs request failed: {0}")]
    Request(#[from] reqwest_middleware::Error),
    #[error("metobs returned status {status} for {url}")]
    UnexpectedStatus { status: StatusCode, url: String },
    #[error("failed to decode metobs response: {0}")]
    Decode(#[source] reqwest::Error),
}

/// Upstream time-window selector for an observation query
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    LatestHour,
    LatestDay,
}

impl Period {
    pub fn as_str(self) -> &'static str {
        match self {
            Period::LatestHour => "latest-hour",
            Period::LatestDay => "latest-day",
        }
    }
}

/// Station record from the parameter endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationEntry {
    pub key: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub id: i64,
    #[serde(default)]
    pub active: bool,
    #[serde(default)]
    pub latitude: f64,
    #[serde(default)]
    pub longitude: f64,
    #[serde(default)]
    pub height: f64,
}

/// Response from the parameter endpoint listing stations
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ParameterResponse {
    #[serde(default)]
    pub station: Vec<StationEntry>,
}

/// A single reading; `value` is the raw string the provider sends and may
/// be empty or non-numeric
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObservationValue {
    /// Unix timestamp in milliseconds
    pub date: i64,
    pub value: Option<String>,
    pub quality: Option<String>,
}

/// Station identity within an observation response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObservationStation {
    pub key: String,
    #[serde(default)]
    pub name: String,
}

/// Response from the single-station observation endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ObservationResponse {
    pub station: ObservationStation,
    pub value: Option<Vec<ObservationValue>>,
}

/// One station's series within a station-set response
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationSetEntry {
    pub key: String,
    #[serde(default)]
    pub name: String,
    pub value: Option<Vec<ObservationValue>>,
}

/// Response from the all-stations ("station-set") observation endpoint
#[derive(Debug, Clone, Default, Deserialize)]
pub struct StationSetResponse {
    #[serde(default)]
    pub station: Vec<StationSetEntry>,
}

/// Client contract for the metobs open-data API
#[async_trait]
pub trait MetobsApi: Send + Sync {
    /// List all stations reporting the given parameter. Empty list on no
    /// data; any non-2xx response is an error.
    async fn stations(&self, parameter: u32) -> Result<ParameterResponse, Error>;

    /// Fetch the observation series of every station for one parameter and
    /// period. Any non-2xx response is an error.
    async fn latest_observations(
        &self,
        parameter: u32,
        period: Period,
    ) -> Result<StationSetResponse, Error>;

    /// Fetch one station's observation series. `Ok(None)` when the provider
    /// does not know the station for this parameter; any other non-2xx
    /// response is an error.
    async fn station_observations(
        &self,
        parameter: u32,
        station_id: &str,
        period: Period,
    ) -> Result<Option<ObservationResponse>, Error>;
}

/// HTTP client for the metobs open-data API
pub struct MetobsClient {
    client: ClientWithMiddleware,
    base_url: String,
}

impl MetobsClient {
    pub fn new(base_url: String) -> Result<Self, reqwest::Error> {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        // Transient upstream failures are retried here, at the transport
        // layer; callers see only the final outcome.
        let retry_policy =
            ExponentialBackoff::builder().build_with_max_retries(MAX_TRANSIENT_RETRIES);
        let client = ClientBuilder::new(
            Client::builder()
                .default_headers(headers)
                .gzip(true)
                .timeout(REQUEST_TIMEOUT)
                .build()?,
        )
        .with(RetryTransientMiddleware::new_with_policy(retry_policy))
        .build();

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_owned(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: String) -> Result<T, Error> {
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::UnexpectedStatus { status, url });
        }
        response.json().await.map_err(Error::Decode)
    }
}

#[async_trait]
impl MetobsApi for MetobsClient {
    async fn stations(&self, parameter: u32) -> Result<ParameterResponse, Error> {
        let url = format!(
            "{}/api/version/latest/parameter/{}.json",
            self.base_url, parameter
        );
        self.get_json(url).await
    }

    async fn latest_observations(
        &self,
        parameter: u32,
        period: Period,
    ) -> Result<StationSetResponse, Error> {
        let url = format!(
            "{}/api/version/latest/parameter/{}/station-set/all/period/{}/data.json",
            self.base_url,
            parameter,
            period.as_str()
        );
        self.get_json(url).await
    }

    async fn station_observations(
        &self,
        parameter: u32,
        station_id: &str,
        period: Period,
    ) -> Result<Option<ObservationResponse>, Error> {
        let url = format!(
            "{}/api/version/latest/parameter/{}/station/{}/period/{}/data.json",
            self.base_url,
            parameter,
            station_id,
            period.as_str()
        );
        let response = self.client.get(&url).send().await?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(Error::UnexpectedStatus { status, url });
        }
        response.json().await.map(Some).map_err(Error::Decode)
    }
}
