use std::fmt;
use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{debug, error, info};

use crate::error::WeatherError;
use crate::weather::WeatherSnapshot;

pub const BASE_URL: &str = "https://api.weatherapi.com/v1";

const USER_AGENT: &str = concat!("wxnow/", env!("CARGO_PKG_VERSION"));

/// What to look up: a position or a free-text place.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    Coordinates { lat: f64, lon: f64 },
    Place(String),
}

impl Query {
    /// Value of the `q` parameter.
    pub fn param(&self) -> String {
        match self {
            Query::Coordinates { lat, lon } => format!("{lat},{lon}"),
            Query::Place(place) => place.clone(),
        }
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Query::Coordinates { lat, lon } => write!(f, "({lat:.2}, {lon:.2})"),
            Query::Place(place) => f.write_str(place),
        }
    }
}

/// Anything that can answer a current-conditions query.
pub trait WeatherSource: Send + Sync {
    fn current(&self, query: &Query) -> Result<WeatherSnapshot, WeatherError>;
}

#[derive(Deserialize, Debug)]
struct ErrorBody {
    error: ApiError,
}

#[derive(Deserialize, Debug)]
struct ApiError {
    code: Option<u32>,
    message: String,
}

#[derive(Debug, Clone)]
pub struct WeatherApiClient {
    client: Client,
    base_url: String,
    api_key: String,
}

impl WeatherApiClient {
    pub fn new(base_url: &str, api_key: &str, timeout: Duration) -> Result<Self, WeatherError> {
        let client = Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/current.json", self.base_url)
    }
}

impl WeatherSource for WeatherApiClient {
    fn current(&self, query: &Query) -> Result<WeatherSnapshot, WeatherError> {
        info!("Fetching current conditions for {}", query);
        let response = self
            .client
            .get(self.endpoint())
            .query(&[("key", self.api_key.as_str()), ("q", query.param().as_str())])
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            error!("Weather request for {} failed: {}", query, status);
            return Err(match serde_json::from_str::<ErrorBody>(&body) {
                Ok(ErrorBody { error }) => WeatherError::Api {
                    status: status.as_u16(),
                    code: error.code,
                    message: error.message,
                },
                Err(_) => WeatherError::Api {
                    status: status.as_u16(),
                    code: None,
                    message: format!("request failed with status {status}"),
                },
            });
        }

        let snapshot: WeatherSnapshot = serde_json::from_str(&body)?;
        debug!(
            "Current conditions for {}: {}, {}",
            query, snapshot.location.name, snapshot.current.condition.text
        );
        Ok(snapshot)
    }
}
