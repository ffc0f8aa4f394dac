//! One-shot position lookup.
//!
//! A terminal has no device location API, so the position comes from an
//! IP geolocation service unless it is given on the command line.

use std::time::Duration;

use reqwest::blocking::Client;
use serde::Deserialize;
use tracing::{error, info, warn};

use crate::error::LocateError;
use crate::weatherapi::Query;

pub const GEO_URL: &str = "http://ip-api.com/json";

const FIELDS: &str = "status,message,lat,lon,city,country";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub lat: f64,
    pub lon: f64,
}

impl From<Coordinates> for Query {
    fn from(coords: Coordinates) -> Self {
        Query::Coordinates {
            lat: coords.lat,
            lon: coords.lon,
        }
    }
}

pub trait Geolocator: Send + Sync {
    fn locate(&self) -> Result<Coordinates, LocateError>;
}

/// Position supplied by the user.
#[derive(Debug, Clone, Copy)]
pub struct FixedLocator(pub Coordinates);

impl Geolocator for FixedLocator {
    fn locate(&self) -> Result<Coordinates, LocateError> {
        Ok(self.0)
    }
}

#[derive(Deserialize, Debug)]
struct IpResponse {
    status: String,
    message: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
    city: Option<String>,
    country: Option<String>,
}

/// Approximate position of this machine's public address.
#[derive(Debug, Clone)]
pub struct IpLocator {
    client: Client,
    url: String,
}

impl IpLocator {
    pub fn new(url: &str, timeout: Duration) -> Result<Self, LocateError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            url: url.to_string(),
        })
    }
}

impl Geolocator for IpLocator {
    fn locate(&self) -> Result<Coordinates, LocateError> {
        info!("Requesting approximate position from {}", self.url);
        let response = self
            .client
            .get(&self.url)
            .query(&[("fields", FIELDS)])
            .send()?;

        let status = response.status();
        if !status.is_success() {
            error!("Position lookup failed: {}", status);
            return Err(LocateError::Unavailable(status.as_u16()));
        }

        let body: IpResponse = serde_json::from_str(&response.text()?)?;
        match (body.status.as_str(), body.lat, body.lon) {
            ("success", Some(lat), Some(lon)) => {
                info!(
                    lat,
                    lon,
                    city = body.city.as_deref().unwrap_or("?"),
                    country = body.country.as_deref().unwrap_or("?"),
                    "Position resolved"
                );
                Ok(Coordinates { lat, lon })
            }
            _ => {
                let message = body
                    .message
                    .unwrap_or_else(|| "no coordinates in response".to_string());
                warn!("Position lookup rejected: {}", message);
                Err(LocateError::Rejected(message))
            }
        }
    }
}
