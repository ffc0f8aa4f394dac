use std::time::Duration;

use reqwest::Url;

use crate::cli::Args;
use crate::error::ConfigError;
use crate::geolocate::Coordinates;
use crate::units::Units;

/// How the position is obtained at start.
#[derive(Debug, Clone, PartialEq)]
pub enum Startup {
    /// Look up the position over the network.
    Locate { geo_url: String },
    /// Use the position given on the command line.
    Fixed(Coordinates),
    /// Search for a place right away.
    Search(String),
    /// Wait for the user to search.
    Idle,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub api_key: String,
    pub api_url: String,
    pub startup: Startup,
    pub units: Units,
    pub timeout: Duration,
}

fn check_url(name: &'static str, value: &str) -> Result<(), ConfigError> {
    Url::parse(value).map(|_| ()).map_err(|e| ConfigError::InvalidUrl {
        name,
        value: value.to_string(),
        reason: e.to_string(),
    })
}

impl Config {
    pub fn from_args(args: &Args) -> Result<Self, ConfigError> {
        let api_key = match args.api_key.as_deref().map(str::trim) {
            Some(key) if !key.is_empty() => key.to_string(),
            _ => return Err(ConfigError::MissingApiKey),
        };
        check_url("weather API", &args.api_url)?;
        if args.timeout == 0 {
            return Err(ConfigError::ZeroTimeout);
        }

        let place = args.place.as_deref().map(str::trim).filter(|p| !p.is_empty());
        let startup = match (place, args.lat, args.lon) {
            (Some(place), _, _) => Startup::Search(place.to_string()),
            (None, Some(lat), Some(lon)) => Startup::Fixed(Coordinates { lat, lon }),
            _ if args.no_locate => Startup::Idle,
            _ => {
                check_url("geolocation", &args.geo_url)?;
                Startup::Locate {
                    geo_url: args.geo_url.clone(),
                }
            }
        };

        Ok(Self {
            api_key,
            api_url: args.api_url.clone(),
            startup,
            units: args.units,
            timeout: Duration::from_secs(args.timeout),
        })
    }
}
