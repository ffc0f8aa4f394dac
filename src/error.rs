use thiserror::Error;

/// Failures of the weather client.
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Transport failure: connect, timeout, TLS, body read.
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// The API answered with a non-success status.
    #[error("{message}")]
    Api {
        status: u16,
        code: Option<u32>,
        message: String,
    },

    /// A success status with a body that is not a weather document.
    #[error("unexpected response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failures of the one-shot position lookup.
#[derive(Debug, Error)]
pub enum LocateError {
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("location service unavailable (status {0})")]
    Unavailable(u16),

    #[error("location service refused the lookup: {0}")]
    Rejected(String),

    #[error("unexpected location response: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Invalid command line or environment configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no API key: pass --api-key or set WEATHER_API_KEY")]
    MissingApiKey,

    #[error("invalid {name} URL `{value}`: {reason}")]
    InvalidUrl {
        name: &'static str,
        value: String,
        reason: String,
    },

    #[error("timeout must be at least one second")]
    ZeroTimeout,
}
