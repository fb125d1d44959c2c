//! Error types for the scoring core and its collaborators.

use thiserror::Error;

/// Rejected input to the heat-index calculator
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HeatIndexError {
    #[error("temperature must be a finite number (got {0})")]
    NonFiniteTemperature(f64),

    #[error("temperature {0:.1}°F is outside the supported range (-150 to 200°F)")]
    TemperatureOutOfRange(f64),

    #[error("relative humidity must be a finite number (got {0})")]
    NonFiniteHumidity(f64),

    #[error("relative humidity must be within 0-100% (got {0})")]
    HumidityOutOfRange(f64),
}

/// Failure talking to an external collaborator (directions, weather, completion)
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("{0} provider is not configured")]
    NotConfigured(&'static str),

    #[error("request failed: {0}")]
    Request(String),

    #[error("provider returned status {status}: {message}")]
    Status { status: u16, message: String },

    #[error("could not decode provider response: {0}")]
    Decode(String),

    #[error("provider returned no usable content")]
    Empty,

    #[error("provider did not answer within {0:?}")]
    Timeout(std::time::Duration),
}

/// A history series could not be summarised
#[derive(Debug, Clone, PartialEq, Error)]
pub enum HistoryError {
    #[error("invalid reading for {date}: {source}")]
    InvalidSample {
        date: String,
        #[source]
        source: HeatIndexError,
    },
}
