use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum WindError {
    #[error("hardware error: {0}")]
    Hardware(String),
    #[error("configuration error: {0}")]
    Config(String),
    #[error("output sink error: {0}")]
    Sink(String),
    #[error("invalid state: {0}")]
    State(String),
}

#[derive(Debug, Error, Clone)]
pub enum BuildError {
    #[error("missing edge capture")]
    MissingCapture,
    #[error("invalid config: {0}")]
    InvalidConfig(&'static str),
}

pub type Result<T> = eyre::Result<T>;

/// Map a trait-boundary sink error to a typed `WindError`.
pub fn map_sink_error(e: &(dyn std::error::Error + 'static)) -> WindError {
    WindError::Sink(e.to_string())
}
