//! Error types for collection and analysis.

use thiserror::Error;

/// Errors raised while fetching pages, calling the enrichment APIs,
/// reading and writing the recommendation table, or analyzing it.
#[derive(Debug, Error)]
pub enum RecsError {
    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A remote API answered with a non-success status code.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Chart rendering failed.
    #[error("plot error: {0}")]
    Plot(String),

    /// The table cannot support the requested analysis.
    #[error("analysis error: {0}")]
    Analysis(String),
}

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration error: {0}")]
    Figment(#[from] Box<figment::Error>),

    /// A value is present but unusable.
    #[error("Invalid configuration value for '{field}': {reason}")]
    InvalidValue { field: String, reason: String },
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

pub type Result<T, E = RecsError> = std::result::Result<T, E>;
