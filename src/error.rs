//! Error types for the tdnav crate

use thiserror::Error;

/// Main error type for the tdnav crate
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum Error {
    #[error("dimension mismatch in {context}: expected {expected} features, got {got}")]
    DimensionMismatch {
        expected: usize,
        got: usize,
        context: String,
    },

    #[error("invalid configuration: {message}")]
    InvalidConfiguration { message: String },

    #[error("timestep {dt} must be positive and finite")]
    InvalidTimestep { dt: f64 },

    #[error("environment produced an empty global sample")]
    EmptyGlobalSample,

    #[error("unsupported save format version {found} (expected {expected})")]
    UnsupportedVersion { found: u32, expected: u32 },

    #[error("failed to {operation}: {source}")]
    Io {
        operation: String,
        #[source]
        source: std::io::Error,
    },

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("progress bar template error: {message}")]
    ProgressBarTemplate { message: String },
}

/// Convenience type alias for Results using the crate's Error type
pub type Result<T> = std::result::Result<T, Error>;

impl From<std::io::Error> for Error {
    fn from(source: std::io::Error) -> Self {
        Error::Io {
            operation: "IO operation".to_string(),
            source,
        }
    }
}

impl Error {
    pub(crate) fn invalid_config(message: impl Into<String>) -> Self {
        Error::InvalidConfiguration {
            message: message.into(),
        }
    }
}
