#![forbid(unsafe_code)]

use std::path::PathBuf;

use thiserror::Error;
use waypoint_tour::TourConfigError;

pub type Result<T> = std::result::Result<T, HarnessError>;

#[derive(Debug, Error)]
pub enum HarnessError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid scenario {path}: {message}")]
    ScenarioParse { path: PathBuf, message: String },

    #[error("invalid scenario: {0}")]
    InvalidScenario(String),

    #[error("invalid tour config: {0}")]
    Config(#[from] TourConfigError),

    #[error("failed to encode transcript: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write output: {0}")]
    Output(#[from] std::io::Error),

    #[error("failed to install log subscriber: {0}")]
    Logging(String),
}

impl HarnessError {
    pub fn invalid(message: impl Into<String>) -> Self {
        Self::InvalidScenario(message.into())
    }

    /// Process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::ScenarioParse { .. } | Self::InvalidScenario(_) | Self::Config(_) => 2,
            Self::Read { .. } => 3,
            Self::Encode(_) | Self::Output(_) | Self::Logging(_) => 1,
        }
    }
}
