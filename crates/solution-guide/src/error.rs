use std::time::Duration;

use glean_common::error::CommonError;
use glean_common::glean::GleanClientError;

/// Startup failures. Nothing here can happen while serving requests.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Common(#[from] CommonError),

    #[error("config error: {0}")]
    Config(String),
}

/// Failures that cross the orchestrator boundary.
#[derive(Debug, thiserror::Error)]
pub enum GuideError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("generation failed: {0}")]
    Generation(#[source] GleanClientError),

    #[error("generation timed out after {}s", .0.as_secs())]
    GenerationTimeout(Duration),

    #[error("generation returned malformed output: {0}")]
    MalformedOutput(String),
}

impl GuideError {
    /// Stable machine-readable error code for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            GuideError::Validation(_) => "validation_error",
            GuideError::Generation(_) | GuideError::GenerationTimeout(_) => "generation_error",
            GuideError::MalformedOutput(_) => "malformed_output",
        }
    }
}

/// Research failures. These are logged and absorbed, never returned to callers.
#[derive(Debug, thiserror::Error)]
pub enum ResearchError {
    #[error("every research call failed for {company}: {first}")]
    Unavailable { company: String, first: String },

    #[error("research timed out after {}s", .0.as_secs())]
    TimedOut(Duration),
}
