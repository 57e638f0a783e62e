//! Error types for cpa-run.

use cpa_core::CpaError;
use cpa_surface::SurfaceError;
use thiserror::Error;

/// Errors that can abort a run.
#[derive(Debug, Error)]
pub enum RunError {
    #[error(transparent)]
    Core(#[from] CpaError),

    #[error(transparent)]
    Surface(#[from] SurfaceError),

    #[error("configuration error: {0}")]
    Config(String),

    #[error("config file parse error: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("report CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Alias for `Result<T, RunError>`.
pub type RunResult<T> = Result<T, RunError>;
