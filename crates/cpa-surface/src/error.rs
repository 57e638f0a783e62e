use cpa_core::CpaError;
use thiserror::Error;

/// Errors produced by `cpa-surface`.
#[derive(Debug, Error)]
pub enum SurfaceError {
    #[error(transparent)]
    Core(#[from] CpaError),

    #[error("speed table CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("speed table parse error: {0}")]
    Parse(String),
}

pub type SurfaceResult<T> = Result<T, SurfaceError>;
