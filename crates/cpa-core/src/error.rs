//! Toolkit error type.
//!
//! Sub-crates define their own error enums and wrap `CpaError` as one
//! variant via `#[from]`, so `?` works across crate boundaries.
//!
//! Only two conditions are fatal for a run: a bad configuration (empty speed
//! table, unknown linear unit, out-of-range factor) and grids that were
//! expected to align but do not.  Invalid destinations and unreachable cells
//! are data, not errors.

use thiserror::Error;

use crate::Cell;

/// The top-level error type for `cpa-core` and a common base for sub-crates.
#[derive(Debug, Error)]
pub enum CpaError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("{what} geometry {got} does not match {expected}")]
    GeometryMismatch {
        what:     &'static str,
        expected: String,
        got:      String,
    },

    #[error("cell {0} lies outside the grid")]
    OutOfBounds(Cell),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Shorthand result type for all `cpa-*` crates.
pub type CpaResult<T> = Result<T, CpaError>;
