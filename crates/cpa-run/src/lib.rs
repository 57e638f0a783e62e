//! `cpa-run` — configuration and orchestration of an accessibility run.
//!
//! # Crate layout
//!
//! | Module     | Contents                                                     |
//! |------------|--------------------------------------------------------------|
//! | [`config`] | `RunConfig` (TOML), section structs, speed-table loading     |
//! | [`run`]    | `AccessibilityRun`, `AccessibilityOutput`, `SurfaceVariant`  |
//! | [`report`] | `InvalidLocationWriter`, `write_invalid_reports`             |
//! | [`error`]  | `RunError`, `RunResult<T>`                                   |
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                      |
//! |------------|-------------------------------------------------------------|
//! | `parallel` | Rayon pixel transforms; both surface variants solved at once. |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use cpa_run::{AccessibilityRun, RunConfig, write_invalid_reports};
//!
//! let config = RunConfig::from_toml_file(Path::new("run.toml"))?;
//! let lc_speeds = config.load_landcover_speeds()?;
//! let out = AccessibilityRun::new(&config, &landcover, &lc_speeds)
//!     .dem(&dem)
//!     .run(&destinations)?;
//! write_invalid_reports(Path::new("out"), &out)?;
//! ```

pub mod config;
pub mod error;
pub mod report;
pub mod run;

#[cfg(test)]
mod tests;

pub use config::{LandcoverConfig, LocatorConfig, ReportConfig, RoadsConfig, RunConfig, WalkingConfig};
pub use error::{RunError, RunResult};
pub use report::{InvalidLocationWriter, report_file_name, write_invalid_reports};
pub use run::{AccessibilityOutput, AccessibilityRun, SurfaceVariant, VariantResult};
