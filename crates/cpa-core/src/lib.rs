//! `cpa-core` — foundational types for the `cpa` accessibility toolkit.
//!
//! This crate is a dependency of every other `cpa-*` crate.  It has no
//! `cpa-*` dependencies and few external ones (`rand` and `thiserror`, plus
//! optional `rayon` and `serde`).
//!
//! # What lives here
//!
//! | Module    | Contents                                                   |
//! |-----------|------------------------------------------------------------|
//! | [`grid`]  | `Grid`, `GridTransform`, `Cell`                            |
//! | [`units`] | `LinearUnit`, `METRES_PER_DEGREE`                          |
//! | [`rng`]   | `AccessRng` (seeded, reproducible)                         |
//! | [`error`] | `CpaError`, `CpaResult`                                    |
//!
//! # Feature flags
//!
//! | Flag       | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | Per-pixel transforms run row-partitioned on Rayon.      |
//! | `serde`    | Adds `Serialize`/`Deserialize` to value types.          |

pub mod error;
pub mod grid;
pub mod rng;
pub mod units;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use error::{CpaError, CpaResult};
pub use grid::{Cell, Grid, GridTransform};
pub use rng::AccessRng;
pub use units::{LinearUnit, METRES_PER_DEGREE};

/// Convert a speed in km/h to m/s.
#[inline]
pub fn kmh_to_ms(speed_kmh: f64) -> f64 {
    speed_kmh * 1000.0 / 3600.0
}
