//! `cpa-access` — from a cost surface and destination points to an
//! accessibility grid.
//!
//! # Crate layout
//!
//! | Module            | Contents                                                  |
//! |-------------------|-----------------------------------------------------------|
//! | [`locator`]       | `Destination`, `Located`, `LocateStatus`, `locate`        |
//! | [`cost_distance`] | `CostDistanceEngine` trait, `DijkstraEngine`, `CostField`, `least_cost_route` |
//! | [`merge`]         | `merge` of land-only and water-passable results           |
//!
//! Errors are [`cpa_core::CpaError`]; nothing here adds a failure mode of its
//! own.  Invalid destinations and unreachable cells are reported as data.
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on locator types.          |

pub mod cost_distance;
pub mod locator;
pub mod merge;

#[cfg(test)]
mod tests;

pub use cost_distance::{
    CostDistanceEngine, CostField, DijkstraEngine, LeastCostRoute, cost_distance, least_cost_route,
};
pub use locator::{
    Destination, InvalidReason, LocateStatus, Located, invalid_locations, locate, start_cells,
};
pub use merge::merge;
