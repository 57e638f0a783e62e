//! `cpa-surface` — time-cost surface composition.
//!
//! # Pipeline
//!
//! ```text
//! landcover grid ──apply_landcover──▶ landcover speed ─┐
//! road features ──reconcile + rasterize_roads──▶ road speed ─┼─combine──▶ land-only cost
//! DEM ──slope_impact──▶ speed multiplier ──────────────┘        │
//!                                          apply_water_override ▼
//!                                                     water-passable cost
//! ```
//!
//! # Crate layout
//!
//! | Module        | Contents                                                 |
//! |---------------|----------------------------------------------------------|
//! | [`speed_map`] | `CategoryCode`, `SpeedMap`, label reconciliation         |
//! | [`loader`]    | `load_speed_table_csv`, `load_speed_table_reader`        |
//! | [`landcover`] | `apply_landcover`                                        |
//! | [`roads`]     | `RoadFeature`, `BurnPolicy`, `rasterize_roads`           |
//! | [`slope`]     | `percentage_slope`, `slope_impact`, walking-speed model  |
//! | [`combine`]   | `combine`, `speed_to_cost`, `apply_water_override`       |
//! | [`builder`]   | `CostSurfaceBuilder`, `CostSurfaces`                     |
//! | [`error`]     | `SurfaceError`, `SurfaceResult<T>`                       |

mod burn;

pub mod builder;
pub mod combine;
pub mod error;
pub mod landcover;
pub mod loader;
pub mod roads;
pub mod slope;
pub mod speed_map;


pub use builder::{CostSurfaceBuilder, CostSurfaces, DEFAULT_CHILD_IMPACT, DEFAULT_WATERSPEED};
pub use combine::{DEFAULT_WATER_CODE, apply_water_override, combine, pixel_cost, speed_to_cost};
pub use error::{SurfaceError, SurfaceResult};
pub use landcover::apply_landcover;
pub use loader::{load_speed_table_csv, load_speed_table_reader};
pub use roads::{BurnPolicy, RoadFeature, layer_categories, rasterize_roads};
pub use slope::{IMPASSABLE_SLOPE_PCT, percentage_slope, slope_impact, walking_speed_factor};
pub use speed_map::{CategoryCode, SpeedMap, best_match, similarity};
