//! Land-only and water-passable accessibility → one answer.

use cpa_core::{CpaResult, Grid};

/// Per cell: the land-only value where it is valid, otherwise the
/// water-passable value (which may itself be nodata).
pub fn merge(land_only: &Grid, water_passable: &Grid) -> CpaResult<Grid> {
    let merged = land_only.zip_map(water_passable, "water-passable accessibility grid", |land, water| {
        land.or(water)
    })?;
    log::info!(
        "merged accessibility: {} cells by land, {} in total",
        land_only.valid_count(),
        merged.valid_count()
    );
    Ok(merged)
}
