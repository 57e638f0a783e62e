//! Speed layers → per-pixel traversal time.
//!
//! # Conversion
//!
//! ```text
//! speed  = road speed if present, else landcover speed        (km/h)
//! speed' = speed · child_impact · slope_impact
//! cost   = resolution_m / (speed' · 1000 / 3600)              (seconds)
//! ```
//!
//! Nodata in any required layer, or a non-positive effective speed, yields a
//! nodata cost pixel.  Every valid cost is therefore finite and positive.
//!
//! # Water
//!
//! The land surface treats open water as impassable.  The water-passable
//! variant fills only the *nodata* pixels of a land surface whose landcover
//! class is the water code with the cost of crossing by boat.  Children are
//! assumed no slower than adults on a boat, so no child impact applies.

use cpa_core::{CpaError, CpaResult, Grid, kmh_to_ms};

/// Landcover class of open water in the reference landcover product.
pub const DEFAULT_WATER_CODE: i64 = 10;

/// Convert a speed grid (km/h) to a cost grid (seconds per pixel).
pub fn speed_to_cost(speed: &Grid, child_impact: f64) -> CpaResult<Grid> {
    check_child_impact(child_impact)?;
    let res_m = speed.transform().resolution_m()?;
    Ok(speed.map(|s| pixel_cost(s? * child_impact, res_m)))
}

/// Merge landcover speed, road speed and slope impact into one cost grid.
///
/// Roads take priority; landcover fills pixels without a road.  All three
/// grids must share one lattice.
pub fn combine(
    landcover_speed: &Grid,
    road_speed:      &Grid,
    slope_impact:    &Grid,
    child_impact:    f64,
) -> CpaResult<Grid> {
    check_child_impact(child_impact)?;
    landcover_speed.ensure_aligned(road_speed, "road speed grid")?;
    landcover_speed.ensure_aligned(slope_impact, "slope impact grid")?;
    let res_m = landcover_speed.transform().resolution_m()?;

    Ok(landcover_speed.derive(|i| {
        let speed = road_speed.value(i).or_else(|| landcover_speed.value(i))?;
        let slope = slope_impact.value(i)?;
        pixel_cost(speed * child_impact * slope, res_m)
    }))
}

/// Water-passable variant of a land cost surface.
///
/// Pixels that already have a land cost keep it; nodata pixels whose
/// landcover class is `water_code` get the boat-crossing cost.
pub fn apply_water_override(
    land_cost:   &Grid,
    landcover:   &Grid,
    water_code:  i64,
    waterspeed:  f64,
) -> CpaResult<Grid> {
    land_cost.ensure_aligned(landcover, "landcover grid")?;
    let res_m = land_cost.transform().resolution_m()?;
    let water_cost = pixel_cost(waterspeed, res_m).ok_or_else(|| {
        CpaError::Config(format!("water speed must be positive, got {waterspeed}"))
    })?;
    let water = water_code as f64;

    let out = land_cost.derive(|i| {
        land_cost
            .value(i)
            .or_else(|| (landcover.value(i) == Some(water)).then_some(water_cost))
    });
    log::debug!(
        "water override: {} passable pixels (land-only {})",
        out.valid_count(),
        land_cost.valid_count()
    );
    Ok(out)
}

/// Seconds to cross one pixel of `res_m` metres at `speed_kmh`, or `None`
/// when the speed cannot produce a positive finite time.
#[inline]
pub fn pixel_cost(speed_kmh: f64, res_m: f64) -> Option<f64> {
    if !(speed_kmh.is_finite() && speed_kmh > 0.0) {
        return None;
    }
    let t = res_m / kmh_to_ms(speed_kmh);
    (t.is_finite() && t > 0.0).then_some(t)
}

fn check_child_impact(child_impact: f64) -> CpaResult<()> {
    if child_impact > 0.0 && child_impact <= 1.0 {
        Ok(())
    } else {
        Err(CpaError::Config(format!(
            "child impact must be in (0, 1], got {child_impact}"
        )))
    }
}
