//! Terrain slope and its effect on walking speed.
//!
//! # Model
//!
//! Walking speed relative to slope follows Irmischer & Clarke (2018), eq. 4:
//!
//! ```text
//! f(s) = 0.11 + exp(-(s + 5)² / (2 · 30²))        s = slope in percent
//! ```
//!
//! A pixel is crossed both uphill and downhill over a round trip, so the
//! impact is the mean of `f(+s)` and `f(-s)`, relative to flat ground:
//!
//! ```text
//! impact(s) = ½ (f(s) + f(-s)) / f(0)
//! ```
//!
//! Slopes of 100 % (45°) and above are impassable and become nodata.
//!
//! # Units
//!
//! Gradients are taken against pixel spacing in metres, so a degree-based DEM
//! is scaled by `METRES_PER_DEGREE` and a metre-based DEM is used as is.  A
//! DEM with an unknown linear unit is rejected.
//!
//! Reference: Irmischer, I. J. & Clarke, K. C. (2018). Measuring and modeling
//! the speed of human navigation. *Cartography and Geographic Information
//! Science* 45(2). <https://doi.org/10.1080/15230406.2017.1292150>

use cpa_core::{Cell, CpaResult, Grid};

/// Slope (percent) at and above which terrain is impassable.
pub const IMPASSABLE_SLOPE_PCT: f64 = 100.0;

/// Irmischer–Clarke relative walking speed for a slope in percent.
#[inline]
pub fn walking_speed_factor(slope_pct: f64) -> f64 {
    0.11 + (-(slope_pct + 5.0).powi(2) / (2.0 * 30.0f64.powi(2))).exp()
}

/// Round-trip speed multiplier for a slope, relative to flat ground.
#[inline]
pub fn round_trip_factor(slope_pct: f64) -> f64 {
    0.5 * (walking_speed_factor(slope_pct) + walking_speed_factor(-slope_pct))
        / walking_speed_factor(0.0)
}

/// Percentage slope of an elevation grid.
///
/// Uses central differences in the interior and one-sided differences on the
/// edges; an axis only one pixel long contributes no gradient.  Pixels that
/// are nodata, or whose difference stencil touches nodata, are nodata.
pub fn percentage_slope(dem: &Grid) -> CpaResult<Grid> {
    let (sx, sy) = dem.transform().spacing_m()?;
    let (w, h) = (dem.width(), dem.height());

    Ok(dem.derive(|i| {
        let Cell { row, col } = dem.cell(i);
        dem.value(i)?;
        let dzdx = derivative(|c| dem.get(Cell::new(row, c)), col, w, sx)?;
        let dzdy = derivative(|r| dem.get(Cell::new(r, col)), row, h, sy)?;
        Some((dzdx * dzdx + dzdy * dzdy).sqrt() * 100.0)
    }))
}

/// Speed multiplier in `(0, 1]` from an elevation grid, nodata where the
/// slope is impassable or unknown.
pub fn slope_impact(dem: &Grid) -> CpaResult<Grid> {
    let slope = percentage_slope(dem)?;
    Ok(slope.map(|s| {
        let s = s?;
        (s < IMPASSABLE_SLOPE_PCT).then(|| round_trip_factor(s))
    }))
}

/// Derivative along one axis at `pos`, for an axis of length `n` with
/// sample spacing `spacing` metres.
fn derivative(at: impl Fn(usize) -> Option<f64>, pos: usize, n: usize, spacing: f64) -> Option<f64> {
    if n < 2 {
        return Some(0.0);
    }
    if pos == 0 {
        Some((at(1)? - at(0)?) / spacing)
    } else if pos == n - 1 {
        Some((at(n - 1)? - at(n - 2)?) / spacing)
    } else {
        Some((at(pos + 1)? - at(pos - 1)?) / (2.0 * spacing))
    }
}
