//! Synthetic landscape shared by the demo.
//!
//! A 60 × 40 grid of 30 m pixels in a projected (metre) system:
//!
//! ```text
//!   trees everywhere, a grassland band across the south,
//!   a lake in the north-east, a ridge running north–south near x = 20,
//!   a primary road east–west, a track north–south, a market square
//! ```

use cpa_access::Destination;
use cpa_core::{CpaResult, Grid, GridTransform, LinearUnit};
use cpa_surface::RoadFeature;
use geo::{LineString, Rect, coord};

pub const WIDTH:  usize = 60;
pub const HEIGHT: usize = 40;
pub const RES_M:  f64   = 30.0;

const ORIGIN_X: f64 = 500_000.0;
const ORIGIN_Y: f64 = 100_000.0;

// Landcover classes.
const TREES:     f64 = 1.0;
const GRASSLAND: f64 = 2.0;
const WETLAND:   f64 = 11.0;
const WATER:     f64 = 10.0;

pub fn transform() -> GridTransform {
    GridTransform::new(ORIGIN_X, ORIGIN_Y, RES_M, -RES_M, LinearUnit::Metre)
}

/// World coordinate of the center of pixel (row, col).
pub fn world(row: usize, col: usize) -> (f64, f64) {
    (
        ORIGIN_X + (col as f64 + 0.5) * RES_M,
        ORIGIN_Y - (row as f64 + 0.5) * RES_M,
    )
}

pub fn landcover() -> CpaResult<Grid> {
    let mut values = Vec::with_capacity(WIDTH * HEIGHT);
    for row in 0..HEIGHT {
        for col in 0..WIDTH {
            // Ellipse centered at (10, 45).
            let dr = (row as f64 - 10.0) / 7.0;
            let dc = (col as f64 - 45.0) / 10.0;
            let class = if dr * dr + dc * dc <= 1.0 {
                WATER
            } else if dr * dr + dc * dc <= 1.3 {
                WETLAND
            } else if row >= 30 {
                GRASSLAND
            } else {
                TREES
            };
            values.push(class);
        }
    }
    Grid::new(WIDTH, HEIGHT, transform(), f64::NAN, values)
}

/// Elevation in metres: a Gaussian ridge along column 20 plus a gentle
/// southward tilt.  The ridge flanks are too steep to walk.
pub fn dem() -> CpaResult<Grid> {
    let mut values = Vec::with_capacity(WIDTH * HEIGHT);
    for row in 0..HEIGHT {
        for col in 0..WIDTH {
            let d = (col as f64 - 20.0) / 2.0;
            let ridge = 90.0 * (-d * d).exp();
            let tilt = 0.5 * row as f64;
            values.push(200.0 + ridge - tilt);
        }
    }
    Grid::new(WIDTH, HEIGHT, transform(), f64::NAN, values)
}

pub fn roads() -> Vec<RoadFeature> {
    let line = |a: (usize, usize), b: (usize, usize)| LineString::from(vec![world(a.0, a.1), world(b.0, b.1)]);
    let (x0, y0) = world(26, 30);
    let (x1, y1) = world(29, 34);
    vec![
        RoadFeature::new("Primary Road", line((25, 0), (25, WIDTH - 1))),
        RoadFeature::new("Track", line((0, 8), (HEIGHT - 1, 8))),
        RoadFeature::new("Track", line((25, 40), (5, 58))),
        RoadFeature::new("Footpath", Rect::new(coord! { x: x0, y: y0 }, coord! { x: x1, y: y1 })),
    ]
}

pub fn destinations() -> Vec<Destination> {
    let at = |id: &str, row: usize, col: usize| {
        let (x, y) = world(row, col);
        Destination::new(id, x, y)
    };
    vec![
        at("clinic-west", 20, 4),
        at("clinic-market", 27, 32),
        at("clinic-island", 10, 45),
        Destination::new("clinic-outside", ORIGIN_X - 500.0, ORIGIN_Y),
    ]
}
