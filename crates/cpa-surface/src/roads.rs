//! Road network → walking speed grid.
//!
//! # Burn policies
//!
//! Roads of different categories overlap wherever they cross or run
//! side by side within one pixel.  Two policies decide which speed a shared
//! pixel receives:
//!
//! | Policy               | Procedure                                      | Shared pixel gets |
//! |----------------------|------------------------------------------------|-------------------|
//! | [`BurnPolicy::MaxWins`]  | one scratch pass per distinct speed, then a pixel-wise max | fastest road      |
//! | [`BurnPolicy::LastWins`] | categories burned fastest-first, each overwriting          | slowest road      |
//!
//! `MaxWins` is the default and does not depend on feature order.
//! `LastWins` reproduces the older single-pass behaviour and is kept for
//! comparison runs.
//!
//! Features whose category is not in the (reconciled) speed map, and
//! categories with a non-positive speed, are not burned.

use geo::Geometry;

use cpa_core::Grid;

use crate::burn::{BurnMask, burn_geometry};
use crate::speed_map::{CategoryCode, SpeedMap};

// ── Types ─────────────────────────────────────────────────────────────────────

/// One road geometry tagged with its category label.
#[derive(Clone, Debug)]
pub struct RoadFeature {
    pub category: String,
    pub geometry: Geometry<f64>,
}

impl RoadFeature {
    pub fn new(category: impl Into<String>, geometry: impl Into<Geometry<f64>>) -> Self {
        Self { category: category.into(), geometry: geometry.into() }
    }
}

/// How overlapping roads of different speed resolve.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum BurnPolicy {
    /// Categories burned in descending speed order; later burns overwrite.
    LastWins,
    /// Pixel-wise maximum over per-speed passes.
    #[default]
    MaxWins,
}

impl BurnPolicy {
    /// `take_max_road_speed = true` selects [`BurnPolicy::MaxWins`].
    pub fn from_take_max(take_max: bool) -> Self {
        if take_max { BurnPolicy::MaxWins } else { BurnPolicy::LastWins }
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Distinct category labels of a feature layer, in first-seen order.
pub fn layer_categories(features: &[RoadFeature]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    features
        .iter()
        .filter(|f| seen.insert(f.category.as_str()))
        .map(|f| f.category.clone())
        .collect()
}

/// Rasterise `features` onto `template`'s lattice.
///
/// `speeds` must already be reconciled to the layer's labels (see
/// [`SpeedMap::reconcile`]).  Pixels no road touches are nodata; an empty
/// feature list yields an all-nodata grid.
pub fn rasterize_roads(
    features: &[RoadFeature],
    speeds:   &SpeedMap,
    template: &Grid,
    policy:   BurnPolicy,
) -> Grid {
    if features.is_empty() || template.is_empty() {
        return template.nodata_like();
    }

    // Resolve every feature's speed once.
    let burnable: Vec<(f64, &Geometry<f64>)> = features
        .iter()
        .filter_map(|f| {
            let speed = speeds.lookup(&CategoryCode::Text(f.category.clone()))?;
            (speed > 0.0).then_some((speed, &f.geometry))
        })
        .collect();

    log::info!(
        "rasterising {} of {} road features ({:?})",
        burnable.len(),
        features.len(),
        policy
    );

    let mut mask = BurnMask::new(template.width(), template.height());
    let transform = *template.transform();
    let mut burned = vec![f64::NAN; template.len()];

    match policy {
        BurnPolicy::MaxWins => {
            for speed in speeds.distinct_speeds_desc() {
                mask.clear();
                for (_, geom) in burnable.iter().filter(|(s, _)| *s == speed) {
                    burn_geometry(geom, &transform, &mut mask);
                }
                for &i in mask.touched() {
                    // NaN.max(x) == x, so the first burn initialises the pixel.
                    burned[i] = burned[i].max(speed);
                }
            }
        }
        BurnPolicy::LastWins => {
            let mut categories: Vec<(&CategoryCode, f64)> = speeds.iter().collect();
            categories.sort_by(|a, b| b.1.total_cmp(&a.1));
            for (code, speed) in categories {
                let label = code.label();
                mask.clear();
                for f in features.iter().filter(|f| f.category == label) {
                    burn_geometry(&f.geometry, &transform, &mut mask);
                }
                if speed > 0.0 {
                    for &i in mask.touched() {
                        burned[i] = speed;
                    }
                }
            }
        }
    }

    // Unburned pixels are still NaN, which `derive` turns into nodata.
    template.derive(|i| Some(burned[i]))
}
