//! Fluent builder for the land-only and water-passable cost surfaces.

use cpa_core::{CpaResult, Grid};

use crate::combine::{DEFAULT_WATER_CODE, apply_water_override, combine};
use crate::landcover::apply_landcover;
use crate::roads::{BurnPolicy, RoadFeature, layer_categories, rasterize_roads};
use crate::slope::slope_impact;
use crate::speed_map::SpeedMap;

/// Default reduction of adult walking speed when walking with children.
pub const DEFAULT_CHILD_IMPACT: f64 = 0.78;

/// Default boat speed (km/h) used for the water-passable surface.
pub const DEFAULT_WATERSPEED: f64 = 1.5;

/// The two cost surfaces of a run.
#[derive(Clone, Debug)]
pub struct CostSurfaces {
    /// Open water impassable.
    pub land_only:      Grid,
    /// Open water crossable by boat where land has no cost.
    pub water_passable: Grid,
}

/// Fluent builder for [`CostSurfaces`].
///
/// # Required inputs
///
/// - the landcover class grid, whose lattice every other raster must share
/// - the landcover speed map
///
/// # Optional inputs (have defaults)
///
/// | Method               | Default                               |
/// |----------------------|---------------------------------------|
/// | `.roads(f, map)`     | No roads (landcover speeds only)      |
/// | `.road_policy(p)`    | [`BurnPolicy::MaxWins`]               |
/// | `.dem(g)`            | Flat terrain (slope impact 1)         |
/// | `.child_impact(x)`   | [`DEFAULT_CHILD_IMPACT`]              |
/// | `.water(code, kmh)`  | [`DEFAULT_WATER_CODE`], [`DEFAULT_WATERSPEED`] |
///
/// # Example
///
/// ```rust,ignore
/// let surfaces = CostSurfaceBuilder::new(&landcover, &lc_speeds)
///     .roads(&roads, &road_speeds)
///     .dem(&dem)
///     .build()?;
/// ```
pub struct CostSurfaceBuilder<'a> {
    landcover:    &'a Grid,
    lc_speeds:    &'a SpeedMap,
    roads:        Option<(&'a [RoadFeature], &'a SpeedMap)>,
    policy:       BurnPolicy,
    dem:          Option<&'a Grid>,
    child_impact: f64,
    water_code:   i64,
    waterspeed:   f64,
}

impl<'a> CostSurfaceBuilder<'a> {
    pub fn new(landcover: &'a Grid, lc_speeds: &'a SpeedMap) -> Self {
        Self {
            landcover,
            lc_speeds,
            roads:        None,
            policy:       BurnPolicy::default(),
            dem:          None,
            child_impact: DEFAULT_CHILD_IMPACT,
            water_code:   DEFAULT_WATER_CODE,
            waterspeed:   DEFAULT_WATERSPEED,
        }
    }

    /// Road features and the reference (unreconciled) road speed table.
    pub fn roads(mut self, features: &'a [RoadFeature], speeds: &'a SpeedMap) -> Self {
        self.roads = Some((features, speeds));
        self
    }

    pub fn road_policy(mut self, policy: BurnPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Elevation grid, already resampled onto the landcover lattice.
    pub fn dem(mut self, dem: &'a Grid) -> Self {
        self.dem = Some(dem);
        self
    }

    pub fn child_impact(mut self, child_impact: f64) -> Self {
        self.child_impact = child_impact;
        self
    }

    pub fn water(mut self, water_code: i64, waterspeed_kmh: f64) -> Self {
        self.water_code = water_code;
        self.waterspeed = waterspeed_kmh;
        self
    }

    /// Run every compositor stage and return both surfaces.
    pub fn build(self) -> CpaResult<CostSurfaces> {
        let lc = self.landcover;
        // Fail fast on an untagged lattice before any work is done.
        lc.transform().resolution_m()?;

        log::info!("constructing landcover speed surface");
        let lc_speed = apply_landcover(lc, self.lc_speeds);

        log::info!("constructing road speed surface");
        let road_speed = match self.roads {
            Some((features, table)) if !features.is_empty() => {
                let reconciled = table.reconcile(&layer_categories(features))?;
                rasterize_roads(features, &reconciled, lc, self.policy)
            }
            _ => lc.nodata_like(),
        };

        let impact = match self.dem {
            Some(dem) => {
                lc.ensure_aligned(dem, "DEM")?;
                log::info!("computing slope impact");
                slope_impact(dem)?
            }
            None => Grid::filled(lc.width(), lc.height(), *lc.transform(), 1.0),
        };

        log::info!("constructing cost surface");
        let land_only = combine(&lc_speed, &road_speed, &impact, self.child_impact)?;

        log::info!("constructing water cost surface");
        let water_passable = apply_water_override(&land_only, lc, self.water_code, self.waterspeed)?;

        Ok(CostSurfaces { land_only, water_passable })
    }
}
