//! Two-variant accessibility run.
//!
//! # Stages
//!
//! ```text
//! ① Surfaces — CostSurfaceBuilder → land-only + water-passable cost grids
//! ② Locate   — destinations snapped separately onto each surface
//!              (independent child RNG per variant)
//! ③ Distance — one multi-source expansion per surface
//!              (concurrently with the `parallel` feature)
//! ④ Merge    — land-only result where valid, else water-passable
//! ```

use std::fmt;

use cpa_access::{
    CostDistanceEngine, CostField, Destination, DijkstraEngine, Located, invalid_locations, locate,
    merge, start_cells,
};
use cpa_core::{AccessRng, Grid};
use cpa_surface::{CostSurfaceBuilder, RoadFeature, SpeedMap};

use crate::{RunConfig, RunResult};

// ── Variants ──────────────────────────────────────────────────────────────────

/// Which cost surface a result belongs to.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum SurfaceVariant {
    LandOnly,
    WaterPassable,
}

impl SurfaceVariant {
    pub const ALL: [SurfaceVariant; 2] = [SurfaceVariant::LandOnly, SurfaceVariant::WaterPassable];

    pub fn as_str(self) -> &'static str {
        match self {
            SurfaceVariant::LandOnly      => "land_only",
            SurfaceVariant::WaterPassable => "water_passable",
        }
    }

    /// Child RNG stream of this variant.
    fn rng_offset(self) -> u64 {
        match self {
            SurfaceVariant::LandOnly      => 0,
            SurfaceVariant::WaterPassable => 1,
        }
    }
}

impl fmt::Display for SurfaceVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Everything computed for one surface variant.
#[derive(Clone, Debug)]
pub struct VariantResult {
    pub variant: SurfaceVariant,
    /// Per-pixel traversal cost (seconds).
    pub cost:    Grid,
    pub located: Vec<Located>,
    pub field:   CostField,
}

impl VariantResult {
    /// Cumulative cost from the nearest destination.
    pub fn accessibility(&self) -> &Grid {
        self.field.accumulated()
    }

    pub fn invalid(&self) -> Vec<&Located> {
        invalid_locations(&self.located).collect()
    }
}

/// Output of [`AccessibilityRun::run`].
#[derive(Clone, Debug)]
pub struct AccessibilityOutput {
    pub land_only:      VariantResult,
    pub water_passable: VariantResult,
    /// Merged accessibility (seconds), nodata where neither surface reaches.
    pub accessibility:  Grid,
}

impl AccessibilityOutput {
    pub fn variant(&self, v: SurfaceVariant) -> &VariantResult {
        match v {
            SurfaceVariant::LandOnly      => &self.land_only,
            SurfaceVariant::WaterPassable => &self.water_passable,
        }
    }
}

// ── AccessibilityRun ──────────────────────────────────────────────────────────

/// Fluent builder and driver for a full run.
///
/// # Required inputs
///
/// - [`RunConfig`]
/// - landcover class grid and its speed map
///
/// # Optional inputs (have defaults)
///
/// | Method             | Default                          |
/// |--------------------|----------------------------------|
/// | `.roads(f, map)`   | No roads                         |
/// | `.dem(g)`          | Flat terrain                     |
/// | `.engine(e)`       | [`DijkstraEngine`]               |
///
/// # Example
///
/// ```rust,ignore
/// let out = AccessibilityRun::new(&config, &landcover, &lc_speeds)
///     .roads(&roads, &road_speeds)
///     .dem(&dem)
///     .run(&destinations)?;
/// ```
pub struct AccessibilityRun<'a> {
    config:    &'a RunConfig,
    landcover: &'a Grid,
    lc_speeds: &'a SpeedMap,
    roads:     Option<(&'a [RoadFeature], &'a SpeedMap)>,
    dem:       Option<&'a Grid>,
    engine:    &'a dyn CostDistanceEngine,
}

impl<'a> AccessibilityRun<'a> {
    pub fn new(config: &'a RunConfig, landcover: &'a Grid, lc_speeds: &'a SpeedMap) -> Self {
        Self {
            config,
            landcover,
            lc_speeds,
            roads:  None,
            dem:    None,
            engine: &DijkstraEngine,
        }
    }

    pub fn roads(mut self, features: &'a [RoadFeature], speeds: &'a SpeedMap) -> Self {
        self.roads = Some((features, speeds));
        self
    }

    pub fn dem(mut self, dem: &'a Grid) -> Self {
        self.dem = Some(dem);
        self
    }

    pub fn engine(mut self, engine: &'a dyn CostDistanceEngine) -> Self {
        self.engine = engine;
        self
    }

    /// Run every stage for `destinations`.
    pub fn run(self, destinations: &[Destination]) -> RunResult<AccessibilityOutput> {
        let cfg = self.config;
        cfg.validate()?;

        // ── ① Surfaces ────────────────────────────────────────────────────
        let mut builder = CostSurfaceBuilder::new(self.landcover, self.lc_speeds)
            .road_policy(cfg.road_policy())
            .child_impact(cfg.walking.child_impact)
            .water(cfg.walking.water_code, cfg.walking.waterspeed);
        if let Some((features, speeds)) = self.roads {
            builder = builder.roads(features, speeds);
        }
        if let Some(dem) = self.dem {
            builder = builder.dem(dem);
        }
        let surfaces = builder.build()?;

        // ── ② + ③ Locate and expand, per variant ──────────────────────────
        let mut root = AccessRng::new(cfg.locator.seed);
        let land_rng  = root.child(SurfaceVariant::LandOnly.rng_offset());
        let water_rng = root.child(SurfaceVariant::WaterPassable.rng_offset());
        let engine = self.engine;

        let land_job  = (SurfaceVariant::LandOnly, surfaces.land_only, land_rng);
        let water_job = (SurfaceVariant::WaterPassable, surfaces.water_passable, water_rng);

        #[cfg(feature = "parallel")]
        let (land_only, water_passable) = rayon::join(
            || solve_variant(land_job, destinations, engine),
            || solve_variant(water_job, destinations, engine),
        );
        #[cfg(not(feature = "parallel"))]
        let (land_only, water_passable) = (
            solve_variant(land_job, destinations, engine),
            solve_variant(water_job, destinations, engine),
        );

        // ── ④ Merge ───────────────────────────────────────────────────────
        let accessibility = merge(land_only.accessibility(), water_passable.accessibility())?;

        Ok(AccessibilityOutput { land_only, water_passable, accessibility })
    }
}

fn solve_variant(
    (variant, cost, mut rng): (SurfaceVariant, Grid, AccessRng),
    destinations: &[Destination],
    engine: &dyn CostDistanceEngine,
) -> VariantResult {
    log::info!("{variant}: locating {} destinations", destinations.len());
    let located = locate(destinations, &cost, &mut rng);
    let starts = start_cells(&located);
    log::info!("{variant}: computing least-cost distance from {} start cells", starts.len());
    let field = engine.cost_distance(&cost, &starts);
    VariantResult { variant, cost, located, field }
}
