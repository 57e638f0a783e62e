//! Run configuration.
//!
//! # TOML layout
//!
//! Every key is optional; omitted keys take the defaults below.
//!
//! ```toml
//! [landcover]
//! code_column  = "Code"
//! speed_column = "Walking Speed (km/h)"
//! speed_table  = "landcover_speeds.csv"   # optional
//!
//! [roads]
//! category_column     = "Feature_Class"
//! speed_column        = "Walking_Speed"
//! speed_table         = "road_speeds.csv"  # optional
//! take_max_road_speed = true
//!
//! [walking]
//! child_impact = 0.78
//! waterspeed   = 1.5    # km/h
//! water_code   = 10
//!
//! [locator]
//! seed = 42
//!
//! [report]
//! dir = "out"           # optional; invalid-location CSVs go here
//! ```

use std::io::Read;
use std::path::{Path, PathBuf};

use cpa_surface::{
    BurnPolicy, DEFAULT_CHILD_IMPACT, DEFAULT_WATER_CODE, DEFAULT_WATERSPEED, SpeedMap,
    load_speed_table_csv, load_speed_table_reader,
};
use serde::Deserialize;

use crate::{RunError, RunResult};

// ── Sections ──────────────────────────────────────────────────────────────────

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LandcoverConfig {
    pub code_column:  String,
    pub speed_column: String,
    pub speed_table:  Option<PathBuf>,
}

impl Default for LandcoverConfig {
    fn default() -> Self {
        Self {
            code_column:  "Code".to_string(),
            speed_column: "Walking Speed (km/h)".to_string(),
            speed_table:  None,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct RoadsConfig {
    pub category_column:     String,
    pub speed_column:        String,
    pub speed_table:         Option<PathBuf>,
    /// `true` → fastest road wins a shared pixel; `false` → slowest.
    pub take_max_road_speed: bool,
}

impl Default for RoadsConfig {
    fn default() -> Self {
        Self {
            category_column:     "Feature_Class".to_string(),
            speed_column:        "Walking_Speed".to_string(),
            speed_table:         None,
            take_max_road_speed: true,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct WalkingConfig {
    pub child_impact: f64,
    /// Boat speed over open water, km/h.
    pub waterspeed:   f64,
    pub water_code:   i64,
}

impl Default for WalkingConfig {
    fn default() -> Self {
        Self {
            child_impact: DEFAULT_CHILD_IMPACT,
            waterspeed:   DEFAULT_WATERSPEED,
            water_code:   DEFAULT_WATER_CODE,
        }
    }
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct LocatorConfig {
    pub seed: u64,
}

impl Default for LocatorConfig {
    fn default() -> Self {
        Self { seed: 42 }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportConfig {
    pub dir: Option<PathBuf>,
}

// ── RunConfig ─────────────────────────────────────────────────────────────────

/// Top-level run configuration.
#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct RunConfig {
    pub landcover: LandcoverConfig,
    pub roads:     RoadsConfig,
    pub walking:   WalkingConfig,
    pub locator:   LocatorConfig,
    pub report:    ReportConfig,
}

impl RunConfig {
    /// Parse and validate a TOML document.
    pub fn from_toml_str(s: &str) -> RunResult<Self> {
        let config: RunConfig = toml::from_str(s)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file.
    pub fn from_toml_file(path: &Path) -> RunResult<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut config = Self::from_toml_str(&text)?;
        // Relative table paths are relative to the config file.
        if let Some(base) = path.parent() {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Range checks that deserialisation cannot express.
    pub fn validate(&self) -> RunResult<()> {
        let w = &self.walking;
        if !(w.child_impact > 0.0 && w.child_impact <= 1.0) {
            return Err(RunError::Config(format!(
                "walking.child_impact must be in (0, 1], got {}",
                w.child_impact
            )));
        }
        if !(w.waterspeed.is_finite() && w.waterspeed > 0.0) {
            return Err(RunError::Config(format!(
                "walking.waterspeed must be positive, got {}",
                w.waterspeed
            )));
        }
        for (key, value) in [
            ("landcover.code_column", &self.landcover.code_column),
            ("landcover.speed_column", &self.landcover.speed_column),
            ("roads.category_column", &self.roads.category_column),
            ("roads.speed_column", &self.roads.speed_column),
        ] {
            if value.trim().is_empty() {
                return Err(RunError::Config(format!("{key} must not be empty")));
            }
        }
        Ok(())
    }

    pub fn road_policy(&self) -> BurnPolicy {
        BurnPolicy::from_take_max(self.roads.take_max_road_speed)
    }

    // ── Speed tables ──────────────────────────────────────────────────────

    pub fn landcover_speeds_from_reader<R: Read>(&self, reader: R) -> RunResult<SpeedMap> {
        let lc = &self.landcover;
        Ok(load_speed_table_reader(reader, &lc.code_column, &lc.speed_column)?)
    }

    pub fn road_speeds_from_reader<R: Read>(&self, reader: R) -> RunResult<SpeedMap> {
        let r = &self.roads;
        Ok(load_speed_table_reader(reader, &r.category_column, &r.speed_column)?)
    }

    /// Load `landcover.speed_table`; a config error if the key is unset.
    pub fn load_landcover_speeds(&self) -> RunResult<SpeedMap> {
        let lc = &self.landcover;
        let path = lc.speed_table.as_deref().ok_or_else(|| {
            RunError::Config("landcover.speed_table is not set".to_string())
        })?;
        Ok(load_speed_table_csv(path, &lc.code_column, &lc.speed_column)?)
    }

    /// Load `roads.speed_table`, or `None` if the key is unset.
    pub fn load_road_speeds(&self) -> RunResult<Option<SpeedMap>> {
        let r = &self.roads;
        match r.speed_table.as_deref() {
            Some(path) => Ok(Some(load_speed_table_csv(path, &r.category_column, &r.speed_column)?)),
            None => Ok(None),
        }
    }

    fn resolve_paths(&mut self, base: &Path) {
        for p in [
            &mut self.landcover.speed_table,
            &mut self.roads.speed_table,
            &mut self.report.dir,
        ]
        .into_iter()
        .flatten()
        {
            if p.is_relative() {
                *p = base.join(&*p);
            }
        }
    }
}
