//! Tests for cpa-run.

#[cfg(test)]
mod helpers {
    use cpa_access::Destination;
    use cpa_core::{Grid, GridTransform, LinearUnit};
    use cpa_surface::{CategoryCode, SpeedMap};

    /// 5 × 3 landcover of 1 m pixels: grass (2) with a water column (10)
    /// down the middle.
    pub fn lake_landcover() -> Grid {
        let t = GridTransform::new(0.0, 3.0, 1.0, -1.0, LinearUnit::Metre);
        let row = [2.0, 2.0, 10.0, 2.0, 2.0];
        Grid::new(5, 3, t, f64::NAN, row.repeat(3)).unwrap()
    }

    pub fn lc_speeds() -> SpeedMap {
        SpeedMap::build([
            (CategoryCode::Int(2), Some(2.5)),
            (CategoryCode::Int(10), None),
        ])
        .unwrap()
    }

    /// Destination at the center of cell (r, c) of a 3-row grid.
    pub fn at(id: &str, r: usize, c: usize) -> Destination {
        Destination::new(id, c as f64 + 0.5, 3.0 - r as f64 - 0.5)
    }
}

// ── Configuration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod config {
    use std::io::Cursor;

    use cpa_surface::{BurnPolicy, CategoryCode};

    use crate::{RunConfig, RunError};

    #[test]
    fn empty_document_gives_defaults() {
        let c = RunConfig::from_toml_str("").unwrap();
        assert_eq!(c, RunConfig::default());
        assert_eq!(c.landcover.code_column, "Code");
        assert_eq!(c.landcover.speed_column, "Walking Speed (km/h)");
        assert_eq!(c.roads.category_column, "Feature_Class");
        assert_eq!(c.roads.speed_column, "Walking_Speed");
        assert!(c.roads.take_max_road_speed);
        assert_eq!(c.walking.child_impact, 0.78);
        assert_eq!(c.walking.waterspeed, 1.5);
        assert_eq!(c.walking.water_code, 10);
        assert_eq!(c.locator.seed, 42);
        assert!(c.report.dir.is_none());
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let c = RunConfig::from_toml_str(
            "[walking]\nchild_impact = 0.5\n\n[roads]\ntake_max_road_speed = false\n",
        )
        .unwrap();
        assert_eq!(c.walking.child_impact, 0.5);
        assert_eq!(c.walking.waterspeed, 1.5);
        assert_eq!(c.road_policy(), BurnPolicy::LastWins);
        assert_eq!(c.roads.speed_column, "Walking_Speed");
    }

    #[test]
    fn out_of_range_values_rejected() {
        for doc in [
            "[walking]\nchild_impact = 0.0\n",
            "[walking]\nchild_impact = 1.2\n",
            "[walking]\nwaterspeed = 0.0\n",
            "[landcover]\ncode_column = \" \"\n",
        ] {
            let err = RunConfig::from_toml_str(doc).unwrap_err();
            assert!(matches!(err, RunError::Config(_)), "{doc}: {err}");
        }
    }

    #[test]
    fn malformed_toml_rejected() {
        assert!(matches!(RunConfig::from_toml_str("[walking"), Err(RunError::Toml(_))));
        assert!(matches!(
            RunConfig::from_toml_str("[locator]\nseed = \"many\"\n"),
            Err(RunError::Toml(_))
        ));
    }

    #[test]
    fn speed_tables_use_configured_columns() {
        let c = RunConfig::from_toml_str("[roads]\ncategory_column = \"highway\"\nspeed_column = \"kmh\"\n")
            .unwrap();
        let roads = c
            .road_speeds_from_reader(Cursor::new("highway,kmh\nprimary,5\ntrack,3\n"))
            .unwrap();
        assert_eq!(roads.lookup(&CategoryCode::from("track")), Some(3.0));

        let lc = c
            .landcover_speeds_from_reader(Cursor::new("Code,Walking Speed (km/h)\n2,2.5\n"))
            .unwrap();
        assert_eq!(lc.lookup(&CategoryCode::Int(2)), Some(2.5));
    }

    #[test]
    fn unset_table_paths() {
        let c = RunConfig::default();
        assert!(matches!(c.load_landcover_speeds(), Err(RunError::Config(_))));
        assert!(c.load_road_speeds().unwrap().is_none());
    }

    #[test]
    fn file_paths_resolve_against_config_dir() {
        let dir = tempfile::tempdir().expect("create temp dir");
        std::fs::write(dir.path().join("lc.csv"), "Code,Walking Speed (km/h)\n1,1.6\n2,2.5\n").unwrap();
        std::fs::write(
            dir.path().join("run.toml"),
            "[landcover]\nspeed_table = \"lc.csv\"\n\n[report]\ndir = \"out\"\n",
        )
        .unwrap();

        let c = RunConfig::from_toml_file(&dir.path().join("run.toml")).unwrap();
        assert_eq!(c.report.dir.as_deref(), Some(dir.path().join("out").as_path()));
        let lc = c.load_landcover_speeds().unwrap();
        assert_eq!(lc.len(), 2);
    }

    #[test]
    fn missing_config_file_is_io_error() {
        let err = RunConfig::from_toml_file(std::path::Path::new("/nonexistent/run.toml")).unwrap_err();
        assert!(matches!(err, RunError::Io(_)));
    }
}

// ── Orchestration ─────────────────────────────────────────────────────────────

#[cfg(test)]
mod run {
    use cpa_access::{InvalidReason, LocateStatus};
    use cpa_core::Cell;
    use cpa_surface::{CategoryCode, RoadFeature, SpeedMap, pixel_cost};
    use geo::LineString;

    use super::helpers::{at, lake_landcover, lc_speeds};
    use crate::{AccessibilityRun, RunConfig, RunError, SurfaceVariant};

    #[test]
    fn lake_blocks_land_but_not_water_surface() {
        let lc = lake_landcover();
        let speeds = lc_speeds();
        let config = RunConfig::default();
        let out = AccessibilityRun::new(&config, &lc, &speeds)
            .run(&[at("clinic", 1, 0)])
            .unwrap();

        let land = out.land_only.accessibility();
        let water = out.water_passable.accessibility();
        assert_eq!(land.get(Cell::new(1, 0)), Some(0.0));
        assert!(land.get(Cell::new(1, 1)).is_some());
        assert_eq!(land.get(Cell::new(1, 3)), None);
        assert!(water.get(Cell::new(1, 4)).is_some());

        let merged = &out.accessibility;
        assert_eq!(merged.valid_count(), 15);
        assert_eq!(merged.get(Cell::new(1, 1)), land.get(Cell::new(1, 1)));
        assert_eq!(merged.get(Cell::new(1, 4)), water.get(Cell::new(1, 4)));
    }

    #[test]
    fn grass_cost_includes_child_impact() {
        let lc = lake_landcover();
        let speeds = lc_speeds();
        let config = RunConfig::default();
        let out = AccessibilityRun::new(&config, &lc, &speeds).run(&[at("a", 1, 0)]).unwrap();
        let expected = pixel_cost(2.5 * 0.78, 1.0).unwrap();
        let got = out.land_only.cost.get(Cell::new(0, 0)).unwrap();
        assert!((got - expected).abs() < 1e-9);
        // Orthogonal step between two grass cells costs one pixel.
        let step = out.land_only.accessibility().get(Cell::new(1, 1)).unwrap();
        assert!((step - expected).abs() < 1e-9);
    }

    #[test]
    fn destinations_classified_per_variant() {
        let lc = lake_landcover();
        let speeds = lc_speeds();
        let config = RunConfig::default();
        let dests = [at("ok", 0, 0), at("lake", 1, 2), cpa_access::Destination::new("far", 99.0, 99.0)];
        let out = AccessibilityRun::new(&config, &lc, &speeds).run(&dests).unwrap();

        let land = &out.land_only.located;
        assert_eq!(land[0].status, LocateStatus::Valid);
        assert_eq!(land[1].status, LocateStatus::Moved);
        assert_eq!(land[2].status, LocateStatus::Invalid(InvalidReason::OutsideExtent));

        let water = &out.water_passable.located;
        assert_eq!(water[1].status, LocateStatus::Valid);
        assert_eq!(out.variant(SurfaceVariant::WaterPassable).invalid().len(), 1);
    }

    #[test]
    fn fixed_seed_reproduces_moves() {
        let lc = lake_landcover();
        let speeds = lc_speeds();
        let config = RunConfig::default();
        let dests = [at("lake", 1, 2)];
        let a = AccessibilityRun::new(&config, &lc, &speeds).run(&dests).unwrap();
        let b = AccessibilityRun::new(&config, &lc, &speeds).run(&dests).unwrap();
        assert_eq!(a.land_only.located[0].cell, b.land_only.located[0].cell);
        for i in 0..a.accessibility.len() {
            assert_eq!(a.accessibility.value(i), b.accessibility.value(i));
        }
    }

    #[test]
    fn road_bridges_the_lake() {
        let lc = lake_landcover();
        let speeds = lc_speeds();
        let road_speeds = SpeedMap::build([(CategoryCode::from("Bridge"), Some(5.0))]).unwrap();
        let roads = vec![RoadFeature::new("bridge", LineString::from(vec![(0.5, 1.5), (4.5, 1.5)]))];
        let config = RunConfig::default();
        let out = AccessibilityRun::new(&config, &lc, &speeds)
            .roads(&roads, &road_speeds)
            .run(&[at("clinic", 1, 0)])
            .unwrap();
        assert!(out.land_only.accessibility().get(Cell::new(1, 4)).is_some());
        assert!(out.land_only.accessibility().get(Cell::new(0, 4)).is_some());
    }

    #[test]
    fn invalid_config_aborts_run() {
        let lc = lake_landcover();
        let speeds = lc_speeds();
        let mut config = RunConfig::default();
        config.walking.child_impact = 2.0;
        let err = AccessibilityRun::new(&config, &lc, &speeds).run(&[]).unwrap_err();
        assert!(matches!(err, RunError::Config(_)));
    }

    #[test]
    fn no_destinations_gives_all_nodata() {
        let lc = lake_landcover();
        let speeds = lc_speeds();
        let config = RunConfig::default();
        let out = AccessibilityRun::new(&config, &lc, &speeds).run(&[]).unwrap();
        assert_eq!(out.accessibility.valid_count(), 0);
    }
}

// ── Reports ───────────────────────────────────────────────────────────────────

#[cfg(test)]
mod report {
    use cpa_access::Destination;

    use super::helpers::{at, lake_landcover, lc_speeds};
    use crate::{AccessibilityRun, InvalidLocationWriter, RunConfig, SurfaceVariant, report_file_name, write_invalid_reports};

    #[test]
    fn file_names_per_variant() {
        assert_eq!(report_file_name(SurfaceVariant::LandOnly), "invalid_locations_land_only.csv");
        assert_eq!(
            report_file_name(SurfaceVariant::WaterPassable),
            "invalid_locations_water_passable.csv"
        );
    }

    #[test]
    fn reports_written_for_both_variants() {
        let lc = lake_landcover();
        let speeds = lc_speeds();
        let config = RunConfig::default();
        let dests = [at("ok", 0, 0), Destination::new("far", -5.0, 1.0)];
        let out = AccessibilityRun::new(&config, &lc, &speeds).run(&dests).unwrap();

        let dir = tempfile::tempdir().expect("create temp dir");
        let paths = write_invalid_reports(&dir.path().join("reports"), &out).unwrap();
        assert_eq!(paths.len(), 2);

        for path in &paths {
            let mut rdr = csv::Reader::from_path(path).unwrap();
            let headers: Vec<_> = rdr.headers().unwrap().iter().map(str::to_owned).collect();
            assert_eq!(headers, ["id", "x", "y", "reason"]);
            let rows: Vec<_> = rdr.records().map(|r| r.unwrap()).collect();
            assert_eq!(rows.len(), 1);
            assert_eq!(&rows[0][0], "far");
            assert_eq!(&rows[0][1], "-5");
            assert_eq!(&rows[0][3], "outside_extent");
        }
    }

    #[test]
    fn writer_skips_placed_destinations() {
        let lc = lake_landcover();
        let speeds = lc_speeds();
        let config = RunConfig::default();
        let out = AccessibilityRun::new(&config, &lc, &speeds).run(&[at("ok", 0, 0)]).unwrap();

        let mut w = InvalidLocationWriter::from_writer(Vec::new()).unwrap();
        w.write_all(&out.land_only.located).unwrap();
        w.finish().unwrap();
        w.finish().unwrap();
        assert_eq!(w.rows_written(), 0);
    }
}
