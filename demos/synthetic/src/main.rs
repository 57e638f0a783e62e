//! synthetic — end-to-end accessibility run on a generated landscape.
//!
//! Builds a 60 × 40 landscape of 30 m pixels (trees, grassland, a lake, a
//! ridge, a few roads), places four clinics, and computes walking time to
//! the nearest clinic on the land-only and water-passable surfaces.
//!
//! ```text
//! cargo run -p synthetic --release [-- run.toml]
//! RUST_LOG=debug cargo run -p synthetic      # per-stage and per-category logs
//! ```

mod landscape;

use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Instant;

use anyhow::Result;
use tracing_subscriber::EnvFilter;

use cpa_access::{LocateStatus, least_cost_route};
use cpa_core::{Cell, Grid};
use cpa_run::{AccessibilityRun, RunConfig, SurfaceVariant, write_invalid_reports};

// ── Embedded inputs ───────────────────────────────────────────────────────────

const LANDCOVER_SPEEDS_CSV: &str = "\
Code,Landcover,Walking Speed (km/h)\n\
1,Trees,1.6\n\
2,Grassland,2.5\n\
10,Open water,\n\
11,Wetland,\n\
";

const ROAD_SPEEDS_CSV: &str = "\
Feature_Class,Walking_Speed\n\
primary,5.0\n\
track,3.5\n\
footpath,4.0\n\
";

const DEFAULT_CONFIG: &str = "\
[walking]\n\
child_impact = 0.78\n\
waterspeed   = 1.5\n\
\n\
[locator]\n\
seed = 42\n\
\n\
[report]\n\
dir = \"output/synthetic\"\n\
";

// ── main ──────────────────────────────────────────────────────────────────────

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    println!("=== synthetic — cpa accessibility ===");

    // 1. Configuration: a TOML path on the command line, else the default.
    let config = match std::env::args().nth(1) {
        Some(path) => RunConfig::from_toml_file(Path::new(&path))?,
        None => RunConfig::from_toml_str(DEFAULT_CONFIG)?,
    };
    println!(
        "Child impact: {}  |  Water speed: {} km/h  |  Seed: {}",
        config.walking.child_impact, config.walking.waterspeed, config.locator.seed
    );

    // 2. Speed tables.
    let lc_speeds = if config.landcover.speed_table.is_some() {
        config.load_landcover_speeds()?
    } else {
        config.landcover_speeds_from_reader(Cursor::new(LANDCOVER_SPEEDS_CSV))?
    };
    let road_speeds = match config.load_road_speeds()? {
        Some(table) => table,
        None => config.road_speeds_from_reader(Cursor::new(ROAD_SPEEDS_CSV))?,
    };
    println!("Speed tables: {} landcover classes, {} road classes", lc_speeds.len(), road_speeds.len());

    // 3. Landscape.
    let landcover = landscape::landcover()?;
    let dem = landscape::dem()?;
    let roads = landscape::roads();
    let destinations = landscape::destinations();
    println!(
        "Landscape: {} × {} pixels of {} m, {} road features, {} destinations",
        landscape::WIDTH,
        landscape::HEIGHT,
        landscape::RES_M,
        roads.len(),
        destinations.len()
    );
    println!();

    // 4. Run.
    let t0 = Instant::now();
    let out = AccessibilityRun::new(&config, &landcover, &lc_speeds)
        .roads(&roads, &road_speeds)
        .dem(&dem)
        .run(&destinations)?;
    let elapsed = t0.elapsed();
    println!("Run complete in {:.3} s", elapsed.as_secs_f64());
    println!();

    // 5. Destinations per variant.
    println!("{:<16} {:<22} {:<22}", "Destination", "land_only", "water_passable");
    println!("{}", "-".repeat(60));
    for (i, dest) in destinations.iter().enumerate() {
        let describe = |v: SurfaceVariant| {
            let l = &out.variant(v).located[i];
            match (l.status, l.cell) {
                (LocateStatus::Valid, Some(c)) => format!("valid {c}"),
                (LocateStatus::Moved, Some(c)) => format!("moved {c}"),
                (LocateStatus::Invalid(r), _) => format!("invalid ({r})"),
                (_, None) => "-".to_string(),
            }
        };
        println!(
            "{:<16} {:<22} {:<22}",
            dest.id,
            describe(SurfaceVariant::LandOnly),
            describe(SurfaceVariant::WaterPassable)
        );
    }
    println!();

    // 6. Travel-time summary.
    println!("{:<16} {:>8} {:>10} {:>10}", "Grid", "Cells", "Median h", "Max h");
    println!("{}", "-".repeat(48));
    summarise("land_only", out.land_only.accessibility());
    summarise("water_passable", out.water_passable.accessibility());
    summarise("merged", &out.accessibility);
    println!();

    println!("{:<16} {:>8}", "Band", "Cells");
    println!("{}", "-".repeat(26));
    let bands = [
        ("< 0.5 h", 0.0, 0.5),
        ("0.5 - 1 h", 0.5, 1.0),
        ("1 - 2 h", 1.0, 2.0),
        (">= 2 h", 2.0, f64::INFINITY),
    ];
    for (label, lo, hi) in bands {
        let n = out
            .accessibility
            .valid_values()
            .filter(|&(_, s)| (lo..hi).contains(&(s / 3600.0)))
            .count();
        println!("{label:<16} {n:>8}");
    }
    println!();

    // 7. One route on the land-only surface: south-west corner to the market.
    let from = Cell::new(landscape::HEIGHT - 1, 0);
    let to = Cell::new(27, 32);
    match least_cost_route(&out.land_only.cost, from, to) {
        Some(route) => println!(
            "Route {from} → {to}: {} cells, {:.2} h",
            route.cells.len(),
            route.total_cost / 3600.0
        ),
        None => println!("Route {from} → {to}: unreachable"),
    }
    println!();

    // 8. Invalid-location reports.
    let dir = config
        .report
        .dir
        .clone()
        .unwrap_or_else(|| PathBuf::from("output/synthetic"));
    for path in write_invalid_reports(&dir, &out)? {
        println!("Wrote {}", path.display());
    }

    Ok(())
}

/// Print cell count, median and maximum travel time in hours.
fn summarise(name: &str, grid: &Grid) {
    let mut hours: Vec<f64> = grid.valid_values().map(|(_, s)| s / 3600.0).collect();
    if hours.is_empty() {
        println!("{name:<16} {:>8} {:>10} {:>10}", 0, "-", "-");
        return;
    }
    hours.sort_by(f64::total_cmp);
    let median = hours[hours.len() / 2];
    let max = hours[hours.len() - 1];
    println!("{name:<16} {:>8} {median:>10.2} {max:>10.2}", hours.len());
}
