//! CSV speed-table loader.
//!
//! # CSV format
//!
//! The first row holds column names.  Two columns are read, selected by name;
//! all others are ignored:
//!
//! ```csv
//! Code,Landcover,Walking Speed (km/h)
//! 1,Trees,1.6
//! 2,Grassland,2.5
//! 10,Open water,
//! ```
//!
//! Codes that parse as integers become [`CategoryCode::Int`]; anything else
//! is text (road tags).  Rows with an empty or `NaN` speed are dropped, as
//! are rows with an empty code.

use std::io::Read;
use std::path::Path;

use cpa_core::CpaError;

use crate::speed_map::{CategoryCode, SpeedMap};
use crate::{SurfaceError, SurfaceResult};

/// Load a [`SpeedMap`] from a CSV file.
pub fn load_speed_table_csv(
    path:         &Path,
    code_column:  &str,
    speed_column: &str,
) -> SurfaceResult<SpeedMap> {
    let file = std::fs::File::open(path).map_err(CpaError::Io)?;
    load_speed_table_reader(file, code_column, speed_column)
}

/// Like [`load_speed_table_csv`] but accepts any `Read` source.
pub fn load_speed_table_reader<R: Read>(
    reader:       R,
    code_column:  &str,
    speed_column: &str,
) -> SurfaceResult<SpeedMap> {
    let mut csv_reader = csv::Reader::from_reader(reader);

    // ── Resolve column positions ──────────────────────────────────────────
    let headers = csv_reader.headers()?.clone();
    let column = |name: &str| {
        headers
            .iter()
            .position(|h| h.trim() == name)
            .ok_or_else(|| {
                CpaError::Config(format!(
                    "speed table has no column {name:?} (found {:?})",
                    headers.iter().collect::<Vec<_>>()
                ))
            })
    };
    let code_idx  = column(code_column)?;
    let speed_idx = column(speed_column)?;

    // ── Parse rows ────────────────────────────────────────────────────────
    let mut rows = Vec::new();
    for (line, record) in csv_reader.records().enumerate() {
        let record = record?;
        let code = record.get(code_idx).unwrap_or("").trim();
        if code.is_empty() {
            continue;
        }
        let speed = parse_speed(record.get(speed_idx).unwrap_or("")).map_err(|raw| {
            SurfaceError::Parse(format!(
                "row {}: speed {raw:?} for category {code:?} is not a number",
                line + 2
            ))
        })?;
        rows.push((CategoryCode::parse(code), speed));
    }

    Ok(SpeedMap::build(rows)?)
}

/// `Ok(None)` for blank or NaN cells, `Err(raw)` for unparsable text.
fn parse_speed(raw: &str) -> Result<Option<f64>, String> {
    let s = raw.trim();
    if s.is_empty() || s.eq_ignore_ascii_case("nan") {
        return Ok(None);
    }
    s.parse::<f64>().map(Some).map_err(|_| s.to_string())
}
