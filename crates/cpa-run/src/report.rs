//! Invalid-location CSV reports.
//!
//! One file per surface variant, in the report directory:
//! - `invalid_locations_land_only.csv`
//! - `invalid_locations_water_passable.csv`
//!
//! Columns: `id, x, y, reason`.  A file with only the header means every
//! destination was placed.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use cpa_access::Located;
use csv::Writer;

use crate::{AccessibilityOutput, RunResult, SurfaceVariant};

/// Streams invalid destinations to one CSV sink.
pub struct InvalidLocationWriter<W: Write> {
    writer:   Writer<W>,
    rows:     usize,
    finished: bool,
}

impl InvalidLocationWriter<File> {
    /// Create (or truncate) `path` and write the header row.
    pub fn create(path: &Path) -> RunResult<Self> {
        Self::from_writer(File::create(path)?)
    }
}

impl<W: Write> InvalidLocationWriter<W> {
    pub fn from_writer(sink: W) -> RunResult<Self> {
        let mut writer = Writer::from_writer(sink);
        writer.write_record(["id", "x", "y", "reason"])?;
        Ok(Self { writer, rows: 0, finished: false })
    }

    /// Write every invalid entry of `located`; valid and moved entries are
    /// skipped.
    pub fn write_all<'a, I>(&mut self, located: I) -> RunResult<()>
    where
        I: IntoIterator<Item = &'a Located>,
    {
        for l in located {
            let Some(reason) = l.invalid_reason() else { continue };
            self.writer.write_record(&[
                l.destination.id.clone(),
                l.destination.x.to_string(),
                l.destination.y.to_string(),
                reason.to_string(),
            ])?;
            self.rows += 1;
        }
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows
    }

    pub fn finish(&mut self) -> RunResult<()> {
        if self.finished {
            return Ok(());
        }
        self.finished = true;
        self.writer.flush()?;
        Ok(())
    }
}

/// Report file name for `variant`.
pub fn report_file_name(variant: SurfaceVariant) -> String {
    format!("invalid_locations_{}.csv", variant.as_str())
}

/// Write both variant reports into `dir` (created if missing) and return
/// their paths, land-only first.
pub fn write_invalid_reports(dir: &Path, output: &AccessibilityOutput) -> RunResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let mut paths = Vec::with_capacity(SurfaceVariant::ALL.len());
    for variant in SurfaceVariant::ALL {
        let path = dir.join(report_file_name(variant));
        let mut w = InvalidLocationWriter::create(&path)?;
        w.write_all(&output.variant(variant).located)?;
        w.finish()?;
        log::info!("{variant}: {} invalid locations written to {}", w.rows_written(), path.display());
        paths.push(path);
    }
    Ok(paths)
}
