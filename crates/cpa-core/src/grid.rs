//! Dense raster grid with an affine world transform.
//!
//! # Data layout
//!
//! Values are stored row-major, top-down: cell `(row, col)` lives at
//! `values[row * width + col]`.  Row 0 is the northern edge, so world `y`
//! decreases as `row` increases:
//!
//! ```text
//! center_x = origin_x + (col + 0.5) * |pixel_width|
//! center_y = origin_y - (row + 0.5) * |pixel_height|
//! ```
//!
//! # Nodata
//!
//! Each grid carries a `nodata` sentinel.  Source rasters keep whatever
//! sentinel the reader found (`-9999`, `255`, ...); every derived grid uses
//! NaN, so a computed speed or cost can never collide with a class code
//! sentinel.  A value is valid only if it is finite and not equal to the
//! sentinel, and [`Grid::derive`] turns any non-finite result into nodata.
//!
//! Every transform returns a new grid; inputs are never mutated.

use std::fmt;

use crate::{CpaError, CpaResult, LinearUnit};

// ── Cell ──────────────────────────────────────────────────────────────────────

/// A `(row, col)` grid reference.
#[derive(Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Cell {
    pub row: usize,
    pub col: usize,
}

impl Cell {
    #[inline]
    pub fn new(row: usize, col: usize) -> Self {
        Self { row, col }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

// ── GridTransform ─────────────────────────────────────────────────────────────

/// Relative tolerance used when checking two transforms for alignment.
/// Reprojected rasters routinely differ from their template by float noise.
const ALIGN_TOLERANCE: f64 = 1e-6;

/// Affine mapping between grid indices and world coordinates, plus the
/// linear unit of those coordinates.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GridTransform {
    /// World x of the grid's west edge.
    pub origin_x:     f64,
    /// World y of the grid's north edge.
    pub origin_y:     f64,
    pub pixel_width:  f64,
    /// Usually negative in GDAL-style transforms; only the magnitude is used.
    pub pixel_height: f64,
    pub unit:         LinearUnit,
}

impl GridTransform {
    pub fn new(
        origin_x:     f64,
        origin_y:     f64,
        pixel_width:  f64,
        pixel_height: f64,
        unit:         LinearUnit,
    ) -> Self {
        Self { origin_x, origin_y, pixel_width, pixel_height, unit }
    }

    /// World coordinate of the center of `cell`.
    #[inline]
    pub fn cell_center(&self, cell: Cell) -> (f64, f64) {
        (
            self.origin_x + (cell.col as f64 + 0.5) * self.pixel_width.abs(),
            self.origin_y - (cell.row as f64 + 0.5) * self.pixel_height.abs(),
        )
    }

    /// Fractional `(col, row)` position of a world coordinate.  Integer parts
    /// name the containing cell; the edges of the grid are at 0 and
    /// `width`/`height`.
    #[inline]
    pub fn to_fractional(&self, x: f64, y: f64) -> (f64, f64) {
        (
            (x - self.origin_x) / self.pixel_width.abs(),
            (self.origin_y - y) / self.pixel_height.abs(),
        )
    }

    /// Horizontal pixel size in metres.
    pub fn resolution_m(&self) -> CpaResult<f64> {
        Ok(self.pixel_width.abs() * self.unit.metres_per_unit()?)
    }

    /// Pixel spacing `(x, y)` in metres.
    pub fn spacing_m(&self) -> CpaResult<(f64, f64)> {
        let k = self.unit.metres_per_unit()?;
        Ok((self.pixel_width.abs() * k, self.pixel_height.abs() * k))
    }

    /// `true` if both transforms describe the same pixel lattice.
    pub fn aligned_with(&self, other: &GridTransform) -> bool {
        let tol = ALIGN_TOLERANCE * self.pixel_width.abs().max(f64::MIN_POSITIVE);
        self.unit == other.unit
            && (self.origin_x - other.origin_x).abs() <= tol
            && (self.origin_y - other.origin_y).abs() <= tol
            && (self.pixel_width.abs() - other.pixel_width.abs()).abs() <= tol
            && (self.pixel_height.abs() - other.pixel_height.abs()).abs() <= tol
    }
}

impl fmt::Display for GridTransform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "origin ({}, {}) pixel {}x{} {}",
            self.origin_x,
            self.origin_y,
            self.pixel_width.abs(),
            self.pixel_height.abs(),
            self.unit
        )
    }
}

// ── Grid ──────────────────────────────────────────────────────────────────────

/// A dense 2-D raster of `f64` values.
#[derive(Clone, Debug)]
pub struct Grid {
    width:     usize,
    height:    usize,
    transform: GridTransform,
    nodata:    f64,
    values:    Vec<f64>,
}

impl Grid {
    /// Wrap existing row-major values.
    ///
    /// Fails with [`CpaError::GeometryMismatch`] if `values.len()` is not
    /// `width * height`.
    pub fn new(
        width:     usize,
        height:    usize,
        transform: GridTransform,
        nodata:    f64,
        values:    Vec<f64>,
    ) -> CpaResult<Self> {
        if values.len() != width * height {
            return Err(CpaError::GeometryMismatch {
                what:     "value buffer",
                expected: format!("{} values ({width}x{height})", width * height),
                got:      format!("{} values", values.len()),
            });
        }
        Ok(Self { width, height, transform, nodata, values })
    }

    /// A grid with every cell set to `value` and a NaN nodata sentinel.
    pub fn filled(width: usize, height: usize, transform: GridTransform, value: f64) -> Self {
        Self {
            width,
            height,
            transform,
            nodata: f64::NAN,
            values: vec![value; width * height],
        }
    }

    /// A grid of the same shape and transform with every cell nodata (NaN).
    pub fn nodata_like(&self) -> Self {
        Self::filled(self.width, self.height, self.transform, f64::NAN)
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    pub fn width(&self) -> usize { self.width }
    pub fn height(&self) -> usize { self.height }
    pub fn len(&self) -> usize { self.values.len() }
    pub fn is_empty(&self) -> bool { self.values.is_empty() }
    pub fn transform(&self) -> &GridTransform { &self.transform }
    pub fn nodata(&self) -> f64 { self.nodata }

    /// Raw values including nodata sentinels.
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn into_values(self) -> Vec<f64> {
        self.values
    }

    // ── Indexing ──────────────────────────────────────────────────────────

    #[inline]
    pub fn index(&self, cell: Cell) -> usize {
        cell.row * self.width + cell.col
    }

    #[inline]
    pub fn cell(&self, index: usize) -> Cell {
        Cell::new(index / self.width, index % self.width)
    }

    #[inline]
    pub fn in_bounds(&self, cell: Cell) -> bool {
        cell.row < self.height && cell.col < self.width
    }

    /// `true` if `v` is a usable value for this grid.
    #[inline]
    pub fn is_valid_value(&self, v: f64) -> bool {
        v.is_finite() && v != self.nodata
    }

    /// Value at flat `index`, or `None` for nodata.
    #[inline]
    pub fn value(&self, index: usize) -> Option<f64> {
        let v = self.values[index];
        self.is_valid_value(v).then_some(v)
    }

    /// Value at `cell`, or `None` for nodata and out-of-bounds cells.
    #[inline]
    pub fn get(&self, cell: Cell) -> Option<f64> {
        if !self.in_bounds(cell) {
            return None;
        }
        self.value(self.index(cell))
    }

    #[inline]
    pub fn is_valid(&self, cell: Cell) -> bool {
        self.get(cell).is_some()
    }

    /// Overwrite one cell.  `None` writes the nodata sentinel.
    pub fn set(&mut self, cell: Cell, value: Option<f64>) -> CpaResult<()> {
        if !self.in_bounds(cell) {
            return Err(CpaError::OutOfBounds(cell));
        }
        let i = self.index(cell);
        self.values[i] = value.filter(|v| v.is_finite()).unwrap_or(self.nodata);
        Ok(())
    }

    /// Number of cells holding a valid value.
    pub fn valid_count(&self) -> usize {
        self.values.iter().filter(|&&v| self.is_valid_value(v)).count()
    }

    /// Iterator over `(index, value)` for valid cells only.
    pub fn valid_values(&self) -> impl Iterator<Item = (usize, f64)> + '_ {
        self.values
            .iter()
            .enumerate()
            .filter(|&(_, &v)| self.is_valid_value(v))
            .map(|(i, &v)| (i, v))
    }

    // ── World coordinates ─────────────────────────────────────────────────

    /// `(min_x, min_y, max_x, max_y)` of the grid's outer edges.
    pub fn bounds(&self) -> (f64, f64, f64, f64) {
        let t = &self.transform;
        let max_x = t.origin_x + self.width as f64 * t.pixel_width.abs();
        let min_y = t.origin_y - self.height as f64 * t.pixel_height.abs();
        (t.origin_x, min_y, max_x, t.origin_y)
    }

    /// The cell containing world point `(x, y)`, or `None` outside the grid.
    pub fn cell_at(&self, x: f64, y: f64) -> Option<Cell> {
        let (fc, fr) = self.transform.to_fractional(x, y);
        if !(fc >= 0.0 && fr >= 0.0) {
            return None;
        }
        let cell = Cell::new(fr.floor() as usize, fc.floor() as usize);
        self.in_bounds(cell).then_some(cell)
    }

    /// In-bounds cells of the 3×3 block around `cell`, excluding `cell`,
    /// in row-major order.
    pub fn neighbours(&self, cell: Cell) -> impl Iterator<Item = Cell> + '_ {
        let rows = cell.row.saturating_sub(1)..=(cell.row + 1).min(self.height.saturating_sub(1));
        rows.flat_map(move |r| {
            let cols = cell.col.saturating_sub(1)..=(cell.col + 1).min(self.width.saturating_sub(1));
            cols.map(move |c| Cell::new(r, c))
        })
        .filter(move |&c| c != cell)
    }

    // ── Alignment ─────────────────────────────────────────────────────────

    /// `true` if `other` has the same shape and pixel lattice.
    pub fn aligned_with(&self, other: &Grid) -> bool {
        self.width == other.width
            && self.height == other.height
            && self.transform.aligned_with(&other.transform)
    }

    /// Fail with [`CpaError::GeometryMismatch`] unless `other` is aligned.
    /// `what` names the offending input in the error message.
    pub fn ensure_aligned(&self, other: &Grid, what: &'static str) -> CpaResult<()> {
        if self.aligned_with(other) {
            return Ok(());
        }
        Err(CpaError::GeometryMismatch {
            what,
            expected: format!("{}x{} {}", self.width, self.height, self.transform),
            got:      format!("{}x{} {}", other.width, other.height, other.transform),
        })
    }

    // ── Per-pixel transforms ──────────────────────────────────────────────

    /// Build a new grid of the same shape by evaluating `f` at every flat
    /// index.  `None` and non-finite results become nodata (NaN).
    ///
    /// With the `parallel` feature rows are evaluated on Rayon's pool.
    pub fn derive<F>(&self, f: F) -> Grid
    where
        F: Fn(usize) -> Option<f64> + Sync + Send,
    {
        let nodata = f64::NAN;
        let width = self.width.max(1);
        let mut values = vec![nodata; self.values.len()];

        #[cfg(feature = "parallel")]
        {
            use rayon::prelude::*;
            values
                .par_chunks_mut(width)
                .enumerate()
                .for_each(|(row, out)| fill_row(row * width, out, &f, nodata));
        }
        #[cfg(not(feature = "parallel"))]
        {
            values
                .chunks_mut(width)
                .enumerate()
                .for_each(|(row, out)| fill_row(row * width, out, &f, nodata));
        }

        Grid {
            width:     self.width,
            height:    self.height,
            transform: self.transform,
            nodata,
            values,
        }
    }

    /// Apply `f` to each cell.  Nodata cells are passed as `None`.
    pub fn map<F>(&self, f: F) -> Grid
    where
        F: Fn(Option<f64>) -> Option<f64> + Sync + Send,
    {
        self.derive(|i| f(self.value(i)))
    }

    /// Combine two aligned grids cell by cell.
    pub fn zip_map<F>(&self, other: &Grid, what: &'static str, f: F) -> CpaResult<Grid>
    where
        F: Fn(Option<f64>, Option<f64>) -> Option<f64> + Sync + Send,
    {
        self.ensure_aligned(other, what)?;
        Ok(self.derive(|i| f(self.value(i), other.value(i))))
    }
}

#[inline]
fn fill_row<F>(start: usize, out: &mut [f64], f: &F, nodata: f64)
where
    F: Fn(usize) -> Option<f64>,
{
    for (k, slot) in out.iter_mut().enumerate() {
        *slot = f(start + k).filter(|v| v.is_finite()).unwrap_or(nodata);
    }
}
