//! All-touched rasterisation of vector geometries onto a pixel lattice.
//!
//! A pixel is burned if the geometry intersects it anywhere, not only at its
//! center:
//!
//! - line segments walk every pixel they pass through (Amanatides–Woo grid
//!   traversal, after clipping the segment to the grid);
//! - polygons burn their rings the same way, then every pixel whose center
//!   lies strictly inside;
//! - points burn the pixel containing them.
//!
//! Burns go into a [`BurnMask`], a scratch buffer owned by the caller and
//! cleared between uses.

use geo::{Contains, Coord, Geometry, LineString, Point, Polygon};

use cpa_core::{Cell, GridTransform};

// ── BurnMask ──────────────────────────────────────────────────────────────────

/// Set of burned pixels for one rasterisation pass.
///
/// `hit` answers membership in O(1); `touched` lists burned indices so a
/// pass and its reset cost O(burned) rather than O(grid).
pub(crate) struct BurnMask {
    width:   usize,
    height:  usize,
    hit:     Vec<bool>,
    touched: Vec<usize>,
}

impl BurnMask {
    pub(crate) fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            hit:     vec![false; width * height],
            touched: Vec::new(),
        }
    }

    pub(crate) fn clear(&mut self) {
        for &i in &self.touched {
            self.hit[i] = false;
        }
        self.touched.clear();
    }

    /// Flat indices burned since the last [`clear`](Self::clear).
    pub(crate) fn touched(&self) -> &[usize] {
        &self.touched
    }

    /// Burn `(col, row)`; out-of-grid positions are ignored.
    #[inline]
    fn mark(&mut self, col: i64, row: i64) {
        if col < 0 || row < 0 || col as usize >= self.width || row as usize >= self.height {
            return;
        }
        let i = row as usize * self.width + col as usize;
        if !self.hit[i] {
            self.hit[i] = true;
            self.touched.push(i);
        }
    }
}

// ── Geometry dispatch ─────────────────────────────────────────────────────────

pub(crate) fn burn_geometry(geom: &Geometry<f64>, t: &GridTransform, mask: &mut BurnMask) {
    match geom {
        Geometry::Point(p)              => burn_point(p, t, mask),
        Geometry::MultiPoint(mp)        => mp.0.iter().for_each(|p| burn_point(p, t, mask)),
        Geometry::Line(l)               => burn_segment(l.start, l.end, t, mask),
        Geometry::LineString(ls)        => burn_linestring(ls, t, mask),
        Geometry::MultiLineString(mls)  => mls.0.iter().for_each(|ls| burn_linestring(ls, t, mask)),
        Geometry::Polygon(p)            => burn_polygon(p, t, mask),
        Geometry::MultiPolygon(mp)      => mp.0.iter().for_each(|p| burn_polygon(p, t, mask)),
        Geometry::Rect(r)               => burn_polygon(&r.to_polygon(), t, mask),
        Geometry::Triangle(tri)         => burn_polygon(&tri.to_polygon(), t, mask),
        Geometry::GeometryCollection(gc) => gc.0.iter().for_each(|g| burn_geometry(g, t, mask)),
    }
}

fn burn_point(p: &Point<f64>, t: &GridTransform, mask: &mut BurnMask) {
    let (fc, fr) = t.to_fractional(p.x(), p.y());
    if fc.is_finite() && fr.is_finite() {
        mask.mark(fc.floor() as i64, fr.floor() as i64);
    }
}

fn burn_linestring(ls: &LineString<f64>, t: &GridTransform, mask: &mut BurnMask) {
    match ls.0.as_slice() {
        [] => {}
        [only] => burn_segment(*only, *only, t, mask),
        coords => coords
            .windows(2)
            .for_each(|w| burn_segment(w[0], w[1], t, mask)),
    }
}

fn burn_polygon(poly: &Polygon<f64>, t: &GridTransform, mask: &mut BurnMask) {
    // Rings: every pixel the boundary passes through.
    burn_linestring(poly.exterior(), t, mask);
    for ring in poly.interiors() {
        burn_linestring(ring, t, mask);
    }

    // Interior: pixel centers strictly inside.
    let Some((c0, r0, c1, r1)) = pixel_bbox(poly.exterior(), t, mask) else {
        return;
    };
    for row in r0..=r1 {
        for col in c0..=c1 {
            let (x, y) = t.cell_center(Cell::new(row, col));
            if poly.contains(&Point::new(x, y)) {
                mask.mark(col as i64, row as i64);
            }
        }
    }
}

/// Inclusive `(col0, row0, col1, row1)` pixel range covered by a ring's
/// bounding box, clipped to the grid.
fn pixel_bbox(
    ring: &LineString<f64>,
    t:    &GridTransform,
    mask: &BurnMask,
) -> Option<(usize, usize, usize, usize)> {
    if mask.width == 0 || mask.height == 0 {
        return None;
    }
    let (mut lo_c, mut lo_r) = (f64::INFINITY, f64::INFINITY);
    let (mut hi_c, mut hi_r) = (f64::NEG_INFINITY, f64::NEG_INFINITY);
    for c in &ring.0 {
        let (fc, fr) = t.to_fractional(c.x, c.y);
        lo_c = lo_c.min(fc);
        lo_r = lo_r.min(fr);
        hi_c = hi_c.max(fc);
        hi_r = hi_r.max(fr);
    }
    let max_c = (mask.width - 1) as f64;
    let max_r = (mask.height - 1) as f64;
    if !(hi_c >= 0.0 && hi_r >= 0.0 && lo_c <= max_c + 1.0 && lo_r <= max_r + 1.0) {
        return None;
    }
    Some((
        lo_c.floor().clamp(0.0, max_c) as usize,
        lo_r.floor().clamp(0.0, max_r) as usize,
        hi_c.floor().clamp(0.0, max_c) as usize,
        hi_r.floor().clamp(0.0, max_r) as usize,
    ))
}

// ── Segment traversal ─────────────────────────────────────────────────────────

fn burn_segment(a: Coord<f64>, b: Coord<f64>, t: &GridTransform, mask: &mut BurnMask) {
    let p0 = t.to_fractional(a.x, a.y);
    let p1 = t.to_fractional(b.x, b.y);
    if !(p0.0.is_finite() && p0.1.is_finite() && p1.0.is_finite() && p1.1.is_finite()) {
        return;
    }
    let Some((p0, p1)) = clip_segment(p0, p1, mask.width as f64, mask.height as f64) else {
        return;
    };
    traverse(p0, p1, |c, r| mask.mark(c, r));
}

/// Liang–Barsky clip of a segment (fractional `(col, row)`) to
/// `[0, w] × [0, h]`.
fn clip_segment(
    p0: (f64, f64),
    p1: (f64, f64),
    w:  f64,
    h:  f64,
) -> Option<((f64, f64), (f64, f64))> {
    let (dx, dy) = (p1.0 - p0.0, p1.1 - p0.1);
    let mut t0 = 0.0f64;
    let mut t1 = 1.0f64;
    for (p, q) in [(-dx, p0.0), (dx, w - p0.0), (-dy, p0.1), (dy, h - p0.1)] {
        if p == 0.0 {
            if q < 0.0 {
                return None;
            }
        } else {
            let r = q / p;
            if p < 0.0 {
                t0 = t0.max(r);
            } else {
                t1 = t1.min(r);
            }
        }
    }
    if t0 > t1 {
        return None;
    }
    Some((
        (p0.0 + t0 * dx, p0.1 + t0 * dy),
        (p0.0 + t1 * dx, p0.1 + t1 * dy),
    ))
}

/// Visit every pixel the segment `p0 → p1` passes through, in order.
fn traverse(p0: (f64, f64), p1: (f64, f64), mut visit: impl FnMut(i64, i64)) {
    let (mut col, mut row) = (p0.0.floor() as i64, p0.1.floor() as i64);
    let (end_col, end_row) = (p1.0.floor() as i64, p1.1.floor() as i64);
    let (dx, dy) = (p1.0 - p0.0, p1.1 - p0.1);

    let step_c = dx.signum() as i64 * (dx != 0.0) as i64;
    let step_r = dy.signum() as i64 * (dy != 0.0) as i64;

    // Parametric distance to the first column/row boundary, and between
    // successive boundaries.
    let (mut t_max_c, t_delta_c) = boundary_params(p0.0, dx, col);
    let (mut t_max_r, t_delta_r) = boundary_params(p0.1, dy, row);

    visit(col, row);
    let steps = (end_col - col).abs() + (end_row - row).abs();
    for _ in 0..steps {
        if t_max_c < t_max_r {
            col += step_c;
            t_max_c += t_delta_c;
        } else {
            row += step_r;
            t_max_r += t_delta_r;
        }
        visit(col, row);
    }
}

#[inline]
fn boundary_params(start: f64, delta: f64, cell: i64) -> (f64, f64) {
    if delta > 0.0 {
        (((cell + 1) as f64 - start) / delta, 1.0 / delta)
    } else if delta < 0.0 {
        ((cell as f64 - start) / delta, -1.0 / delta)
    } else {
        (f64::INFINITY, f64::INFINITY)
    }
}
