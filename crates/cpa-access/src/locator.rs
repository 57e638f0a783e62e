//! Snap destination points onto cost-grid cells.
//!
//! # Procedure
//!
//! | Step | Condition                                   | Outcome                         |
//! |------|---------------------------------------------|---------------------------------|
//! | 1    | point outside the grid's extent             | `Invalid(OutsideExtent)`        |
//! | 2    | containing cell has a cost                  | `Valid`, that cell              |
//! | 3    | some 3×3 neighbour has a cost               | `Moved`, one chosen at random   |
//! | 4    | otherwise                                   | `Invalid(Impassable)`           |
//!
//! The choice in step 3 draws from the caller's [`AccessRng`], so a fixed
//! seed fixes the result.  Invalid destinations are data: they are logged,
//! kept in the output for reporting, and contribute no start cell.

use std::fmt;

use cpa_core::{AccessRng, Cell, Grid};

// ── Types ─────────────────────────────────────────────────────────────────────

/// A service location in the grid's world coordinates.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Destination {
    /// Label carried into reports.
    pub id: String,
    pub x:  f64,
    pub y:  f64,
}

impl Destination {
    pub fn new(id: impl Into<String>, x: f64, y: f64) -> Self {
        Self { id: id.into(), x, y }
    }
}

/// Why a destination could not be placed on the grid.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum InvalidReason {
    OutsideExtent,
    /// The containing cell and all of its neighbours are nodata.
    Impassable,
}

impl InvalidReason {
    pub fn as_str(self) -> &'static str {
        match self {
            InvalidReason::OutsideExtent => "outside_extent",
            InvalidReason::Impassable    => "impassable",
        }
    }
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum LocateStatus {
    Valid,
    Moved,
    Invalid(InvalidReason),
}

/// A destination after snapping.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Located {
    pub destination: Destination,
    pub status:      LocateStatus,
    /// Start cell; `None` exactly when `status` is `Invalid`.
    pub cell:        Option<Cell>,
}

impl Located {
    #[inline]
    pub fn is_invalid(&self) -> bool {
        matches!(self.status, LocateStatus::Invalid(_))
    }

    /// The invalid reason, if any.
    pub fn invalid_reason(&self) -> Option<InvalidReason> {
        match self.status {
            LocateStatus::Invalid(r) => Some(r),
            _ => None,
        }
    }
}

// ── Locator ───────────────────────────────────────────────────────────────────

/// Snap every destination onto `cost`.  Output order matches input order.
pub fn locate(destinations: &[Destination], cost: &Grid, rng: &mut AccessRng) -> Vec<Located> {
    let located: Vec<Located> = destinations
        .iter()
        .map(|d| locate_one(d, cost, rng))
        .collect();

    let (mut valid, mut moved, mut invalid) = (0usize, 0usize, 0usize);
    for l in &located {
        match l.status {
            LocateStatus::Valid      => valid += 1,
            LocateStatus::Moved      => moved += 1,
            LocateStatus::Invalid(r) => {
                invalid += 1;
                log::warn!(
                    "destination {} at ({}, {}) is invalid: {r}",
                    l.destination.id, l.destination.x, l.destination.y
                );
            }
        }
    }
    log::info!("located {} destinations: {valid} valid, {moved} moved, {invalid} invalid", located.len());
    located
}

fn locate_one(dest: &Destination, cost: &Grid, rng: &mut AccessRng) -> Located {
    let (status, cell) = match cost.cell_at(dest.x, dest.y) {
        None => (LocateStatus::Invalid(InvalidReason::OutsideExtent), None),
        Some(cell) if cost.is_valid(cell) => (LocateStatus::Valid, Some(cell)),
        Some(cell) => {
            let candidates: Vec<Cell> = cost.neighbours(cell).filter(|&n| cost.is_valid(n)).collect();
            match rng.choose(&candidates) {
                Some(&moved) => (LocateStatus::Moved, Some(moved)),
                None => (LocateStatus::Invalid(InvalidReason::Impassable), None),
            }
        }
    };
    Located { destination: dest.clone(), status, cell }
}

/// Start cells of all placed destinations, in destination order.
///
/// Two destinations on one cell yield that cell twice; the engine seeds it
/// once.
pub fn start_cells(located: &[Located]) -> Vec<Cell> {
    located.iter().filter_map(|l| l.cell).collect()
}

/// Destinations that could not be placed.
pub fn invalid_locations(located: &[Located]) -> impl Iterator<Item = &Located> + '_ {
    located.iter().filter(|l| l.is_invalid())
}
