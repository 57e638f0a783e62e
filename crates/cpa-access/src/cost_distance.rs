//! Multi-source least-cost distance over an 8-connected cost grid.
//!
//! # Model
//!
//! Every valid cell is a node.  A move between 8-neighbours `a` and `b` costs
//!
//! ```text
//! (cost[a] + cost[b]) / 2 · (1 for orthogonal, √2 for diagonal)
//! ```
//!
//! Nodata cells, and cells with a non-positive cost, are not nodes: nothing
//! enters or leaves them.
//!
//! # Algorithm
//!
//! One Dijkstra expansion seeded with every start cell at cumulative cost 0.
//! Cells are settled in non-decreasing cost order and exactly once; stale heap
//! entries are skipped on pop.  The result for S starts equals the pixel-wise
//! minimum of S single-source runs at the cost of one.
//!
//! # Pluggability
//!
//! Callers go through the [`CostDistanceEngine`] trait so a bucket-based or
//! parallel engine can replace [`DijkstraEngine`] without touching the run
//! orchestration.

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::f64::consts::SQRT_2;

use cpa_core::{Cell, Grid};

/// Predecessor marker for start cells and unreached cells.
const NO_PREDECESSOR: usize = usize::MAX;

// ── CostField ─────────────────────────────────────────────────────────────────

/// Output of an engine run: cumulative costs plus the traceback tree.
#[derive(Clone, Debug)]
pub struct CostField {
    accumulated: Grid,
    predecessor: Vec<usize>,
    settled:     usize,
}

impl CostField {
    /// Cumulative least cost (seconds) from the nearest start; nodata where
    /// unreachable.
    pub fn accumulated(&self) -> &Grid {
        &self.accumulated
    }

    pub fn into_grid(self) -> Grid {
        self.accumulated
    }

    /// Number of cells settled by the expansion.
    pub fn settled_count(&self) -> usize {
        self.settled
    }

    #[inline]
    pub fn cost_at(&self, cell: Cell) -> Option<f64> {
        self.accumulated.get(cell)
    }

    /// Cells from the nearest start to `cell`, both ends included.  `None`
    /// if `cell` is out of bounds or unreachable.
    pub fn path_to(&self, cell: Cell) -> Option<Vec<Cell>> {
        self.cost_at(cell)?;
        let mut path = Vec::new();
        let mut cur = self.accumulated.index(cell);
        loop {
            path.push(self.accumulated.cell(cur));
            let prev = self.predecessor[cur];
            if prev == NO_PREDECESSOR {
                break;
            }
            cur = prev;
        }
        path.reverse();
        Some(path)
    }
}

/// A point-to-point least-cost path.
#[derive(Clone, Debug)]
pub struct LeastCostRoute {
    /// Cells to traverse in order, source first.
    pub cells:      Vec<Cell>,
    /// Cumulative cost in seconds.
    pub total_cost: f64,
}

impl LeastCostRoute {
    /// `true` if the source and target are the same cell.
    pub fn is_trivial(&self) -> bool {
        self.cells.len() <= 1
    }
}

// ── Engine trait ──────────────────────────────────────────────────────────────

/// Pluggable least-cost-distance engine.
///
/// Implementations must be `Send + Sync` so one engine can serve both
/// surface variants of a run from different threads.
pub trait CostDistanceEngine: Send + Sync {
    /// Cumulative cost from any of `starts` to every cell of `cost`.
    ///
    /// Start cells that are out of bounds or nodata are skipped.
    fn cost_distance(&self, cost: &Grid, starts: &[Cell]) -> CostField;
}

/// The default single-threaded multi-source Dijkstra.
#[derive(Copy, Clone, Debug, Default)]
pub struct DijkstraEngine;

impl CostDistanceEngine for DijkstraEngine {
    fn cost_distance(&self, cost: &Grid, starts: &[Cell]) -> CostField {
        cost_distance(cost, starts)
    }
}

// ── Public API ────────────────────────────────────────────────────────────────

/// Multi-source least-cost distance.  See the module docs.
pub fn cost_distance(cost: &Grid, starts: &[Cell]) -> CostField {
    let field = expand(cost, starts, None);
    log::info!(
        "cost distance: {} starts, {} of {} valid cells reached",
        starts.len(),
        field.settled,
        cost.valid_count()
    );
    field
}

/// Least-cost path from `from` to `to`, or `None` if either cell is not
/// a valid node or no path connects them.
///
/// The expansion stops as soon as `to` is settled.
pub fn least_cost_route(cost: &Grid, from: Cell, to: Cell) -> Option<LeastCostRoute> {
    if node_cost(cost, from).is_none() || node_cost(cost, to).is_none() {
        return None;
    }
    let field = expand(cost, &[from], Some(cost.index(to)));
    let total_cost = field.cost_at(to)?;
    let cells = field.path_to(to)?;
    Some(LeastCostRoute { cells, total_cost })
}

// ── Dijkstra internals ────────────────────────────────────────────────────────

/// Heap entry.  Ordered so `BinaryHeap` pops the cheapest; equal costs pop
/// the lower index first, keeping traceback deterministic.
#[derive(Copy, Clone, Debug)]
struct Frontier {
    cost:  f64,
    index: usize,
}

impl PartialEq for Frontier {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Frontier {}

impl Ord for Frontier {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .cost
            .total_cmp(&self.cost)
            .then_with(|| other.index.cmp(&self.index))
    }
}

impl PartialOrd for Frontier {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Cost of `cell` if it is a traversable node.
#[inline]
fn node_cost(cost: &Grid, cell: Cell) -> Option<f64> {
    cost.get(cell).filter(|c| *c > 0.0)
}

fn expand(cost: &Grid, starts: &[Cell], target: Option<usize>) -> CostField {
    let n = cost.len();
    // dist[i] = best known cumulative cost to cell i.
    let mut dist        = vec![f64::INFINITY; n];
    let mut predecessor = vec![NO_PREDECESSOR; n];
    let mut done        = vec![false; n];
    let mut settled     = 0usize;
    let mut heap: BinaryHeap<Frontier> = BinaryHeap::new();

    for &start in starts {
        if node_cost(cost, start).is_none() {
            log::warn!("start cell {start} is out of bounds or impassable; skipping");
            continue;
        }
        let i = cost.index(start);
        if dist[i] > 0.0 {
            dist[i] = 0.0;
            heap.push(Frontier { cost: 0.0, index: i });
        }
    }

    while let Some(Frontier { cost: d, index }) = heap.pop() {
        // Skip stale heap entries.
        if done[index] {
            continue;
        }
        done[index] = true;
        settled += 1;
        if target == Some(index) {
            break;
        }

        let here = cost.cell(index);
        // Only nodes are ever pushed.
        let Some(c_here) = cost.value(index) else { continue };

        for nb in cost.neighbours(here) {
            let j = cost.index(nb);
            if done[j] {
                continue;
            }
            let Some(c_nb) = cost.value(j).filter(|c| *c > 0.0) else { continue };
            let step = if nb.row != here.row && nb.col != here.col { SQRT_2 } else { 1.0 };
            let candidate = d + 0.5 * (c_here + c_nb) * step;
            if candidate < dist[j] {
                dist[j] = candidate;
                predecessor[j] = index;
                heap.push(Frontier { cost: candidate, index: j });
            }
        }
    }

    // Unreached cells are still infinite; `derive` turns them into nodata.
    let accumulated = cost.derive(|i| Some(dist[i]));
    CostField { accumulated, predecessor, settled }
}
