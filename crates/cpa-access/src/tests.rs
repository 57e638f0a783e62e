//! Unit tests for cpa-access.
//!
//! All tests use hand-built grids of 1 m pixels with the north-west corner
//! at (0, height), so the center of cell (r, c) is (c + 0.5, height - r - 0.5).

#[cfg(test)]
mod helpers {
    use cpa_core::{Grid, GridTransform, LinearUnit};

    pub const NAN: f64 = f64::NAN;

    pub fn grid(w: usize, h: usize, values: Vec<f64>) -> Grid {
        let t = GridTransform::new(0.0, h as f64, 1.0, -1.0, LinearUnit::Metre);
        Grid::new(w, h, t, NAN, values).unwrap()
    }

    pub fn uniform(w: usize, h: usize, c: f64) -> Grid {
        grid(w, h, vec![c; w * h])
    }

    pub fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }
}

// ── Least-cost distance ───────────────────────────────────────────────────────

#[cfg(test)]
mod cost_distance {
    use std::f64::consts::SQRT_2;

    use cpa_core::Cell;

    use super::helpers::{NAN, approx, grid, uniform};
    use crate::{CostDistanceEngine, DijkstraEngine, cost_distance};

    #[test]
    fn uniform_five_by_five_from_center() {
        let field = cost_distance(&uniform(5, 5, 10.0), &[Cell::new(2, 2)]);
        let at = |r, c| field.cost_at(Cell::new(r, c)).unwrap();

        assert_eq!(at(2, 2), 0.0);
        for (r, c) in [(1, 2), (3, 2), (2, 1), (2, 3)] {
            assert_eq!(at(r, c), 10.0);
        }
        for (r, c) in [(1, 1), (1, 3), (3, 1), (3, 3)] {
            assert!(approx(at(r, c), 10.0 * SQRT_2));
        }
        for (r, c) in [(0, 2), (2, 0), (4, 2), (2, 4)] {
            assert_eq!(at(r, c), 20.0);
        }
        assert!(approx(at(0, 0), 20.0 * SQRT_2));
        assert!(approx(at(0, 1), 10.0 + 10.0 * SQRT_2));
        assert_eq!(field.settled_count(), 25);
    }

    #[test]
    fn edge_cost_averages_endpoints() {
        let g = grid(3, 1, vec![2.0, 4.0, 8.0]);
        let field = cost_distance(&g, &[Cell::new(0, 0)]);
        assert_eq!(field.cost_at(Cell::new(0, 1)), Some(3.0));
        assert_eq!(field.cost_at(Cell::new(0, 2)), Some(9.0));
    }

    #[test]
    fn multi_source_is_min_of_single_sources() {
        let values = (0..42)
            .map(|i| if i % 11 == 5 { NAN } else { 1.0 + (i * 7 % 5) as f64 })
            .collect();
        let g = grid(7, 6, values);
        let starts = [Cell::new(0, 0), Cell::new(5, 6), Cell::new(3, 2)];

        let multi = cost_distance(&g, &starts);
        let singles: Vec<_> = starts.iter().map(|&s| cost_distance(&g, &[s])).collect();

        for i in 0..g.len() {
            let expected = singles
                .iter()
                .filter_map(|f| f.accumulated().value(i))
                .fold(None, |acc: Option<f64>, v| Some(acc.map_or(v, |a| a.min(v))));
            match (multi.accumulated().value(i), expected) {
                (Some(a), Some(b)) => assert!(approx(a, b), "cell {i}: {a} vs {b}"),
                (None, None) => {}
                other => panic!("cell {i}: {other:?}"),
            }
        }
    }

    #[test]
    fn nodata_wall_blocks_propagation() {
        let mut values = vec![1.0; 25];
        for r in 0..5 {
            values[r * 5 + 2] = NAN;
        }
        let field = cost_distance(&grid(5, 5, values), &[Cell::new(2, 0)]);
        for r in 0..5 {
            assert!(field.cost_at(Cell::new(r, 1)).is_some());
            assert_eq!(field.cost_at(Cell::new(r, 2)), None);
            assert_eq!(field.cost_at(Cell::new(r, 3)), None);
        }
        assert_eq!(field.settled_count(), 10);
    }

    #[test]
    fn path_goes_around_gap_in_wall() {
        // Wall in column 2 with a gap at row 0.
        let mut values = vec![1.0; 25];
        for r in 1..5 {
            values[r * 5 + 2] = NAN;
        }
        let g = grid(5, 5, values);
        let field = cost_distance(&g, &[Cell::new(4, 0)]);
        let around = field.cost_at(Cell::new(4, 4)).unwrap();
        assert!(around > 4.0);
        let path = field.path_to(Cell::new(4, 4)).unwrap();
        assert!(path.contains(&Cell::new(0, 2)));
    }

    #[test]
    fn non_positive_costs_are_impassable() {
        let g = grid(3, 1, vec![1.0, 0.0, 1.0]);
        let field = cost_distance(&g, &[Cell::new(0, 0)]);
        assert_eq!(field.cost_at(Cell::new(0, 1)), None);
        assert_eq!(field.cost_at(Cell::new(0, 2)), None);
    }

    #[test]
    fn invalid_starts_are_skipped() {
        let g = grid(3, 1, vec![NAN, 1.0, 1.0]);
        let field = cost_distance(&g, &[Cell::new(0, 0), Cell::new(9, 9)]);
        assert_eq!(field.settled_count(), 0);
        assert_eq!(field.accumulated().valid_count(), 0);

        let field = cost_distance(&g, &[Cell::new(0, 0), Cell::new(0, 2)]);
        assert_eq!(field.cost_at(Cell::new(0, 1)), Some(1.0));
    }

    #[test]
    fn duplicate_starts_seeded_once() {
        let g = uniform(3, 3, 1.0);
        let field = cost_distance(&g, &[Cell::new(1, 1), Cell::new(1, 1)]);
        assert_eq!(field.settled_count(), 9);
        assert_eq!(field.cost_at(Cell::new(1, 1)), Some(0.0));
    }

    #[test]
    fn every_reachable_cell_settled_once() {
        let values = (0..30).map(|i| if i % 7 == 3 { NAN } else { 1.0 + (i % 4) as f64 }).collect();
        let g = grid(6, 5, values);
        let field = cost_distance(&g, &[Cell::new(0, 0)]);
        assert_eq!(field.settled_count(), field.accumulated().valid_count());
    }

    #[test]
    fn path_to_follows_predecessors() {
        let field = cost_distance(&uniform(5, 5, 10.0), &[Cell::new(2, 2)]);
        assert_eq!(
            field.path_to(Cell::new(0, 0)).unwrap(),
            vec![Cell::new(2, 2), Cell::new(1, 1), Cell::new(0, 0)]
        );
        assert_eq!(field.path_to(Cell::new(2, 2)).unwrap(), vec![Cell::new(2, 2)]);
        assert_eq!(field.path_to(Cell::new(7, 7)), None);
    }

    #[test]
    fn engine_trait_matches_free_function() {
        let g = uniform(4, 4, 3.0);
        let starts = [Cell::new(0, 0)];
        let engine: &dyn CostDistanceEngine = &DijkstraEngine;
        let a = engine.cost_distance(&g, &starts);
        let b = cost_distance(&g, &starts);
        for i in 0..g.len() {
            assert_eq!(a.accumulated().value(i), b.accumulated().value(i));
        }
    }
}

// ── Point-to-point routes ─────────────────────────────────────────────────────

#[cfg(test)]
mod route {
    use std::f64::consts::SQRT_2;

    use cpa_core::Cell;

    use super::helpers::{NAN, approx, grid, uniform};
    use crate::least_cost_route;

    #[test]
    fn route_avoids_expensive_center() {
        let g = grid(3, 3, vec![1.0, 1.0, 1.0, 1.0, 100.0, 1.0, 1.0, 1.0, 1.0]);
        let route = least_cost_route(&g, Cell::new(1, 0), Cell::new(1, 2)).unwrap();
        assert!(approx(route.total_cost, 2.0 * SQRT_2));
        assert_eq!(route.cells.len(), 3);
        assert_eq!(route.cells[0], Cell::new(1, 0));
        assert_eq!(route.cells[2], Cell::new(1, 2));
        assert_ne!(route.cells[1], Cell::new(1, 1));
    }

    #[test]
    fn trivial_route() {
        let g = uniform(2, 2, 5.0);
        let route = least_cost_route(&g, Cell::new(0, 0), Cell::new(0, 0)).unwrap();
        assert!(route.is_trivial());
        assert_eq!(route.total_cost, 0.0);
    }

    #[test]
    fn no_route_to_nodata_or_across_wall() {
        let g = grid(3, 1, vec![1.0, NAN, 1.0]);
        assert!(least_cost_route(&g, Cell::new(0, 0), Cell::new(0, 1)).is_none());
        assert!(least_cost_route(&g, Cell::new(0, 0), Cell::new(0, 2)).is_none());
    }
}

// ── Destination locator ───────────────────────────────────────────────────────

#[cfg(test)]
mod locator {
    use cpa_core::{AccessRng, Cell};

    use super::helpers::{NAN, grid, uniform};
    use crate::{Destination, InvalidReason, LocateStatus, invalid_locations, locate, start_cells};

    /// Center of cell (r, c) on a grid `h` rows tall.
    fn center(id: &str, r: usize, c: usize, h: usize) -> Destination {
        Destination::new(id, c as f64 + 0.5, h as f64 - r as f64 - 0.5)
    }

    #[test]
    fn point_on_valid_cell_is_valid() {
        let g = uniform(3, 3, 1.0);
        let out = locate(&[center("a", 1, 2, 3)], &g, &mut AccessRng::new(1));
        assert_eq!(out[0].status, LocateStatus::Valid);
        assert_eq!(out[0].cell, Some(Cell::new(1, 2)));
    }

    #[test]
    fn point_on_nodata_moves_to_only_valid_neighbour() {
        let mut values = vec![NAN; 9];
        values[2] = 1.0; // cell (0, 2)
        let g = grid(3, 3, values);
        let out = locate(&[center("a", 1, 1, 3)], &g, &mut AccessRng::new(1));
        assert_eq!(out[0].status, LocateStatus::Moved);
        assert_eq!(out[0].cell, Some(Cell::new(0, 2)));
    }

    #[test]
    fn moved_cell_is_a_valid_neighbour_and_seeded() {
        let g = grid(3, 3, vec![1.0, NAN, 1.0, NAN, NAN, NAN, 1.0, NAN, 1.0]);
        let allowed = [Cell::new(0, 0), Cell::new(0, 2), Cell::new(2, 0), Cell::new(2, 2)];
        let dest = [center("a", 1, 1, 3)];

        let first = locate(&dest, &g, &mut AccessRng::new(99));
        assert_eq!(first[0].status, LocateStatus::Moved);
        assert!(allowed.contains(&first[0].cell.unwrap()));

        let again = locate(&dest, &g, &mut AccessRng::new(99));
        assert_eq!(first[0].cell, again[0].cell);
    }

    #[test]
    fn isolated_nodata_is_impassable() {
        let mut values = vec![NAN; 25];
        values[0] = 1.0;
        let g = grid(5, 5, values);
        let out = locate(&[center("a", 3, 3, 5)], &g, &mut AccessRng::new(1));
        assert_eq!(out[0].status, LocateStatus::Invalid(InvalidReason::Impassable));
        assert_eq!(out[0].cell, None);
    }

    #[test]
    fn point_outside_extent_is_invalid() {
        let g = uniform(3, 3, 1.0);
        let dests = [
            Destination::new("west", -0.5, 1.5),
            Destination::new("north", 1.5, 3.5),
            Destination::new("nan", f64::NAN, 1.0),
        ];
        let out = locate(&dests, &g, &mut AccessRng::new(1));
        for l in &out {
            assert_eq!(l.invalid_reason(), Some(InvalidReason::OutsideExtent));
        }
    }

    #[test]
    fn start_cells_and_invalid_list() {
        let mut values = vec![1.0; 9];
        values[4] = NAN;
        let g = grid(3, 3, values);
        let dests = [
            center("ok", 0, 0, 3),
            Destination::new("away", 50.0, 50.0),
            center("moved", 1, 1, 3),
        ];
        let out = locate(&dests, &g, &mut AccessRng::new(3));
        assert_eq!(out.len(), 3);
        let starts = start_cells(&out);
        assert_eq!(starts.len(), 2);
        assert_eq!(starts[0], Cell::new(0, 0));
        assert!(g.is_valid(starts[1]));

        let invalid: Vec<_> = invalid_locations(&out).map(|l| l.destination.id.as_str()).collect();
        assert_eq!(invalid, vec!["away"]);
    }
}

// ── Dual-surface merge ────────────────────────────────────────────────────────

#[cfg(test)]
mod merge {
    use cpa_core::CpaError;

    use super::helpers::{NAN, grid};
    use crate::merge;

    #[test]
    fn land_preferred_water_fills_gaps() {
        let land  = grid(2, 2, vec![1.0, NAN, NAN, 4.0]);
        let water = grid(2, 2, vec![9.0, 2.0, NAN, 9.0]);
        let m = merge(&land, &water).unwrap();
        assert_eq!(m.value(0), Some(1.0));
        assert_eq!(m.value(1), Some(2.0));
        assert_eq!(m.value(2), None);
        assert_eq!(m.value(3), Some(4.0));
    }

    #[test]
    fn shape_mismatch_rejected() {
        let land  = grid(2, 2, vec![1.0; 4]);
        let water = grid(4, 1, vec![1.0; 4]);
        assert!(matches!(merge(&land, &water), Err(CpaError::GeometryMismatch { .. })));
    }
}
