/*
 * Spatial Grid Module
 *
 * This module defines the SpatialGrid struct for neighbor lookups.
 * It divides the domain into nodes_per_axis x nodes_per_axis cells so a
 * neighbor query only touches the cells around the query point instead of
 * every agent.
 *
 * Queries are answered at two fidelities:
 * - Fine tier: every agent in the cells within `fine_radius` (Chebyshev
 *   distance, in cells) of the owning cell, one weight-1 PseudoBoid each
 * - Coarse tier: cells within `coarse_radius` but outside the fine tier,
 *   one PseudoBoid per non-empty cell holding the cell average
 *
 * The grid is rebuilt every tick: clear, insert every agent, then
 * recompute each cell's aggregate once.
 */

use crate::domain::Domain;
use crate::error::SwarmError;
use crate::vector::{average, Vector2};

pub const DEFAULT_NODES_PER_AXIS: usize = 16;
pub const DEFAULT_FINE_RADIUS: usize = 1;
pub const DEFAULT_COARSE_RADIUS: usize = 3;

// A neighbor as seen by the force pass: one agent (weight 1) or the average
// of a whole cell (weight = member count)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PseudoBoid {
    pub position: Vector2,
    pub velocity: Vector2,
    pub weight: f32,
}

impl PseudoBoid {
    #[inline]
    pub const fn single(position: Vector2, velocity: Vector2) -> Self {
        Self { position, velocity, weight: 1.0 }
    }
}

#[derive(Debug, Default, Clone)]
struct Cell {
    positions: Vec<Vector2>,
    velocities: Vec<Vector2>,
    // Only valid between a recompute and the next clear
    aggregate: Option<PseudoBoid>,
}

impl Cell {
    #[inline]
    fn population(&self) -> usize {
        debug_assert_eq!(self.positions.len(), self.velocities.len());
        self.positions.len()
    }

    #[inline]
    fn insert(&mut self, position: Vector2, velocity: Vector2) {
        self.positions.push(position);
        self.velocities.push(velocity);
    }

    fn clear(&mut self) {
        self.positions.clear();
        self.velocities.clear();
        self.aggregate = None;
    }

    fn recompute(&mut self) {
        let population = self.population();
        self.aggregate = (population > 0).then(|| PseudoBoid {
            position: average(&self.positions),
            velocity: average(&self.velocities),
            weight: population as f32,
        });
    }
}

#[derive(Debug, Clone)]
pub struct SpatialGrid {
    domain: Domain,
    nodes_per_axis: usize,
    cell_span: f32,
    fine_radius: usize,
    coarse_radius: usize,
    cells: Vec<Cell>,
}

impl SpatialGrid {
    pub fn new(domain: Domain, nodes_per_axis: usize) -> Result<Self, SwarmError> {
        Self::with_tiers(domain, nodes_per_axis, DEFAULT_FINE_RADIUS, DEFAULT_COARSE_RADIUS)
    }

    pub fn with_tiers(
        domain: Domain,
        nodes_per_axis: usize,
        fine_radius: usize,
        coarse_radius: usize,
    ) -> Result<Self, SwarmError> {
        if nodes_per_axis < 2 {
            return Err(SwarmError::InvalidConfig("grid needs at least two cells per axis"));
        }
        if coarse_radius <= fine_radius {
            return Err(SwarmError::InvalidConfig("coarse radius must exceed fine radius"));
        }

        Ok(Self {
            domain,
            nodes_per_axis,
            cell_span: domain.span() / nodes_per_axis as f32,
            fine_radius,
            coarse_radius,
            cells: vec![Cell::default(); nodes_per_axis * nodes_per_axis],
        })
    }

    #[inline]
    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    #[inline]
    pub fn nodes_per_axis(&self) -> usize {
        self.nodes_per_axis
    }

    #[inline]
    pub fn cell_span(&self) -> f32 {
        self.cell_span
    }

    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    #[inline]
    pub fn fine_radius(&self) -> usize {
        self.fine_radius
    }

    #[inline]
    pub fn coarse_radius(&self) -> usize {
        self.coarse_radius
    }

    pub fn population(&self, cell_index: usize) -> usize {
        self.cells[cell_index].population()
    }

    pub fn total_population(&self) -> usize {
        self.cells.iter().map(Cell::population).sum()
    }

    // Cached average of a cell, None when empty or not yet recomputed
    pub fn aggregate(&self, cell_index: usize) -> Option<&PseudoBoid> {
        self.cells[cell_index].aggregate.as_ref()
    }

    // Column and row of the cell owning `pos`
    #[inline]
    pub fn position_to_cell(&self, pos: Vector2) -> (usize, usize) {
        assert!(
            self.domain.contains(pos),
            "position {pos} is outside the simulation domain"
        );

        // Rounding can push a coordinate just below span onto the far edge
        let last = self.nodes_per_axis - 1;
        let column = ((pos.x / self.cell_span).floor() as usize).min(last);
        let row = ((pos.y / self.cell_span).floor() as usize).min(last);
        (column, row)
    }

    // Convert domain coordinates to a linear cell index
    #[inline]
    pub fn position_to_cell_index(&self, pos: Vector2) -> usize {
        let (column, row) = self.position_to_cell(pos);
        row * self.nodes_per_axis + column
    }

    // Clear every cell, aggregates included
    pub fn clear(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    // Insert one agent into the cell owning its position
    #[inline]
    pub fn insert(&mut self, position: Vector2, velocity: Vector2) {
        let cell_index = self.position_to_cell_index(position);
        self.cells[cell_index].insert(position, velocity);
    }

    // Refresh every cell's cached average; call once after all inserts
    pub fn recompute(&mut self) {
        for cell in &mut self.cells {
            cell.recompute();
        }
    }

    // Full per-tick rebuild from the current population
    pub fn rebuild(&mut self, positions: &[Vector2], velocities: &[Vector2]) {
        assert_eq!(
            positions.len(),
            velocities.len(),
            "position and velocity arrays must have the same length"
        );

        self.clear();
        for (&position, &velocity) in positions.iter().zip(velocities) {
            self.insert(position, velocity);
        }
        self.recompute();
    }

    // Fill `neighbors` with the fine and coarse tier around `pos`. The buffer
    // is cleared first and can be reused across calls.
    pub fn get_neighbors(&self, pos: Vector2, neighbors: &mut Vec<PseudoBoid>) {
        neighbors.clear();

        let (column, row) = self.position_to_cell(pos);
        let (column, row) = (column as isize, row as isize);
        let fine = self.fine_radius as isize;
        let coarse = self.coarse_radius as isize;
        let grid_size = self.nodes_per_axis as isize;

        for y_offset in -coarse..=coarse {
            let check_y = row + y_offset;

            // Skip if y is outside grid
            if check_y < 0 || check_y >= grid_size {
                continue;
            }

            let y_index = check_y as usize * self.nodes_per_axis;

            for x_offset in -coarse..=coarse {
                let check_x = column + x_offset;

                // Skip if x is outside grid
                if check_x < 0 || check_x >= grid_size {
                    continue;
                }

                let cell = &self.cells[y_index + check_x as usize];
                let in_fine_tier = x_offset.abs() <= fine && y_offset.abs() <= fine;

                if in_fine_tier {
                    neighbors.extend(
                        cell.positions
                            .iter()
                            .zip(&cell.velocities)
                            .map(|(&p, &v)| PseudoBoid::single(p, v)),
                    );
                } else if let Some(aggregate) = cell.aggregate {
                    neighbors.push(aggregate);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grid(nodes: usize) -> SpatialGrid {
        SpatialGrid::new(Domain::new(16.0).unwrap(), nodes).unwrap()
    }

    fn approx(a: Vector2, b: Vector2) -> bool {
        (a.x - b.x).abs() < 1e-4 && (a.y - b.y).abs() < 1e-4
    }

    #[test]
    fn rejects_bad_shapes() {
        let domain = Domain::default();
        assert!(SpatialGrid::new(domain, 1).is_err());
        assert!(SpatialGrid::with_tiers(domain, 8, 2, 2).is_err());
        assert!(SpatialGrid::with_tiers(domain, 8, 0, 1).is_ok());
    }

    #[test]
    fn cell_boundaries_resolve_to_one_cell() {
        // 4 cells of span 4
        let grid = grid(4);
        assert_eq!(grid.position_to_cell_index(Vector2::new(0.0, 0.0)), 0);
        assert_eq!(grid.position_to_cell_index(Vector2::new(4.0, 0.0)), 1);
        assert_eq!(grid.position_to_cell_index(Vector2::new(3.9999, 0.0)), 0);
        assert_eq!(grid.position_to_cell_index(Vector2::new(0.0, 4.0)), 4);
        assert_eq!(grid.position_to_cell_index(Vector2::new(15.99999, 15.99999)), 15);
    }

    #[test]
    #[should_panic(expected = "outside the simulation domain")]
    fn indexing_outside_the_domain_panics() {
        grid(4).position_to_cell_index(Vector2::new(16.0, 1.0));
    }

    #[test]
    fn aggregates_hold_member_count_and_means() {
        let mut grid = grid(4);
        let positions = [Vector2::new(1.0, 1.0), Vector2::new(2.0, 3.0), Vector2::new(3.0, 2.0)];
        let velocities = [Vector2::new(1.0, 0.0), Vector2::new(0.0, 1.0), Vector2::new(-1.0, 2.0)];
        grid.rebuild(&positions, &velocities);

        let aggregate = grid.aggregate(0).expect("cell 0 is populated");
        assert_eq!(aggregate.weight, 3.0);
        assert!(approx(aggregate.position, Vector2::new(2.0, 2.0)));
        assert!(approx(aggregate.velocity, Vector2::new(0.0, 1.0)));
        assert_eq!(grid.population(0), 3);
        assert_eq!(grid.total_population(), 3);
    }

    #[test]
    fn empty_cells_have_no_aggregate() {
        let mut grid = grid(4);
        grid.rebuild(&[Vector2::new(1.0, 1.0)], &[Vector2::ZERO]);
        assert!(grid.aggregate(0).is_some());
        for cell in 1..grid.cell_count() {
            assert!(grid.aggregate(cell).is_none());
        }
    }

    #[test]
    fn clear_invalidates_aggregates() {
        let mut grid = grid(4);
        grid.rebuild(&[Vector2::new(1.0, 1.0)], &[Vector2::ZERO]);
        grid.clear();
        assert!(grid.aggregate(0).is_none());
        assert_eq!(grid.total_population(), 0);
    }

    #[test]
    fn fine_tier_emits_every_agent_once() {
        // 8 cells of span 2
        let mut grid = grid(8);
        let positions = [
            Vector2::new(5.0, 5.0), // owning cell (2, 2)
            Vector2::new(5.5, 5.5), // same cell
            Vector2::new(3.0, 7.0), // (1, 3), fine
            Vector2::new(7.9, 3.1), // (3, 1), fine
            Vector2::new(9.0, 5.0), // (4, 2), coarse
        ];
        let velocities = [Vector2::ZERO; 5];
        grid.rebuild(&positions, &velocities);

        let mut neighbors = Vec::new();
        grid.get_neighbors(positions[0], &mut neighbors);

        for &p in &positions[..4] {
            let hits = neighbors
                .iter()
                .filter(|n| n.weight == 1.0 && n.position == p)
                .count();
            assert_eq!(hits, 1, "{p} should appear exactly once");
        }
        assert_eq!(neighbors.len(), 5);
    }

    #[test]
    fn coarse_tier_aggregates_distant_cells() {
        let mut grid = grid(8);
        let positions = [
            Vector2::new(1.0, 1.0),  // query cell (0, 0)
            Vector2::new(5.0, 1.0),  // (2, 0), coarse
            Vector2::new(5.5, 1.5),  // (2, 0), coarse
            Vector2::new(7.0, 7.0),  // (3, 3), coarse corner
            Vector2::new(9.0, 1.0),  // (4, 0), outside both tiers
        ];
        let velocities = [
            Vector2::ZERO,
            Vector2::new(2.0, 0.0),
            Vector2::new(0.0, 2.0),
            Vector2::ZERO,
            Vector2::ZERO,
        ];
        grid.rebuild(&positions, &velocities);

        let mut neighbors = Vec::new();
        grid.get_neighbors(positions[0], &mut neighbors);

        assert_eq!(neighbors.len(), 3);
        let pair = neighbors
            .iter()
            .find(|n| n.weight == 2.0)
            .expect("cell (2, 0) aggregate");
        assert!(approx(pair.position, Vector2::new(5.25, 1.25)));
        assert!(approx(pair.velocity, Vector2::new(1.0, 1.0)));
        assert!(neighbors.iter().all(|n| n.position.x < 8.0));
    }

    #[test]
    fn empty_cells_never_appear() {
        let mut grid = grid(8);
        grid.rebuild(&[Vector2::new(8.0, 8.0)], &[Vector2::ZERO]);

        let mut neighbors = Vec::new();
        grid.get_neighbors(Vector2::new(8.0, 8.0), &mut neighbors);
        assert_eq!(neighbors.len(), 1);
        assert!(neighbors.iter().all(|n| n.weight > 0.0));
    }

    #[test]
    fn queries_do_not_wrap_across_rows() {
        // Rightmost column must not see the leftmost column of the next row
        let mut grid = grid(8);
        let positions = [Vector2::new(15.0, 5.0), Vector2::new(1.0, 7.0)];
        grid.rebuild(&positions, &[Vector2::ZERO; 2]);

        let mut neighbors = Vec::new();
        grid.get_neighbors(positions[0], &mut neighbors);
        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].position, positions[0]);
    }

    #[test]
    fn buffer_is_reused() {
        let mut grid = grid(8);
        grid.rebuild(&[Vector2::new(1.0, 1.0), Vector2::new(15.0, 15.0)], &[Vector2::ZERO; 2]);

        let mut neighbors = Vec::new();
        grid.get_neighbors(Vector2::new(1.0, 1.0), &mut neighbors);
        grid.get_neighbors(Vector2::new(15.0, 15.0), &mut neighbors);
        assert_eq!(neighbors.len(), 1);
        assert_eq!(neighbors[0].position, Vector2::new(15.0, 15.0));
    }
}
