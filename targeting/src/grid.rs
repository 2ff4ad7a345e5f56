//! Uniform spatial hash grid.
//!
//! # Model
//! - Space is cut into cubes (squares in 2D) of side `cell_size` meters.
//! - A position maps to the [`GridCell`] `floor(coord / cell_size)` on every axis.
//! - Each occupied cell stores a snapshot of `(entity, position)` pairs taken at build time.
//!
//! # Lifecycle
//! The grid is rebuilt wholesale from a snapshot whenever positions change materially
//! (typically once per simulation tick) and then queried any number of times. There is no
//! per-entity insert/remove/move: stale buckets are not possible by construction.
//! [`SpatialGrid::rebuild`] takes `&mut self`, so queries and rebuilds cannot overlap.
//!
//! # Neighborhood queries
//! [`SpatialGrid::query_neighbor_cells`] returns every entity in the 3x3 (2D) or 3x3x3 (3D)
//! block of cells around the query point. This never misses an entity within `cell_size`
//! of the query, but may return entities up to `2 * cell_size * sqrt(D)` away; filter
//! exactly if that matters (or use [`SpatialGrid::query_radius`]).
//!
//! Precondition (not validated): choose `cell_size >= ` the largest query radius you use.

use std::collections::HashMap;

use log::debug;

use crate::{
    distance::distance_squared,
    error::{Result, TargetingError},
    types::VecN,
};

/// Integer cell coordinates of a position.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct GridCell<const D: usize>(pub [i32; D]);

impl<const D: usize> GridCell<D> {
    /// Number of cells in a neighborhood block (`3^D`).
    pub const NEIGHBORHOOD_LEN: usize = 3usize.pow(D as u32);

    /// Cell containing `position` for the given cell size.
    #[inline]
    fn from_position(position: &VecN<D>, cell_size: f32) -> Self {
        // `as` saturates out-of-range floats and maps NaN to 0.
        Self(std::array::from_fn(|axis| {
            (position[axis] / cell_size).floor() as i32
        }))
    }

    /// The `3^D` cells forming the block centered on `self`, including `self`.
    ///
    /// Ordering is lexicographic over per-axis offsets `-1, 0, +1` with axis 0 varying
    /// slowest. Cells that would overflow `i32` are skipped, so the block may be smaller at
    /// the extreme edges of the coordinate range.
    pub fn neighborhood(self) -> impl Iterator<Item = GridCell<D>> {
        (0..Self::NEIGHBORHOOD_LEN).filter_map(move |code| {
            let mut out = [0i32; D];
            let mut rest = code;
            for axis in (0..D).rev() {
                let offset = (rest % 3) as i32 - 1;
                rest /= 3;
                out[axis] = self.0[axis].checked_add(offset)?;
            }
            Some(GridCell(out))
        })
    }
}

/// Spatial hash grid over entity handles `E` in `D` dimensions.
///
/// `E` is an opaque, caller-owned reference (an index, an ECS id, a handle). The grid
/// copies it but never interprets it.
#[derive(Clone, Debug)]
pub struct SpatialGrid<E, const D: usize> {
    cell_size: f32,
    cells: HashMap<GridCell<D>, Vec<(E, VecN<D>)>>,
    len: usize,
}

pub type SpatialGrid2<E> = SpatialGrid<E, 2>;
pub type SpatialGrid3<E> = SpatialGrid<E, 3>;

impl<E: Copy, const D: usize> SpatialGrid<E, D> {
    /// Creates an empty grid.
    ///
    /// Fails with [`TargetingError::InvalidCellSize`] unless `cell_size` is positive and finite.
    pub fn new(cell_size: f32) -> Result<Self> {
        if !(cell_size.is_finite() && cell_size > 0.0) {
            return Err(TargetingError::InvalidCellSize(cell_size));
        }

        Ok(Self {
            cell_size,
            cells: HashMap::new(),
            len: 0,
        })
    }

    /// Creates a grid and populates it from a snapshot of `(entity, position)` pairs.
    pub fn build(
        cell_size: f32,
        entries: impl IntoIterator<Item = (E, VecN<D>)>,
    ) -> Result<Self> {
        let mut grid = Self::new(cell_size)?;
        grid.rebuild(entries);
        Ok(grid)
    }

    /// Clears the grid and repopulates it from `entries` in O(n).
    ///
    /// Bucket allocations are reused across rebuilds; cells left empty are dropped.
    pub fn rebuild(&mut self, entries: impl IntoIterator<Item = (E, VecN<D>)>) {
        for bucket in self.cells.values_mut() {
            bucket.clear();
        }
        self.len = 0;

        for (entity, position) in entries {
            let cell = GridCell::from_position(&position, self.cell_size);
            self.cells.entry(cell).or_default().push((entity, position));
            self.len += 1;
        }

        self.cells.retain(|_, bucket| !bucket.is_empty());

        debug!(
            "spatial grid rebuilt: {} entities in {} cells (cell_size = {})",
            self.len,
            self.cells.len(),
            self.cell_size
        );
    }

    /// Cell side length in meters.
    #[inline]
    pub fn cell_size(&self) -> f32 {
        self.cell_size
    }

    /// Number of entities indexed by the last build.
    #[inline]
    pub fn len(&self) -> usize {
        self.len
    }

    /// Return true if the last build indexed no entities.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Number of occupied cells.
    #[inline]
    pub fn cell_count(&self) -> usize {
        self.cells.len()
    }

    /// Cell containing `position`.
    #[inline]
    pub fn cell_of(&self, position: &VecN<D>) -> GridCell<D> {
        GridCell::from_position(position, self.cell_size)
    }

    /// Snapshot entries stored in `cell` (empty if the cell is unoccupied).
    pub fn entries_in(&self, cell: GridCell<D>) -> &[(E, VecN<D>)] {
        self.cells.get(&cell).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterates `(entity, snapshot_position)` for every entry in the neighborhood block of
    /// the cell containing `position`.
    pub fn neighbor_entries(&self, position: &VecN<D>) -> impl Iterator<Item = &(E, VecN<D>)> {
        self.cell_of(position)
            .neighborhood()
            .filter_map(|cell| self.cells.get(&cell))
            .flatten()
    }

    /// Every entity in the 3x3 (2D) / 3x3x3 (3D) block around `position`, unordered.
    ///
    /// Candidates only: callers apply their own exact distance filter.
    pub fn query_neighbor_cells(&self, position: &VecN<D>) -> Vec<E> {
        self.neighbor_entries(position)
            .map(|&(entity, _)| entity)
            .collect()
    }

    /// Entities whose snapshot position is within `radius` of `position`.
    ///
    /// Exact for `radius <= cell_size`; larger radii can miss entities outside the block.
    pub fn query_radius(&self, position: &VecN<D>, radius: f32) -> Vec<E> {
        let radius_sq = radius * radius;
        self.neighbor_entries(position)
            .filter(|(_, p)| distance_squared(position, p) <= radius_sq)
            .map(|&(entity, _)| entity)
            .collect()
    }

    /// Closest entity in the neighborhood block of `position`, with its squared distance.
    ///
    /// Returns `None` if the block is empty. An entity farther than `cell_size` may be
    /// returned when nothing closer is indexed nearby.
    pub fn nearest(&self, position: &VecN<D>) -> Option<(E, f32)> {
        let mut best: Option<(E, f32)> = None;
        for &(entity, p) in self.neighbor_entries(position) {
            let d2 = distance_squared(position, &p);
            if best.map_or(true, |(_, b)| d2 < b) {
                best = Some((entity, d2));
            }
        }
        best
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Vec2, Vec3};

    #[test]
    fn rejects_non_positive_cell_size() {
        assert_eq!(
            SpatialGrid2::<u32>::new(0.0).unwrap_err(),
            TargetingError::InvalidCellSize(0.0)
        );
        assert!(SpatialGrid3::<u32>::new(-1.0).is_err());
        assert!(SpatialGrid3::<u32>::new(f32::NAN).is_err());
        assert!(SpatialGrid3::<u32>::new(f32::INFINITY).is_err());
    }

    #[test]
    fn cell_mapping_floors_negative_coordinates() {
        let grid = SpatialGrid2::<u32>::new(10.0).unwrap();
        assert_eq!(grid.cell_of(&Vec2::new(0.0, 0.0)), GridCell([0, 0]));
        assert_eq!(grid.cell_of(&Vec2::new(9.99, 19.99)), GridCell([0, 1]));
        assert_eq!(grid.cell_of(&Vec2::new(-0.01, -10.0)), GridCell([-1, -1]));
        assert_eq!(grid.cell_of(&Vec2::new(-10.01, 10.0)), GridCell([-2, 1]));
    }

    #[test]
    fn cell_mapping_divides_at_rounding_boundaries() {
        // 0.3 is not representable; keys follow `floor(coord / cell_size)` in f32.
        let grid = SpatialGrid2::<u32>::new(0.3).unwrap();
        assert_eq!(grid.cell_of(&Vec2::new(4.5, -7.0 * 0.3)), GridCell([14, -7]));
    }

    #[test]
    fn identical_positions_share_a_cell() {
        let grid = SpatialGrid3::<u32>::new(2.5).unwrap();
        let a = Vec3::new(7.3, -1.2, 100.4);
        let b = Vec3::new(7.3, -1.2, 100.4);
        assert_eq!(grid.cell_of(&a), grid.cell_of(&b));
        assert_eq!(grid.cell_of(&a), GridCell([2, -1, 40]));
    }

    #[test]
    fn neighborhood_sizes_and_center() {
        let c2 = GridCell([5, -3]);
        let block2: Vec<_> = c2.neighborhood().collect();
        assert_eq!(block2.len(), 9);
        assert_eq!(block2[4], c2);
        assert_eq!(block2[0], GridCell([4, -4]));
        assert_eq!(block2[8], GridCell([6, -2]));

        let c3 = GridCell([0, 0, 0]);
        let block3: Vec<_> = c3.neighborhood().collect();
        assert_eq!(block3.len(), 27);
        assert_eq!(block3[13], c3);
    }

    #[test]
    fn neighborhood_skips_overflowing_cells() {
        let edge = GridCell([i32::MAX, 0]);
        let block: Vec<_> = edge.neighborhood().collect();
        assert_eq!(block.len(), 6);
        assert!(block.iter().all(|c| c.0[0] >= i32::MAX - 1));
    }

    #[test]
    fn query_returns_neighbors_and_excludes_far_cells() {
        let entries = [
            (0u32, Vec2::new(1.0, 1.0)),
            (1, Vec2::new(12.0, 1.0)),
            (2, Vec2::new(-8.0, -8.0)),
            (3, Vec2::new(25.0, 0.0)),
            (4, Vec2::new(1.0, -35.0)),
        ];
        let grid = SpatialGrid2::build(10.0, entries).unwrap();
        assert_eq!(grid.len(), 5);

        let mut found = grid.query_neighbor_cells(&Vec2::new(2.0, 2.0));
        found.sort_unstable();
        assert_eq!(found, vec![0, 1, 2]);
    }

    #[test]
    fn query_radius_filters_exactly() {
        let entries = [
            (0u32, Vec3::new(0.0, 0.0, 0.0)),
            (1, Vec3::new(3.0, 0.0, 0.0)),
            (2, Vec3::new(6.0, 0.0, 0.0)),
        ];
        let grid = SpatialGrid3::build(5.0, entries).unwrap();

        let mut near = grid.query_radius(&Vec3::zeros(), 4.0);
        near.sort_unstable();
        assert_eq!(near, vec![0, 1]);
    }

    #[test]
    fn nearest_picks_closest_candidate() {
        let entries = [
            ("far", Vec2::new(9.0, 9.0)),
            ("near", Vec2::new(1.0, 0.5)),
            ("mid", Vec2::new(-3.0, 0.0)),
        ];
        let grid = SpatialGrid2::build(10.0, entries).unwrap();
        let (who, d2) = grid.nearest(&Vec2::zeros()).unwrap();
        assert_eq!(who, "near");
        assert!((d2 - 1.25).abs() < 1.0e-6);

        let empty = SpatialGrid2::<&str>::new(10.0).unwrap();
        assert!(empty.nearest(&Vec2::zeros()).is_none());
    }

    #[test]
    fn rebuild_replaces_previous_snapshot() {
        let mut grid = SpatialGrid2::build(1.0, [(7u32, Vec2::new(0.5, 0.5))]).unwrap();
        assert_eq!(grid.query_neighbor_cells(&Vec2::new(0.5, 0.5)), vec![7]);

        grid.rebuild([(8u32, Vec2::new(50.5, 50.5)), (9, Vec2::new(50.2, 50.9))]);
        assert_eq!(grid.len(), 2);
        assert_eq!(grid.cell_count(), 1);
        assert!(grid.query_neighbor_cells(&Vec2::new(0.5, 0.5)).is_empty());
        assert_eq!(grid.entries_in(GridCell([50, 50])).len(), 2);

        grid.rebuild(std::iter::empty::<(u32, Vec2)>());
        assert!(grid.is_empty());
        assert_eq!(grid.cell_count(), 0);
    }

    #[test]
    fn duplicate_handles_are_kept_per_entry() {
        let grid =
            SpatialGrid2::build(4.0, [(1u8, Vec2::new(0.0, 0.0)), (1u8, Vec2::new(1.0, 0.0))])
                .unwrap();
        assert_eq!(grid.query_neighbor_cells(&Vec2::zeros()), vec![1, 1]);
    }
}
