//! Linear-scan proximity helpers over position slices.
//!
//! These are the brute-force counterparts of [`crate::grid::SpatialGrid`]: fine for a few
//! hundred entities, and the reference the grid is tested against. All comparisons use
//! squared distances.

use crate::{distance::distance_squared, types::VecN};

/// Index of the position closest to `query`, or `None` for an empty slice.
///
/// Ties keep the earliest index.
pub fn nearest_index<const D: usize>(query: &VecN<D>, positions: &[VecN<D>]) -> Option<usize> {
    let mut best: Option<(usize, f32)> = None;
    for (i, p) in positions.iter().enumerate() {
        let d2 = distance_squared(query, p);
        if best.map_or(true, |(_, b)| d2 < b) {
            best = Some((i, d2));
        }
    }
    best.map(|(i, _)| i)
}

/// Number of positions within `range` of `center` (inclusive).
pub fn count_within_range<const D: usize>(
    center: &VecN<D>,
    positions: &[VecN<D>],
    range: f32,
) -> usize {
    let range_sq = range * range;
    positions
        .iter()
        .filter(|p| distance_squared(center, *p) <= range_sq)
        .count()
}

/// Does any position have at least `min_neighbors` other positions within `radius`?
///
/// Returns as soon as one such cluster is found. O(n^2) in the worst case.
pub fn has_cluster<const D: usize>(positions: &[VecN<D>], min_neighbors: usize, radius: f32) -> bool {
    if min_neighbors == 0 {
        return !positions.is_empty();
    }

    let radius_sq = radius * radius;
    for (i, a) in positions.iter().enumerate() {
        let mut nearby = 0usize;
        for (j, b) in positions.iter().enumerate() {
            if i == j || distance_squared(a, b) > radius_sq {
                continue;
            }
            nearby += 1;
            if nearby >= min_neighbors {
                return true;
            }
        }
    }

    false
}
