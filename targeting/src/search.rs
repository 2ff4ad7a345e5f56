//! Ordered search over caller-sorted slices.
//!
//! Every function here assumes the input is already sorted ascending by the key it searches
//! on. Nothing is re-sorted and sortedness is not verified; an unsorted slice gives an
//! unspecified (but memory-safe) answer.
//!
//! # Algorithms
//! Interval halving over an inclusive `[left, right]` window with
//! `mid = left + (right - left) / 2`, so `left + right` is never formed.
//!
//! # Duplicates
//! When several elements match, [`binary_search_tolerant`] returns any one of them.
//! [`lower_bound_count`] is unaffected by duplicates: `<=` always narrows to the right.

use num_traits::Float;

use crate::{
    constants::SEARCH_TOLERANCE,
    distance::distance_squared,
    error::{Result, TargetingError},
    types::VecN,
};

/// Finds an index whose value lies within `tolerance` of `target`.
///
/// Returns `Ok(None)` when no element matches, including for an empty slice.
/// A negative or NaN `tolerance` is a configuration error.
pub fn binary_search_tolerant<K: Float>(
    sorted: &[K],
    target: K,
    tolerance: K,
) -> Result<Option<usize>> {
    binary_search_tolerant_by_key(sorted, target, tolerance, |k| *k)
}

/// Key-extracting form of [`binary_search_tolerant`].
///
/// `sorted` must be ascending by `key`.
pub fn binary_search_tolerant_by_key<T, K, F>(
    sorted: &[T],
    target: K,
    tolerance: K,
    key: F,
) -> Result<Option<usize>>
where
    K: Float,
    F: Fn(&T) -> K,
{
    if tolerance.is_nan() || tolerance < K::zero() {
        return Err(TargetingError::InvalidTolerance(
            tolerance.to_f32().unwrap_or(f32::NAN),
        ));
    }

    Ok(search_within(sorted, target, tolerance, &key))
}

/// [`binary_search_tolerant`] with the crate default [`SEARCH_TOLERANCE`].
pub fn binary_search_approx(sorted: &[f32], target: f32) -> Option<usize> {
    search_within(sorted, target, SEARCH_TOLERANCE, &|k: &f32| *k)
}

fn search_within<T, K, F>(sorted: &[T], target: K, tolerance: K, key: &F) -> Option<usize>
where
    K: Float,
    F: Fn(&T) -> K,
{
    if sorted.is_empty() {
        return None;
    }

    let mut left = 0usize;
    let mut right = sorted.len() - 1;

    while left <= right {
        let mid = left + (right - left) / 2;
        let value = key(&sorted[mid]);

        if (value - target).abs() <= tolerance {
            return Some(mid);
        }

        if value < target {
            left = mid + 1;
        } else {
            if mid == 0 {
                break;
            }
            right = mid - 1;
        }
    }

    None
}

/// Number of elements in `sorted` that are `<= value`.
///
/// Typical use is mapping a score onto a level: with thresholds `[0, 100, 500, 1000]`
/// a score of `750` has passed three thresholds. Returns `0` when `value` is below every
/// threshold and `sorted.len()` when it is at or above the last.
pub fn lower_bound_count<T: PartialOrd>(sorted: &[T], value: &T) -> usize {
    lower_bound_count_by_key(sorted, value, |t| t)
}

/// Key-extracting form of [`lower_bound_count`].
pub fn lower_bound_count_by_key<'a, T, K, F>(sorted: &'a [T], value: &K, key: F) -> usize
where
    K: PartialOrd + ?Sized + 'a,
    F: Fn(&'a T) -> &'a K,
{
    if sorted.is_empty() {
        return 0;
    }

    let mut left = 0usize;
    let mut right = sorted.len() - 1;
    let mut count = 0usize;

    while left <= right {
        let mid = left + (right - left) / 2;

        if key(&sorted[mid]) <= value {
            // Everything up to and including `mid` qualifies.
            count = mid + 1;
            left = mid + 1;
        } else {
            if mid == 0 {
                break;
            }
            right = mid - 1;
        }
    }

    count
}

/// Index of the first element whose key is `>= target`, clamped to the last index.
///
/// Returns `None` only for an empty slice. When every key is below `target` the last
/// index is returned, which makes the result usable as the center of a scan window.
pub fn first_not_less_by_key<T, K, F>(sorted: &[T], target: K, key: F) -> Option<usize>
where
    K: PartialOrd,
    F: Fn(&T) -> K,
{
    if sorted.is_empty() {
        return None;
    }

    let mut left = 0usize;
    let mut right = sorted.len() - 1;

    while left < right {
        let mid = left + (right - left) / 2;
        if key(&sorted[mid]) < target {
            left = mid + 1;
        } else {
            right = mid;
        }
    }

    Some(left)
}

/// Approximate nearest neighbor over items sorted by one coordinate axis.
///
/// Binary-searches the sort axis for the query's coordinate, then compares squared
/// distances over `window` items on each side of that position. The answer is exact only
/// if the true nearest item falls inside the window; widen `window` to trade speed for
/// accuracy.
///
/// Returns `None` for an empty slice or an `axis` outside `0..D`.
pub fn nearest_in_axis_window<T, P, const D: usize>(
    sorted: &[T],
    position: P,
    axis: usize,
    query: &VecN<D>,
    window: usize,
) -> Option<usize>
where
    P: Fn(&T) -> VecN<D>,
{
    let axis_value = *query.get(axis)?;
    let center = first_not_less_by_key(sorted, axis_value, |t| position(t)[axis])?;

    let start = center.saturating_sub(window);
    let end = center.saturating_add(window).min(sorted.len() - 1);

    let mut best: Option<(usize, f32)> = None;
    for (i, item) in sorted.iter().enumerate().take(end + 1).skip(start) {
        let d2 = distance_squared(query, &position(item));
        if best.map_or(true, |(_, b)| d2 < b) {
            best = Some((i, d2));
        }
    }

    best.map(|(i, _)| i)
}

/// Index of the first threshold that is `>= value`, or `None` past the last threshold.
///
/// Level-of-detail style lookup: with distance thresholds `[10, 50, 100]`, a distance of
/// `30` selects tier `1`.
pub fn tier_for_value<T: PartialOrd>(thresholds: &[T], value: &T) -> Option<usize> {
    let tier = thresholds.partition_point(|t| t < value);
    (tier < thresholds.len()).then_some(tier)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Vec3;

    const SCORES: [f32; 6] = [10.5, 23.7, 45.2, 67.8, 89.1, 120.3];

    #[test]
    fn finds_present_value() {
        assert_eq!(binary_search_tolerant(&SCORES, 67.8, 1.0e-4), Ok(Some(3)));
        assert_eq!(binary_search_approx(&SCORES, 10.5), Some(0));
        assert_eq!(binary_search_approx(&SCORES, 120.3), Some(5));
    }

    #[test]
    fn missing_value_is_not_found() {
        assert_eq!(binary_search_tolerant(&SCORES, 50.0, 1.0e-4), Ok(None));
        assert_eq!(binary_search_tolerant(&SCORES, -1.0, 1.0e-4), Ok(None));
        assert_eq!(binary_search_tolerant(&SCORES, 500.0, 1.0e-4), Ok(None));
    }

    #[test]
    fn tolerance_widens_match() {
        assert_eq!(binary_search_tolerant(&SCORES, 45.0, 0.5), Ok(Some(2)));
        assert_eq!(binary_search_tolerant(&SCORES, 45.0, 0.1), Ok(None));
    }

    #[test]
    fn empty_sequence_is_not_found() {
        let empty: [f64; 0] = [];
        assert_eq!(binary_search_tolerant(&empty, 1.0, 0.1), Ok(None));
        assert_eq!(lower_bound_count(&empty, &1.0), 0);
        assert_eq!(first_not_less_by_key(&empty, 1.0, |v| *v), None);
    }

    #[test]
    fn invalid_tolerance_fails_fast() {
        assert_eq!(
            binary_search_tolerant(&SCORES, 10.5, -1.0),
            Err(TargetingError::InvalidTolerance(-1.0))
        );
        assert!(matches!(
            binary_search_tolerant(&SCORES, 10.5, f32::NAN),
            Err(TargetingError::InvalidTolerance(t)) if t.is_nan()
        ));
    }

    #[test]
    fn duplicates_return_a_matching_index() {
        let values = [1.0f32, 2.0, 2.0, 2.0, 3.0];
        let idx = binary_search_tolerant(&values, 2.0, 0.0).unwrap().unwrap();
        assert!((1..=3).contains(&idx));
    }

    #[test]
    fn searches_by_key() {
        struct Marker {
            x: f32,
        }
        let markers: Vec<Marker> = SCORES.iter().map(|&x| Marker { x }).collect();
        assert_eq!(
            binary_search_tolerant_by_key(&markers, 89.1, 1.0e-4, |m| m.x),
            Ok(Some(4))
        );
    }

    #[test]
    fn lower_bound_counts_thresholds_passed() {
        let thresholds = [0, 100, 500, 1000, 5000, 10000];
        assert_eq!(lower_bound_count(&thresholds, &750), 3);
        assert_eq!(lower_bound_count(&thresholds, &-5), 0);
        assert_eq!(lower_bound_count(&thresholds, &0), 1);
        // Exact boundary counts the boundary itself, once.
        assert_eq!(lower_bound_count(&thresholds, &1000), 4);
        assert_eq!(lower_bound_count(&thresholds, &10000), 6);
        assert_eq!(lower_bound_count(&thresholds, &99999), 6);
    }

    #[test]
    fn lower_bound_counts_duplicates() {
        let thresholds = [1, 2, 2, 2, 3];
        assert_eq!(lower_bound_count(&thresholds, &2), 4);
        assert_eq!(lower_bound_count(&thresholds, &1), 1);
    }

    #[test]
    fn lower_bound_by_key_reads_field() {
        let levels = [("bronze", 100u32), ("silver", 500), ("gold", 1000)];
        assert_eq!(lower_bound_count_by_key(&levels, &750, |l| &l.1), 2);
    }

    #[test]
    fn first_not_less_clamps_to_last() {
        let xs = [1.0f32, 3.0, 5.0, 7.0];
        assert_eq!(first_not_less_by_key(&xs, 4.0, |v| *v), Some(2));
        assert_eq!(first_not_less_by_key(&xs, 5.0, |v| *v), Some(2));
        assert_eq!(first_not_less_by_key(&xs, -10.0, |v| *v), Some(0));
        assert_eq!(first_not_less_by_key(&xs, 100.0, |v| *v), Some(3));
    }

    #[test]
    fn axis_window_finds_nearest() {
        let enemies: Vec<Vec3> = (0..100)
            .map(|i| Vec3::new(i as f32, (i % 7) as f32, 0.0))
            .collect();
        let query = Vec3::new(42.2, 0.0, 0.0);

        let idx = nearest_in_axis_window(&enemies, |p| *p, 0, &query, 10).unwrap();

        let brute = enemies
            .iter()
            .enumerate()
            .min_by(|(_, a), (_, b)| {
                distance_squared(&query, *a).total_cmp(&distance_squared(&query, *b))
            })
            .map(|(i, _)| i)
            .unwrap();
        assert_eq!(idx, brute);
    }

    #[test]
    fn axis_window_rejects_bad_axis_and_empty() {
        let points = [Vec3::zeros()];
        assert_eq!(
            nearest_in_axis_window(&points, |p| *p, 3, &Vec3::zeros(), 4),
            None
        );
        let empty: [Vec3; 0] = [];
        assert_eq!(
            nearest_in_axis_window(&empty, |p| *p, 0, &Vec3::zeros(), 4),
            None
        );
    }

    #[test]
    fn tier_lookup_matches_lod_bands() {
        let bands = [10.0f32, 50.0, 100.0];
        assert_eq!(tier_for_value(&bands, &5.0), Some(0));
        assert_eq!(tier_for_value(&bands, &10.0), Some(0));
        assert_eq!(tier_for_value(&bands, &30.0), Some(1));
        assert_eq!(tier_for_value(&bands, &100.0), Some(2));
        assert_eq!(tier_for_value(&bands, &150.0), None);
    }
}
