//! Distance metrics.
//!
//! All functions are pure and work in any dimension. Prefer [`distance_squared`] (or
//! [`within_range`]) for range checks: `distance <= r` is equivalent to
//! `distance_squared <= r * r` and skips the square root.

use nalgebra::Scalar;
use num_traits::Signed;

use crate::{
    constants::DEGENERATE_SEGMENT_LEN_SQ,
    types::{Vec3, VecN},
};

/// Squared Euclidean distance between `a` and `b`.
#[inline]
pub fn distance_squared<const D: usize>(a: &VecN<D>, b: &VecN<D>) -> f32 {
    (b - a).norm_squared()
}

/// Euclidean distance between `a` and `b`.
///
/// Only take the root when an actual magnitude is needed (display, arc length, speed).
#[inline]
pub fn distance<const D: usize>(a: &VecN<D>, b: &VecN<D>) -> f32 {
    distance_squared(a, b).sqrt()
}

/// Are `a` and `b` within `range` of each other? Compares squared values.
#[inline]
pub fn within_range<const D: usize>(a: &VecN<D>, b: &VecN<D>, range: f32) -> bool {
    distance_squared(a, b) <= range * range
}

/// Sum of absolute per-axis differences (4-directional grid movement cost).
///
/// Generic over signed scalars so it also works on integer grid coordinates.
#[inline]
pub fn manhattan<T, const D: usize>(a: &nalgebra::SVector<T, D>, b: &nalgebra::SVector<T, D>) -> T
where
    T: Scalar + Signed + Copy,
{
    a.iter()
        .zip(b.iter())
        .fold(T::zero(), |acc, (&x, &y)| acc + (x - y).abs())
}

/// Largest absolute per-axis difference (8-directional, "king's move" cost).
#[inline]
pub fn chebyshev<T, const D: usize>(a: &nalgebra::SVector<T, D>, b: &nalgebra::SVector<T, D>) -> T
where
    T: Scalar + Signed + PartialOrd + Copy,
{
    a.iter().zip(b.iter()).fold(T::zero(), |acc, (&x, &y)| {
        let d = (x - y).abs();
        if d > acc { d } else { acc }
    })
}

/// Closest point to `p` on the segment `[a, b]`.
///
/// Projects `p` onto the line through the segment and clamps the projection parameter to
/// `[0, 1]`. A segment shorter than `sqrt(DEGENERATE_SEGMENT_LEN_SQ)` collapses to `a`.
#[inline]
pub fn closest_point_on_segment<const D: usize>(
    p: &VecN<D>,
    a: &VecN<D>,
    b: &VecN<D>,
) -> VecN<D> {
    let ab = b - a;
    let len_sq = ab.norm_squared();
    if len_sq < DEGENERATE_SEGMENT_LEN_SQ {
        return *a;
    }

    let t = ((p - a).dot(&ab) / len_sq).clamp(0.0, 1.0);
    a + ab * t
}

/// Distance from `p` to the segment `[a, b]`; a zero-length segment measures to `a`.
#[inline]
pub fn point_to_segment<const D: usize>(p: &VecN<D>, a: &VecN<D>, b: &VecN<D>) -> f32 {
    distance(p, &closest_point_on_segment(p, a, b))
}

/// Squared distance in the horizontal (XZ) plane, ignoring height.
#[inline]
pub fn horizontal_distance_squared(a: &Vec3, b: &Vec3) -> f32 {
    let x = b.x - a.x;
    let z = b.z - a.z;
    x * x + z * z
}

/// Distance in the horizontal (XZ) plane, ignoring height.
#[inline]
pub fn horizontal_distance(a: &Vec3, b: &Vec3) -> f32 {
    horizontal_distance_squared(a, b).sqrt()
}
