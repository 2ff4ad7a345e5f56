/*!
Math aliases and small value types shared by every query module.

Vectors are `nalgebra` static vectors: `Copy` values with operator overloads, so
passing a position through the grid, search and intercept code never aliases caller state.

Conventions
- Units are meters and seconds.
- +Y is up in 3D; the horizontal plane is XZ.
- 2D positions are `(x, y)` in whatever plane the caller projects onto.
*/

use nalgebra as na;

use crate::{
    constants::NORMALIZE_EPS_SQ,
    error::{Result, TargetingError},
};

/// A position or direction in `D` dimensions.
pub type VecN<const D: usize> = na::SVector<f32, D>;
pub type Vec2 = na::Vector2<f32>;
pub type Vec3 = na::Vector3<f32>;

/// A half-line: `origin + direction * t` for `t >= 0`.
///
/// `direction` is not required to be unit length. Functions that need a unit direction
/// normalize a copy and report [`TargetingError::DegenerateDirection`] when that is impossible.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    #[inline]
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    /// Point at parameter `t` along the (unnormalized) direction.
    #[inline]
    pub fn point_at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }

    /// Copy of this ray with a unit-length direction.
    pub fn normalized(&self) -> Result<Self> {
        let direction = try_normalize(&self.direction).ok_or(TargetingError::DegenerateDirection)?;
        Ok(Self {
            origin: self.origin,
            direction,
        })
    }
}

/// Unit vector in the direction of `v`, or `None` if `v` is (near) zero.
#[inline]
pub fn try_normalize<const D: usize>(v: &VecN<D>) -> Option<VecN<D>> {
    let len_sq = v.norm_squared();
    if len_sq > NORMALIZE_EPS_SQ && len_sq.is_finite() {
        Some(*v / len_sq.sqrt())
    } else {
        None
    }
}

/// Unit vector in the direction of `v`, or the zero vector if `v` is (near) zero.
#[inline]
pub fn normalize_or_zero<const D: usize>(v: &VecN<D>) -> VecN<D> {
    try_normalize(v).unwrap_or_else(VecN::zeros)
}

/// Fail with [`TargetingError::NonFiniteInput`] if any component of `v` is NaN or infinite.
#[inline]
pub(crate) fn ensure_finite<const D: usize>(v: &VecN<D>, what: &'static str) -> Result<()> {
    if v.iter().all(|c| c.is_finite()) {
        Ok(())
    } else {
        Err(TargetingError::NonFiniteInput(what))
    }
}
