//! Facing and orientation predicates built on dot and cross products.
//!
//! Conventions
//! - +Y is up; "left" and "right" are judged in the horizontal sense around +Y.
//! - An [`Observer`] stores a unit forward vector. Its right-hand side is `forward x up`, so an
//!   observer facing +Z has its right toward -X.
//! - Angles are radians.
//!
//! A target at the observer's own position has no direction. Predicates about it return
//! `false`, and the measuring functions return `None`.

use crate::{
    constants::{DEFAULT_FACING_ALIGNMENT, FRONT_BACK_DOT_THRESHOLD},
    error::{Result, TargetingError},
    types::{Vec3, ensure_finite, try_normalize},
};

/// Where a target lies relative to an observer's facing.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RelativeDirection {
    Forward,
    Behind,
    Left,
    Right,
}

/// A position plus a unit facing direction.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Observer {
    pub position: Vec3,
    forward: Vec3,
}

impl Observer {
    /// Fails with [`TargetingError::DegenerateDirection`] for a zero `forward`.
    pub fn new(position: Vec3, forward: Vec3) -> Result<Self> {
        ensure_finite(&position, "position")?;
        let forward = try_normalize(&forward).ok_or(TargetingError::DegenerateDirection)?;
        Ok(Self { position, forward })
    }

    /// Unit forward vector.
    #[inline]
    pub fn forward(&self) -> Vec3 {
        self.forward
    }

    /// Unit right vector (`forward x up`), or zero when facing straight up or down.
    #[inline]
    pub fn right(&self) -> Vec3 {
        try_normalize(&self.forward.cross(&Vec3::y())).unwrap_or_else(Vec3::zeros)
    }

    /// Unit direction from the observer to `target`.
    #[inline]
    pub fn direction_to(&self, target: &Vec3) -> Option<Vec3> {
        try_normalize(&(target - self.position))
    }

    /// Cosine of the angle between forward and the direction to `target`, in `[-1, 1]`.
    #[inline]
    pub fn alignment(&self, target: &Vec3) -> Option<f32> {
        self.direction_to(target)
            .map(|dir| self.forward.dot(&dir).clamp(-1.0, 1.0))
    }

    /// Is `target` inside a view cone of full angle `fov` centered on forward?
    pub fn is_in_field_of_view(&self, target: &Vec3, fov: f32) -> bool {
        let min_dot = (fov * 0.5).cos();
        self.alignment(target).is_some_and(|dot| dot >= min_dot)
    }

    /// [`Observer::is_in_field_of_view`] limited to `max_distance` (inclusive).
    pub fn can_see_target(&self, target: &Vec3, fov: f32, max_distance: f32) -> bool {
        (target - self.position).norm_squared() <= max_distance * max_distance
            && self.is_in_field_of_view(target, fov)
    }

    /// Is `target` in the half-space behind the observer?
    pub fn is_target_behind(&self, target: &Vec3) -> bool {
        self.alignment(target).is_some_and(|dot| dot < 0.0)
    }

    /// Is the aim error small enough, with `min_alignment` the cosine of the largest error?
    pub fn is_facing_target(&self, target: &Vec3, min_alignment: f32) -> bool {
        self.alignment(target).is_some_and(|dot| dot >= min_alignment)
    }

    /// [`Observer::is_facing_target`] with [`DEFAULT_FACING_ALIGNMENT`].
    #[inline]
    pub fn is_roughly_facing(&self, target: &Vec3) -> bool {
        self.is_facing_target(target, DEFAULT_FACING_ALIGNMENT)
    }

    /// Aim accuracy as a percentage: 100 dead ahead, 50 perpendicular, 0 directly behind.
    pub fn aim_accuracy(&self, target: &Vec3) -> Option<f32> {
        self.alignment(target).map(|dot| (dot + 1.0) * 50.0)
    }

    /// Is `target` on the observer's right-hand side?
    pub fn is_target_on_right(&self, target: &Vec3) -> bool {
        self.right().dot(&(target - self.position)) > 0.0
    }

    /// Classify `target` as forward/behind when within about 45 degrees of the facing
    /// axis, otherwise left/right.
    pub fn relative_direction(&self, target: &Vec3) -> Option<RelativeDirection> {
        let dir = self.direction_to(target)?;
        let dot = self.forward.dot(&dir);

        let side = if dot.abs() > FRONT_BACK_DOT_THRESHOLD {
            if dot > 0.0 {
                RelativeDirection::Forward
            } else {
                RelativeDirection::Behind
            }
        } else if self.right().dot(&dir) > 0.0 {
            RelativeDirection::Right
        } else {
            RelativeDirection::Left
        };
        Some(side)
    }
}

/// Angle between a surface normal and +Y.
pub fn slope_angle(surface_normal: &Vec3) -> Option<f32> {
    try_normalize(surface_normal).map(|n| n.y.clamp(-1.0, 1.0).acos())
}

/// Can a character stand on a surface no steeper than `max_slope`?
pub fn is_walkable(surface_normal: &Vec3, max_slope: f32) -> bool {
    slope_angle(surface_normal).is_some_and(|angle| angle <= max_slope)
}

/// Remove the component of `velocity` along `surface_normal` (slide along the surface).
///
/// A zero normal leaves `velocity` unchanged.
pub fn project_on_surface(velocity: &Vec3, surface_normal: &Vec3) -> Vec3 {
    match try_normalize(surface_normal) {
        Some(n) => velocity - n * velocity.dot(&n),
        None => *velocity,
    }
}

/// Angle from `from` to `to`, positive when the turn is counter-clockwise about
/// `axis` (right-hand rule), negative otherwise. Range `[-pi, pi]`.
pub fn signed_angle(from: &Vec3, to: &Vec3, axis: &Vec3) -> f32 {
    let angle = from.angle(to);
    if axis.dot(&from.cross(to)) < 0.0 {
        -angle
    } else {
        angle
    }
}
