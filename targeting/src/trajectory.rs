//! Sampled projectile paths under constant acceleration.
//!
//! # Model
//! Forward Euler with a fixed step `dt`, semi-implicit in the order the samples are taken:
//!
//! ```text
//! record p
//! v += a * dt
//! p += v * dt
//! ```
//!
//! so the first sample is always the start point. With zero acceleration this is exact:
//! sample `i` is `start + velocity * dt * i`. Paths are lazy: [`Trajectory::iter`] yields
//! samples on demand and can be restarted any number of times.

use std::iter::FusedIterator;

use log::trace;

use crate::{
    constants::{DEFAULT_ARC_POINTS, DEFAULT_ARC_TIME_STEP, GRAVITY_MPS2, NORMALIZE_EPS_SQ},
    error::{Result, TargetingError},
    ray_chain::{RayCaster, RayHit},
    types::{Vec3, VecN, ensure_finite},
};

/// Gravity as an acceleration vector along -Y.
#[inline]
pub fn gravity() -> Vec3 {
    Vec3::new(0.0, -GRAVITY_MPS2, 0.0)
}

/// A fixed-step path description; samples are produced by [`Trajectory::iter`].
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Trajectory<const D: usize> {
    start: VecN<D>,
    initial_velocity: VecN<D>,
    acceleration: VecN<D>,
    time_step: f32,
    steps: usize,
}

pub type Trajectory3 = Trajectory<3>;

/// Build a `steps`-sample path from `start` with the given initial velocity and constant
/// acceleration.
///
/// `time_step` must be finite and positive; all vectors must be finite. `steps == 0` is a
/// valid empty path.
pub fn integrate_trajectory<const D: usize>(
    start: VecN<D>,
    initial_velocity: VecN<D>,
    acceleration: VecN<D>,
    time_step: f32,
    steps: usize,
) -> Result<Trajectory<D>> {
    if !(time_step.is_finite() && time_step > 0.0) {
        return Err(TargetingError::InvalidTimeStep(time_step));
    }
    ensure_finite(&start, "start")?;
    ensure_finite(&initial_velocity, "initial_velocity")?;
    ensure_finite(&acceleration, "acceleration")?;

    Ok(Trajectory {
        start,
        initial_velocity,
        acceleration,
        time_step,
        steps,
    })
}

impl<const D: usize> Trajectory<D> {
    #[inline]
    pub fn start(&self) -> VecN<D> {
        self.start
    }

    #[inline]
    pub fn time_step(&self) -> f32 {
        self.time_step
    }

    /// Number of samples.
    #[inline]
    pub fn len(&self) -> usize {
        self.steps
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.steps == 0
    }

    /// Time of the last sample (seconds); zero for paths with fewer than two samples.
    #[inline]
    pub fn duration(&self) -> f32 {
        self.steps.saturating_sub(1) as f32 * self.time_step
    }

    /// Fresh iterator over the samples, starting at the start point.
    #[inline]
    pub fn iter(&self) -> TrajectoryIter<D> {
        TrajectoryIter {
            position: self.start,
            velocity: self.initial_velocity,
            acceleration: self.acceleration,
            time_step: self.time_step,
            remaining: self.steps,
        }
    }

    /// All samples, collected.
    pub fn points(&self) -> Vec<VecN<D>> {
        self.iter().collect()
    }
}

impl<'a, const D: usize> IntoIterator for &'a Trajectory<D> {
    type Item = VecN<D>;
    type IntoIter = TrajectoryIter<D>;

    #[inline]
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

/// Iterator over a [`Trajectory`]'s samples.
#[derive(Clone, Debug)]
pub struct TrajectoryIter<const D: usize> {
    position: VecN<D>,
    velocity: VecN<D>,
    acceleration: VecN<D>,
    time_step: f32,
    remaining: usize,
}

impl<const D: usize> Iterator for TrajectoryIter<D> {
    type Item = VecN<D>;

    #[inline]
    fn next(&mut self) -> Option<VecN<D>> {
        if self.remaining == 0 {
            return None;
        }
        self.remaining -= 1;

        let sample = self.position;
        self.velocity += self.acceleration * self.time_step;
        self.position += self.velocity * self.time_step;
        Some(sample)
    }

    #[inline]
    fn size_hint(&self) -> (usize, Option<usize>) {
        (self.remaining, Some(self.remaining))
    }
}

impl<const D: usize> ExactSizeIterator for TrajectoryIter<D> {}
impl<const D: usize> FusedIterator for TrajectoryIter<D> {}

/// Where a sampled arc first meets an obstacle.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ArcHit<H> {
    /// Index of the sample the hit segment starts at.
    pub segment: usize,
    /// The hit; `hit.distance` is measured from that sample.
    pub hit: RayHit<H>,
    /// Path length from the start of the arc to the hit (meters).
    pub arc_length: f32,
}

impl Trajectory<3> {
    /// Gravity arc with the default sample count and step, for aiming previews.
    #[inline]
    pub fn ballistic_arc(start: Vec3, initial_velocity: Vec3) -> Self {
        Self {
            start,
            initial_velocity,
            acceleration: gravity(),
            time_step: DEFAULT_ARC_TIME_STEP,
            steps: DEFAULT_ARC_POINTS,
        }
    }

    /// Cast along each consecutive sample pair and return the first hit.
    ///
    /// Zero-length segments (a projectile at its apex with `dt` too small to move) are skipped.
    pub fn first_hit<C>(&self, caster: &C) -> Option<ArcHit<C::Handle>>
    where
        C: RayCaster + ?Sized,
    {
        let mut samples = self.iter().enumerate();
        let (_, mut prev) = samples.next()?;
        let mut arc_length = 0.0f32;

        for (i, next) in samples {
            let delta = next - prev;
            let len_sq = delta.norm_squared();
            if len_sq > NORMALIZE_EPS_SQ {
                let len = len_sq.sqrt();
                if let Some(hit) = caster.cast_ray(prev, delta / len, len) {
                    trace!("arc hit on segment {} at {:?}", i - 1, hit.point);
                    return Some(ArcHit {
                        segment: i - 1,
                        arc_length: arc_length + hit.distance,
                        hit,
                    });
                }
                arc_length += len;
            }
            prev = next;
        }

        None
    }
}

/// Launch velocity that lands a gravity-only projectile from `origin` on `target` when
/// fired at `elevation` radians above the horizontal.
///
/// Uses the closed form for a height difference `h` over horizontal distance `d`:
///
/// ```text
/// v^2 = g d^2 / (2 cos^2(theta) (d tan(theta) - h))
/// ```
///
/// `None` when no such speed exists: the target is straight above/below, the elevation is
/// vertical, the angle is too shallow to clear `h`, or `gravity` is not positive.
pub fn launch_velocity_for_angle(
    origin: &Vec3,
    target: &Vec3,
    elevation: f32,
    gravity: f32,
) -> Option<Vec3> {
    if !(gravity.is_finite() && gravity > 0.0) || !elevation.is_finite() {
        return None;
    }

    let delta = target - origin;
    let horizontal = Vec3::new(delta.x, 0.0, delta.z);
    let d = horizontal.norm();
    let h = delta.y;
    if !(d.is_finite() && h.is_finite()) || d * d <= NORMALIZE_EPS_SQ {
        return None;
    }

    let (sin, cos) = elevation.sin_cos();
    if cos.abs() <= 1.0e-6 {
        return None;
    }

    let denom = 2.0 * cos * cos * (d * sin / cos - h);
    if denom <= 0.0 {
        return None;
    }

    let speed = (gravity * d * d / denom).sqrt();
    let heading = horizontal / d;
    Some(heading * (speed * cos) + Vec3::y() * (speed * sin))
}
