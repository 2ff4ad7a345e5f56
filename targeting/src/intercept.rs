//! Lead targeting: where to aim a constant-speed projectile at a constant-velocity target.
//!
//! # Model
//! With `d = target_pos - shooter_pos`, target velocity `v` and projectile speed `s`, the
//! time of flight `t` satisfies `|d + v*t| = s*t`. Squaring both sides gives
//!
//! ```text
//! (|v|^2 - s^2) * t^2 + 2 (v . d) * t + |d|^2 = 0
//! ```
//!
//! The smallest strictly positive root is the intercept time; the aim point is
//! `target_pos + v*t`.
//!
//! # Outcomes
//! - `Ok(Some(_))`: an intercept exists.
//! - `Ok(None)`: the target cannot be reached at this speed (negative discriminant, or no
//!   positive root). Callers decide what to do; there is no silent fallback aim point.
//! - `Err(_)`: invalid inputs (non-positive speed, NaN/infinite vectors).

use log::trace;

use crate::{
    constants::{COINCIDENT_DISTANCE_SQ, QUADRATIC_EPS},
    error::{Result, TargetingError},
    types::{VecN, ensure_finite, try_normalize},
};

/// A solved intercept.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct InterceptSolution<const D: usize> {
    /// Where the target will be when the projectile arrives. Aim here.
    pub aim_point: VecN<D>,
    /// Seconds from launch until impact (`>= 0`).
    pub time_of_flight: f32,
}

impl<const D: usize> InterceptSolution<D> {
    /// Unit launch direction from `shooter_pos` toward the aim point.
    ///
    /// `None` when the aim point coincides with the shooter (any direction hits).
    #[inline]
    pub fn launch_direction(&self, shooter_pos: &VecN<D>) -> Option<VecN<D>> {
        try_normalize(&(self.aim_point - shooter_pos))
    }

    /// Launch velocity of magnitude `projectile_speed` toward the aim point.
    #[inline]
    pub fn launch_velocity(&self, shooter_pos: &VecN<D>, projectile_speed: f32) -> Option<VecN<D>> {
        self.launch_direction(shooter_pos)
            .map(|dir| dir * projectile_speed)
    }
}

/// Solve for the aim point that intercepts a moving target.
///
/// See the module docs for the model. Degenerate cases:
/// - Target already at the shooter: `time_of_flight = 0`, aim at the target.
/// - Target speed equal to projectile speed (leading coefficient ~ 0): solved linearly as
///   `t = -|d|^2 / (2 v . d)`, which only has a positive root when the target approaches.
pub fn solve_intercept<const D: usize>(
    target_pos: &VecN<D>,
    target_vel: &VecN<D>,
    shooter_pos: &VecN<D>,
    projectile_speed: f32,
) -> Result<Option<InterceptSolution<D>>> {
    if !(projectile_speed.is_finite() && projectile_speed > 0.0) {
        return Err(TargetingError::InvalidProjectileSpeed(projectile_speed));
    }
    ensure_finite(target_pos, "target_pos")?;
    ensure_finite(target_vel, "target_vel")?;
    ensure_finite(shooter_pos, "shooter_pos")?;

    let to_target = target_pos - shooter_pos;
    let speed_sq = projectile_speed * projectile_speed;

    let a = target_vel.norm_squared() - speed_sq;
    let b = 2.0 * target_vel.dot(&to_target);
    let c = to_target.norm_squared();

    if c <= COINCIDENT_DISTANCE_SQ {
        return Ok(Some(InterceptSolution {
            aim_point: *target_pos,
            time_of_flight: 0.0,
        }));
    }

    let time = if a.abs() <= QUADRATIC_EPS * speed_sq {
        solve_linear(b, c)
    } else {
        solve_quadratic(a, b, c)
    };

    let Some(t) = time else {
        trace!("intercept: no positive time of flight (a = {a}, b = {b}, c = {c})");
        return Ok(None);
    };

    Ok(Some(InterceptSolution {
        aim_point: target_pos + target_vel * t,
        time_of_flight: t,
    }))
}

/// `b*t + c = 0` with `c > 0`: positive only when `b < 0` (target closing in).
#[inline]
fn solve_linear(b: f32, c: f32) -> Option<f32> {
    if b >= 0.0 {
        return None;
    }
    let t = -c / b;
    (t.is_finite() && t > 0.0).then_some(t)
}

/// Smallest strictly positive root of `a*t^2 + b*t + c`, if any.
///
/// Roots are `q / a` and `c / q` with `q = -(b + sign(b) * sqrt(disc)) / 2`, which never
/// subtracts nearly equal terms when `a` is small.
#[inline]
fn solve_quadratic(a: f32, b: f32, c: f32) -> Option<f32> {
    let discriminant = b * b - 4.0 * a * c;
    if discriminant < 0.0 {
        return None;
    }

    let q = -0.5 * (b + b.signum() * discriminant.sqrt());
    if q == 0.0 {
        return None;
    }
    let t1 = q / a;
    let t2 = c / q;
    let (lo, hi) = if t1 <= t2 { (t1, t2) } else { (t2, t1) };

    if lo > 0.0 {
        Some(lo)
    } else if hi > 0.0 {
        Some(hi)
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Vec2, Vec3};

    fn approx_eq<const D: usize>(a: &VecN<D>, b: &VecN<D>) -> bool {
        (a - b).norm() < 1.0e-4
    }

    #[test]
    fn stationary_target_aims_at_target() {
        let target = Vec3::new(10.0, 0.0, 0.0);
        let sol = solve_intercept(&target, &Vec3::zeros(), &Vec3::zeros(), 5.0)
            .unwrap()
            .unwrap();
        assert!(approx_eq(&sol.aim_point, &target));
        assert!((sol.time_of_flight - 2.0).abs() < 1.0e-6);
    }

    #[test]
    fn receding_faster_target_has_no_solution() {
        let sol = solve_intercept(
            &Vec3::new(10.0, 0.0, 0.0),
            &Vec3::new(10.0, 0.0, 0.0),
            &Vec3::zeros(),
            5.0,
        )
        .unwrap();
        assert!(sol.is_none());
    }

    #[test]
    fn crossing_target_is_led() {
        // Target at (0, 10) moving +x at 3; projectile speed 5. |(3t, 10)| = 5t => t = 2.5.
        let target = Vec2::new(0.0, 10.0);
        let vel = Vec2::new(3.0, 0.0);
        let sol = solve_intercept(&target, &vel, &Vec2::zeros(), 5.0)
            .unwrap()
            .unwrap();
        assert!((sol.time_of_flight - 2.5).abs() < 1.0e-4);
        assert!(approx_eq(&sol.aim_point, &Vec2::new(7.5, 10.0)));

        // The projectile really does arrive with the target.
        let dir = sol.launch_direction(&Vec2::zeros()).unwrap();
        let projectile_at_t = dir * 5.0 * sol.time_of_flight;
        let target_at_t = target + vel * sol.time_of_flight;
        assert!(approx_eq(&projectile_at_t, &target_at_t));
    }

    #[test]
    fn picks_smallest_positive_root() {
        // Fast target approaching head-on: both roots positive, take the earlier one.
        // d = 10, v = -10 (toward), s = 5: 75 t^2 - 200 t + 100 = 0 => t = 2/3 or 2.
        let sol = solve_intercept(
            &Vec3::new(10.0, 0.0, 0.0),
            &Vec3::new(-10.0, 0.0, 0.0),
            &Vec3::zeros(),
            5.0,
        )
        .unwrap()
        .unwrap();
        assert!((sol.time_of_flight - 2.0 / 3.0).abs() < 1.0e-4);
    }

    #[test]
    fn equal_speeds_use_linear_solve() {
        // Target approaching at the projectile's own speed: meet halfway.
        let sol = solve_intercept(
            &Vec3::new(10.0, 0.0, 0.0),
            &Vec3::new(-5.0, 0.0, 0.0),
            &Vec3::zeros(),
            5.0,
        )
        .unwrap()
        .unwrap();
        assert!((sol.time_of_flight - 1.0).abs() < 1.0e-5);
        assert!(approx_eq(&sol.aim_point, &Vec3::new(5.0, 0.0, 0.0)));

        // Same speed moving away never gets caught.
        let away = solve_intercept(
            &Vec3::new(10.0, 0.0, 0.0),
            &Vec3::new(5.0, 0.0, 0.0),
            &Vec3::zeros(),
            5.0,
        )
        .unwrap();
        assert!(away.is_none());

        // Same speed perpendicular: b = 0, no finite intercept.
        let sideways = solve_intercept(
            &Vec3::new(10.0, 0.0, 0.0),
            &Vec3::new(0.0, 5.0, 0.0),
            &Vec3::zeros(),
            5.0,
        )
        .unwrap();
        assert!(sideways.is_none());
    }

    #[test]
    fn near_equal_speeds_keep_precision() {
        // Leading coefficient just above the linear cutoff: the target closes at
        // almost exactly the projectile's speed.
        let target = Vec3::new(10.0, 0.0, 0.0);
        let vel = Vec3::new(-5.00003, 0.003, 0.0);
        let speed = 5.0;
        let sol = solve_intercept(&target, &vel, &Vec3::zeros(), speed)
            .unwrap()
            .unwrap();

        let t = sol.time_of_flight;
        assert!((t - 1.0).abs() < 1.0e-3, "t = {t}");
        let residual = ((target + vel * t).norm() - speed * t).abs();
        assert!(residual < 1.0e-3, "residual = {residual}");
    }

    #[test]
    fn coincident_target_is_immediate() {
        let p = Vec3::new(1.0, 2.0, 3.0);
        let sol = solve_intercept(&p, &Vec3::new(4.0, 0.0, 0.0), &p, 2.0)
            .unwrap()
            .unwrap();
        assert_eq!(sol.time_of_flight, 0.0);
        assert_eq!(sol.aim_point, p);
        assert!(sol.launch_direction(&p).is_none());
    }

    #[test]
    fn invalid_inputs_are_errors() {
        let z = Vec3::zeros();
        assert_eq!(
            solve_intercept(&z, &z, &z, 0.0),
            Err(TargetingError::InvalidProjectileSpeed(0.0))
        );
        assert!(solve_intercept(&z, &z, &z, -3.0).is_err());
        assert_eq!(
            solve_intercept(&Vec3::new(f32::NAN, 0.0, 0.0), &z, &z, 1.0),
            Err(TargetingError::NonFiniteInput("target_pos"))
        );
    }

    #[test]
    fn launch_velocity_has_projectile_speed() {
        let sol = solve_intercept(
            &Vec3::new(0.0, 0.0, 20.0),
            &Vec3::new(2.0, 0.0, 0.0),
            &Vec3::zeros(),
            10.0,
        )
        .unwrap()
        .unwrap();
        let v = sol.launch_velocity(&Vec3::zeros(), 10.0).unwrap();
        assert!((v.norm() - 10.0).abs() < 1.0e-4);
    }
}
