/// Tolerance used by [`crate::search::binary_search_approx`] when matching floating-point keys.
///
/// Matches are accepted when `|value - target| <= SEARCH_TOLERANCE`.
pub const SEARCH_TOLERANCE: f32 = 1.0e-6;

/// Squared length below which a segment is treated as a single point (m^2).
pub const DEGENERATE_SEGMENT_LEN_SQ: f32 = 1.0e-6;

/// Squared magnitude below which a vector is considered zero for normalization.
pub const NORMALIZE_EPS_SQ: f32 = 1.0e-12;

/// Relative threshold for the intercept quadratic's leading coefficient.
///
/// The solver falls back to a linear solve when
/// `|target_speed^2 - projectile_speed^2| <= QUADRATIC_EPS * projectile_speed^2`.
pub const QUADRATIC_EPS: f32 = 1.0e-6;

/// Squared shooter-to-target distance under which the target counts as already reached (m^2).
pub const COINCIDENT_DISTANCE_SQ: f32 = 1.0e-10;

/// Distance a chained ray is pushed past a surface before the next cast (meters).
///
/// Penetration offsets along the travel direction, ricochet along the hit normal.
/// Too small and the next cast re-hits the same surface; too large and thin obstacles are skipped.
pub const DEFAULT_SURFACE_OFFSET: f32 = 0.01;

/// Per-segment cast range used by ricochet chains when the caller does not set one.
pub const DEFAULT_RICOCHET_RANGE: f32 = f32::INFINITY;

/// Gravity magnitude in meters per second squared (positive value, acts along -Y).
pub const GRAVITY_MPS2: f32 = 9.81;

/// Number of arc samples used by callers that visualize a lobbed projectile.
pub const DEFAULT_ARC_POINTS: usize = 50;

/// Time step between arc samples for [`DEFAULT_ARC_POINTS`] (seconds).
pub const DEFAULT_ARC_TIME_STEP: f32 = 0.1;

/// Minimum `cos` between facing and the direction to a target for it to count as "in front"
/// or "behind" rather than to one side (about 45 degrees).
pub const FRONT_BACK_DOT_THRESHOLD: f32 = 0.7;

/// Default alignment (`cos` of the aim error) above which a shooter is facing its target.
pub const DEFAULT_FACING_ALIGNMENT: f32 = 0.95;
