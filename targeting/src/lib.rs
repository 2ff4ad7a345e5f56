//! Spatial queries and predictive targeting for real-time simulations.
//!
//! - [`search`]: tolerant binary search and threshold counting over caller-sorted slices.
//! - [`grid`]: uniform spatial hash for neighbor queries.
//! - [`distance`] / [`proximity`]: metrics and brute-force helpers.
//! - [`facing`]: field-of-view and orientation predicates.
//! - [`intercept`]: lead aiming at constant-velocity targets.
//! - [`trajectory`]: sampled constant-acceleration paths and ballistic launch speeds.
//! - [`ray_chain`]: penetration and ricochet chains over an injected [`RayCaster`].
//! - [`rapier_world`]: a [`RayCaster`] backed by static Rapier geometry.
//!
//! Everything is synchronous and allocation-light; the crate never installs a logger.

#![cfg_attr(not(test), deny(clippy::unwrap_used, clippy::expect_used))]

pub mod constants;
pub mod distance;
pub mod error;
pub mod facing;
pub mod grid;
pub mod intercept;
pub mod proximity;
pub mod rapier_world;
pub mod ray_chain;
pub mod search;
pub mod trajectory;
pub mod types;

pub use constants::{
    DEFAULT_ARC_POINTS, DEFAULT_ARC_TIME_STEP, DEFAULT_FACING_ALIGNMENT, DEFAULT_RICOCHET_RANGE,
    DEFAULT_SURFACE_OFFSET, FRONT_BACK_DOT_THRESHOLD, GRAVITY_MPS2, SEARCH_TOLERANCE,
};
pub use distance::{
    chebyshev, distance, distance_squared, horizontal_distance, manhattan, point_to_segment,
    within_range,
};
pub use error::{Result, TargetingError};
pub use facing::{
    Observer, RelativeDirection, is_walkable, project_on_surface, signed_angle, slope_angle,
};
pub use grid::{GridCell, SpatialGrid, SpatialGrid2, SpatialGrid3};
pub use intercept::{InterceptSolution, solve_intercept};
pub use rapier_world::{ObstacleDef, ObstacleShape, RapierQueryWorld};
pub use ray_chain::{
    ChainSettings, HitEvent, PenetrationChain, RayCaster, RayHit, RicochetChain,
    cast_penetration_chain, cast_penetration_chain_with_settings, cast_ricochet_chain,
    cast_ricochet_chain_with_settings, reflect,
};
pub use search::{binary_search_tolerant, binary_search_tolerant_by_key, lower_bound_count};
pub use trajectory::{
    ArcHit, Trajectory, Trajectory3, TrajectoryIter, integrate_trajectory,
    launch_velocity_for_angle,
};
pub use types::{Ray, Vec2, Vec3, VecN};
