//! Rapier-backed ray casting against static obstacle geometry.
//!
//! Builds an in-memory Rapier scene from a set of immutable obstacle definitions and exposes
//! it as a [`RayCaster`], so penetration/ricochet chains and arc hit tests can run against
//! real collider shapes.
//!
//! Design goals
//! - Deterministic: given the same inputs (sorted by `id`), build identical in-memory sets.
//! - Query-only: no dynamics are ever stepped; the scene is never mutated after `build`.
//! - Hits map back to caller ids through the collider's `user_data`.

// Re-export Rapier so downstream crates can name handles and filters without a direct dep.
pub use rapier3d;

use log::debug;
use rapier3d::na::{Translation3, UnitQuaternion};
use rapier3d::prelude::*;

use crate::{
    error::{Result, TargetingError},
    ray_chain::{RayCaster, RayHit},
    types::Vec3,
};

/// Definition of one immutable obstacle.
///
/// Conventions
/// - Units are meters.
/// - Rotation is a unit quaternion.
/// - For planes, the normal is pose-derived: `normal = rotation * +Y`, and the plane sits at
///   `dist = dot(normal, translation) + offset_along_normal`.
#[derive(Clone, Debug)]
pub struct ObstacleDef {
    /// Caller id, reported back by [`RapierQueryWorld::obstacle_id`]. Also fixes insertion order.
    pub id: u32,
    pub translation: Vector<f32>,
    pub rotation: UnitQuaternion<f32>,
    pub shape: ObstacleShape,
}

impl ObstacleDef {
    /// Unrotated obstacle at `translation`.
    #[inline]
    pub fn at(id: u32, translation: Vector<f32>, shape: ObstacleShape) -> Self {
        Self {
            id,
            translation,
            rotation: UnitQuaternion::identity(),
            shape,
        }
    }
}

/// Supported obstacle shapes.
#[derive(Clone, Debug)]
pub enum ObstacleShape {
    /// Infinite plane (half-space), offset along its pose-derived normal.
    Plane { offset_along_normal: f32 },

    /// Oriented cuboid with given half-extents.
    Cuboid { half_extents: Vector<f32> },

    Sphere { radius: f32 },

    /// Y-aligned capsule.
    CapsuleY { radius: f32, half_height: f32 },

    /// Y-aligned cylinder.
    CylinderY { radius: f32, half_height: f32 },
}

/// Static Rapier scene used purely for ray queries.
pub struct RapierQueryWorld {
    pub bodies: RigidBodySet,
    pub colliders: ColliderSet,
    pub broad_phase: BroadPhaseBvh,
    pub narrow_phase: NarrowPhase,
}

impl RapierQueryWorld {
    /// Build a query world from obstacle definitions.
    ///
    /// The input is sorted by `id` before insertion. Fails if any translation is not finite.
    pub fn build(mut defs: Vec<ObstacleDef>) -> Result<Self> {
        if defs
            .iter()
            .any(|d| d.translation.iter().any(|c| !c.is_finite()))
        {
            return Err(TargetingError::NonFiniteInput("obstacle translation"));
        }

        defs.sort_by_key(|d| d.id);

        let mut bodies = RigidBodySet::new();
        let mut colliders = ColliderSet::new();

        for def in &defs {
            let iso = Isometry::from_parts(Translation3::from(def.translation), def.rotation);

            let rb = RigidBodyBuilder::fixed().pose(iso).build();
            let rb_handle = bodies.insert(rb);

            colliders.insert_with_parent(collider_from_def(def), rb_handle, &mut bodies);
        }

        // Collision detection only: updates the broad-phase BVH so queries can run.
        let mut broad_phase = BroadPhaseBvh::new();
        let mut narrow_phase = NarrowPhase::new();
        let mut collision_pipeline = CollisionPipeline::new();
        collision_pipeline.step(
            0.0,
            &mut broad_phase,
            &mut narrow_phase,
            &mut bodies,
            &mut colliders,
            &(),
            &(),
        );

        debug!("rapier query world built with {} obstacles", defs.len());

        Ok(Self {
            bodies,
            colliders,
            broad_phase,
            narrow_phase,
        })
    }

    /// Borrowed `QueryPipeline` view over the scene.
    pub fn query_pipeline<'a>(&'a self, filter: QueryFilter<'a>) -> QueryPipeline<'a> {
        self.broad_phase.as_query_pipeline(
            self.narrow_phase.query_dispatcher(),
            &self.bodies,
            &self.colliders,
            filter,
        )
    }

    /// Caller id of the obstacle behind `handle`.
    pub fn obstacle_id(&self, handle: ColliderHandle) -> Option<u32> {
        self.colliders
            .get(handle)
            .and_then(|c| u32::try_from(c.user_data).ok())
    }

    fn cast(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        filter: QueryFilter<'_>,
    ) -> Option<RayHit<ColliderHandle>> {
        let ray = Ray::new(
            point![origin.x, origin.y, origin.z],
            vector![direction.x, direction.y, direction.z],
        );
        let pipeline = self.query_pipeline(filter);
        let (handle, hit) =
            pipeline.cast_ray_and_get_normal(&ray, max_distance.clamp(0.0, f32::MAX), true)?;

        let p = ray.point_at(hit.time_of_impact);
        Some(RayHit {
            point: Vec3::new(p.x, p.y, p.z),
            normal: Vec3::new(hit.normal.x, hit.normal.y, hit.normal.z),
            distance: hit.time_of_impact,
            handle,
        })
    }
}

impl RayCaster for RapierQueryWorld {
    type Handle = ColliderHandle;

    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> Option<RayHit<ColliderHandle>> {
        self.cast(origin, direction, max_distance, QueryFilter::default())
    }

    fn cast_ray_excluding(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<ColliderHandle>,
    ) -> Option<RayHit<ColliderHandle>> {
        let filter = match exclude {
            Some(handle) => QueryFilter::default().exclude_collider(handle),
            None => QueryFilter::default(),
        };
        self.cast(origin, direction, max_distance, filter)
    }
}

/// Rapier collider for `def`; the pose lives on the parent body.
fn collider_from_def(def: &ObstacleDef) -> Collider {
    let builder = match &def.shape {
        ObstacleShape::Plane {
            offset_along_normal,
        } => {
            // Plane `n . x = dist` with n = R * +Y. The parent pose already rotates the local
            // +Y normal into `n`, so only the offset from the body origin is local.
            let n = def.rotation * Vector::y();
            let dist = n.dot(&def.translation) + *offset_along_normal;
            let local_offset = def.rotation.inverse() * (n * dist - def.translation);
            ColliderBuilder::new(SharedShape::new(HalfSpace::new(Vector::y_axis())))
                .translation(local_offset)
        }

        ObstacleShape::Cuboid { half_extents } => {
            ColliderBuilder::cuboid(half_extents.x, half_extents.y, half_extents.z)
        }

        ObstacleShape::Sphere { radius } => ColliderBuilder::ball(*radius),

        ObstacleShape::CapsuleY {
            radius,
            half_height,
        } => ColliderBuilder::capsule_y(*half_height, *radius),

        ObstacleShape::CylinderY {
            radius,
            half_height,
        } => ColliderBuilder::cylinder(*half_height, *radius),
    };

    builder.user_data(u128::from(def.id)).build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ray_chain::{cast_penetration_chain, cast_ricochet_chain};

    fn scene() -> RapierQueryWorld {
        RapierQueryWorld::build(vec![
            ObstacleDef::at(
                2,
                vector![0.0, 0.0, 10.0],
                ObstacleShape::Cuboid {
                    half_extents: vector![1.0, 1.0, 1.0],
                },
            ),
            ObstacleDef::at(
                1,
                Vector::zeros(),
                ObstacleShape::Plane {
                    offset_along_normal: 0.0,
                },
            ),
        ])
        .unwrap()
    }

    #[test]
    fn ray_down_hits_ground_plane() {
        let world = scene();
        let hit = world
            .cast_ray(Vec3::new(3.0, 1.0, 0.0), -Vec3::y(), 10.0)
            .unwrap();
        assert!((hit.distance - 1.0).abs() < 1.0e-4);
        assert!((hit.normal - Vec3::y()).norm() < 1.0e-4);
        assert_eq!(world.obstacle_id(hit.handle), Some(1));
    }

    #[test]
    fn ray_forward_hits_cuboid_face() {
        let world = scene();
        let hit = world
            .cast_ray(Vec3::new(0.0, 0.5, 0.0), Vec3::z(), 100.0)
            .unwrap();
        assert!((hit.distance - 9.0).abs() < 1.0e-4);
        assert!((hit.point.z - 9.0).abs() < 1.0e-4);
        assert!((hit.normal + Vec3::z()).norm() < 1.0e-4);
        assert_eq!(world.obstacle_id(hit.handle), Some(2));

        assert!(world
            .cast_ray(Vec3::new(0.0, 0.5, 0.0), Vec3::z(), 5.0)
            .is_none());
    }

    #[test]
    fn penetration_passes_through_cuboid_once() {
        let world = scene();
        let events: Vec<_> =
            cast_penetration_chain(Vec3::new(0.0, 0.5, 0.0), Vec3::z(), 50.0, 5, &world)
                .unwrap()
                .collect();
        assert_eq!(events.len(), 1);
        assert_eq!(world.obstacle_id(events[0].hit.handle), Some(2));
    }

    #[test]
    fn ricochet_off_ground_goes_back_up() {
        let world = scene();
        let events: Vec<_> = cast_ricochet_chain(Vec3::new(-5.0, 5.0, 0.0), -Vec3::y(), 3, &world)
            .unwrap()
            .collect();
        assert_eq!(events.len(), 1);
        assert!((events[0].outgoing - Vec3::y()).norm() < 1.0e-4);
    }

    #[test]
    fn rejects_non_finite_translation() {
        let result = RapierQueryWorld::build(vec![ObstacleDef::at(
            1,
            vector![f32::NAN, 0.0, 0.0],
            ObstacleShape::Sphere { radius: 1.0 },
        )]);
        assert!(matches!(
            result,
            Err(TargetingError::NonFiniteInput("obstacle translation"))
        ));
    }
}
