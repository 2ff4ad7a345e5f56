/*!
Penetration and ricochet ray chains.

Both chains are driven by a single host-supplied primitive, [`RayCaster::cast_ray`], called
once per segment. The chains are lazy iterators of [`HitEvent`]s with explicit budgets, so
they always terminate and never recurse.

- Penetration: keep going in the same direction through each obstacle, spending a distance
  budget, until the penetration budget or the distance budget runs out or a cast misses.
- Ricochet: reflect off each hit (`d' = d - 2 (d . n) n`) until the bounce budget runs out
  or a cast misses.

Directions are normalized before the first cast, so `RayHit::distance` is always in meters.
After each hit the next origin is pushed `surface_offset` meters off the surface (along the
travel direction for penetration, along the normal for ricochet) so the next cast does not
immediately re-hit the same surface.
*/

use std::iter::FusedIterator;

use log::{debug, trace, warn};

use crate::{
    constants::{DEFAULT_RICOCHET_RANGE, DEFAULT_SURFACE_OFFSET},
    error::{Result, TargetingError},
    types::{Vec3, VecN, ensure_finite, try_normalize},
};

/// A single ray intersection reported by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RayHit<H> {
    /// World-space point of impact.
    pub point: Vec3,
    /// Surface normal at the impact point (need not be unit length).
    pub normal: Vec3,
    /// Distance from the cast origin to `point` along the (unit) cast direction.
    pub distance: f32,
    /// Host handle of the object that was hit.
    pub handle: H,
}

/// The ray intersection capability the chains are built on.
///
/// Implemented for any `Fn(Vec3, Vec3, f32) -> Option<RayHit<H>>`, which is the usual way
/// to plug in a physics engine (or a deterministic fake in tests). `direction` is always
/// unit length when called from this crate.
pub trait RayCaster {
    type Handle: Copy;

    /// Nearest hit along `origin + direction * t` for `t` in `[0, max_distance]`.
    fn cast_ray(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
    ) -> Option<RayHit<Self::Handle>>;

    /// Like [`RayCaster::cast_ray`], but ignoring the object `exclude`.
    ///
    /// Penetration chains call this with the object just passed through. The default
    /// ignores `exclude` and relies on the surface offset alone.
    fn cast_ray_excluding(
        &self,
        origin: Vec3,
        direction: Vec3,
        max_distance: f32,
        exclude: Option<Self::Handle>,
    ) -> Option<RayHit<Self::Handle>> {
        let _ = exclude;
        self.cast_ray(origin, direction, max_distance)
    }
}

impl<H, F> RayCaster for F
where
    H: Copy,
    F: Fn(Vec3, Vec3, f32) -> Option<RayHit<H>>,
{
    type Handle = H;

    #[inline]
    fn cast_ray(&self, origin: Vec3, direction: Vec3, max_distance: f32) -> Option<RayHit<H>> {
        self(origin, direction, max_distance)
    }
}

/// One hit of a chain.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct HitEvent<H> {
    /// Zero-based segment number within the chain.
    pub segment: usize,
    /// Origin of the cast that produced this hit.
    pub origin: Vec3,
    /// Unit direction of that cast.
    pub incoming: Vec3,
    /// Unit direction of the next segment (reflected for ricochet, unchanged for penetration).
    pub outgoing: Vec3,
    /// The hit itself.
    pub hit: RayHit<H>,
    /// Distance covered by the chain up to and including this hit (meters). For penetration
    /// this includes the `surface_offset` push-offs between earlier hits.
    pub travelled: f32,
}

/// Runtime configuration shared by both chains.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ChainSettings {
    /// Push-off distance past each surface before the next cast (meters). Must be positive.
    pub surface_offset: f32,
    /// Maximum length of each ricochet segment (meters). Infinite by default.
    pub ricochet_range: f32,
}

impl Default for ChainSettings {
    fn default() -> Self {
        Self {
            surface_offset: DEFAULT_SURFACE_OFFSET,
            ricochet_range: DEFAULT_RICOCHET_RANGE,
        }
    }
}

impl ChainSettings {
    /// Default settings with a custom surface offset.
    #[inline]
    pub fn with_surface_offset(surface_offset: f32) -> Self {
        Self {
            surface_offset,
            ..Self::default()
        }
    }

    /// Check that the offset is a small positive finite number and the range is not NaN.
    pub fn validate(&self) -> Result<()> {
        if !(self.surface_offset.is_finite() && self.surface_offset > 0.0) {
            return Err(TargetingError::InvalidSurfaceOffset(self.surface_offset));
        }
        if self.ricochet_range.is_nan() {
            return Err(TargetingError::NonFiniteInput("ricochet_range"));
        }
        Ok(())
    }
}

/// Mirror `direction` about a surface with unit normal `unit_normal`.
#[inline]
pub fn reflect<const D: usize>(direction: &VecN<D>, unit_normal: &VecN<D>) -> VecN<D> {
    direction - unit_normal * (2.0 * direction.dot(unit_normal))
}

/// Start a penetration chain with default [`ChainSettings`].
pub fn cast_penetration_chain<C>(
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
    max_penetrations: usize,
    caster: &C,
) -> Result<PenetrationChain<'_, C>>
where
    C: RayCaster + ?Sized,
{
    cast_penetration_chain_with_settings(
        origin,
        direction,
        max_distance,
        max_penetrations,
        caster,
        &ChainSettings::default(),
    )
}

/// Start a penetration chain.
///
/// Fails on a zero `direction`, a NaN `max_distance`, non-finite `origin` or invalid
/// settings. With `max_penetrations == 0` or `max_distance <= 0` the chain performs no casts.
pub fn cast_penetration_chain_with_settings<'c, C>(
    origin: Vec3,
    direction: Vec3,
    max_distance: f32,
    max_penetrations: usize,
    caster: &'c C,
    settings: &ChainSettings,
) -> Result<PenetrationChain<'c, C>>
where
    C: RayCaster + ?Sized,
{
    settings.validate()?;
    ensure_finite(&origin, "origin")?;
    if max_distance.is_nan() {
        return Err(TargetingError::NonFiniteInput("max_distance"));
    }
    let direction = try_normalize(&direction).ok_or(TargetingError::DegenerateDirection)?;

    Ok(PenetrationChain {
        caster,
        origin,
        direction,
        remaining: max_distance,
        penetrations_left: max_penetrations,
        segment: 0,
        travelled: 0.0,
        exclude: None,
        surface_offset: settings.surface_offset,
        done: false,
    })
}

/// Lazy penetration chain; see [`cast_penetration_chain`].
pub struct PenetrationChain<'c, C: RayCaster + ?Sized> {
    caster: &'c C,
    origin: Vec3,
    direction: Vec3,
    remaining: f32,
    penetrations_left: usize,
    segment: usize,
    travelled: f32,
    exclude: Option<C::Handle>,
    surface_offset: f32,
    done: bool,
}

impl<C: RayCaster + ?Sized> PenetrationChain<'_, C> {
    /// Distance budget left for further segments (meters).
    #[inline]
    pub fn remaining_distance(&self) -> f32 {
        self.remaining
    }

    /// Penetrations still allowed.
    #[inline]
    pub fn penetrations_left(&self) -> usize {
        self.penetrations_left
    }
}

impl<C: RayCaster + ?Sized> Iterator for PenetrationChain<'_, C> {
    type Item = HitEvent<C::Handle>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.penetrations_left == 0 {
            debug!("penetration chain: budget spent after {} hits", self.segment);
            self.done = true;
            return None;
        }
        if self.remaining <= 0.0 {
            debug!("penetration chain: out of range after {} hits", self.segment);
            self.done = true;
            return None;
        }

        let Some(hit) = self.caster.cast_ray_excluding(
            self.origin,
            self.direction,
            self.remaining,
            self.exclude,
        ) else {
            debug!("penetration chain: exited into open space after {} hits", self.segment);
            self.done = true;
            return None;
        };

        let step = hit.distance.max(0.0);
        self.travelled += step;
        self.remaining -= step;
        self.penetrations_left -= 1;

        let event = HitEvent {
            segment: self.segment,
            origin: self.origin,
            incoming: self.direction,
            outgoing: self.direction,
            hit,
            travelled: self.travelled,
        };
        trace!(
            "penetration chain: segment {} hit at {:?} ({} m left)",
            self.segment, hit.point, self.remaining
        );

        // The push-off past the surface is distance covered too.
        self.origin = hit.point + self.direction * self.surface_offset;
        self.travelled += self.surface_offset;
        self.remaining -= self.surface_offset;
        self.exclude = Some(hit.handle);
        self.segment += 1;

        Some(event)
    }
}

impl<C: RayCaster + ?Sized> FusedIterator for PenetrationChain<'_, C> {}

/// Start a ricochet chain with default [`ChainSettings`].
pub fn cast_ricochet_chain<C>(
    origin: Vec3,
    direction: Vec3,
    max_bounces: usize,
    caster: &C,
) -> Result<RicochetChain<'_, C>>
where
    C: RayCaster + ?Sized,
{
    cast_ricochet_chain_with_settings(
        origin,
        direction,
        max_bounces,
        caster,
        &ChainSettings::default(),
    )
}

/// Start a ricochet chain.
///
/// Each segment is cast up to `settings.ricochet_range`. `max_bounces` bounds the number of
/// casts; with `max_bounces == 0` the chain performs no casts.
pub fn cast_ricochet_chain_with_settings<'c, C>(
    origin: Vec3,
    direction: Vec3,
    max_bounces: usize,
    caster: &'c C,
    settings: &ChainSettings,
) -> Result<RicochetChain<'c, C>>
where
    C: RayCaster + ?Sized,
{
    settings.validate()?;
    ensure_finite(&origin, "origin")?;
    let direction = try_normalize(&direction).ok_or(TargetingError::DegenerateDirection)?;

    Ok(RicochetChain {
        caster,
        origin,
        direction,
        bounces_left: max_bounces,
        segment: 0,
        travelled: 0.0,
        range: settings.ricochet_range,
        surface_offset: settings.surface_offset,
        done: false,
    })
}

/// Lazy ricochet chain; see [`cast_ricochet_chain`].
pub struct RicochetChain<'c, C: RayCaster + ?Sized> {
    caster: &'c C,
    origin: Vec3,
    direction: Vec3,
    bounces_left: usize,
    segment: usize,
    travelled: f32,
    range: f32,
    surface_offset: f32,
    done: bool,
}

impl<C: RayCaster + ?Sized> RicochetChain<'_, C> {
    /// Origin and unit direction of the next segment to be cast.
    #[inline]
    pub fn next_ray(&self) -> (Vec3, Vec3) {
        (self.origin, self.direction)
    }
}

impl<C: RayCaster + ?Sized> Iterator for RicochetChain<'_, C> {
    type Item = HitEvent<C::Handle>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        if self.bounces_left == 0 {
            debug!("ricochet chain: bounce budget spent after {} hits", self.segment);
            self.done = true;
            return None;
        }

        let cast_origin = self.origin;
        let Some(hit) = self.caster.cast_ray(cast_origin, self.direction, self.range) else {
            debug!("ricochet chain: exited into open space after {} hits", self.segment);
            self.done = true;
            return None;
        };

        self.bounces_left -= 1;
        self.travelled += hit.distance.max(0.0);

        let incoming = self.direction;
        let outgoing = match try_normalize(&hit.normal) {
            Some(mut n) => {
                // Face the normal against the incoming ray so the offset leaves the surface.
                if n.dot(&incoming) > 0.0 {
                    n = -n;
                }
                self.origin = hit.point + n * self.surface_offset;
                // Re-normalize to stop drift over many bounces.
                try_normalize(&reflect(&incoming, &n)).unwrap_or(incoming)
            }
            None => {
                warn!(
                    "ricochet chain: degenerate normal {:?} at {:?}, stopping",
                    hit.normal, hit.point
                );
                self.done = true;
                incoming
            }
        };

        let event = HitEvent {
            segment: self.segment,
            origin: cast_origin,
            incoming,
            outgoing,
            hit,
            travelled: self.travelled,
        };
        trace!(
            "ricochet chain: segment {} hit at {:?}, outgoing {:?}",
            self.segment, hit.point, outgoing
        );

        self.direction = outgoing;
        self.segment += 1;

        Some(event)
    }
}

impl<C: RayCaster + ?Sized> FusedIterator for RicochetChain<'_, C> {}
