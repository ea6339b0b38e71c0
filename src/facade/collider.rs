//! The handle type producers hand to the `Facade`.

use crate::geometry::primitives::Aabb;
use crate::geometry::traits::RealNumber;

/// A producer's world-space bounding volume and enabled state.
///
/// Grounded in the scene-graph integration idiom of
/// `bvh_manager.rs`'s per-entity `Aabb`/dirty-flag pair, generalized to a
/// trait so the facade doesn't need to know the producer's concrete
/// entity/component representation.
pub trait Collider<T: RealNumber> {
    fn world_bounds(&self) -> Aabb<T>;

    /// Colliders are enabled by default; override to model a
    /// disable-without-unregister toggle (the spec's `is_enabled()`).
    fn is_enabled(&self) -> bool {
        true
    }
}
