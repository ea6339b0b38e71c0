//! Iterative top-down batch builder shared by the object BVH and the mesh
//! BVH.
pub(crate) mod builder;
pub(crate) mod median;
pub(crate) mod sah;
pub(crate) mod strategy;

pub use strategy::BuildStrategy;

use nalgebra::Point3;

use crate::geometry::primitives::Aabb;
use crate::geometry::traits::RealNumber;

/// One buildable primitive handed to the batch builder: its bounds and
/// centroid drive partitioning; `key` is opaque to this module and is
/// recovered by the caller's `finish` callback once a subset bottoms out
/// (an `object_id`+payload pair for the object BVH, a `Triangle` for the
/// mesh BVH).
pub(crate) struct BuildItem<T: RealNumber, K> {
    pub bounds: Aabb<T>,
    pub centroid: Point3<T>,
    pub key: K,
}

impl<T: RealNumber, K> BuildItem<T, K> {
    pub fn new(bounds: Aabb<T>, centroid: Point3<T>, key: K) -> Self {
        Self { bounds, centroid, key }
    }
}

pub(crate) fn union_bounds<T: RealNumber, K>(items: &[BuildItem<T, K>]) -> Aabb<T> {
    items.iter().fold(Aabb::empty(), |acc, item| acc.union(&item.bounds))
}
