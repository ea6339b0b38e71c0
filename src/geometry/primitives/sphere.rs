use crate::{
    geometry::traits::{HasBounds3, HasScalarType, RealNumber},
    helpers::aliases::Vec3,
};

use super::aabb::Aabb;

/// Utility bounding sphere.
///
/// Per the source's non-goal, this is never a hierarchy node kind — only
/// `Aabb` is. It exists for collaborators (the scene-graph integration
/// layer, broad-phase filters upstream of a `query_range` call) that prefer
/// a spherical bound, symmetric with both AABBs and other spheres.
#[derive(Debug, Clone, Copy)]
pub struct BoundingSphere<T: RealNumber> {
    center: Vec3<T>,
    radius: T,
}

impl<T: RealNumber> BoundingSphere<T> {
    pub fn new(center: Vec3<T>, radius: T) -> Self {
        Self { center, radius }
    }

    #[inline]
    pub fn center(&self) -> Vec3<T> {
        self.center
    }

    #[inline]
    pub fn radius(&self) -> T {
        self.radius
    }

    #[inline]
    pub fn intersects_aabb(&self, aabb: &Aabb<T>) -> bool {
        aabb.squared_distance(&self.center.into()) <= self.radius * self.radius
    }

    #[inline]
    pub fn intersects_sphere(&self, other: &Self) -> bool {
        let dist = (self.center - other.center).norm();
        dist <= self.radius + other.radius
    }
}

impl<T: RealNumber> HasScalarType for BoundingSphere<T> {
    type ScalarType = T;
}

impl<T: RealNumber> HasBounds3 for BoundingSphere<T> {
    #[inline]
    fn bounds(&self) -> Aabb<T> {
        Aabb::new(
            (self.center.add_scalar(-self.radius)).into(),
            (self.center.add_scalar(self.radius)).into(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spheres_touching_at_a_point_intersect() {
        let a = BoundingSphere::new(Vec3::new(0.0, 0.0, 0.0), 1.0);
        let b = BoundingSphere::new(Vec3::new(2.0, 0.0, 0.0), 1.0);
        assert!(a.intersects_sphere(&b));
    }

    #[test]
    fn distant_spheres_do_not_intersect() {
        let a = BoundingSphere::new(Vec3::new(0.0, 0.0, 0.0), 1.0);
        let b = BoundingSphere::new(Vec3::new(10.0, 0.0, 0.0), 1.0);
        assert!(!a.intersects_sphere(&b));
    }
}
