use nalgebra::Point3;
use num_traits::{cast, Float};

use crate::{
    geometry::traits::{ClosestPoint3, HasScalarType, RealNumber},
    helpers::aliases::Vec3,
};

use super::ray::Ray;

/// Axis-aligned bounding box.
///
/// Adapted from the source's `Box3`: same min/max representation, same
/// derived quantities (`volume`, `get_center`, `size_*`, `union`), plus the
/// slab-method ray intersection that the source hosted on `Line3` instead
/// (moved here because the dynamic tree's hot path tests rays against node
/// bounds directly, never against an infinite line).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb<T: RealNumber> {
    min: Point3<T>,
    max: Point3<T>,
}

impl<T: RealNumber> Aabb<T> {
    #[inline]
    pub fn new(min: Point3<T>, max: Point3<T>) -> Self {
        Self { min, max }
    }

    /// The empty AABB: `min = +inf`, `max = -inf` on every axis, so that
    /// unioning it with any box yields that box unchanged.
    #[inline]
    pub fn empty() -> Self {
        Self {
            min: Point3::new(T::infinity(), T::infinity(), T::infinity()),
            max: Point3::new(T::neg_infinity(), T::neg_infinity(), T::neg_infinity()),
        }
    }

    #[inline]
    pub fn from_point(p: Point3<T>) -> Self {
        Self { min: p, max: p }
    }

    #[inline]
    pub fn min(&self) -> Point3<T> {
        self.min
    }

    #[inline]
    pub fn max(&self) -> Point3<T> {
        self.max
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.min.x > self.max.x || self.min.y > self.max.y || self.min.z > self.max.z
    }

    #[inline]
    pub fn get_center(&self) -> Point3<T> {
        (self.min + self.max.coords) * cast(0.5).unwrap()
    }

    #[inline]
    pub fn size_x(&self) -> T {
        self.max.x - self.min.x
    }

    #[inline]
    pub fn size_y(&self) -> T {
        self.max.y - self.min.y
    }

    #[inline]
    pub fn size_z(&self) -> T {
        self.max.z - self.min.z
    }

    #[inline]
    pub fn size(&self, axis: usize) -> T {
        self.max[axis] - self.min[axis]
    }

    /// Axis with the largest extent: 0 = x, 1 = y, 2 = z.
    pub fn longest_axis(&self) -> usize {
        let sizes = [self.size_x(), self.size_y(), self.size_z()];
        let mut best = 0;

        for axis in 1..3 {
            if sizes[axis] > sizes[best] {
                best = axis;
            }
        }

        best
    }

    #[inline]
    pub fn volume(&self) -> T {
        if self.is_empty() {
            return T::zero();
        }

        self.size_x() * self.size_y() * self.size_z()
    }

    /// `2 * (xy + yz + zx)`, used by the SAH cost model.
    #[inline]
    pub fn surface_area(&self) -> T {
        if self.is_empty() {
            return T::zero();
        }

        let two = T::from(2.0).unwrap();
        let (sx, sy, sz) = (self.size_x(), self.size_y(), self.size_z());
        two * (sx * sy + sy * sz + sz * sx)
    }

    #[inline]
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: Point3::new(
                Float::min(self.min.x, other.min.x),
                Float::min(self.min.y, other.min.y),
                Float::min(self.min.z, other.min.z),
            ),
            max: Point3::new(
                Float::max(self.max.x, other.max.x),
                Float::max(self.max.y, other.max.y),
                Float::max(self.max.z, other.max.z),
            ),
        }
    }

    #[inline]
    pub fn union_point(&self, p: &Point3<T>) -> Self {
        Self {
            min: Point3::new(
                Float::min(self.min.x, p.x),
                Float::min(self.min.y, p.y),
                Float::min(self.min.z, p.z),
            ),
            max: Point3::new(
                Float::max(self.max.x, p.x),
                Float::max(self.max.y, p.y),
                Float::max(self.max.z, p.z),
            ),
        }
    }

    #[inline]
    pub fn expand_mut(&mut self, other: &Self) {
        self.min.x = Float::min(self.min.x, other.min.x);
        self.min.y = Float::min(self.min.y, other.min.y);
        self.min.z = Float::min(self.min.z, other.min.z);
        self.max.x = Float::max(self.max.x, other.max.x);
        self.max.y = Float::max(self.max.y, other.max.y);
        self.max.z = Float::max(self.max.z, other.max.z);
    }

    #[inline]
    pub fn contains_point(&self, point: &Point3<T>) -> bool {
        point.x >= self.min.x
            && point.x <= self.max.x
            && point.y >= self.min.y
            && point.y <= self.max.y
            && point.z >= self.min.z
            && point.z <= self.max.z
    }

    /// Separating-axis test: overlap iff every axis's intervals overlap.
    pub fn intersects_aabb(&self, other: &Self) -> bool {
        for axis in 0..3 {
            if self.max[axis] < other.min[axis] || self.min[axis] > other.max[axis] {
                return false;
            }
        }

        true
    }

    /// Squared distance from `point` to the closest point on this box;
    /// zero if `point` is inside.
    pub fn squared_distance(&self, point: &Point3<T>) -> T {
        let mut sq_distance = T::zero();

        for axis in 0..3 {
            let v = point[axis];

            if v < self.min[axis] {
                sq_distance += (self.min[axis] - v) * (self.min[axis] - v);
            }

            if v > self.max[axis] {
                sq_distance += (v - self.max[axis]) * (v - self.max[axis]);
            }
        }

        sq_distance
    }

    /// Distance along `ray` to the entry point of this box, or to the exit
    /// point if the origin is inside it, following the slab method with
    /// guarded reciprocals (near-zero direction components behave as an
    /// infinite-magnitude reciprocal rather than dividing by zero).
    ///
    /// Returns `None` on a miss, an empty box, or an intersection entirely
    /// behind the ray's origin.
    pub fn intersects_ray_at(&self, ray: &Ray<T>) -> Option<T> {
        if self.is_empty() {
            return None;
        }

        let inv_d = ray.inv_direction();
        let mut t_min = T::neg_infinity();
        let mut t_max = T::infinity();

        for axis in 0..3 {
            let mut t1 = (self.min[axis] - ray.origin()[axis]) * inv_d[axis];
            let mut t2 = (self.max[axis] - ray.origin()[axis]) * inv_d[axis];

            if t1 > t2 {
                std::mem::swap(&mut t1, &mut t2);
            }

            t_min = Float::max(t_min, t1);
            t_max = Float::min(t_max, t2);

            if t_min > t_max {
                return None;
            }
        }

        if t_max < T::zero() {
            return None;
        }

        if t_min >= T::zero() {
            Some(t_min)
        } else {
            Some(t_max)
        }
    }

    #[inline]
    pub fn intersects_ray(&self, ray: &Ray<T>) -> bool {
        self.intersects_ray_at(ray).is_some()
    }
}

impl<T: RealNumber> HasScalarType for Aabb<T> {
    type ScalarType = T;
}

impl<T: RealNumber> ClosestPoint3 for Aabb<T> {
    #[inline]
    fn closest_point(&self, point: &Vec3<T>) -> Vec3<T> {
        Vec3::new(
            num_traits::clamp(point.x, self.min.x, self.max.x),
            num_traits::clamp(point.y, self.min.y, self.max.y),
            num_traits::clamp(point.z, self.min.z, self.max.z),
        )
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{Point3, Vector3};
    use test_case::test_case;

    use super::*;

    #[test_case(Point3::new(-10.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0), true ; "axis-aligned +x through the box")]
    #[test_case(Point3::new(-10.0, 0.0, 0.0), Vector3::new(-1.0, 0.0, 0.0), false ; "axis-aligned -x pointing away")]
    #[test_case(Point3::new(0.0, -10.0, 0.0), Vector3::new(0.0, 1.0, 0.0), true ; "axis-aligned +y through the box")]
    #[test_case(Point3::new(-10.0, -10.0, -10.0), Vector3::new(1.0, 1.0, 1.0), true ; "diagonal through the near corner")]
    #[test_case(Point3::new(-10.0, 5.0, 5.0), Vector3::new(1.0, 0.0, 0.0), false ; "parallel to a face, outside its extent")]
    fn a_unit_cube_agrees_with_the_expected_slab_outcome(origin: Point3<f64>, dir: Vector3<f64>, expect_hit: bool) {
        let aabb = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(origin, dir);

        assert_eq!(aabb.intersects_ray_at(&ray).is_some(), expect_hit);
    }

    #[test]
    fn union_of_two_disjoint_boxes_covers_both() {
        let a = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        let b = Aabb::new(Point3::new(2.0, 2.0, 2.0), Point3::new(3.0, 3.0, 3.0));
        let u = a.union(&b);

        assert_eq!(u.min(), Point3::new(0.0, 0.0, 0.0));
        assert_eq!(u.max(), Point3::new(3.0, 3.0, 3.0));
    }

    #[test]
    fn empty_box_never_intersects_ray() {
        let empty = Aabb::<f64>::empty();
        let ray = Ray::new(Point3::origin(), Vector3::x());

        assert!(empty.intersects_ray_at(&ray).is_none());
    }

    #[test]
    fn ray_from_outside_hits_entry_distance() {
        let aabb = Aabb::new(Point3::new(1.0, -1.0, -1.0), Point3::new(2.0, 1.0, 1.0));
        let ray = Ray::new(Point3::new(-1.0, 0.0, 0.0), Vector3::x());

        assert_eq!(aabb.intersects_ray_at(&ray), Some(2.0));
    }

    #[test]
    fn ray_with_origin_inside_returns_exit_distance() {
        let aabb = Aabb::new(Point3::new(-1.0, -1.0, -1.0), Point3::new(1.0, 1.0, 1.0));
        let ray = Ray::new(Point3::origin(), Vector3::x());

        assert_eq!(aabb.intersects_ray_at(&ray), Some(1.0));
    }

    #[test]
    fn ray_pointing_away_misses() {
        let aabb = Aabb::new(Point3::new(1.0, -1.0, -1.0), Point3::new(2.0, 1.0, 1.0));
        let ray = Ray::new(Point3::new(-1.0, 0.0, 0.0), -Vector3::x());

        assert!(aabb.intersects_ray_at(&ray).is_none());
    }

    #[test]
    fn squared_distance_is_zero_inside() {
        let aabb = Aabb::new(Point3::new(0.0, 0.0, 0.0), Point3::new(1.0, 1.0, 1.0));
        assert_eq!(aabb.squared_distance(&Point3::new(0.5, 0.5, 0.5)), 0.0);
    }

    #[test]
    fn degenerate_point_box_is_valid_non_empty() {
        let p = Point3::new(1.0, 2.0, 3.0);
        let aabb = Aabb::from_point(p);

        assert!(!aabb.is_empty());
        assert_eq!(aabb.volume(), 0.0);
        assert!(aabb.contains_point(&p));
    }
}
