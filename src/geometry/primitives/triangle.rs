use nalgebra::{Point3, Vector3};
use num_traits::Float;

use crate::geometry::traits::{HasBounds3, HasScalarType, RealNumber};

use super::{aabb::Aabb, ray::Ray};

/// Epsilon for the Möller–Trumbore kernel: a determinant magnitude below
/// this is treated as "ray parallel to triangle plane".
const TRIANGLE_EPSILON: f64 = 1e-8;

pub type BarycentricCoordinates<T> = Vector3<T>;

/// A `(t, u, v, w)` ray–triangle hit, `w = 1 - u - v`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RayTriangleHit<T: RealNumber> {
    pub t: T,
    pub u: T,
    pub v: T,
    pub w: T,
}

/// Triangle, carrying the index of its source position in the originating
/// mesh (or soup) and an opaque payload, as the spec's data model requires
/// for mesh-BVH leaves. Kept near-verbatim from the source's `Triangle3`,
/// generalized with `index`/`payload` and a payload type parameter that
/// defaults to `()` for callers (like the builder's partitioning code) that
/// only care about geometry.
#[derive(Debug, Clone, Copy)]
pub struct Triangle<T: RealNumber, P = ()> {
    pub a: Point3<T>,
    pub b: Point3<T>,
    pub c: Point3<T>,
    pub index: u32,
    pub payload: P,
}

impl<T: RealNumber, P> Triangle<T, P> {
    pub fn new(a: Point3<T>, b: Point3<T>, c: Point3<T>, index: u32, payload: P) -> Self {
        Self {
            a,
            b,
            c,
            index,
            payload,
        }
    }

    #[inline]
    pub fn centroid(&self) -> Point3<T> {
        let third = T::from(1.0 / 3.0).unwrap();
        Point3::from((self.a.coords + self.b.coords + self.c.coords) * third)
    }

    pub fn is_degenerate(&self) -> bool {
        (self.b - self.a).cross(&(self.c - self.a)).norm_squared() == T::zero()
    }

    #[inline]
    pub fn point_at(&self, bary: &BarycentricCoordinates<T>) -> Point3<T> {
        Point3::new(
            bary.x * self.a.x + bary.y * self.b.x + bary.z * self.c.x,
            bary.x * self.a.y + bary.y * self.b.y + bary.z * self.c.y,
            bary.x * self.a.z + bary.y * self.b.z + bary.z * self.c.z,
        )
    }

    /// Möller–Trumbore ray–triangle intersection.
    ///
    /// `cull_backface`: discard hits where the determinant is negative
    /// (ray approaches the back face). Rejects parallel rays (`|det| <
    /// epsilon`), out-of-range barycentric coordinates, and hits behind the
    /// ray's origin (`t <= epsilon`), per the spec's edge cases.
    pub fn intersects_ray_at(&self, ray: &Ray<T>, cull_backface: bool) -> Option<RayTriangleHit<T>> {
        let epsilon = T::from(TRIANGLE_EPSILON).unwrap();

        let edge1 = self.b - self.a;
        let edge2 = self.c - self.a;

        let pvec = ray.direction().cross(&edge2);
        let det = edge1.dot(&pvec);

        if cull_backface {
            if det < epsilon {
                return None;
            }
        } else if Float::abs(det) < epsilon {
            return None;
        }

        let inv_det = T::one() / det;
        let tvec = ray.origin() - self.a;
        let u = tvec.dot(&pvec) * inv_det;

        if u < T::zero() || u > T::one() {
            return None;
        }

        let qvec = tvec.cross(&edge1);
        let v = ray.direction().dot(&qvec) * inv_det;

        if v < T::zero() || u + v > T::one() {
            return None;
        }

        let t = edge2.dot(&qvec) * inv_det;

        if t <= epsilon {
            return None;
        }

        Some(RayTriangleHit {
            t,
            u,
            v,
            w: T::one() - u - v,
        })
    }

    #[inline]
    pub fn intersects_ray(&self, ray: &Ray<T>, cull_backface: bool) -> bool {
        self.intersects_ray_at(ray, cull_backface).is_some()
    }
}

impl<T: RealNumber, P> HasScalarType for Triangle<T, P> {
    type ScalarType = T;
}

impl<T: RealNumber, P> HasBounds3 for Triangle<T, P> {
    fn bounds(&self) -> Aabb<T> {
        Aabb::new(self.a, self.a).union_point(&self.b).union_point(&self.c)
    }
}
