use nalgebra::Point3;

use crate::{geometry::traits::RealNumber, helpers::aliases::Vec3};

/// Guarded reciprocal threshold: a direction component below this magnitude
/// is treated as parallel to its axis, and its reciprocal is replaced by a
/// signed infinity instead of dividing by (near-)zero.
const DIRECTION_EPSILON: f64 = 1e-10;

/// A ray with a unit-length direction.
///
/// The direction is renormalized unconditionally at construction (the
/// source's `Line3::from_points` already does this for the two-point
/// constructor; `Ray::new` here does it for the direct origin+direction
/// constructor too, so the unit-length invariant always holds regardless of
/// how the caller built the ray). A zero-length direction can't be
/// normalized, so it is canonicalized to `+Z` rather than panicking —
/// consistent with this crate's never-panic-on-malformed-geometry policy
/// (see `error.rs`).
#[derive(Debug, Clone, Copy)]
pub struct Ray<T: RealNumber> {
    origin: Point3<T>,
    direction: Vec3<T>,
    inv_direction: Vec3<T>,
}

impl<T: RealNumber> Ray<T> {
    pub fn new(origin: Point3<T>, direction: Vec3<T>) -> Self {
        let norm = direction.norm();
        let direction = if norm > T::zero() {
            direction / norm
        } else {
            Vec3::new(T::zero(), T::zero(), T::one())
        };

        Self {
            origin,
            inv_direction: guarded_reciprocal(&direction),
            direction,
        }
    }

    #[inline]
    pub fn origin(&self) -> &Point3<T> {
        &self.origin
    }

    #[inline]
    pub fn direction(&self) -> &Vec3<T> {
        &self.direction
    }

    #[inline]
    pub fn inv_direction(&self) -> &Vec3<T> {
        &self.inv_direction
    }

    #[inline]
    pub fn point_at(&self, t: T) -> Point3<T> {
        self.origin + self.direction.scale(t)
    }
}

fn guarded_reciprocal<T: RealNumber>(direction: &Vec3<T>) -> Vec3<T> {
    let epsilon = T::from(DIRECTION_EPSILON).unwrap();
    let guard = |c: T| -> T {
        if num_traits::Float::abs(c) < epsilon {
            if c.is_sign_negative() {
                T::neg_infinity()
            } else {
                T::infinity()
            }
        } else {
            T::one() / c
        }
    };

    Vec3::new(guard(direction.x), guard(direction.y), guard(direction.z))
}
