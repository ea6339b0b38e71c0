use nalgebra::RealField;
use num_traits::{Float, ToPrimitive};

/// Scalar type usable as coordinates throughout the crate.
///
/// Pulled together from the bounds every kernel in `geometry::primitives`
/// actually needs: `nalgebra`'s field arithmetic plus the transcendental
/// functions and conversions `num_traits::Float` provides, plus
/// `ToPrimitive` so the SAH builder can turn a bin-space scalar into a
/// `usize` bin index. Blanket-impl'd so `f32` and `f64` both satisfy it
/// without any crate-specific glue.
pub trait RealNumber: RealField + Float + ToPrimitive + Copy {}

impl<T: RealField + Float + ToPrimitive + Copy> RealNumber for T {}

/// A type with an associated scalar coordinate type.
pub trait HasScalarType {
    type ScalarType: RealNumber;
}

/// A type that has an axis-aligned bounding box.
///
/// This is the AABB-tree vocabulary's name for what the source calls
/// `HasBBox3`: every payload the object BVH or the builder touches must be
/// able to produce its own bounds on demand.
pub trait HasBounds3: HasScalarType {
    fn bounds(&self) -> super::primitives::Aabb<Self::ScalarType>;
}

/// A type that can report the point on itself closest to a query point.
pub trait ClosestPoint3: HasScalarType {
    fn closest_point(
        &self,
        point: &crate::helpers::aliases::Vec3<Self::ScalarType>,
    ) -> crate::helpers::aliases::Vec3<Self::ScalarType>;
}
