use nalgebra::Vector3;

/// Generic 3-component coordinate vector, used for both points and
/// directions throughout the crate (the kernels never need to distinguish
/// `nalgebra::Point3` from `nalgebra::Vector3`, so a single alias keeps call
/// sites uniform).
pub type Vec3<T> = Vector3<T>;
