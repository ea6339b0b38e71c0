pub mod aabb;
pub mod ray;
pub mod sphere;
pub mod triangle;

pub use aabb::Aabb;
pub use ray::Ray;
pub use sphere::BoundingSphere;
pub use triangle::{BarycentricCoordinates, RayTriangleHit, Triangle};
