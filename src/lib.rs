//! A spatial acceleration library built around a bounding volume
//! hierarchy: axis-aligned bounding box kernels, a dynamic object-level
//! BVH over opaque payloads, a static triangle-level BVH for meshes, and
//! an iterative top-down builder with SAH, spatial-median, and
//! object-median partitioning strategies.
//!
//! Every traversal, refit walk, and build loop in this crate is
//! iterative — none of it recurses, regardless of tree depth.
//!
//! ```
//! use bvh_accel::prelude::*;
//! use nalgebra::{Point3, Vector3};
//!
//! let mut bvh: ObjectBvh<f64, &'static str> = ObjectBvh::default();
//! let a = bvh.insert(Aabb::new(Point3::new(-2.0, -1.0, -1.0), Point3::new(-1.0, 1.0, 1.0)), "near");
//! bvh.insert(Aabb::new(Point3::new(1.0, -1.0, -1.0), Point3::new(2.0, 1.0, 1.0)), "far");
//!
//! let ray = Ray::new(Point3::new(-10.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
//! let hit = bvh.raycast_first(&ray, 100.0).unwrap();
//! assert_eq!(*hit.payload, "near");
//! assert_eq!(bvh.get(a), Some(&"near"));
//! ```

pub mod build;
pub mod error;
pub mod facade;
pub mod geometry;
pub mod mesh_bvh;
pub mod object_bvh;

mod helpers;
mod tree;

/// Convenience re-exports of the types most call sites need.
pub mod prelude {
    pub use crate::build::BuildStrategy;
    pub use crate::error::{QueryError, ValidationError};
    pub use crate::facade::{Collider, Facade, FacadeConfig};
    pub use crate::geometry::primitives::{Aabb, BoundingSphere, Ray, Triangle};
    pub use crate::geometry::traits::RealNumber;
    pub use crate::mesh_bvh::{MeshBvh, MeshHit, MeshStats};
    pub use crate::object_bvh::{NearestHit, ObjectBvh, RaycastHit, Stats};
}
