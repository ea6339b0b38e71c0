//! Dynamic, object-level bounding volume hierarchy: one AABB leaf per
//! inserted object, refit or rebuilt in place as objects move.

mod maintenance;
mod query;
mod stats;
mod tree;

pub use query::{NearestHit, RaycastHit};
pub use stats::Stats;
pub use tree::ObjectBvh;
