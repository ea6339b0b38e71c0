//! Static, triangle-level bounding volume hierarchy: built once from a
//! mesh's geometry and queried with precise ray–triangle casting. Unlike
//! the object BVH, this tree is never mutated after construction (the
//! spec's non-goal on deformable-mesh BVH updates); a moved or deformed
//! mesh is handled by discarding the tree and building a fresh one.

mod query;
mod stats;
mod tree;

pub use query::MeshHit;
pub use stats::MeshStats;
pub use tree::MeshBvh;
