//! The arena-based binary tree shared by the dynamic object BVH and the
//! static mesh BVH.
pub(crate) mod node;

pub(crate) use node::{Arena, Node, NodeIndex, NodeKind};
