//! Diagnostic snapshot (`Stats`) and structural self-check (`validate`) for
//! the dynamic object BVH. Neither is on any hot path; both walk the whole
//! tree and are meant for tests, tooling, and the facade's rebuild-trigger
//! heuristic.

use std::collections::HashSet;

use crate::error::ValidationError;
use crate::tree::{Arena, NodeIndex, NodeKind};

use super::tree::{LeafData, ObjectBvh};

/// Point-in-time structural snapshot of an `ObjectBvh`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Stats {
    pub node_count: u32,
    pub leaf_count: u32,
    pub max_depth: u32,
    /// `min(left_height, right_height) / max(left_height, right_height)`
    /// over the root's two children, where a subtree's height is its
    /// deepest leaf's depth relative to that subtree's own root. `1.0` is
    /// perfectly balanced, including the degenerate case where either side
    /// of the root has zero height (a leaf immediately under the root) or
    /// the whole tree is a single leaf or empty. Lower is more skewed.
    pub balance_factor: f64,
    pub object_count: u32,
    /// Rough byte estimate: one arena slot's worth of `Node<T, ObjectLeaf<P>>`
    /// per node, sized generically off `std::mem::size_of`.
    pub memory_usage_estimate: usize,
}

impl<T: crate::geometry::traits::RealNumber, P> ObjectBvh<T, P> {
    pub fn stats(&self) -> Stats {
        let Some(root) = self.root else {
            return Stats {
                node_count: 0,
                leaf_count: 0,
                max_depth: 0,
                balance_factor: 1.0,
                object_count: 0,
                memory_usage_estimate: 0,
            };
        };

        let mut node_count = 0u32;
        let mut leaf_count = 0u32;
        let mut max_depth = 0u32;

        self.arena.traverse(root, |_, node| {
            node_count += 1;
            max_depth = max_depth.max(node.depth);
            if node.is_leaf() {
                leaf_count += 1;
            }
        });

        let balance_factor = match &self.arena.get(root).kind {
            NodeKind::Internal { left, right } => {
                let left_height = subtree_height(&self.arena, *left);
                let right_height = subtree_height(&self.arena, *right);

                if left_height == 0 || right_height == 0 {
                    1.0
                } else {
                    left_height.min(right_height) as f64 / left_height.max(right_height) as f64
                }
            }
            NodeKind::Leaf(_) => 1.0,
        };

        let node_size = std::mem::size_of::<crate::tree::Node<T, super::tree::ObjectLeaf<P>>>();

        Stats {
            node_count,
            leaf_count,
            max_depth,
            balance_factor,
            object_count: self.count,
            memory_usage_estimate: node_count as usize * node_size,
        }
    }

    /// Walks the whole tree checking the arena's structural invariants:
    /// no cycles, every non-root node's parent back-reference agrees with
    /// its actual parent, every node's `depth` matches its distance from
    /// the root, `object_map` agrees exactly with the leaves present, and
    /// internal nodes always carry both children. Returns every violation
    /// found rather than stopping at the first.
    pub fn validate(&self) -> (bool, Vec<ValidationError>) {
        let mut errors = Vec::new();

        let Some(root) = self.root else {
            if !self.object_map.is_empty() {
                errors.push(ValidationError::MissingMapEntry { object_id: 0 });
            }
            return (errors.is_empty(), errors);
        };

        let mut seen_ids = HashSet::new();
        let mut visited_count = 0u32;

        self.arena.traverse(root, |idx, node| {
            visited_count += 1;

            if visited_count as usize > self.arena.len() {
                errors.push(ValidationError::CycleDetected { node: idx.0 });
                return;
            }

            match &node.kind {
                NodeKind::Internal { left, right } => {
                    let left_node = self.arena.get(*left);
                    let right_node = self.arena.get(*right);

                    if left_node.parent != Some(idx) {
                        errors.push(ValidationError::DanglingParent { node: left.0 });
                    }
                    if right_node.parent != Some(idx) {
                        errors.push(ValidationError::DanglingParent { node: right.0 });
                    }
                    if left_node.depth != node.depth + 1 {
                        errors.push(ValidationError::DepthMismatch {
                            node: left.0,
                            expected: node.depth + 1,
                            actual: left_node.depth,
                        });
                    }
                    if right_node.depth != node.depth + 1 {
                        errors.push(ValidationError::DepthMismatch {
                            node: right.0,
                            expected: node.depth + 1,
                            actual: right_node.depth,
                        });
                    }
                }
                NodeKind::Leaf(Some(LeafData { object_id, .. })) => {
                    if !seen_ids.insert(*object_id) {
                        errors.push(ValidationError::DuplicateId { object_id: *object_id });
                    }

                    match self.object_map.get(object_id) {
                        Some(&mapped) if mapped == idx => {}
                        _ => errors.push(ValidationError::MissingMapEntry { object_id: *object_id }),
                    }
                }
                NodeKind::Leaf(None) => {}
            }
        });

        for &object_id in self.object_map.keys() {
            if !seen_ids.contains(&object_id) {
                errors.push(ValidationError::MissingMapEntry { object_id });
            }
        }

        if seen_ids.len() != self.count as usize {
            errors.push(ValidationError::DepthMismatch {
                node: 0,
                expected: self.count,
                actual: seen_ids.len() as u32,
            });
        }

        (errors.is_empty(), errors)
    }
}

/// Height of the subtree rooted at `idx`: its deepest descendant's `depth`
/// relative to `idx`'s own. `0` for a leaf.
fn subtree_height<T: crate::geometry::traits::RealNumber, L>(arena: &Arena<T, L>, idx: NodeIndex) -> u32 {
    let base_depth = arena.get(idx).depth;
    let mut max_depth = base_depth;

    arena.traverse(idx, |_, node| {
        max_depth = max_depth.max(node.depth);
    });

    max_depth - base_depth
}
