//! Bounds refit and full tree rebuild for the dynamic object BVH.
//!
//! `refit` is the cheap path: bounds drift as objects move but the tree's
//! shape is left alone. `rebuild` is the expensive path: every object is
//! pulled out and re-partitioned from scratch with a chosen `BuildStrategy`,
//! for when enough drift has accumulated that the shape itself is stale.
//! The facade (not yet built) is what decides which one to call and when.

use std::cmp::Reverse;
use std::collections::HashMap;

use crate::build::builder::build_tree;
use crate::build::{BuildItem, BuildStrategy};
use crate::tree::{Arena, NodeKind};

use super::tree::{LeafData, ObjectLeaf, ObjectBvh};

impl<T: crate::geometry::traits::RealNumber, P> ObjectBvh<T, P> {
    /// Recomputes every internal node's bounds bottom-up from its children,
    /// without changing the tree's shape. Cheap relative to `rebuild`:
    /// O(node count), no partitioning.
    pub fn refit(&mut self) {
        let Some(root) = self.root else { return };

        let mut indices = self.arena.subtree_indices(root);
        indices.sort_by_key(|idx| Reverse(self.arena.get(*idx).depth));

        for idx in indices {
            if !self.arena.get(idx).is_leaf() {
                self.arena.recompute_bounds_from_children(idx);
            }
        }

        log::debug!("object BVH refit complete over {} nodes", self.arena.len());
    }

    /// Tears down the whole tree and re-partitions every live object with
    /// `strategy`. `object_id`s and payloads survive; `next_id` is not
    /// reset, so ids already handed out elsewhere stay unique.
    pub fn rebuild(&mut self, strategy: BuildStrategy) {
        let Some(root) = self.root else { return };

        let mut items = Vec::with_capacity(self.count as usize);

        for idx in self.arena.subtree_indices(root) {
            let node = self.arena.remove(idx);

            if let NodeKind::Leaf(Some(LeafData { object_id, payload })) = node.kind {
                let centroid = node.bounds.get_center();
                items.push(BuildItem::new(node.bounds, centroid, (object_id, payload)));
            }
        }

        self.arena.clear();
        self.object_map.clear();
        self.root = None;

        if items.is_empty() {
            return;
        }

        let max_leaf_size = self.max_leaf_size as usize;
        let max_depth = self.max_depth;

        let new_root = {
            let arena = &mut self.arena;
            let object_map = &mut self.object_map;

            build_tree(arena, items, strategy, max_leaf_size, max_depth, 0, |arena, subset, depth| {
                materialize_group(arena, object_map, subset, depth)
            })
        };

        self.root = new_root;
        log::debug!("object BVH rebuild complete over {} objects", self.count);
    }
}

/// Expands one bottomed-out subset into a proper one-leaf-per-object
/// subtree. The outer `rebuild` build respects the caller's chosen
/// `BuildStrategy` and `max_leaf_size` to decide *where* a subset bottoms
/// out, exactly as a static builder would; but unlike a static mesh leaf,
/// an object BVH leaf can only ever hold a single object, so each subset —
/// even a singleton — still has to be turned into its own small subtree
/// here. `Median` is used for this inner pass specifically because its
/// split always succeeds for any subset of two or more items, with no
/// "emit a multi-item leaf" escape hatch the way SAH has.
fn materialize_group<T: crate::geometry::traits::RealNumber, P>(
    arena: &mut Arena<T, ObjectLeaf<P>>,
    object_map: &mut HashMap<u64, crate::tree::NodeIndex>,
    subset: Vec<BuildItem<T, (u64, P)>>,
    depth: u32,
) -> crate::tree::NodeIndex {
    build_tree(arena, subset, BuildStrategy::Median, 1, u32::MAX, depth, |arena, mut singleton, depth| {
        let item = singleton.pop().expect("materialize_group bottoms out at exactly one item");
        let (object_id, payload) = item.key;
        let idx = arena.make_leaf(item.bounds, Some(LeafData { object_id, payload }), depth);
        object_map.insert(object_id, idx);
        idx
    })
    .expect("a non-empty subset always yields a subtree root")
}
