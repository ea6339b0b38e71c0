//! Arena-indexed binary tree node, shared by the object BVH and the mesh
//! BVH.
//!
//! The source models a tree of nullable child/parent references and marks
//! leaf-only fields with sentinels (`object_id = -1`). The Design Notes for
//! this port call that out directly: prefer an arena of integer indices
//! with a tagged-variant node over a graph of nullable owning pointers. This
//! module is that arena: `Node<T, L>` carries the bounds/depth every node
//! has in common, `NodeKind<L>` distinguishes leaf from internal by
//! variant (no sentinel needed — a leaf with no payload is `Leaf(None)`
//! when `L = Option<_>`, as the object BVH uses it), and `Arena` owns the
//! backing storage with a free list so removed slots get reused instead of
//! growing the vector forever.
//!
//! Every traversal here is iterative with an explicit stack, per the hard
//! "no recursion" requirement: trees in practice exceed the depth a
//! recursive call stack should be trusted with, and the source itself went
//! to the trouble of converting every recursive walk to a loop.

use crate::{geometry::primitives::Aabb, geometry::traits::RealNumber, helpers::iter_cap::IterationBudget};

/// Safety cap on `walk_upwards_refit`'s climb: the spec calls for 64 or the
/// tree's configured max depth, whichever applies. 64 is comfortably beyond
/// any depth this crate's builders would produce (`max_depth` defaults to
/// 32/40), so it only ever bites on a corrupted arena.
const REFIT_WALK_CAP: u64 = 64;

/// Index into an `Arena`. Never exposed outside this crate — callers only
/// ever see the opaque `u64` object ids the object BVH hands out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub(crate) struct NodeIndex(pub(crate) u32);

#[derive(Debug, Clone)]
pub(crate) enum NodeKind<L> {
    Leaf(L),
    Internal { left: NodeIndex, right: NodeIndex },
}

#[derive(Debug, Clone)]
pub(crate) struct Node<T: RealNumber, L> {
    pub bounds: Aabb<T>,
    pub depth: u32,
    pub parent: Option<NodeIndex>,
    pub kind: NodeKind<L>,
}

impl<T: RealNumber, L> Node<T, L> {
    #[inline]
    pub fn is_leaf(&self) -> bool {
        matches!(self.kind, NodeKind::Leaf(_))
    }

    #[inline]
    pub fn leaf(&self) -> Option<&L> {
        match &self.kind {
            NodeKind::Leaf(l) => Some(l),
            NodeKind::Internal { .. } => None,
        }
    }

    #[inline]
    pub fn leaf_mut(&mut self) -> Option<&mut L> {
        match &mut self.kind {
            NodeKind::Leaf(l) => Some(l),
            NodeKind::Internal { .. } => None,
        }
    }

    #[inline]
    pub fn children(&self) -> Option<(NodeIndex, NodeIndex)> {
        match self.kind {
            NodeKind::Internal { left, right } => Some((left, right)),
            NodeKind::Leaf(_) => None,
        }
    }
}

/// Owning arena of tree nodes, with a free list so that node slots freed by
/// `remove` are recycled by later `insert` calls rather than leaking.
#[derive(Debug, Clone)]
pub(crate) struct Arena<T: RealNumber, L> {
    slots: Vec<Option<Node<T, L>>>,
    free: Vec<NodeIndex>,
}

impl<T: RealNumber, L> Default for Arena<T, L> {
    fn default() -> Self {
        Self {
            slots: Vec::new(),
            free: Vec::new(),
        }
    }
}

impl<T: RealNumber, L> Arena<T, L> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.slots.clear();
        self.free.clear();
    }

    pub fn len(&self) -> usize {
        self.slots.len() - self.free.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn insert(&mut self, node: Node<T, L>) -> NodeIndex {
        if let Some(idx) = self.free.pop() {
            self.slots[idx.0 as usize] = Some(node);
            idx
        } else {
            let idx = NodeIndex(self.slots.len() as u32);
            self.slots.push(Some(node));
            idx
        }
    }

    pub fn remove(&mut self, idx: NodeIndex) -> Node<T, L> {
        let node = self.slots[idx.0 as usize]
            .take()
            .expect("remove called on a vacant arena slot");
        self.free.push(idx);
        node
    }

    pub fn get(&self, idx: NodeIndex) -> &Node<T, L> {
        self.slots[idx.0 as usize]
            .as_ref()
            .expect("dangling NodeIndex into arena")
    }

    pub fn get_mut(&mut self, idx: NodeIndex) -> &mut Node<T, L> {
        self.slots[idx.0 as usize]
            .as_mut()
            .expect("dangling NodeIndex into arena")
    }

    /// Creates a leaf node and returns its index. Does not link a parent —
    /// callers wire `parent` up themselves once the surrounding internal
    /// node (if any) exists.
    pub fn make_leaf(&mut self, bounds: Aabb<T>, payload: L, depth: u32) -> NodeIndex {
        self.insert(Node {
            bounds,
            depth,
            parent: None,
            kind: NodeKind::Leaf(payload),
        })
    }

    /// Creates an internal node over `left`/`right`, sets both children's
    /// `parent` back-reference, and returns the new node's index.
    pub fn make_internal(&mut self, left: NodeIndex, right: NodeIndex, depth: u32) -> NodeIndex {
        let bounds = self.get(left).bounds.union(&self.get(right).bounds);
        let idx = self.insert(Node {
            bounds,
            depth,
            parent: None,
            kind: NodeKind::Internal { left, right },
        });

        self.get_mut(left).parent = Some(idx);
        self.get_mut(right).parent = Some(idx);
        idx
    }

    /// Recomputes `bounds` for an internal node directly from its children,
    /// in scalar arithmetic (no temporary AABB beyond the one union call),
    /// matching the source's discipline of avoiding value-type churn in hot
    /// paths.
    pub fn recompute_bounds_from_children(&mut self, idx: NodeIndex) {
        let (left, right) = self
            .get(idx)
            .children()
            .expect("recompute_bounds_from_children called on a leaf");
        let bounds = self.get(left).bounds.union(&self.get(right).bounds);
        self.get_mut(idx).bounds = bounds;
    }

    /// Iterative bounds refit walking from `start` up to the root,
    /// recomputing each ancestor's bounds from its children. Bounded by
    /// `REFIT_WALK_CAP`: exceeding it means the parent graph has a cycle,
    /// which is a bug, not a normal outcome — the walk simply stops rather
    /// than looping forever.
    pub fn walk_upwards_refit(&mut self, start: NodeIndex) {
        let mut budget = IterationBudget::new(REFIT_WALK_CAP);
        let mut current = self.get(start).parent;

        while let Some(idx) = current {
            if !budget.tick() {
                log::warn!("walk_upwards_refit exceeded its safety cap; parent graph may be cyclic");
                break;
            }

            self.recompute_bounds_from_children(idx);
            current = self.get(idx).parent;
        }
    }

    /// Collects every index in the subtree rooted at `root`, `root` itself
    /// included. Used when a subtree is pushed down or pulled up a depth
    /// level (insertion splits, removal splices) and every node in it needs
    /// its `depth` field adjusted.
    pub fn subtree_indices(&self, root: NodeIndex) -> Vec<NodeIndex> {
        let mut indices = Vec::new();
        self.traverse(root, |idx, _| indices.push(idx));
        indices
    }

    /// Iterative, stack-based depth-first traversal, left children visited
    /// before right. `visit` is called once per node (leaf and internal
    /// alike); callers that only care about leaves filter with `is_leaf`.
    pub fn traverse(&self, root: NodeIndex, mut visit: impl FnMut(NodeIndex, &Node<T, L>)) {
        let mut stack = vec![root];

        while let Some(idx) = stack.pop() {
            let node = self.get(idx);
            visit(idx, node);

            if let NodeKind::Internal { left, right } = node.kind {
                // Push right first so left is popped (visited) first.
                stack.push(right);
                stack.push(left);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use super::*;

    fn unit_aabb() -> Aabb<f64> {
        Aabb::new(Point3::origin(), Point3::new(1.0, 1.0, 1.0))
    }

    #[test]
    fn make_internal_unions_children_bounds_and_sets_parents() {
        let mut arena: Arena<f64, Option<u32>> = Arena::new();
        let l = arena.make_leaf(unit_aabb(), Some(1), 1);
        let r = arena.make_leaf(Aabb::new(Point3::new(5.0, 5.0, 5.0), Point3::new(6.0, 6.0, 6.0)), Some(2), 1);
        let parent = arena.make_internal(l, r, 0);

        assert_eq!(arena.get(l).parent, Some(parent));
        assert_eq!(arena.get(r).parent, Some(parent));
        assert_eq!(arena.get(parent).bounds.min(), Point3::origin());
        assert_eq!(arena.get(parent).bounds.max(), Point3::new(6.0, 6.0, 6.0));
    }

    #[test]
    fn traverse_visits_left_before_right() {
        let mut arena: Arena<f64, Option<u32>> = Arena::new();
        let l = arena.make_leaf(unit_aabb(), Some(1), 1);
        let r = arena.make_leaf(unit_aabb(), Some(2), 1);
        let root = arena.make_internal(l, r, 0);

        let mut order = Vec::new();
        arena.traverse(root, |_, node| {
            if let Some(payload) = node.leaf() {
                order.push(*payload);
            }
        });

        assert_eq!(order, vec![Some(1), Some(2)]);
    }

    #[test]
    fn walk_upwards_refit_propagates_to_root() {
        let mut arena: Arena<f64, Option<u32>> = Arena::new();
        let l = arena.make_leaf(unit_aabb(), Some(1), 1);
        let r = arena.make_leaf(unit_aabb(), Some(2), 1);
        let root = arena.make_internal(l, r, 0);

        arena.get_mut(l).bounds = Aabb::new(Point3::new(-5.0, -5.0, -5.0), Point3::new(-4.0, -4.0, -4.0));
        arena.walk_upwards_refit(l);

        assert_eq!(arena.get(root).bounds.min(), Point3::new(-5.0, -5.0, -5.0));
    }
}
