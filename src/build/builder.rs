//! Iterative top-down work-stack driver.
//!
//! The source's `top_down_build_node`/`split` pair is recursive
//! (`top_down_build_node` calls itself on each side of a partition); this is
//! the one place the source's own control flow cannot be generalized as-is,
//! per the hard "no recursion" requirement. The partitioning math (SAH,
//! spatial-median, object-median) is carried over unchanged; only the
//! control flow around it is restructured into an explicit work stack that
//! also carries postorder "combine" markers, so that the internal nodes
//! joining two finished subtrees are created iteratively too, without ever
//! recursing to wait for both sides.

use crate::geometry::traits::RealNumber;
use crate::helpers::iter_cap::IterationBudget;
use crate::tree::{Arena, NodeIndex};

use super::sah::SahOutcome;
use super::strategy::BuildStrategy;
use super::{median, sah, BuildItem};

/// Safety cap on the builder's work-stack loop, matching the source's
/// `objects.length * 2 + 1000` bound for build loops.
fn iteration_cap(len: usize) -> u64 {
    len as u64 * 2 + 1000
}

enum StackOp<T: RealNumber, K> {
    /// Partition (or bottom out and materialize) a subset.
    Process { items: Vec<BuildItem<T, K>>, depth: u32 },
    /// Both children of a split are finished (their roots are the top two
    /// entries of the results stack); join them under a new internal node.
    Combine { depth: u32 },
}

/// Builds a full subtree from `items`, returning its root, or `None` if
/// `items` is empty. `finish` materializes a bottomed-out subset (size `<=
/// max_leaf_size` or `depth >= max_depth`) into one or more arena nodes and
/// returns the index of the subtree root it produced — a chain of
/// single-object inserts for the object BVH, a single multi-triangle leaf
/// for the mesh BVH.
pub(crate) fn build_tree<T: RealNumber, L, K>(
    arena: &mut Arena<T, L>,
    items: Vec<BuildItem<T, K>>,
    strategy: BuildStrategy,
    max_leaf_size: usize,
    max_depth: u32,
    base_depth: u32,
    mut finish: impl FnMut(&mut Arena<T, L>, Vec<BuildItem<T, K>>, u32) -> NodeIndex,
) -> Option<NodeIndex> {
    if items.is_empty() {
        return None;
    }

    let total = items.len();
    let mut ops = vec![StackOp::Process { items, depth: base_depth }];
    let mut results: Vec<NodeIndex> = Vec::new();
    let mut budget = IterationBudget::new(iteration_cap(total));

    while let Some(op) = ops.pop() {
        if !budget.tick() {
            log::warn!("batch builder exceeded its safety cap; force-emitting remaining work as leaves");
            // Drain whatever is left on the stack directly into leaves/combines
            // without further partitioning attempts.
            match op {
                StackOp::Process { items, depth } => results.push(finish(arena, items, depth)),
                StackOp::Combine { depth } => combine(arena, &mut results, depth),
            }
            continue;
        }

        match op {
            StackOp::Process { mut items, depth } => {
                if items.len() <= max_leaf_size || depth >= max_depth {
                    results.push(finish(arena, items, depth));
                    continue;
                }

                match choose_split(&mut items, strategy, max_leaf_size) {
                    Some(mid) if mid > 0 && mid < items.len() => {
                        let right = items.split_off(mid);
                        ops.push(StackOp::Combine { depth });
                        ops.push(StackOp::Process { items: right, depth: depth + 1 });
                        ops.push(StackOp::Process { items, depth: depth + 1 });
                    }
                    _ => results.push(finish(arena, items, depth)),
                }
            }
            StackOp::Combine { depth } => combine(arena, &mut results, depth),
        }
    }

    results.pop()
}

fn combine<T: RealNumber, L>(arena: &mut Arena<T, L>, results: &mut Vec<NodeIndex>, depth: u32) {
    let right = results.pop().expect("combine with a missing right subtree root");
    let left = results.pop().expect("combine with a missing left subtree root");
    results.push(arena.make_internal(left, right, depth));
}

/// Runs the SAH → object-median → direct-leaf fallback chain for one
/// subset. Returns `None` when even object-median can't produce two
/// non-empty sides (only possible for subsets of size `<= 1`, which
/// `build_tree` never reaches since `max_leaf_size >= 1`).
fn choose_split<T: RealNumber, K>(subset: &mut [BuildItem<T, K>], strategy: BuildStrategy, max_leaf_size: usize) -> Option<usize> {
    match strategy {
        BuildStrategy::Sah => match sah::evaluate(subset, max_leaf_size) {
            SahOutcome::Split(split) => {
                let mid = median::partition_by_axis_value(subset, split.axis, split.boundary);
                if mid == 0 || mid == subset.len() {
                    fall_back_to_object_median(subset)
                } else {
                    Some(mid)
                }
            }
            SahOutcome::EmitLeaves => None,
            SahOutcome::Degenerate => fall_back_to_object_median(subset),
        },
        BuildStrategy::Equal => {
            let full_bounds = super::union_bounds(subset);
            let (axis, boundary) = median::spatial_median_axis(&full_bounds);
            let mid = median::partition_by_axis_value(subset, axis, boundary);

            if mid == 0 || mid == subset.len() {
                fall_back_to_object_median(subset)
            } else {
                Some(mid)
            }
        }
        BuildStrategy::Median => fall_back_to_object_median(subset),
    }
}

fn fall_back_to_object_median<T: RealNumber, K>(subset: &mut [BuildItem<T, K>]) -> Option<usize> {
    if subset.len() < 2 {
        return None;
    }

    let full_bounds = super::union_bounds(subset);
    let mid = median::object_median_split(subset, &full_bounds);

    if mid == 0 || mid == subset.len() {
        None
    } else {
        Some(mid)
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use crate::geometry::primitives::Aabb;
    use crate::tree::NodeKind;

    use super::*;

    fn item(x: f64) -> BuildItem<f64, u32> {
        let p = Point3::new(x, 0.0, 0.0);
        BuildItem::new(Aabb::from_point(p), p, x as u32)
    }

    #[test]
    fn builds_a_tree_whose_leaves_partition_all_items() {
        let items: Vec<_> = (0..40).map(|i| item(i as f64)).collect();
        let mut arena: Arena<f64, Vec<u32>> = Arena::new();
        let mut total_leaf_items = 0usize;

        let root = build_tree(&mut arena, items, BuildStrategy::Sah, 4, 32, 0, |arena, subset, depth| {
            total_leaf_items += subset.len();
            let bounds = super::super::union_bounds(&subset);
            let keys: Vec<u32> = subset.into_iter().map(|i| i.key).collect();
            arena.make_leaf(bounds, keys, depth)
        });

        assert!(root.is_some());
        assert_eq!(total_leaf_items, 40);

        if let Some(root) = root {
            let mut leaf_count = 0;
            arena.traverse(root, |_, node| {
                if matches!(node.kind, NodeKind::Leaf(_)) {
                    leaf_count += 1;
                }
            });
            assert!(leaf_count >= 1);
        }
    }

    #[test]
    fn empty_input_yields_no_root() {
        let items: Vec<BuildItem<f64, u32>> = Vec::new();
        let mut arena: Arena<f64, Vec<u32>> = Arena::new();

        let root = build_tree(&mut arena, items, BuildStrategy::Sah, 4, 32, 0, |arena, subset, depth| {
            let bounds = super::super::union_bounds(&subset);
            arena.make_leaf(bounds, subset.into_iter().map(|i| i.key).collect(), depth)
        });

        assert!(root.is_none());
    }

    #[test]
    fn coincident_points_still_terminate_via_object_median_fallback() {
        let items: Vec<_> = (0..20).map(|_| item(0.0)).collect();
        let mut arena: Arena<f64, Vec<u32>> = Arena::new();
        let mut total = 0usize;

        let root = build_tree(&mut arena, items, BuildStrategy::Sah, 4, 32, 0, |arena, subset, depth| {
            total += subset.len();
            let bounds = super::super::union_bounds(&subset);
            arena.make_leaf(bounds, subset.into_iter().map(|i| i.key).collect(), depth)
        });

        assert!(root.is_some());
        assert_eq!(total, 20);
    }
}
