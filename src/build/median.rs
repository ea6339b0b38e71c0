//! Spatial-median ("Equal") and object-median ("Median") partitioning, and
//! the in-place axis-value partition both SAH and spatial-median use to
//! reorder a subset once a split boundary is chosen.

use crate::geometry::primitives::Aabb;
use crate::geometry::traits::RealNumber;

use super::BuildItem;

/// Longest-axis midpoint split: the `Equal` strategy.
pub(crate) fn spatial_median_axis<T: RealNumber>(full_bounds: &Aabb<T>) -> (usize, T) {
    let axis = full_bounds.longest_axis();
    let two = T::from(2.0).unwrap();
    let boundary = (full_bounds.min()[axis] + full_bounds.max()[axis]) / two;
    (axis, boundary)
}

/// Partitions `items` in place by `centroid[axis] < boundary`. Returns the
/// count of items now occupying `items[..split]` (the left partition).
pub(crate) fn partition_by_axis_value<T: RealNumber, K>(items: &mut [BuildItem<T, K>], axis: usize, boundary: T) -> usize {
    let mut left_end = 0;

    for k in 0..items.len() {
        if items[k].centroid[axis] < boundary {
            items.swap(left_end, k);
            left_end += 1;
        }
    }

    left_end
}

/// Object-median split: sort by centroid on the union bounds' longest
/// axis, cut exactly at `floor(n/2)`. Always balanced by count, so it
/// cannot itself be degenerate the way SAH and spatial-median can — the
/// last link in the builder fallback chain.
pub(crate) fn object_median_split<T: RealNumber, K>(items: &mut [BuildItem<T, K>], full_bounds: &Aabb<T>) -> usize {
    let axis = full_bounds.longest_axis();
    items.sort_by(|a, b| {
        a.centroid[axis]
            .partial_cmp(&b.centroid[axis])
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    items.len() / 2
}
