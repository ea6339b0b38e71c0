//! Binned Surface Area Heuristic split search.
//!
//! Generalizes the source's 12-bin `Area` partition strategy to the spec's
//! mandated 32 bins and explicit `C_t`/`C_i` cost constants (Design Notes:
//! "SAH constants are policy, not configuration").

use crate::geometry::primitives::Aabb;
use crate::geometry::traits::RealNumber;

use super::strategy::{SAH_BIN_COUNT, SAH_INTERSECTION_COST, SAH_TRAVERSAL_COST};
use super::{union_bounds, BuildItem};

#[derive(Clone, Copy)]
struct Bin<T: RealNumber> {
    count: usize,
    bounds: Aabb<T>,
}

impl<T: RealNumber> Bin<T> {
    fn empty() -> Self {
        Self {
            count: 0,
            bounds: Aabb::empty(),
        }
    }
}

pub(crate) struct SahSplit<T: RealNumber> {
    pub axis: usize,
    pub boundary: T,
}

pub(crate) enum SahOutcome<T: RealNumber> {
    /// Partition by `centroid[axis] < boundary`.
    Split(SahSplit<T>),
    /// Cost model judges leaf emission cheaper than any split, and the
    /// subset is small enough that doing so is allowed.
    EmitLeaves,
    /// Every candidate split left one side empty on every axis (the
    /// centroids are coincident, or the subset is too small to bin). The
    /// caller falls back to object-median.
    Degenerate,
}

/// Evaluates the 32-bin SAH sweep across all three axes and returns the
/// best split found, or a reason none qualifies.
pub(crate) fn evaluate<T: RealNumber, K>(items: &[BuildItem<T, K>], max_leaf_size: usize) -> SahOutcome<T> {
    let n = items.len();

    if n < 2 {
        return SahOutcome::EmitLeaves;
    }

    let full_bounds = union_bounds(items);
    let sa_parent = full_bounds.surface_area();

    if sa_parent <= T::zero() {
        return SahOutcome::Degenerate;
    }

    let mut centroid_bounds = Aabb::empty();
    for item in items {
        centroid_bounds = centroid_bounds.union_point(&item.centroid);
    }

    let c_t = T::from(SAH_TRAVERSAL_COST).unwrap();
    let c_i = T::from(SAH_INTERSECTION_COST).unwrap();
    let bin_count_t = T::from(SAH_BIN_COUNT as f64).unwrap();

    let mut best: Option<(usize, T, T)> = None;

    for axis in 0..3 {
        let min_axis = centroid_bounds.min()[axis];
        let max_axis = centroid_bounds.max()[axis];
        let extent = max_axis - min_axis;

        if extent <= T::zero() {
            continue;
        }

        let mut bins = vec![Bin::<T>::empty(); SAH_BIN_COUNT];

        for item in items {
            let normalized = (item.centroid[axis] - min_axis) / extent * bin_count_t;
            let idx = normalized.to_usize().unwrap_or(0).min(SAH_BIN_COUNT - 1);
            bins[idx].count += 1;
            bins[idx].bounds = bins[idx].bounds.union(&item.bounds);
        }

        let mut left_count = vec![0usize; SAH_BIN_COUNT];
        let mut left_bounds = vec![Aabb::<T>::empty(); SAH_BIN_COUNT];
        let mut running_count = 0usize;
        let mut running_bounds = Aabb::empty();

        for i in 0..SAH_BIN_COUNT {
            running_count += bins[i].count;
            running_bounds = running_bounds.union(&bins[i].bounds);
            left_count[i] = running_count;
            left_bounds[i] = running_bounds;
        }

        let mut right_count = vec![0usize; SAH_BIN_COUNT];
        let mut right_bounds = vec![Aabb::<T>::empty(); SAH_BIN_COUNT];
        running_count = 0;
        running_bounds = Aabb::empty();

        for i in (0..SAH_BIN_COUNT).rev() {
            running_count += bins[i].count;
            running_bounds = running_bounds.union(&bins[i].bounds);
            right_count[i] = running_count;
            right_bounds[i] = running_bounds;
        }

        for i in 0..(SAH_BIN_COUNT - 1) {
            let n_l = left_count[i];
            let n_r = right_count[i + 1];

            if n_l == 0 || n_r == 0 {
                continue;
            }

            let sa_l = left_bounds[i].surface_area();
            let sa_r = right_bounds[i + 1].surface_area();
            let n_l_t = T::from(n_l as f64).unwrap();
            let n_r_t = T::from(n_r as f64).unwrap();

            let cost = c_t + (sa_l / sa_parent) * n_l_t * c_i + (sa_r / sa_parent) * n_r_t * c_i;

            let is_better = match &best {
                Some((_, _, best_cost)) => cost < *best_cost,
                None => true,
            };

            if is_better {
                let frac = T::from((i + 1) as f64 / SAH_BIN_COUNT as f64).unwrap();
                let boundary = min_axis + extent * frac;
                best = Some((axis, boundary, cost));
            }
        }
    }

    let leaf_cost = T::from(n as f64).unwrap() * c_i;

    match best {
        None => SahOutcome::Degenerate,
        Some((axis, boundary, cost)) => {
            if cost >= leaf_cost && n <= 2 * max_leaf_size {
                SahOutcome::EmitLeaves
            } else {
                SahOutcome::Split(SahSplit { axis, boundary })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use super::*;

    fn item(x: f64) -> BuildItem<f64, u32> {
        let p = Point3::new(x, 0.0, 0.0);
        BuildItem::new(Aabb::new(Point3::new(x - 0.1, -0.1, -0.1), Point3::new(x + 0.1, 0.1, 0.1)), p, 0)
    }

    #[test]
    fn splits_a_clearly_bimodal_cluster_between_the_clusters() {
        let items: Vec<_> = (0..5)
            .map(|i| item(i as f64))
            .chain((20..25).map(|i| item(i as f64)))
            .collect();

        match evaluate(&items, 4) {
            SahOutcome::Split(split) => {
                assert_eq!(split.axis, 0);
                assert!(split.boundary > 4.0 && split.boundary < 20.0);
            }
            _ => panic!("expected a split for a clearly separable cluster"),
        }
    }

    #[test]
    fn coincident_centroids_are_degenerate() {
        let items: Vec<_> = (0..5).map(|_| item(0.0)).collect();
        assert!(matches!(evaluate(&items, 4), SahOutcome::Degenerate));
    }

    #[test]
    fn small_tight_cluster_emits_leaves() {
        let items: Vec<_> = (0..3).map(|i| item(i as f64 * 0.01)).collect();
        assert!(matches!(evaluate(&items, 8), SahOutcome::EmitLeaves));
    }
}
