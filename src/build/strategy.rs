//! Build strategy enum and the SAH cost constants.
//!
//! The constants are policy, not configuration, per the Design Notes:
//! `C_t`/`C_i`/bin count are compiled-in, while the strategy itself is a
//! runtime choice threaded through `rebuild`/`build_from_*`.

/// Traversal cost constant in the SAH cost model.
pub(crate) const SAH_TRAVERSAL_COST: f64 = 1.0;
/// Per-primitive intersection cost constant in the SAH cost model.
pub(crate) const SAH_INTERSECTION_COST: f64 = 1.25;
/// Bin count per axis for the binned SAH sweep. Fixed, not a parameter.
pub(crate) const SAH_BIN_COUNT: usize = 32;

/// Partitioning strategy used by the batch builder, matching the source's
/// `BuildStrategy` enumeration (`SAH = 0`, `Median = 1`, `Equal = 2`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BuildStrategy {
    /// Surface Area Heuristic: binned cost-driven split search.
    #[default]
    Sah,
    /// Object-median: sort by centroid, split at the median index.
    Median,
    /// Spatial-median ("Equal"): split at the midpoint of the longest axis.
    Equal,
}
