//! The static, triangle-level BVH: built once from a mesh's geometry and
//! never incrementally updated afterwards (per the spec's explicit
//! non-goal on deformable-mesh refitting). Construction goes through the
//! same iterative work-stack builder `object_bvh::maintenance::rebuild`
//! uses; a leaf here holds the indices of the triangles it owns into the
//! container's own immutable `triangles` array, rather than copies of the
//! triangles themselves, so a mesh with a large payload type isn't
//! duplicated once per leaf.

use nalgebra::Point3;

use crate::build::builder::build_tree;
use crate::build::{union_bounds, BuildItem, BuildStrategy};
use crate::geometry::primitives::Triangle;
use crate::geometry::traits::{HasBounds3, RealNumber};
use crate::tree::{Arena, NodeIndex};

pub(crate) const DEFAULT_MAX_LEAF_TRIANGLES: u32 = 10;
pub(crate) const DEFAULT_MAX_DEPTH: u32 = 40;

/// Static triangle-level BVH.
///
/// `P` is the opaque per-triangle payload the spec's data model allows
/// (`Triangle::payload`); it defaults to `()` for callers that only need
/// geometry, matching `Triangle`'s own default.
pub struct MeshBvh<T: RealNumber, P = ()> {
    pub(super) arena: Arena<T, Vec<usize>>,
    pub(super) root: Option<NodeIndex>,
    pub(super) triangles: Vec<Triangle<T, P>>,
    pub(super) max_leaf_triangles: u32,
    pub(super) max_depth: u32,
}

impl<T: RealNumber, P> MeshBvh<T, P> {
    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn triangles(&self) -> &[Triangle<T, P>] {
        &self.triangles
    }

    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Builds a mesh BVH directly from triangles the caller has already
    /// assembled (each carrying its own `index`/`payload`).
    pub fn build_from_triangles(triangles: Vec<Triangle<T, P>>, strategy: BuildStrategy, max_leaf_triangles: u32, max_depth: u32) -> Self {
        let max_leaf_triangles = max_leaf_triangles.max(1);
        let max_depth = max_depth.max(1);

        let items: Vec<BuildItem<T, usize>> = triangles
            .iter()
            .enumerate()
            .map(|(i, tri)| BuildItem::new(tri.bounds(), tri.centroid(), i))
            .collect();

        let mut arena: Arena<T, Vec<usize>> = Arena::new();
        let root = build_tree(
            &mut arena,
            items,
            strategy,
            max_leaf_triangles as usize,
            max_depth,
            0,
            |arena, subset, depth| {
                let bounds = union_bounds(&subset);
                let indices: Vec<usize> = subset.into_iter().map(|item| item.key).collect();
                arena.make_leaf(bounds, indices, depth)
            },
        );

        Self {
            arena,
            root,
            triangles,
            max_leaf_triangles,
            max_depth,
        }
    }

    /// Builds a mesh BVH from a flat position buffer and an optional index
    /// buffer. Without indices, every three consecutive positions form one
    /// triangle; `index` on each produced `Triangle` is its position in
    /// that generation order.
    pub fn build_from_geometry(positions: &[Point3<T>], indices: Option<&[u32]>, strategy: BuildStrategy, max_leaf_triangles: u32, max_depth: u32) -> Self
    where
        P: Default,
    {
        let triangle_count = match indices {
            Some(idx) => idx.len() / 3,
            None => positions.len() / 3,
        };

        let mut triangles = Vec::with_capacity(triangle_count);

        for i in 0..triangle_count {
            let (a, b, c) = match indices {
                Some(idx) => (positions[idx[i * 3] as usize], positions[idx[i * 3 + 1] as usize], positions[idx[i * 3 + 2] as usize]),
                None => (positions[i * 3], positions[i * 3 + 1], positions[i * 3 + 2]),
            };

            triangles.push(Triangle::new(a, b, c, i as u32, P::default()));
        }

        Self::build_from_triangles(triangles, strategy, max_leaf_triangles, max_depth)
    }
}

impl<T: RealNumber, P> Default for MeshBvh<T, P> {
    fn default() -> Self {
        Self {
            arena: Arena::new(),
            root: None,
            triangles: Vec::new(),
            max_leaf_triangles: DEFAULT_MAX_LEAF_TRIANGLES,
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}
