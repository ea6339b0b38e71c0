//! Ray casting against the static mesh BVH: `raycast` (all hits),
//! `raycast_first` (priority-ordered closest hit), and
//! `raycast_brute_force` (linear scan, kept as the correctness oracle the
//! spec calls for — §6: "reference implementation retained for
//! correctness testing").

use crate::geometry::primitives::{Aabb, Ray, RayTriangleHit};
use crate::geometry::traits::RealNumber;
use crate::tree::NodeKind;

use super::tree::MeshBvh;

/// A ray–triangle hit against the mesh BVH: the triangle's original
/// `index`, the hit distance/point, and its Möller–Trumbore barycentric
/// coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshHit<T: RealNumber> {
    pub triangle_index: u32,
    pub t: T,
    pub point: nalgebra::Point3<T>,
    pub u: T,
    pub v: T,
    pub w: T,
}

impl<T: RealNumber> MeshHit<T> {
    fn new(triangle_index: u32, ray: &Ray<T>, hit: RayTriangleHit<T>) -> Self {
        Self {
            triangle_index,
            t: hit.t,
            point: ray.point_at(hit.t),
            u: hit.u,
            v: hit.v,
            w: hit.w,
        }
    }
}

impl<T: RealNumber, P> MeshBvh<T, P> {
    /// All ray–triangle hits within `[0, max_distance]`, sorted ascending
    /// by `t`.
    pub fn raycast(&self, ray: &Ray<T>, max_distance: T, cull_backface: bool) -> Vec<MeshHit<T>> {
        let Some(root) = self.root else { return Vec::new() };

        let mut hits = Vec::new();
        let mut stack = vec![root];

        while let Some(idx) = stack.pop() {
            let node = self.arena.get(idx);

            if !node.bounds.intersects_ray(ray) {
                continue;
            }

            match &node.kind {
                NodeKind::Leaf(triangle_indices) => {
                    for &ti in triangle_indices {
                        let triangle = &self.triangles[ti];

                        if let Some(hit) = triangle.intersects_ray_at(ray, cull_backface) {
                            if hit.t <= max_distance {
                                hits.push(MeshHit::new(triangle.index, ray, hit));
                            }
                        }
                    }
                }
                NodeKind::Internal { left, right } => {
                    stack.push(*left);
                    stack.push(*right);
                }
            }
        }

        hits.sort_by(|a, b| a.t.partial_cmp(&b.t).unwrap_or(std::cmp::Ordering::Equal));
        hits
    }

    /// Priority-ordered closest hit: visits the nearer child first and
    /// prunes any subtree whose entry distance exceeds the best hit found
    /// so far.
    pub fn raycast_first(&self, ray: &Ray<T>, max_distance: T, cull_backface: bool) -> Option<MeshHit<T>> {
        let root = self.root?;

        let mut best: Option<MeshHit<T>> = None;
        let mut stack = vec![root];

        while let Some(idx) = stack.pop() {
            let node = self.arena.get(idx);

            let Some(entry) = node.bounds.intersects_ray_at(ray) else {
                continue;
            };

            if entry < T::zero() || entry > max_distance {
                continue;
            }

            if let Some(current_best) = &best {
                if entry >= current_best.t {
                    continue;
                }
            }

            match &node.kind {
                NodeKind::Leaf(triangle_indices) => {
                    for &ti in triangle_indices {
                        let triangle = &self.triangles[ti];

                        if let Some(hit) = triangle.intersects_ray_at(ray, cull_backface) {
                            if hit.t > max_distance {
                                continue;
                            }

                            let candidate = MeshHit::new(triangle.index, ray, hit);
                            let replace = match &best {
                                Some(current_best) => candidate.t < current_best.t,
                                None => true,
                            };

                            if replace {
                                best = Some(candidate);
                            }
                        }
                    }
                }
                NodeKind::Internal { left, right } => {
                    push_closer_first(&self.arena, *left, *right, ray, &mut stack);
                }
            }
        }

        best
    }

    /// Linear scan over every triangle, no tree traversal. Kept as the
    /// correctness oracle the property tests in §8 check the tree-backed
    /// queries against.
    pub fn raycast_brute_force(&self, ray: &Ray<T>, max_distance: T, cull_backface: bool) -> Option<MeshHit<T>> {
        let mut best: Option<MeshHit<T>> = None;

        for triangle in &self.triangles {
            if let Some(hit) = triangle.intersects_ray_at(ray, cull_backface) {
                if hit.t > max_distance {
                    continue;
                }

                let candidate = MeshHit::new(triangle.index, ray, hit);
                let replace = match &best {
                    Some(current_best) => candidate.t < current_best.t,
                    None => true,
                };

                if replace {
                    best = Some(candidate);
                }
            }
        }

        best
    }
}

fn push_closer_first<T: RealNumber>(
    arena: &crate::tree::Arena<T, Vec<usize>>,
    left: crate::tree::NodeIndex,
    right: crate::tree::NodeIndex,
    ray: &Ray<T>,
    stack: &mut Vec<crate::tree::NodeIndex>,
) {
    let entry_left = entry_distance(arena.get(left).bounds, ray);
    let entry_right = entry_distance(arena.get(right).bounds, ray);

    if entry_left <= entry_right {
        stack.push(right);
        stack.push(left);
    } else {
        stack.push(left);
        stack.push(right);
    }
}

fn entry_distance<T: RealNumber>(bounds: Aabb<T>, ray: &Ray<T>) -> T {
    bounds.intersects_ray_at(ray).unwrap_or_else(T::infinity)
}
