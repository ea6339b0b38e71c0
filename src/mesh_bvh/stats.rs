//! Diagnostic snapshot for the mesh BVH. Mirrors
//! `object_bvh::stats::Stats` in shape; kept as a distinct type since the
//! mesh BVH has no `object_map`/`validate` concept of its own (it is
//! static after construction, so there is nothing to corrupt between
//! builds).

use crate::tree::NodeKind;

use super::tree::MeshBvh;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshStats {
    pub node_count: u32,
    pub leaf_count: u32,
    pub max_depth: u32,
    pub triangle_count: u32,
    pub memory_usage_estimate: usize,
}

impl<T: crate::geometry::traits::RealNumber, P> MeshBvh<T, P> {
    pub fn stats(&self) -> MeshStats {
        let Some(root) = self.root else {
            return MeshStats {
                node_count: 0,
                leaf_count: 0,
                max_depth: 0,
                triangle_count: 0,
                memory_usage_estimate: 0,
            };
        };

        let mut node_count = 0u32;
        let mut leaf_count = 0u32;
        let mut max_depth = 0u32;
        let mut triangle_count = 0u32;

        self.arena.traverse(root, |_, node| {
            node_count += 1;
            max_depth = max_depth.max(node.depth);

            if let NodeKind::Leaf(indices) = &node.kind {
                leaf_count += 1;
                triangle_count += indices.len() as u32;
            }
        });

        let node_size = std::mem::size_of::<crate::tree::Node<T, Vec<usize>>>();
        let triangle_size = std::mem::size_of::<crate::geometry::primitives::Triangle<T, P>>();

        MeshStats {
            node_count,
            leaf_count,
            max_depth,
            triangle_count,
            memory_usage_estimate: node_count as usize * node_size + self.triangles.len() * triangle_size,
        }
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::Point3;

    use super::*;
    use crate::build::BuildStrategy;
    use crate::geometry::primitives::Triangle;

    #[test]
    fn stats_on_empty_mesh_are_zero() {
        let bvh: MeshBvh<f64> = MeshBvh::default();
        let stats = bvh.stats();
        assert_eq!(stats.node_count, 0);
        assert_eq!(stats.triangle_count, 0);
    }

    #[test]
    fn stats_count_every_triangle_exactly_once() {
        let triangles: Vec<_> = (0..30)
            .map(|i| {
                let o = i as f64 * 2.0;
                Triangle::new(Point3::new(o, 0.0, 0.0), Point3::new(o + 1.0, 0.0, 0.0), Point3::new(o, 1.0, 0.0), i, ())
            })
            .collect();

        let bvh = MeshBvh::build_from_triangles(triangles, BuildStrategy::Sah, 4, 40);
        let stats = bvh.stats();

        assert_eq!(stats.triangle_count, 30);
        assert!(stats.node_count >= stats.leaf_count);
    }
}
