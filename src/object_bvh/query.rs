//! Query operations on the dynamic object BVH: `raycast`, `raycast_first`,
//! `query_range`, `find_nearest`, `intersect_bounds`.
//!
//! Every traversal here is iterative and stack-based, grounded in the
//! teacher's `AABBTree::closest_point` loop — the teacher's only surviving
//! iterative tree walk, generalized to the four query shapes this crate
//! needs instead of just closest-point.

use nalgebra::Point3;

use crate::error::QueryError;
use crate::geometry::primitives::{Aabb, Ray};
use crate::geometry::traits::RealNumber;
use crate::helpers::aliases::Vec3;
use crate::tree::{NodeIndex, NodeKind};

use super::tree::ObjectBvh;

/// A single ray hit against an object's AABB.
#[derive(Debug, Clone, Copy)]
pub struct RaycastHit<'a, T: RealNumber, P> {
    pub object_id: u64,
    pub payload: &'a P,
    pub t: T,
    pub point: Point3<T>,
    /// Outward normal at the hit point, approximated as the axis of
    /// largest-magnitude component of `point - center`, per the Design
    /// Notes' Open Question: retained as written (not geometrically exact
    /// for non-cubic AABBs, but this is the documented choice).
    pub normal: Vec3<T>,
}

/// A `find_nearest` result: the closest-point distance is to the payload's
/// AABB, used as the distance proxy per the spec's data model (the tree
/// never queries true payload geometry, only bounds).
#[derive(Debug, Clone, Copy)]
pub struct NearestHit<'a, T: RealNumber, P> {
    pub object_id: u64,
    pub payload: &'a P,
    pub distance: T,
}

impl<T: RealNumber, P> ObjectBvh<T, P> {
    /// Ray-casts against every leaf whose AABB is hit within `[0,
    /// max_distance]`, returning hits sorted ascending by `t`.
    pub fn raycast(&self, ray: &Ray<T>, max_distance: T) -> Vec<RaycastHit<'_, T, P>> {
        let mut hits = self.collect_ray_hits(ray, max_distance);
        hits.sort_by(|a, b| a.t.partial_cmp(&b.t).unwrap_or(std::cmp::Ordering::Equal));
        hits
    }

    /// Priority-ordered traversal that stops descending into subtrees
    /// whose entry distance exceeds the best hit found so far.
    pub fn raycast_first(&self, ray: &Ray<T>, max_distance: T) -> Option<RaycastHit<'_, T, P>> {
        let Some(root) = self.root else { return None };

        let mut best: Option<RaycastHit<'_, T, P>> = None;
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

            match node.kind {
                NodeKind::Leaf(Some(ref leaf)) => {
                    let point = ray.point_at(entry);
                    let normal = outward_normal(&node.bounds, &point);
                    let candidate = RaycastHit {
                        object_id: leaf.object_id,
                        payload: &leaf.payload,
                        t: entry,
                        point,
                        normal,
                    };

                    let replace = match &best {
                        Some(current_best) => candidate.t < current_best.t,
                        None => true,
                    };

                    if replace {
                        best = Some(candidate);
                    }
                }
                NodeKind::Leaf(None) => {}
                NodeKind::Internal { left, right } => {
                    push_farther_first(self, left, right, ray, &mut stack);
                }
            }
        }

        best
    }

    fn collect_ray_hits(&self, ray: &Ray<T>, max_distance: T) -> Vec<RaycastHit<'_, T, P>> {
        let Some(root) = self.root else { return Vec::new() };

        let mut hits = Vec::new();
        let mut stack = vec![root];

        while let Some(idx) = stack.pop() {
            let node = self.arena.get(idx);

            let Some(entry) = node.bounds.intersects_ray_at(ray) else {
                continue;
            };

            if entry < T::zero() || entry > max_distance {
                continue;
            }

            match node.kind {
                NodeKind::Leaf(Some(ref leaf)) => {
                    let point = ray.point_at(entry);
                    hits.push(RaycastHit {
                        object_id: leaf.object_id,
                        payload: &leaf.payload,
                        t: entry,
                        point,
                        normal: outward_normal(&node.bounds, &point),
                    });
                }
                NodeKind::Leaf(None) => {}
                NodeKind::Internal { left, right } => {
                    stack.push(left);
                    stack.push(right);
                }
            }
        }

        hits
    }

    /// All payloads whose bounds center is within `radius` of `center`.
    /// The query AABB `[center - r, center + r]` only prunes the
    /// traversal; membership itself is the tighter center-distance test,
    /// so a leaf whose bounds merely overlap the query box without its
    /// center falling inside the sphere is excluded. `intersect_bounds`
    /// is the bounds-overlap form; this one is not.
    pub fn query_range(&self, center: Point3<T>, radius: T) -> Result<Vec<&P>, QueryError> {
        if radius < T::zero() {
            return Err(QueryError::NegativeRadius);
        }

        let Some(root) = self.root else { return Ok(Vec::new()) };

        let r = Vec3::new(radius, radius, radius);
        let query_box = Aabb::new(center - r, center + r);
        let radius_sq = radius * radius;

        let mut matches = Vec::new();
        let mut stack = vec![root];

        while let Some(idx) = stack.pop() {
            let node = self.arena.get(idx);

            if !node.bounds.intersects_aabb(&query_box) {
                continue;
            }

            match node.kind {
                NodeKind::Leaf(Some(ref leaf)) => {
                    let diff = node.bounds.get_center() - center;
                    if diff.dot(&diff) <= radius_sq {
                        matches.push(&leaf.payload);
                    }
                }
                NodeKind::Leaf(None) => {}
                NodeKind::Internal { left, right } => {
                    stack.push(left);
                    stack.push(right);
                }
            }
        }

        Ok(matches)
    }

    /// All payloads whose bounds overlap `query_box` directly.
    pub fn intersect_bounds(&self, query_box: Aabb<T>) -> Vec<&P> {
        self.intersect_bounds_unchecked(&query_box)
    }

    fn intersect_bounds_unchecked(&self, query_box: &Aabb<T>) -> Vec<&P> {
        let Some(root) = self.root else { return Vec::new() };

        let mut matches = Vec::new();
        let mut stack = vec![root];

        while let Some(idx) = stack.pop() {
            let node = self.arena.get(idx);

            if !node.bounds.intersects_aabb(query_box) {
                continue;
            }

            match node.kind {
                NodeKind::Leaf(Some(ref leaf)) => matches.push(&leaf.payload),
                NodeKind::Leaf(None) => {}
                NodeKind::Internal { left, right } => {
                    stack.push(left);
                    stack.push(right);
                }
            }
        }

        matches
    }

    /// Priority-ordered nearest-neighbor search by AABB closest-point
    /// distance. `max_distance` of `None` is treated as unbounded; a
    /// negative `max_distance` is rejected rather than silently matching
    /// nothing.
    pub fn find_nearest(&self, point: Point3<T>, max_distance: Option<T>) -> Result<Option<NearestHit<'_, T, P>>, QueryError> {
        if let Some(max_distance) = max_distance {
            if max_distance < T::zero() {
                return Err(QueryError::NegativeMaxDistance);
            }
        }

        let Some(root) = self.root else { return Ok(None) };
        let cap = max_distance.unwrap_or_else(T::infinity);

        let mut best: Option<(T, NodeIndex)> = None;
        let mut stack = vec![root];

        while let Some(idx) = stack.pop() {
            let node = self.arena.get(idx);
            let lower_bound = node.bounds.squared_distance(&point);

            if let Some((best_dist, _)) = best {
                if lower_bound >= best_dist {
                    continue;
                }
            }

            if lower_bound > cap * cap {
                continue;
            }

            match node.kind {
                NodeKind::Leaf(Some(_)) => {
                    let is_better = match &best {
                        Some((best_dist, _)) => lower_bound < *best_dist,
                        None => true,
                    };

                    if is_better {
                        best = Some((lower_bound, idx));
                    }
                }
                NodeKind::Leaf(None) => {}
                NodeKind::Internal { left, right } => {
                    let dist_left = self.arena.get(left).bounds.squared_distance(&point);
                    let dist_right = self.arena.get(right).bounds.squared_distance(&point);

                    if dist_left <= dist_right {
                        stack.push(right);
                        stack.push(left);
                    } else {
                        stack.push(left);
                        stack.push(right);
                    }
                }
            }
        }

        let Some((squared_distance, idx)) = best else { return Ok(None) };
        let leaf = self.arena.get(idx).leaf().unwrap().as_ref().unwrap();

        Ok(Some(NearestHit {
            object_id: leaf.object_id,
            payload: &leaf.payload,
            distance: num_traits::Float::sqrt(squared_distance),
        }))
    }
}

/// Pushes `left`/`right` onto `stack` with the farther child pushed first,
/// so the closer one is popped (visited) next — the "first-hit
/// optimization" the spec calls for.
fn push_farther_first<T: RealNumber, P>(bvh: &ObjectBvh<T, P>, left: NodeIndex, right: NodeIndex, ray: &Ray<T>, stack: &mut Vec<NodeIndex>) {
    let entry_left = bvh.arena.get(left).bounds.intersects_ray_at(ray).unwrap_or_else(T::infinity);
    let entry_right = bvh.arena.get(right).bounds.intersects_ray_at(ray).unwrap_or_else(T::infinity);

    if entry_left <= entry_right {
        stack.push(right);
        stack.push(left);
    } else {
        stack.push(left);
        stack.push(right);
    }
}

fn outward_normal<T: RealNumber>(bounds: &Aabb<T>, point: &Point3<T>) -> Vec3<T> {
    use num_traits::Float;

    let center = bounds.get_center();
    let offset = point - center;

    let ax = Float::abs(offset.x);
    let ay = Float::abs(offset.y);
    let az = Float::abs(offset.z);

    if ax >= ay && ax >= az {
        Vec3::new(Float::signum(offset.x), T::zero(), T::zero())
    } else if ay >= az {
        Vec3::new(T::zero(), Float::signum(offset.y), T::zero())
    } else {
        Vec3::new(T::zero(), T::zero(), Float::signum(offset.z))
    }
}

#[cfg(test)]
mod tests {
    use nalgebra::{Point3, Vector3};

    use super::*;

    fn cube_at(c: f64) -> Aabb<f64> {
        Aabb::new(Point3::new(c - 1.0, -1.0, -1.0), Point3::new(c + 1.0, 1.0, 1.0))
    }

    #[test]
    fn two_cubes_on_the_x_axis_yield_two_ordered_hits() {
        let mut bvh: ObjectBvh<f64, &'static str> = ObjectBvh::default();
        bvh.insert(Aabb::new(Point3::new(-2.0, -1.0, -1.0), Point3::new(-1.0, 1.0, 1.0)), "near");
        bvh.insert(Aabb::new(Point3::new(1.0, -1.0, -1.0), Point3::new(2.0, 1.0, 1.0)), "far");

        let ray = Ray::new(Point3::new(-10.0, 0.0, 0.0), Vector3::new(1.0, 0.0, 0.0));
        let hits = bvh.raycast(&ray, 100.0);

        assert_eq!(hits.len(), 2);
        assert!((hits[0].t - 8.0).abs() < 1e-9);
        assert!((hits[1].t - 11.0).abs() < 1e-9);

        let first = bvh.raycast_first(&ray, 100.0).unwrap();
        assert_eq!(*first.payload, "near");
        assert!((first.t - 8.0).abs() < 1e-9);
    }

    #[test]
    fn find_nearest_on_uniform_grid_returns_containing_cell() {
        let mut bvh: ObjectBvh<f64, (i32, i32, i32)> = ObjectBvh::default();

        for x in 0..10 {
            for y in 0..10 {
                for z in 0..10 {
                    let center = Point3::new(x as f64, y as f64, z as f64);
                    let bounds = Aabb::new(center - Vector3::new(0.5, 0.5, 0.5), center + Vector3::new(0.5, 0.5, 0.5));
                    bvh.insert(bounds, (x, y, z));
                }
            }
        }

        let nearest = bvh.find_nearest(Point3::new(5.1, 5.1, 5.1), None).unwrap().unwrap();
        assert_eq!(*nearest.payload, (5, 5, 5));
        assert!(nearest.distance.abs() < 1e-9);
    }

    #[test]
    fn find_nearest_rejects_negative_max_distance() {
        let bvh: ObjectBvh<f64, &'static str> = ObjectBvh::default();
        assert_eq!(bvh.find_nearest(Point3::origin(), Some(-1.0)).unwrap_err(), QueryError::NegativeMaxDistance);
    }

    #[test]
    fn query_range_on_uniform_grid_returns_center_and_six_neighbors() {
        let mut bvh: ObjectBvh<f64, (i32, i32, i32)> = ObjectBvh::default();

        for x in 0..10 {
            for y in 0..10 {
                for z in 0..10 {
                    let center = Point3::new(x as f64, y as f64, z as f64);
                    let bounds = Aabb::new(center - Vector3::new(0.5, 0.5, 0.5), center + Vector3::new(0.5, 0.5, 0.5));
                    bvh.insert(bounds, (x, y, z));
                }
            }
        }

        let hits = bvh.query_range(Point3::new(5.0, 5.0, 5.0), 1.0).unwrap();
        assert_eq!(hits.len(), 7);
    }

    #[test]
    fn query_range_rejects_negative_radius() {
        let bvh: ObjectBvh<f64, &'static str> = ObjectBvh::default();
        assert_eq!(bvh.query_range(Point3::origin(), -1.0), Err(QueryError::NegativeRadius));
    }

    #[test]
    fn empty_tree_queries_return_nothing() {
        let bvh: ObjectBvh<f64, &'static str> = ObjectBvh::default();
        let ray = Ray::new(Point3::origin(), Vector3::x());

        assert!(bvh.raycast(&ray, 100.0).is_empty());
        assert!(bvh.raycast_first(&ray, 100.0).is_none());
        assert!(bvh.find_nearest(Point3::origin(), None).unwrap().is_none());
        assert!(bvh.intersect_bounds(cube_at(0.0)).is_empty());
    }
}
