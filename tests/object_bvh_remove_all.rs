//! Seed scenario: removing every object in reverse insertion order must
//! never leave the tree in a structurally invalid state, down to the
//! empty tree.

use bvh_accel::prelude::*;
use nalgebra::{Point3, Vector3};
use rand::{rngs::StdRng, Rng, SeedableRng};

#[test]
fn remove_all_in_reverse_order_keeps_the_tree_valid() {
    let mut rng = StdRng::seed_from_u64(11);
    let mut bvh: ObjectBvh<f64, usize> = ObjectBvh::default();
    let mut ids = Vec::with_capacity(500);

    for i in 0..500 {
        let center = Point3::new(rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0), rng.gen_range(-100.0..100.0));
        let half = Vector3::new(0.5, 0.5, 0.5);
        ids.push(bvh.insert(Aabb::new(center - half, center + half), i));
    }

    let (valid, errors) = bvh.validate();
    assert!(valid, "tree invalid right after insertion: {errors:?}");

    for &id in ids.iter().rev() {
        assert!(bvh.remove(id));
        let (valid, errors) = bvh.validate();
        assert!(valid, "tree invalid after removing object {id}: {errors:?}");
    }

    assert!(bvh.is_empty());
    assert_eq!(bvh.len(), 0);
}
