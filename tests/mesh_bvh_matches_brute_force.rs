//! Seed scenario: a tessellated sphere's BVH-accelerated raycast must
//! agree with a linear scan over every triangle, within floating-point
//! tolerance, across a batch of random rays.

use bvh_accel::prelude::*;
use nalgebra::{Point3, Vector3};
use rand::{rngs::StdRng, Rng, SeedableRng};
use std::f64::consts::PI;

/// UV-tessellated unit sphere, `lat_steps` x `lon_steps` quads, 2 triangles
/// per quad, centered at the origin.
fn sphere_positions(lat_steps: usize, lon_steps: usize) -> Vec<Point3<f64>> {
    let mut vertices = Vec::with_capacity(lat_steps * lon_steps);

    for lat in 0..=lat_steps {
        let theta = PI * lat as f64 / lat_steps as f64;
        for lon in 0..lon_steps {
            let phi = 2.0 * PI * lon as f64 / lon_steps as f64;
            vertices.push(Point3::new(theta.sin() * phi.cos(), theta.cos(), theta.sin() * phi.sin()));
        }
    }

    let mut positions = Vec::new();
    for lat in 0..lat_steps {
        for lon in 0..lon_steps {
            let next_lon = (lon + 1) % lon_steps;
            let a = vertices[lat * lon_steps + lon];
            let b = vertices[lat * lon_steps + next_lon];
            let c = vertices[(lat + 1) * lon_steps + lon];
            let d = vertices[(lat + 1) * lon_steps + next_lon];

            positions.push(a);
            positions.push(b);
            positions.push(c);

            positions.push(b);
            positions.push(d);
            positions.push(c);
        }
    }

    positions
}

#[test]
fn bvh_raycast_first_agrees_with_brute_force_over_a_sphere() {
    let positions = sphere_positions(64, 64);
    let bvh: MeshBvh<f64> = MeshBvh::build_from_geometry(&positions, None, BuildStrategy::Sah, 8, 40);
    assert!(bvh.triangle_count() > 0);

    let mut rng = StdRng::seed_from_u64(99);

    for ray_index in 0..1000 {
        let origin = Point3::new(rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0), rng.gen_range(-5.0..5.0));
        let dir = Vector3::new(rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0), rng.gen_range(-1.0..1.0));
        let ray = Ray::new(origin, dir);

        let via_bvh = bvh.raycast_first(&ray, 100.0, false);
        let via_brute_force = bvh.raycast_brute_force(&ray, 100.0, false);

        match (via_bvh, via_brute_force) {
            (None, None) => {}
            (Some(a), Some(b)) => {
                assert_eq!(a.triangle_index, b.triangle_index, "ray {ray_index} hit a different triangle");
                assert!((a.t - b.t).abs() < 1e-4, "ray {ray_index} hit distance drifted: {} vs {}", a.t, b.t);
            }
            (a, b) => panic!("ray {ray_index} disagreed on whether it hit the sphere: {a:?} vs {b:?}"),
        }
    }
}
