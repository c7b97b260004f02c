// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collision mesh broad-phase.
//!
//! Index a procedurally built wall mesh and test movement segments against
//! it.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p canopy_demos --example mesh_broadphase`

use canopy_world::{Aabb3, CollisionMesh, Segment3, TriMesh};
use glam::{Vec3, vec3};

/// A zig-zag wall of quads along the x axis.
fn wall_mesh(segments: u32) -> TriMesh {
    let mut positions: Vec<Vec3> = Vec::new();
    let mut triangles: Vec<[u32; 3]> = Vec::new();
    for i in 0..=segments {
        let x = i as f32 * 4.0;
        let z = if i % 2 == 0 { 0.0 } else { 2.0 };
        positions.push(vec3(x, 0.0, z));
        positions.push(vec3(x, 3.0, z));
    }
    for i in 0..segments {
        let base = i * 2;
        triangles.push([base, base + 2, base + 1]);
        triangles.push([base + 1, base + 2, base + 3]);
    }
    TriMesh::new(positions, triangles).unwrap()
}

fn main() {
    env_logger::init();

    let collider = CollisionMesh::build(wall_mesh(16)).unwrap();
    println!(
        "collision mesh: {} triangles",
        collider.mesh().triangles().len()
    );

    let walk = Segment3::new(vec3(10.0, 1.0, -5.0), vec3(10.0, 1.0, 5.0));
    match collider.segment_hit(&walk) {
        Some((face, t)) => println!("walk blocked by face {face} at t = {t:.2}"),
        None => println!("walk is clear"),
    }

    let along = Segment3::new(vec3(-5.0, 1.0, -1.0), vec3(70.0, 1.0, -1.0));
    println!(
        "path along the wall blocked: {}",
        collider.segment_blocked(&along)
    );

    let probe = Aabb3::new(vec3(8.0, 0.0, -1.0), vec3(12.0, 2.0, 3.0));
    println!(
        "spawn box {probe:?} overlaps wall: {}",
        collider.intersects_aabb(&probe)
    );
}
