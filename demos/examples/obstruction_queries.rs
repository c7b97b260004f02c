// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Obstruction index basics.
//!
//! Scatter obstacle boxes over a field, then ask the three everyday
//! questions: nearest cover, first obstacle along a sight line, and
//! everything near a squad position.
//!
//! Run:
//! - `RUST_LOG=debug cargo run -p canopy_demos --example obstruction_queries`

use canopy_world::{Aabb3, Obstruction, ObstructionFlags, ObstructionIndex, Ray3};
use glam::vec3;

fn main() {
    env_logger::init();

    let mut world = ObstructionIndex::new();
    for i in 0..400_u32 {
        let x = (i % 20) as f32 * 12.0;
        let z = (i / 20) as f32 * 12.0;
        let tall = i % 4 == 0;
        let flags = if tall {
            ObstructionFlags::HIGH_COVER | ObstructionFlags::BLOCKS_PROJECTILES
        } else {
            ObstructionFlags::empty()
        };
        let height = if tall { 4.0 } else { 1.0 };
        world
            .insert(Obstruction {
                id: i,
                aabb: Aabb3::new(vec3(x, 0.0, z), vec3(x + 2.0, height, z + 2.0)),
                flags,
            })
            .unwrap();
    }
    println!("indexed {} obstructions", world.len());

    let unit = vec3(57.0, 0.0, 83.0);
    let (id, dist_sq) = world.closest(unit, ObstructionFlags::HIGH_COVER).unwrap();
    println!(
        "nearest high cover to {unit}: obstruction {id} at distance {:.2}",
        dist_sq.sqrt()
    );

    let sight = Ray3::new(vec3(-10.0, 0.5, 50.0), vec3(1.0, 0.0, 0.1));
    match world.raycast(&sight, ObstructionFlags::BLOCKS_PROJECTILES) {
        Some((id, t)) => println!("sight line blocked by {id} at t = {t:.2}"),
        None => println!("sight line is clear"),
    }

    let mut nearby = 0;
    world.in_radius(unit, 30.0, ObstructionFlags::empty(), |_| nearby += 1);
    println!("{nearby} obstructions within 30m of the squad");
}
