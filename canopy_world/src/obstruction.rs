// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! World-wide obstruction index: nearest obstacle, ray casts, radius sweeps.

use core::cell::Cell;

use glam::Vec3;

use canopy_rtree::{Bounded, DepthExceeded};

use crate::domain::{WorldDomain, WorldTree};
use crate::geom::{Aabb3, Ray3};

bitflags::bitflags! {
    /// Gameplay-relevant properties of an obstruction.
    #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
    pub struct ObstructionFlags: u8 {
        /// Tall enough for units to take cover behind.
        const HIGH_COVER = 0b0000_0001;
        /// Stops projectiles as well as movement.
        const BLOCKS_PROJECTILES = 0b0000_0010;
    }
}

impl Default for ObstructionFlags {
    fn default() -> Self {
        Self::empty()
    }
}

/// One obstruction: an entity id with its world-space bounds and flags.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Obstruction {
    /// Owning entity.
    pub id: u32,
    /// World-space bounds.
    pub aabb: Aabb3,
    /// Gameplay flags.
    pub flags: ObstructionFlags,
}

impl Bounded<WorldDomain> for Obstruction {
    fn rect(&self, _domain: &WorldDomain) -> Aabb3 {
        self.aabb
    }
}

/// Spatial index over every obstruction in a world.
///
/// Queries take a flag filter: only obstructions carrying all filter flags
/// are reported, and an empty filter matches everything.
#[derive(Debug, Default)]
pub struct ObstructionIndex {
    tree: WorldTree<Obstruction>,
}

impl ObstructionIndex {
    /// Create an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of indexed obstructions.
    pub fn len(&self) -> usize {
        self.tree.len()
    }

    /// Whether the index is empty.
    pub fn is_empty(&self) -> bool {
        self.tree.is_empty()
    }

    /// Remove every obstruction.
    pub fn clear(&mut self) {
        self.tree.clear();
    }

    /// Add an obstruction.
    pub fn insert(&mut self, obstruction: Obstruction) -> Result<(), DepthExceeded> {
        self.tree.insert(obstruction)
    }

    /// The obstruction closest to `pos`, with its squared distance.
    pub fn closest(&self, pos: Vec3, filter: ObstructionFlags) -> Option<(u32, f32)> {
        let best: Cell<Option<(u32, f32)>> = Cell::new(None);
        self.tree.visit(
            |rect, _| {
                best.get()
                    .map(|(_, d)| rect.dist_sq(pos) < d)
                    .unwrap_or(true)
            },
            |o| {
                if o.flags.contains(filter) {
                    let d = o.aabb.dist_sq(pos);
                    if best.get().map(|(_, bd)| d < bd).unwrap_or(true) {
                        best.set(Some((o.id, d)));
                    }
                }
                true
            },
        );
        best.into_inner()
    }

    /// The first obstruction along the ray, with its entry parameter.
    pub fn raycast(&self, ray: &Ray3, filter: ObstructionFlags) -> Option<(u32, f32)> {
        let best: Cell<Option<(u32, f32)>> = Cell::new(None);
        self.tree.visit(
            |rect, _| {
                rect.ray_param(ray)
                    .is_some_and(|t| best.get().map(|(_, bt)| t < bt).unwrap_or(true))
            },
            |o| {
                if o.flags.contains(filter) {
                    if let Some(t) = o.aabb.ray_param(ray) {
                        if best.get().map(|(_, bt)| t < bt).unwrap_or(true) {
                            best.set(Some((o.id, t)));
                        }
                    }
                }
                true
            },
        );
        best.into_inner()
    }

    /// Call `f` for every obstruction within `radius` of `center`.
    pub fn in_radius<F>(&self, center: Vec3, radius: f32, filter: ObstructionFlags, mut f: F)
    where
        F: FnMut(&Obstruction),
    {
        let r_sq = radius * radius;
        self.tree.visit(
            |rect, _| rect.dist_sq(center) <= r_sq,
            |o| {
                if o.flags.contains(filter) && o.aabb.dist_sq(center) <= r_sq {
                    f(o);
                }
                true
            },
        );
    }
}
