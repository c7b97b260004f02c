// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=canopy_world --heading-base-level=0

//! Canopy World: glam-native world-space spatial queries.
//!
//! Canopy World is the game-facing layer over [`canopy_rtree`]: a 3D
//! [`Domain`](canopy_rtree::Domain) for `f32` world coordinates plus the
//! query structures a simulation needs every frame.
//!
//! - [`CollisionMesh`]: per-mesh broad-phase over vertices, unique edges, and
//!   faces, for segment blocking tests and box overlap checks.
//! - [`ObstructionIndex`]: one world-wide index of obstacle bounds answering
//!   "nearest obstacle", "first obstacle along this ray", and "everything
//!   within this radius", with [`ObstructionFlags`] filtering.
//! - [`FaceLocator`]: per-face lookup over a navigation mesh for point and
//!   ray face queries.
//!
//! All three are thin drivers of the same pruned visitor traversal; none of
//! them mutate tree internals. Distances are reported squared; take the root
//! at the edge when a metric distance is needed.
//!
//! # Example
//!
//! ```rust
//! use canopy_world::{Aabb3, ObstructionFlags, Obstruction, ObstructionIndex, Ray3};
//! use glam::vec3;
//!
//! let mut world = ObstructionIndex::new();
//! for i in 0..10 {
//!     let x = i as f32 * 10.0;
//!     world
//!         .insert(Obstruction {
//!             id: i,
//!             aabb: Aabb3::new(vec3(x, 0.0, 0.0), vec3(x + 2.0, 4.0, 2.0)),
//!             flags: ObstructionFlags::HIGH_COVER,
//!         })
//!         .unwrap();
//! }
//!
//! // Nearest cover to a unit standing at (33, 0, 1).
//! let (id, _dist_sq) = world
//!     .closest(vec3(33.0, 0.0, 1.0), ObstructionFlags::HIGH_COVER)
//!     .unwrap();
//! assert_eq!(id, 3);
//!
//! // First obstacle along a sight line.
//! let ray = Ray3::new(vec3(-5.0, 1.0, 1.0), vec3(1.0, 0.0, 0.0));
//! let (id, _t) = world.raycast(&ray, ObstructionFlags::empty()).unwrap();
//! assert_eq!(id, 0);
//! ```
//!
//! This crate is `no_std` and uses `alloc`; the `std` (default) and `libm`
//! features select glam's float backend.

#![no_std]

extern crate alloc;

pub mod collision;
pub mod domain;
pub mod geom;
pub mod mesh;
pub mod navmesh;
pub mod obstruction;

pub use collision::CollisionMesh;
pub use domain::{WorldDomain, WorldTree};
pub use geom::{Aabb3, Ray3, Segment3};
pub use mesh::{IndexedFace, MeshError, TriMesh};
pub use navmesh::FaceLocator;
pub use obstruction::{Obstruction, ObstructionFlags, ObstructionIndex};
