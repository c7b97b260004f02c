// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

// After you edit the crate's doc comment, run this command, then check README.md for any missing links
// cargo rdme --workspace-project=canopy_rtree --heading-base-level=0

//! Canopy R*-Tree: a generic bounding-rectangle tree.
//!
//! Canopy R*-Tree is a reusable spatial index for anything reducible to an
//! axis-aligned bounding rectangle.
//!
//! - Insert items by value; their rectangle is derived through the
//!   [`Bounded`] trait (points, segments, boxes, or arbitrary payloads).
//! - Query through one pruned visitor traversal: a node-level check
//!   predicate and a leaf-level item predicate with whole-traversal early
//!   exit. Range, nearest-neighbor, and ray queries are all expressed this
//!   way.
//! - Rebalancing uses forced reinsertion before splitting, which keeps
//!   spatial clustering tight over long insertion sequences.
//!
//! The tree is generic over a [`Domain`]: a stateless rectangle algebra for
//! one (dimension, scalar) pairing. [`EuclidDomain`] is the array-backed
//! reference domain for any dimension and any [`Scalar`] (`f32`, `f64`,
//! `i64`); geometry-crate-native domains implement the same trait.
//!
//! # Example
//!
//! ```rust
//! use canopy_rtree::{AabbN, EuclidDomain, RTree};
//!
//! let mut tree: RTree<AabbN<f32, 2>, EuclidDomain<f32, 2>> = RTree::default();
//! for i in 0..100 {
//!     let x = (i % 10) as f32 * 10.0;
//!     let y = (i / 10) as f32 * 10.0;
//!     tree.insert(AabbN::new([x, y], [x + 5.0, y + 5.0])).unwrap();
//! }
//!
//! // Range query: collect everything overlapping a window.
//! let window = AabbN::new([0.0, 0.0], [25.0, 25.0]);
//! let mut hits = 0;
//! tree.visit(
//!     |rect, _level| rect.intersects(&window),
//!     |item| {
//!         if item.intersects(&window) {
//!             hits += 1;
//!         }
//!         true
//!     },
//! );
//! assert_eq!(hits, 9);
//! ```
//!
//! First-match searches terminate the whole traversal by returning `false`
//! from the item callback:
//!
//! ```rust
//! use canopy_rtree::{AabbN, EuclidDomain, RTree};
//!
//! let mut tree: RTree<[f32; 2], EuclidDomain<f32, 2>> = RTree::default();
//! for i in 0..32 {
//!     tree.insert([i as f32, 0.0]).unwrap();
//! }
//! let probe = AabbN::new([10.5, -1.0], [12.5, 1.0]);
//! let mut first = None;
//! tree.visit(
//!     |rect, _| rect.intersects(&probe),
//!     |p| {
//!         if probe.contains(p) {
//!             first = Some(*p);
//!             return false;
//!         }
//!         true
//!     },
//! );
//! assert_eq!(first, Some([11.0, 0.0]));
//! ```
//!
//! Because the traversal is strictly sequential, the two callbacks may share
//! a running best-so-far through a [`core::cell::Cell`]; see
//! [`RTree::visit`].
//!
//! ## Parameters
//!
//! [`Params`] fixes node capacity, minimum fill, and the forced-reinsertion
//! count per tree, independently for leaf and inner levels. The defaults
//! (capacity 64, a third of it for minimum fill and reinsertion) work well
//! for mid-sized scenes; smaller capacities trade memory locality for
//! shallower fan-out.
//!
//! ## Semantics
//!
//! - There is no item removal; [`RTree::clear`] resets the whole tree.
//! - Insertion fails only on a root split past [`MAX_DEPTH`]; every other
//!   insert and every query is total.
//! - Float coordinates are assumed finite (no NaNs). Metric accumulation is
//!   widened (`f32`→`f64`, `i64`→`i128`) for robust comparisons.

#![no_std]

extern crate alloc;

pub mod domain;
pub mod euclid;
mod insert;
pub mod tree;

pub use domain::{Bounded, Domain, Measure, Scalar};
pub use euclid::{AabbN, EuclidDomain};
pub use tree::{DepthExceeded, MAX_DEPTH, Params, RTree};
