// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Basic usage of Canopy R*-Tree: insert, range query, first-match query.

use canopy_rtree::{AabbN, EuclidDomain, RTree};

fn main() {
    let mut tree: RTree<AabbN<i64, 2>, EuclidDomain<i64, 2>> = RTree::default();
    for i in 0..50 {
        let x = (i % 10) * 20;
        let y = (i / 10) * 20;
        tree.insert(AabbN::new([x, y], [x + 10, y + 10])).unwrap();
    }

    // Range query
    let window = AabbN::new([0, 0], [45, 45]);
    let mut hits = Vec::new();
    tree.visit(
        |rect, _level| rect.intersects(&window),
        |item| {
            if item.intersects(&window) {
                hits.push(*item);
            }
            true
        },
    );
    println!("boxes overlapping {window:?}: {}", hits.len());

    // First-match query: stop the whole traversal on the first hit.
    let probe = [65_i64, 25];
    let mut first = None;
    tree.visit(
        |rect, _| rect.contains(&probe),
        |item| {
            if item.contains(&probe) {
                first = Some(*item);
                return false;
            }
            true
        },
    );
    println!("box under {probe:?}: {first:?}");
}
