// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

#![cfg(feature = "compare_rstar")]

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};

use canopy_rtree::{AabbN, EuclidDomain, RTree};

use rstar::primitives::Rectangle;
use rstar::{AABB, RTree as RStarTree};

type Tree = RTree<AabbN<f64, 3>, EuclidDomain<f64, 3>>;

fn gen_grid_boxes(n: usize, cell: f64) -> Vec<AabbN<f64, 3>> {
    let mut out = Vec::with_capacity(n * n * n);
    for z in 0..n {
        for y in 0..n {
            for x in 0..n {
                let min = [x as f64 * cell, y as f64 * cell, z as f64 * cell];
                out.push(AabbN::new(min, [min[0] + cell, min[1] + cell, min[2] + cell]));
            }
        }
    }
    out
}

fn to_rstar_rects(v: &[AabbN<f64, 3>]) -> Vec<Rectangle<[f64; 3]>> {
    v.iter()
        .map(|r| Rectangle::from_corners(r.min, r.max))
        .collect()
}

fn bench_rtree_external_compare(c: &mut Criterion) {
    let mut group = c.benchmark_group("rtree_external_compare");
    for &n in &[8usize, 16] {
        let boxes = gen_grid_boxes(n, 10.0);
        let window = AabbN::new([20.0, 20.0, 20.0], [60.0, 60.0, 60.0]);
        group.throughput(Throughput::Elements((n * n * n) as u64));

        group.bench_function(format!("canopy_build_query_n{}", n), |b| {
            b.iter_batched(
                Tree::default,
                |mut tree| {
                    for r in boxes.iter().copied() {
                        tree.insert(r).unwrap();
                    }
                    let mut hits = 0;
                    tree.visit(
                        |rect, _| rect.intersects(&window),
                        |item| {
                            if item.intersects(&window) {
                                hits += 1;
                            }
                            true
                        },
                    );
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });

        group.bench_function(format!("rstar_build_query_bulk_n{}", n), |b| {
            b.iter_batched(
                || to_rstar_rects(&boxes),
                |rectangles| {
                    let tree = RStarTree::bulk_load(rectangles);
                    let aabb = AABB::from_corners(window.min, window.max);
                    let hits: usize = tree.locate_in_envelope_intersecting(&aabb).count();
                    black_box(hits);
                },
                BatchSize::SmallInput,
            )
        });
    }
    group.finish();
}

criterion_group!(benches, bench_rtree_external_compare);
criterion_main!(benches);
