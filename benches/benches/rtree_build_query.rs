// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

use criterion::{BatchSize, Criterion, Throughput, black_box, criterion_group, criterion_main};

use canopy_rtree::{AabbN, EuclidDomain, Params, RTree};

type D3 = EuclidDomain<f32, 3>;
type Tree = RTree<AabbN<f32, 3>, D3>;

fn gen_grid_boxes(n: usize, cell: f32) -> Vec<AabbN<f32, 3>> {
    let mut out = Vec::with_capacity(n * n * n);
    for z in 0..n {
        for y in 0..n {
            for x in 0..n {
                let min = [x as f32 * cell, y as f32 * cell, z as f32 * cell];
                out.push(AabbN::new(min, [min[0] + cell, min[1] + cell, min[2] + cell]));
            }
        }
    }
    out
}

#[derive(Clone)]
struct Rng(u64);

impl Rng {
    fn new(seed: u64) -> Self {
        Self(seed)
    }
    fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x << 13;
        x ^= x >> 7;
        x ^= x << 17;
        self.0 = x;
        x
    }
    fn next_f32(&mut self, max: f32) -> f32 {
        let v = self.next_u64() >> 11;
        ((v as f64) / ((1_u64 << 53) as f64)) as f32 * max
    }
}

fn gen_random_boxes(count: usize, extent: f32, size: f32) -> Vec<AabbN<f32, 3>> {
    let mut out = Vec::with_capacity(count);
    let mut rng = Rng::new(0xCAFE_F00D_DEAD_BEEF);
    for _ in 0..count {
        let min = [
            rng.next_f32(extent - size),
            rng.next_f32(extent - size),
            rng.next_f32(extent - size),
        ];
        out.push(AabbN::new(min, [min[0] + size, min[1] + size, min[2] + size]));
    }
    out
}

fn count_hits(tree: &Tree, window: &AabbN<f32, 3>) -> usize {
    let mut hits = 0;
    tree.visit(
        |rect, _| rect.intersects(window),
        |item| {
            if item.intersects(window) {
                hits += 1;
            }
            true
        },
    );
    hits
}

fn bench_build(c: &mut Criterion) {
    let mut group = c.benchmark_group("build");
    for &n in &[8usize, 16] {
        let boxes = gen_grid_boxes(n, 10.0);
        group.throughput(Throughput::Elements((n * n * n) as u64));
        group.bench_function(format!("grid_n{}", n), |b| {
            b.iter_batched(
                Tree::default,
                |mut tree| {
                    for r in boxes.iter().copied() {
                        tree.insert(r).unwrap();
                    }
                    black_box(tree.depth());
                },
                BatchSize::SmallInput,
            )
        });
    }
    let boxes = gen_random_boxes(4096, 1000.0, 8.0);
    group.throughput(Throughput::Elements(4096));
    group.bench_function("random_4096", |b| {
        b.iter_batched(
            Tree::default,
            |mut tree| {
                for r in boxes.iter().copied() {
                    tree.insert(r).unwrap();
                }
                black_box(tree.depth());
            },
            BatchSize::SmallInput,
        )
    });
    group.bench_function("random_4096_cap16", |b| {
        b.iter_batched(
            || Tree::with_params(EuclidDomain::new(), Params::with_capacity(16)),
            |mut tree| {
                for r in boxes.iter().copied() {
                    tree.insert(r).unwrap();
                }
                black_box(tree.depth());
            },
            BatchSize::SmallInput,
        )
    });
    group.finish();
}

fn bench_query(c: &mut Criterion) {
    let mut group = c.benchmark_group("query");
    let boxes = gen_random_boxes(8192, 1000.0, 8.0);
    let mut tree = Tree::default();
    for r in boxes.iter().copied() {
        tree.insert(r).unwrap();
    }
    let windows: Vec<AabbN<f32, 3>> = {
        let mut rng = Rng::new(0xBADC_F00D_1234_5678);
        (0..64)
            .map(|_| {
                let min = [
                    rng.next_f32(900.0),
                    rng.next_f32(900.0),
                    rng.next_f32(900.0),
                ];
                AabbN::new(min, [min[0] + 100.0, min[1] + 100.0, min[2] + 100.0])
            })
            .collect()
    };

    group.bench_function("window_tree", |b| {
        b.iter(|| {
            let mut total = 0;
            for w in &windows {
                total += count_hits(&tree, w);
            }
            black_box(total);
        })
    });
    group.bench_function("window_brute_force", |b| {
        b.iter(|| {
            let mut total = 0;
            for w in &windows {
                total += boxes.iter().filter(|r| r.intersects(w)).count();
            }
            black_box(total);
        })
    });
    group.finish();
}

criterion_group!(benches, bench_build, bench_query);
criterion_main!(benches);
