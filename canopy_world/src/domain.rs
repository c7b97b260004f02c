// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! The glam-native 3D tree domain and the bounded world primitives.

use core::cmp::Ordering;

use canopy_rtree::{Bounded, Domain, RTree};
use glam::Vec3;

use crate::geom::{Aabb3, Segment3};

/// Rectangle algebra for world space: 3 axes, `f32` coordinates, widened
/// `f64` metrics.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct WorldDomain;

/// A spatial tree over world-space items.
pub type WorldTree<T> = RTree<T, WorldDomain>;

impl Domain for WorldDomain {
    type Scalar = f32;
    type Point = Vec3;
    type Rect = Aabb3;
    const DIM: usize = 3;

    fn union(&self, a: &Aabb3, b: &Aabb3) -> Aabb3 {
        a.union(b)
    }

    fn intersect(&self, a: &Aabb3, b: &Aabb3) -> Option<Aabb3> {
        a.intersection(b)
    }

    fn area(&self, r: &Aabb3) -> f64 {
        let e = r.max - r.min;
        e.x as f64 * e.y as f64 * e.z as f64
    }

    fn margin(&self, r: &Aabb3) -> f64 {
        let e = r.max - r.min;
        e.x as f64 + e.y as f64 + e.z as f64
    }

    fn axis_cmp(&self, axis: usize, a: &Aabb3, b: &Aabb3) -> Ordering {
        a.min[axis]
            .partial_cmp(&b.min[axis])
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                a.max[axis]
                    .partial_cmp(&b.max[axis])
                    .unwrap_or(Ordering::Equal)
            })
    }

    fn center(&self, r: &Aabb3) -> Vec3 {
        r.center()
    }

    fn dist_sq(&self, a: &Vec3, b: &Vec3) -> f64 {
        let d = *a - *b;
        d.x as f64 * d.x as f64 + d.y as f64 * d.y as f64 + d.z as f64 * d.z as f64
    }
}

impl Bounded<WorldDomain> for Aabb3 {
    fn rect(&self, _domain: &WorldDomain) -> Aabb3 {
        *self
    }
}

impl Bounded<WorldDomain> for Vec3 {
    fn rect(&self, _domain: &WorldDomain) -> Aabb3 {
        Aabb3::point(*self)
    }
}

impl Bounded<WorldDomain> for Segment3 {
    fn rect(&self, _domain: &WorldDomain) -> Aabb3 {
        self.aabb()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alloc::vec::Vec;
    use glam::vec3;

    #[test]
    fn axis_order_is_min_then_max() {
        let d = WorldDomain;
        let a = Aabb3::new(vec3(0.0, 0.0, 0.0), vec3(1.0, 1.0, 1.0));
        let b = Aabb3::new(vec3(0.0, 0.0, 0.0), vec3(1.0, 2.0, 1.0));
        assert_eq!(d.axis_cmp(0, &a, &b), Ordering::Equal);
        assert_eq!(d.axis_cmp(1, &a, &b), Ordering::Less);
        assert_eq!(d.axis_cmp(2, &b, &a), Ordering::Equal);
    }

    #[test]
    fn metrics_widen_to_f64() {
        let d = WorldDomain;
        let r = Aabb3::new(Vec3::ZERO, vec3(2.0, 3.0, 4.0));
        assert_eq!(d.area(&r), 24.0);
        assert_eq!(d.margin(&r), 9.0);
        assert_eq!(d.dist_sq(&Vec3::ZERO, &vec3(3.0, 4.0, 0.0)), 25.0);
    }

    #[test]
    fn mixed_primitives_round_trip() {
        // Points, segments, and boxes all feed the same tree shape.
        let mut points: WorldTree<Vec3> = WorldTree::default();
        let mut segments: WorldTree<Segment3> = WorldTree::default();
        for i in 0..100 {
            let x = i as f32;
            points.insert(vec3(x, 0.0, 0.0)).unwrap();
            segments
                .insert(Segment3::new(vec3(x, 0.0, 0.0), vec3(x + 1.0, 1.0, 0.0)))
                .unwrap();
        }
        let window = Aabb3::new(vec3(10.0, -1.0, -1.0), vec3(20.0, 2.0, 1.0));
        let mut seen: Vec<f32> = Vec::new();
        points.visit(
            |rect, _| rect.intersects(&window),
            |p| {
                if window.contains(*p) {
                    seen.push(p.x);
                }
                true
            },
        );
        assert_eq!(seen.len(), 11);

        let mut crossing = 0;
        segments.visit(
            |rect, _| rect.intersects(&window),
            |s| {
                if window.intersects_segment(s) {
                    crossing += 1;
                }
                true
            },
        );
        // Segments starting at x in 9..=20 touch the window.
        assert_eq!(crossing, 12);
    }
}
