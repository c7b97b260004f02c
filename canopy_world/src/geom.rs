// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! World-space geometry primitives: boxes, segments, rays, triangles.
//!
//! Distances are reported squared throughout, which keeps the hot pruning
//! paths free of square roots; callers take the root at the edge if they
//! need metric distances.

use glam::Vec3;

/// Axis-aligned bounding box in world space.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Aabb3 {
    /// Minimum corner.
    pub min: Vec3,
    /// Maximum corner.
    pub max: Vec3,
}

impl Aabb3 {
    /// Create an AABB from min/max corners.
    pub fn new(min: Vec3, max: Vec3) -> Self {
        debug_assert!(min.cmple(max).all(), "inverted AABB corners");
        Self { min, max }
    }

    /// The degenerate (zero-extent) AABB of a single point.
    pub const fn point(p: Vec3) -> Self {
        Self { min: p, max: p }
    }

    /// The smallest AABB covering all points, or `None` for an empty set.
    pub fn from_points<I: IntoIterator<Item = Vec3>>(points: I) -> Option<Self> {
        let mut it = points.into_iter();
        let first = it.next()?;
        let mut aabb = Self {
            min: first,
            max: first,
        };
        for p in it {
            aabb.min = aabb.min.min(p);
            aabb.max = aabb.max.max(p);
        }
        Some(aabb)
    }

    /// Smallest AABB containing both.
    pub fn union(&self, other: &Self) -> Self {
        Self {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    /// Intersection with a nonempty interior; boundary contact yields `None`.
    pub fn intersection(&self, other: &Self) -> Option<Self> {
        let min = self.min.max(other.min);
        let max = self.max.min(other.max);
        if min.cmplt(max).all() {
            Some(Self { min, max })
        } else {
            None
        }
    }

    /// Whether the boxes overlap, boundary contact included.
    pub fn intersects(&self, other: &Self) -> bool {
        self.min.cmple(other.max).all() && other.min.cmple(self.max).all()
    }

    /// Whether the box contains the point, boundary included.
    pub fn contains(&self, p: Vec3) -> bool {
        self.min.cmple(p).all() && p.cmple(self.max).all()
    }

    /// Box center.
    pub fn center(&self) -> Vec3 {
        0.5 * (self.min + self.max)
    }

    /// The point inside the box closest to `p`.
    pub fn closest_point(&self, p: Vec3) -> Vec3 {
        p.clamp(self.min, self.max)
    }

    /// Squared distance from the box to `p` (zero inside).
    pub fn dist_sq(&self, p: Vec3) -> f32 {
        self.closest_point(p).distance_squared(p)
    }

    /// The box grown by `r` on every side.
    pub fn grown(&self, r: f32) -> Self {
        Self {
            min: self.min - Vec3::splat(r),
            max: self.max + Vec3::splat(r),
        }
    }

    /// Entry parameter of the ray into the box (slab test).
    ///
    /// Returns the smallest `t >= 0` with `ray.at(t)` on the box, 0 when the
    /// origin is already inside, `None` when the ray misses.
    pub fn ray_param(&self, ray: &Ray3) -> Option<f32> {
        let mut t_min = 0.0_f32;
        let mut t_max = f32::INFINITY;
        for axis in 0..3 {
            let o = ray.origin[axis];
            let d = ray.dir[axis];
            if d == 0.0 {
                if o < self.min[axis] || o > self.max[axis] {
                    return None;
                }
            } else {
                let inv = 1.0 / d;
                let t0 = (self.min[axis] - o) * inv;
                let t1 = (self.max[axis] - o) * inv;
                let (t0, t1) = if t0 <= t1 { (t0, t1) } else { (t1, t0) };
                t_min = t_min.max(t0);
                t_max = t_max.min(t1);
                if t_min > t_max {
                    return None;
                }
            }
        }
        Some(t_min)
    }

    /// Whether the segment touches the box.
    pub fn intersects_segment(&self, seg: &Segment3) -> bool {
        let ray = Ray3 {
            origin: seg.a,
            dir: seg.delta(),
        };
        self.ray_param(&ray).is_some_and(|t| t <= 1.0)
    }
}

/// A line segment between two points.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Segment3 {
    /// Start point.
    pub a: Vec3,
    /// End point.
    pub b: Vec3,
}

impl Segment3 {
    /// Create a segment.
    pub const fn new(a: Vec3, b: Vec3) -> Self {
        Self { a, b }
    }

    /// The vector from start to end.
    pub fn delta(&self) -> Vec3 {
        self.b - self.a
    }

    /// The bounding box of the segment.
    pub fn aabb(&self) -> Aabb3 {
        Aabb3 {
            min: self.a.min(self.b),
            max: self.a.max(self.b),
        }
    }
}

/// A ray with origin and direction.
///
/// The direction need not be normalized; ray parameters are in units of its
/// length.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Ray3 {
    /// Ray origin.
    pub origin: Vec3,
    /// Ray direction; must be finite and nonzero.
    pub dir: Vec3,
}

impl Ray3 {
    /// Create a ray.
    pub const fn new(origin: Vec3, dir: Vec3) -> Self {
        Self { origin, dir }
    }

    /// The point at parameter `t`.
    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.dir * t
    }
}

/// Ray-triangle intersection (Möller-Trumbore), both winding orders.
///
/// Returns the ray parameter of the hit, or `None` for misses and
/// near-parallel rays.
pub fn ray_triangle(ray: &Ray3, a: Vec3, b: Vec3, c: Vec3) -> Option<f32> {
    const EPS: f32 = 1e-7;
    let ab = b - a;
    let ac = c - a;
    let p = ray.dir.cross(ac);
    let det = ab.dot(p);
    if det.abs() < EPS {
        return None;
    }
    let inv = 1.0 / det;
    let s = ray.origin - a;
    let u = s.dot(p) * inv;
    if !(0.0..=1.0).contains(&u) {
        return None;
    }
    let q = s.cross(ab);
    let v = ray.dir.dot(q) * inv;
    if v < 0.0 || u + v > 1.0 {
        return None;
    }
    let t = ac.dot(q) * inv;
    (t >= 0.0).then_some(t)
}

/// Whether the segment crosses the triangle.
pub fn segment_triangle(seg: &Segment3, a: Vec3, b: Vec3, c: Vec3) -> bool {
    let ray = Ray3 {
        origin: seg.a,
        dir: seg.delta(),
    };
    ray_triangle(&ray, a, b, c).is_some_and(|t| t <= 1.0)
}

/// The point on the triangle closest to `p`.
pub fn closest_point_on_triangle(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    let ab = b - a;
    let ac = c - a;
    let ap = p - a;

    let d1 = ab.dot(ap);
    let d2 = ac.dot(ap);
    if d1 <= 0.0 && d2 <= 0.0 {
        return a;
    }

    let bp = p - b;
    let d3 = ab.dot(bp);
    let d4 = ac.dot(bp);
    if d3 >= 0.0 && d4 <= d3 {
        return b;
    }

    let vc = d1 * d4 - d3 * d2;
    if vc <= 0.0 && d1 >= 0.0 && d3 <= 0.0 {
        let v = d1 / (d1 - d3);
        return a + ab * v;
    }

    let cp = p - c;
    let d5 = ab.dot(cp);
    let d6 = ac.dot(cp);
    if d6 >= 0.0 && d5 <= d6 {
        return c;
    }

    let vb = d5 * d2 - d1 * d6;
    if vb <= 0.0 && d2 >= 0.0 && d6 <= 0.0 {
        let w = d2 / (d2 - d6);
        return a + ac * w;
    }

    let va = d3 * d6 - d5 * d4;
    if va <= 0.0 && (d4 - d3) >= 0.0 && (d5 - d6) >= 0.0 {
        let w = (d4 - d3) / ((d4 - d3) + (d5 - d6));
        return b + (c - b) * w;
    }

    let denom = 1.0 / (va + vb + vc);
    let v = vb * denom;
    let w = vc * denom;
    a + ab * v + ac * w
}

/// Squared distance from `p` to the triangle.
pub fn point_triangle_dist_sq(p: Vec3, a: Vec3, b: Vec3, c: Vec3) -> f32 {
    closest_point_on_triangle(p, a, b, c).distance_squared(p)
}
