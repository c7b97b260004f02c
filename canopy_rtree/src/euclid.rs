// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Array-backed reference domain, generic over dimension and scalar.

use core::cmp::Ordering;
use core::marker::PhantomData;

use crate::domain::{Bounded, Domain, Measure, Scalar};

/// Axis-aligned bounding box over `[T; D]` corners.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct AabbN<T, const D: usize> {
    /// Minimum corner.
    pub min: [T; D],
    /// Maximum corner.
    pub max: [T; D],
}

impl<T: Scalar, const D: usize> AabbN<T, D> {
    /// Create an AABB from min/max corners.
    pub fn new(min: [T; D], max: [T; D]) -> Self {
        debug_assert!(
            min.iter().zip(&max).all(|(a, b)| a <= b),
            "inverted AABB corners"
        );
        Self { min, max }
    }

    /// The degenerate (zero-extent) AABB of a single point.
    pub const fn point(p: [T; D]) -> Self {
        Self { min: p, max: p }
    }

    /// Whether this AABB overlaps the other, boundary contact included.
    pub fn intersects(&self, other: &Self) -> bool {
        (0..D).all(|i| le(self.min[i], other.max[i]) && le(other.min[i], self.max[i]))
    }

    /// Whether this AABB contains the point, boundary included.
    pub fn contains(&self, p: &[T; D]) -> bool {
        (0..D).all(|i| le(self.min[i], p[i]) && le(p[i], self.max[i]))
    }
}

/// Rectangle algebra over `AabbN` for any [`Scalar`] and dimension.
///
/// This is the reference [`Domain`]; geometry-crate-native domains (e.g. a
/// glam-backed 3D world domain) follow the same contract.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub struct EuclidDomain<T, const D: usize> {
    _scalar: PhantomData<T>,
}

impl<T: Scalar, const D: usize> EuclidDomain<T, D> {
    /// Create the (stateless) domain value.
    pub const fn new() -> Self {
        Self {
            _scalar: PhantomData,
        }
    }
}

impl<T: Scalar, const D: usize> Domain for EuclidDomain<T, D> {
    type Scalar = T;
    type Point = [T; D];
    type Rect = AabbN<T, D>;
    const DIM: usize = D;

    fn union(&self, a: &Self::Rect, b: &Self::Rect) -> Self::Rect {
        AabbN {
            min: core::array::from_fn(|i| min_t(a.min[i], b.min[i])),
            max: core::array::from_fn(|i| max_t(a.max[i], b.max[i])),
        }
    }

    fn intersect(&self, a: &Self::Rect, b: &Self::Rect) -> Option<Self::Rect> {
        let min: [T; D] = core::array::from_fn(|i| max_t(a.min[i], b.min[i]));
        let max: [T; D] = core::array::from_fn(|i| min_t(a.max[i], b.max[i]));
        if (0..D).any(|i| !lt(min[i], max[i])) {
            return None;
        }
        Some(AabbN { min, max })
    }

    fn area(&self, r: &Self::Rect) -> Measure<Self> {
        let mut acc = T::widen(T::sub(r.max[0], r.min[0]));
        for i in 1..D {
            acc = acc * T::widen(T::sub(r.max[i], r.min[i]));
        }
        acc
    }

    fn margin(&self, r: &Self::Rect) -> Measure<Self> {
        let mut acc = T::acc_zero();
        for i in 0..D {
            acc = acc + T::widen(T::sub(r.max[i], r.min[i]));
        }
        acc
    }

    fn axis_cmp(&self, axis: usize, a: &Self::Rect, b: &Self::Rect) -> Ordering {
        a.min[axis]
            .partial_cmp(&b.min[axis])
            .unwrap_or(Ordering::Equal)
            .then_with(|| {
                a.max[axis]
                    .partial_cmp(&b.max[axis])
                    .unwrap_or(Ordering::Equal)
            })
    }

    fn center(&self, r: &Self::Rect) -> Self::Point {
        core::array::from_fn(|i| T::mid(r.min[i], r.max[i]))
    }

    fn dist_sq(&self, a: &Self::Point, b: &Self::Point) -> Measure<Self> {
        let mut acc = T::acc_zero();
        for i in 0..D {
            let d = T::widen(T::sub(a[i], b[i]));
            acc = acc + d * d;
        }
        acc
    }
}

impl<T: Scalar, const D: usize> Bounded<EuclidDomain<T, D>> for AabbN<T, D> {
    fn rect(&self, _domain: &EuclidDomain<T, D>) -> Self {
        *self
    }
}

impl<T: Scalar, const D: usize> Bounded<EuclidDomain<T, D>> for [T; D] {
    fn rect(&self, _domain: &EuclidDomain<T, D>) -> AabbN<T, D> {
        AabbN::point(*self)
    }
}

fn min_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Greater) => b,
        _ => a,
    }
}

fn max_t<T: PartialOrd + Copy>(a: T, b: T) -> T {
    match a.partial_cmp(&b) {
        Some(Ordering::Less) => b,
        _ => a,
    }
}

fn le<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o != Ordering::Greater)
        .unwrap_or(false)
}

fn lt<T: PartialOrd>(a: T, b: T) -> bool {
    a.partial_cmp(&b)
        .map(|o| o == Ordering::Less)
        .unwrap_or(false)
}
