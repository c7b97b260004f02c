// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Indexed triangle meshes and per-face helpers.

use alloc::collections::BTreeSet;
use alloc::vec::Vec;

use glam::Vec3;

use crate::domain::WorldDomain;
use crate::geom::Aabb3;
use canopy_rtree::Bounded;

/// Error building a [`TriMesh`].
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum MeshError {
    /// A triangle references a vertex past the end of the position list.
    IndexOutOfBounds {
        /// Offending triangle.
        triangle: usize,
        /// The out-of-range vertex index.
        index: u32,
    },
}

impl core::fmt::Display for MeshError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::IndexOutOfBounds { triangle, index } => {
                write!(f, "triangle {triangle} references missing vertex {index}")
            }
        }
    }
}

impl core::error::Error for MeshError {}

/// An indexed triangle mesh.
#[derive(Clone, Debug, Default)]
pub struct TriMesh {
    positions: Vec<Vec3>,
    triangles: Vec<[u32; 3]>,
}

impl TriMesh {
    /// Build a mesh, validating that every triangle index is in range.
    pub fn new(positions: Vec<Vec3>, triangles: Vec<[u32; 3]>) -> Result<Self, MeshError> {
        let limit = positions.len() as u64;
        for (t, tri) in triangles.iter().enumerate() {
            for &index in tri {
                if u64::from(index) >= limit {
                    return Err(MeshError::IndexOutOfBounds { triangle: t, index });
                }
            }
        }
        Ok(Self {
            positions,
            triangles,
        })
    }

    /// Vertex positions.
    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    /// Triangle index triples.
    pub fn triangles(&self) -> &[[u32; 3]] {
        &self.triangles
    }

    /// The corner positions of one triangle.
    pub fn triangle_points(&self, triangle: usize) -> [Vec3; 3] {
        let [a, b, c] = self.triangles[triangle];
        [
            self.positions[a as usize],
            self.positions[b as usize],
            self.positions[c as usize],
        ]
    }

    /// The bounding box of one triangle.
    pub fn face_aabb(&self, triangle: usize) -> Aabb3 {
        let [a, b, c] = self.triangle_points(triangle);
        Aabb3 {
            min: a.min(b).min(c),
            max: a.max(b).max(c),
        }
    }

    /// The (unnormalized) face normal of one triangle.
    pub fn face_normal(&self, triangle: usize) -> Vec3 {
        let [a, b, c] = self.triangle_points(triangle);
        (b - a).cross(c - a)
    }

    /// Unique undirected edges as vertex index pairs.
    pub fn edges(&self) -> Vec<(u32, u32)> {
        let mut set: BTreeSet<(u32, u32)> = BTreeSet::new();
        for tri in &self.triangles {
            for (a, b) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                set.insert(if a < b { (a, b) } else { (b, a) });
            }
        }
        set.into_iter().collect()
    }
}

/// A face reference with a precomputed bounding box, the payload stored in
/// per-face trees.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct IndexedFace {
    /// Bounding box of the face.
    pub aabb: Aabb3,
    /// Triangle index into the owning mesh.
    pub face: u32,
}

impl Bounded<WorldDomain> for IndexedFace {
    fn rect(&self, _domain: &WorldDomain) -> Aabb3 {
        self.aabb
    }
}

#[cfg(test)]
pub(crate) mod test_meshes {
    use super::*;
    use alloc::vec;
    use glam::vec3;

    /// Two triangles forming the unit square wall at z = 0.
    pub(crate) fn wall() -> TriMesh {
        TriMesh::new(
            vec![
                vec3(0.0, 0.0, 0.0),
                vec3(2.0, 0.0, 0.0),
                vec3(2.0, 2.0, 0.0),
                vec3(0.0, 2.0, 0.0),
            ],
            vec![[0, 1, 2], [0, 2, 3]],
        )
        .unwrap()
    }

    /// An `n` by `n` grid of quads in the y = 0 plane, two triangles each.
    pub(crate) fn floor(n: u32) -> TriMesh {
        let side = n + 1;
        let mut positions = Vec::new();
        for z in 0..side {
            for x in 0..side {
                positions.push(vec3(x as f32, 0.0, z as f32));
            }
        }
        let mut triangles = Vec::new();
        for z in 0..n {
            for x in 0..n {
                let i = z * side + x;
                triangles.push([i, i + 1, i + side]);
                triangles.push([i + 1, i + side + 1, i + side]);
            }
        }
        TriMesh::new(positions, triangles).unwrap()
    }
}
