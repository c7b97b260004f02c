// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Nav-mesh face lookup: which walkable face is under a point or a ray.

use core::cell::Cell;

use glam::Vec3;

use canopy_rtree::DepthExceeded;

use crate::domain::WorldTree;
use crate::geom::{Ray3, point_triangle_dist_sq, ray_triangle};
use crate::mesh::{IndexedFace, TriMesh};

/// Per-face spatial lookup over a navigation mesh.
pub struct FaceLocator {
    mesh: TriMesh,
    tree: WorldTree<IndexedFace>,
}

impl core::fmt::Debug for FaceLocator {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("FaceLocator")
            .field("faces", &self.tree.len())
            .finish_non_exhaustive()
    }
}

impl FaceLocator {
    /// Index every face of the mesh.
    pub fn build(mesh: TriMesh) -> Result<Self, DepthExceeded> {
        let mut tree = WorldTree::default();
        for (i, _) in mesh.triangles().iter().enumerate() {
            tree.insert(IndexedFace {
                aabb: mesh.face_aabb(i),
                face: i as u32,
            })?;
        }
        log::debug!("nav-mesh locator indexed {} faces", tree.len());
        Ok(Self { mesh, tree })
    }

    /// The indexed mesh.
    pub fn mesh(&self) -> &TriMesh {
        &self.mesh
    }

    /// The nearest face crossed by the ray, with the hit parameter.
    pub fn intersect_ray(&self, ray: &Ray3) -> Option<(u32, f32)> {
        let best: Cell<Option<(u32, f32)>> = Cell::new(None);
        self.tree.visit(
            |rect, _| {
                rect.ray_param(ray)
                    .is_some_and(|t| best.get().map(|(_, bt)| t < bt).unwrap_or(true))
            },
            |face| {
                let [a, b, c] = self.mesh.triangle_points(face.face as usize);
                if let Some(t) = ray_triangle(ray, a, b, c) {
                    if best.get().map(|(_, bt)| t < bt).unwrap_or(true) {
                        best.set(Some((face.face, t)));
                    }
                }
                true
            },
        );
        best.into_inner()
    }

    /// The face closest to `pos` within `max_dist`, with its squared
    /// distance, or `None` when every face is farther away.
    pub fn closest_point(&self, pos: Vec3, max_dist: f32) -> Option<(u32, f32)> {
        let limit = max_dist * max_dist;
        let best: Cell<Option<(u32, f32)>> = Cell::new(None);
        self.tree.visit(
            |rect, _| {
                let d = rect.dist_sq(pos);
                d <= limit && best.get().map(|(_, bd)| d < bd).unwrap_or(true)
            },
            |face| {
                let [a, b, c] = self.mesh.triangle_points(face.face as usize);
                let d = point_triangle_dist_sq(pos, a, b, c);
                if d <= limit && best.get().map(|(_, bd)| d < bd).unwrap_or(true) {
                    best.set(Some((face.face, d)));
                }
                true
            },
        );
        best.into_inner()
    }

    /// The face directly under (or slightly above) `pos`.
    ///
    /// Probes straight down from `tolerance` above the query point and
    /// accepts hits up to `tolerance` below it.
    pub fn face_at(&self, pos: Vec3, tolerance: f32) -> Option<u32> {
        let ray = Ray3::new(pos + Vec3::Y * tolerance, -Vec3::Y);
        self.intersect_ray(&ray)
            .filter(|&(_, t)| t <= 2.0 * tolerance)
            .map(|(face, _)| face)
    }
}
