// Copyright 2025 the Canopy Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Collision broad-phase over a triangle mesh.
//!
//! A [`CollisionMesh`] keeps one tree per element kind (vertices, edges,
//! faces) so a query can prune against whichever granularity it needs. Narrow
//! phase checks run only on elements whose boxes survive the pruned descent.

use core::cell::Cell;

use glam::Vec3;

use canopy_rtree::DepthExceeded;

use crate::domain::WorldTree;
use crate::geom::{Aabb3, Ray3, Segment3, ray_triangle, segment_triangle};
use crate::mesh::{IndexedFace, TriMesh};

/// A triangle mesh with per-element spatial trees for collision queries.
pub struct CollisionMesh {
    mesh: TriMesh,
    vertices: WorldTree<Vec3>,
    edges: WorldTree<Segment3>,
    faces: WorldTree<IndexedFace>,
}

impl core::fmt::Debug for CollisionMesh {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("CollisionMesh")
            .field("vertices", &self.vertices.len())
            .field("edges", &self.edges.len())
            .field("faces", &self.faces.len())
            .finish_non_exhaustive()
    }
}

impl CollisionMesh {
    /// Index a mesh: one tree of vertices, one of unique edges, one of
    /// per-face bounding boxes.
    pub fn build(mesh: TriMesh) -> Result<Self, DepthExceeded> {
        let mut vertices = WorldTree::default();
        for &p in mesh.positions() {
            vertices.insert(p)?;
        }
        let mut edges = WorldTree::default();
        for (a, b) in mesh.edges() {
            edges.insert(Segment3::new(
                mesh.positions()[a as usize],
                mesh.positions()[b as usize],
            ))?;
        }
        let mut faces = WorldTree::default();
        for (i, _) in mesh.triangles().iter().enumerate() {
            faces.insert(IndexedFace {
                aabb: mesh.face_aabb(i),
                face: i as u32,
            })?;
        }
        log::debug!(
            "collision mesh indexed: {} vertices, {} edges, {} faces",
            vertices.len(),
            edges.len(),
            faces.len()
        );
        Ok(Self {
            mesh,
            vertices,
            edges,
            faces,
        })
    }

    /// The indexed mesh.
    pub fn mesh(&self) -> &TriMesh {
        &self.mesh
    }

    /// The first face crossed by the segment, with the hit parameter along
    /// it, or `None` when the segment is unobstructed.
    pub fn segment_hit(&self, seg: &Segment3) -> Option<(u32, f32)> {
        let ray = Ray3::new(seg.a, seg.delta());
        let best: Cell<Option<(u32, f32)>> = Cell::new(None);
        self.faces.visit(
            |rect, _| {
                rect.ray_param(&ray).is_some_and(|t| {
                    t <= 1.0 && best.get().map(|(_, bt)| t < bt).unwrap_or(true)
                })
            },
            |face| {
                let [a, b, c] = self.mesh.triangle_points(face.face as usize);
                if let Some(t) = ray_triangle(&ray, a, b, c) {
                    if t <= 1.0 && best.get().map(|(_, bt)| t < bt).unwrap_or(true) {
                        best.set(Some((face.face, t)));
                    }
                }
                true
            },
        );
        best.into_inner()
    }

    /// Whether the segment crosses any face.
    pub fn segment_blocked(&self, seg: &Segment3) -> bool {
        self.segment_hit(seg).is_some()
    }

    /// Whether any mesh element touches the box.
    ///
    /// Checks vertices inside the box, edges crossing it, and faces crossed
    /// by the box's main diagonals; thin faces that slice a box face without
    /// touching a diagonal can be missed.
    pub fn intersects_aabb(&self, aabb: &Aabb3) -> bool {
        let found = Cell::new(false);
        let prune = |rect: &Aabb3, _: usize| rect.intersects(aabb);

        self.vertices.visit(prune, |v| {
            if aabb.contains(*v) {
                found.set(true);
                return false;
            }
            true
        });
        if found.get() {
            return true;
        }

        self.edges.visit(prune, |seg| {
            if aabb.intersects_segment(seg) {
                found.set(true);
                return false;
            }
            true
        });
        if found.get() {
            return true;
        }

        let corners = [
            aabb.min,
            Vec3::new(aabb.max.x, aabb.min.y, aabb.min.z),
            Vec3::new(aabb.min.x, aabb.max.y, aabb.min.z),
            Vec3::new(aabb.min.x, aabb.min.y, aabb.max.z),
        ];
        let opposites = [
            aabb.max,
            Vec3::new(aabb.min.x, aabb.max.y, aabb.max.z),
            Vec3::new(aabb.max.x, aabb.min.y, aabb.max.z),
            Vec3::new(aabb.max.x, aabb.max.y, aabb.min.z),
        ];
        self.faces.visit(prune, |face| {
            let [a, b, c] = self.mesh.triangle_points(face.face as usize);
            for (lo, hi) in corners.iter().zip(&opposites) {
                let diagonal = Segment3::new(*lo, *hi);
                if segment_triangle(&diagonal, a, b, c) {
                    found.set(true);
                    return false;
                }
            }
            true
        });
        found.get()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mesh::test_meshes::wall;
    use glam::vec3;

    fn wall_mesh() -> CollisionMesh {
        CollisionMesh::build(wall()).unwrap()
    }

    #[test]
    fn segment_through_wall_reports_first_face() {
        let mesh = wall_mesh();
        let seg = Segment3::new(vec3(1.0, 0.5, 1.0), vec3(1.0, 0.5, -1.0));
        let (face, t) = mesh.segment_hit(&seg).unwrap();
        assert_eq!(t, 0.5);
        // (1.0, 0.5) lies strictly inside the lower triangle of the quad.
        assert_eq!(face, 0);
        assert!(mesh.segment_blocked(&seg));
    }

    #[test]
    fn segment_beside_wall_is_clear() {
        let mesh = wall_mesh();
        let beside = Segment3::new(vec3(3.0, 0.5, 1.0), vec3(3.0, 0.5, -1.0));
        assert_eq!(mesh.segment_hit(&beside), None);
        let short = Segment3::new(vec3(0.5, 0.5, 1.0), vec3(0.5, 0.5, 0.25));
        assert_eq!(mesh.segment_hit(&short), None);
    }

    #[test]
    fn box_overlap_checks_all_element_kinds() {
        let mesh = wall_mesh();
        // Box straddling the wall plane.
        assert!(mesh.intersects_aabb(&Aabb3::new(
            vec3(0.5, 0.5, -0.5),
            vec3(1.5, 1.5, 0.5)
        )));
        // Box containing a corner vertex only.
        assert!(mesh.intersects_aabb(&Aabb3::new(
            vec3(-0.1, -0.1, -0.1),
            vec3(0.1, 0.1, 0.1)
        )));
        // Box clear of the wall.
        assert!(!mesh.intersects_aabb(&Aabb3::new(
            vec3(0.5, 0.5, 0.5),
            vec3(1.5, 1.5, 1.5)
        )));
    }
}
