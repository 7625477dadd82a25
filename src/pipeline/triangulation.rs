// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Decides per lump whether faces need triangulating and accumulates the output mesh

use crate::error::KernelError;
use crate::geometry::{Mesh, Polyhedron, PolyhedronCheck, Triangle};
use crate::kernel::Triangulator;

/// Statistics for one admitted lump
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LumpStats {
    pub vertices: usize,
    pub faces: usize,
    pub triangles: usize,
    pub triangulated: bool,
    /// Edge and face diagnostics of the lump as it left the kernel
    pub check: PolyhedronCheck,
}

/// Feeds lumps into a single triangle mesh, calling the triangulator only when needed
pub struct TriangulationGate<T> {
    triangulator: T,
    mesh: Mesh,
}

impl<T: Triangulator> TriangulationGate<T> {
    pub fn new(triangulator: T) -> Self {
        Self {
            triangulator,
            mesh: Mesh::new(),
        }
    }

    /// Whether any face has more than 3 vertices
    pub fn needs_triangulation(polyhedron: &Polyhedron) -> bool {
        polyhedron.faces.iter().any(|f| f.len() > 3)
    }

    /// Append an all-triangle polyhedron unchanged, returning its triangle count
    pub fn pass_through(&mut self, polyhedron: &Polyhedron) -> usize {
        let offset = self.mesh.append_vertices(polyhedron);
        for face in polyhedron.faces.iter().filter(|f| f.len() == 3) {
            self.mesh
                .add_triangle(Triangle::new([face[0] + offset, face[1] + offset, face[2] + offset]));
        }
        polyhedron.faces.iter().filter(|f| f.len() == 3).count()
    }

    pub fn triangulate(&mut self, polyhedron: &Polyhedron) -> Result<usize, KernelError> {
        self.triangulator.triangulate(polyhedron, &mut self.mesh)
    }

    /// Route a lump through `pass_through` or `triangulate`
    pub fn admit(&mut self, polyhedron: &Polyhedron) -> Result<LumpStats, KernelError> {
        let triangulated = Self::needs_triangulation(polyhedron);
        let triangles = if triangulated {
            self.triangulate(polyhedron)?
        } else {
            self.pass_through(polyhedron)
        };
        let stats = LumpStats {
            vertices: polyhedron.v_size(),
            faces: polyhedron.f_size(),
            triangles,
            triangulated,
            check: polyhedron.check(),
        };
        if !stats.check.is_closed() {
            tracing::debug!(
                "lump is not closed: {} open edges, {} non-manifold edges",
                stats.check.open_edges,
                stats.check.non_manifold_edges
            );
        }
        tracing::debug!(
            "lump: {} vertices, {} faces, {} triangles{}",
            stats.vertices,
            stats.faces,
            stats.triangles,
            if triangulated { " (triangulated)" } else { "" }
        );
        Ok(stats)
    }

    pub fn mesh(&self) -> &Mesh {
        &self.mesh
    }

    pub fn into_mesh(self) -> Mesh {
        self.mesh
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use crate::kernel::EarClipTriangulator;
    use nalgebra::{Point3, Vector3};

    #[derive(Default)]
    struct CountingTriangulator {
        calls: usize,
    }

    impl Triangulator for CountingTriangulator {
        fn triangulate(&mut self, polyhedron: &Polyhedron, mesh: &mut Mesh) -> Result<usize, KernelError> {
            self.calls += 1;
            EarClipTriangulator::new().triangulate(polyhedron, mesh)
        }
    }

    fn tetra() -> Polyhedron {
        Polyhedron::new(
            vec![
                Point3::new(0.0, 0.0, 0.0),
                Point3::new(1.0, 0.0, 0.0),
                Point3::new(0.0, 1.0, 0.0),
                Point3::new(0.0, 0.0, 1.0),
            ],
            vec![vec![0, 2, 1], vec![0, 1, 3], vec![1, 2, 3], vec![0, 3, 2]],
        )
    }

    #[test]
    fn test_triangles_pass_through() {
        let mut counter = CountingTriangulator::default();
        let mut gate = TriangulationGate::new(&mut counter);
        let stats = gate.admit(&tetra()).unwrap();
        assert!(!stats.triangulated);
        assert_eq!(stats.triangles, 4);
        assert_eq!(gate.mesh().triangle_count(), 4);
        drop(gate);
        assert_eq!(counter.calls, 0);
    }

    #[test]
    fn test_quads_are_triangulated() {
        let cube = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_polyhedron(0.01);
        let mut counter = CountingTriangulator::default();
        let mut gate = TriangulationGate::new(&mut counter);
        let stats = gate.admit(&cube).unwrap();
        assert!(stats.triangulated);
        assert_eq!(stats.triangles, 12);
        drop(gate);
        assert_eq!(counter.calls, 1);
    }

    #[test]
    fn test_lumps_accumulate_into_one_mesh() {
        let mut gate = TriangulationGate::new(EarClipTriangulator::new());
        gate.admit(&tetra()).unwrap();
        gate.admit(&tetra()).unwrap();
        let mesh = gate.into_mesh();
        assert_eq!(mesh.vertex_count(), 8);
        assert_eq!(mesh.triangle_count(), 8);
        assert_eq!(mesh.triangles[4].indices, [4, 6, 5]);
    }

    #[test]
    fn test_stats_carry_closure_check() {
        let mut gate = TriangulationGate::new(EarClipTriangulator::new());
        let cube = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_polyhedron(0.01);
        let closed = gate.admit(&cube).unwrap();
        assert!(closed.check.is_closed());
        assert_eq!(closed.check.non_triangular, 6);

        let mut open = tetra();
        open.faces.pop();
        let stats = gate.admit(&open).unwrap();
        assert!(!stats.check.is_closed());
        assert_eq!(stats.check.open_edges, 3);
        assert_eq!(stats.triangles, 3);
    }
}
