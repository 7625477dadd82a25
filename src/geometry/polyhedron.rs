// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Indexed polygon-face polyhedron

use ahash::AHashMap;
use nalgebra::{Matrix4, Point3, Vector3};

/// Quantization step used when merging coincident vertices
pub const WELD_EPSILON: f64 = 1e-7;

/// Polyhedron with shared vertices and simple planar polygon faces.
///
/// Faces are counter-clockwise when seen from outside the solid.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyhedron {
    pub vertices: Vec<Point3<f64>>,
    pub faces: Vec<Vec<usize>>,
}

/// Edge representation for connectivity checking
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
struct Edge {
    v0: usize,
    v1: usize,
}

impl Edge {
    fn new(v0: usize, v1: usize) -> Self {
        if v0 < v1 {
            Self { v0, v1 }
        } else {
            Self { v0: v1, v1: v0 }
        }
    }
}

/// Diagnostics gathered by [`Polyhedron::check`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolyhedronCheck {
    /// Faces with more than 3 vertices
    pub non_triangular: usize,
    /// Faces with fewer than 3 distinct vertices
    pub degenerate: usize,
    /// Edges used by only one face
    pub open_edges: usize,
    /// Edges used by more than two faces
    pub non_manifold_edges: usize,
}

impl PolyhedronCheck {
    pub fn is_closed(&self) -> bool {
        self.open_edges == 0 && self.non_manifold_edges == 0
    }
}

impl Polyhedron {
    pub fn new(vertices: Vec<Point3<f64>>, faces: Vec<Vec<usize>>) -> Self {
        Self { vertices, faces }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn v_size(&self) -> usize {
        self.vertices.len()
    }

    pub fn f_size(&self) -> usize {
        self.faces.len()
    }

    pub fn is_empty(&self) -> bool {
        self.faces.is_empty()
    }

    pub fn add_vertex(&mut self, position: Point3<f64>) -> usize {
        self.vertices.push(position);
        self.vertices.len() - 1
    }

    pub fn add_face(&mut self, face: Vec<usize>) {
        self.faces.push(face);
    }

    /// Apply an affine transform; mirroring transforms flip face winding to keep faces outward
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for v in &mut self.vertices {
            *v = matrix.transform_point(v);
        }
        if matrix.fixed_view::<3, 3>(0, 0).into_owned().determinant() < 0.0 {
            for face in &mut self.faces {
                face.reverse();
            }
        }
    }

    /// Face normal by Newell's method; zero for degenerate faces
    pub fn face_normal(&self, face: usize) -> Vector3<f64> {
        newell_normal(self.faces[face].iter().map(|&i| &self.vertices[i]))
    }

    /// Count non-triangular, degenerate, open and non-manifold features
    pub fn check(&self) -> PolyhedronCheck {
        let mut check = PolyhedronCheck::default();
        let mut edge_counts: AHashMap<Edge, u32> = AHashMap::new();

        for face in &self.faces {
            let mut distinct = face.clone();
            distinct.sort_unstable();
            distinct.dedup();
            if distinct.len() < 3 {
                check.degenerate += 1;
            }
            if face.len() > 3 {
                check.non_triangular += 1;
            }
            for k in 0..face.len() {
                let edge = Edge::new(face[k], face[(k + 1) % face.len()]);
                *edge_counts.entry(edge).or_insert(0) += 1;
            }
        }

        for &count in edge_counts.values() {
            match count {
                1 => check.open_edges += 1,
                2 => {}
                _ => check.non_manifold_edges += 1,
            }
        }
        check
    }
}

/// Newell's method normal of a closed vertex loop (not normalized)
pub fn newell_normal<'a>(points: impl Iterator<Item = &'a Point3<f64>>) -> Vector3<f64> {
    let points: Vec<&Point3<f64>> = points.collect();
    let mut n = Vector3::zeros();
    for (k, a) in points.iter().enumerate() {
        let b = points[(k + 1) % points.len()];
        n.x += (a.y - b.y) * (a.z + b.z);
        n.y += (a.z - b.z) * (a.x + b.x);
        n.z += (a.x - b.x) * (a.y + b.y);
    }
    n
}

/// Merges coincident vertices while a polyhedron is being assembled
#[derive(Debug, Default)]
pub struct Welder {
    lookup: AHashMap<[i64; 3], usize>,
    polyhedron: Polyhedron,
}

impl Welder {
    pub fn new() -> Self {
        Self::default()
    }

    fn key(p: &Point3<f64>) -> [i64; 3] {
        [
            (p.x / WELD_EPSILON).round() as i64,
            (p.y / WELD_EPSILON).round() as i64,
            (p.z / WELD_EPSILON).round() as i64,
        ]
    }

    /// Index of the welded vertex at `p`
    pub fn vertex(&mut self, p: Point3<f64>) -> usize {
        let polyhedron = &mut self.polyhedron;
        *self
            .lookup
            .entry(Self::key(&p))
            .or_insert_with(|| polyhedron.add_vertex(p))
    }

    /// Add a face given by positions; collapsed vertices are removed and faces
    /// left with fewer than 3 vertices are dropped
    pub fn face(&mut self, points: &[Point3<f64>]) {
        let mut face: Vec<usize> = Vec::with_capacity(points.len());
        for p in points {
            let index = self.vertex(*p);
            if face.last() != Some(&index) {
                face.push(index);
            }
        }
        while face.len() > 1 && face.first() == face.last() {
            face.pop();
        }
        if face.len() >= 3 {
            self.polyhedron.add_face(face);
        }
    }

    pub fn finish(self) -> Polyhedron {
        self.polyhedron
    }
}
