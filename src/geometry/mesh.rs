// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Triangle mesh shared by the 3D exporters

use super::{connected_components, Polyhedron};
use ahash::AHashMap;
use nalgebra::{Point3, Vector3};

/// Triangle defined by three vertex indices
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Triangle {
    pub indices: [usize; 3],
}

impl Triangle {
    pub fn new(indices: [usize; 3]) -> Self {
        Self { indices }
    }
}

/// Triangular mesh with shared vertices
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Point3<f64>>,
    pub triangles: Vec<Triangle>,
}

impl Mesh {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a vertex and return its index
    pub fn add_vertex(&mut self, position: Point3<f64>) -> usize {
        let index = self.vertices.len();
        self.vertices.push(position);
        index
    }

    pub fn add_triangle(&mut self, triangle: Triangle) {
        self.triangles.push(triangle);
    }

    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn triangle_count(&self) -> usize {
        self.triangles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.triangles.is_empty()
    }

    /// Corner positions of a triangle
    pub fn corners(&self, triangle: &Triangle) -> [Point3<f64>; 3] {
        triangle.indices.map(|i| self.vertices[i])
    }

    /// Unit normal of a triangle, zero when degenerate
    pub fn triangle_normal(&self, triangle: &Triangle) -> Vector3<f64> {
        let [a, b, c] = self.corners(triangle);
        (b - a).cross(&(c - a)).try_normalize(1e-12).unwrap_or_else(Vector3::zeros)
    }

    /// Append the vertices of a polyhedron, returning the index offset they start at
    pub fn append_vertices(&mut self, polyhedron: &Polyhedron) -> usize {
        let offset = self.vertices.len();
        self.vertices.extend_from_slice(&polyhedron.vertices);
        offset
    }

    /// Split into groups of triangles connected through shared vertices
    pub fn lumps(&self) -> Vec<Mesh> {
        let components = connected_components(self.vertices.len(), self.triangles.iter().map(|t| t.indices.as_slice()));
        components
            .into_iter()
            .map(|triangles| {
                let mut lump = Mesh::new();
                let mut remap: AHashMap<usize, usize> = AHashMap::new();
                for t in triangles {
                    let indices = self.triangles[t]
                        .indices
                        .map(|i| *remap.entry(i).or_insert_with(|| lump.add_vertex(self.vertices[i])));
                    lump.add_triangle(Triangle::new(indices));
                }
                lump
            })
            .collect()
    }
}
