// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Ear-clipping triangulation of planar polygon faces

use super::Triangulator;
use crate::error::KernelError;
use crate::geometry::{Mesh, Polyhedron, Triangle};
use nalgebra::{Point2, Vector3};

const KERNEL: &str = "triangulate";

/// Triangulator clipping ears from each face projected onto its dominant plane
#[derive(Debug, Default, Clone)]
pub struct EarClipTriangulator;

impl EarClipTriangulator {
    pub fn new() -> Self {
        Self
    }
}

impl Triangulator for EarClipTriangulator {
    fn triangulate(&mut self, polyhedron: &Polyhedron, mesh: &mut Mesh) -> Result<usize, KernelError> {
        let offset = mesh.append_vertices(polyhedron);
        let before = mesh.triangle_count();

        for (index, face) in polyhedron.faces.iter().enumerate() {
            if face.len() < 3 {
                return Err(KernelError::new(
                    KERNEL,
                    format!("face {} has only {} vertices", index, face.len()),
                ));
            }
            if let Some(&bad) = face.iter().find(|&&i| i >= polyhedron.v_size()) {
                return Err(KernelError::new(
                    KERNEL,
                    format!("face {} references missing vertex {}", index, bad),
                ));
            }

            if face.len() == 3 {
                mesh.add_triangle(Triangle::new([face[0] + offset, face[1] + offset, face[2] + offset]));
                continue;
            }

            let projected = project(polyhedron, face, &polyhedron.face_normal(index));
            for [a, b, c] in ear_clip(&projected) {
                mesh.add_triangle(Triangle::new([
                    face[a] + offset,
                    face[b] + offset,
                    face[c] + offset,
                ]));
            }
        }

        Ok(mesh.triangle_count() - before)
    }
}

/// Drop the dominant axis of the normal, keeping a right-handed coordinate order
fn project(polyhedron: &Polyhedron, face: &[usize], normal: &Vector3<f64>) -> Vec<Point2<f64>> {
    let axis = normal.iamax();
    face.iter()
        .map(|&i| {
            let p = polyhedron.vertices[i];
            match axis {
                0 => Point2::new(p.y, p.z),
                1 => Point2::new(p.z, p.x),
                _ => Point2::new(p.x, p.y),
            }
        })
        .collect()
}

fn cross(o: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>) -> f64 {
    (a.x - o.x) * (b.y - o.y) - (a.y - o.y) * (b.x - o.x)
}

fn inside_triangle(p: &Point2<f64>, a: &Point2<f64>, b: &Point2<f64>, c: &Point2<f64>, sign: f64) -> bool {
    cross(a, b, p) * sign > 0.0 && cross(b, c, p) * sign > 0.0 && cross(c, a, p) * sign > 0.0
}

/// Triangulate a simple polygon, returning local vertex indices.
/// Falls back to a fan over the remaining vertices if no ear can be found.
fn ear_clip(points: &[Point2<f64>]) -> Vec<[usize; 3]> {
    let n = points.len();
    let area: f64 = (0..n).map(|i| cross(&Point2::origin(), &points[i], &points[(i + 1) % n])).sum();
    let sign = if area < 0.0 { -1.0 } else { 1.0 };

    let mut remaining: Vec<usize> = (0..n).collect();
    let mut triangles = Vec::with_capacity(n - 2);

    while remaining.len() > 3 {
        let m = remaining.len();
        let ear = (0..m).find(|&k| {
            let (i0, i1, i2) = (remaining[(k + m - 1) % m], remaining[k], remaining[(k + 1) % m]);
            let (a, b, c) = (&points[i0], &points[i1], &points[i2]);
            if cross(a, b, c) * sign <= 0.0 {
                return false;
            }
            remaining
                .iter()
                .filter(|&&j| j != i0 && j != i1 && j != i2)
                .all(|&j| !inside_triangle(&points[j], a, b, c, sign))
        });

        match ear {
            Some(k) => {
                triangles.push([remaining[(k + m - 1) % m], remaining[k], remaining[(k + 1) % m]]);
                remaining.remove(k);
            }
            None => {
                tracing::debug!("no ear found in {}-gon, using fan for the rest", m);
                for k in 1..m - 1 {
                    triangles.push([remaining[0], remaining[k], remaining[k + 1]]);
                }
                return triangles;
            }
        }
    }

    triangles.push([remaining[0], remaining[1], remaining[2]]);
    triangles
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::Point3;

    #[test]
    fn test_cube_triangulates_to_twelve() {
        let cube = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_polyhedron(0.01);
        let mut mesh = Mesh::new();
        let count = EarClipTriangulator::new().triangulate(&cube, &mut mesh).unwrap();
        assert_eq!(count, 12);
        assert_eq!(mesh.vertex_count(), 8);

        // triangle winding follows the original face orientation
        for t in &mesh.triangles {
            let n = mesh.triangle_normal(t);
            let c = mesh.corners(t).iter().fold(Vector3::zeros(), |acc, p| acc + p.coords) / 3.0;
            assert!(n.dot(&(c - Vector3::new(0.5, 0.5, 0.5))) > 0.0);
        }
    }

    #[test]
    fn test_concave_face() {
        // L-shaped face in the XY plane
        let vertices = vec![
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 1.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(1.0, 2.0, 0.0),
            Point3::new(0.0, 2.0, 0.0),
        ];
        let poly = Polyhedron::new(vertices, vec![vec![0, 1, 2, 3, 4, 5]]);
        let mut mesh = Mesh::new();
        let count = EarClipTriangulator::new().triangulate(&poly, &mut mesh).unwrap();
        assert_eq!(count, 4);

        let area: f64 = mesh
            .triangles
            .iter()
            .map(|t| {
                let [a, b, c] = mesh.corners(t);
                (b - a).cross(&(c - a)).z * 0.5
            })
            .sum();
        assert!((area - 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_rejects_degenerate_face() {
        let poly = Polyhedron::new(vec![Point3::origin(), Point3::new(1.0, 0.0, 0.0)], vec![vec![0, 1]]);
        let mut mesh = Mesh::new();
        assert!(EarClipTriangulator::new().triangulate(&poly, &mut mesh).is_err());
    }
}
