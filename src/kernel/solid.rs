// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! BSP boolean kernel for polyhedra

use super::bsp::{self, Facet, Split, EPSILON};
use super::SolidKernel;
use crate::error::KernelError;
use crate::geometry::{newell_normal, BooleanOp, Polyhedron, Welder};
use nalgebra::{Point3, Vector3};

const KERNEL: &str = "bsp";

#[derive(Debug, Clone)]
pub struct Plane {
    normal: Vector3<f64>,
    w: f64,
}

/// Planar polygon carrying its supporting plane
#[derive(Debug, Clone)]
pub struct Polygon {
    vertices: Vec<Point3<f64>>,
    plane: Plane,
}

impl Polygon {
    fn new(vertices: Vec<Point3<f64>>) -> Self {
        let normal = newell_normal(vertices.iter())
            .try_normalize(1e-12)
            .unwrap_or_else(Vector3::zeros);
        let w = normal.dot(&vertices[0].coords);
        Self {
            vertices,
            plane: Plane { normal, w },
        }
    }

    fn with_plane(vertices: Vec<Point3<f64>>, plane: &Plane) -> Self {
        Self {
            vertices,
            plane: plane.clone(),
        }
    }
}

const COPLANAR: u8 = 0;
const FRONT: u8 = 1;
const BACK: u8 = 2;
const SPANNING: u8 = 3;

impl Facet for Polygon {
    type Plane = Plane;

    fn plane(&self) -> Option<Plane> {
        (self.plane.normal.norm_squared() > 0.5).then(|| self.plane.clone())
    }

    fn flip(&mut self) {
        self.vertices.reverse();
        Self::flip_plane(&mut self.plane);
    }

    fn flip_plane(plane: &mut Plane) {
        plane.normal = -plane.normal;
        plane.w = -plane.w;
    }

    fn split(&self, plane: &Plane) -> Split<Self> {
        let distances: Vec<f64> = self
            .vertices
            .iter()
            .map(|v| plane.normal.dot(&v.coords) - plane.w)
            .collect();
        let types: Vec<u8> = distances
            .iter()
            .map(|&d| {
                if d < -EPSILON {
                    BACK
                } else if d > EPSILON {
                    FRONT
                } else {
                    COPLANAR
                }
            })
            .collect();
        let polygon_type = types.iter().fold(COPLANAR, |acc, &t| acc | t);

        match polygon_type {
            COPLANAR => {
                if plane.normal.dot(&self.plane.normal) > 0.0 {
                    Split::CoplanarFront(self.clone())
                } else {
                    Split::CoplanarBack(self.clone())
                }
            }
            FRONT => Split::Front(self.clone()),
            BACK => Split::Back(self.clone()),
            _ => {
                let n = self.vertices.len();
                let mut front = Vec::with_capacity(n + 1);
                let mut back = Vec::with_capacity(n + 1);
                for i in 0..n {
                    let j = (i + 1) % n;
                    let (ti, tj) = (types[i], types[j]);
                    let (vi, vj) = (self.vertices[i], self.vertices[j]);
                    if ti != BACK {
                        front.push(vi);
                    }
                    if ti != FRONT {
                        back.push(vi);
                    }
                    if (ti | tj) == SPANNING {
                        let t = (plane.w - plane.normal.dot(&vi.coords))
                            / plane.normal.dot(&(vj - vi));
                        let v = vi + (vj - vi) * t;
                        front.push(v);
                        back.push(v);
                    }
                }
                Split::Spanning {
                    front: (front.len() >= 3).then(|| Self::with_plane(front, &self.plane)),
                    back: (back.len() >= 3).then(|| Self::with_plane(back, &self.plane)),
                }
            }
        }
    }
}

/// Convert a polyhedron to BSP polygons
fn to_polygons(polyhedron: &Polyhedron) -> Vec<Polygon> {
    polyhedron
        .faces
        .iter()
        .filter(|face| face.len() >= 3)
        .map(|face| Polygon::new(face.iter().map(|&i| polyhedron.vertices[i]).collect()))
        .collect()
}

/// Convert polygons back to a welded polyhedron
fn to_polyhedron(polygons: &[Polygon]) -> Polyhedron {
    let mut welder = Welder::new();
    for polygon in polygons {
        welder.face(&polygon.vertices);
    }
    welder.finish()
}

/// Boolean kernel evaluating polyhedra with BSP trees
#[derive(Debug, Default, Clone)]
pub struct BspSolidKernel;

impl BspSolidKernel {
    pub fn new() -> Self {
        Self
    }
}

impl SolidKernel for BspSolidKernel {
    fn boolean(
        &mut self,
        a: &Polyhedron,
        b: &Polyhedron,
        op: BooleanOp,
    ) -> Result<Polyhedron, KernelError> {
        for (name, p) in [("first", a), ("second", b)] {
            if let Some(bad) = p.faces.iter().flatten().find(|&&i| i >= p.v_size()) {
                return Err(KernelError::new(
                    KERNEL,
                    format!("{} operand references missing vertex {}", name, bad),
                ));
            }
            if p.vertices.iter().any(|v| !v.coords.iter().all(|c| c.is_finite())) {
                return Err(KernelError::new(
                    KERNEL,
                    format!("{} operand has non-finite coordinates", name),
                ));
            }
        }

        let result = bsp::combine(to_polygons(a), to_polygons(b), op);
        Ok(to_polyhedron(&result))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Primitive;
    use nalgebra::{Matrix4, Vector3};

    fn cube_at(x: f64) -> Polyhedron {
        let mut cube = Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false).to_polyhedron(0.01);
        cube.transform(&Matrix4::new_translation(&Vector3::new(x, 0.0, 0.0)));
        cube
    }

    fn x_extent(p: &Polyhedron) -> (f64, f64) {
        p.vertices.iter().fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v.x), hi.max(v.x)))
    }

    #[test]
    fn test_union_of_overlapping_cubes() {
        let mut kernel = BspSolidKernel::new();
        let result = kernel
            .boolean(&cube_at(0.0), &cube_at(0.5), BooleanOp::Union)
            .unwrap();
        let (lo, hi) = x_extent(&result);
        assert!((lo - 0.0).abs() < 1e-9);
        assert!((hi - 1.5).abs() < 1e-9);
        assert!(result.f_size() >= 6);
    }

    #[test]
    fn test_difference_trims_extent() {
        let mut kernel = BspSolidKernel::new();
        let result = kernel
            .boolean(&cube_at(0.0), &cube_at(0.5), BooleanOp::Difference)
            .unwrap();
        let (lo, hi) = x_extent(&result);
        assert!((lo - 0.0).abs() < 1e-9);
        assert!((hi - 0.5).abs() < 1e-9);
    }

    #[test]
    fn test_intersection_of_disjoint_cubes_is_empty() {
        let mut kernel = BspSolidKernel::new();
        let result = kernel
            .boolean(&cube_at(0.0), &cube_at(3.0), BooleanOp::Intersection)
            .unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_fine_sphere_union_on_small_stack() {
        // the sphere's BSP tree is a chain of several thousand levels
        let worker = std::thread::Builder::new()
            .stack_size(256 * 1024)
            .spawn(|| {
                let sphere = Primitive::sphere(20.0).to_polyhedron(0.01);
                let faces = sphere.f_size();
                let result = BspSolidKernel::new()
                    .boolean(&sphere, &cube_at(0.0), BooleanOp::Union)
                    .unwrap();
                (faces, result)
            })
            .unwrap();
        let (faces, result) = worker.join().unwrap();
        assert!(faces > 4000);
        assert!(result.f_size() >= faces);
        let (lo, hi) = x_extent(&result);
        assert!(lo > -20.0 - 1e-9 && lo < -19.9);
        assert!(hi < 20.0 + 1e-9 && hi > 19.9);
    }

    #[test]
    fn test_rejects_dangling_index() {
        let mut kernel = BspSolidKernel::new();
        let broken = Polyhedron::new(vec![Point3::origin()], vec![vec![0, 1, 2]]);
        let err = kernel
            .boolean(&cube_at(0.0), &broken, BooleanOp::Union)
            .unwrap_err();
        assert_eq!(err.kernel, "bsp");
    }
}
