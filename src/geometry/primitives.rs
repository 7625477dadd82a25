// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometric primitives generator

use super::{Polygon2d, Polyhedron};
use nalgebra::{Point2, Point3, Vector3};
use std::f64::consts::PI;

const MIN_SEGMENTS: usize = 8;
const MAX_SEGMENTS: usize = 720;

/// Number of segments approximating a circle of `radius` so that no chord deviates
/// from the arc by more than `secant_tolerance`
pub fn segment_count(radius: f64, secant_tolerance: f64) -> usize {
    if radius <= 0.0 || secant_tolerance <= 0.0 || secant_tolerance >= radius {
        return MIN_SEGMENTS;
    }
    let half_angle = (1.0 - secant_tolerance / radius).acos();
    let n = (PI / half_angle).ceil() as usize;
    n.clamp(MIN_SEGMENTS, MAX_SEGMENTS)
}

/// 3D primitives
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    Cube { size: Vector3<f64>, center: bool },
    Sphere { r: f64 },
    Cone { r1: f64, r2: f64, h: f64, center: bool },
    Polyhedron(Polyhedron),
}

impl Primitive {
    pub fn cube(size: Vector3<f64>, center: bool) -> Self {
        Self::Cube { size, center }
    }

    pub fn sphere(r: f64) -> Self {
        Self::Sphere { r }
    }

    pub fn cylinder(r: f64, h: f64, center: bool) -> Self {
        Self::Cone { r1: r, r2: r, h, center }
    }

    pub fn cone(r1: f64, r2: f64, h: f64, center: bool) -> Self {
        Self::Cone { r1, r2, h, center }
    }

    /// Tessellate into a polyhedron with outward counter-clockwise faces
    pub fn to_polyhedron(&self, secant_tolerance: f64) -> Polyhedron {
        match self {
            Self::Cube { size, center } => generate_cube(*size, *center),
            Self::Sphere { r } => generate_sphere(*r, segment_count(*r, secant_tolerance)),
            Self::Cone { r1, r2, h, center } => {
                let n = segment_count(r1.max(*r2), secant_tolerance);
                generate_cone(*r1, *r2, *h, *center, n)
            }
            Self::Polyhedron(p) => p.clone(),
        }
    }
}

/// 2D primitives
#[derive(Debug, Clone, PartialEq)]
pub enum Profile {
    Circle { r: f64 },
    Rectangle { dx: f64, dy: f64, center: bool },
    Polygon(Polygon2d),
}

impl Profile {
    /// Tessellate into a single counter-clockwise loop
    pub fn to_polygon(&self, secant_tolerance: f64) -> Polygon2d {
        match self {
            Self::Circle { r } => generate_circle(*r, segment_count(*r, secant_tolerance)),
            Self::Rectangle { dx, dy, center } => generate_rectangle(*dx, *dy, *center),
            Self::Polygon(p) => {
                let mut polygon = p.clone();
                if !polygon.is_ccw() {
                    polygon.reverse();
                }
                polygon
            }
        }
    }
}

fn generate_cube(size: Vector3<f64>, center: bool) -> Polyhedron {
    let offset = if center { size / 2.0 } else { Vector3::zeros() };
    let (min_x, max_x) = (-offset.x, size.x - offset.x);
    let (min_y, max_y) = (-offset.y, size.y - offset.y);
    let (min_z, max_z) = (-offset.z, size.z - offset.z);

    let vertices = vec![
        Point3::new(min_x, min_y, min_z),
        Point3::new(max_x, min_y, min_z),
        Point3::new(max_x, max_y, min_z),
        Point3::new(min_x, max_y, min_z),
        Point3::new(min_x, min_y, max_z),
        Point3::new(max_x, min_y, max_z),
        Point3::new(max_x, max_y, max_z),
        Point3::new(min_x, max_y, max_z),
    ];

    let faces = vec![
        vec![0, 3, 2, 1], // z-
        vec![4, 5, 6, 7], // z+
        vec![0, 1, 5, 4], // y-
        vec![3, 7, 6, 2], // y+
        vec![0, 4, 7, 3], // x-
        vec![1, 2, 6, 5], // x+
    ];

    Polyhedron::new(vertices, faces)
}

fn generate_sphere(radius: f64, segments: usize) -> Polyhedron {
    let rings = (segments + 1) / 2;
    let mut poly = Polyhedron::empty();

    // rings run from +z to -z, no vertices on the poles
    for i in 0..rings {
        let phi = PI * (i as f64 + 0.5) / rings as f64;
        let z = radius * phi.cos();
        let r = radius * phi.sin();
        for j in 0..segments {
            let theta = 2.0 * PI * j as f64 / segments as f64;
            poly.add_vertex(Point3::new(r * theta.cos(), r * theta.sin(), z));
        }
    }

    let at = |ring: usize, j: usize| ring * segments + j % segments;

    poly.add_face((0..segments).map(|j| at(0, j)).collect());
    for i in 0..rings - 1 {
        for j in 0..segments {
            poly.add_face(vec![at(i, j), at(i + 1, j), at(i + 1, j + 1), at(i, j + 1)]);
        }
    }
    poly.add_face((0..segments).rev().map(|j| at(rings - 1, j)).collect());
    poly
}

fn generate_cone(r1: f64, r2: f64, height: f64, center: bool, segments: usize) -> Polyhedron {
    let z0 = if center { -height / 2.0 } else { 0.0 };
    let z1 = z0 + height;
    let mut poly = Polyhedron::empty();

    let ring = |poly: &mut Polyhedron, r: f64, z: f64| -> Vec<usize> {
        if r <= 0.0 {
            let apex = poly.add_vertex(Point3::new(0.0, 0.0, z));
            return vec![apex; segments];
        }
        (0..segments)
            .map(|j| {
                let theta = 2.0 * PI * j as f64 / segments as f64;
                poly.add_vertex(Point3::new(r * theta.cos(), r * theta.sin(), z))
            })
            .collect()
    };

    let bottom = ring(&mut poly, r1, z0);
    let top = ring(&mut poly, r2, z1);

    if r1 > 0.0 {
        poly.add_face(bottom.iter().rev().copied().collect());
    }
    if r2 > 0.0 {
        poly.add_face(top.clone());
    }
    for j in 0..segments {
        let k = (j + 1) % segments;
        let mut face = vec![bottom[j], bottom[k], top[k], top[j]];
        face.dedup();
        poly.add_face(face);
    }
    poly
}

fn generate_rectangle(dx: f64, dy: f64, center: bool) -> Polygon2d {
    let (x0, y0) = if center { (-dx / 2.0, -dy / 2.0) } else { (0.0, 0.0) };
    Polygon2d::new(vec![
        Point2::new(x0, y0),
        Point2::new(x0 + dx, y0),
        Point2::new(x0 + dx, y0 + dy),
        Point2::new(x0, y0 + dy),
    ])
}

fn generate_circle(radius: f64, segments: usize) -> Polygon2d {
    Polygon2d::new(
        (0..segments)
            .map(|j| {
                let theta = 2.0 * PI * j as f64 / segments as f64;
                Point2::new(radius * theta.cos(), radius * theta.sin())
            })
            .collect(),
    )
}
