// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! 2D polygon loops and polysets

use super::BoundingBox;
use nalgebra::{Matrix4, Point2, Point3};

/// Closed loop of 2D points. The closing edge from last to first point is implicit.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polygon2d {
    pub points: Vec<Point2<f64>>,
}

impl Polygon2d {
    pub fn new(points: Vec<Point2<f64>>) -> Self {
        Self { points }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Shoelace area, positive for counter-clockwise loops
    pub fn signed_area(&self) -> f64 {
        let n = self.points.len();
        (0..n)
            .map(|i| {
                let a = self.points[i];
                let b = self.points[(i + 1) % n];
                a.x * b.y - b.x * a.y
            })
            .sum::<f64>()
            * 0.5
    }

    pub fn is_ccw(&self) -> bool {
        self.signed_area() > 0.0
    }

    pub fn reverse(&mut self) {
        self.points.reverse();
    }

    /// Edges as (start, end) point pairs
    pub fn edges(&self) -> impl Iterator<Item = (Point2<f64>, Point2<f64>)> + '_ {
        let n = self.points.len();
        (0..n).map(move |i| (self.points[i], self.points[(i + 1) % n]))
    }

    /// Apply the XY part of an affine transform; mirroring keeps the original orientation
    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        let was_ccw = self.is_ccw();
        for p in &mut self.points {
            let q = matrix.transform_point(&Point3::new(p.x, p.y, 0.0));
            *p = Point2::new(q.x, q.y);
        }
        if self.is_ccw() != was_ccw {
            self.reverse();
        }
    }

    /// Drop repeated points and vertices lying on a straight line between their neighbours
    pub fn simplify(&mut self, epsilon: f64) {
        self.points.dedup_by(|a, b| (*a - *b).norm() <= epsilon);
        while self.points.len() > 1
            && (self.points[0] - self.points[self.points.len() - 1]).norm() <= epsilon
        {
            self.points.pop();
        }

        let mut i = 0;
        while self.points.len() > 3 && i < self.points.len() {
            let n = self.points.len();
            let prev = self.points[(i + n - 1) % n];
            let next = self.points[(i + 1) % n];
            let cur = self.points[i];
            let span = next - prev;
            let cross = span.x * (cur.y - prev.y) - span.y * (cur.x - prev.x);
            let forward = span.dot(&(cur - prev)) > 0.0 && span.dot(&(next - cur)) > 0.0;
            if cross.abs() <= epsilon * span.norm().max(1.0) && forward {
                self.points.remove(i);
            } else {
                i += 1;
            }
        }
    }
}

/// Ordered set of disjoint closed loops.
///
/// Outer boundaries are counter-clockwise, holes are clockwise.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Polyset {
    loops: Vec<Polygon2d>,
}

impl Polyset {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_loops(loops: Vec<Polygon2d>) -> Self {
        Self { loops }
    }

    pub fn push(&mut self, polygon: Polygon2d) {
        self.loops.push(polygon);
    }

    pub fn len(&self) -> usize {
        self.loops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.loops.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Polygon2d> {
        self.loops.iter()
    }

    pub fn loops(&self) -> &[Polygon2d] {
        &self.loops
    }

    pub fn transform(&mut self, matrix: &Matrix4<f64>) {
        for polygon in &mut self.loops {
            polygon.transform(matrix);
        }
    }

    pub fn bounding_box(&self) -> BoundingBox {
        let mut bbox = BoundingBox::empty();
        for p in self.loops.iter().flat_map(|l| l.points.iter()) {
            bbox.expand_to_include(p);
        }
        bbox
    }

    /// Total signed area (holes subtract)
    pub fn area(&self) -> f64 {
        self.loops.iter().map(Polygon2d::signed_area).sum()
    }
}

impl<'a> IntoIterator for &'a Polyset {
    type Item = &'a Polygon2d;
    type IntoIter = std::slice::Iter<'a, Polygon2d>;

    fn into_iter(self) -> Self::IntoIter {
        self.loops.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn unit_square() -> Polygon2d {
        Polygon2d::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
        ])
    }

    #[test]
    fn test_signed_area() {
        let mut square = unit_square();
        assert!((square.signed_area() - 1.0).abs() < 1e-12);
        square.reverse();
        assert!((square.signed_area() + 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_mirror_keeps_orientation() {
        let mut square = unit_square();
        square.transform(&Matrix4::new_nonuniform_scaling(&Vector3::new(-1.0, 1.0, 1.0)));
        assert!(square.is_ccw());
        assert!(square.points.iter().all(|p| p.x <= 0.0));
    }

    #[test]
    fn test_simplify_removes_collinear_points() {
        let mut polygon = Polygon2d::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(0.5, 0.0),
            Point2::new(1.0, 0.0),
            Point2::new(1.0, 1.0),
            Point2::new(1.0, 1.0),
            Point2::new(0.0, 1.0),
            Point2::new(0.0, 0.0),
        ]);
        polygon.simplify(1e-9);
        assert_eq!(polygon.len(), 4);
    }
}
