// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! BSP boolean kernel for 2D profiles

use super::bsp::{self, Facet, Split, EPSILON};
use super::ProfileKernel;
use crate::error::KernelError;
use crate::geometry::{BooleanOp, Polygon2d, Polyset};
use nalgebra::{Point2, Vector2};

const KERNEL: &str = "clip2d";

/// Loops with less area than this are dropped after assembly
const MIN_LOOP_AREA: f64 = 1e-12;

#[derive(Debug, Clone)]
pub struct Line {
    normal: Vector2<f64>,
    w: f64,
}

/// Oriented boundary segment; the profile interior lies to its left
#[derive(Debug, Clone)]
pub struct Segment {
    a: Point2<f64>,
    b: Point2<f64>,
    line: Line,
}

impl Segment {
    fn new(a: Point2<f64>, b: Point2<f64>) -> Self {
        let d = b - a;
        let normal = Vector2::new(d.y, -d.x)
            .try_normalize(1e-12)
            .unwrap_or_else(Vector2::zeros);
        let w = normal.dot(&a.coords);
        Self {
            a,
            b,
            line: Line { normal, w },
        }
    }

    fn with_line(a: Point2<f64>, b: Point2<f64>, line: &Line) -> Self {
        Self {
            a,
            b,
            line: line.clone(),
        }
    }
}

impl Facet for Segment {
    type Plane = Line;

    fn plane(&self) -> Option<Line> {
        (self.line.normal.norm_squared() > 0.5).then(|| self.line.clone())
    }

    fn flip(&mut self) {
        std::mem::swap(&mut self.a, &mut self.b);
        Self::flip_plane(&mut self.line);
    }

    fn flip_plane(line: &mut Line) {
        line.normal = -line.normal;
        line.w = -line.w;
    }

    fn split(&self, line: &Line) -> Split<Self> {
        let da = line.normal.dot(&self.a.coords) - line.w;
        let db = line.normal.dot(&self.b.coords) - line.w;

        let on_a = da.abs() <= EPSILON;
        let on_b = db.abs() <= EPSILON;

        if on_a && on_b {
            return if line.normal.dot(&self.line.normal) > 0.0 {
                Split::CoplanarFront(self.clone())
            } else {
                Split::CoplanarBack(self.clone())
            };
        }
        if da >= -EPSILON && db >= -EPSILON {
            return Split::Front(self.clone());
        }
        if da <= EPSILON && db <= EPSILON {
            return Split::Back(self.clone());
        }

        let t = da / (da - db);
        let p = self.a + (self.b - self.a) * t;
        let first = Self::with_line(self.a, p, &self.line);
        let second = Self::with_line(p, self.b, &self.line);
        if da > 0.0 {
            Split::Spanning {
                front: Some(first),
                back: Some(second),
            }
        } else {
            Split::Spanning {
                front: Some(second),
                back: Some(first),
            }
        }
    }
}

fn to_segments(polyset: &Polyset) -> Vec<Segment> {
    polyset
        .iter()
        .flat_map(|polygon| polygon.edges())
        .filter(|(a, b)| (b - a).norm() > EPSILON)
        .map(|(a, b)| Segment::new(a, b))
        .collect()
}

/// Chain segments end to start into closed loops; open chains are discarded
fn assemble(segments: Vec<Segment>) -> Polyset {
    let mut used = vec![false; segments.len()];
    let mut polyset = Polyset::new();

    for first in 0..segments.len() {
        if used[first] {
            continue;
        }
        used[first] = true;
        let start = segments[first].a;
        let mut points = vec![start];
        let mut current = first;

        let closed = loop {
            let end = segments[current].b;
            if (end - start).norm() <= EPSILON {
                break true;
            }
            let next = (0..segments.len())
                .filter(|&j| !used[j])
                .map(|j| (j, (segments[j].a - end).norm()))
                .filter(|&(_, d)| d <= EPSILON)
                .min_by(|x, y| x.1.total_cmp(&y.1))
                .map(|(j, _)| j);
            match next {
                Some(j) => {
                    used[j] = true;
                    points.push(segments[j].a);
                    current = j;
                }
                None => break false,
            }
        };

        if !closed {
            tracing::debug!("dropping open chain of {} points", points.len());
            continue;
        }

        let mut polygon = Polygon2d::new(points);
        polygon.simplify(EPSILON);
        if polygon.len() >= 3 && polygon.signed_area().abs() > MIN_LOOP_AREA {
            polyset.push(polygon);
        }
    }
    polyset
}

/// 2D boolean kernel clipping oriented segments with BSP trees
#[derive(Debug, Default, Clone)]
pub struct BspProfileKernel;

impl BspProfileKernel {
    pub fn new() -> Self {
        Self
    }
}

impl ProfileKernel for BspProfileKernel {
    fn boolean(&mut self, a: &Polyset, b: &Polyset, op: BooleanOp) -> Result<Polyset, KernelError> {
        let finite = |p: &Polyset| {
            p.iter()
                .flat_map(|l| l.points.iter())
                .all(|pt| pt.x.is_finite() && pt.y.is_finite())
        };
        if !finite(a) || !finite(b) {
            return Err(KernelError::new(KERNEL, "operand has non-finite coordinates"));
        }

        let result = bsp::combine(to_segments(a), to_segments(b), op);
        Ok(assemble(result))
    }
}
