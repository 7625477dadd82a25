// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry module - mesh, polyhedron and profile representations

mod bbox;
mod components;
mod mesh;
mod polygon;
mod polyhedron;
mod primitives;

pub use bbox::BoundingBox;
pub use components::connected_components;
pub use mesh::{Mesh, Triangle};
pub use polygon::{Polygon2d, Polyset};
pub use polyhedron::{newell_normal, Polyhedron, PolyhedronCheck, Welder, WELD_EPSILON};
pub use primitives::{segment_count, Primitive, Profile};

/// Boolean combination applied by a combinator node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BooleanOp {
    Union,
    Difference,
    Intersection,
}

impl std::fmt::Display for BooleanOp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BooleanOp::Union => "union",
            BooleanOp::Difference => "difference",
            BooleanOp::Intersection => "intersection",
        };
        f.write_str(name)
    }
}
