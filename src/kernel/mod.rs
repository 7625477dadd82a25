// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Geometry kernels driven by the pipeline
//!
//! The pipeline only talks to the traits below. The BSP kernels and the ear-clipping
//! triangulator are the implementations shipped with the crate.

mod bsp;
mod profile;
mod solid;
mod triangulate;

pub use profile::BspProfileKernel;
pub use solid::BspSolidKernel;
pub use triangulate::EarClipTriangulator;

use crate::error::KernelError;
use crate::geometry::{BooleanOp, Mesh, Polyhedron, Polyset};

/// 3D boolean kernel
pub trait SolidKernel {
    /// Combine two closed polyhedra
    fn boolean(&mut self, a: &Polyhedron, b: &Polyhedron, op: BooleanOp) -> Result<Polyhedron, KernelError>;
}

/// 2D polygon clipping kernel
pub trait ProfileKernel {
    /// Combine two polysets
    fn boolean(&mut self, a: &Polyset, b: &Polyset, op: BooleanOp) -> Result<Polyset, KernelError>;
}

/// Triangulation kernel
pub trait Triangulator {
    /// Append the triangulated faces of `polyhedron` to `mesh`, returning the number
    /// of triangles added
    fn triangulate(&mut self, polyhedron: &Polyhedron, mesh: &mut Mesh) -> Result<usize, KernelError>;
}

impl<K: SolidKernel + ?Sized> SolidKernel for &mut K {
    fn boolean(&mut self, a: &Polyhedron, b: &Polyhedron, op: BooleanOp) -> Result<Polyhedron, KernelError> {
        (**self).boolean(a, b, op)
    }
}

impl<K: ProfileKernel + ?Sized> ProfileKernel for &mut K {
    fn boolean(&mut self, a: &Polyset, b: &Polyset, op: BooleanOp) -> Result<Polyset, KernelError> {
        (**self).boolean(a, b, op)
    }
}

impl<T: Triangulator + ?Sized> Triangulator for &mut T {
    fn triangulate(&mut self, polyhedron: &Polyhedron, mesh: &mut Mesh) -> Result<usize, KernelError> {
        (**self).triangulate(polyhedron, mesh)
    }
}
