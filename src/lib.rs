// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! xcsg
//!
//! Reads a constructive solid geometry scene (`.xcsg` XML, or an OpenSCAD `.csg` file
//! converted on the fly), reduces its boolean tree with a geometry kernel and writes
//! the result as mesh (STL, OBJ, OFF, AMF, OpenSCAD) or vector (SVG, DXF, OpenSCAD)
//! files.

pub mod cli;
pub mod config;
pub mod error;
pub mod geometry;
pub mod io;
pub mod kernel;
pub mod model;
pub mod pipeline;
pub mod scene;

pub use config::Config;
pub use error::{BuildError, KernelError, Result, XcsgError};
pub use geometry::{BooleanOp, Mesh, Polyhedron, Polyset};
pub use io::{ExportDispatcher, Format, FormatSet};
pub use model::{build, ModelGraph};
pub use pipeline::{Pipeline, RunSummary};
pub use scene::{SceneNode, SceneTree};

/// Process one input file with the built-in kernels
pub fn process_file(path: impl AsRef<std::path::Path>, formats: FormatSet, config: Config) -> Result<RunSummary> {
    Pipeline::new(config)?.run_file(path.as_ref(), formats)
}
