// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! I/O module - OpenSCAD import and export encoders

mod amf;
mod dxf;
mod export;
mod importer;
mod obj;
mod off;
mod openscad;
mod parser;
mod stl;
mod svg;

pub use export::{ExportArtifact, ExportDispatcher, Format, FormatSet};
pub use importer::{convert_csg, import_csg_file};
pub use parser::{parse_csg, Args, Call, Value};
