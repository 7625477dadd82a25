// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Export dispatch - writes enabled formats in a fixed order

use super::{amf, dxf, obj, off, openscad, stl, svg};
use crate::error::{Result, XcsgError};
use crate::geometry::{Mesh, Polyset};
use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Csg,
    Amf,
    Obj,
    Off,
    Stl,
    AsciiStl,
    Svg,
    Dxf,
}

impl Format {
    pub fn extension(self) -> &'static str {
        match self {
            Format::Csg => "csg",
            Format::Amf => "amf",
            Format::Obj => "obj",
            Format::Off => "off",
            Format::Stl | Format::AsciiStl => "stl",
            Format::Svg => "svg",
            Format::Dxf => "dxf",
        }
    }

    /// Name used in user-facing messages
    pub fn label(self) -> &'static str {
        match self {
            Format::Csg => "OpenSCAD",
            Format::Amf => "AMF",
            Format::Obj => "OBJ",
            Format::Off => "OFF",
            Format::Stl | Format::AsciiStl => "STL",
            Format::Svg => "SVG",
            Format::Dxf => "DXF",
        }
    }
}

/// Write order for solids. At most one STL variant is written, binary taking precedence.
const SOLID_ORDER: [Format; 4] = [Format::Csg, Format::Amf, Format::Obj, Format::Off];
const SHAPE_ORDER: [Format; 3] = [Format::Csg, Format::Svg, Format::Dxf];

/// The set of formats requested for a run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormatSet {
    enabled: Vec<Format>,
}

impl FormatSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, format: Format) -> Self {
        self.insert(format);
        self
    }

    pub fn insert(&mut self, format: Format) {
        if !self.enabled.contains(&format) {
            self.enabled.push(format);
        }
    }

    pub fn contains(&self, format: Format) -> bool {
        self.enabled.contains(&format)
    }

    pub fn is_empty(&self) -> bool {
        self.enabled.is_empty()
    }

    /// Formats to write for a solid, in write order
    pub fn solid_plan(&self) -> Vec<Format> {
        let mut plan: Vec<Format> = SOLID_ORDER.into_iter().filter(|f| self.contains(*f)).collect();
        if self.contains(Format::Stl) {
            plan.push(Format::Stl);
        } else if self.contains(Format::AsciiStl) {
            plan.push(Format::AsciiStl);
        }
        plan
    }

    /// Formats to write for a 2D profile, in write order
    pub fn shape_plan(&self) -> Vec<Format> {
        SHAPE_ORDER.into_iter().filter(|f| self.contains(*f)).collect()
    }
}

impl FromIterator<Format> for FormatSet {
    fn from_iter<I: IntoIterator<Item = Format>>(iter: I) -> Self {
        let mut set = FormatSet::new();
        for format in iter {
            set.insert(format);
        }
        set
    }
}

/// A file written by the dispatcher
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportArtifact {
    pub format: Format,
    pub path: PathBuf,
}

/// Writes each enabled format once, next to the input file
#[derive(Debug, Clone)]
pub struct ExportDispatcher {
    base: PathBuf,
    formats: FormatSet,
    csg_input: bool,
}

impl ExportDispatcher {
    /// `base` is the output path without extension
    pub fn new(base: impl Into<PathBuf>, formats: FormatSet) -> Self {
        Self {
            base: base.into(),
            formats,
            csg_input: false,
        }
    }

    /// Dispatcher writing next to `input`. A `.csg` input is never overwritten.
    pub fn for_input(input: &Path, formats: FormatSet) -> Self {
        let csg_input = input.extension().is_some_and(|e| e == "csg");
        Self {
            base: input.with_extension(""),
            formats,
            csg_input,
        }
    }

    pub fn path_for(&self, format: Format) -> PathBuf {
        let mut name: OsString = self.base.clone().into_os_string();
        if format == Format::Csg && self.csg_input {
            name.push("_out");
        }
        name.push(".");
        name.push(format.extension());
        PathBuf::from(name)
    }

    pub fn export_mesh(&self, mesh: &Mesh) -> Result<Vec<ExportArtifact>> {
        self.run(self.formats.solid_plan(), |format, path| match format {
            Format::Csg => openscad::write_mesh(mesh, path),
            Format::Amf => amf::write(mesh, path),
            Format::Obj => obj::write(mesh, path),
            Format::Off => off::write(mesh, path),
            Format::Stl => stl::write_binary(mesh, path),
            Format::AsciiStl => stl::write_ascii(mesh, path),
            Format::Svg | Format::Dxf => Ok(()),
        })
    }

    pub fn export_polyset(&self, polyset: &Polyset) -> Result<Vec<ExportArtifact>> {
        self.run(self.formats.shape_plan(), |format, path| match format {
            Format::Csg => openscad::write_polyset(polyset, path),
            Format::Svg => svg::write(polyset, path),
            Format::Dxf => dxf::write(polyset, path),
            _ => Ok(()),
        })
    }

    fn run(
        &self,
        plan: Vec<Format>,
        mut encode: impl FnMut(Format, &Path) -> anyhow::Result<()>,
    ) -> Result<Vec<ExportArtifact>> {
        let mut artifacts = Vec::with_capacity(plan.len());
        let mut previous: Option<SystemTime> = None;

        for format in plan {
            let path = self.path_for(format);
            encode(format, &path).map_err(|e| XcsgError::Export {
                format: format.label(),
                message: format!("{:#}", e),
            })?;
            previous = Some(ensure_later(&path, previous)?);
            tracing::debug!("wrote {} file {}", format.label(), path.display());
            artifacts.push(ExportArtifact { format, path });
        }
        Ok(artifacts)
    }
}

/// Make the modification time of `path` strictly later than `previous`, returning it
fn ensure_later(path: &Path, previous: Option<SystemTime>) -> Result<SystemTime> {
    let modified = fs::metadata(path)?.modified()?;
    match previous {
        Some(prev) if modified <= prev => {
            let bumped = prev + Duration::from_millis(1);
            File::options().write(true).open(path)?.set_modified(bumped)?;
            Ok(bumped)
        }
        _ => Ok(modified),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_binary_stl_wins_over_ascii() {
        let set: FormatSet = [Format::AsciiStl, Format::Stl, Format::Obj, Format::Csg]
            .into_iter()
            .collect();
        assert_eq!(set.solid_plan(), vec![Format::Csg, Format::Obj, Format::Stl]);

        let ascii_only = FormatSet::new().with(Format::AsciiStl);
        assert_eq!(ascii_only.solid_plan(), vec![Format::AsciiStl]);
    }

    #[test]
    fn test_plans_ignore_other_dimension() {
        let set = FormatSet::new().with(Format::Svg).with(Format::Stl).with(Format::Dxf);
        assert_eq!(set.shape_plan(), vec![Format::Svg, Format::Dxf]);
        assert_eq!(set.solid_plan(), vec![Format::Stl]);
    }

    #[test]
    fn test_paths() {
        let dispatcher = ExportDispatcher::for_input(Path::new("/tmp/model.v2.xcsg"), FormatSet::new());
        assert_eq!(dispatcher.path_for(Format::Stl), PathBuf::from("/tmp/model.v2.stl"));
        assert_eq!(dispatcher.path_for(Format::Csg), PathBuf::from("/tmp/model.v2.csg"));

        let from_csg = ExportDispatcher::for_input(Path::new("/tmp/model.csg"), FormatSet::new());
        assert_eq!(from_csg.path_for(Format::Csg), PathBuf::from("/tmp/model_out.csg"));
        assert_eq!(from_csg.path_for(Format::AsciiStl), PathBuf::from("/tmp/model.stl"));
    }

    #[test]
    fn test_artifacts_in_write_order_with_increasing_mtime() {
        let dir = tempfile::tempdir().unwrap();
        let set = FormatSet::new()
            .with(Format::Dxf)
            .with(Format::Svg)
            .with(Format::Csg);
        let dispatcher = ExportDispatcher::new(dir.path().join("p"), set);

        let square = crate::geometry::Profile::Rectangle {
            dx: 1.0,
            dy: 1.0,
            center: false,
        }
        .to_polygon(0.01);
        let artifacts = dispatcher.export_polyset(&Polyset::from_loops(vec![square])).unwrap();

        let formats: Vec<Format> = artifacts.iter().map(|a| a.format).collect();
        assert_eq!(formats, vec![Format::Csg, Format::Svg, Format::Dxf]);

        let times: Vec<SystemTime> = artifacts
            .iter()
            .map(|a| fs::metadata(&a.path).unwrap().modified().unwrap())
            .collect();
        assert!(times.windows(2).all(|w| w[0] < w[1]));
    }
}
