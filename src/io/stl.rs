// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! STL exporter (binary and ASCII)

use crate::geometry::Mesh;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

fn facet_normal(mesh: &Mesh, index: usize) -> [f32; 3] {
    let n = mesh.triangle_normal(&mesh.triangles[index]);
    [n.x as f32, n.y as f32, n.z as f32]
}

/// Export mesh to binary STL
pub fn write_binary(mesh: &Mesh, path: &Path) -> Result<()> {
    use stl_io::{Normal, Triangle as StlTriangle, Vertex as StlVertex};

    let triangles: Vec<StlTriangle> = (0..mesh.triangle_count())
        .map(|i| {
            let [v0, v1, v2] = mesh.corners(&mesh.triangles[i]);
            StlTriangle {
                normal: Normal::new(facet_normal(mesh, i)),
                vertices: [
                    StlVertex::new([v0.x as f32, v0.y as f32, v0.z as f32]),
                    StlVertex::new([v1.x as f32, v1.y as f32, v1.z as f32]),
                    StlVertex::new([v2.x as f32, v2.y as f32, v2.z as f32]),
                ],
            }
        })
        .collect();

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = BufWriter::new(file);
    stl_io::write_stl(&mut writer, triangles.iter()).context("STL export error")?;
    writer.flush()?;
    Ok(())
}

/// Export mesh to ASCII STL
pub fn write_ascii(mesh: &Mesh, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(file);
    let name = path.file_stem().and_then(|s| s.to_str()).unwrap_or("xcsg");

    writeln!(w, "solid {}", name)?;
    for i in 0..mesh.triangle_count() {
        let [nx, ny, nz] = facet_normal(mesh, i);
        writeln!(w, "  facet normal {:e} {:e} {:e}", nx, ny, nz)?;
        writeln!(w, "    outer loop")?;
        for v in mesh.corners(&mesh.triangles[i]) {
            writeln!(w, "      vertex {:e} {:e} {:e}", v.x as f32, v.y as f32, v.z as f32)?;
        }
        writeln!(w, "    endloop")?;
        writeln!(w, "  endfacet")?;
    }
    writeln!(w, "endsolid {}", name)?;
    w.flush()?;
    Ok(())
}
