// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Wavefront OBJ exporter

use crate::geometry::Mesh;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Export mesh to OBJ (1-based face indices)
pub fn write(mesh: &Mesh, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(file);

    writeln!(w, "# xcsg {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(w, "# {} vertices, {} triangles", mesh.vertex_count(), mesh.triangle_count())?;
    for v in &mesh.vertices {
        writeln!(w, "v {} {} {}", v.x, v.y, v.z)?;
    }
    for t in &mesh.triangles {
        let [a, b, c] = t.indices;
        writeln!(w, "f {} {} {}", a + 1, b + 1, c + 1)?;
    }
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Triangle;
    use nalgebra::Point3;

    #[test]
    fn test_obj_indices_are_one_based() {
        let mut mesh = Mesh::new();
        mesh.add_vertex(Point3::new(0.0, 0.0, 0.0));
        mesh.add_vertex(Point3::new(1.5, 0.0, 0.0));
        mesh.add_vertex(Point3::new(0.0, 1.0, 0.0));
        mesh.add_triangle(Triangle::new([0, 1, 2]));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.obj");
        write(&mesh, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("v 1.5 0 0\n"));
        assert!(text.contains("f 1 2 3\n"));
    }
}
