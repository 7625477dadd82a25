// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! OpenSCAD csg exporter

use crate::geometry::{Mesh, Polyset};
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

fn create(path: &Path) -> Result<BufWriter<File>> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    Ok(BufWriter::new(file))
}

fn join<T>(items: impl Iterator<Item = T>, f: impl Fn(T) -> String) -> String {
    items.map(f).collect::<Vec<_>>().join(",")
}

/// Export each mesh lump as a `polyhedron`
pub fn write_mesh(mesh: &Mesh, path: &Path) -> Result<()> {
    let mut w = create(path)?;
    let lumps = mesh.lumps();
    if lumps.len() > 1 {
        writeln!(w, "group() {{")?;
    }
    for lump in &lumps {
        let points = join(lump.vertices.iter(), |v| format!("[{},{},{}]", v.x, v.y, v.z));
        // OpenSCAD expects clockwise faces seen from outside
        let faces = join(lump.triangles.iter(), |t| {
            format!("[{},{},{}]", t.indices[0], t.indices[2], t.indices[1])
        });
        writeln!(w, "polyhedron(points=[{}],faces=[{}],convexity=10);", points, faces)?;
    }
    if lumps.len() > 1 {
        writeln!(w, "}}")?;
    }
    w.flush()?;
    Ok(())
}

/// Export a profile as a single `polygon` with one path per loop
pub fn write_polyset(polyset: &Polyset, path: &Path) -> Result<()> {
    let mut w = create(path)?;
    let points = join(polyset.iter().flat_map(|l| l.points.iter()), |p| {
        format!("[{},{}]", p.x, p.y)
    });

    let mut start = 0;
    let mut paths = Vec::with_capacity(polyset.len());
    for polygon in polyset {
        paths.push(format!("[{}]", join(start..start + polygon.len(), |i| i.to_string())));
        start += polygon.len();
    }

    writeln!(w, "polygon(points=[{}],paths=[{}]);", points, paths.join(","))?;
    w.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::{Polygon2d, Triangle};
    use nalgebra::{Point2, Point3};

    #[test]
    fn test_polyhedron_statement() {
        let mut mesh = Mesh::new();
        for p in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]] {
            mesh.add_vertex(Point3::from(p));
        }
        for t in [[0, 2, 1], [0, 1, 3], [1, 2, 3], [0, 3, 2]] {
            mesh.add_triangle(Triangle::new(t));
        }

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("m.csg");
        write_mesh(&mesh, &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("polyhedron(points=[[0,0,0],[1,0,0],[0,1,0],[0,0,1]],faces=[[0,1,2],"));
        assert!(!text.contains("group()"));
    }

    #[test]
    fn test_polygon_paths() {
        let outer = Polygon2d::new(vec![
            Point2::new(0.0, 0.0),
            Point2::new(4.0, 0.0),
            Point2::new(4.0, 4.0),
            Point2::new(0.0, 4.0),
        ]);
        let hole = Polygon2d::new(vec![Point2::new(1.0, 1.0), Point2::new(1.0, 2.0), Point2::new(2.0, 1.0)]);

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("p.csg");
        write_polyset(&Polyset::from_loops(vec![outer, hole]), &path).unwrap();
        let text = std::fs::read_to_string(&path).unwrap();
        assert!(text.contains("paths=[[0,1,2,3],[4,5,6]]"));
    }
}
