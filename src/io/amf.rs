// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! AMF exporter, one object per connected lump

use crate::geometry::Mesh;
use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Export mesh to AMF
pub fn write(mesh: &Mesh, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = Writer::new_with_indent(BufWriter::new(file), b' ', 1);

    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("utf-8"), None)))?;
    let mut amf = BytesStart::new("amf");
    amf.push_attribute(("unit", "millimeter"));
    amf.push_attribute(("version", "1.1"));
    writer.write_event(Event::Start(amf))?;

    let mut producer = BytesStart::new("metadata");
    producer.push_attribute(("type", "producer"));
    writer.write_event(Event::Start(producer))?;
    writer.write_event(Event::Text(BytesText::new("xcsg")))?;
    writer.write_event(Event::End(BytesEnd::new("metadata")))?;

    for (id, lump) in mesh.lumps().iter().enumerate() {
        write_object(&mut writer, id, lump)?;
    }

    writer.write_event(Event::End(BytesEnd::new("amf")))?;
    writer.into_inner().flush()?;
    Ok(())
}

fn write_object<W: Write>(writer: &mut Writer<W>, id: usize, lump: &Mesh) -> Result<()> {
    let id = id.to_string();
    let mut object = BytesStart::new("object");
    object.push_attribute(("id", id.as_str()));
    writer.write_event(Event::Start(object))?;
    open(writer, "mesh")?;

    open(writer, "vertices")?;
    for v in &lump.vertices {
        open(writer, "vertex")?;
        open(writer, "coordinates")?;
        value(writer, "x", v.x)?;
        value(writer, "y", v.y)?;
        value(writer, "z", v.z)?;
        close(writer, "coordinates")?;
        close(writer, "vertex")?;
    }
    close(writer, "vertices")?;

    open(writer, "volume")?;
    for t in &lump.triangles {
        open(writer, "triangle")?;
        value(writer, "v1", t.indices[0])?;
        value(writer, "v2", t.indices[1])?;
        value(writer, "v3", t.indices[2])?;
        close(writer, "triangle")?;
    }
    close(writer, "volume")?;

    close(writer, "mesh")?;
    close(writer, "object")?;
    Ok(())
}

fn open<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    writer.write_event(Event::Start(BytesStart::new(name)))?;
    Ok(())
}

fn close<W: Write>(writer: &mut Writer<W>, name: &str) -> Result<()> {
    writer.write_event(Event::End(BytesEnd::new(name)))?;
    Ok(())
}

fn value<W: Write>(writer: &mut Writer<W>, name: &str, content: impl ToString) -> Result<()> {
    open(writer, name)?;
    writer.write_event(Event::Text(BytesText::new(&content.to_string())))?;
    close(writer, name)
}
