// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! SVG exporter for 2D profiles

use crate::geometry::Polyset;
use anyhow::{Context, Result};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::Writer;
use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Path data for all loops; y is flipped so the drawing is not mirrored
fn path_data(polyset: &Polyset) -> String {
    let mut d = String::new();
    for polygon in polyset {
        for (i, p) in polygon.points.iter().enumerate() {
            let cmd = if i == 0 { "M" } else { "L" };
            let _ = write!(d, "{}{} {} ", cmd, p.x, 0.0 - p.y);
        }
        d.push_str("Z ");
    }
    d.trim_end().to_string()
}

/// Export profile to SVG, millimeter units
pub fn write(polyset: &Polyset, path: &Path) -> Result<()> {
    let bbox = polyset.bounding_box();
    let size = bbox.size();
    let (min_x, min_y) = if bbox.is_empty() {
        (0.0, 0.0)
    } else {
        (bbox.min.x, 0.0 - bbox.max.y)
    };

    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut writer = Writer::new_with_indent(BufWriter::new(file), b' ', 2);
    writer.write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("no"))))?;

    let width = format!("{}mm", size.x);
    let height = format!("{}mm", size.y);
    let view_box = format!("{} {} {} {}", min_x, min_y, size.x, size.y);
    let mut svg = BytesStart::new("svg");
    svg.push_attribute(("xmlns", "http://www.w3.org/2000/svg"));
    svg.push_attribute(("version", "1.1"));
    svg.push_attribute(("width", width.as_str()));
    svg.push_attribute(("height", height.as_str()));
    svg.push_attribute(("viewBox", view_box.as_str()));
    writer.write_event(Event::Start(svg))?;

    if !polyset.is_empty() {
        let d = path_data(polyset);
        let stroke_width = (size.x.max(size.y) * 1e-3).to_string();
        let mut element = BytesStart::new("path");
        element.push_attribute(("d", d.as_str()));
        element.push_attribute(("fill", "lightgray"));
        element.push_attribute(("fill-rule", "evenodd"));
        element.push_attribute(("stroke", "black"));
        element.push_attribute(("stroke-width", stroke_width.as_str()));
        writer.write_event(Event::Empty(element))?;
    }

    writer.write_event(Event::End(BytesEnd::new("svg")))?;
    writer.into_inner().flush()?;
    Ok(())
}
