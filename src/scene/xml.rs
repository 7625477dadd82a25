// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! XML reading and writing for scene trees

use super::SceneNode;
use crate::error::{Result, XcsgError};
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, Event};
use quick_xml::{Reader, Writer};
use std::fmt::Display;
use std::io::Cursor;

fn xml_error(origin: &str, message: impl Display) -> XcsgError {
    XcsgError::Xml {
        path: origin.to_string(),
        message: message.to_string(),
    }
}

fn node_from_start(start: &BytesStart, origin: &str) -> Result<SceneNode> {
    let tag = String::from_utf8_lossy(start.name().as_ref()).into_owned();
    let mut node = SceneNode::new(tag);
    for attr in start.attributes() {
        let attr = attr.map_err(|e| xml_error(origin, e))?;
        let key = String::from_utf8_lossy(attr.key.as_ref()).into_owned();
        let value = attr.unescape_value().map_err(|e| xml_error(origin, e))?;
        node = node.with_property(key, value);
    }
    Ok(node)
}

/// Parse a document into its root node
pub(super) fn parse(source: &str, origin: &str) -> Result<SceneNode> {
    let mut reader = Reader::from_str(source);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<SceneNode> = Vec::new();
    let mut root: Option<SceneNode> = None;

    loop {
        let event = reader
            .read_event()
            .map_err(|e| xml_error(origin, format!("{} at byte {}", e, reader.buffer_position())))?;

        match event {
            Event::Start(start) => stack.push(node_from_start(&start, origin)?),
            Event::Empty(start) => {
                let node = node_from_start(&start, origin)?;
                attach(&mut stack, &mut root, node, origin)?;
            }
            Event::End(_) => {
                let node = stack
                    .pop()
                    .ok_or_else(|| xml_error(origin, "unbalanced closing tag"))?;
                attach(&mut stack, &mut root, node, origin)?;
            }
            Event::Eof => break,
            // text, comments, declarations and processing instructions carry no geometry
            _ => {}
        }
    }

    if !stack.is_empty() {
        return Err(xml_error(origin, "unexpected end of document"));
    }
    root.ok_or_else(|| xml_error(origin, "document has no root element"))
}

fn attach(
    stack: &mut [SceneNode],
    root: &mut Option<SceneNode>,
    node: SceneNode,
    origin: &str,
) -> Result<()> {
    match stack.last_mut() {
        Some(parent) => {
            *parent = std::mem::take(parent).with_child(node);
            Ok(())
        }
        None if root.is_none() => {
            *root = Some(node);
            Ok(())
        }
        None => Err(xml_error(origin, "document has more than one root element")),
    }
}

/// Serialize a node tree as an indented XML document
pub(super) fn write(root: &SceneNode) -> Result<String> {
    let mut writer = Writer::new_with_indent(Cursor::new(Vec::new()), b' ', 3);
    writer
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))
        .map_err(|e| xml_error("<output>", e))?;
    write_node(&mut writer, root)?;

    String::from_utf8(writer.into_inner().into_inner()).map_err(|e| xml_error("<output>", e))
}

fn write_node(writer: &mut Writer<Cursor<Vec<u8>>>, node: &SceneNode) -> Result<()> {
    let mut start = BytesStart::new(node.tag());
    for (key, value) in node.properties() {
        start.push_attribute((key.as_str(), value.as_str()));
    }

    if node.children().is_empty() {
        writer
            .write_event(Event::Empty(start))
            .map_err(|e| xml_error("<output>", e))?;
        return Ok(());
    }

    writer
        .write_event(Event::Start(start))
        .map_err(|e| xml_error("<output>", e))?;
    for child in node.children() {
        write_node(writer, child)?;
    }
    writer
        .write_event(Event::End(BytesEnd::new(node.tag())))
        .map_err(|e| xml_error("<output>", e))?;
    Ok(())
}
