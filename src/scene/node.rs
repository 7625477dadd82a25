// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene node definitions

use std::str::FromStr;

/// Tags that only carry data for their parent and never denote geometry
const METADATA_TAGS: &[&str] = &["tmatrix", "trow", "vertices", "vertex", "faces", "face", "fv"];

/// A single element of the scene tree.
///
/// Child order is boolean argument order and is preserved exactly as parsed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneNode {
    tag: String,
    properties: Vec<(String, String)>,
    children: Vec<SceneNode>,
}

impl SceneNode {
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            properties: Vec::new(),
            children: Vec::new(),
        }
    }

    /// Add or replace a property
    pub fn with_property(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        let key = key.into();
        let value = value.to_string();
        match self.properties.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.properties.push((key, value)),
        }
        self
    }

    pub fn with_child(mut self, child: SceneNode) -> Self {
        self.children.push(child);
        self
    }

    pub fn with_children(mut self, children: impl IntoIterator<Item = SceneNode>) -> Self {
        self.children.extend(children);
        self
    }

    pub fn tag(&self) -> &str {
        &self.tag
    }

    pub fn properties(&self) -> &[(String, String)] {
        &self.properties
    }

    pub fn children(&self) -> &[SceneNode] {
        &self.children
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Parse a property, returning `Err(raw)` with the raw text when it does not parse
    pub fn parse_property<T: FromStr>(&self, key: &str) -> Option<Result<T, String>> {
        self.property(key)
            .map(|raw| raw.trim().parse::<T>().map_err(|_| raw.to_string()))
    }

    /// First child with the given tag
    pub fn child(&self, tag: &str) -> Option<&SceneNode> {
        self.children.iter().find(|c| c.tag == tag)
    }

    /// Whether this node only carries data for its parent (transform rows, vertex lists)
    pub fn is_metadata(&self) -> bool {
        METADATA_TAGS.contains(&self.tag.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_property_replace_keeps_order() {
        let node = SceneNode::new("cube")
            .with_property("size", 1)
            .with_property("center", true)
            .with_property("size", 2);

        assert_eq!(node.properties().len(), 2);
        assert_eq!(node.properties()[0], ("size".to_string(), "2".to_string()));
        assert_eq!(node.property("center"), Some("true"));
    }

    #[test]
    fn test_parse_property() {
        let node = SceneNode::new("sphere").with_property("r", " 2.5 ").with_property("n", "x");
        assert_eq!(node.parse_property::<f64>("r"), Some(Ok(2.5)));
        assert_eq!(node.parse_property::<f64>("n"), Some(Err("x".to_string())));
        assert!(node.parse_property::<f64>("missing").is_none());
    }

    #[test]
    fn test_metadata_tags() {
        assert!(SceneNode::new("tmatrix").is_metadata());
        assert!(!SceneNode::new("cube").is_metadata());
    }
}
