// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Scene tree - the parsed `.xcsg` document

mod node;
mod xml;

pub use node::SceneNode;

use crate::error::{Result, XcsgError};
use std::path::Path;

/// Tag of the scene root element
pub const SCENE_ROOT: &str = "xcsg";

/// A parsed scene document
#[derive(Debug, Clone, PartialEq)]
pub struct SceneTree {
    root: SceneNode,
}

impl SceneTree {
    pub fn new(root: SceneNode) -> Self {
        Self { root }
    }

    /// Read an `.xcsg` document from disk
    pub fn read_xml(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(XcsgError::InputNotFound(path.to_path_buf()));
        }
        let source = std::fs::read_to_string(path)?;
        xml::parse(&source, &path.display().to_string()).map(Self::new)
    }

    /// Parse an `.xcsg` document from text
    pub fn from_xml_str(source: &str) -> Result<Self> {
        xml::parse(source, "<string>").map(Self::new)
    }

    /// Serialize the tree to disk
    pub fn write_xml(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let text = self.to_xml_string()?;
        std::fs::write(path, text)?;
        Ok(())
    }

    pub fn to_xml_string(&self) -> Result<String> {
        xml::write(&self.root)
    }

    pub fn root(&self) -> &SceneNode {
        &self.root
    }

    /// The root, checked to be a scene root
    pub fn scene_root(&self) -> Result<&SceneNode> {
        if self.root.tag() == SCENE_ROOT {
            Ok(&self.root)
        } else {
            Err(XcsgError::NotScene(self.root.tag().to_string()))
        }
    }

    /// Scene-wide secant tolerance, or `default` when the root does not set one
    pub fn secant_tolerance(&self, default: f64) -> Result<f64> {
        match self.root.parse_property::<f64>("secant_tolerance") {
            None => Ok(default),
            Some(Ok(tol)) if tol > 0.0 => Ok(tol),
            Some(Ok(tol)) => Err(XcsgError::Config(format!(
                "secant_tolerance must be positive, got {}",
                tol
            ))),
            Some(Err(raw)) => Err(XcsgError::Config(format!(
                "secant_tolerance '{}' is not a number",
                raw
            ))),
        }
    }

    /// Children of the root, in document order
    pub fn iter(&self) -> impl Iterator<Item = &SceneNode> {
        self.root.children().iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secant_tolerance_default_and_override() {
        let tree = SceneTree::new(SceneNode::new(SCENE_ROOT));
        assert_eq!(tree.secant_tolerance(0.01).unwrap(), 0.01);

        let tree = SceneTree::new(SceneNode::new(SCENE_ROOT).with_property("secant_tolerance", 0.2));
        assert_eq!(tree.secant_tolerance(0.01).unwrap(), 0.2);

        let tree = SceneTree::new(SceneNode::new(SCENE_ROOT).with_property("secant_tolerance", "abc"));
        assert!(tree.secant_tolerance(0.01).is_err());
    }

    #[test]
    fn test_scene_root_check() {
        let tree = SceneTree::new(SceneNode::new("svg"));
        assert!(matches!(tree.scene_root(), Err(XcsgError::NotScene(tag)) if tag == "svg"));
    }

    #[test]
    fn test_read_missing_file() {
        let result = SceneTree::read_xml("/definitely/not/here.xcsg");
        assert!(matches!(result, Err(XcsgError::InputNotFound(_))));
    }
}
