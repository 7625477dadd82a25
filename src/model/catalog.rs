// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Registry of scene tags and node classification

use crate::error::{Result, XcsgError};
use crate::geometry::BooleanOp;
use crate::scene::SceneNode;
use std::collections::HashSet;

/// Tags denoting 3D solids
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SolidTag {
    Cube,
    Cuboid,
    Sphere,
    Cylinder,
    Cone,
    Polyhedron,
    Union3d,
    Difference3d,
    Intersection3d,
}

impl SolidTag {
    pub const ALL: [SolidTag; 9] = [
        SolidTag::Cube,
        SolidTag::Cuboid,
        SolidTag::Sphere,
        SolidTag::Cylinder,
        SolidTag::Cone,
        SolidTag::Polyhedron,
        SolidTag::Union3d,
        SolidTag::Difference3d,
        SolidTag::Intersection3d,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SolidTag::Cube => "cube",
            SolidTag::Cuboid => "cuboid",
            SolidTag::Sphere => "sphere",
            SolidTag::Cylinder => "cylinder",
            SolidTag::Cone => "cone",
            SolidTag::Polyhedron => "polyhedron",
            SolidTag::Union3d => "union3d",
            SolidTag::Difference3d => "difference3d",
            SolidTag::Intersection3d => "intersection3d",
        }
    }

    pub fn from_name(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == tag)
    }

    /// The boolean applied by combinator tags
    pub fn boolean_op(self) -> Option<BooleanOp> {
        match self {
            SolidTag::Union3d => Some(BooleanOp::Union),
            SolidTag::Difference3d => Some(BooleanOp::Difference),
            SolidTag::Intersection3d => Some(BooleanOp::Intersection),
            _ => None,
        }
    }
}

/// Tags denoting 2D shapes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeTag {
    Circle,
    Square,
    Rectangle,
    Polygon,
    Union2d,
    Difference2d,
    Intersection2d,
}

impl ShapeTag {
    pub const ALL: [ShapeTag; 7] = [
        ShapeTag::Circle,
        ShapeTag::Square,
        ShapeTag::Rectangle,
        ShapeTag::Polygon,
        ShapeTag::Union2d,
        ShapeTag::Difference2d,
        ShapeTag::Intersection2d,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ShapeTag::Circle => "circle",
            ShapeTag::Square => "square",
            ShapeTag::Rectangle => "rectangle",
            ShapeTag::Polygon => "polygon",
            ShapeTag::Union2d => "union2d",
            ShapeTag::Difference2d => "difference2d",
            ShapeTag::Intersection2d => "intersection2d",
        }
    }

    pub fn from_name(tag: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.name() == tag)
    }

    pub fn boolean_op(self) -> Option<BooleanOp> {
        match self {
            ShapeTag::Union2d => Some(BooleanOp::Union),
            ShapeTag::Difference2d => Some(BooleanOp::Difference),
            ShapeTag::Intersection2d => Some(BooleanOp::Intersection),
            _ => None,
        }
    }
}

/// What a scene node denotes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeClass {
    Solid(SolidTag),
    Shape2d(ShapeTag),
    None,
}

/// Classify a node by its tag. Metadata nodes are never geometry.
pub fn classify(node: &SceneNode) -> NodeClass {
    if node.is_metadata() {
        return NodeClass::None;
    }
    if let Some(tag) = SolidTag::from_name(node.tag()) {
        return NodeClass::Solid(tag);
    }
    if let Some(tag) = ShapeTag::from_name(node.tag()) {
        return NodeClass::Shape2d(tag);
    }
    NodeClass::None
}

/// Check that every tag name is registered exactly once across both catalogs
pub fn validate() -> Result<()> {
    let mut seen = HashSet::new();
    let names = SolidTag::ALL
        .iter()
        .map(|t| t.name())
        .chain(ShapeTag::ALL.iter().map(|t| t.name()));
    for name in names {
        if !seen.insert(name) {
            return Err(XcsgError::Config(format!("tag <{}> registered twice", name)));
        }
        if SceneNode::new(name).is_metadata() {
            return Err(XcsgError::Config(format!("tag <{}> collides with a metadata tag", name)));
        }
    }
    Ok(())
}
