// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Builds model graphs from classified scene nodes

use super::catalog::{classify, NodeClass, ShapeTag, SolidTag};
use super::graph::{CsgNode, ModelGraph, ModelTree};
use crate::error::BuildError;
use crate::geometry::{Polygon2d, Polyhedron, Primitive, Profile};
use crate::scene::SceneNode;
use nalgebra::{Matrix4, Point2, Point3, Vector3};
use std::str::FromStr;

type BuildResult<T> = Result<T, BuildError>;

/// Build the model graph rooted at `node`
pub fn build(node: &SceneNode) -> BuildResult<ModelGraph> {
    match classify(node) {
        NodeClass::Solid(tag) => Ok(ModelGraph::Solid(ModelTree::new(build_solid(node, tag)?))),
        NodeClass::Shape2d(tag) => Ok(ModelGraph::Shape2d(ModelTree::new(build_shape(node, tag)?))),
        NodeClass::None => Err(BuildError::UnknownTag(node.tag().to_string())),
    }
}

fn build_solid(node: &SceneNode, tag: SolidTag) -> BuildResult<CsgNode<Primitive>> {
    let built = match tag {
        SolidTag::Cube => {
            let size = positive(node, "size", required(node, "size")?)?;
            CsgNode::leaf(Primitive::cube(Vector3::repeat(size), flag(node, "center")?))
        }
        SolidTag::Cuboid => {
            let dx = positive(node, "dx", required(node, "dx")?)?;
            let dy = positive(node, "dy", required(node, "dy")?)?;
            let dz = positive(node, "dz", required(node, "dz")?)?;
            CsgNode::leaf(Primitive::cube(Vector3::new(dx, dy, dz), flag(node, "center")?))
        }
        SolidTag::Sphere => {
            let r = positive(node, "r", required(node, "r")?)?;
            CsgNode::leaf(Primitive::sphere(r))
        }
        SolidTag::Cylinder => {
            let r = positive(node, "r", required(node, "r")?)?;
            let h = positive(node, "h", required(node, "h")?)?;
            CsgNode::leaf(Primitive::cylinder(r, h, flag(node, "center")?))
        }
        SolidTag::Cone => {
            let r1: f64 = required(node, "r1")?;
            let r2: f64 = required(node, "r2")?;
            let h = positive(node, "h", required(node, "h")?)?;
            if r1 < 0.0 || r2 < 0.0 || (r1 == 0.0 && r2 == 0.0) {
                return Err(malformed(node, "cone radii must be non-negative and not both zero"));
            }
            CsgNode::leaf(Primitive::cone(r1, r2, h, flag(node, "center")?))
        }
        SolidTag::Polyhedron => CsgNode::leaf(Primitive::Polyhedron(polyhedron(node)?)),
        SolidTag::Union3d | SolidTag::Difference3d | SolidTag::Intersection3d => {
            let mut operands = Vec::new();
            for child in operand_nodes(node)? {
                match classify(child) {
                    NodeClass::Solid(child_tag) => operands.push(build_solid(child, child_tag)?),
                    NodeClass::Shape2d(_) => return Err(mixed(node, child)),
                    NodeClass::None => return Err(BuildError::UnknownTag(child.tag().to_string())),
                }
            }
            match tag.boolean_op() {
                Some(op) => CsgNode::boolean(op, operands),
                None => return Err(malformed(node, "not a combinator")),
            }
        }
    };
    Ok(built.with_transform(transform(node)?))
}

fn build_shape(node: &SceneNode, tag: ShapeTag) -> BuildResult<CsgNode<Profile>> {
    let built = match tag {
        ShapeTag::Circle => {
            let r = positive(node, "r", required(node, "r")?)?;
            CsgNode::leaf(Profile::Circle { r })
        }
        ShapeTag::Square => {
            let size = positive(node, "size", required(node, "size")?)?;
            CsgNode::leaf(Profile::Rectangle {
                dx: size,
                dy: size,
                center: flag(node, "center")?,
            })
        }
        ShapeTag::Rectangle => {
            let dx = positive(node, "dx", required(node, "dx")?)?;
            let dy = positive(node, "dy", required(node, "dy")?)?;
            CsgNode::leaf(Profile::Rectangle {
                dx,
                dy,
                center: flag(node, "center")?,
            })
        }
        ShapeTag::Polygon => CsgNode::leaf(Profile::Polygon(polygon(node)?)),
        ShapeTag::Union2d | ShapeTag::Difference2d | ShapeTag::Intersection2d => {
            let mut operands = Vec::new();
            for child in operand_nodes(node)? {
                match classify(child) {
                    NodeClass::Shape2d(child_tag) => operands.push(build_shape(child, child_tag)?),
                    NodeClass::Solid(_) => return Err(mixed(node, child)),
                    NodeClass::None => return Err(BuildError::UnknownTag(child.tag().to_string())),
                }
            }
            match tag.boolean_op() {
                Some(op) => CsgNode::boolean(op, operands),
                None => return Err(malformed(node, "not a combinator")),
            }
        }
    };
    Ok(built.with_transform(transform(node)?))
}

/// Non-metadata children of a combinator, at least one
fn operand_nodes(node: &SceneNode) -> BuildResult<Vec<&SceneNode>> {
    let operands: Vec<&SceneNode> = node.children().iter().filter(|c| !c.is_metadata()).collect();
    if operands.is_empty() {
        return Err(BuildError::NoOperands(node.tag().to_string()));
    }
    Ok(operands)
}

fn required<T: FromStr>(node: &SceneNode, key: &str) -> BuildResult<T> {
    match node.parse_property(key) {
        Some(Ok(value)) => Ok(value),
        Some(Err(raw)) => Err(invalid(node, key, raw)),
        None => Err(BuildError::MissingProperty {
            tag: node.tag().to_string(),
            key: key.to_string(),
        }),
    }
}

fn positive(node: &SceneNode, key: &str, value: f64) -> BuildResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(invalid(node, key, value.to_string()))
    }
}

/// Boolean flag; absent means false
fn flag(node: &SceneNode, key: &str) -> BuildResult<bool> {
    match node.property(key).map(str::trim) {
        None => Ok(false),
        Some("true") | Some("1") => Ok(true),
        Some("false") | Some("0") => Ok(false),
        Some(raw) => Err(invalid(node, key, raw.to_string())),
    }
}

/// Local transform from an optional `tmatrix` child of four `trow` rows
fn transform(node: &SceneNode) -> BuildResult<Matrix4<f64>> {
    let Some(tmatrix) = node.child("tmatrix") else {
        return Ok(Matrix4::identity());
    };

    let rows: Vec<&SceneNode> = tmatrix.children().iter().filter(|c| c.tag() == "trow").collect();
    if rows.len() != 4 {
        return Err(malformed(
            tmatrix,
            &format!("expected 4 <trow> rows, found {}", rows.len()),
        ));
    }

    let mut matrix = Matrix4::identity();
    for (i, row) in rows.iter().enumerate() {
        for j in 0..4 {
            let value: f64 = required(row, &format!("c{}", j))?;
            if !value.is_finite() {
                return Err(invalid(row, &format!("c{}", j), value.to_string()));
            }
            matrix[(i, j)] = value;
        }
    }
    Ok(matrix)
}

fn polyhedron(node: &SceneNode) -> BuildResult<Polyhedron> {
    let vertices_node = node
        .child("vertices")
        .ok_or_else(|| malformed(node, "missing <vertices>"))?;
    let faces_node = node
        .child("faces")
        .ok_or_else(|| malformed(node, "missing <faces>"))?;

    let vertices = vertices_node
        .children()
        .iter()
        .filter(|c| c.tag() == "vertex")
        .map(|v| Ok(Point3::new(required(v, "x")?, required(v, "y")?, required(v, "z")?)))
        .collect::<BuildResult<Vec<_>>>()?;

    let mut faces = Vec::new();
    for face in faces_node.children().iter().filter(|c| c.tag() == "face") {
        let indices = face
            .children()
            .iter()
            .filter(|c| c.tag() == "fv")
            .map(|fv| required::<usize>(fv, "index"))
            .collect::<BuildResult<Vec<_>>>()?;
        if indices.len() < 3 {
            return Err(malformed(node, &format!("face {} has fewer than 3 vertices", faces.len())));
        }
        if let Some(bad) = indices.iter().find(|&&i| i >= vertices.len()) {
            return Err(malformed(node, &format!("face index {} out of range", bad)));
        }
        faces.push(indices);
    }

    if vertices.len() < 4 || faces.len() < 4 {
        return Err(malformed(node, "a polyhedron needs at least 4 vertices and 4 faces"));
    }
    Ok(Polyhedron::new(vertices, faces))
}

fn polygon(node: &SceneNode) -> BuildResult<Polygon2d> {
    let vertices_node = node
        .child("vertices")
        .ok_or_else(|| malformed(node, "missing <vertices>"))?;
    let points = vertices_node
        .children()
        .iter()
        .filter(|c| c.tag() == "vertex")
        .map(|v| Ok(Point2::new(required(v, "x")?, required(v, "y")?)))
        .collect::<BuildResult<Vec<_>>>()?;
    if points.len() < 3 {
        return Err(malformed(node, "a polygon needs at least 3 vertices"));
    }
    Ok(Polygon2d::new(points))
}

fn invalid(node: &SceneNode, key: &str, value: String) -> BuildError {
    BuildError::InvalidProperty {
        tag: node.tag().to_string(),
        key: key.to_string(),
        value,
    }
}

fn malformed(node: &SceneNode, reason: &str) -> BuildError {
    BuildError::Malformed {
        tag: node.tag().to_string(),
        reason: reason.to_string(),
    }
}

fn mixed(parent: &SceneNode, child: &SceneNode) -> BuildError {
    BuildError::MixedOperand {
        parent: parent.tag().to_string(),
        child: child.tag().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::BooleanOp;
    use crate::model::graph::CsgKind;

    fn cube(size: f64) -> SceneNode {
        SceneNode::new("cube").with_property("size", size)
    }

    fn trow(values: [f64; 4]) -> SceneNode {
        SceneNode::new("trow")
            .with_property("c0", values[0])
            .with_property("c1", values[1])
            .with_property("c2", values[2])
            .with_property("c3", values[3])
    }

    #[test]
    fn test_build_cube() {
        let graph = build(&cube(2.0).with_property("center", true)).unwrap();
        let ModelGraph::Solid(tree) = graph else {
            panic!("expected a solid");
        };
        assert_eq!(tree.nbool(), 0);
        assert_eq!(
            tree.root().kind,
            CsgKind::Leaf(Primitive::cube(Vector3::new(2.0, 2.0, 2.0), true))
        );
    }

    #[test]
    fn test_combinators_keep_child_order() {
        let node = SceneNode::new("difference3d")
            .with_child(cube(3.0))
            .with_child(SceneNode::new("union3d").with_child(cube(1.0)).with_child(cube(2.0)));
        let graph = build(&node).unwrap();
        assert_eq!(graph.nbool(), 2);

        let ModelGraph::Solid(tree) = graph else {
            panic!("expected a solid");
        };
        let CsgKind::Boolean { op, operands } = &tree.root().kind else {
            panic!("expected a combinator");
        };
        assert_eq!(*op, BooleanOp::Difference);
        assert_eq!(operands.len(), 2);
        assert!(matches!(operands[0].kind, CsgKind::Leaf(_)));
    }

    #[test]
    fn test_tmatrix_is_parsed_row_major() {
        let node = cube(1.0).with_child(SceneNode::new("tmatrix").with_children([
            trow([1.0, 0.0, 0.0, 5.0]),
            trow([0.0, 1.0, 0.0, 6.0]),
            trow([0.0, 0.0, 1.0, 7.0]),
            trow([0.0, 0.0, 0.0, 1.0]),
        ]));
        let ModelGraph::Solid(tree) = build(&node).unwrap() else {
            panic!("expected a solid");
        };
        assert_eq!(tree.root().transform, Matrix4::new_translation(&Vector3::new(5.0, 6.0, 7.0)));
    }

    #[test]
    fn test_short_tmatrix_is_rejected() {
        let node = cube(1.0).with_child(SceneNode::new("tmatrix").with_child(trow([1.0, 0.0, 0.0, 0.0])));
        assert!(matches!(build(&node), Err(BuildError::Malformed { .. })));
    }

    #[test]
    fn test_missing_and_invalid_properties() {
        assert_eq!(
            build(&SceneNode::new("sphere")),
            Err(BuildError::MissingProperty {
                tag: "sphere".into(),
                key: "r".into()
            })
        );
        assert!(matches!(
            build(&SceneNode::new("circle").with_property("r", "wide")),
            Err(BuildError::InvalidProperty { .. })
        ));
        assert!(matches!(
            build(&cube(1.0).with_property("center", "maybe")),
            Err(BuildError::InvalidProperty { .. })
        ));
    }

    #[test]
    fn test_structural_failures() {
        assert_eq!(
            build(&SceneNode::new("union3d")),
            Err(BuildError::NoOperands("union3d".into()))
        );
        assert_eq!(
            build(&SceneNode::new("teapot")),
            Err(BuildError::UnknownTag("teapot".into()))
        );
        let mixed_node = SceneNode::new("union3d")
            .with_child(cube(1.0))
            .with_child(SceneNode::new("circle").with_property("r", 1));
        assert_eq!(
            build(&mixed_node),
            Err(BuildError::MixedOperand {
                parent: "union3d".into(),
                child: "circle".into()
            })
        );
    }

    #[test]
    fn test_build_polygon_and_polyhedron() {
        let vertex2 = |x: f64, y: f64| SceneNode::new("vertex").with_property("x", x).with_property("y", y);
        let polygon_node = SceneNode::new("polygon").with_child(SceneNode::new("vertices").with_children([
            vertex2(0.0, 0.0),
            vertex2(1.0, 0.0),
            vertex2(0.0, 1.0),
        ]));
        assert!(matches!(build(&polygon_node), Ok(ModelGraph::Shape2d(_))));

        let vertex3 = |x: f64, y: f64, z: f64| {
            SceneNode::new("vertex")
                .with_property("x", x)
                .with_property("y", y)
                .with_property("z", z)
        };
        let face = |idx: [usize; 3]| {
            SceneNode::new("face").with_children(idx.map(|i| SceneNode::new("fv").with_property("index", i)))
        };
        let tetra = SceneNode::new("polyhedron")
            .with_child(SceneNode::new("vertices").with_children([
                vertex3(0.0, 0.0, 0.0),
                vertex3(1.0, 0.0, 0.0),
                vertex3(0.0, 1.0, 0.0),
                vertex3(0.0, 0.0, 1.0),
            ]))
            .with_child(SceneNode::new("faces").with_children([
                face([0, 2, 1]),
                face([0, 1, 3]),
                face([1, 2, 3]),
                face([0, 3, 2]),
            ]));
        let ModelGraph::Solid(tree) = build(&tetra).unwrap() else {
            panic!("expected a solid");
        };
        let CsgKind::Leaf(Primitive::Polyhedron(p)) = &tree.root().kind else {
            panic!("expected a polyhedron leaf");
        };
        assert!(p.check().is_closed());
    }
}
