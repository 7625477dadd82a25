// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Converts OpenSCAD .csg files into xcsg scene trees
//!
//! Transforms are pushed down to the leaves, so `multmatrix` and `group` only add a
//! combinator when they hold more than one child.

use super::parser::{parse_csg, Args, Call, Value};
use crate::error::{Result, XcsgError};
use crate::model::{classify, NodeClass};
use crate::scene::{SceneNode, SceneTree, SCENE_ROOT};
use nalgebra::Matrix4;
use std::fs;
use std::path::Path;

/// Read and convert a .csg file
pub fn import_csg_file(path: &Path) -> Result<SceneTree> {
    if !path.exists() {
        return Err(XcsgError::InputNotFound(path.to_path_buf()));
    }
    let source = fs::read_to_string(path)?;
    convert_csg(&source)
}

/// Convert .csg source into a scene tree with a single model under the root
pub fn convert_csg(source: &str) -> Result<SceneTree> {
    let calls = parse_csg(source)?;
    let mut root = SceneNode::new(SCENE_ROOT).with_property("version", "1.0");
    if let Some(model) = combine("union", convert_all(&calls, &Matrix4::identity())?)? {
        root = root.with_child(model);
    }
    Ok(SceneTree::new(root))
}

fn convert_all(calls: &[Call], world: &Matrix4<f64>) -> Result<Vec<SceneNode>> {
    Ok(convert_each(calls, world)?.into_iter().flatten().collect())
}

/// Convert each call, keeping empty results in place
fn convert_each(calls: &[Call], world: &Matrix4<f64>) -> Result<Vec<Option<SceneNode>>> {
    calls.iter().map(|call| convert(call, world)).collect()
}

fn convert(call: &Call, world: &Matrix4<f64>) -> Result<Option<SceneNode>> {
    let args = &call.args;
    let leaf = match call.name.as_str() {
        "group" | "union" | "render" | "color" => {
            return combine("union", convert_all(&call.children, world)?);
        }
        "difference" => {
            let mut operands = convert_each(&call.children, world)?.into_iter();
            // Nothing minus anything is nothing
            let Some(Some(minuend)) = operands.next() else {
                return Ok(None);
            };
            let nodes = std::iter::once(minuend).chain(operands.flatten()).collect();
            return combine("difference", nodes);
        }
        "intersection" => {
            let operands: Option<Vec<SceneNode>> = convert_each(&call.children, world)?.into_iter().collect();
            return match operands {
                Some(nodes) => combine("intersection", nodes),
                None => Ok(None),
            };
        }
        "multmatrix" => {
            let m = matrix(args)?;
            return combine("union", convert_all(&call.children, &(world * m))?);
        }
        "cube" => cube(args)?,
        "sphere" => SceneNode::new("sphere").with_property("r", radius(args, "r", "d", 0)?),
        "cylinder" => cylinder(args)?,
        "polyhedron" => polyhedron(args)?,
        "square" => square(args)?,
        "circle" => SceneNode::new("circle").with_property("r", radius(args, "r", "d", 0)?),
        "polygon" => return polygon(args, world).map(Some),
        other => {
            return Err(XcsgError::CsgSyntax(format!("unsupported OpenSCAD operation '{}'", other)));
        }
    };
    Ok(Some(with_transform(leaf, world)))
}

/// Combine converted children. Empty yields nothing, a single child stands alone and
/// the dimension of the combinator follows its first operand.
fn combine(op: &str, mut nodes: Vec<SceneNode>) -> Result<Option<SceneNode>> {
    if nodes.len() <= 1 {
        return Ok(nodes.pop());
    }
    let first = &nodes[0];
    let suffix = match classify(first) {
        NodeClass::Shape2d(_) => "2d",
        _ => "3d",
    };
    Ok(Some(SceneNode::new(format!("{}{}", op, suffix)).with_children(nodes)))
}

fn number(args: &Args, name: &str, position: usize) -> Result<Option<f64>> {
    match args.get(name, position) {
        None => Ok(None),
        Some(v) => v
            .as_number()
            .map(Some)
            .ok_or_else(|| XcsgError::CsgSyntax(format!("'{}' must be a number", name))),
    }
}

fn center(args: &Args, position: usize) -> bool {
    args.get("center", position).and_then(Value::as_bool).unwrap_or(false)
}

/// Radius from `r` or half of diameter `d`
fn radius(args: &Args, r: &str, d: &str, position: usize) -> Result<f64> {
    if let Some(value) = number(args, r, position)? {
        return Ok(value);
    }
    match args.named(d).and_then(Value::as_number) {
        Some(diameter) => Ok(diameter / 2.0),
        None => Ok(1.0),
    }
}

fn size(args: &Args, dims: usize) -> Result<Vec<f64>> {
    match args.get("size", 0) {
        None => Ok(vec![1.0; dims]),
        Some(Value::Number(s)) => Ok(vec![*s; dims]),
        Some(v) => match v.as_numbers() {
            Some(values) if values.len() >= dims => Ok(values[..dims].to_vec()),
            _ => Err(XcsgError::CsgSyntax(format!("'size' must be a number or {} numbers", dims))),
        },
    }
}

fn cube(args: &Args) -> Result<SceneNode> {
    let s = size(args, 3)?;
    let node = if s[0] == s[1] && s[1] == s[2] {
        SceneNode::new("cube").with_property("size", s[0])
    } else {
        SceneNode::new("cuboid")
            .with_property("dx", s[0])
            .with_property("dy", s[1])
            .with_property("dz", s[2])
    };
    Ok(node.with_property("center", center(args, 1)))
}

fn square(args: &Args) -> Result<SceneNode> {
    let s = size(args, 2)?;
    let node = if s[0] == s[1] {
        SceneNode::new("square").with_property("size", s[0])
    } else {
        SceneNode::new("rectangle")
            .with_property("dx", s[0])
            .with_property("dy", s[1])
    };
    Ok(node.with_property("center", center(args, 1)))
}

fn cylinder(args: &Args) -> Result<SceneNode> {
    let h = number(args, "h", 0)?.unwrap_or(1.0);
    let r = number(args, "r", usize::MAX)?;
    let r1 = match number(args, "r1", 1)? {
        Some(r1) => r1,
        None => r.unwrap_or_else(|| radius_or(args, "d1", "d", 1.0)),
    };
    let r2 = match number(args, "r2", 2)? {
        Some(r2) => r2,
        None => r.unwrap_or_else(|| radius_or(args, "d2", "d", 1.0)),
    };

    let node = if r1 == r2 {
        SceneNode::new("cylinder").with_property("r", r1)
    } else {
        SceneNode::new("cone").with_property("r1", r1).with_property("r2", r2)
    };
    Ok(node.with_property("h", h).with_property("center", center(args, 3)))
}

fn radius_or(args: &Args, d: &str, fallback: &str, default: f64) -> f64 {
    args.named(d)
        .or_else(|| args.named(fallback))
        .and_then(Value::as_number)
        .map(|diameter| diameter / 2.0)
        .unwrap_or(default)
}

fn matrix(args: &Args) -> Result<Matrix4<f64>> {
    let rows = args
        .get("m", 0)
        .and_then(Value::as_rows)
        .filter(|rows| rows.len() >= 3 && rows.iter().all(|r| r.len() == 4))
        .ok_or_else(|| XcsgError::CsgSyntax("multmatrix needs a 4x4 matrix 'm'".into()))?;

    let mut m = Matrix4::identity();
    for (i, row) in rows.iter().take(4).enumerate() {
        for (j, value) in row.iter().enumerate() {
            m[(i, j)] = *value;
        }
    }
    Ok(m)
}

fn points(args: &Args, name: &str, dims: usize) -> Result<Vec<Vec<f64>>> {
    args.get(name, 0)
        .and_then(Value::as_rows)
        .filter(|rows| rows.iter().all(|r| r.len() >= dims))
        .ok_or_else(|| XcsgError::CsgSyntax(format!("'{}' must be a list of {}D points", name, dims)))
}

fn polyhedron(args: &Args) -> Result<SceneNode> {
    let vertices = points(args, "points", 3)?;
    let faces = args
        .named("faces")
        .or_else(|| args.named("triangles"))
        .or_else(|| args.get("faces", 1))
        .and_then(Value::as_rows)
        .ok_or_else(|| XcsgError::CsgSyntax("polyhedron needs 'faces'".into()))?;

    let vertices_node = SceneNode::new("vertices").with_children(vertices.iter().map(|p| {
        SceneNode::new("vertex")
            .with_property("x", p[0])
            .with_property("y", p[1])
            .with_property("z", p[2])
    }));
    // OpenSCAD faces are clockwise seen from outside
    let faces_node = SceneNode::new("faces").with_children(faces.iter().map(|face| {
        SceneNode::new("face").with_children(
            face.iter()
                .rev()
                .map(|&i| SceneNode::new("fv").with_property("index", i as usize)),
        )
    }));
    Ok(SceneNode::new("polyhedron").with_child(vertices_node).with_child(faces_node))
}

/// Polygon with optional paths; paths after the first become holes
fn polygon(args: &Args, world: &Matrix4<f64>) -> Result<SceneNode> {
    let pts = points(args, "points", 2)?;
    let paths: Vec<Vec<usize>> = match args.get("paths", 1).and_then(Value::as_rows) {
        Some(paths) if !paths.is_empty() => paths
            .iter()
            .map(|path| path.iter().map(|&i| i as usize).collect())
            .collect(),
        _ => vec![(0..pts.len()).collect()],
    };

    let mut loops = Vec::with_capacity(paths.len());
    for path in &paths {
        if let Some(bad) = path.iter().find(|&&i| i >= pts.len()) {
            return Err(XcsgError::CsgSyntax(format!("polygon path index {} out of range", bad)));
        }
        let vertices = SceneNode::new("vertices").with_children(
            path.iter()
                .map(|&i| SceneNode::new("vertex").with_property("x", pts[i][0]).with_property("y", pts[i][1])),
        );
        loops.push(with_transform(SceneNode::new("polygon").with_child(vertices), world));
    }

    if loops.len() == 1 {
        return Ok(loops.remove(0));
    }
    Ok(SceneNode::new("difference2d").with_children(loops))
}

fn with_transform(node: SceneNode, world: &Matrix4<f64>) -> SceneNode {
    if *world == Matrix4::identity() {
        return node;
    }
    let rows = (0..4).map(|i| {
        (0..4).fold(SceneNode::new("trow"), |row, j| {
            row.with_property(format!("c{}", j), world[(i, j)])
        })
    });
    node.with_child(SceneNode::new("tmatrix").with_children(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{build, ModelGraph};

    fn model(source: &str) -> SceneNode {
        let tree = convert_csg(source).unwrap();
        assert_eq!(tree.root().tag(), SCENE_ROOT);
        tree.root().children()[0].clone()
    }

    #[test]
    fn test_cube_with_vector_size() {
        let node = model("cube(size = [1, 2, 3], center = false);");
        assert_eq!(node.tag(), "cuboid");
        assert_eq!(node.property("dz"), Some("3"));
        assert!(matches!(build(&node), Ok(ModelGraph::Solid(_))));
    }

    #[test]
    fn test_difference_keeps_operand_order() {
        let node = model(
            "difference() {\n  cube(size = [10, 10, 10], center = true);\n  cylinder($fn = 0, $fa = 12, $fs = 2, h = 20, r1 = 2, r2 = 2, center = true);\n}",
        );
        assert_eq!(node.tag(), "difference3d");
        let tags: Vec<&str> = node.children().iter().map(|c| c.tag()).collect();
        assert_eq!(tags, vec!["cube", "cylinder"]);
        assert_eq!(build(&node).unwrap().nbool(), 1);
    }

    #[test]
    fn test_multmatrix_moves_to_leaves() {
        let node = model(
            "multmatrix([[1, 0, 0, 5], [0, 1, 0, 0], [0, 0, 1, 0], [0, 0, 0, 1]]) {\n  group() {\n    square(size = [2, 3], center = false);\n  }\n}",
        );
        assert_eq!(node.tag(), "rectangle");
        let tmatrix = node.child("tmatrix").unwrap();
        assert_eq!(tmatrix.children().len(), 4);
        assert_eq!(tmatrix.children()[0].property("c3"), Some("5"));
    }

    #[test]
    fn test_two_dimensional_union() {
        let node = model("union() { circle(r = 1); square(size = 2); }");
        assert_eq!(node.tag(), "union2d");
        assert!(matches!(build(&node), Ok(ModelGraph::Shape2d(_))));
    }

    #[test]
    fn test_polygon_with_hole() {
        let node = model(
            "polygon(points = [[0, 0], [4, 0], [4, 4], [0, 4], [1, 1], [1, 2], [2, 1]], paths = [[0, 1, 2, 3], [4, 5, 6]], convexity = 1);",
        );
        assert_eq!(node.tag(), "difference2d");
        assert_eq!(node.children().len(), 2);
    }

    #[test]
    fn test_polyhedron_faces_are_reversed() {
        let node = model(
            "polyhedron(points = [[0, 0, 0], [1, 0, 0], [0, 1, 0], [0, 0, 1]], faces = [[0, 1, 2], [0, 3, 1], [1, 3, 2], [0, 2, 3]], convexity = 1);",
        );
        let first = &node.child("faces").unwrap().children()[0];
        let indices: Vec<&str> = first.children().iter().filter_map(|fv| fv.property("index")).collect();
        assert_eq!(indices, vec!["2", "1", "0"]);
        assert!(matches!(build(&node), Ok(ModelGraph::Solid(_))));
    }

    #[test]
    fn test_unsupported_operation() {
        assert!(matches!(
            convert_csg("linear_extrude(height = 2) { square(size = 1); }"),
            Err(XcsgError::CsgSyntax(_))
        ));
    }

    #[test]
    fn test_empty_source_has_no_model() {
        let tree = convert_csg("group();").unwrap();
        assert!(tree.root().children().is_empty());
    }

    #[test]
    fn test_empty_minuend_empties_difference() {
        let tree = convert_csg("difference() {\n  group();\n  cube(size = 1, center = false);\n}").unwrap();
        assert!(tree.root().children().is_empty());
    }

    #[test]
    fn test_empty_operand_empties_intersection() {
        let tree = convert_csg("intersection() {\n  cube(size = 1, center = false);\n  group();\n}").unwrap();
        assert!(tree.root().children().is_empty());
    }

    #[test]
    fn test_empty_subtrahend_is_dropped() {
        let node = model("difference() {\n  cube(size = 1, center = false);\n  group();\n}");
        assert_eq!(node.tag(), "cube");
    }
}
