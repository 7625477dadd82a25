// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Model graph - typed CSG trees built from scene nodes

use crate::geometry::{BooleanOp, Primitive, Profile};
use nalgebra::Matrix4;

/// CSG tree node over leaf shapes of type `L`
#[derive(Debug, Clone, PartialEq)]
pub struct CsgNode<L> {
    pub kind: CsgKind<L>,
    /// Transform relative to the parent node
    pub transform: Matrix4<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CsgKind<L> {
    Leaf(L),
    Boolean { op: BooleanOp, operands: Vec<CsgNode<L>> },
}

impl<L> CsgNode<L> {
    pub fn leaf(shape: L) -> Self {
        Self {
            kind: CsgKind::Leaf(shape),
            transform: Matrix4::identity(),
        }
    }

    pub fn boolean(op: BooleanOp, operands: Vec<CsgNode<L>>) -> Self {
        Self {
            kind: CsgKind::Boolean { op, operands },
            transform: Matrix4::identity(),
        }
    }

    pub fn with_transform(mut self, transform: Matrix4<f64>) -> Self {
        self.transform = transform;
        self
    }

    /// Number of combinator nodes in this subtree
    pub fn count_booleans(&self) -> usize {
        match &self.kind {
            CsgKind::Leaf(_) => 0,
            CsgKind::Boolean { operands, .. } => {
                1 + operands.iter().map(CsgNode::count_booleans).sum::<usize>()
            }
        }
    }
}

/// A built CSG tree with its combinator count cached at construction
#[derive(Debug, Clone, PartialEq)]
pub struct ModelTree<L> {
    root: CsgNode<L>,
    nbool: usize,
}

impl<L> ModelTree<L> {
    pub fn new(root: CsgNode<L>) -> Self {
        let nbool = root.count_booleans();
        Self { root, nbool }
    }

    pub fn root(&self) -> &CsgNode<L> {
        &self.root
    }

    /// Boolean operations implied by the tree
    pub fn nbool(&self) -> usize {
        self.nbool
    }
}

pub type SolidTree = ModelTree<Primitive>;
pub type ShapeTree = ModelTree<Profile>;

/// Result of building a classified scene node
#[derive(Debug, Clone, PartialEq)]
pub enum ModelGraph {
    Solid(SolidTree),
    Shape2d(ShapeTree),
}

impl ModelGraph {
    pub fn nbool(&self) -> usize {
        match self {
            ModelGraph::Solid(tree) => tree.nbool(),
            ModelGraph::Shape2d(tree) => tree.nbool(),
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ModelGraph::Solid(_) => "solid",
            ModelGraph::Shape2d(_) => "shape2d",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalgebra::Vector3;

    fn cube() -> CsgNode<Primitive> {
        CsgNode::leaf(Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false))
    }

    #[test]
    fn test_nbool_counts_combinators() {
        let inner = CsgNode::boolean(BooleanOp::Union, vec![cube(), cube()]);
        let root = CsgNode::boolean(BooleanOp::Difference, vec![cube(), inner, cube()]);
        let tree = ModelTree::new(root);
        assert_eq!(tree.nbool(), 2);
        assert_eq!(tree.nbool(), tree.root().count_booleans());
    }

    #[test]
    fn test_leaf_has_no_booleans() {
        let tree = ModelTree::new(cube());
        assert_eq!(tree.nbool(), 0);
        assert_eq!(ModelGraph::Solid(tree).kind_name(), "solid");
    }
}
