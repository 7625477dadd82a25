// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CSG operations using BSP trees, generic over the facet dimension
//!
//! Solids use planar polygons as facets, profiles use oriented line segments.
//! Both follow the same clip/invert scheme.

use crate::geometry::BooleanOp;

/// Distance under which a point is considered to lie on a splitting plane
pub const EPSILON: f64 = 1e-6;

/// Where a facet ended up relative to a splitting plane
pub enum Split<F> {
    CoplanarFront(F),
    CoplanarBack(F),
    Front(F),
    Back(F),
    Spanning { front: Option<F>, back: Option<F> },
}

/// Boundary element of a solid (polygon) or profile (segment)
pub trait Facet: Clone {
    type Plane: Clone;

    /// Supporting plane, `None` when the facet is degenerate
    fn plane(&self) -> Option<Self::Plane>;

    fn flip(&mut self);

    fn flip_plane(plane: &mut Self::Plane);

    fn split(&self, plane: &Self::Plane) -> Split<Self>;
}

/// BSP tree node for CSG operations.
///
/// Trees built from convex input degenerate into chains as deep as the facet count,
/// so every traversal below walks the tree with an explicit stack.
pub struct BspNode<F: Facet> {
    plane: Option<F::Plane>,
    front: Option<Box<BspNode<F>>>,
    back: Option<Box<BspNode<F>>>,
    facets: Vec<F>,
}

impl<F: Facet> BspNode<F> {
    pub fn new(facets: Vec<F>) -> Self {
        let mut node = Self::leaf();
        node.build(facets);
        node
    }

    fn leaf() -> Self {
        Self {
            plane: None,
            front: None,
            back: None,
            facets: Vec::new(),
        }
    }

    pub fn build(&mut self, facets: Vec<F>) {
        let mut stack: Vec<(&mut BspNode<F>, Vec<F>)> = vec![(self, facets)];

        while let Some((node, facets)) = stack.pop() {
            if facets.is_empty() {
                continue;
            }
            if node.plane.is_none() {
                node.plane = facets.iter().find_map(|f| f.plane());
            }
            let Some(plane) = node.plane.clone() else {
                continue;
            };

            let mut front_facets = Vec::new();
            let mut back_facets = Vec::new();
            for facet in facets {
                match facet.split(&plane) {
                    Split::CoplanarFront(f) | Split::CoplanarBack(f) => node.facets.push(f),
                    Split::Front(f) => front_facets.push(f),
                    Split::Back(f) => back_facets.push(f),
                    Split::Spanning { front, back } => {
                        front_facets.extend(front);
                        back_facets.extend(back);
                    }
                }
            }

            let BspNode { front, back, .. } = node;
            if !front_facets.is_empty() {
                let child = front.get_or_insert_with(|| Box::new(Self::leaf()));
                stack.push((&mut **child, front_facets));
            }
            if !back_facets.is_empty() {
                let child = back.get_or_insert_with(|| Box::new(Self::leaf()));
                stack.push((&mut **child, back_facets));
            }
        }
    }

    pub fn all_facets(&self) -> Vec<F> {
        let mut result = Vec::new();
        let mut stack: Vec<&BspNode<F>> = vec![self];
        while let Some(node) = stack.pop() {
            result.extend(node.facets.iter().cloned());
            stack.extend(node.back.as_deref());
            stack.extend(node.front.as_deref());
        }
        result
    }

    /// Remove the parts of `facets` that lie inside this tree
    pub fn clip_facets(&self, facets: Vec<F>) -> Vec<F> {
        let mut result = Vec::new();
        let mut stack: Vec<(&BspNode<F>, Vec<F>)> = vec![(self, facets)];

        while let Some((node, facets)) = stack.pop() {
            let Some(ref plane) = node.plane else {
                result.extend(facets);
                continue;
            };

            let mut front = Vec::new();
            let mut back = Vec::new();
            for facet in facets {
                match facet.split(plane) {
                    Split::CoplanarFront(f) | Split::Front(f) => front.push(f),
                    Split::CoplanarBack(f) | Split::Back(f) => back.push(f),
                    Split::Spanning { front: f, back: b } => {
                        front.extend(f);
                        back.extend(b);
                    }
                }
            }

            // facets behind a leaf are inside the solid and dropped
            if let Some(child) = node.back.as_deref() {
                if !back.is_empty() {
                    stack.push((child, back));
                }
            }
            match node.front.as_deref() {
                Some(child) => {
                    if !front.is_empty() {
                        stack.push((child, front));
                    }
                }
                None => result.extend(front),
            }
        }
        result
    }

    /// Remove the parts of this tree's facets that lie inside `other`
    pub fn clip_to(&mut self, other: &BspNode<F>) {
        let mut stack: Vec<&mut BspNode<F>> = vec![self];
        while let Some(node) = stack.pop() {
            let BspNode {
                facets, front, back, ..
            } = node;
            *facets = other.clip_facets(std::mem::take(facets));
            stack.extend(front.as_deref_mut());
            stack.extend(back.as_deref_mut());
        }
    }

    /// Swap inside and outside
    pub fn invert(&mut self) {
        let mut stack: Vec<&mut BspNode<F>> = vec![self];
        while let Some(node) = stack.pop() {
            for facet in &mut node.facets {
                facet.flip();
            }
            if let Some(ref mut plane) = node.plane {
                F::flip_plane(plane);
            }
            std::mem::swap(&mut node.front, &mut node.back);
            let BspNode { front, back, .. } = node;
            stack.extend(front.as_deref_mut());
            stack.extend(back.as_deref_mut());
        }
    }

    /// Number of levels below and including this node
    #[cfg(test)]
    fn depth(&self) -> usize {
        let mut deepest = 0;
        let mut stack: Vec<(&BspNode<F>, usize)> = vec![(self, 1)];
        while let Some((node, depth)) = stack.pop() {
            deepest = deepest.max(depth);
            stack.extend(node.front.as_deref().map(|n| (n, depth + 1)));
            stack.extend(node.back.as_deref().map(|n| (n, depth + 1)));
        }
        deepest
    }
}

impl<F: Facet> Drop for BspNode<F> {
    fn drop(&mut self) {
        // unlink children first so dropping a chain never recurses
        let mut stack: Vec<Box<BspNode<F>>> = Vec::new();
        stack.extend(self.front.take());
        stack.extend(self.back.take());
        while let Some(mut node) = stack.pop() {
            stack.extend(node.front.take());
            stack.extend(node.back.take());
        }
    }
}

/// Combine two closed facet sets
pub fn combine<F: Facet>(a: Vec<F>, b: Vec<F>, op: BooleanOp) -> Vec<F> {
    match (a.is_empty(), b.is_empty(), op) {
        (_, true, BooleanOp::Union | BooleanOp::Difference) => return a,
        (true, _, BooleanOp::Union) => return b,
        (true, _, _) | (_, true, BooleanOp::Intersection) => return Vec::new(),
        _ => {}
    }

    let mut tree_a = BspNode::new(a);
    let mut tree_b = BspNode::new(b);

    match op {
        BooleanOp::Union => {
            tree_a.clip_to(&tree_b);
            tree_b.clip_to(&tree_a);
            tree_b.invert();
            tree_b.clip_to(&tree_a);
            tree_b.invert();
            tree_a.build(tree_b.all_facets());
        }
        // A - B: invert A, clip both against each other, rebuild and invert back
        BooleanOp::Difference => {
            tree_a.invert();
            tree_a.clip_to(&tree_b);
            tree_b.clip_to(&tree_a);
            tree_b.invert();
            tree_b.clip_to(&tree_a);
            tree_b.invert();
            tree_a.build(tree_b.all_facets());
            tree_a.invert();
        }
        BooleanOp::Intersection => {
            tree_a.invert();
            tree_b.clip_to(&tree_a);
            tree_b.invert();
            tree_a.clip_to(&tree_b);
            tree_b.clip_to(&tree_a);
            tree_a.build(tree_b.all_facets());
            tree_a.invert();
        }
    }

    tree_a.all_facets()
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Boundary point of a 1D solid; the interior lies on the `-dir` side of `x`
    #[derive(Debug, Clone, PartialEq)]
    struct Mark {
        x: f64,
        dir: f64,
    }

    impl Facet for Mark {
        type Plane = (f64, f64);

        fn plane(&self) -> Option<(f64, f64)> {
            Some((self.dir, self.x))
        }

        fn flip(&mut self) {
            self.dir = -self.dir;
        }

        fn flip_plane(plane: &mut (f64, f64)) {
            plane.0 = -plane.0;
        }

        fn split(&self, plane: &(f64, f64)) -> Split<Self> {
            let d = plane.0 * (self.x - plane.1);
            if d.abs() <= EPSILON {
                if plane.0 * self.dir > 0.0 {
                    Split::CoplanarFront(self.clone())
                } else {
                    Split::CoplanarBack(self.clone())
                }
            } else if d > 0.0 {
                Split::Front(self.clone())
            } else {
                Split::Back(self.clone())
            }
        }
    }

    /// A tree that is a single back-linked chain, assembled bottom up
    fn chain(levels: usize) -> BspNode<Mark> {
        let mut node = BspNode::leaf();
        for i in 0..levels {
            let mark = Mark {
                x: (levels - i) as f64,
                dir: 1.0,
            };
            let mut parent = BspNode::leaf();
            parent.plane = mark.plane();
            parent.facets.push(mark);
            if i > 0 {
                parent.back = Some(Box::new(node));
            }
            node = parent;
        }
        node
    }

    #[test]
    fn test_deep_chain_traversals() {
        const LEVELS: usize = 200_000;
        let mut tree = chain(LEVELS);
        assert_eq!(tree.depth(), LEVELS);
        assert_eq!(tree.all_facets().len(), LEVELS);

        // a point below every plane falls through the whole chain and is dropped
        let inside = tree.clip_facets(vec![Mark { x: -1.0, dir: 1.0 }]);
        assert!(inside.is_empty());
        let outside = tree.clip_facets(vec![Mark { x: 1e9, dir: 1.0 }]);
        assert_eq!(outside.len(), 1);

        tree.invert();
        assert_eq!(tree.depth(), LEVELS);
        assert!(tree.all_facets().iter().all(|m| m.dir < 0.0));
        tree.invert();

        let mut other = BspNode::new(vec![Mark { x: 0.5, dir: 1.0 }]);
        other.clip_to(&tree);
        tree.clip_to(&other);
        drop(tree);
    }

    #[test]
    fn test_union_of_intervals() {
        // [0, 2] and [1, 3] as pairs of boundary points
        let a = vec![Mark { x: 2.0, dir: 1.0 }, Mark { x: 0.0, dir: -1.0 }];
        let b = vec![Mark { x: 3.0, dir: 1.0 }, Mark { x: 1.0, dir: -1.0 }];
        let mut xs: Vec<f64> = combine(a, b, BooleanOp::Union).iter().map(|m| m.x).collect();
        xs.sort_by(f64::total_cmp);
        assert_eq!(xs, vec![0.0, 3.0]);
    }
}
