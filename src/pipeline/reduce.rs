// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Boolean reduction of model trees
//!
//! Both reducers walk the tree depth-first, folding each combinator's operands left to
//! right through a kernel. Transforms compose from the root down, so leaves are
//! tessellated directly in world coordinates.

use super::context::{BooleanTimer, PipelineContext};
use crate::error::{KernelError, Result};
use crate::geometry::{BooleanOp, Polyhedron, Polyset, Primitive, Profile};
use crate::kernel::{ProfileKernel, SolidKernel};
use crate::model::{CsgKind, CsgNode, ModelTree, ShapeTree, SolidTree};
use nalgebra::Matrix4;

/// Outcome of a 3D reduction
#[derive(Debug, Clone, PartialEq)]
pub enum Reduction<T> {
    Complete(T),
    /// The kernel failed; `result` holds the root-level accumulator as it stood
    Partial { result: T, warning: KernelError },
}

impl<T> Reduction<T> {
    pub fn result(&self) -> &T {
        match self {
            Reduction::Complete(result) | Reduction::Partial { result, .. } => result,
        }
    }

    pub fn into_result(self) -> T {
        match self {
            Reduction::Complete(result) | Reduction::Partial { result, .. } => result,
        }
    }

    pub fn warning(&self) -> Option<&KernelError> {
        match self {
            Reduction::Complete(_) => None,
            Reduction::Partial { warning, .. } => Some(warning),
        }
    }

    pub fn is_complete(&self) -> bool {
        matches!(self, Reduction::Complete(_))
    }
}

/// Leaf tessellation and pairwise combination for one kind of geometry
trait Operations<L> {
    type Output: Default;

    fn leaf(&mut self, shape: &L, world: &Matrix4<f64>) -> Self::Output;

    fn combine(
        &mut self,
        a: &Self::Output,
        b: &Self::Output,
        op: BooleanOp,
    ) -> std::result::Result<Self::Output, KernelError>;
}

struct SolidOps<'k, K> {
    kernel: &'k mut K,
    secant_tolerance: f64,
}

impl<K: SolidKernel> Operations<Primitive> for SolidOps<'_, K> {
    type Output = Polyhedron;

    fn leaf(&mut self, shape: &Primitive, world: &Matrix4<f64>) -> Polyhedron {
        let mut polyhedron = shape.to_polyhedron(self.secant_tolerance);
        polyhedron.transform(world);
        polyhedron
    }

    fn combine(
        &mut self,
        a: &Polyhedron,
        b: &Polyhedron,
        op: BooleanOp,
    ) -> std::result::Result<Polyhedron, KernelError> {
        self.kernel.boolean(a, b, op)
    }
}

struct ProfileOps<'k, K> {
    kernel: &'k mut K,
    secant_tolerance: f64,
}

impl<K: ProfileKernel> Operations<Profile> for ProfileOps<'_, K> {
    type Output = Polyset;

    fn leaf(&mut self, shape: &Profile, world: &Matrix4<f64>) -> Polyset {
        let mut polygon = shape.to_polygon(self.secant_tolerance);
        polygon.transform(world);
        Polyset::from_loops(vec![polygon])
    }

    fn combine(&mut self, a: &Polyset, b: &Polyset, op: BooleanOp) -> std::result::Result<Polyset, KernelError> {
        self.kernel.boolean(a, b, op)
    }
}

fn evaluate<L, O: Operations<L>>(
    node: &CsgNode<L>,
    parent: &Matrix4<f64>,
    ops: &mut O,
    timer: &mut BooleanTimer,
) -> std::result::Result<O::Output, KernelError> {
    let world = parent * node.transform;
    match &node.kind {
        CsgKind::Leaf(shape) => Ok(ops.leaf(shape, &world)),
        CsgKind::Boolean { op, operands } => {
            let mut acc: Option<O::Output> = None;
            for operand in operands {
                let next = evaluate(operand, &world, ops, timer)?;
                acc = Some(match acc {
                    None => next,
                    Some(a) => ops.combine(&a, &next, *op)?,
                });
            }
            timer.step();
            Ok(acc.unwrap_or_default())
        }
    }
}

/// Fold the root like `evaluate`, but keep the accumulator when a kernel call fails
fn fold_root<L, O: Operations<L>>(
    tree: &ModelTree<L>,
    ops: &mut O,
    timer: &mut BooleanTimer,
) -> (O::Output, Option<KernelError>) {
    let root = tree.root();
    let CsgKind::Boolean { op, operands } = &root.kind else {
        return match evaluate(root, &Matrix4::identity(), ops, timer) {
            Ok(result) => (result, None),
            Err(e) => (O::Output::default(), Some(e)),
        };
    };

    let world = root.transform;
    let mut acc: Option<O::Output> = None;
    for operand in operands {
        let next = match evaluate(operand, &world, ops, timer) {
            Ok(next) => next,
            Err(e) => return (acc.unwrap_or_default(), Some(e)),
        };
        acc = match acc {
            None => Some(next),
            Some(a) => match ops.combine(&a, &next, *op) {
                Ok(combined) => Some(combined),
                Err(e) => return (a, Some(e)),
            },
        };
    }
    timer.step();
    (acc.unwrap_or_default(), None)
}

/// Reduce a solid tree to a single polyhedron.
///
/// Kernel failures do not abort the run: the partial root accumulator is returned
/// together with the error.
pub fn reduce_solid<K: SolidKernel>(
    tree: &SolidTree,
    kernel: &mut K,
    ctx: &mut PipelineContext,
) -> Reduction<Polyhedron> {
    ctx.timer.init(tree.nbool());
    let mut ops = SolidOps {
        kernel,
        secant_tolerance: ctx.secant_tolerance,
    };
    let (result, failure) = fold_root(tree, &mut ops, &mut ctx.timer);
    ctx.timer.finish();

    match failure {
        None => {
            tracing::info!(
                "completed CSG tree: {} boolean operations in {:.3?}",
                ctx.timer.steps(),
                ctx.timer.elapsed()
            );
            Reduction::Complete(result)
        }
        Some(warning) => {
            tracing::warn!(
                "boolean reduction stopped after {} of {} operations: {}",
                ctx.timer.steps(),
                ctx.timer.total(),
                warning
            );
            Reduction::Partial { result, warning }
        }
    }
}

/// Reduce a shape tree to a polyset; kernel failures propagate
pub fn reduce_profile<K: ProfileKernel>(
    tree: &ShapeTree,
    kernel: &mut K,
    ctx: &mut PipelineContext,
) -> Result<Polyset> {
    ctx.timer.init(tree.nbool());
    let mut ops = ProfileOps {
        kernel,
        secant_tolerance: ctx.secant_tolerance,
    };
    let (result, failure) = fold_root(tree, &mut ops, &mut ctx.timer);
    ctx.timer.finish();

    if let Some(e) = failure {
        return Err(e.into());
    }
    tracing::info!(
        "completed 2D CSG tree: {} boolean operations in {:.3?}",
        ctx.timer.steps(),
        ctx.timer.elapsed()
    );
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kernel::{BspProfileKernel, BspSolidKernel};
    use approx::assert_relative_eq;
    use nalgebra::Vector3;

    /// Fails every call after the first `allowed` ones
    struct FailAfter {
        allowed: usize,
        calls: usize,
    }

    impl SolidKernel for FailAfter {
        fn boolean(
            &mut self,
            a: &Polyhedron,
            b: &Polyhedron,
            op: BooleanOp,
        ) -> std::result::Result<Polyhedron, KernelError> {
            self.calls += 1;
            if self.calls > self.allowed {
                return Err(KernelError::new("test", "forced failure"));
            }
            BspSolidKernel::new().boolean(a, b, op)
        }
    }

    fn cube_at(x: f64) -> CsgNode<Primitive> {
        CsgNode::leaf(Primitive::cube(Vector3::new(1.0, 1.0, 1.0), false))
            .with_transform(Matrix4::new_translation(&Vector3::new(x, 0.0, 0.0)))
    }

    fn x_extent(p: &Polyhedron) -> (f64, f64) {
        p.vertices
            .iter()
            .fold((f64::MAX, f64::MIN), |(lo, hi), v| (lo.min(v.x), hi.max(v.x)))
    }

    #[test]
    fn test_leaf_root_needs_no_kernel() {
        let tree = ModelTree::new(cube_at(2.0));
        let mut kernel = FailAfter { allowed: 0, calls: 0 };
        let mut ctx = PipelineContext::new(0.01, false);
        let reduction = reduce_solid(&tree, &mut kernel, &mut ctx);

        assert!(reduction.is_complete());
        assert_eq!(kernel.calls, 0);
        assert_eq!(x_extent(reduction.result()), (2.0, 3.0));
    }

    #[test]
    fn test_transforms_compose_from_root() {
        let inner = CsgNode::boolean(BooleanOp::Union, vec![cube_at(0.0)])
            .with_transform(Matrix4::new_translation(&Vector3::new(10.0, 0.0, 0.0)));
        let tree = ModelTree::new(
            CsgNode::boolean(BooleanOp::Union, vec![inner])
                .with_transform(Matrix4::new_translation(&Vector3::new(5.0, 0.0, 0.0))),
        );
        let mut ctx = PipelineContext::new(0.01, false);
        let reduction = reduce_solid(&tree, &mut BspSolidKernel::new(), &mut ctx);
        assert_eq!(x_extent(reduction.result()), (15.0, 16.0));
        assert_eq!(ctx.timer.steps(), 2);
    }

    #[test]
    fn test_failure_keeps_root_accumulator() {
        // (cube0 U cube2) then U cube4; the second kernel call fails
        let tree = ModelTree::new(CsgNode::boolean(
            BooleanOp::Union,
            vec![cube_at(0.0), cube_at(2.0), cube_at(4.0)],
        ));
        let mut kernel = FailAfter { allowed: 1, calls: 0 };
        let mut ctx = PipelineContext::new(0.01, false);
        let reduction = reduce_solid(&tree, &mut kernel, &mut ctx);

        assert!(!reduction.is_complete());
        assert_eq!(reduction.warning().map(|w| w.kernel), Some("test"));
        let (lo, hi) = x_extent(reduction.result());
        assert_relative_eq!(lo, 0.0, epsilon = 1e-9);
        assert_relative_eq!(hi, 3.0, epsilon = 1e-9);
    }

    #[test]
    fn test_failure_inside_first_operand_yields_empty() {
        let nested = CsgNode::boolean(BooleanOp::Union, vec![cube_at(0.0), cube_at(0.5)]);
        let tree = ModelTree::new(CsgNode::boolean(BooleanOp::Difference, vec![nested, cube_at(0.2)]));
        let mut kernel = FailAfter { allowed: 0, calls: 0 };
        let mut ctx = PipelineContext::new(0.01, false);
        let reduction = reduce_solid(&tree, &mut kernel, &mut ctx);

        assert!(reduction.warning().is_some());
        assert!(reduction.into_result().is_empty());
    }

    #[test]
    fn test_profile_reduction() {
        let square = |x: f64| {
            CsgNode::leaf(Profile::Rectangle {
                dx: 2.0,
                dy: 2.0,
                center: false,
            })
            .with_transform(Matrix4::new_translation(&Vector3::new(x, x / 2.0, 0.0)))
        };
        let tree = ModelTree::new(CsgNode::boolean(BooleanOp::Difference, vec![square(0.0), square(1.0)]));
        let mut ctx = PipelineContext::new(0.01, false);
        let polyset = reduce_profile(&tree, &mut BspProfileKernel::new(), &mut ctx).unwrap();
        assert_eq!(polyset.len(), 1);
        assert_relative_eq!(polyset.area(), 2.5, epsilon = 1e-9);
    }

    struct RefuseClip;

    impl ProfileKernel for RefuseClip {
        fn boolean(&mut self, _: &Polyset, _: &Polyset, _: BooleanOp) -> std::result::Result<Polyset, KernelError> {
            Err(KernelError::new("test2d", "forced failure"))
        }
    }

    #[test]
    fn test_profile_failure_propagates() {
        let circle = || CsgNode::leaf(Profile::Circle { r: 1.0 });
        let tree = ModelTree::new(CsgNode::boolean(BooleanOp::Union, vec![circle(), circle()]));
        let mut ctx = PipelineContext::new(0.01, false);
        let err = reduce_profile(&tree, &mut RefuseClip, &mut ctx).unwrap_err();
        assert!(matches!(err, crate::error::XcsgError::Kernel(ref e) if e.kernel == "test2d"));
    }
}
