// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Typed CSG model built from the scene tree

pub mod builder;
pub mod catalog;
pub mod graph;

pub use builder::build;
pub use catalog::{classify, NodeClass, ShapeTag, SolidTag};
pub use graph::{CsgKind, CsgNode, ModelGraph, ModelTree, ShapeTree, SolidTree};
