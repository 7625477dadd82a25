// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Processing pipeline: budget check, boolean reduction, lump extraction,
//! triangulation and export

pub mod budget;
pub mod context;
pub mod lumps;
pub mod reduce;
pub mod runner;
pub mod triangulation;

pub use budget::BudgetGuard;
pub use context::{BooleanTimer, PipelineContext};
pub use lumps::{Lumps, ManifoldExtractor};
pub use reduce::{reduce_profile, reduce_solid, Reduction};
pub use runner::{ModelKind, Pipeline, RunSummary};
pub use triangulation::{LumpStats, TriangulationGate};
