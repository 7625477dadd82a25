// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Drives one scene file through classification, reduction and export

use super::budget::BudgetGuard;
use super::context::PipelineContext;
use super::lumps::ManifoldExtractor;
use super::reduce::{reduce_profile, reduce_solid};
use super::triangulation::{LumpStats, TriangulationGate};
use crate::config::Config;
use crate::error::{KernelError, Result, XcsgError};
use crate::io::{import_csg_file, ExportArtifact, ExportDispatcher, FormatSet};
use crate::kernel::{
    BspProfileKernel, BspSolidKernel, EarClipTriangulator, ProfileKernel, SolidKernel, Triangulator,
};
use crate::model::{self, catalog, classify, ModelGraph, NodeClass};
use crate::scene::SceneTree;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Kind of model a run processed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModelKind {
    Solid,
    Shape2d,
}

/// What a run produced
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Scene file the pipeline ran on (the converted `.xcsg` for `.csg` input)
    pub input: PathBuf,
    pub kind: ModelKind,
    pub nbool: usize,
    /// Per-lump statistics, 3D only
    pub lumps: Vec<LumpStats>,
    /// Vertex count of each output loop, 2D only
    pub loops: Vec<usize>,
    /// Kernel failure downgraded to a partial result
    pub warning: Option<KernelError>,
    /// Written files, in write order
    pub artifacts: Vec<ExportArtifact>,
    pub boolean_time: Duration,
    pub total_time: Duration,
}

impl RunSummary {
    pub fn triangle_count(&self) -> usize {
        self.lumps.iter().map(|l| l.triangles).sum()
    }
}

/// The processing pipeline with its kernels
pub struct Pipeline<S = BspSolidKernel, P = BspProfileKernel, T = EarClipTriangulator> {
    config: Config,
    solid_kernel: S,
    profile_kernel: P,
    triangulator: T,
}

impl Pipeline {
    /// Pipeline with the built-in kernels
    pub fn new(config: Config) -> Result<Self> {
        Self::with_kernels(
            config,
            BspSolidKernel::new(),
            BspProfileKernel::new(),
            EarClipTriangulator::new(),
        )
    }
}

impl<S: SolidKernel, P: ProfileKernel, T: Triangulator> Pipeline<S, P, T> {
    pub fn with_kernels(config: Config, solid_kernel: S, profile_kernel: P, triangulator: T) -> Result<Self> {
        catalog::validate()?;
        config.validate()?;
        Ok(Self {
            config,
            solid_kernel,
            profile_kernel,
            triangulator,
        })
    }

    /// Process an `.xcsg` file, or a `.csg` file after converting it to `.xcsg`
    pub fn run_file(&mut self, input: &Path, formats: FormatSet) -> Result<RunSummary> {
        let is_csg = match input.extension().and_then(|e| e.to_str()) {
            Some("csg") => true,
            Some("xcsg") => false,
            _ => {
                return Err(XcsgError::Usage(format!(
                    "input must be an .xcsg or .csg file: {}",
                    input.display()
                )))
            }
        };
        if !input.exists() {
            return Err(XcsgError::InputNotFound(input.to_path_buf()));
        }

        let dispatcher = ExportDispatcher::for_input(input, formats);
        let scene_path = if is_csg {
            tracing::info!("Converting from OpenSCAD {}", input.display());
            let converted = import_csg_file(input)?;
            let xcsg_path = input.with_extension("xcsg");
            converted.write_xml(&xcsg_path)?;
            xcsg_path
        } else {
            input.to_path_buf()
        };

        let tree = SceneTree::read_xml(&scene_path)?;
        tracing::info!("xcsg processing: {}", scene_path.display());
        let mut summary = self.run_tree(&tree, &dispatcher)?;
        summary.input = scene_path;
        Ok(summary)
    }

    /// Process the first solid or 2D shape under the scene root
    pub fn run_tree(&mut self, tree: &SceneTree, dispatcher: &ExportDispatcher) -> Result<RunSummary> {
        let started = Instant::now();
        let root = tree.scene_root()?;
        let secant_tolerance = tree.secant_tolerance(self.config.default_secant_tolerance)?;

        let node = root
            .children()
            .iter()
            .find(|child| classify(child) != NodeClass::None)
            .ok_or(XcsgError::NoModel)?;

        let graph = model::build(node)?;
        let nbool = graph.nbool();
        BudgetGuard::new(self.config.max_bool).check(nbool)?;
        tracing::info!("processing {} <{}> with {} boolean operations", graph.kind_name(), node.tag(), nbool);

        let mut ctx = PipelineContext::new(secant_tolerance, self.config.progress);
        let mut summary = RunSummary {
            input: PathBuf::new(),
            kind: ModelKind::Solid,
            nbool,
            lumps: Vec::new(),
            loops: Vec::new(),
            warning: None,
            artifacts: Vec::new(),
            boolean_time: Duration::ZERO,
            total_time: Duration::ZERO,
        };

        match graph {
            ModelGraph::Solid(tree) => {
                let reduction = reduce_solid(&tree, &mut self.solid_kernel, &mut ctx);
                summary.warning = reduction.warning().cloned();

                let lumps = ManifoldExtractor::extract(reduction.into_result());
                let mut gate = TriangulationGate::new(&mut self.triangulator);
                for lump in lumps.iter() {
                    summary.lumps.push(gate.admit(&lump)?);
                }
                let mesh = gate.into_mesh();
                tracing::info!(
                    "result: {} lumps, {} vertices, {} triangles",
                    summary.lumps.len(),
                    mesh.vertex_count(),
                    mesh.triangle_count()
                );
                summary.artifacts = dispatcher.export_mesh(&mesh)?;
            }
            ModelGraph::Shape2d(tree) => {
                summary.kind = ModelKind::Shape2d;
                let polyset = reduce_profile(&tree, &mut self.profile_kernel, &mut ctx)?;
                summary.loops = polyset.iter().map(|l| l.len()).collect();
                tracing::info!("result: {} loops, area {:.6}", polyset.len(), polyset.area());
                summary.artifacts = dispatcher.export_polyset(&polyset)?;
            }
        }

        summary.boolean_time = ctx.timer.elapsed();
        summary.total_time = started.elapsed();
        Ok(summary)
    }
}
