// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! CLI output reporter with colored formatting

use crate::pipeline::{ModelKind, RunSummary};
use colored::*;
use std::path::Path;
use std::time::Duration;

/// CLI reporter for run results
pub struct Reporter {
    show_path: bool,
}

impl Reporter {
    /// `show_path` prints absolute artifact paths instead of file names
    pub fn new(show_path: bool) -> Self {
        Self { show_path }
    }

    /// File name, or the absolute path when full paths were requested
    pub fn display_name(&self, path: &Path) -> String {
        if self.show_path {
            std::path::absolute(path)
                .unwrap_or_else(|_| path.to_path_buf())
                .display()
                .to_string()
        } else {
            path.file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| path.display().to_string())
        }
    }

    /// Report a finished run
    pub fn report_summary(&self, summary: &RunSummary) {
        println!("{} {}", "xcsg processing:".bold(), self.display_name(&summary.input).cyan());

        if let Some(ref warning) = summary.warning {
            Self::report_warning(&warning.to_string());
        }

        match summary.kind {
            ModelKind::Solid => {
                let n = summary.lumps.len();
                println!(
                    "...result model contains {} {}",
                    n.to_string().cyan(),
                    if n == 1 { "lump" } else { "lumps" }
                );
                for (i, lump) in summary.lumps.iter().enumerate() {
                    println!(
                        "...lump {}: {} vertices, {} polygon faces{}",
                        i + 1,
                        lump.vertices,
                        lump.faces,
                        if lump.triangulated {
                            format!(", triangulated into {} triangles", lump.triangles)
                        } else {
                            String::new()
                        }
                    );
                    if !lump.check.is_closed() {
                        Self::report_warning(&format!(
                            "lump {} is not closed ({} open edges, {} non-manifold edges)",
                            i + 1,
                            lump.check.open_edges,
                            lump.check.non_manifold_edges
                        ));
                    }
                }
            }
            ModelKind::Shape2d => {
                let n = summary.loops.len();
                println!(
                    "...result model contains {} {}",
                    n.to_string().cyan(),
                    if n == 1 { "loop" } else { "loops" }
                );
            }
        }

        println!(
            "  {} {} booleans in {}, total {}",
            "Time:".bright_black(),
            summary.nbool,
            Self::format_duration(summary.boolean_time).yellow(),
            Self::format_duration(summary.total_time).yellow()
        );

        for artifact in &summary.artifacts {
            println!(
                "{} {}",
                format!("Created {:<8} file:", artifact.format.label()).green(),
                self.display_name(&artifact.path)
            );
        }
    }

    /// Report error
    pub fn report_error(message: &str) {
        eprintln!("{} {}", "Error:".red().bold(), message);
    }

    /// Report warning
    pub fn report_warning(message: &str) {
        println!("{} {}", "WARNING:".yellow().bold(), message);
    }

    fn format_duration(duration: Duration) -> String {
        let secs = duration.as_secs_f64();
        if secs < 1.0 {
            format!("{:.1}ms", secs * 1000.0)
        } else {
            format!("{:.3}s", secs)
        }
    }
}
