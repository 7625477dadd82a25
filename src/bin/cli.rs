// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! xcsg command line

use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use xcsg::cli::Reporter;
use xcsg::io::{Format, FormatSet};
use xcsg::{Config, Pipeline};

#[derive(Parser)]
#[command(name = "xcsg")]
#[command(version, about = "Constructive solid geometry from .xcsg/.csg files to mesh and vector formats", long_about = None)]
struct Cli {
    /// Input .xcsg file (or OpenSCAD .csg file)
    #[arg(value_name = "XCSG_FILE")]
    xcsg_file: PathBuf,

    /// OpenSCAD .csg output (3D and 2D)
    #[arg(long)]
    csg: bool,

    /// AMF output (3D)
    #[arg(long)]
    amf: bool,

    /// OBJ output (3D)
    #[arg(long)]
    obj: bool,

    /// OFF output (3D)
    #[arg(long)]
    off: bool,

    /// Binary STL output (3D)
    #[arg(long)]
    stl: bool,

    /// ASCII STL output (3D)
    #[arg(long)]
    astl: bool,

    /// SVG output (2D)
    #[arg(long)]
    svg: bool,

    /// DXF output (2D)
    #[arg(long)]
    dxf: bool,

    /// Display full paths of created files
    #[arg(long)]
    fullpath: bool,

    /// Configuration file (defaults to ./xcsg.toml when present)
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Maximum number of boolean operations per model
    #[arg(long, value_name = "N")]
    max_bool: Option<usize>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn formats(&self) -> FormatSet {
        [
            (self.csg, Format::Csg),
            (self.amf, Format::Amf),
            (self.obj, Format::Obj),
            (self.off, Format::Off),
            (self.stl, Format::Stl),
            (self.astl, Format::AsciiStl),
            (self.svg, Format::Svg),
            (self.dxf, Format::Dxf),
        ]
        .into_iter()
        .filter_map(|(on, format)| on.then_some(format))
        .collect()
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(&cli) {
        Reporter::report_error(&format!("{:#}", e));
        std::process::exit(1);
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "xcsg=debug" } else { "xcsg=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: &Cli) -> Result<()> {
    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    if let Some(max_bool) = cli.max_bool {
        config.max_bool = max_bool;
    }

    let mut pipeline = Pipeline::new(config).context("failed to initialise pipeline")?;
    let summary = pipeline
        .run_file(&cli.xcsg_file, cli.formats())
        .with_context(|| format!("failed to process {}", cli.xcsg_file.display()))?;

    Reporter::new(cli.fullpath).report_summary(&summary);
    Ok(())
}
