// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! DXF (R12) exporter writing each loop as a closed POLYLINE

use crate::geometry::Polyset;
use anyhow::{Context, Result};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

/// Group code / value pair
fn pair<W: Write>(w: &mut W, code: u16, value: impl std::fmt::Display) -> std::io::Result<()> {
    writeln!(w, "{:>3}", code)?;
    writeln!(w, "{}", value)
}

pub fn write(polyset: &Polyset, path: &Path) -> Result<()> {
    let file = File::create(path).with_context(|| format!("creating {}", path.display()))?;
    let mut w = BufWriter::new(file);

    pair(&mut w, 0, "SECTION")?;
    pair(&mut w, 2, "ENTITIES")?;
    for polygon in polyset {
        pair(&mut w, 0, "POLYLINE")?;
        pair(&mut w, 8, 0)?;
        pair(&mut w, 66, 1)?;
        pair(&mut w, 70, 1)?;
        for p in &polygon.points {
            pair(&mut w, 0, "VERTEX")?;
            pair(&mut w, 8, 0)?;
            pair(&mut w, 10, p.x)?;
            pair(&mut w, 20, p.y)?;
            pair(&mut w, 30, 0.0)?;
        }
        pair(&mut w, 0, "SEQEND")?;
        pair(&mut w, 8, 0)?;
    }
    pair(&mut w, 0, "ENDSEC")?;
    pair(&mut w, 0, "EOF")?;
    w.flush()?;
    Ok(())
}
