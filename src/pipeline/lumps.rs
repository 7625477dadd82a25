// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Splits a boolean result into its connected lumps

use crate::geometry::{connected_components, Polyhedron};

/// Connected components of a polyhedron, materialized on demand
#[derive(Debug, Clone)]
pub struct Lumps {
    source: Polyhedron,
    /// Face indices of each component, in order of first appearance
    components: Vec<Vec<usize>>,
}

impl Lumps {
    pub fn len(&self) -> usize {
        self.components.len()
    }

    pub fn is_empty(&self) -> bool {
        self.components.is_empty()
    }

    /// Build lump `index` as a standalone polyhedron with compacted vertices
    pub fn get(&self, index: usize) -> Option<Polyhedron> {
        let faces = self.components.get(index)?;
        let mut remap: Vec<Option<usize>> = vec![None; self.source.v_size()];
        let mut lump = Polyhedron::empty();
        for &f in faces {
            let face = self.source.faces[f]
                .iter()
                .map(|&i| *remap[i].get_or_insert_with(|| lump.add_vertex(self.source.vertices[i])))
                .collect();
            lump.add_face(face);
        }
        Some(lump)
    }

    pub fn iter(&self) -> impl Iterator<Item = Polyhedron> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }
}

/// Splits boolean results into lumps of faces connected through shared vertices
#[derive(Debug, Default, Clone, Copy)]
pub struct ManifoldExtractor;

impl ManifoldExtractor {
    pub fn extract(result: Polyhedron) -> Lumps {
        let components = connected_components(result.v_size(), result.faces.iter().map(Vec::as_slice));

        tracing::debug!("extracted {} lumps from {} faces", components.len(), result.f_size());
        Lumps {
            source: result,
            components,
        }
    }
}
