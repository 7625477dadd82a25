// SPDX-License-Identifier: Apache-2.0
// Copyright (c) 2025 Polyframe Inc.

//! Face connectivity through shared vertex indices

use ahash::AHashMap;

fn find(parent: &mut [usize], mut i: usize) -> usize {
    while parent[i] != i {
        parent[i] = parent[parent[i]];
        i = parent[i];
    }
    i
}

/// Group faces that share vertices, directly or through other faces.
///
/// Returns the face indices of each group, groups ordered by the first face that
/// belongs to them. Empty faces belong to no group.
pub fn connected_components<'a>(
    vertex_count: usize,
    faces: impl IntoIterator<Item = &'a [usize]> + Clone,
) -> Vec<Vec<usize>> {
    let mut parent: Vec<usize> = (0..vertex_count).collect();
    for face in faces.clone() {
        let Some((&first, rest)) = face.split_first() else {
            continue;
        };
        let root = find(&mut parent, first);
        for &i in rest {
            let other = find(&mut parent, i);
            parent[other] = root;
        }
    }

    let mut slots: AHashMap<usize, usize> = AHashMap::new();
    let mut components: Vec<Vec<usize>> = Vec::new();
    for (f, face) in faces.into_iter().enumerate() {
        let Some(&first) = face.first() else {
            continue;
        };
        let root = find(&mut parent, first);
        let slot = *slots.entry(root).or_insert_with(|| {
            components.push(Vec::new());
            components.len() - 1
        });
        components[slot].push(f);
    }
    components
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chained_faces_join() {
        // 0-1 joins 1-2 through vertex 1; 3-4 stands apart; the empty face is skipped
        let faces: Vec<Vec<usize>> = vec![vec![3, 4], vec![0, 1], vec![], vec![1, 2], vec![4, 3]];
        let components = connected_components(5, faces.iter().map(Vec::as_slice));
        assert_eq!(components, vec![vec![0, 4], vec![1, 3]]);
    }

    #[test]
    fn test_no_faces() {
        let faces: Vec<Vec<usize>> = Vec::new();
        assert!(connected_components(3, faces.iter().map(Vec::as_slice)).is_empty());
    }
}
