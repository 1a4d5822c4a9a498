//! Pairwise-difference clustering for angular data.
//!
//! Two segments agree when the absolute difference of their values is
//! within the cutoff. Treating every agreeing pair (upper triangle only, so
//! no self-pairs and no double counting) as an edge of an undirected graph
//! over value indices, clusters are the connected components, computed with
//! a union-find keyed by index. Indices that agree with no peer join no
//! cluster; a sequence with no agreeing pair at all is unfittable and
//! yields `None`.
//!
//! Differences are taken on the real line, not on the circle: values near
//! +180 and −180 are far apart. Typical angular deviations along one
//! filament stay well inside the wrap-around regime, and downstream
//! consumers depend on the literal behaviour.

use super::{top_cluster_index, Clustering};

struct DisjointSet {
    parent: Vec<usize>,
    size: Vec<usize>,
}

impl DisjointSet {
    fn new(n: usize) -> Self {
        Self {
            parent: (0..n).collect(),
            size: vec![1; n],
        }
    }

    fn find(&mut self, mut x: usize) -> usize {
        while self.parent[x] != x {
            self.parent[x] = self.parent[self.parent[x]];
            x = self.parent[x];
        }
        x
    }

    fn union(&mut self, a: usize, b: usize) {
        let (mut ra, mut rb) = (self.find(a), self.find(b));
        if ra == rb {
            return;
        }
        if self.size[ra] < self.size[rb] {
            std::mem::swap(&mut ra, &mut rb);
        }
        self.parent[rb] = ra;
        self.size[ra] += self.size[rb];
    }
}

/// Clusters `values` by pairwise closeness; `None` when no pair lies within
/// `cutoff` of each other.
pub fn cluster_within_cutoff(values: &[f64], cutoff: f64) -> Option<Clustering> {
    let n = values.len();
    let mut sets = DisjointSet::new(n);
    let mut paired = vec![false; n];
    for i in 0..n {
        for j in (i + 1)..n {
            if (values[i] - values[j]).abs() <= cutoff {
                sets.union(i, j);
                paired[i] = true;
                paired[j] = true;
            }
        }
    }

    // Components in ascending first-member order: iterating indices in order
    // makes each cluster's first appearance its minimum member.
    let mut clusters: Vec<Vec<usize>> = Vec::new();
    let mut slot_of_root: Vec<Option<usize>> = vec![None; n];
    for idx in 0..n {
        if !paired[idx] {
            continue;
        }
        let root = sets.find(idx);
        match slot_of_root[root] {
            Some(slot) => clusters[slot].push(idx),
            None => {
                slot_of_root[root] = Some(clusters.len());
                clusters.push(vec![idx]);
            }
        }
    }

    let top_idx = top_cluster_index(&clusters)?;
    let top = clusters[top_idx].clone();
    let rest = clusters
        .iter()
        .enumerate()
        .filter(|(i, _)| *i != top_idx)
        .flat_map(|(_, members)| members.iter().copied())
        .collect();
    Some(Clustering { top, rest })
}
