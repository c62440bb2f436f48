// src/clustering/mod.rs - transitive cluster construction from auto-merge pairs

pub mod union_find;

use std::collections::BTreeMap;

use log::debug;

use crate::models::records::{CandidatePair, MatchDecision};
use union_find::UnionFind;

/// An equivalence class of record indices. `id` is the representative
/// (lowest member index); `members` is ascending.
#[derive(Debug, Clone)]
pub struct Cluster {
    pub id: usize,
    pub members: Vec<usize>,
}

/// Builds clusters by transitively unioning records connected by
/// `auto_merge` pairs. Every record lands in exactly one cluster;
/// unmatched records become singletons. Clustering is transitive: A-B and
/// B-C auto-merges place A, B, and C together even when A-C was never
/// scored directly.
pub fn build_clusters(record_count: usize, pairs: &[CandidatePair]) -> Vec<Cluster> {
    let mut uf = UnionFind::new(record_count);
    let mut merges = 0usize;
    for pair in pairs {
        if pair.decision == MatchDecision::AutoMerge {
            uf.union(pair.left, pair.right);
            merges += 1;
        }
    }

    let mut by_root: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for idx in 0..record_count {
        by_root.entry(uf.find(idx)).or_default().push(idx);
    }
    debug!(
        "{} auto-merge unions over {} records produced {} clusters",
        merges,
        record_count,
        by_root.len()
    );

    by_root
        .into_iter()
        .map(|(id, members)| Cluster { id, members })
        .collect()
}
