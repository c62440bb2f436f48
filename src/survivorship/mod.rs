// src/survivorship/mod.rs - collapsing clusters into golden records

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;

use crate::clustering::Cluster;
use crate::config::SurvivorshipPolicy;
use crate::matching::normalize::best_uid;
use crate::models::records::{CandidatePair, GoldenRecord, RawRecord};

/// Rank of a source under the policy's priority list; sources absent from
/// the list (or an empty list) rank last, leaving recency to decide.
fn priority_rank(source: &str, policy: &SurvivorshipPolicy) -> usize {
    policy
        .source_priority
        .iter()
        .position(|s| s == source)
        .unwrap_or(policy.source_priority.len())
}

/// Survivorship ordering: priority rank ascending, then `updated_at`
/// descending with missing timestamps last.
fn survivor_order(a: &RawRecord, b: &RawRecord, policy: &SurvivorshipPolicy) -> Ordering {
    priority_rank(&a.source, policy)
        .cmp(&priority_rank(&b.source, policy))
        .then_with(|| match (a.updated_at, b.updated_at) {
            (Some(ta), Some(tb)) => tb.cmp(&ta),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        })
}

fn first_non_empty<'a, F>(ordered: &[&'a RawRecord], get: F) -> String
where
    F: Fn(&'a RawRecord) -> &'a str,
{
    ordered
        .iter()
        .map(|r| get(r))
        .find(|v| !v.is_empty())
        .unwrap_or("")
        .to_string()
}

fn longest_non_empty<'a, F>(ordered: &[&'a RawRecord], get: F) -> String
where
    F: Fn(&'a RawRecord) -> &'a str,
{
    let mut best = "";
    for record in ordered {
        let value = get(record);
        // Strictly longer, so ties keep the earlier member by sort order
        if value.len() > best.len() {
            best = value;
        }
    }
    best.to_string()
}

/// Collapses one cluster into a golden record under the survivorship
/// policy. `internal_scores` holds the scores of generated pairs whose two
/// endpoints both lie in this cluster; a cluster with no internal pairs has
/// confidence 1.0.
pub fn merge_cluster(
    cluster: &Cluster,
    records: &[RawRecord],
    internal_scores: &[f64],
    policy: &SurvivorshipPolicy,
) -> GoldenRecord {
    let mut ordered: Vec<&RawRecord> = cluster.members.iter().map(|&i| &records[i]).collect();
    ordered.sort_by(|a, b| survivor_order(a, b, policy));

    let email = first_non_empty(&ordered, |r| r.email.as_str());
    let phone = first_non_empty(&ordered, |r| r.phone.as_str());
    let first = first_non_empty(&ordered, |r| r.first.as_str());
    let last = first_non_empty(&ordered, |r| r.last.as_str());
    let address = longest_non_empty(&ordered, |r| r.address.as_str());
    let postal = first_non_empty(&ordered, |r| r.postal.as_str());
    let city = first_non_empty(&ordered, |r| r.city.as_str());
    let region = first_non_empty(&ordered, |r| r.region.as_str());

    // The fingerprint reflects the merged identity, not any single member
    let uid = best_uid(&email, &phone, &first, &last, &postal).unwrap_or_default();

    let source_ids: Vec<(String, String)> = ordered
        .iter()
        .map(|r| (r.source.clone(), r.id.clone()))
        .collect();
    let sources: Vec<String> = ordered
        .iter()
        .map(|r| r.source.clone())
        .collect::<BTreeSet<String>>()
        .into_iter()
        .collect();

    let confidence = if internal_scores.is_empty() {
        1.0
    } else {
        internal_scores.iter().sum::<f64>() / internal_scores.len() as f64
    };

    GoldenRecord {
        uid,
        email,
        phone,
        first,
        last,
        address,
        postal,
        city,
        region,
        source_count: source_ids.len(),
        source_ids,
        sources,
        confidence,
        cluster_id: cluster.id,
    }
}

/// Merges every cluster into a golden record. Clusters are independent, so
/// the merge step runs in parallel; output order follows cluster order.
pub fn build_golden_records(
    records: &[RawRecord],
    clusters: &[Cluster],
    pairs: &[CandidatePair],
    policy: &SurvivorshipPolicy,
) -> Vec<GoldenRecord> {
    let mut cluster_of = vec![usize::MAX; records.len()];
    for cluster in clusters {
        for &member in &cluster.members {
            cluster_of[member] = cluster.id;
        }
    }

    let mut scores_by_cluster: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
    for pair in pairs {
        if cluster_of[pair.left] == cluster_of[pair.right] {
            scores_by_cluster
                .entry(cluster_of[pair.left])
                .or_default()
                .push(pair.score);
        }
    }

    clusters
        .par_iter()
        .map(|cluster| {
            let scores = scores_by_cluster
                .get(&cluster.id)
                .map(|v| v.as_slice())
                .unwrap_or(&[]);
            merge_cluster(cluster, records, scores, policy)
        })
        .collect()
}
