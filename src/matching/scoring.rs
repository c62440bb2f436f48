// src/matching/scoring.rs - weighted pairwise similarity and decision labels

use std::collections::BTreeSet;

use log::debug;
use rayon::prelude::*;

use crate::config::{MatchWeights, Thresholds};
use crate::matching::blocking::{build_blocks, BlockingRule};
use crate::models::records::{CandidatePair, MatchDecision, RawRecord};

fn first_initial(record: &RawRecord) -> String {
    record
        .first
        .trim()
        .chars()
        .next()
        .map(|c| c.to_lowercase().to_string())
        .unwrap_or_default()
}

/// Additive weighted similarity for two records, capped at 1.0. Each rule
/// contributes its configured weight iff its condition holds on the
/// canonical field forms.
pub fn score_pair(a: &RawRecord, b: &RawRecord, weights: &MatchWeights) -> f64 {
    let mut score = 0.0;

    if !a.norm_email.is_empty() && a.norm_email == b.norm_email {
        score += weights.email_exact;
    }

    if !a.norm_phone.is_empty() && a.norm_phone == b.norm_phone {
        score += weights.phone_exact;
    }

    let last_a = a.last.trim().to_lowercase();
    let last_b = b.last.trim().to_lowercase();
    if !last_a.is_empty() && last_a == last_b && first_initial(a) == first_initial(b) {
        score += weights.name_address;
    }

    if !a.postal_fsa.is_empty() && a.postal_fsa == b.postal_fsa {
        score += weights.postal_match;
    }

    score.min(1.0)
}

/// Assigns the decision label for a score under the run's thresholds.
pub fn decide(score: f64, thresholds: &Thresholds) -> MatchDecision {
    if score >= thresholds.auto_merge {
        MatchDecision::AutoMerge
    } else if score >= thresholds.needs_review {
        MatchDecision::NeedsReview
    } else {
        MatchDecision::NoMatch
    }
}

/// Enumerates and scores unordered candidate pairs within blocking groups.
///
/// A pair sharing several blocking keys is scored once. Output order is
/// ascending by `(left, right)` so repeated runs over the same working set
/// produce identical pair tables.
pub fn generate_candidate_pairs(
    records: &[RawRecord],
    rules: &[BlockingRule],
    weights: &MatchWeights,
    thresholds: &Thresholds,
) -> Vec<CandidatePair> {
    let blocks = build_blocks(rules, records);
    debug!("Built {} blocking groups", blocks.len());

    let mut pair_set: BTreeSet<(usize, usize)> = BTreeSet::new();
    for members in blocks.values() {
        for (i, &left) in members.iter().enumerate() {
            for &right in &members[i + 1..] {
                let ordered = if left < right { (left, right) } else { (right, left) };
                pair_set.insert(ordered);
            }
        }
    }

    let unique_pairs: Vec<(usize, usize)> = pair_set.into_iter().collect();
    debug!("Scoring {} unique candidate pairs", unique_pairs.len());

    unique_pairs
        .par_iter()
        .map(|&(left, right)| {
            let a = &records[left];
            let b = &records[right];
            let score = score_pair(a, b, weights);
            CandidatePair {
                left,
                right,
                score,
                decision: decide(score, thresholds),
                left_source: a.source.clone(),
                right_source: b.source.clone(),
            }
        })
        .collect()
}
