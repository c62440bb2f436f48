// src/models/stats.rs - run-level summary metrics

use serde::Serialize;

use crate::models::records::{CandidatePair, MatchDecision};

/// Summary metrics for one resolution run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunMetrics {
    pub total_records: usize,
    pub golden_records: usize,
    pub dup_rate: f64,
    pub compression_ratio: f64,
    pub total_pairs: usize,
    pub auto_merge_count: usize,
    pub auto_merge_rate: f64,
    pub needs_review_count: usize,
    pub needs_review_rate: f64,
}

impl RunMetrics {
    pub fn compute(total_records: usize, golden_records: usize, pairs: &[CandidatePair]) -> Self {
        let dup_rate = if total_records > 0 {
            1.0 - golden_records as f64 / total_records as f64
        } else {
            0.0
        };
        let compression_ratio = if golden_records > 0 {
            total_records as f64 / golden_records as f64
        } else {
            1.0
        };

        let total_pairs = pairs.len();
        let auto_merge_count = pairs
            .iter()
            .filter(|p| p.decision == MatchDecision::AutoMerge)
            .count();
        let needs_review_count = pairs
            .iter()
            .filter(|p| p.decision == MatchDecision::NeedsReview)
            .count();
        let rate = |count: usize| {
            if total_pairs > 0 {
                count as f64 / total_pairs as f64
            } else {
                0.0
            }
        };

        RunMetrics {
            total_records,
            golden_records,
            dup_rate,
            compression_ratio,
            total_pairs,
            auto_merge_count,
            auto_merge_rate: rate(auto_merge_count),
            needs_review_count,
            needs_review_rate: rate(needs_review_count),
        }
    }
}
