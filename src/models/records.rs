// src/models/records.rs - core data model for a resolution run

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::matching::normalize::{normalize_email, normalize_phone, postal_fsa};

/// One row from a source table after canonical column mapping.
///
/// Records are immutable once loaded. Absent field values are stored as
/// empty strings so blocking and scoring can treat every field access as a
/// total operation. The `norm_*` fields hold canonical comparable forms,
/// computed once at load time via [`RawRecord::finalize_normalized`].
#[derive(Debug, Clone, Default)]
pub struct RawRecord {
    pub id: String,
    pub source: String,
    pub email: String,
    pub phone: String,
    pub first: String,
    pub last: String,
    pub address: String,
    pub postal: String,
    pub city: String,
    pub region: String,
    /// Recency tie-break for survivorship; the per-source load time when no
    /// usable timestamp column is mapped.
    pub updated_at: Option<DateTime<Utc>>,

    pub norm_email: String,
    pub norm_phone: String,
    pub postal_fsa: String,
}

impl RawRecord {
    /// Computes the canonical key fields from the raw values.
    pub fn finalize_normalized(&mut self) {
        self.norm_email = normalize_email(&self.email);
        self.norm_phone = normalize_phone(&self.phone);
        self.postal_fsa = postal_fsa(&self.postal);
    }

    /// Source-qualified identifier, unique within a run.
    pub fn key(&self) -> String {
        format!("{}:{}", self.source, self.id)
    }
}

/// Outcome label for a scored candidate pair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchDecision {
    AutoMerge,
    NeedsReview,
    NoMatch,
}

impl MatchDecision {
    pub fn as_str(&self) -> &'static str {
        match self {
            MatchDecision::AutoMerge => "auto_merge",
            MatchDecision::NeedsReview => "needs_review",
            MatchDecision::NoMatch => "no_match",
        }
    }
}

/// A scored pair of records drawn from the same blocking group. Endpoints
/// are indices into the run's working set, with `left < right`.
#[derive(Debug, Clone)]
pub struct CandidatePair {
    pub left: usize,
    pub right: usize,
    pub score: f64,
    pub decision: MatchDecision,
    pub left_source: String,
    pub right_source: String,
}

/// The survivorship-merged representation of one cluster.
#[derive(Debug, Clone, Serialize)]
pub struct GoldenRecord {
    /// Identity fingerprint over the resolved field values; empty when no
    /// fingerprint could be derived.
    pub uid: String,
    pub email: String,
    pub phone: String,
    pub first: String,
    pub last: String,
    pub address: String,
    pub postal: String,
    pub city: String,
    pub region: String,
    /// Contributing `(source, id)` pairs in survivorship order.
    pub source_ids: Vec<(String, String)>,
    pub source_count: usize,
    /// Sorted distinct source names.
    pub sources: Vec<String>,
    pub confidence: f64,
    pub cluster_id: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_finalize_normalized() {
        let mut record = RawRecord {
            id: "L1".to_string(),
            source: "leads".to_string(),
            email: "Ann.Lee+promo@Gmail.com".to_string(),
            phone: "+1 (555) 123-4567".to_string(),
            postal: "m5v 1a1".to_string(),
            ..Default::default()
        };
        record.finalize_normalized();
        assert_eq!(record.norm_email, "annlee@gmail.com");
        assert_eq!(record.norm_phone, "5551234567");
        assert_eq!(record.postal_fsa, "M5V");
        assert_eq!(record.key(), "leads:L1");
    }

    #[test]
    fn test_decision_labels() {
        assert_eq!(MatchDecision::AutoMerge.as_str(), "auto_merge");
        assert_eq!(MatchDecision::NeedsReview.as_str(), "needs_review");
        assert_eq!(MatchDecision::NoMatch.as_str(), "no_match");
    }
}
