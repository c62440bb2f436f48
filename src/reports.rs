// src/reports.rs - persistence of golden records, match events, and metrics

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::models::records::{CandidatePair, GoldenRecord, RawRecord};
use crate::models::stats::RunMetrics;
use crate::utils::csv;

pub const GOLDEN_FILE: &str = "golden_contacts.csv";
pub const EVENTS_FILE: &str = "unify_events.csv";
pub const METRICS_FILE: &str = "run_metrics.json";

const GOLDEN_HEADER: [&str; 14] = [
    "uid",
    "email",
    "phone",
    "first",
    "last",
    "address",
    "postal",
    "city",
    "region",
    "source_ids",
    "source_count",
    "sources",
    "confidence",
    "cluster_id",
];

const EVENTS_HEADER: [&str; 8] = [
    "left",
    "right",
    "score",
    "decision",
    "left_source",
    "right_source",
    "timestamp",
    "run_id",
];

#[derive(Serialize)]
struct MetricsReport<'a> {
    run_id: &'a str,
    generated_at: String,
    #[serde(flatten)]
    metrics: &'a RunMetrics,
}

fn header_row(fields: &[&str]) -> String {
    let owned: Vec<String> = fields.iter().map(|f| f.to_string()).collect();
    csv::format_row(&owned)
}

/// Writes the golden records table: one row per cluster.
fn write_golden(path: &Path, golden: &[GoldenRecord]) -> Result<()> {
    let mut out = header_row(&GOLDEN_HEADER);
    for record in golden {
        let source_ids: Vec<String> = record
            .source_ids
            .iter()
            .map(|(source, id)| format!("{}:{}", source, id))
            .collect();
        out.push_str(&csv::format_row(&[
            record.uid.clone(),
            record.email.clone(),
            record.phone.clone(),
            record.first.clone(),
            record.last.clone(),
            record.address.clone(),
            record.postal.clone(),
            record.city.clone(),
            record.region.clone(),
            source_ids.join(";"),
            record.source_count.to_string(),
            record.sources.join(";"),
            format!("{:.4}", record.confidence),
            record.cluster_id.to_string(),
        ]));
    }
    fs::write(path, out).with_context(|| format!("failed to write {}", path.display()))
}

/// Writes the audit table: one row per generated candidate pair, including
/// `needs_review` and `no_match` decisions. The header is written even when
/// no pairs were generated.
fn write_events(
    path: &Path,
    records: &[RawRecord],
    pairs: &[CandidatePair],
    run_id: &str,
    started_at: DateTime<Utc>,
) -> Result<()> {
    let timestamp = started_at.to_rfc3339();
    let mut out = header_row(&EVENTS_HEADER);
    for pair in pairs {
        out.push_str(&csv::format_row(&[
            records[pair.left].key(),
            records[pair.right].key(),
            format!("{:.4}", pair.score),
            pair.decision.as_str().to_string(),
            pair.left_source.clone(),
            pair.right_source.clone(),
            timestamp.clone(),
            run_id.to_string(),
        ]));
    }
    fs::write(path, out).with_context(|| format!("failed to write {}", path.display()))
}

fn write_metrics(
    path: &Path,
    metrics: &RunMetrics,
    run_id: &str,
    started_at: DateTime<Utc>,
) -> Result<()> {
    let report = MetricsReport {
        run_id,
        generated_at: started_at.to_rfc3339(),
        metrics,
    };
    let json = serde_json::to_string_pretty(&report).context("failed to serialize metrics")?;
    fs::write(path, json).with_context(|| format!("failed to write {}", path.display()))
}

/// Persists all three run outputs under `out_dir`, creating it if needed.
pub fn persist_run(
    out_dir: &Path,
    records: &[RawRecord],
    golden: &[GoldenRecord],
    pairs: &[CandidatePair],
    metrics: &RunMetrics,
    run_id: &str,
    started_at: DateTime<Utc>,
) -> Result<()> {
    fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create output directory {}", out_dir.display()))?;
    write_golden(&out_dir.join(GOLDEN_FILE), golden)?;
    write_events(&out_dir.join(EVENTS_FILE), records, pairs, run_id, started_at)?;
    write_metrics(&out_dir.join(METRICS_FILE), metrics, run_id, started_at)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::records::MatchDecision;

    fn raw(id: &str, source: &str) -> RawRecord {
        RawRecord {
            id: id.to_string(),
            source: source.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn test_persist_empty_run_writes_headers() {
        let dir = tempfile::tempdir().unwrap();
        let metrics = RunMetrics::compute(0, 0, &[]);
        persist_run(dir.path(), &[], &[], &[], &metrics, "run-0", Utc::now()).unwrap();

        let events = fs::read_to_string(dir.path().join(EVENTS_FILE)).unwrap();
        assert_eq!(
            events.trim_end(),
            "left,right,score,decision,left_source,right_source,timestamp,run_id"
        );
        let golden = fs::read_to_string(dir.path().join(GOLDEN_FILE)).unwrap();
        assert!(golden.starts_with("uid,email,phone"));
        let metrics_json = fs::read_to_string(dir.path().join(METRICS_FILE)).unwrap();
        assert!(metrics_json.contains("\"total_records\": 0"));
        assert!(metrics_json.contains("\"run_id\": \"run-0\""));
    }

    #[test]
    fn test_events_rows_use_source_qualified_keys() {
        let dir = tempfile::tempdir().unwrap();
        let records = vec![raw("L1", "leads"), raw("O1", "sales")];
        let pairs = vec![CandidatePair {
            left: 0,
            right: 1,
            score: 0.95,
            decision: MatchDecision::AutoMerge,
            left_source: "leads".to_string(),
            right_source: "sales".to_string(),
        }];
        let metrics = RunMetrics::compute(2, 1, &pairs);
        persist_run(dir.path(), &records, &[], &pairs, &metrics, "run-1", Utc::now()).unwrap();

        let events = fs::read_to_string(dir.path().join(EVENTS_FILE)).unwrap();
        let data_line = events.lines().nth(1).unwrap();
        assert!(data_line.starts_with("leads:L1,sales:O1,0.9500,auto_merge,leads,sales,"));
        assert!(data_line.ends_with(",run-1"));
    }
}
