// src/pipeline.rs - the resolution run: load, block, score, cluster, merge, persist

use std::path::Path;

use anyhow::Result;
use chrono::Utc;
use log::info;
use uuid::Uuid;

use crate::clustering::{self, Cluster};
use crate::config::UnifyPolicy;
use crate::loader;
use crate::matching::{blocking, scoring};
use crate::models::records::{CandidatePair, GoldenRecord, RawRecord};
use crate::models::stats::RunMetrics;
use crate::reports;
use crate::survivorship;

/// Everything a resolution run produces, before persistence.
#[derive(Debug)]
pub struct ResolutionOutcome {
    pub golden: Vec<GoldenRecord>,
    pub pairs: Vec<CandidatePair>,
    pub clusters: Vec<Cluster>,
    pub metrics: RunMetrics,
}

/// The pure core: blocking, scoring, clustering, and merging over an
/// already-loaded working set. No I/O; identical inputs produce identical
/// outputs.
pub fn resolve(records: &[RawRecord], policy: &UnifyPolicy) -> Result<ResolutionOutcome> {
    let rules = blocking::parse_rules(&policy.blocking)?;

    let pairs =
        scoring::generate_candidate_pairs(records, &rules, &policy.weights, &policy.thresholds);
    info!("Generated {} candidate pairs", pairs.len());

    let clusters = clustering::build_clusters(records.len(), &pairs);
    info!("Formed {} clusters from {} records", clusters.len(), records.len());

    let golden = survivorship::build_golden_records(records, &clusters, &pairs, &policy.survivorship);
    let metrics = RunMetrics::compute(records.len(), golden.len(), &pairs);

    Ok(ResolutionOutcome {
        golden,
        pairs,
        clusters,
        metrics,
    })
}

/// A full run: load the configured sources, resolve, and persist the golden
/// records, pair audit trail, and metrics under `out_dir`.
pub fn run(policy: &UnifyPolicy, out_dir: &Path) -> Result<RunMetrics> {
    policy.validate()?;

    let run_id = Uuid::new_v4().to_string();
    let started_at = Utc::now();
    info!("Starting identity unification run {}", run_id);

    let records = loader::load_sources(policy)?;
    info!(
        "Loaded {} records from {} configured sources",
        records.len(),
        policy.sources.len()
    );

    let outcome = resolve(&records, policy)?;
    reports::persist_run(
        out_dir,
        &records,
        &outcome.golden,
        &outcome.pairs,
        &outcome.metrics,
        &run_id,
        started_at,
    )?;

    let metrics = outcome.metrics;
    info!("=== Unification Summary ===");
    info!("Run ID: {}", run_id);
    info!("Total records: {}", metrics.total_records);
    info!("Golden records: {}", metrics.golden_records);
    info!("Duplicate rate: {:.1}%", metrics.dup_rate * 100.0);
    info!("Auto-merge rate: {:.1}%", metrics.auto_merge_rate * 100.0);
    info!("Needs-review pairs: {}", metrics.needs_review_count);

    Ok(metrics)
}
