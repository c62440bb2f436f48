// src/loader.rs - per-source CSV loading and canonical column mapping

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::config::UnifyPolicy;
use crate::models::records::RawRecord;
use crate::utils::csv;

/// Loads every configured source into one working set.
///
/// A source that cannot be loaded (unreadable file, no canonical mapping,
/// or no usable id column after mapping) is skipped with a warning; the run
/// continues with the remaining sources. Zero loaded records is a valid
/// outcome.
pub fn load_sources(policy: &UnifyPolicy) -> Result<Vec<RawRecord>> {
    let mut records: Vec<RawRecord> = Vec::new();
    for (source_name, locator) in &policy.sources {
        let mapping = match policy.canonical_map.get(source_name) {
            Some(mapping) => mapping,
            None => {
                warn!(
                    "Source '{}' has no canonical_map entry; skipping",
                    source_name
                );
                continue;
            }
        };
        match load_one_source(source_name, Path::new(locator), mapping) {
            Ok(mut batch) => {
                info!("Loaded {} records from source '{}'", batch.len(), source_name);
                records.append(&mut batch);
            }
            Err(err) => warn!("Skipping source '{}': {:#}", source_name, err),
        }
    }
    Ok(records)
}

fn load_one_source(
    source: &str,
    path: &Path,
    mapping: &BTreeMap<String, String>,
) -> Result<Vec<RawRecord>> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let rows = csv::parse(&text);
    let (header, data) = match rows.split_first() {
        Some(split) => split,
        None => return Ok(Vec::new()),
    };

    // canonical field -> column index, for the columns that actually exist
    let mut columns: BTreeMap<&str, usize> = BTreeMap::new();
    for (canonical, column) in mapping {
        if let Some(idx) = header.iter().position(|h| h == column) {
            columns.insert(canonical.as_str(), idx);
        }
    }
    let id_idx = match columns.get("id") {
        Some(&idx) => idx,
        None => bail!("no usable id column after canonical mapping"),
    };

    let loaded_at = Utc::now();
    let mut out = Vec::new();
    for row in data {
        if row.iter().all(|field| field.trim().is_empty()) {
            continue;
        }
        let id = row
            .get(id_idx)
            .map(|v| v.trim().to_string())
            .unwrap_or_default();
        if id.is_empty() {
            debug!("Dropping row without id in source '{}'", source);
            continue;
        }

        let get = |field: &str| -> String {
            columns
                .get(field)
                .and_then(|&idx| row.get(idx))
                .cloned()
                .unwrap_or_default()
        };
        let updated_at = columns
            .get("updated_at")
            .and_then(|&idx| row.get(idx))
            .and_then(|v| DateTime::parse_from_rfc3339(v.trim()).ok())
            .map(|ts| ts.with_timezone(&Utc))
            .unwrap_or(loaded_at);

        let mut record = RawRecord {
            id,
            source: source.to_string(),
            email: get("email"),
            phone: get("phone"),
            first: get("first"),
            last: get("last"),
            address: get("address"),
            postal: get("postal"),
            city: get("city"),
            region: get("region"),
            updated_at: Some(updated_at),
            ..Default::default()
        };
        record.finalize_normalized();
        out.push(record);
    }
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &Path, name: &str, contents: &str) -> String {
        let path = dir.join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        path.to_string_lossy().to_string()
    }

    fn policy_yaml(sources: &[(&str, &str)], maps: &str) -> UnifyPolicy {
        let source_lines: Vec<String> = sources
            .iter()
            .map(|(name, path)| format!("  {}: \"{}\"", name, path))
            .collect();
        let yaml = format!(
            "sources:\n{}\ncanonical_map:\n{}\nblocking: [email_exact]\nweights:\n  email_exact: 0.9\nthresholds:\n  auto_merge: 0.9\n  needs_review: 0.7\n",
            source_lines.join("\n"),
            maps
        );
        UnifyPolicy::from_yaml_str(&yaml).unwrap()
    }

    #[test]
    fn test_load_applies_canonical_mapping() {
        let dir = tempfile::tempdir().unwrap();
        let leads = write_file(
            dir.path(),
            "leads.csv",
            "lead_id,contact_email,first_name\nL1,ann@example.com,Ann\n",
        );
        let policy = policy_yaml(
            &[("leads", &leads)],
            "  leads:\n    id: lead_id\n    email: contact_email\n    first: first_name",
        );
        let records = load_sources(&policy).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "L1");
        assert_eq!(records[0].source, "leads");
        assert_eq!(records[0].email, "ann@example.com");
        assert_eq!(records[0].norm_email, "ann@example.com");
        assert_eq!(records[0].first, "Ann");
        assert!(records[0].updated_at.is_some());
    }

    #[test]
    fn test_source_without_id_column_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let bad = write_file(dir.path(), "bad.csv", "email\nann@example.com\n");
        let good = write_file(dir.path(), "good.csv", "id,email\nG1,bob@example.com\n");
        let policy = policy_yaml(
            &[("bad", &bad), ("good", &good)],
            "  bad:\n    id: missing_col\n    email: email\n  good:\n    id: id\n    email: email",
        );
        let records = load_sources(&policy).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].source, "good");
    }

    #[test]
    fn test_unreadable_source_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let good = write_file(dir.path(), "good.csv", "id\nG1\n");
        let missing = dir.path().join("missing.csv").to_string_lossy().to_string();
        let policy = policy_yaml(
            &[("gone", &missing), ("good", &good)],
            "  gone:\n    id: id\n  good:\n    id: id",
        );
        let records = load_sources(&policy).unwrap();
        assert_eq!(records.len(), 1);
    }

    #[test]
    fn test_empty_source_file_yields_no_records() {
        let dir = tempfile::tempdir().unwrap();
        let empty = write_file(dir.path(), "empty.csv", "id,email,name\n");
        let policy = policy_yaml(&[("empty", &empty)], "  empty:\n    id: id\n    email: email");
        let records = load_sources(&policy).unwrap();
        assert!(records.is_empty());
    }

    #[test]
    fn test_rows_without_id_are_dropped() {
        let dir = tempfile::tempdir().unwrap();
        let leads = write_file(dir.path(), "leads.csv", "id,email\n,ann@example.com\nL2,bob@example.com\n");
        let policy = policy_yaml(&[("leads", &leads)], "  leads:\n    id: id\n    email: email");
        let records = load_sources(&policy).unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "L2");
    }

    #[test]
    fn test_mapped_updated_at_column() {
        let dir = tempfile::tempdir().unwrap();
        let leads = write_file(
            dir.path(),
            "leads.csv",
            "id,modified\nL1,2024-03-01T12:00:00Z\nL2,not-a-timestamp\n",
        );
        let policy = policy_yaml(
            &[("leads", &leads)],
            "  leads:\n    id: id\n    updated_at: modified",
        );
        let records = load_sources(&policy).unwrap();
        assert_eq!(
            records[0].updated_at.unwrap().to_rfc3339(),
            "2024-03-01T12:00:00+00:00"
        );
        // Unparseable timestamps fall back to the load stamp
        assert!(records[1].updated_at.unwrap() > records[0].updated_at.unwrap());
    }
}
