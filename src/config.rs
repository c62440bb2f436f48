// src/config.rs - run policy document and validation

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;

use crate::matching::blocking;

fn default_email_exact_weight() -> f64 {
    0.9
}
fn default_phone_exact_weight() -> f64 {
    0.7
}
fn default_name_address_weight() -> f64 {
    0.5
}
fn default_postal_match_weight() -> f64 {
    0.2
}

/// Per-rule contribution weights for pair scoring.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct MatchWeights {
    #[serde(default = "default_email_exact_weight")]
    pub email_exact: f64,
    #[serde(default = "default_phone_exact_weight")]
    pub phone_exact: f64,
    #[serde(default = "default_name_address_weight")]
    pub name_address: f64,
    #[serde(default = "default_postal_match_weight")]
    pub postal_match: f64,
}

impl Default for MatchWeights {
    fn default() -> Self {
        MatchWeights {
            email_exact: default_email_exact_weight(),
            phone_exact: default_phone_exact_weight(),
            name_address: default_name_address_weight(),
            postal_match: default_postal_match_weight(),
        }
    }
}

/// Decision cutoffs: `auto_merge` must not be below `needs_review`.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct Thresholds {
    pub auto_merge: f64,
    pub needs_review: f64,
}

/// Field-level conflict resolution policy for cluster merging.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SurvivorshipPolicy {
    /// Preferred source order; sources absent from the list sort last.
    /// When empty, ordering falls back to recency alone.
    #[serde(default)]
    pub source_priority: Vec<String>,
}

/// The run policy: which sources to load, how their columns map onto the
/// canonical schema, and how matching decisions are made. A policy is
/// passed explicitly into the engine for each run; there is no process-wide
/// policy state.
#[derive(Debug, Clone, Deserialize)]
pub struct UnifyPolicy {
    /// Source name -> file locator. Ordered for deterministic loading.
    pub sources: BTreeMap<String, String>,
    /// Source name -> (canonical field -> source column).
    pub canonical_map: BTreeMap<String, BTreeMap<String, String>>,
    /// Ordered blocking rule names; validated against the known rule set.
    pub blocking: Vec<String>,
    pub weights: MatchWeights,
    pub thresholds: Thresholds,
    #[serde(default)]
    pub survivorship: SurvivorshipPolicy,
}

impl UnifyPolicy {
    pub fn from_yaml_str(text: &str) -> Result<Self> {
        let policy: UnifyPolicy =
            serde_yaml::from_str(text).context("Failed to parse run policy")?;
        policy.validate()?;
        Ok(policy)
    }

    pub fn from_yaml_file(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)
            .with_context(|| format!("Failed to read run policy {}", path.display()))?;
        Self::from_yaml_str(&text)
    }

    /// Checks the invariants that make a run well-defined. Violations are
    /// fatal configuration errors naming the offending field.
    pub fn validate(&self) -> Result<()> {
        if self.blocking.is_empty() {
            bail!("run policy field 'blocking' must list at least one rule");
        }
        blocking::parse_rules(&self.blocking)
            .context("run policy field 'blocking' is invalid")?;
        if self.thresholds.auto_merge < self.thresholds.needs_review {
            bail!(
                "threshold 'auto_merge' ({}) must be >= 'needs_review' ({})",
                self.thresholds.auto_merge,
                self.thresholds.needs_review
            );
        }
        Ok(())
    }
}
