// src/matching/blocking.rs - coarse candidate grouping before pairwise scoring

use std::collections::BTreeMap;

use anyhow::{bail, Result};
use log::debug;

use crate::models::records::RawRecord;

/// Separator between rule segments in a record's composite signature.
pub const KEY_SEPARATOR: char = '|';

/// A blocking rule kind. Rule names arrive from the run policy; unknown
/// names are rejected when the policy is validated, never silently skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockingRule {
    EmailExact,
    EmailDomainLast4,
    PhoneLast7,
    NameFsa,
}

impl BlockingRule {
    pub fn parse(name: &str) -> Result<Self> {
        match name {
            "email_exact" => Ok(BlockingRule::EmailExact),
            "email_domain_last4" => Ok(BlockingRule::EmailDomainLast4),
            "phone_last7" => Ok(BlockingRule::PhoneLast7),
            "name_fsa" => Ok(BlockingRule::NameFsa),
            other => bail!("unknown blocking rule '{}'", other),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            BlockingRule::EmailExact => "email_exact",
            BlockingRule::EmailDomainLast4 => "email_domain_last4",
            BlockingRule::PhoneLast7 => "phone_last7",
            BlockingRule::NameFsa => "name_fsa",
        }
    }

    /// The rule's key for a record; empty when the record lacks the fields
    /// the rule needs. Empty keys never form a group.
    pub fn key(&self, record: &RawRecord) -> String {
        match self {
            BlockingRule::EmailExact => record.norm_email.clone(),
            BlockingRule::EmailDomainLast4 => email_domain_last4(&record.norm_email),
            BlockingRule::PhoneLast7 => phone_last7(&record.norm_phone),
            BlockingRule::NameFsa => name_fsa(&record.first, &record.last, &record.postal_fsa),
        }
    }
}

/// Parses an ordered policy rule list, rejecting unknown names.
pub fn parse_rules(names: &[String]) -> Result<Vec<BlockingRule>> {
    names.iter().map(|name| BlockingRule::parse(name)).collect()
}

/// Domain plus the last four characters of the local part (the whole local
/// part when shorter than four).
fn email_domain_last4(norm_email: &str) -> String {
    if norm_email.is_empty() {
        return String::new();
    }
    let parts: Vec<&str> = norm_email.splitn(2, '@').collect();
    if parts.len() != 2 {
        return String::new();
    }
    let (local, domain) = (parts[0], parts[1]);
    let chars: Vec<char> = local.chars().collect();
    let tail: String = chars[chars.len().saturating_sub(4)..].iter().collect();
    format!("{}|{}", domain, tail)
}

/// Last seven digits of the normalized phone number.
fn phone_last7(norm_phone: &str) -> String {
    if norm_phone.len() >= 7 {
        norm_phone[norm_phone.len() - 7..].to_string()
    } else {
        String::new()
    }
}

/// `lastname|first-initial|fsa`, lowercased. Requires a last name.
fn name_fsa(first: &str, last: &str, fsa: &str) -> String {
    let last_clean = last.trim().to_lowercase();
    if last_clean.is_empty() {
        return String::new();
    }
    let first_initial = first
        .trim()
        .chars()
        .next()
        .map(|c| c.to_lowercase().to_string())
        .unwrap_or_default();
    format!("{}|{}|{}", last_clean, first_initial, fsa)
}

/// All rule keys for a record, in policy rule order.
pub fn record_keys(rules: &[BlockingRule], record: &RawRecord) -> Vec<String> {
    rules.iter().map(|rule| rule.key(record)).collect()
}

/// Composite signature: every rule segment joined with the separator.
/// Missing rule outputs stay as empty segments so segment positions are
/// preserved across records.
pub fn composite_key(rules: &[BlockingRule], record: &RawRecord) -> String {
    record_keys(rules, record).join(&KEY_SEPARATOR.to_string())
}

/// Groups record indices by rule key. Each rule contributes its own groups;
/// a record whose every rule key is empty joins no group and is thereby
/// excluded from candidate generation (pairing it all-against-all would be
/// unbounded). The map is ordered for deterministic pair enumeration.
pub fn build_blocks(
    rules: &[BlockingRule],
    records: &[RawRecord],
) -> BTreeMap<(usize, String), Vec<usize>> {
    let mut blocks: BTreeMap<(usize, String), Vec<usize>> = BTreeMap::new();
    let mut unblocked = 0usize;
    for (idx, record) in records.iter().enumerate() {
        let keys = record_keys(rules, record);
        if keys.iter().all(|k| k.is_empty()) {
            unblocked += 1;
            continue;
        }
        for (rule_idx, key) in keys.into_iter().enumerate() {
            if !key.is_empty() {
                blocks.entry((rule_idx, key)).or_default().push(idx);
            }
        }
    }
    if unblocked > 0 {
        debug!(
            "{} records produced no blocking key and were excluded from pairing",
            unblocked
        );
    }
    blocks
}
