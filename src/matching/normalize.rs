// src/matching/normalize.rs - canonical field forms and identity fingerprints

use sha2::{Digest, Sha256};

/// Domains whose local parts are dot-insensitive (gmail-style addressing).
const DOT_INSENSITIVE_DOMAINS: [&str; 2] = ["gmail.com", "googlemail.com"];

/// Normalizes an email address to its canonical comparable form.
///
/// Returns an empty string when the input cannot be treated as an email
/// (no `@`, or nothing left of the local part after normalization).
pub fn normalize_email(email: &str) -> String {
    let trimmed = email.trim().to_lowercase();
    let parts: Vec<&str> = trimmed.splitn(2, '@').collect();
    if parts.len() != 2 {
        return String::new();
    }
    let (local_full, domain) = (parts[0], parts[1]);

    // Drop any +suffix from the local part
    let local_no_plus = local_full.split('+').next().unwrap_or("");

    let final_local = if DOT_INSENSITIVE_DOMAINS.contains(&domain) {
        local_no_plus.replace('.', "")
    } else {
        local_no_plus.to_string()
    };

    if final_local.is_empty() || domain.is_empty() {
        return String::new();
    }
    format!("{}@{}", final_local, domain)
}

/// Normalizes a phone number to digits only, dropping a leading `1`
/// country code from 11-digit numbers. Fewer than 7 digits is treated as
/// unusable and yields an empty string.
pub fn normalize_phone(phone: &str) -> String {
    let digits: String = phone.chars().filter(|c| c.is_ascii_digit()).collect();
    if digits.len() < 7 {
        return String::new();
    }
    if digits.len() == 11 && digits.starts_with('1') {
        return digits[1..].to_string();
    }
    digits
}

/// Extracts the Forward Sortation Area: the first three alphanumeric
/// characters of the postal code, uppercased. Empty if fewer than three
/// remain after cleanup.
pub fn postal_fsa(postal: &str) -> String {
    let clean: String = postal
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_uppercase())
        .collect();
    if clean.len() >= 3 {
        clean[..3].to_string()
    } else {
        String::new()
    }
}

/// Basic street address cleanup: lowercase, collapsed whitespace, and a
/// fixed set of street-type abbreviations expanded.
pub fn normalize_address(address: &str) -> String {
    let lower = address.trim().to_lowercase();
    let mut tokens: Vec<String> = Vec::new();
    for token in lower.split_whitespace() {
        let expanded = match token.trim_end_matches('.') {
            "st" => "street",
            "ave" => "avenue",
            "rd" => "road",
            "dr" => "drive",
            _ => {
                tokens.push(token.to_string());
                continue;
            }
        };
        tokens.push(expanded.to_string());
    }
    tokens.join(" ")
}

fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    hex::encode(hasher.finalize())
}

/// Fingerprint from a normalized email, if one can be derived.
pub fn uid_email(email: &str) -> Option<String> {
    let normalized = normalize_email(email);
    if normalized.is_empty() {
        None
    } else {
        Some(sha256_hex(&normalized))
    }
}

/// Fingerprint from a normalized phone number, if one can be derived.
pub fn uid_phone(phone: &str) -> Option<String> {
    let normalized = normalize_phone(phone);
    if normalized.is_empty() {
        None
    } else {
        Some(sha256_hex(&normalized))
    }
}

/// Fingerprint from last name, first initial, and FSA. Requires a last
/// name; first name and postal code are optional components of the key.
pub fn uid_name_address(first: &str, last: &str, postal: &str) -> Option<String> {
    let last_clean = last.trim().to_lowercase();
    if last_clean.is_empty() {
        return None;
    }
    let first_initial = first
        .trim()
        .chars()
        .next()
        .map(|c| c.to_lowercase().to_string())
        .unwrap_or_default();
    let key = format!("{}|{}|{}", last_clean, first_initial, postal_fsa(postal));
    Some(sha256_hex(&key))
}

/// Best available identity fingerprint, in strict priority order:
/// email, then phone, then name+postal.
pub fn best_uid(email: &str, phone: &str, first: &str, last: &str, postal: &str) -> Option<String> {
    uid_email(email)
        .or_else(|| uid_phone(phone))
        .or_else(|| uid_name_address(first, last, postal))
}
