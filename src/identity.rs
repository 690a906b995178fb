//! Donor identity: resolving a clicked cell to a key, and finding the records
//! that belong to a key.

use std::{fmt, sync::LazyLock};

use log::debug;
use regex::Regex;
use serde::Serialize;
use thiserror::Error;

use crate::{
    data::normalize_for_match, fields::FieldMap, normalize::clean_identity_name, record::Record,
};

static SENDER_TAX_ID: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:ИИН|БИН|IIN|BIN): ?(\d{10,12})").expect("sender tax id pattern compiles")
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum IdentityError {
    #[error("record carries no donor identity")]
    NoIdentity,
}

/// Canonical donor identity: a cleaned, non-blank name or contact string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct DonorKey(String);

impl DonorKey {
    pub fn new(raw: &str) -> Result<Self, IdentityError> {
        let cleaned = clean_identity_name(raw);
        if cleaned.is_empty() {
            Err(IdentityError::NoIdentity)
        } else {
            Ok(Self(cleaned))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DonorKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Key for a click on `clicked_value` inside `record`: the record's full name
/// when it cleans to something non-blank, otherwise the clicked value itself.
pub fn resolve_key(
    record: &Record,
    clicked_value: &str,
    fields: &FieldMap,
) -> Result<DonorKey, IdentityError> {
    fields
        .full_name(record)
        .and_then(|name| DonorKey::new(&name).ok())
        .map_or_else(|| DonorKey::new(clicked_value), Ok)
}

/// Name (first line) and tax id embedded in a bank statement sender string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SenderIdentity {
    pub name: Option<String>,
    pub tax_id: Option<String>,
}

pub fn parse_sender(sender: &str) -> SenderIdentity {
    let name = sender
        .lines()
        .next()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string);
    let tax_id = SENDER_TAX_ID
        .captures(sender)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string());
    SenderIdentity { name, tax_id }
}

/// Tax id of a record, from its own column or from the sender string.
pub fn record_tax_id(record: &Record, fields: &FieldMap) -> Option<String> {
    fields.tax_id(record).or_else(|| {
        fields
            .sender(record)
            .and_then(|sender| parse_sender(&sender).tax_id)
    })
}

fn candidates(record: &Record, fields: &FieldMap) -> Vec<String> {
    let mut values = fields
        .identity
        .iter()
        .filter_map(|column| record.get(column))
        .filter(|value| !value.is_blank())
        .map(|value| value.as_display())
        .collect::<Vec<_>>();
    if let Some(sender) = fields.sender(record) {
        let parsed = parse_sender(&sender);
        values.extend(parsed.name);
        values.extend(parsed.tax_id);
        values.push(sender);
    }
    values
}

/// Tax ids (10 or 12 digits) and e-mail addresses must match exactly; names
/// match when either string contains the other.
fn key_matches(candidate: &str, key: &str) -> bool {
    if candidate.is_empty() {
        return false;
    }
    let is_tax_id = key.chars().all(|c| c.is_ascii_digit()) && matches!(key.len(), 10 | 12);
    if is_tax_id || key.contains('@') {
        return candidate == key;
    }
    candidate.contains(key) || key.contains(candidate)
}

/// Records belonging to `key`, in input order. When a matched record carries
/// a tax id, the selection widens to every record with that tax id.
pub fn select_donor_records<'a>(
    records: &'a [Record],
    key: &DonorKey,
    fields: &FieldMap,
) -> Vec<&'a Record> {
    let norm_key = normalize_for_match(key.as_str());
    let mut selected = Vec::new();
    let mut found_tax_id = None;

    for record in records {
        let matched = candidates(record, fields)
            .iter()
            .any(|candidate| key_matches(&normalize_for_match(candidate), &norm_key));
        if matched {
            if let Some(tax_id) = record_tax_id(record, fields) {
                found_tax_id = Some(tax_id);
            }
            selected.push(record);
        }
    }

    if let Some(tax_id) = found_tax_id {
        debug!("Widening donor '{key}' to all records with tax id {tax_id}");
        return records
            .iter()
            .filter(|record| record_tax_id(record, fields).as_deref() == Some(tax_id.as_str()))
            .collect();
    }
    selected
}
