//! Column derivation and identity-name cleaning.
//!
//! [`derive_columns`] builds the display column model for a collection of
//! irregular records. Ordering is applied by [`order_columns`], a standalone
//! policy so it can be exercised without any records at all.

use std::{borrow::Borrow, sync::LazyLock};

use itertools::Itertools;
use log::debug;
use regex::Regex;
use serde::Serialize;

use crate::{fields::FieldMap, record::Record};

/// Administrative identifiers (bank, tax and account codes) that bank
/// statements append to a sender's name, e.g. `Иванов И.И. БИН: 123456789012`.
static IDENTIFIER_LABEL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:БИН|BIN|ИИК|IIK|ИИН|IIN|БИК|BIK):")
        .expect("identifier label pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub name: String,
    /// At least one record holds a non-blank value in this column.
    pub populated: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ColumnSet {
    columns: Vec<Column>,
}

impl ColumnSet {
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    pub fn names(&self) -> Vec<String> {
        self.columns.iter().map(|c| c.name.clone()).collect()
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn empty(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| !c.populated)
    }
}

/// Column names the ordering policy pins next to each other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderingPolicy {
    pub language: Option<String>,
    pub source: Option<String>,
}

impl OrderingPolicy {
    pub fn from_fields(fields: &FieldMap) -> Self {
        Self {
            language: fields.language_column().map(str::to_string),
            source: fields.source_column().map(str::to_string),
        }
    }
}

/// Columns of `records`, owned or borrowed. Populated flags are computed over
/// `records` alone, so a filtered subset reorders its own empty columns.
pub fn derive_columns<R: Borrow<Record>>(records: &[R], policy: &OrderingPolicy) -> ColumnSet {
    let records = records.iter().map(Borrow::borrow).collect::<Vec<&Record>>();
    let columns = records
        .iter()
        .flat_map(|record| record.columns())
        .unique()
        .map(|name| Column {
            name: name.to_string(),
            populated: records.iter().any(|record| record.has_value(name)),
        })
        .collect::<Vec<_>>();
    debug!(
        "Derived {} column(s) from {} record(s)",
        columns.len(),
        records.len()
    );
    ColumnSet {
        columns: order_columns(columns, policy),
    }
}

/// Populated columns first, then all-blank ones, each group in first-observed
/// order. The source column is then moved directly after the language column
/// when both exist.
pub fn order_columns(columns: Vec<Column>, policy: &OrderingPolicy) -> Vec<Column> {
    let (mut ordered, empty): (Vec<_>, Vec<_>) =
        columns.into_iter().partition(|column| column.populated);
    ordered.extend(empty);

    let (Some(language), Some(source)) = (&policy.language, &policy.source) else {
        return ordered;
    };
    if language == source {
        return ordered;
    }
    let Some(source_idx) = ordered.iter().position(|c| &c.name == source) else {
        return ordered;
    };
    if !ordered.iter().any(|c| &c.name == language) {
        return ordered;
    }
    let source_column = ordered.remove(source_idx);
    let language_idx = ordered
        .iter()
        .position(|c| &c.name == language)
        .unwrap_or(ordered.len().saturating_sub(1));
    ordered.insert(language_idx + 1, source_column);
    ordered
}

/// Cuts a donor name at the first identifier label and trims the rest.
pub fn clean_identity_name(raw: &str) -> String {
    let head = match IDENTIFIER_LABEL.find(raw) {
        Some(found) => &raw[..found.start()],
        None => raw,
    };
    head.trim().to_string()
}
