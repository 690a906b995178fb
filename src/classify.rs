//! Donor type classification by donation frequency.

use std::{collections::HashMap, fmt, str::FromStr};

use log::debug;
use serde::{Deserialize, Serialize};

use crate::{
    fields::FieldMap,
    filter::{FilterError, FilterSpec},
    record::Record,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DonorType {
    Single,
    Periodic,
    Frequent,
}

impl DonorType {
    /// One donation is single, two to four periodic, five or more frequent.
    pub fn from_count(count: usize) -> Self {
        match count {
            0 | 1 => DonorType::Single,
            2..=4 => DonorType::Periodic,
            _ => DonorType::Frequent,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DonorType::Single => "single",
            DonorType::Periodic => "periodic",
            DonorType::Frequent => "frequent",
        }
    }
}

impl fmt::Display for DonorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DonorType {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "single" => Ok(DonorType::Single),
            "periodic" => Ok(DonorType::Periodic),
            "frequent" => Ok(DonorType::Frequent),
            other => Err(format!("Unknown donor type '{other}'")),
        }
    }
}

/// Grouping key: the first identity column with a value.
pub fn group_key(record: &Record, fields: &FieldMap) -> Option<String> {
    FieldMap::lookup_text(record, &fields.identity)
}

/// Donor type per record, aligned with `records`. Records without a grouping
/// key get `None`.
pub fn classify_donors(records: &[Record], fields: &FieldMap) -> Vec<Option<DonorType>> {
    let keys = records
        .iter()
        .map(|record| group_key(record, fields))
        .collect::<Vec<_>>();
    let mut counts: HashMap<&str, usize> = HashMap::new();
    for key in keys.iter().flatten() {
        *counts.entry(key.as_str()).or_insert(0) += 1;
    }
    debug!(
        "Classified {} record(s) into {} donor group(s)",
        records.len(),
        counts.len()
    );
    keys.iter()
        .map(|key| {
            key.as_deref()
                .and_then(|key| counts.get(key))
                .map(|count| DonorType::from_count(*count))
        })
        .collect()
}

/// Copies of `records` with the donor type column set from [`classify_donors`].
/// The column written is the first donor type candidate of `fields`.
pub fn annotate_donor_types(records: &[Record], fields: &FieldMap) -> Vec<Record> {
    let Some(column) = fields.donor_type.first() else {
        return records.to_vec();
    };
    records
        .iter()
        .zip(classify_donors(records, fields))
        .map(|(record, donor_type)| match donor_type {
            Some(donor_type) => record.with_value(column, donor_type.as_str()),
            None => record.clone(),
        })
        .collect()
}

/// Records passing every criterion of `spec` except donor type, annotated
/// with the type each donor has within that subset. A year filter therefore
/// classifies by donations made in that year.
pub fn classify_within(
    records: &[Record],
    spec: &FilterSpec,
    fields: &FieldMap,
) -> Result<Vec<Record>, FilterError> {
    let narrowed = crate::filter::apply(records, &spec.without_donor_type(), "", fields)?
        .into_iter()
        .cloned()
        .collect::<Vec<_>>();
    Ok(annotate_donor_types(&narrowed, fields))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_follow_donation_count() {
        assert_eq!(DonorType::from_count(1), DonorType::Single);
        assert_eq!(DonorType::from_count(2), DonorType::Periodic);
        assert_eq!(DonorType::from_count(4), DonorType::Periodic);
        assert_eq!(DonorType::from_count(5), DonorType::Frequent);
    }

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(" Frequent ".parse::<DonorType>(), Ok(DonorType::Frequent));
        assert!("weekly".parse::<DonorType>().is_err());
    }
}
