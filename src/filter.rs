//! Compound record filtering.
//!
//! A [`FilterSpec`] is the operator-facing description (what the form holds
//! and what gets sent to the export endpoint). [`FilterSpec::compile`] validates
//! it into a [`CompiledFilter`]: a list of criteria that are AND-combined, with
//! the free-text search term applied last.

use chrono::{Datelike, NaiveDate};
use log::debug;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    data::fold_case,
    dates::{ParsedDate, parse_donation_date},
    fields::FieldMap,
    record::Record,
};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum FilterError {
    #[error("'{value}' is not a valid {bound} date (expected DD.MM.YYYY or YYYY-MM-DD)")]
    InvalidDate { bound: &'static str, value: String },
    #[error("{bound} amount must be a finite number")]
    InvalidAmount { bound: &'static str },
    #[error("unknown filter parameter '{0}'")]
    UnknownParameter(String),
    #[error("invalid value '{value}' for filter parameter '{name}'")]
    InvalidParameter { name: String, value: String },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterSpec {
    pub year: Option<i32>,
    pub month: Option<String>,
    pub date_from: Option<String>,
    pub date_to: Option<String>,
    pub amount_from: Option<f64>,
    pub amount_to: Option<f64>,
    pub source: Option<String>,
    #[serde(rename = "type")]
    pub donor_type: Vec<String>,
    pub gender: Vec<String>,
    pub language: Vec<String>,
}

fn set_text(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn selected(values: &[String]) -> Vec<String> {
    values
        .iter()
        .map(|v| fold_case(v.trim()).into_owned())
        .filter(|v| !v.is_empty())
        .collect()
}

impl FilterSpec {
    /// True when no criterion would constrain anything.
    pub fn is_empty(&self) -> bool {
        self.year.is_none()
            && set_text(&self.month).is_none()
            && set_text(&self.date_from).is_none()
            && set_text(&self.date_to).is_none()
            && self.amount_from.is_none()
            && self.amount_to.is_none()
            && set_text(&self.source).is_none()
            && selected(&self.donor_type).is_empty()
            && selected(&self.gender).is_empty()
            && selected(&self.language).is_empty()
    }

    /// Copy of this spec with the donor type selection cleared.
    pub fn without_donor_type(&self) -> Self {
        Self {
            donor_type: Vec::new(),
            ..self.clone()
        }
    }

    pub fn compile(&self, search_term: &str) -> Result<CompiledFilter, FilterError> {
        let mut criteria = Vec::new();

        if let Some(year) = self.year {
            criteria.push(Criterion::Year(year));
        }
        if let Some(month) = set_text(&self.month) {
            criteria.push(Criterion::Month(fold_case(month).into_owned()));
        }

        let date_from = parse_bound(set_text(&self.date_from), "start")?;
        let date_to = parse_bound(set_text(&self.date_to), "end")?;
        if date_from.is_some() || date_to.is_some() {
            criteria.push(Criterion::DateRange {
                from: date_from,
                to: date_to,
            });
        }

        let amount_from = check_amount(self.amount_from, "minimum")?;
        let amount_to = check_amount(self.amount_to, "maximum")?;
        if amount_from.is_some() || amount_to.is_some() {
            criteria.push(Criterion::AmountRange {
                from: amount_from,
                to: amount_to,
            });
        }

        if let Some(source) = set_text(&self.source) {
            criteria.push(Criterion::Source(fold_case(source).into_owned()));
        }

        for (field, values) in [
            (SelectField::DonorType, &self.donor_type),
            (SelectField::Gender, &self.gender),
            (SelectField::Language, &self.language),
        ] {
            let accepted = selected(values);
            if !accepted.is_empty() {
                criteria.push(Criterion::OneOf { field, accepted });
            }
        }

        let search = fold_case(search_term).into_owned();
        debug!(
            "Compiled {} criteria (search term {})",
            criteria.len(),
            if search.is_empty() { "unset" } else { "set" }
        );
        Ok(CompiledFilter {
            criteria,
            search: (!search.is_empty()).then_some(search),
        })
    }

    /// Flat `(name, value)` pairs in the shape the fetch and export endpoints
    /// take. Multi-select fields repeat their name once per value; unset
    /// criteria are omitted.
    pub fn to_query_pairs(&self) -> Vec<(String, String)> {
        let mut pairs = Vec::new();
        let mut push = |name: &str, value: String| pairs.push((name.to_string(), value));
        if let Some(year) = self.year {
            push("year", year.to_string());
        }
        for (name, value) in [
            ("month", &self.month),
            ("date_from", &self.date_from),
            ("date_to", &self.date_to),
        ] {
            if let Some(value) = set_text(value) {
                push(name, value.to_string());
            }
        }
        if let Some(amount) = self.amount_from {
            push("amount_from", amount.to_string());
        }
        if let Some(amount) = self.amount_to {
            push("amount_to", amount.to_string());
        }
        if let Some(source) = set_text(&self.source) {
            push("source", source.to_string());
        }
        for (name, values) in [
            ("type", &self.donor_type),
            ("gender", &self.gender),
            ("language", &self.language),
        ] {
            for value in values.iter().map(|v| v.trim()).filter(|v| !v.is_empty()) {
                push(name, value.to_string());
            }
        }
        pairs
    }

    pub fn from_query_pairs<I, K, V>(pairs: I) -> Result<Self, FilterError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut spec = Self::default();
        for (name, value) in pairs {
            let (name, value) = (name.as_ref(), value.as_ref());
            let invalid = || FilterError::InvalidParameter {
                name: name.to_string(),
                value: value.to_string(),
            };
            match name {
                "year" => spec.year = Some(value.trim().parse().map_err(|_| invalid())?),
                "month" => spec.month = Some(value.to_string()),
                "date_from" => spec.date_from = Some(value.to_string()),
                "date_to" => spec.date_to = Some(value.to_string()),
                "amount_from" => {
                    spec.amount_from = Some(value.trim().parse().map_err(|_| invalid())?)
                }
                "amount_to" => spec.amount_to = Some(value.trim().parse().map_err(|_| invalid())?),
                "source" => spec.source = Some(value.to_string()),
                "type" => spec.donor_type.push(value.to_string()),
                "gender" => spec.gender.push(value.to_string()),
                "language" => spec.language.push(value.to_string()),
                other => return Err(FilterError::UnknownParameter(other.to_string())),
            }
        }
        Ok(spec)
    }

    /// `name=value` pairs joined with `&`. Values are not percent-encoded;
    /// that belongs to the transport.
    pub fn to_query_string(&self) -> String {
        self.to_query_pairs()
            .iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn parse_bound(raw: Option<&str>, bound: &'static str) -> Result<Option<NaiveDate>, FilterError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    match parse_donation_date(raw) {
        ParsedDate::Parsed(date) => Ok(Some(date)),
        ParsedDate::Unparsable => Err(FilterError::InvalidDate {
            bound,
            value: raw.to_string(),
        }),
    }
}

fn check_amount(value: Option<f64>, bound: &'static str) -> Result<Option<f64>, FilterError> {
    match value {
        Some(amount) if !amount.is_finite() => Err(FilterError::InvalidAmount { bound }),
        other => Ok(other),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectField {
    DonorType,
    Gender,
    Language,
}

impl SelectField {
    fn candidates(self, fields: &FieldMap) -> &[String] {
        match self {
            SelectField::DonorType => &fields.donor_type,
            SelectField::Gender => &fields.gender,
            SelectField::Language => &fields.language,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Criterion {
    Year(i32),
    /// Case-folded month label.
    Month(String),
    DateRange {
        from: Option<NaiveDate>,
        to: Option<NaiveDate>,
    },
    AmountRange {
        from: Option<f64>,
        to: Option<f64>,
    },
    /// Case-folded substring of the source column.
    Source(String),
    /// Case-folded accepted values.
    OneOf {
        field: SelectField,
        accepted: Vec<String>,
    },
}

impl Criterion {
    /// A record lacking the field a criterion reads never matches it.
    pub fn matches(&self, record: &Record, fields: &FieldMap) -> bool {
        match self {
            Criterion::Year(year) => fields
                .date(record)
                .date()
                .is_some_and(|date| date.year() == *year),
            Criterion::Month(month) => fields
                .month_label(record)
                .is_some_and(|label| fold_case(&label) == month.as_str()),
            Criterion::DateRange { from, to } => fields.date(record).date().is_some_and(|date| {
                from.is_none_or(|from| date >= from) && to.is_none_or(|to| date <= to)
            }),
            Criterion::AmountRange { from, to } => fields.amount(record).is_some_and(|amount| {
                from.is_none_or(|from| amount >= from) && to.is_none_or(|to| amount <= to)
            }),
            Criterion::Source(needle) => FieldMap::lookup_text(record, &fields.source)
                .is_some_and(|source| fold_case(&source).contains(needle.as_str())),
            Criterion::OneOf { field, accepted } => {
                FieldMap::lookup_text(record, field.candidates(fields)).is_some_and(|value| {
                    let value = fold_case(&value);
                    accepted.iter().any(|candidate| *candidate == value)
                })
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct CompiledFilter {
    criteria: Vec<Criterion>,
    search: Option<String>,
}

impl CompiledFilter {
    pub fn criteria(&self) -> &[Criterion] {
        &self.criteria
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }

    pub fn matches(&self, record: &Record, fields: &FieldMap) -> bool {
        self.criteria
            .iter()
            .all(|criterion| criterion.matches(record, fields))
            && self
                .search
                .as_deref()
                .is_none_or(|term| matches_search(record, term))
    }

    pub fn apply<'a>(&self, records: &'a [Record], fields: &FieldMap) -> Vec<&'a Record> {
        let matched = records
            .iter()
            .filter(|record| self.matches(record, fields))
            .collect::<Vec<_>>();
        debug!("Filter kept {} of {} record(s)", matched.len(), records.len());
        matched
    }
}

/// True when any cell of `record` contains the case-folded `term`.
pub fn matches_search(record: &Record, term: &str) -> bool {
    record
        .values()
        .any(|value| fold_case(&value.as_display()).contains(term))
}

/// Filters `records` by `spec`, then intersects with the free-text search.
/// Input order is preserved and nothing is mutated.
pub fn apply<'a>(
    records: &'a [Record],
    spec: &FilterSpec,
    search_term: &str,
    fields: &FieldMap,
) -> Result<Vec<&'a Record>, FilterError> {
    Ok(spec.compile(search_term)?.apply(records, fields))
}
