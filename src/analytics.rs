//! Donor profile aggregation: summary statistics and monthly activity.

use chrono::NaiveDate;
use log::debug;
use serde::{Serialize, Serializer, ser::SerializeMap};

use crate::{
    dates::{UNKNOWN_LABEL, format_optional_date, serialize_optional_date},
    fields::FieldMap,
    identity::DonorKey,
    record::Record,
};

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Stats {
    pub total_count: usize,
    /// Sum of amounts; records without a numeric amount add 0.
    pub total_amount: f64,
    /// `total_amount / total_count` rounded to the nearest integer, halves up.
    pub average_amount: i64,
    #[serde(serialize_with = "serialize_optional_date")]
    pub first_donation: Option<NaiveDate>,
    #[serde(serialize_with = "serialize_optional_date")]
    pub last_donation: Option<NaiveDate>,
}

impl Stats {
    pub fn first_donation_label(&self) -> String {
        format_optional_date(self.first_donation)
    }

    pub fn last_donation_label(&self) -> String {
        format_optional_date(self.last_donation)
    }
}

/// Month label to summed amount, in first-seen order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MonthlyHistogram {
    buckets: Vec<(String, f64)>,
}

impl MonthlyHistogram {
    pub fn add(&mut self, label: &str, amount: f64) {
        match self.buckets.iter_mut().find(|(existing, _)| existing == label) {
            Some((_, total)) => *total += amount,
            None => self.buckets.push((label.to_string(), amount)),
        }
    }

    pub fn get(&self, label: &str) -> Option<f64> {
        self.buckets
            .iter()
            .find(|(existing, _)| existing == label)
            .map(|(_, total)| *total)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.buckets.iter().map(|(label, total)| (label.as_str(), *total))
    }

    pub fn labels(&self) -> Vec<&str> {
        self.buckets.iter().map(|(label, _)| label.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    /// Largest bucket; on ties the first-seen month wins.
    pub fn max_bucket(&self) -> Option<(&str, f64)> {
        self.iter().fold(None, |best, (label, total)| match best {
            Some((_, best_total)) if best_total >= total => best,
            _ => Some((label, total)),
        })
    }
}

impl Serialize for MonthlyHistogram {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.buckets.len()))?;
        for (label, total) in &self.buckets {
            map.serialize_entry(label, total)?;
        }
        map.end()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DonorSummary {
    pub stats: Stats,
    pub histogram: MonthlyHistogram,
}

pub fn aggregate<'a, I>(records: I, fields: &FieldMap) -> DonorSummary
where
    I: IntoIterator<Item = &'a Record>,
{
    let mut stats = Stats::default();
    let mut histogram = MonthlyHistogram::default();

    for record in records {
        let amount = fields.amount(record).unwrap_or(0.0);
        stats.total_count += 1;
        stats.total_amount += amount;

        if let Some(date) = fields.date(record).date() {
            if stats.first_donation.is_none_or(|first| date < first) {
                stats.first_donation = Some(date);
            }
            if stats.last_donation.is_none_or(|last| date > last) {
                stats.last_donation = Some(date);
            }
        }

        let label = fields
            .month_label(record)
            .unwrap_or_else(|| UNKNOWN_LABEL.to_string());
        histogram.add(&label, amount);
    }

    if stats.total_count > 0 {
        stats.average_amount = round_half_up(stats.total_amount / stats.total_count as f64);
    }
    debug!(
        "Aggregated {} donation(s) across {} month bucket(s)",
        stats.total_count,
        histogram.len()
    );
    DonorSummary { stats, histogram }
}

/// Halves round toward positive infinity, so -1.5 becomes -1.
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}

#[derive(Debug, Clone, Serialize)]
pub struct DonorProfile<'a> {
    pub key: DonorKey,
    pub records: Vec<&'a Record>,
    #[serde(flatten)]
    pub summary: DonorSummary,
}

impl<'a> DonorProfile<'a> {
    pub fn build(key: DonorKey, records: Vec<&'a Record>, fields: &FieldMap) -> Self {
        let summary = aggregate(records.iter().copied(), fields);
        Self {
            key,
            records,
            summary,
        }
    }
}
