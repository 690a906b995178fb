//! Donation date parsing.
//!
//! Bank exports write `DD.MM.YYYY` (sometimes with `/`), online payment exports
//! write `YYYY-MM-DD`, and both occasionally append a time of day. Every caller
//! goes through [`parse_donation_date`] so the day-first/year-first decision
//! lives in one place.

use chrono::{Datelike, NaiveDate};
use serde::{Serialize, Serializer};

/// Label used wherever a month or date cannot be resolved.
pub const UNKNOWN_LABEL: &str = "—";

pub const MONTH_NAMES: [&str; 12] = [
    "Январь",
    "Февраль",
    "Март",
    "Апрель",
    "Май",
    "Июнь",
    "Июль",
    "Август",
    "Сентябрь",
    "Октябрь",
    "Ноябрь",
    "Декабрь",
];

const DAY_FIRST_FORMATS: &[&str] = &["%d.%m.%Y", "%d/%m/%Y"];
const YEAR_FIRST_FORMATS: &[&str] = &["%Y-%m-%d"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParsedDate {
    Parsed(NaiveDate),
    Unparsable,
}

impl ParsedDate {
    pub fn date(self) -> Option<NaiveDate> {
        match self {
            ParsedDate::Parsed(date) => Some(date),
            ParsedDate::Unparsable => None,
        }
    }

    pub fn month_label(self) -> Option<&'static str> {
        self.date().and_then(|date| month_name(date.month()))
    }
}

pub fn parse_donation_date(raw: &str) -> ParsedDate {
    let date_part = strip_time(raw.trim());
    if date_part.is_empty() {
        return ParsedDate::Unparsable;
    }
    let formats = if date_part.contains(['.', '/']) {
        DAY_FIRST_FORMATS
    } else if date_part.contains('-') {
        YEAR_FIRST_FORMATS
    } else {
        return ParsedDate::Unparsable;
    };
    formats
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(date_part, fmt).ok())
        .map_or(ParsedDate::Unparsable, ParsedDate::Parsed)
}

fn strip_time(value: &str) -> &str {
    let end = value.find([' ', 'T']).unwrap_or(value.len());
    &value[..end]
}

/// Display name for a 1-based month ordinal.
pub fn month_name(ordinal: u32) -> Option<&'static str> {
    let index = usize::try_from(ordinal).ok()?.checked_sub(1)?;
    MONTH_NAMES.get(index).copied()
}

pub fn format_date(date: NaiveDate) -> String {
    date.format("%d.%m.%Y").to_string()
}

/// `DD.MM.YYYY`, or [`UNKNOWN_LABEL`] when there is no date.
pub fn format_optional_date(date: Option<NaiveDate>) -> String {
    date.map(format_date)
        .unwrap_or_else(|| UNKNOWN_LABEL.to_string())
}

pub(crate) fn serialize_optional_date<S>(
    date: &Option<NaiveDate>,
    serializer: S,
) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    format_optional_date(*date).serialize(serializer)
}
