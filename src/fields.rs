//! Mapping from logical donation fields to the column names datasets use.
//!
//! Each logical field lists candidate columns tried in order; the first
//! candidate holding a non-blank value wins. Defaults follow the column naming
//! of the bank statements and payment exports the ledger was built around.

use serde::{Deserialize, Serialize};

use crate::{
    data::Value,
    dates::{ParsedDate, parse_donation_date},
    record::Record,
};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FieldMap {
    pub full_name: Vec<String>,
    /// Columns that identify a donor, strongest first.
    pub identity: Vec<String>,
    pub tax_id: Vec<String>,
    /// Free-text sender column of bank statements (name, bank codes, tax id).
    pub sender: Vec<String>,
    pub amount: Vec<String>,
    pub date: Vec<String>,
    pub month: Vec<String>,
    pub language: Vec<String>,
    pub source: Vec<String>,
    pub gender: Vec<String>,
    pub donor_type: Vec<String>,
}

fn names(values: &[&str]) -> Vec<String> {
    values.iter().map(|v| v.to_string()).collect()
}

impl Default for FieldMap {
    fn default() -> Self {
        Self {
            full_name: names(&["ФИО"]),
            identity: names(&[
                "ИИН",
                "ФИО",
                "E-mail & phone number",
                "Номер телефон ",
                "E-mail",
                "телефон",
            ]),
            tax_id: names(&["ИИН"]),
            sender: names(&["Отправитель (Наименование, БИК, ИИК, БИН/ИИН)"]),
            amount: names(&["Сумма", "Сумма операции", "Кредит", "Дебет"]),
            date: names(&["Дата", "Дата платежа", "Дата и время"]),
            month: names(&["Месяц", "month"]),
            language: names(&["язык", "language"]),
            source: names(&["источник", "source"]),
            gender: names(&["пол", "gender"]),
            donor_type: names(&["тип", "type"]),
        }
    }
}

impl FieldMap {
    /// First non-blank value among `candidates`.
    pub fn lookup<'r>(record: &'r Record, candidates: &[String]) -> Option<&'r Value> {
        candidates
            .iter()
            .filter_map(|column| record.get(column))
            .find(|value| !value.is_blank())
    }

    pub fn lookup_text(record: &Record, candidates: &[String]) -> Option<String> {
        Self::lookup(record, candidates).map(|value| value.as_display().trim().to_string())
    }

    pub fn full_name(&self, record: &Record) -> Option<String> {
        Self::lookup_text(record, &self.full_name)
    }

    pub fn tax_id(&self, record: &Record) -> Option<String> {
        Self::lookup_text(record, &self.tax_id)
    }

    pub fn sender(&self, record: &Record) -> Option<String> {
        Self::lookup(record, &self.sender).map(Value::as_display)
    }

    /// First amount column that reads as a number. Columns that are present
    /// but not numeric are skipped, so a blank "Сумма" falls through to "Кредит".
    pub fn amount(&self, record: &Record) -> Option<f64> {
        self.amount
            .iter()
            .filter_map(|column| record.get(column))
            .find_map(Value::as_number)
    }

    pub fn date(&self, record: &Record) -> ParsedDate {
        Self::lookup(record, &self.date)
            .map_or(ParsedDate::Unparsable, |value| {
                parse_donation_date(&value.as_display())
            })
    }

    /// Explicit month column first, otherwise the month of the parsed date.
    pub fn month_label(&self, record: &Record) -> Option<String> {
        Self::lookup_text(record, &self.month)
            .or_else(|| self.date(record).month_label().map(str::to_string))
    }

    pub fn language_column(&self) -> Option<&str> {
        self.language.first().map(String::as_str)
    }

    pub fn source_column(&self) -> Option<&str> {
        self.source.first().map(String::as_str)
    }
}
