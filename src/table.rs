use std::borrow::Cow;
use std::fmt::Write as _;

use crate::{
    analytics::MonthlyHistogram,
    data::{Value, format_number},
    normalize::ColumnSet,
    record::Record,
};

const HISTOGRAM_WIDTH: usize = 30;

pub fn render_table(headers: &[String], rows: &[Vec<String>]) -> String {
    let mut widths = headers.iter().map(|h| display_width(h)).collect::<Vec<_>>();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(display_width(cell));
        }
    }

    let mut output = String::new();
    let _ = writeln!(output, "{}", format_row(headers, &widths));
    let separator = widths
        .iter()
        .map(|w| "-".repeat((*w).max(3)))
        .collect::<Vec<_>>();
    let _ = writeln!(output, "{}", format_row(&separator, &widths));
    for row in rows {
        let _ = writeln!(output, "{}", format_row(row, &widths));
    }
    output
}

/// Table of `records` under `columns`, one row per record. Fractional
/// amounts are rounded to two decimals here only.
pub fn render_records(columns: &ColumnSet, records: &[&Record]) -> String {
    let headers = columns.names();
    let rows = records
        .iter()
        .map(|record| {
            headers
                .iter()
                .map(|name| record.get(name).map(table_cell).unwrap_or_default())
                .collect()
        })
        .collect::<Vec<Vec<String>>>();
    render_table(&headers, &rows)
}

fn table_cell(value: &Value) -> String {
    match value {
        Value::Number(n) => format_number(*n),
        other => other.as_display(),
    }
}

/// Horizontal bar per month, scaled to the largest bucket, which is marked
/// with `*`.
pub fn render_histogram(histogram: &MonthlyHistogram) -> String {
    let max = histogram
        .max_bucket()
        .map_or(0.0, |(_, total)| total)
        .max(1.0);
    let highlight = histogram.max_bucket().map(|(label, _)| label);
    let label_width = histogram
        .iter()
        .map(|(label, _)| display_width(label))
        .max()
        .unwrap_or(0);

    let mut output = String::new();
    for (label, total) in histogram.iter() {
        let bar_len = ((total.max(0.0) / max) * HISTOGRAM_WIDTH as f64).round() as usize;
        let marker = if Some(label) == highlight && total > 0.0 { " *" } else { "" };
        let padding = label_width.saturating_sub(display_width(label));
        let _ = writeln!(
            output,
            "{label}{}  {} {}{marker}",
            " ".repeat(padding),
            "#".repeat(bar_len),
            format_number(total)
        );
    }
    output
}

pub fn print_table(headers: &[String], rows: &[Vec<String>]) {
    print!("{}", render_table(headers, rows));
}

fn format_row(values: &[String], widths: &[usize]) -> String {
    let cells = values
        .iter()
        .zip(widths)
        .map(|(value, width)| {
            let sanitized = sanitize_cell(value);
            let padding = width.saturating_sub(display_width(&sanitized));
            format!("{sanitized}{}", " ".repeat(padding))
        })
        .collect::<Vec<_>>();
    cells.join("  ").trim_end().to_string()
}

fn display_width(value: &str) -> usize {
    value.chars().count()
}

fn sanitize_cell(value: &str) -> Cow<'_, str> {
    if value.contains(['\n', '\r', '\t']) {
        Cow::Owned(value.replace(['\n', '\r', '\t'], " "))
    } else {
        Cow::Borrowed(value)
    }
}
