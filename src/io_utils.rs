//! Record loading and export hand-off.
//!
//! - **Formats**: `.json` (array of objects, column order preserved) and
//!   `.csv`/`.tsv` (header row becomes the column names, blank cells are null).
//! - **Encoding**: input is decoded and export output transcoded via
//!   `encoding_rs`, defaulting to UTF-8. Bank statements in `windows-1251` are
//!   common.
//! - **stdin/stdout**: the `-` path reads JSON from stdin; an export without a
//!   path goes to stdout.

use std::{
    fs::{self, File},
    io::{self, BufWriter, Read, Write},
    path::Path,
};

use anyhow::{Context, Result, anyhow};
use csv::QuoteStyle;
use encoding_rs::{Encoding, UTF_8};
use log::debug;

use crate::{data::Value, normalize::ColumnSet, record::Record};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordFormat {
    Json,
    Csv { delimiter: u8 },
}

pub fn is_dash(path: &Path) -> bool {
    path == Path::new("-")
}

pub fn resolve_encoding(label: Option<&str>) -> Result<&'static Encoding> {
    if let Some(value) = label {
        Encoding::for_label(value.trim().as_bytes())
            .ok_or_else(|| anyhow!("Unknown encoding '{value}'"))
    } else {
        Ok(UTF_8)
    }
}

/// Format by extension; an explicit delimiter forces CSV.
pub fn resolve_format(path: &Path, delimiter: Option<u8>) -> Result<RecordFormat> {
    if let Some(delimiter) = delimiter {
        return Ok(RecordFormat::Csv { delimiter });
    }
    if is_dash(path) {
        return Ok(RecordFormat::Json);
    }
    match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("json") => Ok(RecordFormat::Json),
        Some(ext) if ext.eq_ignore_ascii_case("csv") => Ok(RecordFormat::Csv {
            delimiter: DEFAULT_CSV_DELIMITER,
        }),
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => Ok(RecordFormat::Csv {
            delimiter: DEFAULT_TSV_DELIMITER,
        }),
        _ => Err(anyhow!(
            "Cannot tell the record format of {path:?}; use a .json, .csv or .tsv file"
        )),
    }
}

fn read_input(path: &Path) -> Result<Vec<u8>> {
    if is_dash(path) {
        let mut buf = Vec::new();
        io::stdin()
            .lock()
            .read_to_end(&mut buf)
            .context("Reading records from stdin")?;
        Ok(buf)
    } else {
        fs::read(path).with_context(|| format!("Opening input file {path:?}"))
    }
}

pub fn decode_bytes(bytes: &[u8], encoding: &'static Encoding) -> Result<String> {
    let (text, _, had_errors) = encoding.decode(bytes);
    if had_errors {
        Err(anyhow!("Failed to decode input using {}", encoding.name()))
    } else {
        Ok(text.into_owned())
    }
}

pub fn load_records(
    path: &Path,
    format: RecordFormat,
    encoding: &'static Encoding,
) -> Result<Vec<Record>> {
    let text = decode_bytes(&read_input(path)?, encoding)
        .with_context(|| format!("Decoding {path:?}"))?;
    let records = match format {
        RecordFormat::Json => parse_json_records(&text),
        RecordFormat::Csv { delimiter } => parse_csv_records(&text, delimiter),
    }
    .with_context(|| format!("Parsing records from {path:?}"))?;
    debug!("Loaded {} record(s) from {:?}", records.len(), path);
    Ok(records)
}

pub fn parse_json_records(text: &str) -> Result<Vec<Record>> {
    serde_json::from_str(text).context("Expected a JSON array of objects")
}

/// Rows may be shorter or longer than the header; missing cells are absent
/// and surplus cells are dropped.
pub fn parse_csv_records(text: &str, delimiter: u8) -> Result<Vec<Record>> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader
        .headers()
        .context("Reading header row")?
        .iter()
        .map(|h| h.trim_start_matches('\u{feff}').to_string())
        .collect::<Vec<_>>();

    let mut records = Vec::new();
    for (idx, row) in reader.records().enumerate() {
        let row = row.with_context(|| format!("Reading row {}", idx + 2))?;
        let record = Record::from_pairs(headers.iter().zip(row.iter()).map(|(header, cell)| {
            let value = if cell.trim().is_empty() {
                Value::Null
            } else {
                Value::from(cell)
            };
            (header.clone(), value)
        }));
        records.push(record);
    }
    Ok(records)
}

/// Renders `records` as CSV under `columns`. Absent cells are empty.
pub fn records_to_csv(columns: &ColumnSet, records: &[&Record], delimiter: u8) -> Result<String> {
    let mut writer = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Always)
        .double_quote(true)
        .from_writer(Vec::new());
    let names = columns.names();
    writer.write_record(&names).context("Writing header row")?;
    for record in records {
        writer
            .write_record(names.iter().map(|name| record.display(name)))
            .context("Writing record")?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|err| anyhow!("Flushing CSV buffer: {}", err.error()))?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

pub fn write_export(
    path: Option<&Path>,
    csv_text: &str,
    encoding: &'static Encoding,
) -> Result<()> {
    let (encoded, _, had_errors) = encoding.encode(csv_text);
    if had_errors {
        return Err(anyhow!("Failed to encode export using {}", encoding.name()));
    }
    let mut out: Box<dyn Write> = match path {
        Some(p) if !is_dash(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("Creating output file {p:?}"))?,
        )),
        _ => Box::new(io::stdout()),
    };
    out.write_all(&encoded).context("Writing export")?;
    out.flush().context("Flushing export")
}
