use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

use crate::{classify::DonorType, filter::FilterSpec};

#[derive(Debug, Parser)]
#[command(author, version, about = "Filter donation records and analyze donors", long_about = None)]
pub struct Cli {
    /// YAML file overriding field names and page size
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List the columns derived from a record file
    Columns(ColumnsArgs),
    /// Filter, search and page through records
    Browse(BrowseArgs),
    /// Summarize one donor's history
    Profile(ProfileArgs),
    /// Print the effective configuration as YAML
    Config,
}

#[derive(Debug, Args)]
pub struct InputArgs {
    /// Record file (.json, .csv or .tsv; '-' reads JSON from stdin)
    #[arg(short = 'i', long = "input")]
    pub input: PathBuf,
    /// CSV delimiter character (supports ',', 'tab', ';', '|'); forces CSV input
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Character encoding of the input file (defaults to utf-8)
    #[arg(long = "input-encoding")]
    pub input_encoding: Option<String>,
}

#[derive(Debug, Args)]
pub struct ColumnsArgs {
    #[command(flatten)]
    pub input: InputArgs,
}

#[derive(Debug, Args, Default)]
pub struct FilterArgs {
    /// Keep donations made in this year
    #[arg(long)]
    pub year: Option<i32>,
    /// Keep donations from this month (e.g. "Март")
    #[arg(long)]
    pub month: Option<String>,
    /// Earliest donation date, inclusive (DD.MM.YYYY or YYYY-MM-DD)
    #[arg(long = "date-from")]
    pub date_from: Option<String>,
    /// Latest donation date, inclusive
    #[arg(long = "date-to")]
    pub date_to: Option<String>,
    /// Minimum amount, inclusive
    #[arg(long = "amount-from")]
    pub amount_from: Option<f64>,
    /// Maximum amount, inclusive
    #[arg(long = "amount-to")]
    pub amount_to: Option<f64>,
    /// Substring of the source column
    #[arg(long)]
    pub source: Option<String>,
    /// Donor types to keep (single, periodic, frequent)
    #[arg(long = "type", value_delimiter = ',')]
    pub donor_type: Vec<DonorType>,
    /// Genders to keep
    #[arg(long, value_delimiter = ',')]
    pub gender: Vec<String>,
    /// Languages to keep
    #[arg(long, value_delimiter = ',')]
    pub language: Vec<String>,
}

impl FilterArgs {
    pub fn to_spec(&self) -> FilterSpec {
        FilterSpec {
            year: self.year,
            month: self.month.clone(),
            date_from: self.date_from.clone(),
            date_to: self.date_to.clone(),
            amount_from: self.amount_from,
            amount_to: self.amount_to,
            source: self.source.clone(),
            donor_type: self
                .donor_type
                .iter()
                .map(|t| t.as_str().to_string())
                .collect(),
            gender: self.gender.clone(),
            language: self.language.clone(),
        }
    }
}

#[derive(Debug, Args)]
pub struct BrowseArgs {
    #[command(flatten)]
    pub input: InputArgs,
    #[command(flatten)]
    pub filter: FilterArgs,
    /// Free-text search across every column
    #[arg(short, long, default_value = "")]
    pub search: String,
    /// 1-based page to show (clamped to the available pages)
    #[arg(short, long, default_value_t = 1)]
    pub page: usize,
    /// Derive each donor's type from their donation count among the records
    /// passing the other criteria
    #[arg(long)]
    pub classify: bool,
    /// Write every matching record as CSV to this file ('-' for stdout)
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
    /// Character encoding for the CSV export (defaults to utf-8)
    #[arg(long = "output-encoding")]
    pub output_encoding: Option<String>,
    /// Print the export query for the active filter
    #[arg(long = "print-query")]
    pub print_query: bool,
}

#[derive(Debug, Args)]
pub struct ProfileArgs {
    #[command(flatten)]
    pub input: InputArgs,
    /// Donor key (name, tax id, e-mail or phone)
    #[arg(short, long, conflicts_with_all = ["row", "column"])]
    pub key: Option<String>,
    /// 1-based record number whose cell was selected
    #[arg(long, requires = "column")]
    pub row: Option<usize>,
    /// Column of the selected cell
    #[arg(long, requires = "row")]
    pub column: Option<String>,
    /// Emit the profile as JSON instead of a report
    #[arg(long)]
    pub json: bool,
}

pub fn parse_delimiter(value: &str) -> Result<u8, String> {
    match value {
        "tab" | "\t" => Ok(b'\t'),
        "comma" | "," => Ok(b','),
        "|" | "pipe" => Ok(b'|'),
        ";" | "semicolon" => Ok(b';'),
        other => {
            let mut chars = other.chars();
            let first = chars
                .next()
                .ok_or_else(|| "Delimiter cannot be empty".to_string())?;
            if chars.next().is_some() {
                return Err("Delimiter must be a single character".to_string());
            }
            if !first.is_ascii() {
                return Err("Delimiter must be ASCII".to_string());
            }
            Ok(first as u8)
        }
    }
}
