#![allow(dead_code)]

use std::fs;
use std::path::{Path, PathBuf};

use donor_ledger::{fields::FieldMap, io_utils::parse_json_records, record::Record};
use tempfile::{TempDir, tempdir};

/// Absolute path to a fixture under `tests/data`.
pub fn fixture_path(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

/// The shared donation fixture, parsed with column order intact.
pub fn donation_records() -> Vec<Record> {
    let text = fs::read_to_string(fixture_path("donations.json")).expect("read donations fixture");
    parse_json_records(&text).expect("parse donations fixture")
}

/// Parses an inline JSON array; object key order is preserved.
pub fn records(json: &str) -> Vec<Record> {
    parse_json_records(json).expect("parse inline records")
}

pub fn fields() -> FieldMap {
    FieldMap::default()
}

/// Display values of `column` for each record, in order.
pub fn column_values(records: &[&Record], column: &str) -> Vec<String> {
    records.iter().map(|record| record.display(column)).collect()
}

/// Scratch directory removed on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, contents).expect("write temp file");
        path
    }

    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        fs::write(&path, contents).expect("write temp file");
        path
    }
}
