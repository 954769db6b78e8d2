//! Spreadsheet ingestion.
//!
//! The streaming client only needs "path in, [`Table`] out", so ingestion is a
//! trait. The built-in reader handles delimited text exports (`.csv`, `.tsv`).

use std::path::{Path, PathBuf};

use serde_json::Value;
use thiserror::Error;

use crate::core::table::Table;

#[derive(Debug, Error)]
pub enum SheetError {
    #[error("could not open sheet {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("unsupported sheet format '{extension}'")]
    UnsupportedFormat { extension: String },

    #[error("could not parse sheet {}: {reason}", .path.display())]
    Parse { path: PathBuf, reason: String },

    #[error("sheet {} has no header row", .path.display())]
    Empty { path: PathBuf },

    #[error("sheet reader stopped unexpectedly: {0}")]
    Interrupted(String),
}

pub trait SheetReader: Send + Sync {
    /// Read the first sheet of `path` into a table named after the file.
    fn read_sheet(&self, path: &Path) -> Result<Table, SheetError>;
}

#[derive(Debug, Default, Clone, Copy)]
pub struct DelimitedSheetReader;

impl DelimitedSheetReader {
    pub fn is_supported(path: &Path) -> bool {
        delimiter_for(path).is_some()
    }
}

fn extension_of(path: &Path) -> String {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase)
        .unwrap_or_default()
}

fn delimiter_for(path: &Path) -> Option<u8> {
    match extension_of(path).as_str() {
        "csv" => Some(b','),
        "tsv" => Some(b'\t'),
        _ => None,
    }
}

/// Empty cells become null; booleans and numbers keep their JSON type.
fn parse_cell(raw: &str) -> Value {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    match trimmed {
        "true" | "TRUE" | "True" => return Value::Bool(true),
        "false" | "FALSE" | "False" => return Value::Bool(false),
        _ => {}
    }
    if let Ok(int) = trimmed.parse::<i64>() {
        return Value::from(int);
    }
    if let Ok(float) = trimmed.parse::<f64>() {
        if let Some(number) = serde_json::Number::from_f64(float) {
            return Value::Number(number);
        }
    }
    Value::String(raw.to_string())
}

impl SheetReader for DelimitedSheetReader {
    fn read_sheet(&self, path: &Path) -> Result<Table, SheetError> {
        let delimiter = delimiter_for(path).ok_or_else(|| SheetError::UnsupportedFormat {
            extension: extension_of(path),
        })?;

        let contents = std::fs::read(path).map_err(|source| SheetError::Io {
            path: path.to_path_buf(),
            source,
        })?;

        let parse_error = |err: csv::Error| SheetError::Parse {
            path: path.to_path_buf(),
            reason: err.to_string(),
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(contents.as_slice());

        let headers = reader.headers().map_err(parse_error)?.clone();
        if headers.is_empty() {
            return Err(SheetError::Empty {
                path: path.to_path_buf(),
            });
        }

        let columns: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
        let width = columns.len();
        let name = path
            .file_stem()
            .map(|stem| stem.to_string_lossy().into_owned())
            .unwrap_or_default();
        let mut table = Table::new(name, columns);

        for record in reader.records() {
            let record = record.map_err(parse_error)?;
            let mut cells: Vec<Value> = record.iter().take(width).map(parse_cell).collect();
            cells.resize(width, Value::Null);
            table.push_row(cells).map_err(|err| SheetError::Parse {
                path: path.to_path_buf(),
                reason: err.to_string(),
            })?;
        }

        Ok(table)
    }
}
