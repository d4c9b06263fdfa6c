//! Reading spreadsheet exports into [`Dataset`]s.
//!
//! Workbooks (`xlsx`, `xlsm`, `xlsb`, `xls`, `ods`) go through calamine and
//! are read from a single sheet picked by name or position. CSV exports are
//! read whole; the sheet selector does not apply to them.

use super::dataset::Dataset;
use super::error::DashboardError;
use super::value::Value;
use anyhow::{Context, Result};
use calamine::{Data, DataType, Range, Reader, open_workbook_auto};
use serde::{Deserialize, Serialize};
use std::fmt::Display;
use std::io::Read;
use std::path::Path;
use tracing::debug;

/// Which worksheet of a workbook to read.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SheetSelector {
    Index(usize),
    Name(String),
}

impl Default for SheetSelector {
    fn default() -> Self {
        SheetSelector::Index(0)
    }
}

impl Display for SheetSelector {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SheetSelector::Index(i) => write!(f, "#{i}"),
            SheetSelector::Name(name) => write!(f, "\"{name}\""),
        }
    }
}

pub fn load_dataset(path: &Path, sheet: &SheetSelector) -> Result<Dataset> {
    let extension = path
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_lowercase)
        .unwrap_or_default();

    let dataset = match extension.as_str() {
        "csv" => {
            let file = std::fs::File::open(path)
                .with_context(|| format!("Failed to open file: {}", path.display()))?;
            read_csv(file).with_context(|| format!("Failed to parse CSV: {}", path.display()))?
        }
        "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => read_workbook(path, sheet)?,
        _ => return Err(DashboardError::UnsupportedFormat(path.to_path_buf()).into()),
    };

    debug!(
        "Loaded {} rows x {} columns from {}",
        dataset.len(),
        dataset.columns().len(),
        path.display()
    );
    Ok(dataset)
}

pub fn read_csv<R: Read>(reader: R) -> Result<Dataset> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = csv_reader
        .headers()
        .context("Failed to read CSV header row")?
        .iter()
        .map(str::to_string)
        .collect();

    let mut rows = Vec::new();
    for (line_num, record) in csv_reader.records().enumerate() {
        let record =
            record.with_context(|| format!("CSV parse error at line {}", line_num + 2))?;
        let row: Vec<Value> = record.iter().map(Value::from_text).collect();
        if row.iter().all(Value::is_empty) {
            continue;
        }
        rows.push(row);
    }

    Ok(Dataset::new(&headers, rows))
}

fn read_workbook(path: &Path, sheet: &SheetSelector) -> Result<Dataset> {
    let mut workbook = open_workbook_auto(path)
        .with_context(|| format!("Failed to open workbook: {}", path.display()))?;

    let not_found = || DashboardError::SheetNotFound {
        path: path.to_path_buf(),
        sheet: sheet.to_string(),
    };

    let range = match sheet {
        SheetSelector::Name(name) => {
            if !workbook.sheet_names().iter().any(|s| s == name) {
                return Err(not_found().into());
            }
            workbook
                .worksheet_range(name)
                .with_context(|| format!("Failed to read sheet {sheet} of {}", path.display()))?
        }
        SheetSelector::Index(idx) => workbook
            .worksheet_range_at(*idx)
            .ok_or_else(not_found)?
            .with_context(|| format!("Failed to read sheet {sheet} of {}", path.display()))?,
    };

    Ok(range_to_dataset(&range))
}

fn range_to_dataset(range: &Range<Data>) -> Dataset {
    let mut rows = range.rows();
    let headers: Vec<String> = match rows.next() {
        Some(header_row) => header_row
            .iter()
            .enumerate()
            .map(|(i, cell)| match cell_value(cell).as_label() {
                Some(label) => label,
                None => format!("Unnamed: {i}"),
            })
            .collect(),
        None => return Dataset::default(),
    };

    let data = rows
        .map(|row| row.iter().map(cell_value).collect::<Vec<_>>())
        .filter(|row| !row.iter().all(Value::is_empty))
        .collect();

    Dataset::new(&headers, data)
}

fn cell_value(cell: &Data) -> Value {
    match cell {
        Data::Empty | Data::Error(_) => Value::Empty,
        Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => Value::from_text(s),
        Data::Float(f) => Value::Number(*f),
        Data::Int(i) => Value::Number(*i as f64),
        Data::Bool(b) => Value::Bool(*b),
        Data::DateTime(_) => cell.as_datetime().map_or(Value::Empty, Value::Date),
    }
}
