use serde_json::{Number, Value};
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::error::SchemaError;
use crate::reconcile::InputRecord;

/// Cell spellings read as a missing value.
const MISSING_TOKENS: [&str; 7] = ["", "na", "n/a", "nan", "null", "none", "#n/a"];

pub(crate) fn is_missing_token(cell: &str) -> bool {
    let cell = cell.trim().to_ascii_lowercase();
    MISSING_TOKENS.contains(&cell.as_str())
}

/// A CSV table held as raw strings; typing happens per column on demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl Table {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        Self { headers, rows }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self, SchemaError> {
        let path = path.as_ref();
        let csv_error = |source: csv::Error| SchemaError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let file = File::open(path).map_err(|e| csv_error(csv::Error::from(e)))?;
        Self::from_reader(file).map_err(csv_error)
    }

    /// Parse CSV with a header row. Short rows are padded with empty cells.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self, csv::Error> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .trim(csv::Trim::All)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(Self { headers, rows })
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn n_rows(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    /// Raw cells of a column.
    pub fn column(&self, name: &str) -> Option<Vec<&str>> {
        let idx = self.column_index(name)?;
        Some(self.rows.iter().map(|row| row[idx].as_str()).collect())
    }

    /// Numeric column with missing cells as NaN.
    pub fn column_f64(&self, name: &str) -> Option<Result<Vec<f64>, SchemaError>> {
        let cells = self.column(name)?;
        Some(
            cells
                .into_iter()
                .enumerate()
                .map(|(i, cell)| parse_cell(name, i + 1, cell))
                .collect(),
        )
    }

    /// Numeric column where every row must carry a value.
    pub fn required_f64(&self, name: &str) -> Option<Result<Vec<f64>, SchemaError>> {
        let values = match self.column_f64(name)? {
            Ok(values) => values,
            Err(e) => return Some(Err(e)),
        };
        if let Some(i) = values.iter().position(|v| v.is_nan()) {
            return Some(Err(SchemaError::MissingTarget {
                column: name.to_string(),
                row: i + 1,
            }));
        }
        Some(Ok(values))
    }

    /// One row as a JSON record, skipping missing cells.
    pub fn record(&self, row: usize) -> Option<InputRecord> {
        let cells = self.rows.get(row)?;
        let record = self
            .headers
            .iter()
            .zip(cells)
            .filter(|(_, cell)| !is_missing_token(cell))
            .map(|(header, cell)| {
                let value = cell
                    .parse::<f64>()
                    .ok()
                    .and_then(Number::from_f64)
                    .map(Value::Number)
                    .unwrap_or_else(|| Value::String(cell.clone()));
                (header.clone(), value)
            })
            .collect();
        Some(record)
    }
}

fn parse_cell(column: &str, row: usize, cell: &str) -> Result<f64, SchemaError> {
    if is_missing_token(cell) {
        return Ok(f64::NAN);
    }
    cell.trim()
        .parse::<f64>()
        .map_err(|_| SchemaError::NonNumeric {
            column: column.to_string(),
            row,
            value: cell.to_string(),
        })
}
