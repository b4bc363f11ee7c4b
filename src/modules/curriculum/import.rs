//! Bulk import: CSV parsing and row conversion.
//!
//! The CSV dialect is small. Lines are split on `\n` with blank
//! lines dropped, fields are split on `,`, every `"` is removed and the
//! result is trimmed. Fields cannot contain commas or literal quotes.

use std::collections::{BTreeMap, HashSet};

use serde_json::Value;

use curricula_core::AppError;
use curricula_models::{CurriculumFields, ImportRequest, is_column_key, key_for_header};

pub type CsvRow = BTreeMap<String, String>;

fn clean_field(field: &str) -> String {
    field.replace('"', "").trim().to_string()
}

/// First column key that appears more than once.
fn duplicate_column(keys: &[String]) -> Option<&str> {
    let mut seen = HashSet::new();
    keys.iter()
        .find(|&key| !seen.insert(key.as_str()))
        .map(String::as_str)
}

/// Parses CSV text into rows keyed by column key.
///
/// Rows shorter than the header are padded with empty strings. A row longer
/// than the header, or a file without data rows, is a validation error.
pub fn parse_csv(text: &str) -> Result<Vec<CsvRow>, AppError> {
    let mut lines = text.split('\n').filter(|line| !line.trim().is_empty());

    let header_line = lines
        .next()
        .ok_or_else(|| AppError::validation("CSV file is empty"))?;
    let headers: Vec<String> = header_line
        .split(',')
        .map(|header| key_for_header(&clean_field(header)))
        .collect();
    if let Some(key) = duplicate_column(&headers) {
        return Err(AppError::validation(format!(
            "Duplicate column `{key}` in CSV header"
        )));
    }

    let mut rows = Vec::new();
    for (index, line) in lines.enumerate() {
        let values: Vec<String> = line.split(',').map(clean_field).collect();
        if values.len() > headers.len() {
            return Err(AppError::validation(format!(
                "Row {} has {} values but the header has {} columns",
                index + 1,
                values.len(),
                headers.len()
            )));
        }

        let row = headers
            .iter()
            .enumerate()
            .map(|(column, key)| {
                let value = values.get(column).cloned().unwrap_or_default();
                (key.clone(), value)
            })
            .collect();
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(AppError::validation("CSV file has no data rows"));
    }

    Ok(rows)
}

/// Converts one parsed row into write fields. Empty cells are not stored.
pub fn row_to_fields(row: &CsvRow, row_number: usize) -> Result<CurriculumFields, AppError> {
    let mut fields = CurriculumFields::default();

    for (key, value) in row {
        if !is_column_key(key) {
            return Err(AppError::validation(format!(
                "Row {row_number}: unknown column `{key}`"
            )));
        }
        if value.is_empty() {
            continue;
        }
        fields
            .set(key, value.clone())
            .map_err(|key| AppError::validation(format!("Row {row_number}: unknown column `{key}`")))?;
    }

    if fields.is_empty() {
        return Err(AppError::validation(format!("Row {row_number} has no values")));
    }

    Ok(fields)
}

fn json_row_to_csv_row(row: &BTreeMap<String, Value>, row_number: usize) -> Result<CsvRow, AppError> {
    let keys: Vec<String> = row.keys().map(|key| key_for_header(key.trim())).collect();
    if let Some(key) = duplicate_column(&keys) {
        return Err(AppError::validation(format!(
            "Row {row_number}: duplicate column `{key}`"
        )));
    }

    row.iter()
        .map(|(key, value)| {
            let value = match value {
                Value::Null => String::new(),
                Value::String(s) => s.trim().to_string(),
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Array(_) | Value::Object(_) => {
                    return Err(AppError::validation(format!(
                        "Row {row_number}: `{key}` must be a text value"
                    )));
                }
            };
            Ok((key_for_header(key.trim()), value))
        })
        .collect()
}

/// Validates every row of an import request up front.
///
/// Exactly one of `csv` or `rows` must be given. Nothing is returned unless
/// all rows convert.
pub fn prepare_import(request: &ImportRequest) -> Result<Vec<CurriculumFields>, AppError> {
    let rows = match (&request.csv, &request.rows) {
        (Some(_), Some(_)) => {
            return Err(AppError::validation(
                "Provide either CSV text or rows, not both",
            ));
        }
        (Some(csv), None) => parse_csv(csv)?,
        (None, Some(rows)) => rows
            .iter()
            .enumerate()
            .map(|(index, row)| json_row_to_csv_row(row, index + 1))
            .collect::<Result<Vec<_>, _>>()?,
        (None, None) => {
            return Err(AppError::validation(
                "Invalid data format. Expected CSV text or an array of rows.",
            ));
        }
    };

    if rows.is_empty() {
        return Err(AppError::validation("No rows to import"));
    }

    rows.iter()
        .enumerate()
        .map(|(index, row)| row_to_fields(row, index + 1))
        .collect()
}
