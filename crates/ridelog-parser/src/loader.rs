use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::{ReaderBuilder, StringRecord};
use polars::prelude::*;
use serde::Deserialize;

use crate::errors::LoaderError;
use crate::schema::{TripColumn, RAW_COLUMNS};

const BYTE_ORDER_MARK: char = '\u{feff}';

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoaderOptions {
    pub delimiter: char,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        Self { delimiter: ',' }
    }
}

/// A `MILES*` cell that could not be read as a non-negative distance.
#[derive(Debug, Clone, PartialEq)]
pub struct RejectedValue {
    pub line_index: usize,
    pub value: String,
}

#[derive(Debug, Clone)]
pub struct RawTripData {
    /// One row per data line, raw column names, text columns plus `MILES*` as Float64.
    pub df: DataFrame,
    pub rejected_miles: Vec<RejectedValue>,
}

pub fn load_trip_file(path: &Path, options: &LoaderOptions) -> Result<RawTripData, LoaderError> {
    if !path.exists() {
        return Err(LoaderError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    let file = File::open(path).map_err(|source| LoaderError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    parse_trip_records(file, options)
}

pub fn parse_trip_records<R: Read>(
    reader: R,
    options: &LoaderOptions,
) -> Result<RawTripData, LoaderError> {
    if !options.delimiter.is_ascii() {
        return Err(LoaderError::InvalidDelimiter(options.delimiter));
    }
    let delimiter = options.delimiter as u8;

    let mut csv_reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(reader);
    let mut records = csv_reader.records();

    let header = match records.next() {
        Some(record) => record.map_err(|source| LoaderError::Csv { source })?,
        None => {
            return Err(LoaderError::InvalidHeader {
                message: "file is empty".to_string(),
            })
        }
    };
    validate_header(&header)?;

    let mut columns = RawColumns::default();
    for (offset, record) in records.enumerate() {
        let line_index = offset + 1;
        let record = record.map_err(|source| LoaderError::Csv { source })?;
        if record.len() != RAW_COLUMNS.len() {
            return Err(LoaderError::DataRow {
                line_index,
                message: format!(
                    "expected {} fields, found {}",
                    RAW_COLUMNS.len(),
                    record.len()
                ),
            });
        }
        columns.push(&record, line_index);
    }

    columns.into_raw_data()
}

/// The header must list the raw export columns exactly, in order.
pub fn validate_header(header: &StringRecord) -> Result<(), LoaderError> {
    let found: Vec<&str> = header
        .iter()
        .enumerate()
        .map(|(idx, field)| {
            let field = if idx == 0 {
                field.trim_start_matches(BYTE_ORDER_MARK)
            } else {
                field
            };
            field.trim()
        })
        .collect();

    if found.len() != RAW_COLUMNS.len() {
        return Err(LoaderError::InvalidHeader {
            message: format!(
                "expected {} columns {:?}, found {} {:?}",
                RAW_COLUMNS.len(),
                RAW_COLUMNS,
                found.len(),
                found
            ),
        });
    }

    for (position, (expected, actual)) in RAW_COLUMNS.iter().zip(found.iter()).enumerate() {
        if expected != actual {
            return Err(LoaderError::InvalidHeader {
                message: format!("column {position} should be '{expected}', found '{actual}'"),
            });
        }
    }

    Ok(())
}

#[derive(Default)]
struct RawColumns {
    start_date: Vec<Option<String>>,
    end_date: Vec<Option<String>>,
    category: Vec<Option<String>>,
    start: Vec<Option<String>>,
    stop: Vec<Option<String>>,
    miles: Vec<Option<f64>>,
    purpose: Vec<Option<String>>,
    rejected_miles: Vec<RejectedValue>,
}

impl RawColumns {
    fn push(&mut self, record: &StringRecord, line_index: usize) {
        let cell = |column: TripColumn| record.get(column as usize).unwrap_or_default();

        self.start_date.push(clean_text(cell(TripColumn::StartDate)));
        self.end_date.push(clean_text(cell(TripColumn::EndDate)));
        self.category.push(clean_text(cell(TripColumn::Category)));
        self.start.push(clean_text(cell(TripColumn::Start)));
        self.stop.push(clean_text(cell(TripColumn::Stop)));
        self.purpose.push(clean_text(cell(TripColumn::Purpose)));

        let raw_miles = cell(TripColumn::Miles);
        match parse_miles(raw_miles) {
            Ok(value) => self.miles.push(value),
            Err(()) => {
                self.miles.push(None);
                self.rejected_miles.push(RejectedValue {
                    line_index,
                    value: raw_miles.to_string(),
                });
            }
        }
    }

    fn into_raw_data(self) -> Result<RawTripData, LoaderError> {
        let text = |column: TripColumn, values: Vec<Option<String>>| -> Column {
            Series::new(column.raw_name().into(), values).into()
        };

        let columns = vec![
            text(TripColumn::StartDate, self.start_date),
            text(TripColumn::EndDate, self.end_date),
            text(TripColumn::Category, self.category),
            text(TripColumn::Start, self.start),
            text(TripColumn::Stop, self.stop),
            Series::new(TripColumn::Miles.raw_name().into(), self.miles).into(),
            text(TripColumn::Purpose, self.purpose),
        ];

        let df = DataFrame::new(columns).map_err(|err| LoaderError::Frame {
            message: err.to_string(),
        })?;

        Ok(RawTripData {
            df,
            rejected_miles: self.rejected_miles,
        })
    }
}

/// Only an empty cell is missing; whitespace is kept as written.
fn clean_text(value: &str) -> Option<String> {
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Empty cells are missing, not rejected; unreadable or negative distances are rejected.
fn parse_miles(value: &str) -> Result<Option<f64>, ()> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    match trimmed.parse::<f64>() {
        Ok(parsed) if parsed.is_finite() && parsed >= 0.0 => Ok(Some(parsed)),
        _ => Err(()),
    }
}
