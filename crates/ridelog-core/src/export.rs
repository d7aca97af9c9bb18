use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, Writer};
use polars::prelude::*;
use ridelog_parser::{format_timestamp_micros, parse_timestamp_micros, LoaderError};
use tracing::info;

use crate::columns::{AVG_MPH, END_DATE, MILES, START_DATE, TRIP_TIME};
use crate::error::{PipelineError, Result};

/// Writes the table as delimited text with a header row and no index column.
pub fn write_cleaned_csv(df: &DataFrame, path: &Path) -> Result<()> {
    let output_err = |source: csv::Error| PipelineError::OutputWrite {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = Writer::from_path(path).map_err(output_err)?;
    writer
        .write_record(df.get_column_names_str())
        .map_err(output_err)?;

    let columns = df.get_columns();
    let mut record: Vec<String> = Vec::with_capacity(columns.len());
    for idx in 0..df.height() {
        record.clear();
        for column in columns {
            record.push(format_cell(&column.get(idx)?));
        }
        writer.write_record(&record).map_err(output_err)?;
    }
    writer.flush().map_err(|err| output_err(err.into()))?;

    info!(path = %path.display(), rows = df.height(), "Wrote cleaned trip table");
    Ok(())
}

/// Reads a cleaned export back, re-typing the timestamp and numeric columns.
pub fn read_cleaned_csv(path: &Path) -> Result<DataFrame> {
    if !path.exists() {
        return Err(LoaderError::InputNotFound {
            path: path.to_path_buf(),
        }
        .into());
    }
    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new().has_headers(true).from_reader(file);

    let header: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
    let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); header.len()];
    for record in reader.records() {
        let record = record?;
        for (idx, values) in cells.iter_mut().enumerate() {
            let value = record.get(idx).unwrap_or_default();
            values.push((!value.is_empty()).then(|| value.to_string()));
        }
    }

    let mut columns = Vec::with_capacity(header.len());
    for (name, values) in header.iter().zip(cells) {
        columns.push(typed_column(name, values)?);
    }
    Ok(DataFrame::new(columns)?)
}

fn typed_column(name: &str, values: Vec<Option<String>>) -> Result<Column> {
    let series = match name {
        START_DATE | END_DATE => {
            let micros: Vec<Option<i64>> = values
                .iter()
                .map(|value| value.as_deref().and_then(parse_timestamp_micros))
                .collect();
            Series::new(name.into(), micros)
                .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?
        }
        MILES | AVG_MPH => {
            let parsed: Vec<Option<f64>> = values
                .iter()
                .map(|value| value.as_deref().and_then(|text| text.parse().ok()))
                .collect();
            Series::new(name.into(), parsed)
        }
        TRIP_TIME => {
            let parsed: Vec<Option<i64>> = values
                .iter()
                .map(|value| value.as_deref().and_then(|text| text.parse().ok()))
                .collect();
            Series::new(name.into(), parsed)
        }
        _ => Series::new(name.into(), values),
    };
    Ok(series.into())
}

fn format_cell(value: &AnyValue) -> String {
    match value {
        AnyValue::Null => String::new(),
        AnyValue::String(text) => (*text).to_string(),
        AnyValue::StringOwned(text) => text.to_string(),
        AnyValue::Float64(v) => format_float(*v),
        AnyValue::Int64(v) => v.to_string(),
        AnyValue::Datetime(v, unit, _) => {
            format_timestamp_micros(to_micros(*v, *unit)).unwrap_or_default()
        }
        other => other.to_string(),
    }
}

fn to_micros(value: i64, unit: TimeUnit) -> i64 {
    match unit {
        TimeUnit::Nanoseconds => value / 1_000,
        TimeUnit::Microseconds => value,
        TimeUnit::Milliseconds => value * 1_000,
    }
}

/// Whole numbers keep one decimal digit so the column reads back as a float.
fn format_float(value: f64) -> String {
    if value.is_finite() && value.fract() == 0.0 {
        format!("{value:.1}")
    } else {
        value.to_string()
    }
}
