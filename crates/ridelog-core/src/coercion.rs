use polars::prelude::*;
use ridelog_parser::parse_timestamp_micros;
use serde::Serialize;
use tracing::{info, warn};

use crate::columns::{require, CATEGORY, END_DATE, PURPOSE, START_DATE};
use crate::domain::CategoryDomain;
use crate::error::Result;
use crate::normalizer::drop_null_rows;

#[derive(Debug, Clone, Default, Serialize)]
pub struct CoercionReport {
    pub start_date_failures: usize,
    pub end_date_failures: usize,
    /// Rows removed because a timestamp could not be parsed.
    pub rows_dropped: usize,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct TripDomains {
    pub category: CategoryDomain,
    pub purpose: CategoryDomain,
}

#[derive(Debug, Clone)]
pub struct CoercedTable {
    pub df: DataFrame,
    pub domains: TripDomains,
    pub report: CoercionReport,
}

/// Parses both timestamp columns, drops rows whose timestamps did not parse, and
/// discovers the category and purpose domains. No nulls remain afterwards.
pub fn coerce_types(df: &DataFrame) -> Result<CoercedTable> {
    let (with_timestamps, start_date_failures, end_date_failures) = coerce_timestamps(df)?;

    let complete = drop_null_rows(&with_timestamps, &[START_DATE, END_DATE])?;
    let rows_dropped = with_timestamps.height() - complete.height();
    if rows_dropped > 0 {
        warn!(rows_dropped, "Dropped rows with unparsable timestamps");
    }

    let domains = discover_domains(&complete)?;
    info!(
        categories = domains.category.len(),
        purposes = domains.purpose.len(),
        rows = complete.height(),
        "Coerced trip table"
    );

    Ok(CoercedTable {
        df: complete,
        domains,
        report: CoercionReport {
            start_date_failures,
            end_date_failures,
            rows_dropped,
        },
    })
}

/// Returns the table with `Start Date` and `End Date` as datetimes, plus the number of
/// values in each that matched no accepted format and became null.
pub fn coerce_timestamps(df: &DataFrame) -> Result<(DataFrame, usize, usize)> {
    let mut output = df.clone();
    let start_failures = coerce_timestamp_column(&mut output, START_DATE)?;
    let end_failures = coerce_timestamp_column(&mut output, END_DATE)?;
    Ok((output, start_failures, end_failures))
}

fn coerce_timestamp_column(df: &mut DataFrame, name: &str) -> Result<usize> {
    let text = require(df, name)?.str()?;
    let mut failures = 0usize;
    let mut values: Vec<Option<i64>> = Vec::with_capacity(text.len());

    for raw in text.iter() {
        let parsed = raw.and_then(parse_timestamp_micros);
        if let (Some(raw), None) = (raw, parsed) {
            failures += 1;
            warn!(column = name, value = raw, "Timestamp matched no accepted format");
        }
        values.push(parsed);
    }

    let series = Series::new(name.into(), values)
        .cast(&DataType::Datetime(TimeUnit::Microseconds, None))?;
    df.with_column(series)?;
    Ok(failures)
}

pub fn discover_domains(df: &DataFrame) -> Result<TripDomains> {
    Ok(TripDomains {
        category: CategoryDomain::from_column(df, CATEGORY)?,
        purpose: CategoryDomain::from_column(df, PURPOSE)?,
    })
}
