use polars::prelude::*;
use ridelog_parser::TripColumn;
use serde::Serialize;
use tracing::info;

use crate::columns::{require, PURPOSE};
use crate::error::Result;

#[derive(Debug, Clone, Default, Serialize)]
pub struct NormalizeReport {
    pub duplicates_removed: usize,
    pub purposes_filled: usize,
    pub incomplete_rows_dropped: usize,
}

/// Rename, de-duplicate, fill the purpose sentinel, then drop rows that still have nulls.
pub fn normalize(raw: &DataFrame, sentinel: &str) -> Result<(DataFrame, NormalizeReport)> {
    let renamed = rename_columns(raw)?;

    let deduplicated = drop_duplicate_rows(&renamed)?;
    let duplicates_removed = renamed.height() - deduplicated.height();

    let (filled, purposes_filled) = fill_missing_purpose(&deduplicated, sentinel)?;

    let complete = drop_incomplete_rows(&filled)?;
    let incomplete_rows_dropped = filled.height() - complete.height();

    info!(
        duplicates_removed,
        purposes_filled,
        incomplete_rows_dropped,
        rows = complete.height(),
        "Normalized trip table"
    );

    Ok((
        complete,
        NormalizeReport {
            duplicates_removed,
            purposes_filled,
            incomplete_rows_dropped,
        },
    ))
}

pub fn rename_columns(df: &DataFrame) -> Result<DataFrame> {
    let mut columns = Vec::with_capacity(TripColumn::ALL.len());
    for column in TripColumn::ALL {
        let source = require(df, column.raw_name())?;
        columns.push(source.clone().with_name(column.canonical_name().into()));
    }
    Ok(DataFrame::new(columns)?)
}

/// Keeps the first of every group of rows that agree in every column.
pub fn drop_duplicate_rows(df: &DataFrame) -> Result<DataFrame> {
    Ok(df.unique_stable(None, UniqueKeepStrategy::First, None)?)
}

/// Returns the table with missing purposes replaced, and how many were replaced.
/// Whitespace-only text is a value, not a missing purpose.
pub fn fill_missing_purpose(df: &DataFrame, sentinel: &str) -> Result<(DataFrame, usize)> {
    let purpose = require(df, PURPOSE)?.str()?;
    let filled = purpose.null_count();
    let values: Vec<&str> = purpose
        .iter()
        .map(|value| value.unwrap_or(sentinel))
        .collect();

    let mut output = df.clone();
    output.with_column(Series::new(PURPOSE.into(), values))?;
    Ok((output, filled))
}

pub fn drop_incomplete_rows(df: &DataFrame) -> Result<DataFrame> {
    let names = df.get_column_names_str();
    drop_null_rows(df, &names)
}

/// Drops rows with a null in any of `columns`.
pub fn drop_null_rows(df: &DataFrame, columns: &[&str]) -> Result<DataFrame> {
    let predicate = columns
        .iter()
        .map(|name| col(*name).is_not_null())
        .reduce(|acc, expr| acc.and(expr));

    match predicate {
        Some(predicate) => Ok(df.clone().lazy().filter(predicate).collect()?),
        None => Ok(df.clone()),
    }
}
