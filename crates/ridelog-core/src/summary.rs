//! Count tables and statistics behind the trip charts.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use comfy_table::presets::UTF8_FULL;
use comfy_table::Table;
use csv::Writer;
use polars::prelude::*;
use serde::Serialize;
use tracing::info;

use crate::calendar::{Month, TimeWindow, Weekday};
use crate::coercion::TripDomains;
use crate::columns::{
    require, AVG_MPH, CATEGORY, MILES, MONTH, PURPOSE, TRIP_TIME, WEEKDAY, WINDOW,
};
use crate::config::SummaryOptions;
use crate::domain::CategoryDomain;
use crate::error::{PipelineError, Result};

const CORRELATION_COLUMNS: [&str; 3] = [MILES, TRIP_TIME, AVG_MPH];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartTable {
    /// File stem used when the table is written out.
    pub name: String,
    pub title: String,
    pub header: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ChartTable {
    fn counts<'a, I>(name: &str, title: &str, label: &str, counts: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, usize)>,
    {
        Self {
            name: name.to_string(),
            title: title.to_string(),
            header: vec![label.to_string(), "Trips".to_string()],
            rows: counts
                .into_iter()
                .map(|(key, count)| vec![key.to_string(), count.to_string()])
                .collect(),
        }
    }

    /// Count stored in the second column of the row labelled `key`.
    pub fn count_for(&self, key: &str) -> Option<usize> {
        self.rows
            .iter()
            .find(|row| row.first().map(String::as_str) == Some(key))
            .and_then(|row| row.get(1))
            .and_then(|value| value.parse().ok())
    }
}

/// Every chart table, in report order.
pub fn build_chart_tables(
    df: &DataFrame,
    domains: &TripDomains,
    sentinel: &str,
    options: &SummaryOptions,
) -> Result<Vec<ChartTable>> {
    Ok(vec![
        category_counts(df, &domains.category)?,
        purpose_counts(df, &domains.purpose, None)?,
        purpose_counts(df, &domains.purpose, Some(sentinel))?,
        weekday_counts(df)?,
        month_counts(df)?,
        window_counts(df)?,
        purpose_counts_for_month(df, &domains.purpose, options.focus_month)?,
        purpose_by_month(df, &domains.purpose, options.top_purpose_min_trips)?,
        correlation_matrix(df)?,
    ])
}

pub fn category_counts(df: &DataFrame, domain: &CategoryDomain) -> Result<ChartTable> {
    let counts = domain.tally(&domain.encode(df, CATEGORY)?);
    Ok(ChartTable::counts(
        "Trips-by-Category",
        "Trips by Category",
        CATEGORY,
        domain.values().iter().map(String::as_str).zip(counts),
    ))
}

/// Trips per purpose; `exclude` drops one label (the sentinel) from the table.
pub fn purpose_counts(
    df: &DataFrame,
    domain: &CategoryDomain,
    exclude: Option<&str>,
) -> Result<ChartTable> {
    let counts = domain.tally(&domain.encode(df, PURPOSE)?);
    let (name, title) = match exclude {
        Some(excluded) => (
            "Trips-by-Purpose-Provided",
            format!("Trips by Purpose (\"{excluded}\" removed)"),
        ),
        None => ("Trips-by-Purpose", "Trips by Purpose".to_string()),
    };
    Ok(ChartTable::counts(
        name,
        &title,
        PURPOSE,
        domain
            .values()
            .iter()
            .map(String::as_str)
            .zip(counts)
            .filter(|(value, _)| Some(*value) != exclude),
    ))
}

pub fn weekday_counts(df: &DataFrame) -> Result<ChartTable> {
    let counts = count_values(df, WEEKDAY)?;
    Ok(ChartTable::counts(
        "Trips-by-Weekday",
        "Trips by Weekday",
        WEEKDAY,
        Weekday::ALL
            .iter()
            .map(|day| (day.as_str(), counts.get(day.as_str()).copied().unwrap_or(0))),
    ))
}

pub fn month_counts(df: &DataFrame) -> Result<ChartTable> {
    let counts = count_values(df, MONTH)?;
    Ok(ChartTable::counts(
        "Trips-by-Month",
        "Trips by Month",
        MONTH,
        Month::ALL
            .iter()
            .map(|month| (month.as_str(), counts.get(month.as_str()).copied().unwrap_or(0))),
    ))
}

pub fn window_counts(df: &DataFrame) -> Result<ChartTable> {
    let counts = count_values(df, WINDOW)?;
    Ok(ChartTable::counts(
        "Trips-by-Window",
        "Trips by Time Window",
        WINDOW,
        TimeWindow::ALL
            .iter()
            .map(|window| (window.as_str(), counts.get(window.as_str()).copied().unwrap_or(0))),
    ))
}

/// Purpose counts over all months next to the counts for one month.
pub fn purpose_counts_for_month(
    df: &DataFrame,
    domain: &CategoryDomain,
    month: Month,
) -> Result<ChartTable> {
    let codes = domain.encode(df, PURPOSE)?;
    let months = require(df, MONTH)?.str()?;

    let all = domain.tally(&codes);
    let in_month_codes: Vec<u32> = codes
        .iter()
        .zip(months.iter())
        .filter(|(_, trip_month)| *trip_month == Some(month.as_str()))
        .map(|(code, _)| *code)
        .collect();
    let in_month = domain.tally(&in_month_codes);

    let rows = domain
        .values()
        .iter()
        .zip(all.iter().zip(&in_month))
        .map(|(purpose, (all, in_month))| {
            vec![purpose.clone(), all.to_string(), in_month.to_string()]
        })
        .collect();

    Ok(ChartTable {
        name: "Trip-Purpose".to_string(),
        title: format!("Trip Purpose: all months vs {}", month.as_str()),
        header: vec![
            PURPOSE.to_string(),
            "All Months".to_string(),
            format!("In {}", month.as_str()),
        ],
        rows,
    })
}

/// Month-by-purpose trip counts for purposes with more than `min_trips` trips overall.
/// Purpose columns are ordered by descending total, months by calendar order.
pub fn purpose_by_month(
    df: &DataFrame,
    domain: &CategoryDomain,
    min_trips: usize,
) -> Result<ChartTable> {
    let codes = domain.encode(df, PURPOSE)?;
    let months = require(df, MONTH)?.str()?;

    let mut cells: HashMap<(Month, u32), usize> = HashMap::new();
    for (code, month) in codes.iter().zip(months.iter()) {
        if let Some(month) = month.and_then(Month::from_name) {
            *cells.entry((month, *code)).or_insert(0) += 1;
        }
    }

    let totals = domain.tally(&codes);
    let mut top: Vec<(u32, &str, usize)> = totals
        .into_iter()
        .enumerate()
        .filter(|(_, total)| *total > min_trips)
        .filter_map(|(code, total)| {
            let code = code as u32;
            domain.label(code).map(|label| (code, label, total))
        })
        .collect();
    // codes follow label order, so equal totals stay alphabetical
    top.sort_by(|a, b| b.2.cmp(&a.2).then_with(|| a.0.cmp(&b.0)));

    let present: Vec<Month> = Month::ALL
        .into_iter()
        .filter(|month| cells.keys().any(|(cell_month, _)| cell_month == month))
        .collect();

    let mut header = vec![MONTH.to_string()];
    header.extend(top.iter().map(|(_, label, _)| label.to_string()));

    let rows = present
        .iter()
        .map(|month| {
            let mut row = vec![month.as_str().to_string()];
            row.extend(top.iter().map(|(code, _, _)| {
                cells
                    .get(&(*month, *code))
                    .copied()
                    .unwrap_or(0)
                    .to_string()
            }));
            row
        })
        .collect();

    Ok(ChartTable {
        name: "Purpose-by-Month".to_string(),
        title: format!("Trips per month for purposes with more than {min_trips} trips"),
        header,
        rows,
    })
}

/// Pearson correlation between the numeric trip columns.
pub fn correlation_matrix(df: &DataFrame) -> Result<ChartTable> {
    let mut series: Vec<Vec<Option<f64>>> = Vec::with_capacity(CORRELATION_COLUMNS.len());
    for name in CORRELATION_COLUMNS {
        let column = require(df, name)?.cast(&DataType::Float64)?;
        series.push(column.f64()?.iter().collect());
    }

    let mut header = vec![String::new()];
    header.extend(CORRELATION_COLUMNS.iter().map(|name| name.to_string()));

    let rows = CORRELATION_COLUMNS
        .iter()
        .enumerate()
        .map(|(i, name)| {
            let mut row = vec![name.to_string()];
            row.extend((0..CORRELATION_COLUMNS.len()).map(|j| {
                match pearson(&series[i], &series[j]) {
                    Some(value) => format!("{value:.4}"),
                    None => "NaN".to_string(),
                }
            }));
            row
        })
        .collect();

    Ok(ChartTable {
        name: "Correlation".to_string(),
        title: "Correlation of numeric trip columns".to_string(),
        header,
        rows,
    })
}

/// Uses pairs where both values are present and finite. `None` when a side has no spread.
pub fn pearson(xs: &[Option<f64>], ys: &[Option<f64>]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = xs
        .iter()
        .zip(ys)
        .filter_map(|(x, y)| match (x, y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Some((*x, *y)),
            _ => None,
        })
        .collect();
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let (mut cov, mut var_x, mut var_y) = (0.0, 0.0, 0.0);
    for (x, y) in &pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        cov += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }
    Some(cov / (var_x.sqrt() * var_y.sqrt()))
}

/// Writes each table to `<dir>/<name>.csv`, creating `dir` if needed.
pub fn write_chart_tables(dir: &Path, tables: &[ChartTable]) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir)?;

    let mut written = Vec::with_capacity(tables.len());
    for table in tables {
        let path = dir.join(format!("{}.csv", table.name));
        let output_err = |source: csv::Error| PipelineError::OutputWrite {
            path: path.clone(),
            source,
        };

        let mut writer = Writer::from_path(&path).map_err(output_err)?;
        writer.write_record(&table.header).map_err(output_err)?;
        for row in &table.rows {
            writer.write_record(row).map_err(output_err)?;
        }
        writer.flush().map_err(|err| output_err(err.into()))?;
        written.push(path);
    }

    info!(dir = %dir.display(), tables = written.len(), "Wrote chart tables");
    Ok(written)
}

pub fn render_table(table: &ChartTable) -> String {
    let mut rendered = Table::new();
    rendered
        .load_preset(UTF8_FULL)
        .set_header(table.header.clone());
    for row in &table.rows {
        rendered.add_row(row.clone());
    }
    format!("{}\n{rendered}", table.title)
}

fn count_values(df: &DataFrame, name: &str) -> Result<HashMap<String, usize>> {
    let column = require(df, name)?.str()?;
    let mut counts: HashMap<String, usize> = HashMap::new();
    for value in column.iter().flatten() {
        *counts.entry(value.to_string()).or_insert(0) += 1;
    }
    Ok(counts)
}
