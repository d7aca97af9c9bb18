use polars::prelude::*;
use ridelog_parser::micros_to_datetime;
use serde::Serialize;
use tracing::info;

use crate::calendar::{Month, TimeWindow, Weekday};
use crate::columns::{
    require, AVG_MPH, END_DATE, MILES, MONTH, START_DATE, TRIP_TIME, WEEKDAY, WINDOW,
};
use crate::error::Result;

const MICROS_PER_MINUTE: i64 = 60 * 1_000_000;
const MINUTES_PER_HOUR: f64 = 60.0;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct SpeedRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct FeatureReport {
    pub rows_over_speed_limit: usize,
    pub speed_range_before_filter: Option<SpeedRange>,
    pub speed_range_after_filter: Option<SpeedRange>,
}

pub fn derive_features(df: &DataFrame, max_avg_mph: f64) -> Result<(DataFrame, FeatureReport)> {
    let with_metrics = derive_trip_metrics(df)?;
    let speed_range_before_filter = speed_range(&with_metrics)?;

    let (filtered, rows_over_speed_limit) = apply_speed_filter(&with_metrics, max_avg_mph)?;
    let speed_range_after_filter = speed_range(&filtered)?;

    let output = derive_calendar_columns(&filtered)?;

    info!(
        rows_over_speed_limit,
        max_avg_mph,
        rows = output.height(),
        "Derived trip features"
    );

    Ok((
        output,
        FeatureReport {
            rows_over_speed_limit,
            speed_range_before_filter,
            speed_range_after_filter,
        },
    ))
}

/// Adds `Trip Time` (whole minutes, truncated) and `avg MPH` (one decimal).
pub fn derive_trip_metrics(df: &DataFrame) -> Result<DataFrame> {
    let len = df.height();

    let start = require(df, START_DATE)?.datetime()?;
    let end = require(df, END_DATE)?.datetime()?;
    let miles = require(df, MILES)?.f64()?;

    let mut trip_minutes: Vec<Option<i64>> = Vec::with_capacity(len);
    let mut avg_mph: Vec<Option<f64>> = Vec::with_capacity(len);

    for idx in 0..len {
        let minutes = match (start.get(idx), end.get(idx)) {
            (Some(start), Some(end)) => Some((end - start) / MICROS_PER_MINUTE),
            _ => None,
        };
        let speed = match (minutes, miles.get(idx)) {
            (Some(minutes), Some(distance)) => Some(average_speed(distance, minutes)),
            _ => None,
        };
        trip_minutes.push(minutes);
        avg_mph.push(speed);
    }

    let mut output = df.clone();
    output.hstack_mut(&mut [
        Series::new(TRIP_TIME.into(), trip_minutes).into(),
        Series::new(AVG_MPH.into(), avg_mph).into(),
    ])?;

    Ok(output)
}

/// Miles per hour rounded to one decimal, ties to even. A zero-minute trip gives an
/// infinite or NaN speed.
pub fn average_speed(miles: f64, minutes: i64) -> f64 {
    let mph = MINUTES_PER_HOUR * miles / minutes as f64;
    (mph * 10.0).round_ties_even() / 10.0
}

/// Keeps rows at or below `max_avg_mph`. Missing, infinite and NaN speeds are dropped.
pub fn apply_speed_filter(df: &DataFrame, max_avg_mph: f64) -> Result<(DataFrame, usize)> {
    let speed = require(df, AVG_MPH)?.f64()?;
    let keep: Vec<bool> = speed
        .iter()
        .map(|value| matches!(value, Some(mph) if mph.is_finite() && mph <= max_avg_mph))
        .collect();
    let dropped = keep.iter().filter(|kept| !**kept).count();

    let mask = BooleanChunked::new("within_speed_limit".into(), keep);
    Ok((df.filter(&mask)?, dropped))
}

/// Adds `Weekday`, `Month` and `Window`, all taken from `Start Date`.
pub fn derive_calendar_columns(df: &DataFrame) -> Result<DataFrame> {
    let len = df.height();
    let start = require(df, START_DATE)?.datetime()?;

    let mut weekdays: Vec<Option<&'static str>> = Vec::with_capacity(len);
    let mut months: Vec<Option<&'static str>> = Vec::with_capacity(len);
    let mut windows: Vec<Option<&'static str>> = Vec::with_capacity(len);

    for idx in 0..len {
        let timestamp = start.get(idx).and_then(micros_to_datetime);
        weekdays.push(timestamp.map(|ts| Weekday::of(&ts).as_str()));
        months.push(timestamp.map(|ts| Month::of(&ts).as_str()));
        windows.push(timestamp.map(|ts| TimeWindow::of(&ts).as_str()));
    }

    let mut output = df.clone();
    output.hstack_mut(&mut [
        Series::new(WEEKDAY.into(), weekdays).into(),
        Series::new(MONTH.into(), months).into(),
        Series::new(WINDOW.into(), windows).into(),
    ])?;

    Ok(output)
}

/// Smallest and largest finite `avg MPH`, if any.
pub fn speed_range(df: &DataFrame) -> Result<Option<SpeedRange>> {
    let speed = require(df, AVG_MPH)?.f64()?;
    let range = speed
        .iter()
        .flatten()
        .filter(|mph| mph.is_finite())
        .fold(None, |range: Option<SpeedRange>, mph| match range {
            None => Some(SpeedRange { min: mph, max: mph }),
            Some(current) => Some(SpeedRange {
                min: current.min.min(mph),
                max: current.max.max(mph),
            }),
        });
    Ok(range)
}
