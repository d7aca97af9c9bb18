use polars::prelude::{Column, DataFrame};

use crate::error::{PipelineError, Result};

pub const START_DATE: &str = "Start Date";
pub const END_DATE: &str = "End Date";
pub const CATEGORY: &str = "Category";
pub const START: &str = "Start";
pub const STOP: &str = "Stop";
pub const MILES: &str = "Miles";
pub const PURPOSE: &str = "Purpose";
pub const TRIP_TIME: &str = "Trip Time";
pub const AVG_MPH: &str = "avg MPH";
pub const WEEKDAY: &str = "Weekday";
pub const MONTH: &str = "Month";
pub const WINDOW: &str = "Window";

/// Column order of the cleaned export.
pub const OUTPUT_COLUMNS: [&str; 12] = [
    START_DATE, END_DATE, CATEGORY, START, STOP, MILES, PURPOSE, TRIP_TIME, AVG_MPH, WEEKDAY,
    MONTH, WINDOW,
];

pub(crate) fn require<'a>(df: &'a DataFrame, name: &str) -> Result<&'a Column> {
    df.column(name)
        .map_err(|_| PipelineError::MissingColumn(name.to_string()))
}
