use std::fs;
use std::path::{Path, PathBuf};

use ridelog_parser::LoaderOptions;
use serde::Deserialize;

use crate::calendar::Month;
use crate::error::{PipelineError, Result};

pub const DEFAULT_INPUT: &str = "My-Uber-Drives-2016.csv";
pub const DEFAULT_OUTPUT: &str = "CleanedData.csv";
pub const DEFAULT_VISUALS_DIR: &str = "Visuals";
pub const NOT_PROVIDED: &str = "Not Provided";
pub const DEFAULT_MAX_AVG_MPH: f64 = 80.0;

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub visuals_dir: PathBuf,
    pub write_summaries: bool,
    pub loader: LoaderOptions,
    pub cleaning: CleaningOptions,
    pub summary: SummaryOptions,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            input_path: PathBuf::from(DEFAULT_INPUT),
            output_path: PathBuf::from(DEFAULT_OUTPUT),
            visuals_dir: PathBuf::from(DEFAULT_VISUALS_DIR),
            write_summaries: true,
            loader: LoaderOptions::default(),
            cleaning: CleaningOptions::default(),
            summary: SummaryOptions::default(),
        }
    }
}

impl PipelineConfig {
    pub fn from_toml_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|source| PipelineError::Config {
            path: path.to_path_buf(),
            source,
        })
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CleaningOptions {
    /// Substituted for a missing trip purpose.
    pub missing_purpose_sentinel: String,
    /// Rows whose average speed exceeds this are dropped; equal is kept.
    pub max_avg_mph: f64,
}

impl Default for CleaningOptions {
    fn default() -> Self {
        Self {
            missing_purpose_sentinel: NOT_PROVIDED.to_string(),
            max_avg_mph: DEFAULT_MAX_AVG_MPH,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SummaryOptions {
    /// Purposes need strictly more trips than this to get a purpose-by-month column.
    pub top_purpose_min_trips: usize,
    pub focus_month: Month,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            top_purpose_min_trips: 80,
            focus_month: Month::December,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: PipelineConfig = toml::from_str(
            r#"
                output_path = "out/clean.csv"

                [cleaning]
                max_avg_mph = 65.0

                [summary]
                focus_month = "July"
            "#,
        )
        .expect("config should parse");

        assert_eq!(config.output_path, PathBuf::from("out/clean.csv"));
        assert_eq!(config.input_path, PathBuf::from(DEFAULT_INPUT));
        assert_eq!(config.cleaning.max_avg_mph, 65.0);
        assert_eq!(config.cleaning.missing_purpose_sentinel, NOT_PROVIDED);
        assert_eq!(config.summary.focus_month, Month::July);
        assert_eq!(config.summary.top_purpose_min_trips, 80);
        assert_eq!(config.loader.delimiter, ',');
    }

    #[test]
    fn unknown_month_is_a_config_error() {
        let parsed: std::result::Result<PipelineConfig, _> =
            toml::from_str("[summary]\nfocus_month = \"Smarch\"\n");
        assert!(parsed.is_err());
    }
}
