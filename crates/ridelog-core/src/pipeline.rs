use std::path::PathBuf;

use polars::prelude::DataFrame;
use ridelog_parser::load_trip_file;
use serde::Serialize;
use tracing::{info, warn};

use crate::coercion::{coerce_types, CoercionReport, TripDomains};
use crate::config::{CleaningOptions, PipelineConfig};
use crate::error::{PipelineError, Result};
use crate::export::write_cleaned_csv;
use crate::features::{derive_features, FeatureReport};
use crate::normalizer::{normalize, NormalizeReport};
use crate::summary::{build_chart_tables, write_chart_tables, ChartTable};

/// Pipeline stages in execution order. No nulls survive past `Coerce`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    Load,
    Normalize,
    Coerce,
    Derive,
    Export,
    Summarize,
}

impl Stage {
    pub const ORDER: [Stage; 6] = [
        Stage::Load,
        Stage::Normalize,
        Stage::Coerce,
        Stage::Derive,
        Stage::Export,
        Stage::Summarize,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Stage::Load => "load",
            Stage::Normalize => "normalize",
            Stage::Coerce => "coerce",
            Stage::Derive => "derive",
            Stage::Export => "export",
            Stage::Summarize => "summarize",
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct StageRows {
    pub stage: Stage,
    pub rows: usize,
}

/// The in-memory result of Normalize → Coerce → Derive.
#[derive(Debug, Clone)]
pub struct CleanedTrips {
    pub df: DataFrame,
    pub domains: TripDomains,
    pub normalize: NormalizeReport,
    pub coercion: CoercionReport,
    pub features: FeatureReport,
    pub stages: Vec<StageRows>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineReport {
    pub input_path: PathBuf,
    pub output_path: PathBuf,
    pub stages: Vec<StageRows>,
    pub rejected_miles: usize,
    pub normalize: NormalizeReport,
    pub coercion: CoercionReport,
    pub features: FeatureReport,
    pub domains: TripDomains,
    pub chart_files: Vec<PathBuf>,
    #[serde(skip)]
    pub charts: Vec<ChartTable>,
}

pub fn clean_table(raw: &DataFrame, options: &CleaningOptions) -> Result<CleanedTrips> {
    let mut stages = Vec::with_capacity(3);

    let (normalized, normalize_report) = normalize(raw, &options.missing_purpose_sentinel)?;
    stages.push(stage_done(Stage::Normalize, &normalized));

    let coerced = coerce_types(&normalized)?;
    ensure_no_nulls(&coerced.df, Stage::Coerce)?;
    stages.push(stage_done(Stage::Coerce, &coerced.df));

    let (derived, feature_report) = derive_features(&coerced.df, options.max_avg_mph)?;
    stages.push(stage_done(Stage::Derive, &derived));

    Ok(CleanedTrips {
        df: derived,
        domains: coerced.domains,
        normalize: normalize_report,
        coercion: coerced.report,
        features: feature_report,
        stages,
    })
}

/// Runs every stage once, in order, and writes the cleaned table and chart tables.
pub fn run_pipeline(config: &PipelineConfig) -> Result<PipelineReport> {
    let loaded = load_trip_file(&config.input_path, &config.loader)?;
    for rejected in &loaded.rejected_miles {
        warn!(
            line = rejected.line_index,
            value = %rejected.value,
            "Distance is not a non-negative number; treating as missing"
        );
    }
    let load_rows = stage_done(Stage::Load, &loaded.df);

    let cleaned = clean_table(&loaded.df, &config.cleaning)?;

    write_cleaned_csv(&cleaned.df, &config.output_path)?;
    let export_rows = stage_done(Stage::Export, &cleaned.df);

    let mut stages = vec![load_rows];
    stages.extend(cleaned.stages);
    stages.push(export_rows);

    let (charts, chart_files) = if config.write_summaries {
        let charts = build_chart_tables(
            &cleaned.df,
            &cleaned.domains,
            &config.cleaning.missing_purpose_sentinel,
            &config.summary,
        )?;
        let files = write_chart_tables(&config.visuals_dir, &charts)?;
        stages.push(stage_done(Stage::Summarize, &cleaned.df));
        (charts, files)
    } else {
        info!("Skipping chart tables");
        (Vec::new(), Vec::new())
    };

    Ok(PipelineReport {
        input_path: config.input_path.clone(),
        output_path: config.output_path.clone(),
        stages,
        rejected_miles: loaded.rejected_miles.len(),
        normalize: cleaned.normalize,
        coercion: cleaned.coercion,
        features: cleaned.features,
        domains: cleaned.domains,
        chart_files,
        charts,
    })
}

fn stage_done(stage: Stage, df: &DataFrame) -> StageRows {
    info!(stage = stage.as_str(), rows = df.height(), "Stage complete");
    StageRows {
        stage,
        rows: df.height(),
    }
}

fn ensure_no_nulls(df: &DataFrame, stage: Stage) -> Result<()> {
    match df.get_columns().iter().find(|column| column.null_count() > 0) {
        Some(column) => Err(PipelineError::Validation(format!(
            "column '{}' still has {} nulls after {}",
            column.name(),
            column.null_count(),
            stage.as_str()
        ))),
        None => Ok(()),
    }
}
