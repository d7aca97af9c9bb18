pub mod calendar;
pub mod coercion;
pub mod columns;
pub mod config;
pub mod domain;
pub mod error;
pub mod export;
pub mod features;
pub mod normalizer;
pub mod pipeline;
pub mod summary;

pub use calendar::{Month, TimeWindow, Weekday};
pub use coercion::{coerce_types, CoercedTable, CoercionReport, TripDomains};
pub use columns::OUTPUT_COLUMNS;
pub use config::{CleaningOptions, PipelineConfig, SummaryOptions};
pub use domain::CategoryDomain;
pub use error::{PipelineError, Result};
pub use export::{read_cleaned_csv, write_cleaned_csv};
pub use features::{derive_features, FeatureReport, SpeedRange};
pub use normalizer::{normalize, NormalizeReport};
pub use pipeline::{clean_table, run_pipeline, CleanedTrips, PipelineReport, Stage, StageRows};
pub use summary::{build_chart_tables, render_table, write_chart_tables, ChartTable};
