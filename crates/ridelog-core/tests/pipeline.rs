use std::fs;
use std::path::PathBuf;

use ridelog_core::columns::{AVG_MPH, MONTH, PURPOSE, TRIP_TIME, WEEKDAY, WINDOW};
use ridelog_core::config::{CleaningOptions, PipelineConfig};
use ridelog_core::pipeline::{clean_table, run_pipeline, Stage};
use ridelog_core::{read_cleaned_csv, PipelineError, OUTPUT_COLUMNS};
use ridelog_parser::{parse_trip_records, LoaderError, LoaderOptions};
use tempfile::tempdir;

const HEADER: &str = "START_DATE*,END_DATE*,CATEGORY*,START*,STOP*,MILES*,PURPOSE*\n";

fn sample_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../ridelog-parser/tests/data/rides_sample.csv")
}

#[test]
fn duplicate_trip_collapses_to_one_derived_row() {
    let input = format!(
        "{HEADER}1/1/2016 21:11,1/1/2016 21:17,Business,Fort Pierce,Fort Pierce,5.1,Meal/Entertain\n\
         1/1/2016 21:11,1/1/2016 21:17,Business,Fort Pierce,Fort Pierce,5.1,Meal/Entertain\n"
    );
    let raw = parse_trip_records(input.as_bytes(), &LoaderOptions::default()).unwrap();
    let cleaned = clean_table(&raw.df, &CleaningOptions::default()).expect("cleaning succeeded");

    let df = &cleaned.df;
    assert_eq!(df.height(), 1);
    assert_eq!(df.get_column_names_str(), OUTPUT_COLUMNS);
    assert_eq!(df.column(TRIP_TIME).unwrap().i64().unwrap().get(0), Some(6));
    assert_eq!(df.column(AVG_MPH).unwrap().f64().unwrap().get(0), Some(51.0));
    assert_eq!(df.column(WEEKDAY).unwrap().str().unwrap().get(0), Some("Friday"));
    assert_eq!(df.column(MONTH).unwrap().str().unwrap().get(0), Some("January"));
    assert_eq!(df.column(WINDOW).unwrap().str().unwrap().get(0), Some("Evening"));
    assert_eq!(cleaned.normalize.duplicates_removed, 1);
}

#[test]
fn fast_trips_are_removed_from_the_final_table() {
    let input = format!(
        "{HEADER}1/5/2016 17:31,1/5/2016 17:32,Business,Cary,Durham,40,Meeting\n\
         1/5/2016 18:00,1/5/2016 18:30,Business,Cary,Durham,10,\n"
    );
    let raw = parse_trip_records(input.as_bytes(), &LoaderOptions::default()).unwrap();
    let cleaned = clean_table(&raw.df, &CleaningOptions::default()).unwrap();

    assert_eq!(cleaned.df.height(), 1);
    assert_eq!(cleaned.features.rows_over_speed_limit, 1);
    assert_eq!(
        cleaned.df.column(PURPOSE).unwrap().str().unwrap().get(0),
        Some("Not Provided")
    );
    let stages: Vec<Stage> = cleaned.stages.iter().map(|s| s.stage).collect();
    assert_eq!(stages, [Stage::Normalize, Stage::Coerce, Stage::Derive]);
}

#[test]
fn whitespace_purpose_is_not_a_duplicate_of_a_missing_one() {
    let input = format!(
        "{HEADER}1/2/2016 1:25,1/2/2016 1:37,Business,Fort Pierce,Fort Pierce,5, \n\
         1/2/2016 1:25,1/2/2016 1:37,Business,Fort Pierce,Fort Pierce,5,\n"
    );
    let raw = parse_trip_records(input.as_bytes(), &LoaderOptions::default()).unwrap();
    let cleaned = clean_table(&raw.df, &CleaningOptions::default()).unwrap();

    assert_eq!(cleaned.df.height(), 2);
    assert_eq!(cleaned.normalize.duplicates_removed, 0);
    assert_eq!(cleaned.normalize.purposes_filled, 1);
    let purpose = cleaned.df.column(PURPOSE).unwrap().str().unwrap();
    assert_eq!(purpose.get(0), Some(" "));
    assert_eq!(purpose.get(1), Some("Not Provided"));
}

#[test]
fn run_pipeline_writes_cleaned_table_and_charts() {
    let dir = tempdir().unwrap();
    let config = PipelineConfig {
        input_path: sample_path(),
        output_path: dir.path().join("CleanedData.csv"),
        visuals_dir: dir.path().join("Visuals"),
        ..PipelineConfig::default()
    };

    let report = run_pipeline(&config).expect("pipeline succeeded");

    assert_eq!(report.normalize.duplicates_removed, 1);
    assert_eq!(report.normalize.purposes_filled, 3);
    assert_eq!(report.normalize.incomplete_rows_dropped, 1);
    assert_eq!(report.features.rows_over_speed_limit, 0);
    assert_eq!(report.stages.first().map(|s| s.rows), Some(10));
    assert_eq!(report.stages.last().map(|s| s.stage), Some(Stage::Summarize));
    assert_eq!(report.charts.len(), 9);
    assert_eq!(report.chart_files.len(), 9);
    for path in &report.chart_files {
        assert!(path.exists(), "{} was not written", path.display());
    }

    let header = fs::read_to_string(&config.output_path).unwrap();
    assert_eq!(
        header.lines().next(),
        Some(OUTPUT_COLUMNS.join(",").as_str())
    );

    let reread = read_cleaned_csv(&config.output_path).unwrap();
    assert_eq!(reread.height(), 8);
    assert_eq!(reread.get_column_names_str(), OUTPUT_COLUMNS);
}

#[test]
fn summaries_can_be_skipped() {
    let dir = tempdir().unwrap();
    let config = PipelineConfig {
        input_path: sample_path(),
        output_path: dir.path().join("CleanedData.csv"),
        visuals_dir: dir.path().join("Visuals"),
        write_summaries: false,
        ..PipelineConfig::default()
    };

    let report = run_pipeline(&config).unwrap();
    assert!(report.chart_files.is_empty());
    assert!(!config.visuals_dir.exists());
    assert_eq!(report.stages.last().map(|s| s.stage), Some(Stage::Export));

    let json = serde_json::to_value(&report).unwrap();
    assert_eq!(json["stages"][0]["stage"], "load");
    assert_eq!(json["normalize"]["duplicates_removed"], 1);
    assert_eq!(json["domains"]["category"]["values"][0], "Business");
    assert!(json.get("charts").is_none());
}

#[test]
fn missing_input_stops_before_any_output() {
    let dir = tempdir().unwrap();
    let config = PipelineConfig {
        input_path: dir.path().join("absent.csv"),
        output_path: dir.path().join("CleanedData.csv"),
        visuals_dir: dir.path().join("Visuals"),
        ..PipelineConfig::default()
    };

    let err = run_pipeline(&config).unwrap_err();
    assert!(matches!(
        err,
        PipelineError::Loader(LoaderError::InputNotFound { .. })
    ));
    assert!(!config.output_path.exists());
}
