use polars::prelude::*;
use ridelog_core::columns::{CATEGORY, MILES, PURPOSE, START_DATE};
use ridelog_core::normalizer::{
    drop_duplicate_rows, drop_null_rows, fill_missing_purpose, normalize, rename_columns,
};
use ridelog_parser::CANONICAL_COLUMNS;

fn raw_trips() -> DataFrame {
    df!(
        "START_DATE*" => &[Some("1/6/2016 17:15"), Some("1/6/2016 17:15"), Some("1/2/2016 1:25"), Some("Totals")],
        "END_DATE*" => &[Some("1/6/2016 17:19"), Some("1/6/2016 17:19"), Some("1/2/2016 1:37"), None],
        "CATEGORY*" => &[Some("Business"), Some("Business"), Some("Business"), None],
        "START*" => &[Some("West Palm Beach"), Some("West Palm Beach"), Some("Fort Pierce"), None],
        "STOP*" => &[Some("West Palm Beach"), Some("West Palm Beach"), Some("Fort Pierce"), None],
        "MILES*" => &[Some(4.3f64), Some(4.3f64), Some(5.0f64), Some(12204.7f64)],
        "PURPOSE*" => &[Some("Meal/Entertain"), Some("Meal/Entertain"), None, None],
    )
    .unwrap()
}

#[test]
fn rename_uses_canonical_names_in_order() {
    let renamed = rename_columns(&raw_trips()).expect("rename succeeded");
    assert_eq!(renamed.get_column_names_str(), CANONICAL_COLUMNS);
    assert_eq!(renamed.height(), 4);
}

#[test]
fn rename_reports_missing_column() {
    let mut df = raw_trips();
    let _ = df.drop_in_place("STOP*").unwrap();
    let err = rename_columns(&df).unwrap_err();
    assert!(err.to_string().contains("STOP*"));
}

#[test]
fn duplicates_keep_first_occurrence() {
    let renamed = rename_columns(&raw_trips()).unwrap();
    let deduplicated = drop_duplicate_rows(&renamed).expect("dedup succeeded");

    assert_eq!(deduplicated.height(), 3);
    let start = deduplicated.column(START_DATE).unwrap().str().unwrap();
    assert_eq!(start.get(0), Some("1/6/2016 17:15"));
    assert_eq!(start.get(1), Some("1/2/2016 1:25"));
}

#[test]
fn rows_with_matching_nulls_are_duplicates() {
    let df = df!(
        CATEGORY => &[None::<&str>, None],
        MILES => &[Some(1.0f64), Some(1.0f64)],
    )
    .unwrap();
    assert_eq!(drop_duplicate_rows(&df).unwrap().height(), 1);
}

#[test]
fn rows_differing_in_one_column_survive() {
    let df = df!(
        CATEGORY => &["Business", "Business"],
        MILES => &[1.0f64, 1.5f64],
    )
    .unwrap();
    assert_eq!(drop_duplicate_rows(&df).unwrap().height(), 2);
}

#[test]
fn missing_purposes_get_the_sentinel() {
    let df = df!(PURPOSE => &[Some("Meeting"), None, Some("  "), None]).unwrap();
    let (filled, count) = fill_missing_purpose(&df, "Not Provided").expect("fill succeeded");

    assert_eq!(count, 2);
    let purpose = filled.column(PURPOSE).unwrap().str().unwrap();
    assert_eq!(purpose.get(0), Some("Meeting"));
    assert_eq!(purpose.get(1), Some("Not Provided"));
    assert_eq!(purpose.get(2), Some("  "));
    assert_eq!(purpose.get(3), Some("Not Provided"));
}

#[test]
fn null_rows_drop_only_for_named_columns() {
    let df = df!(
        CATEGORY => &[Some("Business"), None, Some("Personal")],
        MILES => &[None, Some(2.0f64), Some(3.0f64)],
    )
    .unwrap();

    assert_eq!(drop_null_rows(&df, &[CATEGORY]).unwrap().height(), 2);
    assert_eq!(drop_null_rows(&df, &[CATEGORY, MILES]).unwrap().height(), 1);
    assert_eq!(drop_null_rows(&df, &[]).unwrap().height(), 3);
}

#[test]
fn normalize_dedups_fills_then_drops_incomplete_rows() {
    let (normalized, report) = normalize(&raw_trips(), "Not Provided").expect("normalize");

    assert_eq!(report.duplicates_removed, 1);
    assert_eq!(report.purposes_filled, 2);
    assert_eq!(report.incomplete_rows_dropped, 1);
    assert_eq!(normalized.height(), 2);

    for column in normalized.get_columns() {
        assert_eq!(column.null_count(), 0, "column {} has nulls", column.name());
    }

    let purpose = normalized.column(PURPOSE).unwrap().str().unwrap();
    assert_eq!(purpose.get(1), Some("Not Provided"));
}
