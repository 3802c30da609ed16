mod common;

use csv_dashboard::{
    stats::{self, ColumnStats},
    table::{ColumnType, ReadOptions, Table},
};

use common::{fixture_bytes, numeric_column_csv};

fn approx(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("metric present");
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}

#[test]
fn summary_of_one_to_five_uses_population_formula() {
    let table = Table::from_csv_str(&numeric_column_csv("v", &[1.0, 2.0, 3.0, 4.0, 5.0]))
        .expect("parse");
    let summary = stats::summarize(&table).remove(0);

    assert_eq!(summary.column_type, ColumnType::Numeric);
    assert_eq!(summary.count, 5);
    approx(summary.mean, 3.0);
    approx(summary.std, 2f64.sqrt());
    approx(summary.min, 1.0);
    approx(summary.max, 5.0);
}

#[test]
fn missing_cells_are_excluded_from_aggregates() {
    let table = Table::from_csv_str("v,k\n2,a\n,b\n4,c\n").expect("parse");
    let summary = stats::summarize_column(table.column("v").unwrap());
    assert_eq!(summary.count, 2);
    approx(summary.mean, 3.0);
    approx(summary.std, 1.0);
}

#[test]
fn text_and_unknown_columns_carry_no_numeric_fields() {
    let table = Table::from_csv_str("name,blank\nx,\ny,\n").expect("parse");
    let summaries = stats::summarize(&table);

    assert_eq!(summaries[0].column_type, ColumnType::Text);
    assert_eq!(summaries[0].count, 2);
    assert!(summaries[0].mean.is_none() && summaries[0].std.is_none());
    assert_eq!(summaries[1].column_type, ColumnType::Unknown);
    assert_eq!(summaries[1].count, 0);
    assert!(summaries[1].max.is_none());
}

#[test]
fn summary_serializes_without_absent_metrics() {
    let table = Table::from_csv_str("name\nx\n").expect("parse");
    let json = serde_json::to_value(stats::summarize(&table)).expect("serialize");
    assert_eq!(
        json,
        serde_json::json!([{ "name": "name", "type": "text", "count": 1 }])
    );
}

#[test]
fn fixture_summaries_follow_header_order() {
    let table = Table::from_csv_bytes(&fixture_bytes("orders.csv"), &ReadOptions::default())
        .expect("parse orders");
    let summaries = stats::summarize(&table);
    let names = summaries
        .iter()
        .map(|summary| summary.name.as_str())
        .collect::<Vec<_>>();
    assert_eq!(names, vec!["region", "units", "revenue", "channel"]);

    let units = &summaries[1];
    approx(units.mean, 7.5);
    approx(units.max, 60.0);
    approx(units.min, 2.0);
    assert_eq!(summaries[3].count, 12);
}

#[test]
fn streaming_accumulator_matches_two_pass_result() {
    let values = [1.0e9 + 4.0, 1.0e9 + 7.0, 1.0e9 + 13.0, 1.0e9 + 16.0];
    let streamed = values.iter().copied().collect::<ColumnStats>();

    let mean = values.iter().sum::<f64>() / values.len() as f64;
    let variance =
        values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / values.len() as f64;

    assert!((streamed.mean().unwrap() - mean).abs() < 1e-6);
    assert!((streamed.std_dev().unwrap() - variance.sqrt()).abs() < 1e-4);
}
