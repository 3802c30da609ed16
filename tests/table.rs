mod common;

use encoding_rs::WINDOWS_1252;
use proptest::prelude::*;

use csv_dashboard::{
    error::ParseError,
    table::{Cell, ColumnType, ReadOptions, Table},
};

use common::fixture_bytes;

#[test]
fn header_order_and_types_are_preserved() {
    let table = Table::from_csv_bytes(&fixture_bytes("orders.csv"), &ReadOptions::default())
        .expect("parse orders");

    assert_eq!(table.row_count(), 14);
    assert_eq!(table.column_count(), 4);
    assert_eq!(
        table.column_names().collect::<Vec<_>>(),
        vec!["region", "units", "revenue", "channel"]
    );
    let types = table
        .columns()
        .iter()
        .map(|column| column.column_type())
        .collect::<Vec<_>>();
    assert_eq!(
        types,
        vec![
            ColumnType::Text,
            ColumnType::Numeric,
            ColumnType::Numeric,
            ColumnType::Text
        ]
    );
    assert_eq!(table.column("channel").unwrap().missing_count(), 2);
}

#[test]
fn single_non_numeric_cell_demotes_column_to_text() {
    let table = Table::from_csv_str("score\n1\n2\nthree\n4\n").expect("parse");
    let column = table.column("score").unwrap();
    assert_eq!(column.column_type(), ColumnType::Text);
    assert_eq!(column.numeric_values().count(), 0);
    assert_eq!(
        column.text_values().collect::<Vec<_>>(),
        vec!["1", "2", "three", "4"]
    );
}

#[test]
fn blank_cells_are_missing_and_do_not_affect_type() {
    let table = Table::from_csv_str("a,b\n1,x\n ,y\n3,\n").expect("parse");
    let a = table.column("a").unwrap();
    assert_eq!(a.column_type(), ColumnType::Numeric);
    assert_eq!(a.cells(), &[Cell::Number(1.0), Cell::Missing, Cell::Number(3.0)]);
    assert_eq!(table.column("b").unwrap().missing_count(), 1);
}

#[test]
fn all_blank_column_is_unknown() {
    let table = Table::from_csv_str("a,b\n,\n,\n").expect("parse");
    assert_eq!(table.row_count(), 2);
    assert!(
        table
            .columns()
            .iter()
            .all(|column| column.column_type() == ColumnType::Unknown)
    );
}

#[test]
fn non_finite_tokens_are_text() {
    let table = Table::from_csv_str("v\n1\ninf\n").expect("parse");
    assert_eq!(table.column("v").unwrap().column_type(), ColumnType::Text);
}

#[test]
fn ragged_rows_are_skipped_without_aborting() {
    let table = Table::from_csv_bytes(&fixture_bytes("ragged.csv"), &ReadOptions::default())
        .expect("parse ragged");
    assert_eq!(table.row_count(), 3);
    assert_eq!(table.skipped_rows(), 2);
    let temp = table.column("temp").unwrap();
    assert_eq!(temp.column_type(), ColumnType::Numeric);
    assert_eq!(temp.numeric_values().collect::<Vec<_>>(), vec![4.5, 5.0, 7.5]);
}

#[test]
fn duplicate_and_blank_headers_are_renamed() {
    let table = Table::from_csv_str("id,id,,name\n1,2,3,x\n").expect("parse");
    assert_eq!(
        table.column_names().collect::<Vec<_>>(),
        vec!["id", "id_2", "column_3", "name"]
    );
}

#[test]
fn configured_missing_tokens_are_excluded() {
    let options = ReadOptions {
        missing_tokens: vec!["NA".to_string()],
        ..ReadOptions::default()
    };
    let table = Table::from_csv_bytes(b"v\n1\nNA\n3\n", &options).expect("parse");
    let column = table.column("v").unwrap();
    assert_eq!(column.column_type(), ColumnType::Numeric);
    assert_eq!(column.missing_count(), 1);
}

#[test]
fn alternate_delimiter_and_encoding() {
    let options = ReadOptions::default()
        .with_delimiter(b';')
        .with_encoding(WINDOWS_1252);
    let table = Table::from_csv_bytes(&fixture_bytes("cafes_latin1.csv"), &options)
        .expect("parse latin1");
    let names = table.column("name").unwrap();
    assert_eq!(
        names.text_values().collect::<Vec<_>>(),
        vec!["Café Central", "Bäckerei", "Café Central"]
    );
    assert_eq!(table.column("visits").unwrap().column_type(), ColumnType::Numeric);
}

#[test]
fn rows_invalid_in_encoding_are_skipped() {
    let mut bytes = b"name,n\nok,1\n".to_vec();
    bytes.extend_from_slice(b"bad\xff,2\n");
    bytes.extend_from_slice(b"fine,3\n");
    let table = Table::from_csv_bytes(&bytes, &ReadOptions::default()).expect("parse");
    assert_eq!(table.row_count(), 2);
    assert_eq!(table.skipped_rows(), 1);
}

#[test]
fn empty_input_is_a_parse_error() {
    assert!(matches!(Table::from_csv_str(""), Err(ParseError::Empty)));
    assert!(matches!(Table::from_csv_str(" \n\n"), Err(ParseError::Empty)));
}

#[test]
fn header_without_rows_is_a_parse_error() {
    assert!(matches!(
        Table::from_csv_str("a,b\n"),
        Err(ParseError::NoRows { skipped: 0 })
    ));
}

#[test]
fn only_malformed_rows_is_a_parse_error() {
    assert!(matches!(
        Table::from_csv_str("a,b\n1\n2,3,4\n"),
        Err(ParseError::NoRows { skipped: 2 })
    ));
}

fn cell_strategy() -> impl Strategy<Value = String> {
    prop_oneof![
        Just(String::new()),
        (-1_000_000i64..1_000_000).prop_map(|v| v.to_string()),
        (-1.0e6f64..1.0e6).prop_map(|v| format!("{v:.3}")),
        "[a-z]{1,6}",
        Just("NaN".to_string()),
    ]
}

proptest! {
    #[test]
    fn numeric_type_implies_every_present_cell_is_finite(
        cells in proptest::collection::vec(cell_strategy(), 1..40)
    ) {
        let mut csv = String::from("value,row\n");
        for (idx, cell) in cells.iter().enumerate() {
            csv.push_str(&format!("{cell},{idx}\n"));
        }
        let table = Table::from_csv_str(&csv).expect("parse generated csv");
        let column = table.column("value").unwrap();
        let any_non_numeric = cells
            .iter()
            .filter(|cell| !cell.is_empty())
            .any(|cell| cell.parse::<f64>().map(|v| !v.is_finite()).unwrap_or(true));
        let all_blank = cells.iter().all(|cell| cell.is_empty());

        prop_assert_eq!(table.row_count(), cells.len());
        if all_blank {
            prop_assert_eq!(column.column_type(), ColumnType::Unknown);
        } else if any_non_numeric {
            prop_assert_eq!(column.column_type(), ColumnType::Text);
        } else {
            prop_assert_eq!(column.column_type(), ColumnType::Numeric);
            prop_assert_eq!(
                column.numeric_values().count(),
                cells.iter().filter(|cell| !cell.is_empty()).count()
            );
        }
    }
}
