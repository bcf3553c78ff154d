mod common;

use common::fixed;
use dynamic_reports::columns::MappedRow;
use dynamic_reports::config::{Filter, FixedColumns};
use dynamic_reports::error::ReportError;
use dynamic_reports::filter::apply_filters;

fn amount_columns() -> FixedColumns {
    fixed(&[
        ("c_code", "Code", 0, None),
        ("c_amount", "Amount", 1, None),
        ("c_hidden", "Hidden", -1, None),
    ])
}

fn rows(values: &[(&str, &str)]) -> Vec<MappedRow> {
    values
        .iter()
        .enumerate()
        .map(|(idx, (code, amount))| {
            MappedRow::from_pairs(idx, [("Code", *code), ("Amount", *amount)])
        })
        .collect()
}

fn codes(rows: &[MappedRow]) -> Vec<&str> {
    rows.iter().filter_map(|row| row.get("Code")).collect()
}

#[test]
fn greater_than_keeps_strictly_greater_rows() {
    let mut data = rows(&[("a", "10"), ("b", "20"), ("c", "30")]);
    apply_filters(&mut data, &[Filter::new("c_amount", ">", "15")], &amount_columns()).unwrap();
    assert_eq!(codes(&data), vec!["b", "c"]);
}

#[test]
fn less_than_keeps_strictly_smaller_rows() {
    let mut data = rows(&[("a", "10"), ("b", "15"), ("c", "30")]);
    apply_filters(&mut data, &[Filter::new("c_amount", "<", "15")], &amount_columns()).unwrap();
    assert_eq!(codes(&data), vec!["a"]);
}

#[test]
fn numeric_text_compares_as_numbers() {
    let mut data = rows(&[("a", "9"), ("b", "150.5")]);
    apply_filters(&mut data, &[Filter::new("c_amount", ">", "15")], &amount_columns()).unwrap();
    assert_eq!(codes(&data), vec!["b"]);
}

#[test]
fn dates_compare_chronologically() {
    let mut data = rows(&[("a", "2024-01-31"), ("b", "2024-03-01")]);
    apply_filters(
        &mut data,
        &[Filter::new("c_amount", ">", "15/02/2024")],
        &amount_columns(),
    )
    .unwrap();
    assert_eq!(codes(&data), vec!["b"]);
}

#[test]
fn text_compares_lexically() {
    let mut data = rows(&[("apple", "1"), ("pear", "2")]);
    apply_filters(&mut data, &[Filter::new("c_code", "<", "banana")], &amount_columns()).unwrap();
    assert_eq!(codes(&data), vec!["apple"]);
}

#[test]
fn contains_removes_cells_found_inside_the_filter_value() {
    let mut data = rows(&[("A", "1"), ("X", "2"), ("BC", "3")]);
    apply_filters(&mut data, &[Filter::new("c_code", "contains", "ABC")], &amount_columns())
        .unwrap();
    assert_eq!(codes(&data), vec!["X"]);
}

#[test]
fn unknown_columns_and_conditions_are_ignored() {
    let mut data = rows(&[("a", "10"), ("b", "20")]);
    let filters = [
        Filter::new("no_such_key", ">", "15"),
        Filter::new("c_amount", "=", "10"),
        Filter::new("c_hidden", ">", "15"),
    ];
    apply_filters(&mut data, &filters, &amount_columns()).unwrap();
    assert_eq!(codes(&data), vec!["a", "b"]);
}

#[test]
fn filters_apply_in_sequence() {
    let mut data = rows(&[("a", "10"), ("b", "20"), ("c", "30"), ("d", "40")]);
    let filters = [
        Filter::new("c_amount", ">", "15"),
        Filter::new("c_amount", "<", "35"),
    ];
    apply_filters(&mut data, &filters, &amount_columns()).unwrap();
    assert_eq!(codes(&data), vec!["b", "c"]);
}

#[test]
fn no_filters_means_no_change() {
    let mut data = rows(&[("a", "10")]);
    apply_filters(&mut data, &[], &amount_columns()).unwrap();
    assert_eq!(codes(&data), vec!["a"]);
}

#[test]
fn incomparable_values_fail_with_row_and_column() {
    let mut data = rows(&[("a", "10"), ("b", "n/a")]);
    let err = apply_filters(&mut data, &[Filter::new("c_amount", ">", "5")], &amount_columns())
        .unwrap_err();
    match err {
        ReportError::FilterType { row, column, .. } => {
            assert_eq!(row, 1);
            assert_eq!(column, "c_amount");
        }
        other => panic!("Expected filter type error, got {other:?}"),
    }
}

proptest::proptest! {
    #[test]
    fn greater_than_keeps_exactly_the_larger_amounts_in_order(
        amounts in proptest::collection::vec(-1_000i64..1_000, 0..40),
        threshold in -1_000i64..1_000,
    ) {
        let amounts: Vec<String> = amounts.iter().map(i64::to_string).collect();
        let pairs: Vec<(&str, &str)> = amounts.iter().map(|a| ("x", a.as_str())).collect();
        let mut data = rows(&pairs);
        let threshold = threshold.to_string();
        apply_filters(
            &mut data,
            &[Filter::new("c_amount", ">", threshold.as_str())],
            &amount_columns(),
        )
        .unwrap();

        let limit: i64 = threshold.parse().unwrap();
        let expected: Vec<&str> = amounts
            .iter()
            .filter(|a| a.parse::<i64>().unwrap() > limit)
            .map(String::as_str)
            .collect();
        let kept: Vec<&str> = data.iter().filter_map(|row| row.get("Amount")).collect();
        proptest::prop_assert_eq!(kept, expected);
    }
}
