use tabrs::{Array, DataFrame, DataType, Frequency, Index, Label, Value};

use chrono::NaiveDate;

fn people() -> DataFrame {
    DataFrame::from_pairs(vec![
        (
            "name".to_string(),
            Array::Utf8(vec![
                "alpha".to_string(),
                "bravo".to_string(),
                "charlie".to_string(),
            ]),
        ),
        ("value".to_string(), Array::Int64(vec![1, 2, 3])),
    ])
    .unwrap()
}

fn sales() -> DataFrame {
    DataFrame::from_pairs(vec![
        (
            "region".to_string(),
            Array::Utf8(vec![
                "east".to_string(),
                "west".to_string(),
                "east".to_string(),
                "west".to_string(),
                "east".to_string(),
            ]),
        ),
        ("amount".to_string(), Array::Int64(vec![10, 20, 30, 40, 50])),
    ])
    .unwrap()
}

#[test]
fn test_distinct_keys_are_singleton_groups() {
    let df = people();
    let grouped = df.group_by(&["name"]).unwrap();
    assert_eq!(grouped.group_count(), 3);
    // Each group is exactly its own source row
    let bravo = grouped
        .get_group(&Value::Utf8("bravo".to_string()))
        .unwrap();
    assert_eq!(bravo, df.take(&[1]).unwrap());
}

#[test]
fn test_group_partition_covers_every_row() {
    let df = sales();
    let grouped = df.group_by(&["region"]).unwrap();
    let total: usize = grouped.size().iter().map(|(_, n)| n).sum();
    assert_eq!(total, df.row_count());
    assert_eq!(grouped.group_count(), 2);
}

#[test]
fn test_sum_of_group_sums_equals_column_sum() {
    let df = sales();
    let grouped = df.group_by(&["region"]).unwrap();
    let sums = grouped.sum().unwrap();
    // Non-numeric key column is dropped from the reduction
    assert_eq!(sums.column_names(), vec!["amount"]);
    let east = sums
        .get_value_at(&Label::from("east"), "amount")
        .unwrap();
    let west = sums
        .get_value_at(&Label::from("west"), "amount")
        .unwrap();
    assert_eq!(east, Value::Int64(90));
    assert_eq!(west, Value::Int64(60));
    assert_eq!(
        df.column("amount").unwrap().sum().unwrap(),
        Value::Int64(150)
    );
}

#[test]
fn test_count_and_mean() {
    let df = sales();
    let grouped = df.group_by(&["region"]).unwrap();

    let counts = grouped.count().unwrap();
    // Count covers every column, including non-numeric ones
    assert_eq!(counts.column_names(), vec!["region", "amount"]);
    assert_eq!(
        counts.get_value_at(&Label::from("east"), "amount").unwrap(),
        Value::Int64(3)
    );

    let means = grouped.mean().unwrap();
    assert_eq!(
        means.get_value_at(&Label::from("east"), "amount").unwrap(),
        Value::Float64(30.0)
    );
}

#[test]
fn test_min_max_keep_dtype() {
    let df = sales();
    let grouped = df.group_by(&["region"]).unwrap();
    let mins = grouped.min().unwrap();
    assert_eq!(
        mins.get_value_at(&Label::from("west"), "amount").unwrap(),
        Value::Int64(20)
    );
    // Strings reduce by ordering
    assert_eq!(
        mins.get_value_at(&Label::from("east"), "region").unwrap(),
        Value::Utf8("east".to_string())
    );
    let maxs = grouped.max().unwrap();
    assert_eq!(
        maxs.get_value_at(&Label::from("east"), "amount").unwrap(),
        Value::Int64(50)
    );
}

#[test]
fn test_median() {
    let df = sales();
    let grouped = df.group_by(&["region"]).unwrap();
    let medians = grouped.median().unwrap();
    assert_eq!(
        medians
            .get_value_at(&Label::from("east"), "amount")
            .unwrap(),
        Value::Float64(30.0)
    );
    assert_eq!(
        medians
            .get_value_at(&Label::from("west"), "amount")
            .unwrap(),
        Value::Float64(30.0)
    );
}

#[test]
fn test_groups_are_memoized() {
    let df = sales();
    let grouped = df.group_by(&["region"]).unwrap();
    let first = grouped.groups().unwrap().to_vec();
    let second = grouped.groups().unwrap();
    assert_eq!(first.len(), 2);
    assert_eq!(first.len(), second.len());
    assert_eq!(first[0].0, Value::Utf8("east".to_string()));
    assert_eq!(first[0].1.row_count(), 3);
}

#[test]
fn test_get_group_unknown_key() {
    let df = sales();
    let grouped = df.group_by(&["region"]).unwrap();
    assert!(grouped
        .get_group(&Value::Utf8("north".to_string()))
        .is_err());
}

#[test]
fn test_multi_column_key() {
    let df = DataFrame::from_pairs(vec![
        (
            "a".to_string(),
            Array::Utf8(vec!["x".to_string(), "x".to_string(), "y".to_string()]),
        ),
        ("b".to_string(), Array::Int64(vec![1, 2, 1])),
        ("v".to_string(), Array::Int64(vec![10, 20, 30])),
    ])
    .unwrap();
    let grouped = df.group_by(&["a", "b"]).unwrap();
    assert_eq!(grouped.group_count(), 3);
    let group = grouped
        .get_group(&Value::Utf8("(x, 2)".to_string()))
        .unwrap();
    assert_eq!(group.get_value(0, 2), Some(Value::Int64(20)));
}

#[test]
fn test_multi_column_key_embedded_separator() {
    // Values containing the joiner must not merge distinct key pairs
    let df = DataFrame::from_pairs(vec![
        (
            "a".to_string(),
            Array::Utf8(vec!["x, y".to_string(), "x".to_string()]),
        ),
        (
            "b".to_string(),
            Array::Utf8(vec!["z".to_string(), "y, z".to_string()]),
        ),
        ("v".to_string(), Array::Int64(vec![1, 2])),
    ])
    .unwrap();
    let grouped = df.group_by(&["a", "b"]).unwrap();
    assert_eq!(grouped.group_count(), 2);
}

#[test]
fn test_numeric_reductions_without_numeric_columns() {
    let df = sales().retain(&["region"]).unwrap();
    let grouped = df.group_by(&["region"]).unwrap();
    // Nothing to reduce: the numeric-only aggregations refuse outright
    assert!(grouped.sum().is_err());
    assert!(grouped.mean().is_err());
    assert!(grouped.median().is_err());
    // Count still covers the string column
    let counts = grouped.count().unwrap();
    assert_eq!(
        counts.get_value_at(&Label::from("east"), "region").unwrap(),
        Value::Int64(3)
    );
}

#[test]
fn test_apply_custom_reduction() {
    let df = sales();
    let grouped = df.group_by(&["region"]).unwrap();
    let spans = grouped
        .apply(|group| {
            let amounts = group.column("amount")?;
            let span = match (amounts.max()?, amounts.min()?) {
                (Value::Int64(hi), Value::Int64(lo)) => hi - lo,
                _ => 0,
            };
            Ok(vec![
                group.get_value(0, 0).unwrap_or(Value::Null),
                Value::Int64(span),
            ])
        })
        .unwrap();
    assert_eq!(
        spans.get_value_at(&Label::from("east"), "amount").unwrap(),
        Value::Int64(40)
    );
    assert_eq!(
        spans.get_value_at(&Label::from("west"), "amount").unwrap(),
        Value::Int64(20)
    );
}

#[test]
fn test_group_by_fn_row_parity() {
    let df = sales();
    let grouped = df
        .group_by_fn(|frame, row| match frame.get_value(row, 1) {
            Some(Value::Int64(v)) if v >= 30 => Value::Utf8("big".to_string()),
            _ => Value::Utf8("small".to_string()),
        })
        .unwrap();
    assert_eq!(grouped.group_count(), 2);
    let big = grouped.get_group(&Value::Utf8("big".to_string())).unwrap();
    assert_eq!(big.row_count(), 3);
}

#[test]
fn test_period_grouping_buckets_and_tags() {
    // Ten daily rows starting on a Monday: one full week plus three days
    let start = NaiveDate::from_ymd_opt(2024, 1, 1)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    let index = Index::datetime_range(start, 10, Frequency::Daily);
    let mut df = DataFrame::from_pairs(vec![(
        "v".to_string(),
        Array::Int64(vec![1, 1, 1, 1, 1, 1, 1, 2, 2, 2]),
    )])
    .unwrap();
    df.set_index(index).unwrap();
    assert_eq!(df.index().period(), Some(Frequency::Daily));

    let grouped = df.group_by_period(Frequency::Weekly).unwrap();
    assert_eq!(grouped.group_count(), 2);

    let sums = grouped.sum().unwrap();
    assert_eq!(sums.row_count(), 2);
    // Output index is tagged with the resample period
    assert_eq!(sums.index().period(), Some(Frequency::Weekly));
    assert_eq!(sums.get_value(0, 0), Some(Value::Int64(7)));
    assert_eq!(sums.get_value(1, 0), Some(Value::Int64(6)));

    let second_week = NaiveDate::from_ymd_opt(2024, 1, 8)
        .unwrap()
        .and_hms_opt(0, 0, 0)
        .unwrap();
    assert_eq!(sums.index().get(1), Some(&Label::DateTime(second_week)));
}

#[test]
fn test_period_grouping_requires_datetime_index() {
    let df = sales();
    assert!(df.group_by_period(Frequency::Daily).is_err());
}

#[test]
fn test_mean_output_is_float() {
    let df = sales();
    let grouped = df.group_by(&["region"]).unwrap();
    let means = grouped.mean().unwrap();
    assert_eq!(means.dtypes(), vec![DataType::Float64]);
}
