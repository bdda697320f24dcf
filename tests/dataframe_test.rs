use tabrs::{
    Array, ColSelector, Column, ColumnIndex, DataFrame, DataType, Index, Label, Packed2D,
    RowSelector, Selection, SortOrder, Value,
};

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

fn packed_ints() -> DataFrame {
    let packed = Packed2D::from_columns(&[
        Array::Int64(vec![1, 2, 3]),
        Array::Int64(vec![10, 20, 30]),
    ])
    .unwrap();
    let columns = ColumnIndex::new(vec![
        Column::new("a", DataType::Int64),
        Column::new("b", DataType::Int64),
    ])
    .unwrap();
    DataFrame::from_packed(columns, packed, None).unwrap()
}

#[test]
fn test_creation_from_pairs() {
    let df = people();
    assert_eq!(df.row_count(), 3);
    assert_eq!(df.column_count(), 2);
    assert_eq!(df.column_names(), vec!["name", "value"]);
    assert!(!df.is_packed());
    df.validate().unwrap();
}

#[test]
fn test_duplicate_column_names_rejected() {
    let result = DataFrame::from_pairs(vec![
        ("x".to_string(), Array::Int64(vec![1])),
        ("x".to_string(), Array::Int64(vec![2])),
    ]);
    assert!(result.is_err());
}

#[test]
fn test_ragged_columns_rejected() {
    let result = DataFrame::from_pairs(vec![
        ("a".to_string(), Array::Int64(vec![1, 2])),
        ("b".to_string(), Array::Int64(vec![1, 2, 3])),
    ]);
    assert!(result.is_err());
}

#[test]
fn test_packed_construction() {
    let df = packed_ints();
    assert!(df.is_packed());
    assert_eq!(df.get_value(1, 1), Some(Value::Int64(20)));
    df.validate().unwrap();
}

#[test]
fn test_packed_insert_same_type_stays_packed() {
    let mut df = packed_ints();
    df.add_column(Column::new("c", DataType::Int64), Array::Int64(vec![7, 8, 9]))
        .unwrap();
    assert!(df.is_packed());
    assert_eq!(df.column_count(), 3);
    assert_eq!(df.get_value(0, 2), Some(Value::Int64(7)));
}

#[test]
fn test_packed_insert_float_promotes_block() {
    let mut df = packed_ints();
    df.add_column(
        Column::new("f", DataType::Float64),
        Array::Float64(vec![0.5, 1.5, 2.5]),
    )
    .unwrap();
    // The whole block widens along the numeric ladder
    assert!(df.is_packed());
    assert_eq!(
        df.dtypes(),
        vec![DataType::Float64, DataType::Float64, DataType::Float64]
    );
    assert_eq!(df.get_value(2, 0), Some(Value::Float64(3.0)));
    assert_eq!(df.get_value(2, 2), Some(Value::Float64(2.5)));
}

#[test]
fn test_packed_insert_string_falls_to_columns() {
    let mut df = packed_ints();
    df.add_column(
        Column::new("s", DataType::Utf8),
        Array::Utf8(vec!["x".to_string(), "y".to_string(), "z".to_string()]),
    )
    .unwrap();
    assert!(!df.is_packed());
    // Prior data survives the layout change
    assert_eq!(df.get_value(1, 0), Some(Value::Int64(2)));
    assert_eq!(df.get_value(1, 2), Some(Value::Utf8("y".to_string())));
}

#[test]
fn test_label_read_first_match_write_all() {
    let mut df = people();
    let index = Index::new(vec![Label::from("x"), Label::from("y"), Label::from("x")]).unwrap();
    df.set_index(index).unwrap();

    // Read resolves the first duplicate
    assert_eq!(
        df.get_value_at(&Label::from("x"), "value").unwrap(),
        Value::Int64(1)
    );
    // Write hits every duplicate
    df.set_value_at(&Label::from("x"), "value", &Value::Int64(99))
        .unwrap();
    assert_eq!(df.get_value(0, 1), Some(Value::Int64(99)));
    assert_eq!(df.get_value(2, 1), Some(Value::Int64(99)));
    assert_eq!(df.get_value(1, 1), Some(Value::Int64(2)));
}

#[test]
fn test_set_row_hits_duplicates() {
    let mut df = people();
    let index = Index::new(vec![Label::from("x"), Label::from("x"), Label::from("y")]).unwrap();
    df.set_index(index).unwrap();
    df.set_row(
        &Label::from("x"),
        &[Value::Utf8("delta".to_string()), Value::Int64(0)],
    )
    .unwrap();
    assert_eq!(df.get_value(0, 0), Some(Value::Utf8("delta".to_string())));
    assert_eq!(df.get_value(1, 0), Some(Value::Utf8("delta".to_string())));
    assert_eq!(df.get_value(2, 0), Some(Value::Utf8("charlie".to_string())));
}

#[test]
fn test_append_row_and_shape() {
    let mut df = people();
    df.append_row(
        Label::from(3),
        &[Value::Utf8("delta".to_string()), Value::Int64(4)],
    )
    .unwrap();
    assert_eq!(df.row_count(), 4);
    assert_eq!(df.index().len(), 4);
    df.validate().unwrap();
}

#[test]
fn test_rejected_append_row_leaves_table_unchanged() {
    let mut df = DataFrame::from_pairs(vec![
        ("f".to_string(), Array::Float64(vec![1.0, 2.0])),
        ("i".to_string(), Array::Int64(vec![10, 20])),
    ])
    .unwrap();
    // Null cannot land in the int64 column; the float column must not
    // keep a half-written row either
    assert!(df
        .append_row(Label::from(2), &[Value::Float64(3.0), Value::Null])
        .is_err());
    assert_eq!(df.row_count(), 2);
    assert_eq!(df.column("f").unwrap().len(), 2);
    df.validate().unwrap();

    // A well-formed row still lands afterwards
    df.append_row(Label::from(2), &[Value::Float64(3.0), Value::Int64(30)])
        .unwrap();
    assert_eq!(df.row_count(), 3);
}

#[test]
fn test_rejected_append_row_packed_block_unchanged() {
    let mut df = packed_ints();
    assert!(df
        .append_row(Label::from(3), &[Value::Int64(4), Value::Null])
        .is_err());
    assert_eq!(df.row_count(), 3);
    df.validate().unwrap();
}

#[test]
fn test_append_row_uncoercible_label_rejected_up_front() {
    let mut df = people();
    // The default index is int64; a non-numeric label cannot join it
    assert!(df
        .append_row(
            Label::from("not a number"),
            &[Value::Utf8("delta".to_string()), Value::Int64(4)],
        )
        .is_err());
    assert_eq!(df.row_count(), 3);
    df.validate().unwrap();
}

#[test]
fn test_first_append_adopts_label_kind() {
    let columns = ColumnIndex::new(vec![Column::new("v", DataType::Int64)]).unwrap();
    let mut df = DataFrame::new(columns);
    assert_eq!(df.row_count(), 0);
    df.append_row(Label::from("first"), &[Value::Int64(1)])
        .unwrap();
    assert_eq!(df.index().get(0), Some(&Label::Utf8("first".to_string())));
}

#[test]
fn test_append_table() {
    let mut df = people();
    let more = people();
    df.append(&more).unwrap();
    assert_eq!(df.row_count(), 6);
    assert_eq!(df.get_value(4, 1), Some(Value::Int64(2)));
}

#[test]
fn test_append_column_mismatch() {
    let mut df = people();
    let other = DataFrame::from_pairs(vec![("other".to_string(), Array::Int64(vec![1]))]).unwrap();
    assert!(df.append(&other).is_err());
}

#[test]
fn test_drop_and_retain() {
    let df = people();
    let only_values = df.drop(&["name"]).unwrap();
    assert_eq!(only_values.column_names(), vec!["value"]);
    assert_eq!(only_values.row_count(), 3);

    let reordered = df.retain(&["value", "name"]).unwrap();
    assert_eq!(reordered.column_names(), vec!["value", "name"]);
    assert_eq!(reordered.get_value(0, 0), Some(Value::Int64(1)));

    assert!(df.drop(&["missing"]).is_err());
}

#[test]
fn test_drop_preserves_packed_layout() {
    let df = packed_ints();
    let dropped = df.drop(&["a"]).unwrap();
    assert!(dropped.is_packed());
    assert_eq!(dropped.column_names(), vec!["b"]);
    assert_eq!(dropped.get_value(2, 0), Some(Value::Int64(30)));
}

#[test]
fn test_set_column_repacks() {
    let mut df = packed_ints();
    df.set_column("b", Array::Float64(vec![0.1, 0.2, 0.3]))
        .unwrap();
    // Both columns are numeric, so the block repacks at float64
    assert!(df.is_packed());
    assert_eq!(df.dtypes(), vec![DataType::Float64, DataType::Float64]);
}

#[test]
fn test_transpose_uniform() {
    let df = packed_ints();
    let flipped = df.transpose().unwrap();
    assert_eq!(flipped.row_count(), 2);
    assert_eq!(flipped.column_count(), 3);
    assert_eq!(flipped.get_value(1, 2), Some(Value::Int64(30)));
    // Column names become row labels and vice versa
    assert_eq!(flipped.index().get(0), Some(&Label::Utf8("a".to_string())));
    assert_eq!(flipped.column_names(), vec!["0", "1", "2"]);
}

#[test]
fn test_transpose_mixed_types_fails() {
    let df = people();
    assert!(df.transpose().is_err());
}

#[test]
fn test_select_scalar() {
    let df = people();
    let got = df
        .select(&RowSelector::Pos(2), &ColSelector::Name("value".to_string()))
        .unwrap();
    assert_eq!(got, Selection::Scalar(Value::Int64(3)));
}

#[test]
fn test_select_series() {
    let df = people();
    let got = df
        .select(
            &RowSelector::Range { start: 0, end: 3, step: 1 },
            &ColSelector::Name("value".to_string()),
        )
        .unwrap()
        .into_series()
        .unwrap();
    assert_eq!(got.name(), Some("value"));
    assert_eq!(got.values(), &Array::Int64(vec![1, 2, 3]));
}

#[test]
fn test_select_frame() {
    let df = people();
    let got = df
        .select(
            &RowSelector::Positions(vec![2, 0]),
            &ColSelector::Names(vec!["value".to_string(), "name".to_string()]),
        )
        .unwrap()
        .into_frame()
        .unwrap();
    assert_eq!(got.row_count(), 2);
    assert_eq!(got.column_names(), vec!["value", "name"]);
    assert_eq!(got.get_value(0, 0), Some(Value::Int64(3)));
}

#[test]
fn test_select_single_column_table_stays_frame() {
    let df = DataFrame::from_pairs(vec![("v".to_string(), Array::Int64(vec![1, 2]))]).unwrap();
    let got = df
        .select(
            &RowSelector::Range { start: 0, end: 2, step: 1 },
            &ColSelector::Pos(0),
        )
        .unwrap();
    assert!(matches!(got, Selection::Frame(_)));
}

#[test]
fn test_select_mask() {
    let df = people();
    let got = df
        .select(
            &RowSelector::Mask(vec![true, false, true]),
            &ColSelector::Name("name".to_string()),
        )
        .unwrap()
        .into_series()
        .unwrap();
    assert_eq!(got.len(), 2);
    assert_eq!(got.get(1), Some(Value::Utf8("charlie".to_string())));
}

#[test]
fn test_select_label_miss_fills_missing() {
    let mut df = people();
    let index = Index::new(vec![Label::from("a"), Label::from("b"), Label::from("c")]).unwrap();
    df.set_index(index).unwrap();

    // A single missed label with a single column still yields a scalar
    let got = df
        .select(
            &RowSelector::Label(Label::from("zzz")),
            &ColSelector::Name("value".to_string()),
        )
        .unwrap()
        .into_scalar()
        .unwrap();
    assert!(got.is_missing());

    // A list with one miss fills that row and echoes the label
    let got = df
        .select(
            &RowSelector::Labels(vec![Label::from("b"), Label::from("zzz")]),
            &ColSelector::Name("value".to_string()),
        )
        .unwrap()
        .into_series()
        .unwrap();
    assert_eq!(got.dtype(), DataType::Float64);
    assert_eq!(got.get(0), Some(Value::Float64(2.0)));
    assert!(got.get(1).unwrap().is_missing());
    assert_eq!(got.index().get(1), Some(&Label::Utf8("zzz".to_string())));
}

#[test]
fn test_select_out_of_bounds_position_fails() {
    let df = people();
    assert!(df
        .select(&RowSelector::Pos(10), &ColSelector::Pos(0))
        .is_err());
    assert!(df
        .select(&RowSelector::Pos(0), &ColSelector::Pos(10))
        .is_err());
}

#[test]
fn test_sort_values_stable_multi_key() {
    let df = DataFrame::from_pairs(vec![
        ("k".to_string(), Array::Int64(vec![2, 1, 2, 1])),
        ("v".to_string(), Array::Int64(vec![1, 2, 3, 4])),
    ])
    .unwrap();
    let sorted = df.sort_values(&[("k", SortOrder::Ascending)]).unwrap();
    // Ties keep their original order
    let values: Vec<Value> = (0..4).filter_map(|r| sorted.get_value(r, 1)).collect();
    assert_eq!(
        values,
        vec![
            Value::Int64(2),
            Value::Int64(4),
            Value::Int64(1),
            Value::Int64(3)
        ]
    );
    // Original labels travel with their rows
    assert_eq!(sorted.index().get(0), Some(&Label::Int64(1)));
}

#[test]
fn test_sort_missing_last_both_directions() {
    let df = DataFrame::from_pairs(vec![(
        "f".to_string(),
        Array::Float64(vec![1.0, f64::NAN, 3.0]),
    )])
    .unwrap();
    let asc = df.sort_values(&[("f", SortOrder::Ascending)]).unwrap();
    assert!(asc.get_value(2, 0).unwrap().is_missing());
    let desc = df.sort_values(&[("f", SortOrder::Descending)]).unwrap();
    assert_eq!(desc.get_value(0, 0), Some(Value::Float64(3.0)));
    assert!(desc.get_value(2, 0).unwrap().is_missing());
}

#[test]
fn test_sort_index() {
    let mut df = people();
    let index = Index::new(vec![Label::from(3), Label::from(1), Label::from(2)]).unwrap();
    df.set_index(index).unwrap();
    let sorted = df.sort_index(SortOrder::Ascending).unwrap();
    assert_eq!(sorted.index().get(0), Some(&Label::Int64(1)));
    assert_eq!(sorted.get_value(0, 0), Some(Value::Utf8("bravo".to_string())));
}

#[test]
fn test_head_tail_rendering() {
    let df = people();
    let head = df.head(2);
    assert!(head.contains("alpha"));
    assert!(head.contains("..."));
    assert!(!head.contains("charlie"));

    let tail = df.tail(1);
    assert!(tail.contains("charlie"));
    assert!(tail.contains("..."));

    let full = df.to_string();
    assert!(full.contains("alpha") && full.contains("charlie"));
    assert!(!full.contains("..."));
}
