use tabrs::{Array, Column, DataType, Value};

use chrono::NaiveDate;

#[test]
fn test_column_creation() {
    let col = Column::new("price", DataType::Float64);
    assert_eq!(col.name(), "price");
    assert_eq!(col.dtype(), DataType::Float64);
    // With no data the width comes from the name alone
    assert_eq!(col.format_width(), 5);
}

#[test]
fn test_column_rename_widens() {
    let mut col = Column::new("x", DataType::Int64);
    col.update_format_with(&Array::Int64(vec![1, 2, 3]));
    col.rename("a_long_column_name");
    assert!(col.format_width() >= "a_long_column_name".len());
}

#[test]
fn test_int_format_width() {
    let mut col = Column::new("n", DataType::Int64);
    col.update_format_with(&Array::Int64(vec![5, -12345, 99]));
    // "-12345" is the widest rendering
    assert_eq!(col.format_width(), 6);
    assert_eq!(col.format(), Some("%6d"));
}

#[test]
fn test_float_format_precision() {
    let mut col = Column::new("v", DataType::Float64);
    col.update_format_with(&Array::Float64(vec![1.5, 2.25, 10.0]));
    // Two fractional digits are needed for 2.25; width covers "10.25"
    assert_eq!(col.format(), Some("%5.2f"));
    assert_eq!(col.format_value(&Value::Float64(2.25)), " 2.25");
}

#[test]
fn test_float_precision_is_capped() {
    let mut col = Column::new("v", DataType::Float64);
    col.update_format_with(&Array::Float64(vec![0.123456789]));
    let format = col.format().unwrap().to_string();
    assert!(format.ends_with(".6f"), "got {}", format);
}

#[test]
fn test_width_never_narrower_than_name() {
    let mut col = Column::new("measurement", DataType::Int64);
    col.update_format_with(&Array::Int64(vec![1]));
    assert_eq!(col.format_width(), "measurement".len());
}

#[test]
fn test_datetime_granularity_ladder() {
    let midnight = |d: u32| {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(0, 0, 0)
            .unwrap()
    };
    let mut col = Column::new("ts", DataType::DateTime);

    // All midnight: date-only
    col.update_format_with(&Array::DateTime(vec![midnight(1), midnight(2)]));
    assert_eq!(col.format(), Some("%Y-%m-%d"));

    // One value with an hour: date+hour
    let with_hour = NaiveDate::from_ymd_opt(2024, 1, 3)
        .unwrap()
        .and_hms_opt(9, 0, 0)
        .unwrap();
    col.update_format_with(&Array::DateTime(vec![midnight(1), with_hour]));
    assert_eq!(col.format(), Some("%Y-%m-%d %H"));

    // Seconds force the full pattern
    let with_seconds = NaiveDate::from_ymd_opt(2024, 1, 3)
        .unwrap()
        .and_hms_opt(9, 30, 15)
        .unwrap();
    col.update_format_with(&Array::DateTime(vec![with_seconds]));
    assert_eq!(col.format(), Some("%Y-%m-%d %H:%M:%S"));
}

#[test]
fn test_format_value_missing() {
    let mut col = Column::new("v", DataType::Float64);
    col.update_format_with(&Array::Float64(vec![1.0, 2.0]));
    let rendered = col.format_value(&Value::Null);
    assert_eq!(rendered.trim(), "null");
}

#[test]
fn test_string_width_from_longest_value() {
    let mut col = Column::new("s", DataType::Utf8);
    col.update_format_with(&Array::Utf8(vec!["charlie".to_string(), "c".to_string()]));
    assert_eq!(col.format_width(), 7);
    assert_eq!(col.format(), Some("%7s"));
}
