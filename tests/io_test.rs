use std::fs;

use tabrs::{
    read_table, write_table, Array, DataFrame, DataType, Index, Label, LabelKind, ReadOptions,
    Value,
};

use tempfile::tempdir;

#[test]
fn test_read_basic_csv_with_autodetect() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("basic.csv");
    fs::write(&path, "name,score,active\nalpha,1.5,true\nbravo,2.0,false\n").unwrap();

    let df = read_table(&path, &ReadOptions::default()).unwrap();
    assert_eq!(df.column_names(), vec!["name", "score", "active"]);
    assert_eq!(
        df.dtypes(),
        vec![DataType::Utf8, DataType::Float64, DataType::Boolean]
    );
    assert_eq!(df.get_value(0, 1), Some(Value::Float64(1.5)));
    assert_eq!(df.get_value(1, 2), Some(Value::Bool(false)));
}

#[test]
fn test_read_without_header() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bare.csv");
    fs::write(&path, "1,2\n3,4\n").unwrap();

    let options = ReadOptions {
        has_header: false,
        ..ReadOptions::default()
    };
    let df = read_table(&path, &options).unwrap();
    assert_eq!(df.column_names(), vec!["column_0", "column_1"]);
    assert_eq!(df.row_count(), 2);
    assert_eq!(df.get_value(1, 0), Some(Value::Int64(3)));
}

#[test]
fn test_short_rows_pad_to_missing() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("short.csv");
    fs::write(&path, "name,value\nalpha,1\nbravo\ncharlie,3\n").unwrap();

    let df = read_table(&path, &ReadOptions::default()).unwrap();
    assert_eq!(df.row_count(), 3);
    // The padded numeric cell promotes the column so it can hold NaN
    assert_eq!(df.dtypes()[1], DataType::Float64);
    assert!(df.get_value(1, 1).unwrap().is_missing());
    assert_eq!(df.get_value(2, 1), Some(Value::Float64(3.0)));
}

#[test]
fn test_bom_is_stripped() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bom.csv");
    fs::write(&path, "\u{feff}name,value\nalpha,1\n").unwrap();

    let df = read_table(&path, &ReadOptions::default()).unwrap();
    assert_eq!(df.column_names(), vec!["name", "value"]);
}

#[test]
fn test_skip_footer() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("footer.csv");
    fs::write(&path, "name,value\nalpha,1\nbravo,2\ntotal,3\n").unwrap();

    let options = ReadOptions {
        skip_footer: 1,
        ..ReadOptions::default()
    };
    let df = read_table(&path, &options).unwrap();
    assert_eq!(df.row_count(), 2);
}

#[test]
fn test_index_column_promotion() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("indexed.csv");
    fs::write(&path, "id,value\n10,1\n20,2\n").unwrap();

    let options = ReadOptions {
        index_column: Some("id".to_string()),
        ..ReadOptions::default()
    };
    let df = read_table(&path, &options).unwrap();
    assert_eq!(df.column_names(), vec!["value"]);
    assert_eq!(df.index().kind(), LabelKind::Int64);
    assert_eq!(df.index().name(), Some("id"));
    assert_eq!(
        df.get_value_at(&Label::from(20), "value").unwrap(),
        Value::Int64(2)
    );
}

#[test]
fn test_datetime_index_autodetected() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("dated.csv");
    fs::write(&path, "day,value\n2024-01-01,1\n2024-01-02,2\n").unwrap();

    let options = ReadOptions {
        index_column: Some("day".to_string()),
        ..ReadOptions::default()
    };
    let df = read_table(&path, &options).unwrap();
    assert_eq!(df.index().kind(), LabelKind::DateTime);
}

#[test]
fn test_explicit_format_specifiers() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("typed.csv");
    fs::write(&path, "name,a,b,day\nx,1,2,2024-01-05\n").unwrap();

    let options = ReadOptions {
        formats: Some("%{s}%2{d}%{%Y-%m-%d}".to_string()),
        ..ReadOptions::default()
    };
    let df = read_table(&path, &options).unwrap();
    assert_eq!(
        df.dtypes(),
        vec![
            DataType::Utf8,
            DataType::Float64,
            DataType::Float64,
            DataType::DateTime
        ]
    );
    assert_eq!(df.get_value(0, 1), Some(Value::Float64(1.0)));
}

#[test]
fn test_format_specifier_count_mismatch() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("mismatch.csv");
    fs::write(&path, "a,b\n1,2\n").unwrap();

    let options = ReadOptions {
        formats: Some("%{i}".to_string()),
        ..ReadOptions::default()
    };
    assert!(read_table(&path, &options).is_err());
}

#[test]
fn test_unparseable_cell_is_conversion_error() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("bad.csv");
    fs::write(&path, "a\nnot_a_number\n").unwrap();

    let options = ReadOptions {
        formats: Some("%{i}".to_string()),
        ..ReadOptions::default()
    };
    assert!(read_table(&path, &options).is_err());
}

#[test]
fn test_column_subsetting() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("subset.csv");
    fs::write(&path, "a,b,c\n1,2,3\n").unwrap();

    let options = ReadOptions {
        select: Some(vec!["c".to_string(), "a".to_string()]),
        ..ReadOptions::default()
    };
    let df = read_table(&path, &options).unwrap();
    assert_eq!(df.column_names(), vec!["c", "a"]);
}

#[test]
fn test_round_trip() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("round.csv");

    let mut df = DataFrame::from_pairs(vec![
        (
            "name".to_string(),
            Array::Utf8(vec!["alpha".to_string(), "bravo".to_string()]),
        ),
        ("score".to_string(), Array::Float64(vec![1.5, 2.25])),
        ("count".to_string(), Array::Int64(vec![3, 4])),
    ])
    .unwrap();
    let index = Index::with_name(vec![Label::from(100), Label::from(200)], "id").unwrap();
    df.set_index(index).unwrap();

    write_table(&df, &path, b',').unwrap();
    let options = ReadOptions {
        index_column: Some("id".to_string()),
        ..ReadOptions::default()
    };
    let back = read_table(&path, &options).unwrap();
    assert_eq!(back, df);
}

#[test]
fn test_round_trip_missing_values() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("missing.csv");

    let df = DataFrame::from_pairs(vec![(
        "v".to_string(),
        Array::Float64(vec![1.0, f64::NAN]),
    )])
    .unwrap();
    write_table(&df, &path, b',').unwrap();

    let options = ReadOptions {
        index_column: Some("".to_string()),
        ..ReadOptions::default()
    };
    let back = read_table(&path, &options).unwrap();
    assert!(back.get_value(1, 0).unwrap().is_missing());
    assert_eq!(back.get_value(0, 0), Some(Value::Float64(1.0)));
}

#[test]
fn test_custom_delimiter() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("tabs.tsv");
    fs::write(&path, "a\tb\n1\t2\n").unwrap();

    let options = ReadOptions {
        delimiter: b'\t',
        ..ReadOptions::default()
    };
    let df = read_table(&path, &options).unwrap();
    assert_eq!(df.column_names(), vec!["a", "b"]);
    assert_eq!(df.get_value(0, 1), Some(Value::Int64(2)));
}
