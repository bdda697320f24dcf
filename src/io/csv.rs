//! Delimited-text ingestion and export.
//!
//! `read_table` parses a delimited file into a typed table: column types
//! come from an optional format-specifier string or are autodetected by
//! sampling, an optional column is promoted to the row index, and rows
//! shorter than the header are padded with empty fields instead of being
//! rejected. `write_table` emits raw values so a written table reads
//! back equal (modulo format rounding).
//!
//! The per-column format specifier string is a sequence of
//! `%<repeat>{<spec>}` items where spec is `C` or `s` (string), `i`
//! (int), `f` (float), `d` (double), `B` (boolean), or a chrono date
//! pattern such as `%Y-%m-%d`. A repeat count applies the spec to that
//! many consecutive columns.

use std::fs::File;
use std::path::Path;

use csv::{ReaderBuilder, WriterBuilder};
use lazy_static::lazy_static;
use regex::Regex;

use crate::array::Array;
use crate::dataframe::DataFrame;
use crate::error::{Error, Result};
use crate::index::{Index, Label, LabelKind};
use crate::value::{DataType, Value};

lazy_static! {
    static ref FORMAT_SPEC: Regex =
        Regex::new(r"%(\d*)\{([^{}]+)\}").expect("format spec pattern is valid");
}

/// How many leading rows to sample when autodetecting a column's type
const DETECT_SAMPLE: usize = 32;

/// Options controlling `read_table`
#[derive(Debug, Clone)]
pub struct ReadOptions {
    /// Field separator byte
    pub delimiter: u8,
    /// Whether the first line names the columns
    pub has_header: bool,
    /// Column to promote to the row index, by name
    pub index_column: Option<String>,
    /// Explicit index label kind; `None` autodetects from the data
    pub index_kind: Option<LabelKind>,
    /// Per-column format specifier string; `None` autodetects every type
    pub formats: Option<String>,
    /// Keep only these columns, in this order
    pub select: Option<Vec<String>>,
    /// Trailing rows to discard (summary footers and the like)
    pub skip_footer: usize,
}

impl Default for ReadOptions {
    fn default() -> Self {
        ReadOptions {
            delimiter: b',',
            has_header: true,
            index_column: None,
            index_kind: None,
            formats: None,
            select: None,
            skip_footer: 0,
        }
    }
}

/// One parsed `%{...}` item: a target type plus an optional chrono
/// pattern for datetime columns
#[derive(Debug, Clone, PartialEq)]
struct ColumnFormat {
    dtype: DataType,
    pattern: Option<String>,
}

/// Expand a format specifier string into one entry per column
fn parse_formats(spec: &str) -> Result<Vec<ColumnFormat>> {
    let mut out = Vec::new();
    let mut consumed = 0;
    for caps in FORMAT_SPEC.captures_iter(spec) {
        let whole = match caps.get(0) {
            Some(m) => m,
            None => continue,
        };
        // Anything between items is garbage in the spec string
        if spec[consumed..whole.start()].trim() != "" {
            return Err(Error::Format(format!(
                "unrecognized text in format spec: '{}'",
                &spec[consumed..whole.start()]
            )));
        }
        consumed = whole.end();
        let repeat: usize = match caps.get(1).map(|m| m.as_str()) {
            Some("") | None => 1,
            Some(digits) => digits
                .parse()
                .map_err(|_| Error::Format(format!("bad repeat count in '{}'", whole.as_str())))?,
        };
        let body = caps
            .get(2)
            .map(|m| m.as_str())
            .ok_or_else(|| Error::Format(format!("empty format item '{}'", whole.as_str())))?;
        let format = match body {
            "C" | "s" => ColumnFormat {
                dtype: DataType::Utf8,
                pattern: None,
            },
            "i" => ColumnFormat {
                dtype: DataType::Int64,
                pattern: None,
            },
            "f" => ColumnFormat {
                dtype: DataType::Float32,
                pattern: None,
            },
            "d" => ColumnFormat {
                dtype: DataType::Float64,
                pattern: None,
            },
            "B" => ColumnFormat {
                dtype: DataType::Boolean,
                pattern: None,
            },
            pattern => ColumnFormat {
                dtype: DataType::DateTime,
                pattern: Some(pattern.to_string()),
            },
        };
        for _ in 0..repeat {
            out.push(format.clone());
        }
    }
    if spec[consumed..].trim() != "" {
        return Err(Error::Format(format!(
            "unrecognized text in format spec: '{}'",
            &spec[consumed..]
        )));
    }
    if out.is_empty() {
        return Err(Error::Format(format!("no format items in '{}'", spec)));
    }
    Ok(out)
}

/// Pick a column type by trying to parse a sample of its values,
/// narrowest first
fn detect_dtype(cells: &[String]) -> DataType {
    let sample: Vec<&str> = cells
        .iter()
        .map(|c| c.trim())
        .filter(|c| !c.is_empty())
        .take(DETECT_SAMPLE)
        .collect();
    if sample.is_empty() {
        return DataType::Utf8;
    }
    for dtype in [
        DataType::Int64,
        DataType::Float64,
        DataType::Boolean,
        DataType::DateTime,
    ] {
        if sample.iter().all(|c| Value::parse(dtype, c).is_ok()) {
            return dtype;
        }
    }
    DataType::Utf8
}

/// Parse one cell against a column format
fn parse_cell(format: &ColumnFormat, raw: &str) -> Result<Value> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(Value::Null);
    }
    match &format.pattern {
        Some(pattern) => Value::parse_datetime_with(trimmed, pattern)
            .map(Value::DateTime)
            .ok_or_else(|| Error::Conversion {
                value: trimmed.to_string(),
                target: DataType::DateTime,
            }),
        None => Value::parse(format.dtype, trimmed),
    }
}

/// Read a delimited text file into a table
pub fn read_table<P: AsRef<Path>>(path: P, options: &ReadOptions) -> Result<DataFrame> {
    let file = File::open(path.as_ref())?;
    let mut reader = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(options.has_header)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file);

    // Header row, or generated names when the file has none
    let headers: Vec<String> = if options.has_header {
        reader
            .headers()?
            .iter()
            .enumerate()
            .map(|(i, h)| if i == 0 { strip_bom(h) } else { h.to_string() })
            .collect()
    } else {
        let probe = reader.records().next();
        match probe {
            Some(first) => {
                let first = first?;
                let names: Vec<String> = (0..first.len()).map(|i| format!("column_{}", i)).collect();
                // Reopen so the probed row is not lost
                let file = File::open(path.as_ref())?;
                reader = ReaderBuilder::new()
                    .delimiter(options.delimiter)
                    .has_headers(false)
                    .flexible(true)
                    .trim(csv::Trim::All)
                    .from_reader(file);
                names
            }
            None => return DataFrame::from_pairs(Vec::new()),
        }
    };

    // Collect rows, padding short ones to the header width
    let mut rows: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        let mut row: Vec<String> = record
            .iter()
            .enumerate()
            .map(|(i, field)| {
                if i == 0 && !options.has_header && rows.is_empty() {
                    strip_bom(field)
                } else {
                    field.to_string()
                }
            })
            .collect();
        if row.len() < headers.len() {
            log::warn!(
                "row {} has {} fields, expected {}; padding with empty fields",
                rows.len(),
                row.len(),
                headers.len()
            );
            row.resize(headers.len(), String::new());
        }
        rows.push(row);
    }
    rows.truncate(rows.len().saturating_sub(options.skip_footer));

    // Column formats: explicit specifiers or per-column autodetection
    let formats: Vec<ColumnFormat> = match &options.formats {
        Some(spec) => {
            let parsed = parse_formats(spec)?;
            if parsed.len() != headers.len() {
                return Err(Error::Format(format!(
                    "format spec covers {} columns but the file has {}",
                    parsed.len(),
                    headers.len()
                )));
            }
            parsed
        }
        None => (0..headers.len())
            .map(|c| {
                let cells: Vec<String> = rows.iter().map(|r| r[c].clone()).collect();
                ColumnFormat {
                    dtype: detect_dtype(&cells),
                    pattern: None,
                }
            })
            .collect(),
    };

    // Parse each column into a typed array
    let mut pairs: Vec<(String, Array)> = Vec::with_capacity(headers.len());
    for (c, name) in headers.iter().enumerate() {
        let values: Vec<Value> = rows
            .iter()
            .map(|r| parse_cell(&formats[c], &r[c]))
            .collect::<Result<_>>()?;
        pairs.push((name.clone(), Array::from_values(formats[c].dtype, &values)?));
    }
    let mut table = DataFrame::from_pairs(pairs)?;

    // Promote the designated column to the row index
    if let Some(index_name) = &options.index_column {
        table = promote_index(table, index_name, options.index_kind)?;
    }
    if let Some(select) = &options.select {
        let names: Vec<&str> = select.iter().map(String::as_str).collect();
        table = table.retain(&names)?;
    }
    table.update_column_formats()?;
    Ok(table)
}

fn strip_bom(field: &str) -> String {
    field.trim_start_matches('\u{feff}').to_string()
}

/// Move one column out of the table and into the row index
fn promote_index(table: DataFrame, name: &str, kind: Option<LabelKind>) -> Result<DataFrame> {
    let series = table.column(name)?;
    let kind = kind.unwrap_or(match series.dtype() {
        DataType::Int64 => LabelKind::Int64,
        DataType::DateTime => LabelKind::DateTime,
        _ => LabelKind::Utf8,
    });
    let labels: Vec<Label> = series
        .values()
        .iter_values()
        .map(|v| label_for(&v, kind))
        .collect::<Result<_>>()?;
    let mut index = Index::new(labels)?;
    index.set_name(Some(name.to_string()));
    let mut table = table.drop(&[name])?;
    table.set_index(index)?;
    Ok(table)
}

fn label_for(value: &Value, kind: LabelKind) -> Result<Label> {
    let text = value.to_string();
    let fail = || Error::Conversion {
        value: text.clone(),
        target: match kind {
            LabelKind::Int64 => DataType::Int64,
            LabelKind::DateTime => DataType::DateTime,
            LabelKind::Utf8 => DataType::Utf8,
        },
    };
    match kind {
        LabelKind::Int64 => match value {
            Value::Int64(v) => Ok(Label::Int64(*v)),
            _ => text.trim().parse().map(Label::Int64).map_err(|_| fail()),
        },
        LabelKind::DateTime => match value {
            Value::DateTime(v) => Ok(Label::DateTime(*v)),
            _ => Value::parse_datetime(text.trim())
                .map(Label::DateTime)
                .ok_or_else(fail),
        },
        LabelKind::Utf8 => Ok(Label::Utf8(text)),
    }
}

/// Write a table as delimited text.
///
/// The row index becomes the first column; missing values write as
/// empty fields so they read back as `Null`.
pub fn write_table<P: AsRef<Path>>(table: &DataFrame, path: P, delimiter: u8) -> Result<()> {
    let file = File::create(path.as_ref())?;
    let mut writer = WriterBuilder::new().delimiter(delimiter).from_writer(file);

    let mut header = vec![table
        .index()
        .name()
        .unwrap_or_default()
        .to_string()];
    header.extend(table.column_names());
    writer.write_record(&header)?;

    for row in 0..table.row_count() {
        let mut record = Vec::with_capacity(table.column_count() + 1);
        match table.index().get(row) {
            Some(label) => record.push(label.to_string()),
            None => record.push(String::new()),
        }
        for col in 0..table.column_count() {
            let value = table.get_value(row, col).unwrap_or(Value::Null);
            if value.is_missing() {
                record.push(String::new());
            } else {
                record.push(value.to_string());
            }
        }
        writer.write_record(&record)?;
    }
    writer.flush()?;
    Ok(())
}
