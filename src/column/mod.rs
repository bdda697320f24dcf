//! Column metadata: name, element type, and derived display format.
//!
//! The format is derived, never authoritative: it is recomputed from a
//! representative sample of the column's data whenever the underlying
//! values change materially (bulk load, append), and before rendering.

use chrono::{NaiveDateTime, Timelike};

use crate::array::Array;
use crate::value::{DataType, Value};

/// How many leading values are probed when picking a datetime granularity
const DATETIME_PROBE: usize = 10;

/// Maximum derived fractional precision for float columns
const MAX_PRECISION: usize = 6;

/// Per-column metadata, independent of the data itself
#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    name: String,
    dtype: DataType,
    format: Option<String>,
    format_width: usize,
    precision: usize,
}

impl Column {
    /// Create a column with a format derived from the name alone
    pub fn new(name: impl Into<String>, dtype: DataType) -> Self {
        let mut col = Column {
            name: name.into(),
            dtype,
            format: None,
            format_width: 0,
            precision: 0,
        };
        col.update_format();
        col
    }

    /// Column name
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element type
    pub fn dtype(&self) -> DataType {
        self.dtype
    }

    /// Change the element type tag (used when storage promotes)
    pub fn set_dtype(&mut self, dtype: DataType) {
        self.dtype = dtype;
    }

    /// Derived display format, if one has been computed from data
    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// Current display width; never narrower than the name
    pub fn format_width(&self) -> usize {
        self.format_width
    }

    /// Rename the column, widening the format if the new name needs it
    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
        self.format_width = self.format_width.max(self.name.len());
    }

    /// Recompute the format with no data: width comes from the name only
    pub fn update_format(&mut self) {
        self.format = None;
        self.precision = 0;
        self.format_width = self.name.len();
    }

    /// Recompute the format from the full column data
    pub fn update_format_with(&mut self, data: &Array) {
        match data {
            Array::Float32(_) | Array::Float64(_) => {
                let values = data.f64_values().unwrap_or_default();
                let (width, precision) = float_format(&values);
                self.precision = precision;
                self.format_width = width.max(self.name.len());
                self.format = Some(format!("%{}.{}f", self.format_width, precision));
            }
            Array::Int64(v) => {
                let width = v
                    .iter()
                    .map(|x| x.to_string().len())
                    .max()
                    .unwrap_or(1)
                    .max(self.name.len());
                self.precision = 0;
                self.format_width = width;
                self.format = Some(format!("%{}d", width));
            }
            Array::DateTime(v) => {
                let pattern = datetime_format(v);
                self.precision = 0;
                self.format_width = pattern_width(pattern).max(self.name.len());
                self.format = Some(pattern.to_string());
            }
            Array::Boolean(_) | Array::Utf8(_) => {
                // Missing values render as the literal "null"
                let width = data
                    .iter_values()
                    .map(|val| {
                        if val.is_missing() {
                            4
                        } else {
                            val.to_string().len()
                        }
                    })
                    .max()
                    .unwrap_or(0)
                    .max(self.name.len());
                self.precision = 0;
                self.format_width = width;
                self.format = Some(format!("%{}s", width));
            }
        }
    }

    /// Render a single value using the derived format, right-aligned
    pub fn format_value(&self, value: &Value) -> String {
        let w = self.format_width.max(1);
        if value.is_missing() {
            return format!("{:>w$}", "null", w = w);
        }
        match (self.dtype, value) {
            (DataType::Float32 | DataType::Float64, v) => match v.to_f64() {
                Some(x) => format!("{:>w$.p$}", x, w = w, p = self.precision),
                None => format!("{:>w$}", v, w = w),
            },
            (DataType::DateTime, Value::DateTime(t)) => {
                let pattern = self.format.as_deref().unwrap_or("%Y-%m-%d %H:%M:%S");
                format!("{:>w$}", t.format(pattern), w = w)
            }
            (_, v) => format!("{:>w$}", v, w = w),
        }
    }
}

/// Width and precision for a float column: precision is the largest
/// fractional digit count any value actually needs (capped), width covers
/// the integer part of the maximum magnitude plus sign and fraction.
fn float_format(values: &[f64]) -> (usize, usize) {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() {
        return (4, 0); // just "null"
    }
    let precision = finite
        .iter()
        .map(|&v| fraction_digits(v))
        .max()
        .unwrap_or(0);
    let max_abs = finite.iter().fold(0.0f64, |acc, &v| acc.max(v.abs()));
    let mut int_width = format!("{:.0}", max_abs.trunc()).len();
    if finite.iter().any(|&v| v < 0.0) {
        int_width += 1;
    }
    let width = int_width + if precision > 0 { precision + 1 } else { 0 };
    (width, precision)
}

/// Smallest number of fractional digits that round-trips the value
fn fraction_digits(v: f64) -> usize {
    for p in 0..=MAX_PRECISION {
        let scaled = v * 10f64.powi(p as i32);
        if (scaled - scaled.round()).abs() < 1e-9 * scaled.abs().max(1.0) {
            return p;
        }
    }
    MAX_PRECISION
}

/// Pick the coarsest calendar granularity that loses nothing, probing up
/// to the first few values
pub(crate) fn datetime_format(values: &[NaiveDateTime]) -> &'static str {
    let sample = &values[..values.len().min(DATETIME_PROBE)];
    if sample.is_empty() {
        return "%Y-%m-%d";
    }
    if sample
        .iter()
        .all(|t| t.hour() == 0 && t.minute() == 0 && t.second() == 0)
    {
        "%Y-%m-%d"
    } else if sample.iter().all(|t| t.minute() == 0 && t.second() == 0) {
        "%Y-%m-%d %H"
    } else if sample.iter().all(|t| t.second() == 0) {
        "%Y-%m-%d %H:%M"
    } else {
        "%Y-%m-%d %H:%M:%S"
    }
}

pub(crate) fn pattern_width(pattern: &str) -> usize {
    match pattern {
        "%Y-%m-%d" => 10,
        "%Y-%m-%d %H" => 13,
        "%Y-%m-%d %H:%M" => 16,
        _ => 19,
    }
}
