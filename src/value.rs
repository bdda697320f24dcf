//! Scalar values and the closed set of element types.
//!
//! Every cell in a table is one of the `Value` variants below, and every
//! column is tagged with a `DataType`. Keeping both sets closed means the
//! string-conversion and promotion rules are checked exhaustively at
//! compile time.

use std::cmp::Ordering;
use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Element type of a column or index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    Int64,
    Float32,
    Float64,
    Boolean,
    Utf8,
    DateTime,
}

impl DataType {
    /// Whether values of this type participate in numeric promotion
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int64 | DataType::Float32 | DataType::Float64)
    }

    /// Numeric promotion ladder: Int64 -> Float32 -> Float64.
    ///
    /// Returns `None` when the two types are not both numeric, in which
    /// case a packed block cannot legally hold them together.
    pub fn promote(a: DataType, b: DataType) -> Option<DataType> {
        fn rank(t: DataType) -> Option<u8> {
            match t {
                DataType::Int64 => Some(0),
                DataType::Float32 => Some(1),
                DataType::Float64 => Some(2),
                _ => None,
            }
        }
        let (ra, rb) = (rank(a)?, rank(b)?);
        Some(if ra >= rb { a } else { b })
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::Int64 => "int64",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
            DataType::Boolean => "boolean",
            DataType::Utf8 => "utf8",
            DataType::DateTime => "datetime",
        };
        write!(f, "{}", name)
    }
}

/// A single cell value
///
/// `Null` represents a missing value regardless of column type; a NaN
/// stored in a float column is also treated as missing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Value {
    Null,
    Bool(bool),
    Int64(i64),
    Float32(f32),
    Float64(f64),
    Utf8(String),
    DateTime(NaiveDateTime),
}

impl Value {
    /// The element type of this value, or `None` for `Null`
    pub fn dtype(&self) -> Option<DataType> {
        match self {
            Value::Null => None,
            Value::Bool(_) => Some(DataType::Boolean),
            Value::Int64(_) => Some(DataType::Int64),
            Value::Float32(_) => Some(DataType::Float32),
            Value::Float64(_) => Some(DataType::Float64),
            Value::Utf8(_) => Some(DataType::Utf8),
            Value::DateTime(_) => Some(DataType::DateTime),
        }
    }

    /// Check if the value is missing (Null or NaN)
    pub fn is_missing(&self) -> bool {
        match self {
            Value::Null => true,
            Value::Float32(v) => v.is_nan(),
            Value::Float64(v) => v.is_nan(),
            _ => false,
        }
    }

    /// Numeric view of the value, if it has one
    pub fn to_f64(&self) -> Option<f64> {
        match self {
            Value::Int64(v) => Some(*v as f64),
            Value::Float32(v) => Some(*v as f64),
            Value::Float64(v) => Some(*v),
            Value::Bool(v) => Some(if *v { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Equality that treats all missing values as equal to each other.
    ///
    /// Needed for group keys: NaN must land in one group, and a plain
    /// `==` on floats would never match it.
    pub fn semantic_eq(&self, other: &Value) -> bool {
        if self.is_missing() && other.is_missing() {
            return true;
        }
        match (self, other) {
            (Value::Int64(a), Value::Float64(b)) | (Value::Float64(b), Value::Int64(a)) => {
                *a as f64 == *b
            }
            (Value::Float32(a), Value::Float64(b)) | (Value::Float64(b), Value::Float32(a)) => {
                *a as f64 == *b
            }
            (Value::Int64(a), Value::Float32(b)) | (Value::Float32(b), Value::Int64(a)) => {
                *a as f32 == *b
            }
            _ => self == other,
        }
    }

    /// Total ordering used by sorting: missing values sort last, numeric
    /// values compare by magnitude across widths, other kinds compare
    /// within their own kind and by kind tag across kinds.
    pub fn compare(&self, other: &Value) -> Ordering {
        match (self.is_missing(), other.is_missing()) {
            (true, true) => return Ordering::Equal,
            (true, false) => return Ordering::Greater,
            (false, true) => return Ordering::Less,
            (false, false) => {}
        }
        if let (Some(a), Some(b)) = (self.to_f64(), other.to_f64()) {
            return a.partial_cmp(&b).unwrap_or(Ordering::Equal);
        }
        match (self, other) {
            (Value::Utf8(a), Value::Utf8(b)) => a.cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.cmp(b),
            _ => kind_rank(self).cmp(&kind_rank(other)),
        }
    }

    /// Convert a raw string to a typed value.
    ///
    /// An empty (or whitespace-only) string becomes `Null`. Anything else
    /// that does not parse as the target type is a `Conversion` error
    /// naming the offending value.
    pub fn parse(dtype: DataType, raw: &str) -> Result<Value> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Ok(Value::Null);
        }
        let conversion = || Error::Conversion {
            value: trimmed.to_string(),
            target: dtype,
        };
        match dtype {
            DataType::Int64 => trimmed
                .parse::<i64>()
                .map(Value::Int64)
                .map_err(|_| conversion()),
            DataType::Float32 => trimmed
                .parse::<f32>()
                .map(Value::Float32)
                .map_err(|_| conversion()),
            DataType::Float64 => trimmed
                .parse::<f64>()
                .map(Value::Float64)
                .map_err(|_| conversion()),
            DataType::Boolean => match trimmed.to_ascii_lowercase().as_str() {
                "true" | "t" | "1" | "yes" => Ok(Value::Bool(true)),
                "false" | "f" | "0" | "no" => Ok(Value::Bool(false)),
                _ => Err(conversion()),
            },
            DataType::Utf8 => Ok(Value::Utf8(trimmed.to_string())),
            DataType::DateTime => Value::parse_datetime(trimmed)
                .map(Value::DateTime)
                .ok_or_else(conversion),
        }
    }

    /// Parse a date or timestamp string with a specific chrono format
    pub fn parse_datetime_with(raw: &str, format: &str) -> Option<NaiveDateTime> {
        if let Ok(dt) = NaiveDateTime::parse_from_str(raw, format) {
            return Some(dt);
        }
        // A date-only format yields a NaiveDate; normalize to midnight
        NaiveDate::parse_from_str(raw, format)
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
    }

    /// Parse a date or timestamp string, trying common formats
    pub fn parse_datetime(raw: &str) -> Option<NaiveDateTime> {
        const FORMATS: [&str; 4] = [
            "%Y-%m-%d %H:%M:%S",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d %H:%M",
            "%Y-%m-%d",
        ];
        FORMATS
            .iter()
            .find_map(|f| Value::parse_datetime_with(raw, f))
    }
}

fn kind_rank(v: &Value) -> u8 {
    match v {
        Value::Null => 6,
        Value::Bool(_) => 0,
        Value::Int64(_) => 1,
        Value::Float32(_) => 2,
        Value::Float64(_) => 3,
        Value::Utf8(_) => 4,
        Value::DateTime(_) => 5,
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int64(v) => write!(f, "{}", v),
            Value::Float32(v) => write!(f, "{}", v),
            Value::Float64(v) => write!(f, "{}", v),
            Value::Utf8(v) => write!(f, "{}", v),
            Value::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Int64(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float64(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float32(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Utf8(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Utf8(v)
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}
