//! Typed one-dimensional arrays.
//!
//! `Array` is the single physical container used everywhere data is held:
//! Series values, per-column storage, and the flat buffer of a packed 2-D
//! block. One variant per `DataType` keeps conversions exhaustive.

use chrono::NaiveDateTime;

use crate::error::{Error, Result};
use crate::value::{DataType, Value};

/// A homogeneous typed array
#[derive(Debug, Clone, PartialEq)]
pub enum Array {
    Int64(Vec<i64>),
    Float32(Vec<f32>),
    Float64(Vec<f64>),
    Boolean(Vec<bool>),
    Utf8(Vec<String>),
    DateTime(Vec<NaiveDateTime>),
}

impl Array {
    /// Create an empty array of the given type
    pub fn new(dtype: DataType) -> Self {
        Self::with_capacity(dtype, 0)
    }

    /// Create an empty array with reserved capacity
    pub fn with_capacity(dtype: DataType, capacity: usize) -> Self {
        match dtype {
            DataType::Int64 => Array::Int64(Vec::with_capacity(capacity)),
            DataType::Float32 => Array::Float32(Vec::with_capacity(capacity)),
            DataType::Float64 => Array::Float64(Vec::with_capacity(capacity)),
            DataType::Boolean => Array::Boolean(Vec::with_capacity(capacity)),
            DataType::Utf8 => Array::Utf8(Vec::with_capacity(capacity)),
            DataType::DateTime => Array::DateTime(Vec::with_capacity(capacity)),
        }
    }

    /// Build an array of the requested type from scalar values.
    ///
    /// Missing values become the type's fill value; an `Int64` request
    /// containing missing values is promoted to `Float64` so the misses
    /// can be represented as NaN.
    pub fn from_values(dtype: DataType, values: &[Value]) -> Result<Array> {
        let target = if dtype == DataType::Int64 && values.iter().any(Value::is_missing) {
            DataType::Float64
        } else {
            dtype
        };
        let mut out = Array::with_capacity(target, values.len());
        for v in values {
            out.push(v)?;
        }
        Ok(out)
    }

    /// The element type of the array
    pub fn dtype(&self) -> DataType {
        match self {
            Array::Int64(_) => DataType::Int64,
            Array::Float32(_) => DataType::Float32,
            Array::Float64(_) => DataType::Float64,
            Array::Boolean(_) => DataType::Boolean,
            Array::Utf8(_) => DataType::Utf8,
            Array::DateTime(_) => DataType::DateTime,
        }
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        match self {
            Array::Int64(v) => v.len(),
            Array::Float32(v) => v.len(),
            Array::Float64(v) => v.len(),
            Array::Boolean(v) => v.len(),
            Array::Utf8(v) => v.len(),
            Array::DateTime(v) => v.len(),
        }
    }

    /// Check if the array is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The fill value used when a lookup misses for this element type.
    ///
    /// NaN for floats; other types fall back to a format-driven default.
    /// `Int64` has no in-band missing representation, so callers that may
    /// need a fill promote through `take_or_missing` instead.
    pub fn missing_value(dtype: DataType) -> Value {
        match dtype {
            DataType::Int64 | DataType::Float64 => Value::Float64(f64::NAN),
            DataType::Float32 => Value::Float32(f32::NAN),
            DataType::Boolean => Value::Bool(false),
            DataType::Utf8 => Value::Utf8(String::new()),
            DataType::DateTime => Value::DateTime(chrono::DateTime::UNIX_EPOCH.naive_utc()),
        }
    }

    /// Get the value at a position
    pub fn get(&self, pos: usize) -> Option<Value> {
        match self {
            Array::Int64(v) => v.get(pos).map(|x| Value::Int64(*x)),
            Array::Float32(v) => v.get(pos).map(|x| Value::Float32(*x)),
            Array::Float64(v) => v.get(pos).map(|x| Value::Float64(*x)),
            Array::Boolean(v) => v.get(pos).map(|x| Value::Bool(*x)),
            Array::Utf8(v) => v.get(pos).map(|x| Value::Utf8(x.clone())),
            Array::DateTime(v) => v.get(pos).map(|x| Value::DateTime(*x)),
        }
    }

    /// Overwrite the value at a position
    pub fn set(&mut self, pos: usize, value: &Value) -> Result<()> {
        if pos >= self.len() {
            return Err(Error::IndexOutOfBounds {
                index: pos,
                size: self.len(),
            });
        }
        let coerced = self.coerce(value)?;
        match (self, coerced) {
            (Array::Int64(v), Value::Int64(x)) => v[pos] = x,
            (Array::Float32(v), Value::Float32(x)) => v[pos] = x,
            (Array::Float64(v), Value::Float64(x)) => v[pos] = x,
            (Array::Boolean(v), Value::Bool(x)) => v[pos] = x,
            (Array::Utf8(v), Value::Utf8(x)) => v[pos] = x,
            (Array::DateTime(v), Value::DateTime(x)) => v[pos] = x,
            _ => unreachable!("coerce returned a matching variant"),
        }
        Ok(())
    }

    /// Check that a value could be stored here without storing it.
    /// Row mutators validate a whole row up front so a rejected value
    /// leaves nothing half-written.
    pub(crate) fn check_value(&self, value: &Value) -> Result<()> {
        self.coerce(value).map(|_| ())
    }

    /// Append a value
    pub fn push(&mut self, value: &Value) -> Result<()> {
        let coerced = self.coerce(value)?;
        match (self, coerced) {
            (Array::Int64(v), Value::Int64(x)) => v.push(x),
            (Array::Float32(v), Value::Float32(x)) => v.push(x),
            (Array::Float64(v), Value::Float64(x)) => v.push(x),
            (Array::Boolean(v), Value::Bool(x)) => v.push(x),
            (Array::Utf8(v), Value::Utf8(x)) => v.push(x),
            (Array::DateTime(v), Value::DateTime(x)) => v.push(x),
            _ => unreachable!("coerce returned a matching variant"),
        }
        Ok(())
    }

    /// Coerce a scalar to this array's element type.
    ///
    /// Integers widen into float arrays and `Float32` widens into
    /// `Float64`; missing values become the type's fill value. `Null`
    /// into an `Int64` array is a type error because it has no in-band
    /// representation there.
    fn coerce(&self, value: &Value) -> Result<Value> {
        let dtype = self.dtype();
        if value.is_missing() {
            if dtype == DataType::Int64 {
                return Err(Error::Type(
                    "cannot store a missing value in an int64 array".to_string(),
                ));
            }
            return Ok(Array::missing_value(dtype));
        }
        match (dtype, value) {
            (DataType::Int64, Value::Int64(_))
            | (DataType::Float32, Value::Float32(_))
            | (DataType::Float64, Value::Float64(_))
            | (DataType::Boolean, Value::Bool(_))
            | (DataType::Utf8, Value::Utf8(_))
            | (DataType::DateTime, Value::DateTime(_)) => Ok(value.clone()),
            (DataType::Float32, Value::Int64(x)) => Ok(Value::Float32(*x as f32)),
            (DataType::Float64, Value::Int64(x)) => Ok(Value::Float64(*x as f64)),
            (DataType::Float64, Value::Float32(x)) => Ok(Value::Float64(*x as f64)),
            (DataType::Utf8, other) => Ok(Value::Utf8(other.to_string())),
            (_, other) => Err(Error::Type(format!(
                "cannot store {} value in {} array",
                other.dtype().map(|t| t.to_string()).unwrap_or_default(),
                dtype
            ))),
        }
    }

    /// New array containing the values at the given positions, in order
    pub fn take(&self, positions: &[usize]) -> Result<Array> {
        let mut out = Array::with_capacity(self.dtype(), positions.len());
        for &pos in positions {
            let v = self.get(pos).ok_or(Error::IndexOutOfBounds {
                index: pos,
                size: self.len(),
            })?;
            out.push(&v)?;
        }
        Ok(out)
    }

    /// Like `take`, but unresolved positions fill with the missing value.
    ///
    /// An `Int64` array with at least one miss comes back as `Float64`
    /// so the misses can be NaN.
    pub fn take_or_missing(&self, positions: &[Option<usize>]) -> Result<Array> {
        let any_missing = positions.iter().any(|p| p.is_none());
        let target = if any_missing && self.dtype() == DataType::Int64 {
            DataType::Float64
        } else {
            self.dtype()
        };
        let mut out = Array::with_capacity(target, positions.len());
        for pos in positions {
            match pos {
                Some(p) => {
                    let v = self.get(*p).ok_or(Error::IndexOutOfBounds {
                        index: *p,
                        size: self.len(),
                    })?;
                    out.push(&v)?;
                }
                None => out.push(&Array::missing_value(target))?,
            }
        }
        Ok(out)
    }

    /// Extend this array with every value of another of the same type
    pub fn extend_from(&mut self, other: &Array) -> Result<()> {
        if self.dtype() != other.dtype() {
            return Err(Error::Type(format!(
                "cannot extend {} array with {} array",
                self.dtype(),
                other.dtype()
            )));
        }
        match (self, other) {
            (Array::Int64(a), Array::Int64(b)) => a.extend_from_slice(b),
            (Array::Float32(a), Array::Float32(b)) => a.extend_from_slice(b),
            (Array::Float64(a), Array::Float64(b)) => a.extend_from_slice(b),
            (Array::Boolean(a), Array::Boolean(b)) => a.extend_from_slice(b),
            (Array::Utf8(a), Array::Utf8(b)) => a.extend_from_slice(b),
            (Array::DateTime(a), Array::DateTime(b)) => a.extend_from_slice(b),
            _ => unreachable!("dtype equality checked above"),
        }
        Ok(())
    }

    /// Cast every element to another type along the numeric ladder
    pub fn cast(&self, dtype: DataType) -> Result<Array> {
        if self.dtype() == dtype {
            return Ok(self.clone());
        }
        match (self, dtype) {
            (Array::Int64(v), DataType::Float32) => {
                Ok(Array::Float32(v.iter().map(|&x| x as f32).collect()))
            }
            (Array::Int64(v), DataType::Float64) => {
                Ok(Array::Float64(v.iter().map(|&x| x as f64).collect()))
            }
            (Array::Float32(v), DataType::Float64) => {
                Ok(Array::Float64(v.iter().map(|&x| x as f64).collect()))
            }
            _ => Err(Error::Type(format!(
                "cannot cast {} array to {}",
                self.dtype(),
                dtype
            ))),
        }
    }

    /// Iterate the elements as scalar values
    pub fn iter_values(&self) -> impl Iterator<Item = Value> + '_ {
        (0..self.len()).filter_map(move |i| self.get(i))
    }

    /// Numeric view: NaN where a float element is NaN; `None` for
    /// non-numeric arrays
    pub fn f64_values(&self) -> Option<Vec<f64>> {
        match self {
            Array::Int64(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Array::Float32(v) => Some(v.iter().map(|&x| x as f64).collect()),
            Array::Float64(v) => Some(v.clone()),
            _ => None,
        }
    }

    /// Element-wise semantic equality (NaN equals NaN)
    pub fn semantic_eq(&self, other: &Array) -> bool {
        if self.dtype() != other.dtype() || self.len() != other.len() {
            return false;
        }
        self.iter_values()
            .zip(other.iter_values())
            .all(|(a, b)| a.semantic_eq(&b))
    }
}
