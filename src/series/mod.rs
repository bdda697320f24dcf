//! Series: a single labeled one-dimensional vector.
//!
//! A Series pairs one typed array with one row-label index and a name.
//! It mirrors the DataFrame's read, selection, and grouping operations
//! for the single-column case.

use std::fmt;

use crate::array::Array;
use crate::column::Column;
use crate::error::{Error, Result};
use crate::groupby::{Grouping, SeriesGroupBy};
use crate::index::{range_positions, Index, Label, LabelKind};
use crate::temporal::Frequency;
use crate::value::{DataType, Value};

/// Labeled homogeneous 1-D vector
#[derive(Debug, Clone)]
pub struct Series {
    index: Index,
    values: Array,
    name: Option<String>,
}

impl Series {
    /// Create a Series with a default positional index
    pub fn new(values: Array, name: Option<String>) -> Self {
        let index = Index::default_with_len(values.len());
        Series {
            index,
            values,
            name,
        }
    }

    /// Create a Series with an explicit index
    pub fn with_index(values: Array, index: Index, name: Option<String>) -> Result<Self> {
        if values.len() != index.len() {
            return Err(Error::LengthMismatch {
                expected: index.len(),
                actual: values.len(),
            });
        }
        Ok(Series {
            index,
            values,
            name,
        })
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Check if the Series is empty
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Element type
    pub fn dtype(&self) -> DataType {
        self.values.dtype()
    }

    /// Series name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set the name in place
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Set the name, returning self (builder style)
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Row labels
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Replace the index; the length must match
    pub fn set_index(&mut self, index: Index) -> Result<()> {
        if index.len() != self.values.len() {
            return Err(Error::LengthMismatch {
                expected: self.values.len(),
                actual: index.len(),
            });
        }
        self.index = index;
        Ok(())
    }

    /// Underlying array
    pub fn values(&self) -> &Array {
        &self.values
    }

    /// Value at a position
    pub fn get(&self, pos: usize) -> Option<Value> {
        self.values.get(pos)
    }

    /// Overwrite the value at a position
    pub fn set(&mut self, pos: usize, value: &Value) -> Result<()> {
        self.values.set(pos, value)
    }

    /// Value at a label (first match on duplicates)
    pub fn get_by_label(&self, label: &Label) -> Option<Value> {
        self.index.position(label).and_then(|p| self.values.get(p))
    }

    /// Reindex-style read: resolve each requested label and build a new
    /// Series over exactly those labels, filling misses with the missing
    /// value for this element type. Unmatched labels are echoed into the
    /// result's index.
    pub fn values_at(&self, labels: &[Label]) -> Result<Series> {
        let resolved = self.index.lookup(labels);
        for (pos, label) in &resolved {
            if pos.is_none() {
                log::warn!("label {} not found; filling with missing value", label);
            }
        }
        let positions: Vec<Option<usize>> = resolved.iter().map(|(p, _)| *p).collect();
        let values = self.values.take_or_missing(&positions)?;
        let mut index = Index::new(labels.to_vec())?;
        index.set_name(self.index.name().map(String::from));
        Series::with_index(values, index, self.name.clone())
    }

    /// New Series containing the rows at the given positions
    pub fn take(&self, positions: &[usize]) -> Result<Series> {
        let values = self.values.take(positions)?;
        let index = self.index.sub_index(positions)?;
        Series::with_index(values, index, self.name.clone())
    }

    /// New Series over a strided position range
    pub fn slice(&self, start: usize, end: usize, step: usize) -> Result<Series> {
        self.take(&range_positions(start, end, step, self.len())?)
    }

    /// New Series keeping rows where the mask is true
    pub fn filter(&self, mask: &[bool]) -> Result<Series> {
        if mask.len() != self.len() {
            return Err(Error::LengthMismatch {
                expected: self.len(),
                actual: mask.len(),
            });
        }
        let positions: Vec<usize> = mask
            .iter()
            .enumerate()
            .filter_map(|(i, &keep)| keep.then_some(i))
            .collect();
        self.take(&positions)
    }

    /// First `n` rows
    pub fn head(&self, n: usize) -> Result<Series> {
        self.slice(0, n.min(self.len()), 1)
    }

    /// Last `n` rows
    pub fn tail(&self, n: usize) -> Result<Series> {
        let start = self.len().saturating_sub(n);
        self.slice(start, self.len(), 1)
    }

    /// Concatenate another Series of the same type below this one
    pub fn append(&self, other: &Series) -> Result<Series> {
        let mut values = self.values.clone();
        values.extend_from(&other.values)?;
        let index = self.index.append(&other.index)?;
        Series::with_index(values, index, self.name.clone())
    }

    /// Count of non-missing elements
    pub fn count(&self) -> usize {
        self.values.iter_values().filter(|v| !v.is_missing()).count()
    }

    /// Sum of the non-missing elements; integer series stay integral
    pub fn sum(&self) -> Result<Value> {
        match &self.values {
            Array::Int64(v) => Ok(Value::Int64(v.iter().sum())),
            Array::Float32(_) | Array::Float64(_) => {
                let total: f64 = self
                    .numeric_values()?
                    .into_iter()
                    .filter(|v| !v.is_nan())
                    .sum();
                Ok(Value::Float64(total))
            }
            _ => Err(Error::Type(format!(
                "cannot sum a {} series",
                self.dtype()
            ))),
        }
    }

    /// Mean of the non-missing elements
    pub fn mean(&self) -> Result<f64> {
        let values: Vec<f64> = self
            .numeric_values()?
            .into_iter()
            .filter(|v| !v.is_nan())
            .collect();
        if values.is_empty() {
            return Err(Error::EmptySeries);
        }
        Ok(values.iter().sum::<f64>() / values.len() as f64)
    }

    /// Smallest non-missing element
    pub fn min(&self) -> Result<Value> {
        self.extremum(|ord| ord == std::cmp::Ordering::Less)
    }

    /// Largest non-missing element
    pub fn max(&self) -> Result<Value> {
        self.extremum(|ord| ord == std::cmp::Ordering::Greater)
    }

    /// Median of the non-missing elements
    pub fn median(&self) -> Result<f64> {
        let mut values: Vec<f64> = self
            .numeric_values()?
            .into_iter()
            .filter(|v| !v.is_nan())
            .collect();
        if values.is_empty() {
            return Err(Error::EmptySeries);
        }
        values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
        let mid = values.len() / 2;
        if values.len() % 2 == 1 {
            Ok(values[mid])
        } else {
            Ok((values[mid - 1] + values[mid]) / 2.0)
        }
    }

    fn numeric_values(&self) -> Result<Vec<f64>> {
        self.values
            .f64_values()
            .ok_or_else(|| Error::Type(format!("series of {} is not numeric", self.dtype())))
    }

    fn extremum<F>(&self, wins: F) -> Result<Value>
    where
        F: Fn(std::cmp::Ordering) -> bool,
    {
        let mut best: Option<Value> = None;
        for v in self.values.iter_values().filter(|v| !v.is_missing()) {
            best = match best {
                None => Some(v),
                Some(b) => {
                    if wins(v.compare(&b)) {
                        Some(v)
                    } else {
                        Some(b)
                    }
                }
            };
        }
        best.ok_or(Error::EmptySeries)
    }

    /// Group rows by a derived key
    pub fn group_by_fn<F>(&self, key_fn: F) -> Result<SeriesGroupBy<'_>>
    where
        F: Fn(&Series, usize) -> Value,
    {
        let keys: Vec<Value> = (0..self.len()).map(|i| key_fn(self, i)).collect();
        Ok(SeriesGroupBy::new(self, Grouping::from_keys(keys), None))
    }

    /// Group rows by time-period buckets of a datetime index.
    /// The frequency threads through to tag the aggregated output.
    pub fn group_by_period(&self, freq: Frequency) -> Result<SeriesGroupBy<'_>> {
        if self.index.kind() != LabelKind::DateTime {
            return Err(Error::Type(
                "period grouping requires a datetime index".to_string(),
            ));
        }
        let keys: Vec<Value> = self
            .index
            .labels()
            .iter()
            .map(|l| match l {
                Label::DateTime(t) => Value::DateTime(freq.floor(*t)),
                _ => Value::Null,
            })
            .collect();
        Ok(SeriesGroupBy::new(self, Grouping::from_keys(keys), Some(freq)))
    }
}

impl PartialEq for Series {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
            && self.index == other.index
            && self.values.semantic_eq(&other.values)
    }
}

impl fmt::Display for Series {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut column = Column::new(self.name.clone().unwrap_or_default(), self.dtype());
        column.update_format_with(&self.values);
        let mut index = self.index.clone();
        index.update_format();
        let index_width = index.display_width();
        for (i, label) in index.labels().iter().enumerate() {
            let value = self.values.get(i).unwrap_or(Value::Null);
            writeln!(
                f,
                "{} {}",
                index.format_label(label, index_width),
                column.format_value(&value)
            )?;
        }
        match &self.name {
            Some(name) => writeln!(f, "name: {}, dtype: {}", name, self.dtype()),
            None => writeln!(f, "dtype: {}", self.dtype()),
        }
    }
}
