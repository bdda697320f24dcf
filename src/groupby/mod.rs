//! Grouping and per-group reduction.
//!
//! A `Grouping` maps each distinct key to the set of row positions that
//! produced it, in first-occurrence order. `DataFrameGroupBy` and
//! `SeriesGroupBy` wrap a grouping over a borrowed source and expose the
//! standard reductions plus a pluggable `apply` escape hatch. Borrowing
//! the source for the GroupBy's lifetime is what keeps memoized groups
//! from outliving a mutation of the table they were cut from.

use std::cell::OnceCell;

use crate::array::Array;
use crate::dataframe::DataFrame;
use crate::error::{Error, Result};
use crate::index::{Index, Label};
use crate::series::Series;
use crate::temporal::Frequency;
use crate::value::{DataType, Value};

/// Key -> row-position partition of a table
///
/// Keys are held in first-occurrence order; every row belongs to exactly
/// one group. Key comparison is semantic, so NaN keys collapse into one
/// group instead of each NaN founding its own.
#[derive(Debug, Clone)]
pub struct Grouping {
    keys: Vec<Value>,
    groups: Vec<Vec<usize>>,
}

impl Grouping {
    /// Partition rows by their per-row keys
    pub fn from_keys(row_keys: Vec<Value>) -> Self {
        let mut keys: Vec<Value> = Vec::new();
        let mut groups: Vec<Vec<usize>> = Vec::new();
        for (row, key) in row_keys.into_iter().enumerate() {
            match keys.iter().position(|k| k.semantic_eq(&key)) {
                Some(g) => groups[g].push(row),
                None => {
                    keys.push(key);
                    groups.push(vec![row]);
                }
            }
        }
        Grouping { keys, groups }
    }

    /// Number of distinct keys
    pub fn len(&self) -> usize {
        self.keys.len()
    }

    /// Check if there are no groups
    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Distinct keys in first-occurrence order
    pub fn keys(&self) -> &[Value] {
        &self.keys
    }

    /// Row positions of one key's group
    pub fn positions(&self, key: &Value) -> Option<&[usize]> {
        self.keys
            .iter()
            .position(|k| k.semantic_eq(key))
            .map(|g| self.groups[g].as_slice())
    }

    /// Iterate `(key, positions)` pairs in first-occurrence order
    pub fn iter(&self) -> impl Iterator<Item = (&Value, &[usize])> {
        self.keys
            .iter()
            .zip(self.groups.iter().map(Vec::as_slice))
    }
}

/// Reductions shared by frame and series grouping
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum AggKind {
    Count,
    Sum,
    Mean,
    Min,
    Max,
    Median,
}

impl AggKind {
    /// Whether this reduction only applies to numeric columns
    fn numeric_only(&self) -> bool {
        matches!(self, AggKind::Sum | AggKind::Mean | AggKind::Median)
    }

    fn name(&self) -> &'static str {
        match self {
            AggKind::Count => "count",
            AggKind::Sum => "sum",
            AggKind::Mean => "mean",
            AggKind::Min => "min",
            AggKind::Max => "max",
            AggKind::Median => "median",
        }
    }
}

/// Turn a group key into an index label; kinds without a label
/// representation render as strings
fn label_from_value(v: &Value) -> Label {
    match v {
        Value::Int64(x) => Label::Int64(*x),
        Value::Utf8(s) => Label::Utf8(s.clone()),
        Value::DateTime(t) => Label::DateTime(*t),
        other => Label::Utf8(other.to_string()),
    }
}

/// Index over the group keys; resampled groupings tag the index with the
/// new period
fn keys_index(keys: &[Value], period: Option<Frequency>) -> Result<Index> {
    let labels: Vec<Label> = keys.iter().map(label_from_value).collect();
    let mut index = Index::new(labels)?;
    index.set_period(period);
    Ok(index)
}

/// Reduce one group of numeric values that have already been filtered of
/// missing entries
fn reduce_f64(kind: AggKind, values: &[f64]) -> f64 {
    match kind {
        AggKind::Count => values.len() as f64,
        AggKind::Sum => values.iter().sum(),
        AggKind::Mean => {
            if values.is_empty() {
                f64::NAN
            } else {
                values.iter().sum::<f64>() / values.len() as f64
            }
        }
        AggKind::Min => values.iter().copied().fold(f64::NAN, f64::min),
        AggKind::Max => values.iter().copied().fold(f64::NAN, f64::max),
        AggKind::Median => {
            if values.is_empty() {
                return f64::NAN;
            }
            let mut sorted = values.to_vec();
            sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
            let mid = sorted.len() / 2;
            if sorted.len() % 2 == 1 {
                sorted[mid]
            } else {
                (sorted[mid - 1] + sorted[mid]) / 2.0
            }
        }
    }
}

/// Grouped view over a DataFrame
#[derive(Debug)]
pub struct DataFrameGroupBy<'a> {
    source: &'a DataFrame,
    grouping: Grouping,
    /// Resample period threading through from `group_by_period`
    period: Option<Frequency>,
    /// Materialized groups, built lazily on first traversal
    cache: OnceCell<Vec<(Value, DataFrame)>>,
}

impl<'a> DataFrameGroupBy<'a> {
    pub(crate) fn new(
        source: &'a DataFrame,
        grouping: Grouping,
        period: Option<Frequency>,
    ) -> Self {
        DataFrameGroupBy {
            source,
            grouping,
            period,
            cache: OnceCell::new(),
        }
    }

    /// Number of groups
    pub fn group_count(&self) -> usize {
        self.grouping.len()
    }

    /// The underlying key partition
    pub fn grouping(&self) -> &Grouping {
        &self.grouping
    }

    /// Rows per group, in first-seen key order
    pub fn size(&self) -> Vec<(Value, usize)> {
        self.grouping
            .iter()
            .map(|(k, positions)| (k.clone(), positions.len()))
            .collect()
    }

    /// Non-missing count per column, one row per group
    pub fn count(&self) -> Result<DataFrame> {
        self.aggregate(AggKind::Count)
    }

    /// Per-group sum over numeric columns
    pub fn sum(&self) -> Result<DataFrame> {
        self.aggregate(AggKind::Sum)
    }

    /// Per-group mean over numeric columns
    pub fn mean(&self) -> Result<DataFrame> {
        self.aggregate(AggKind::Mean)
    }

    /// Per-group minimum
    pub fn min(&self) -> Result<DataFrame> {
        self.aggregate(AggKind::Min)
    }

    /// Per-group maximum
    pub fn max(&self) -> Result<DataFrame> {
        self.aggregate(AggKind::Max)
    }

    /// Per-group median over numeric columns
    pub fn median(&self) -> Result<DataFrame> {
        self.aggregate(AggKind::Median)
    }

    fn aggregate(&self, kind: AggKind) -> Result<DataFrame> {
        let mut pairs: Vec<(String, Array)> = Vec::new();
        for pos in 0..self.source.column_count() {
            let col = match self.source.columns().get(pos) {
                Some(c) => c.clone(),
                None => continue,
            };
            let data = self.source.storage().column(pos)?;
            let numeric = data.f64_values();
            if kind.numeric_only() && numeric.is_none() {
                continue;
            }
            let array = match kind {
                AggKind::Count => {
                    let counts: Vec<i64> = self
                        .grouping
                        .iter()
                        .map(|(_, positions)| {
                            positions
                                .iter()
                                .filter(|&&p| data.get(p).map_or(false, |v| !v.is_missing()))
                                .count() as i64
                        })
                        .collect();
                    Array::Int64(counts)
                }
                // Order-based reduction keeps the column's own dtype
                AggKind::Min | AggKind::Max => self.extremum_column(&data, kind)?,
                AggKind::Sum if data.dtype() == DataType::Int64 => {
                    let values = match &data {
                        Array::Int64(v) => v,
                        _ => unreachable!("dtype checked above"),
                    };
                    let sums: Vec<i64> = self
                        .grouping
                        .iter()
                        .map(|(_, positions)| positions.iter().map(|&p| values[p]).sum())
                        .collect();
                    Array::Int64(sums)
                }
                _ => {
                    let values = numeric.ok_or_else(|| {
                        Error::Type(format!("column '{}' is not numeric", col.name()))
                    })?;
                    let reduced: Vec<f64> = self
                        .grouping
                        .iter()
                        .map(|(_, positions)| {
                            let group: Vec<f64> = positions
                                .iter()
                                .map(|&p| values[p])
                                .filter(|v| !v.is_nan())
                                .collect();
                            reduce_f64(kind, &group)
                        })
                        .collect();
                    Array::Float64(reduced)
                }
            };
            pairs.push((col.name().to_string(), array));
        }
        if pairs.is_empty() && kind.numeric_only() {
            return Err(Error::Type(format!(
                "no numeric columns to {}",
                kind.name()
            )));
        }
        let mut out = DataFrame::from_pairs(pairs)?;
        out.set_index(keys_index(self.grouping.keys(), self.period)?)?;
        Ok(out)
    }

    fn extremum_column(&self, data: &Array, kind: AggKind) -> Result<Array> {
        let mut values: Vec<Value> = Vec::with_capacity(self.grouping.len());
        for (_, positions) in self.grouping.iter() {
            let mut best: Option<Value> = None;
            for &p in positions {
                let v = match data.get(p) {
                    Some(v) if !v.is_missing() => v,
                    _ => continue,
                };
                best = match best {
                    None => Some(v),
                    Some(b) => {
                        let take = match kind {
                            AggKind::Min => v.compare(&b) == std::cmp::Ordering::Less,
                            _ => v.compare(&b) == std::cmp::Ordering::Greater,
                        };
                        if take {
                            Some(v)
                        } else {
                            Some(b)
                        }
                    }
                };
            }
            values.push(best.unwrap_or(Value::Null));
        }
        Array::from_values(data.dtype(), &values)
    }

    /// Realize one group as a standalone table
    pub fn get_group(&self, key: &Value) -> Result<DataFrame> {
        let positions = self
            .grouping
            .positions(key)
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))?;
        self.source.take(positions)
    }

    /// All `(key, group)` pairs, materialized and cached on first call
    pub fn groups(&self) -> Result<&[(Value, DataFrame)]> {
        if self.cache.get().is_none() {
            let mut built = Vec::with_capacity(self.grouping.len());
            for (key, positions) in self.grouping.iter() {
                built.push((key.clone(), self.source.take(positions)?));
            }
            let _ = self.cache.set(built);
        }
        self.cache
            .get()
            .map(Vec::as_slice)
            .ok_or_else(|| Error::Consistency("group cache initialization failed".to_string()))
    }

    /// Pluggable reduction: one output row per group, produced by the
    /// caller's function, columns mirroring the source
    pub fn apply<F>(&self, f: F) -> Result<DataFrame>
    where
        F: Fn(&DataFrame) -> Result<Vec<Value>>,
    {
        let names = self.source.column_names();
        let mut rows: Vec<Vec<Value>> = Vec::with_capacity(self.grouping.len());
        for (_, positions) in self.grouping.iter() {
            let group = self.source.take(positions)?;
            let row = f(&group)?;
            if row.len() != names.len() {
                return Err(Error::LengthMismatch {
                    expected: names.len(),
                    actual: row.len(),
                });
            }
            rows.push(row);
        }
        let mut pairs: Vec<(String, Array)> = Vec::with_capacity(names.len());
        for (c, name) in names.iter().enumerate() {
            let column_values: Vec<Value> = rows.iter().map(|r| r[c].clone()).collect();
            let dtype = column_values
                .iter()
                .find_map(Value::dtype)
                .unwrap_or(DataType::Float64);
            pairs.push((name.clone(), Array::from_values(dtype, &column_values)?));
        }
        let mut out = DataFrame::from_pairs(pairs)?;
        out.set_index(keys_index(self.grouping.keys(), self.period)?)?;
        Ok(out)
    }
}

/// Grouped view over a Series
#[derive(Debug)]
pub struct SeriesGroupBy<'a> {
    source: &'a Series,
    grouping: Grouping,
    period: Option<Frequency>,
}

impl<'a> SeriesGroupBy<'a> {
    pub(crate) fn new(source: &'a Series, grouping: Grouping, period: Option<Frequency>) -> Self {
        SeriesGroupBy {
            source,
            grouping,
            period,
        }
    }

    /// Number of groups
    pub fn group_count(&self) -> usize {
        self.grouping.len()
    }

    /// The underlying key partition
    pub fn grouping(&self) -> &Grouping {
        &self.grouping
    }

    /// Non-missing count per group
    pub fn count(&self) -> Result<Series> {
        let counts: Vec<i64> = self
            .grouping
            .iter()
            .map(|(_, positions)| {
                positions
                    .iter()
                    .filter(|&&p| self.source.get(p).map_or(false, |v| !v.is_missing()))
                    .count() as i64
            })
            .collect();
        self.finish(Array::Int64(counts))
    }

    /// Per-group sum
    pub fn sum(&self) -> Result<Series> {
        self.reduce(AggKind::Sum)
    }

    /// Per-group mean
    pub fn mean(&self) -> Result<Series> {
        self.reduce(AggKind::Mean)
    }

    /// Per-group minimum
    pub fn min(&self) -> Result<Series> {
        self.reduce(AggKind::Min)
    }

    /// Per-group maximum
    pub fn max(&self) -> Result<Series> {
        self.reduce(AggKind::Max)
    }

    /// Per-group median
    pub fn median(&self) -> Result<Series> {
        self.reduce(AggKind::Median)
    }

    fn reduce(&self, kind: AggKind) -> Result<Series> {
        let values = self
            .source
            .values()
            .f64_values()
            .ok_or_else(|| Error::Type(format!("cannot reduce a {} series", self.source.dtype())))?;
        let reduced: Vec<f64> = self
            .grouping
            .iter()
            .map(|(_, positions)| {
                let group: Vec<f64> = positions
                    .iter()
                    .map(|&p| values[p])
                    .filter(|v| !v.is_nan())
                    .collect();
                reduce_f64(kind, &group)
            })
            .collect();
        // Integer sums stay integral
        if kind == AggKind::Sum && self.source.dtype() == DataType::Int64 {
            return self.finish(Array::Int64(reduced.iter().map(|&v| v as i64).collect()));
        }
        self.finish(Array::Float64(reduced))
    }

    /// Realize one group as a standalone Series
    pub fn get_group(&self, key: &Value) -> Result<Series> {
        let positions = self
            .grouping
            .positions(key)
            .ok_or_else(|| Error::KeyNotFound(key.to_string()))?;
        self.source.take(positions)
    }

    /// Pluggable reduction producing one value per group
    pub fn apply<F>(&self, f: F) -> Result<Series>
    where
        F: Fn(&Series) -> Result<Value>,
    {
        let mut values = Vec::with_capacity(self.grouping.len());
        for (_, positions) in self.grouping.iter() {
            values.push(f(&self.source.take(positions)?)?);
        }
        let dtype = values
            .iter()
            .find_map(Value::dtype)
            .unwrap_or(DataType::Float64);
        self.finish(Array::from_values(dtype, &values)?)
    }

    fn finish(&self, values: Array) -> Result<Series> {
        let index = keys_index(self.grouping.keys(), self.period)?;
        Series::with_index(values, index, self.source.name().map(String::from))
    }
}
