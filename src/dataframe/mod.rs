//! DataFrame: the central row/column-indexed, mutable, typed table.
//!
//! Every read and write path resolves labels to positions through the
//! row `Index` and the `ColumnIndex` before touching storage. Selection,
//! grouping, sorting, and transposition all construct new tables; the
//! only in-place mutators are the `set_*`/`add_*`/`append*` family.

pub mod display;
pub mod select;
pub mod sort;
pub mod storage;

use std::mem;

use crate::array::Array;
use crate::column::Column;
use crate::error::{Error, Result};
use crate::groupby::{DataFrameGroupBy, Grouping};
use crate::index::{ColumnIndex, Index, Label, LabelKind};
use crate::series::Series;
use crate::temporal::Frequency;
use crate::value::{DataType, Value};

use storage::{Packed2D, Storage};

/// Row/column-indexed typed table
#[derive(Debug, Clone)]
pub struct DataFrame {
    index: Index,
    columns: ColumnIndex,
    storage: Storage,
}

impl DataFrame {
    /// Empty table with declared columns. The first row append allocates
    /// into the per-column arrays created here from the declared types.
    pub fn new(columns: ColumnIndex) -> Self {
        let arrays = columns.iter().map(|c| Array::new(c.dtype())).collect();
        DataFrame {
            index: Index::default_with_len(0),
            columns,
            storage: Storage::Columns(arrays),
        }
    }

    /// Build from per-column arrays in column-list layout
    pub fn from_columns(
        columns: ColumnIndex,
        arrays: Vec<Array>,
        index: Option<Index>,
    ) -> Result<Self> {
        if columns.len() != arrays.len() {
            return Err(Error::LengthMismatch {
                expected: columns.len(),
                actual: arrays.len(),
            });
        }
        let rows = arrays.first().map(Array::len).unwrap_or(0);
        for (col, arr) in columns.iter().zip(&arrays) {
            if arr.dtype() != col.dtype() {
                return Err(Error::Type(format!(
                    "column '{}' declared {} but data is {}",
                    col.name(),
                    col.dtype(),
                    arr.dtype()
                )));
            }
            if arr.len() != rows {
                return Err(Error::InconsistentRowCount {
                    expected: rows,
                    found: arr.len(),
                });
            }
        }
        let index = match index {
            Some(idx) => {
                if idx.len() != rows {
                    return Err(Error::InconsistentRowCount {
                        expected: rows,
                        found: idx.len(),
                    });
                }
                idx
            }
            None => Index::default_with_len(rows),
        };
        Ok(DataFrame {
            index,
            columns,
            storage: Storage::Columns(arrays),
        })
    }

    /// Build from a homogeneous packed 2-D block
    pub fn from_packed(columns: ColumnIndex, packed: Packed2D, index: Option<Index>) -> Result<Self> {
        if columns.len() != packed.cols() {
            return Err(Error::LengthMismatch {
                expected: columns.len(),
                actual: packed.cols(),
            });
        }
        match columns.uniform_dtype() {
            Some(t) if t == packed.dtype() => {}
            _ => {
                return Err(Error::UnsupportedLayout(format!(
                    "packed layout requires every column to be {}",
                    packed.dtype()
                )))
            }
        }
        let index = match index {
            Some(idx) => {
                if idx.len() != packed.rows() {
                    return Err(Error::InconsistentRowCount {
                        expected: packed.rows(),
                        found: idx.len(),
                    });
                }
                idx
            }
            None => Index::default_with_len(packed.rows()),
        };
        Ok(DataFrame {
            index,
            columns,
            storage: Storage::Packed(packed),
        })
    }

    /// Build from ordered `(name, array)` pairs with a default index
    pub fn from_pairs(pairs: Vec<(String, Array)>) -> Result<Self> {
        let mut columns = Vec::with_capacity(pairs.len());
        let mut arrays = Vec::with_capacity(pairs.len());
        for (name, array) in pairs {
            columns.push(Column::new(name, array.dtype()));
            arrays.push(array);
        }
        DataFrame::from_columns(ColumnIndex::new(columns)?, arrays, None)
    }

    /// Number of rows
    pub fn row_count(&self) -> usize {
        self.index.len()
    }

    /// Number of columns
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Row labels
    pub fn index(&self) -> &Index {
        &self.index
    }

    /// Column metadata
    pub fn columns(&self) -> &ColumnIndex {
        &self.columns
    }

    /// All column names, in order
    pub fn column_names(&self) -> Vec<String> {
        self.columns.names().iter().map(|s| s.to_string()).collect()
    }

    /// Element type per column, in order
    pub fn dtypes(&self) -> Vec<DataType> {
        self.columns.iter().map(Column::dtype).collect()
    }

    /// Whether the table currently uses the packed 2-D layout
    pub fn is_packed(&self) -> bool {
        matches!(self.storage, Storage::Packed(_))
    }

    pub(crate) fn storage(&self) -> &Storage {
        &self.storage
    }

    /// Cell read by position
    pub fn get_value(&self, row: usize, col: usize) -> Option<Value> {
        self.storage.get(row, col)
    }

    /// Cell read by row label (first match) and column name
    pub fn get_value_at(&self, label: &Label, name: &str) -> Result<Value> {
        let col = self
            .columns
            .position(name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))?;
        let row = self
            .index
            .position(label)
            .ok_or_else(|| Error::KeyNotFound(label.to_string()))?;
        self.storage.get(row, col).ok_or(Error::IndexOutOfBounds {
            index: row,
            size: self.row_count(),
        })
    }

    /// Cell write by position
    pub fn set_value(&mut self, row: usize, col: usize, value: &Value) -> Result<()> {
        self.storage.set(row, col, value)
    }

    /// Cell write by row label and column name. Unlike reads, which
    /// resolve duplicates to the first match, label writes hit every
    /// duplicate position.
    pub fn set_value_at(&mut self, label: &Label, name: &str, value: &Value) -> Result<()> {
        let col = self
            .columns
            .position(name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))?;
        let rows = self.index.positions(label);
        if rows.is_empty() {
            return Err(Error::KeyNotFound(label.to_string()));
        }
        for row in rows {
            self.storage.set(row, col, value)?;
        }
        Ok(())
    }

    /// Overwrite every cell of each row holding the label
    pub fn set_row(&mut self, label: &Label, values: &[Value]) -> Result<()> {
        if values.len() != self.column_count() {
            return Err(Error::LengthMismatch {
                expected: self.column_count(),
                actual: values.len(),
            });
        }
        let rows = self.index.positions(label);
        if rows.is_empty() {
            return Err(Error::KeyNotFound(label.to_string()));
        }
        for row in rows {
            for (col, value) in values.iter().enumerate() {
                self.storage.set(row, col, value)?;
            }
        }
        Ok(())
    }

    /// One row as scalar values
    pub fn row(&self, row: usize) -> Result<Vec<Value>> {
        if row >= self.row_count() {
            return Err(Error::IndexOutOfBounds {
                index: row,
                size: self.row_count(),
            });
        }
        Ok((0..self.column_count())
            .filter_map(|c| self.storage.get(row, c))
            .collect())
    }

    /// Extract a column as a Series (copies the data)
    pub fn column(&self, name: &str) -> Result<Series> {
        let pos = self
            .columns
            .position(name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))?;
        self.column_at(pos)
    }

    /// Extract the column at a position as a Series
    pub fn column_at(&self, pos: usize) -> Result<Series> {
        let col = self.columns.get(pos).ok_or(Error::IndexOutOfBounds {
            index: pos,
            size: self.column_count(),
        })?;
        let values = self.storage.column(pos)?;
        Series::with_index(values, self.index.clone(), Some(col.name().to_string()))
    }

    /// Append a column at the end
    pub fn add_column(&mut self, column: Column, values: Array) -> Result<()> {
        let at = self.column_count();
        self.insert_column(at, column, values)
    }

    /// Insert a column at a position.
    ///
    /// On the packed layout a new column of a different numeric type
    /// promotes the whole block along the ladder; a non-promotable type
    /// converts the table to column-list layout. Column order around the
    /// insertion point is preserved either way.
    pub fn insert_column(&mut self, at: usize, mut column: Column, values: Array) -> Result<()> {
        if values.len() != self.row_count() {
            return Err(Error::InconsistentRowCount {
                expected: self.row_count(),
                found: values.len(),
            });
        }
        if values.dtype() != column.dtype() {
            column.set_dtype(values.dtype());
        }
        match &mut self.storage {
            Storage::Columns(cols) => {
                if at > cols.len() {
                    return Err(Error::IndexOutOfBounds {
                        index: at,
                        size: cols.len(),
                    });
                }
                self.columns.insert(at, column)?;
                cols.insert(at, values);
            }
            Storage::Packed(packed) => {
                let block_type = packed.dtype();
                let new_type = values.dtype();
                if new_type == block_type {
                    self.columns.insert(at, column)?;
                    packed.insert_column(at, &values)?;
                } else if let Some(widened) = DataType::promote(block_type, new_type) {
                    let mut promoted = packed.cast(widened)?;
                    promoted.insert_column(at, &values.cast(widened)?)?;
                    column.set_dtype(widened);
                    self.columns.insert(at, column)?;
                    for pos in 0..self.columns.len() {
                        if let Some(c) = self.columns.get_mut(pos) {
                            c.set_dtype(widened);
                        }
                    }
                    self.storage = Storage::Packed(promoted);
                } else {
                    let mut cols = packed.to_columns()?;
                    self.columns.insert(at, column)?;
                    cols.insert(at, values);
                    self.storage = Storage::Columns(cols);
                }
            }
        }
        self.validate()
    }

    /// Replace an existing column's data, adjusting the layout if the
    /// element type changed
    pub fn set_column(&mut self, name: &str, values: Array) -> Result<()> {
        let pos = self
            .columns
            .position(name)
            .ok_or_else(|| Error::ColumnNotFound(name.to_string()))?;
        if values.len() != self.row_count() {
            return Err(Error::InconsistentRowCount {
                expected: self.row_count(),
                found: values.len(),
            });
        }
        let was_packed = self.is_packed();
        let old = mem::replace(&mut self.storage, Storage::Columns(Vec::new()));
        let mut cols = old.into_columns()?;
        cols[pos] = values;
        if let Some(col) = self.columns.get_mut(pos) {
            col.set_dtype(cols[pos].dtype());
        }
        self.storage = Storage::Columns(cols);
        if was_packed {
            self.repack()?;
        }
        self.validate()
    }

    /// Try to restore the packed layout: pack directly when the columns
    /// are uniform, promote first when they are all numeric, otherwise
    /// stay in column-list layout.
    fn repack(&mut self) -> Result<()> {
        let Storage::Columns(cols) = &self.storage else {
            return Ok(());
        };
        if cols.is_empty() {
            return Ok(());
        }
        let target = match self.columns.uniform_dtype() {
            Some(t) => Some(t),
            None if self.dtypes().iter().all(DataType::is_numeric) => self
                .dtypes()
                .into_iter()
                .try_fold(DataType::Int64, |acc, t| DataType::promote(acc, t)),
            None => None,
        };
        if let Some(t) = target {
            let casted: Vec<Array> = cols
                .iter()
                .map(|c| c.cast(t))
                .collect::<Result<_>>()?;
            for pos in 0..self.columns.len() {
                if let Some(c) = self.columns.get_mut(pos) {
                    c.set_dtype(t);
                }
            }
            self.storage = Storage::Packed(Packed2D::from_columns(&casted)?);
        }
        Ok(())
    }

    /// Replace the row index; the length must match
    pub fn set_index(&mut self, index: Index) -> Result<()> {
        if index.len() != self.row_count() {
            return Err(Error::InconsistentRowCount {
                expected: self.row_count(),
                found: index.len(),
            });
        }
        self.index = index;
        Ok(())
    }

    /// Replace the column metadata; count and element types must match
    /// the current storage
    pub fn set_columns(&mut self, columns: ColumnIndex) -> Result<()> {
        if columns.len() != self.column_count() {
            return Err(Error::LengthMismatch {
                expected: self.column_count(),
                actual: columns.len(),
            });
        }
        for (pos, col) in columns.iter().enumerate() {
            let current = self.storage.column(pos)?;
            if col.dtype() != current.dtype() {
                return Err(Error::Type(format!(
                    "column '{}' is {} but storage holds {}",
                    col.name(),
                    col.dtype(),
                    current.dtype()
                )));
            }
        }
        self.columns = columns;
        Ok(())
    }

    /// Append every row of another table with the same columns.
    ///
    /// On the packed layout this reallocates the block and copies every
    /// prior element; the column-list layout extends each array.
    pub fn append(&mut self, other: &DataFrame) -> Result<()> {
        if other.column_names() != self.column_names() || other.dtypes() != self.dtypes() {
            return Err(Error::Type(
                "appended table must have identical columns and types".to_string(),
            ));
        }
        for row in 0..other.row_count() {
            let label = other
                .index
                .get(row)
                .ok_or(Error::IndexOutOfBounds {
                    index: row,
                    size: other.row_count(),
                })?
                .clone();
            self.append_row(label, &other.row(row)?)?;
        }
        Ok(())
    }

    /// Append a single labeled row.
    ///
    /// Costs O(rows*cols) on the packed layout; callers appending many
    /// rows one at a time should prefer the column-list layout or a bulk
    /// `append`.
    pub fn append_row(&mut self, label: Label, values: &[Value]) -> Result<()> {
        if values.len() != self.column_count() {
            return Err(Error::LengthMismatch {
                expected: self.column_count(),
                actual: values.len(),
            });
        }
        // Resolve the label and check every value before touching any
        // storage, so a rejected row leaves the table unchanged
        let adopt = self.index.is_empty() && self.index.kind() != label.kind();
        let label = if adopt {
            // First append into an empty table adopts the label's kind
            label
        } else {
            let kind = self.index.kind();
            label.coerce(kind).ok_or_else(|| {
                Error::Type(format!(
                    "cannot push {:?} label onto {:?} index",
                    label.kind(),
                    kind
                ))
            })?
        };
        match &mut self.storage {
            Storage::Packed(packed) => packed.push_row(values)?,
            Storage::Columns(cols) => {
                for (col, value) in cols.iter().zip(values) {
                    col.check_value(value)?;
                }
                for (col, value) in cols.iter_mut().zip(values) {
                    col.push(value)?;
                }
            }
        }
        if adopt {
            self.index = Index::new(vec![label])?;
        } else {
            self.index.push(label)?;
        }
        self.validate()
    }

    /// New table without the named columns. Works symmetrically on both
    /// layouts.
    pub fn drop(&self, names: &[&str]) -> Result<DataFrame> {
        // Resolve first so unknown names fail before any work
        self.columns.indices(names)?;
        let keep: Vec<&str> = self
            .columns
            .names()
            .into_iter()
            .filter(|n| !names.contains(n))
            .collect();
        self.retain(&keep)
    }

    /// New table with only the named columns, in the given order
    pub fn retain(&self, names: &[&str]) -> Result<DataFrame> {
        let positions = self.columns.indices(names)?;
        Ok(DataFrame {
            index: self.index.clone(),
            columns: self.columns.sub(&positions)?,
            storage: self.storage.take_columns(&positions)?,
        })
    }

    /// New table containing the rows at the given positions
    pub fn take(&self, positions: &[usize]) -> Result<DataFrame> {
        Ok(DataFrame {
            index: self.index.sub_index(positions)?,
            columns: self.columns.clone(),
            storage: self.storage.take_rows(positions)?,
        })
    }

    /// Swap row and column roles. Requires one shared element type:
    /// packed tables transpose directly, column-list tables with a
    /// uniform type are packed first, and heterogeneous tables fail with
    /// an `UnsupportedLayout` error.
    pub fn transpose(&self) -> Result<DataFrame> {
        let packed = match &self.storage {
            Storage::Packed(p) => p.clone(),
            Storage::Columns(cols) => {
                if self.columns.uniform_dtype().is_none() {
                    return Err(Error::UnsupportedLayout(
                        "cannot transpose a table with mixed column types".to_string(),
                    ));
                }
                Packed2D::from_columns(cols)?
            }
        };
        let flipped = packed.transpose()?;
        let dtype = flipped.dtype();
        let new_index = Index::new(
            self.columns
                .names()
                .into_iter()
                .map(Label::from)
                .collect(),
        )?;
        let new_columns = ColumnIndex::new(
            self.index
                .labels()
                .iter()
                .map(|l| Column::new(l.to_string(), dtype))
                .collect(),
        )?;
        DataFrame::from_packed(new_columns, flipped, Some(new_index))
    }

    /// Group rows by the combined values of one or more columns
    pub fn group_by(&self, names: &[&str]) -> Result<DataFrameGroupBy<'_>> {
        let positions = self.columns.indices(names)?;
        let keys: Vec<Value> = (0..self.row_count())
            .map(|row| {
                if positions.len() == 1 {
                    self.storage.get(row, positions[0]).unwrap_or(Value::Null)
                } else {
                    let parts: Vec<String> = positions
                        .iter()
                        .map(|&c| {
                            let text = self
                                .storage
                                .get(row, c)
                                .unwrap_or(Value::Null)
                                .to_string();
                            // Escape the joiner so a value containing
                            // ", " cannot collide with a key boundary
                            text.replace('\\', "\\\\").replace(',', "\\,")
                        })
                        .collect();
                    Value::Utf8(format!("({})", parts.join(", ")))
                }
            })
            .collect();
        Ok(DataFrameGroupBy::new(self, Grouping::from_keys(keys), None))
    }

    /// Group rows by a derived key
    pub fn group_by_fn<F>(&self, key_fn: F) -> Result<DataFrameGroupBy<'_>>
    where
        F: Fn(&DataFrame, usize) -> Value,
    {
        let keys: Vec<Value> = (0..self.row_count()).map(|i| key_fn(self, i)).collect();
        Ok(DataFrameGroupBy::new(self, Grouping::from_keys(keys), None))
    }

    /// Resample: group rows by time-period buckets of the datetime row
    /// index. The frequency threads through so aggregated output indexes
    /// are tagged with the new period.
    pub fn group_by_period(&self, freq: Frequency) -> Result<DataFrameGroupBy<'_>> {
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
        Ok(DataFrameGroupBy::new(
            self,
            Grouping::from_keys(keys),
            Some(freq),
        ))
    }

    /// Re-derive every column's display format (and the index format)
    /// from the current data
    pub fn update_column_formats(&mut self) -> Result<()> {
        for pos in 0..self.column_count() {
            let data = self.storage.column(pos)?;
            if let Some(col) = self.columns.get_mut(pos) {
                col.update_format_with(&data);
            }
        }
        self.index.update_format();
        Ok(())
    }

    /// Shape invariant check: the index, column metadata, and storage
    /// must agree on row and column counts. A mismatch is a corrupted
    /// table and fails immediately.
    pub fn validate(&self) -> Result<()> {
        if self.storage.column_count() != self.columns.len() {
            return Err(Error::Consistency(format!(
                "storage has {} columns but metadata declares {}",
                self.storage.column_count(),
                self.columns.len()
            )));
        }
        if let Some(rows) = self.storage.row_count() {
            if rows != self.index.len() {
                return Err(Error::Consistency(format!(
                    "storage has {} rows but index has {}",
                    rows,
                    self.index.len()
                )));
            }
        }
        Ok(())
    }
}

impl PartialEq for DataFrame {
    fn eq(&self, other: &Self) -> bool {
        if self.index != other.index || self.column_names() != other.column_names() {
            return false;
        }
        if self.row_count() != other.row_count() || self.column_count() != other.column_count() {
            return false;
        }
        for col in 0..self.column_count() {
            let (a, b) = match (self.storage.column(col), other.storage.column(col)) {
                (Ok(a), Ok(b)) => (a, b),
                _ => return false,
            };
            if !a.semantic_eq(&b) {
                return false;
            }
        }
        true
    }
}
