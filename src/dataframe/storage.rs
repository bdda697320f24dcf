//! Physical storage layouts for a DataFrame.
//!
//! A table's data lives in exactly one of two representations: a packed
//! row-major 2-D block (legal only when every column shares one element
//! type) or a list of independently typed 1-D arrays. Making the layout
//! an explicit sum type keeps the "wrong interpretation" state of the
//! reviewed design unrepresentable.

use crate::array::Array;
use crate::error::{Error, Result};
use crate::value::{DataType, Value};

/// Homogeneous row-major 2-D block
#[derive(Debug, Clone, PartialEq)]
pub struct Packed2D {
    rows: usize,
    cols: usize,
    values: Array,
}

impl Packed2D {
    /// Create from a flat row-major buffer; the length must be rows*cols
    pub fn new(rows: usize, cols: usize, values: Array) -> Result<Self> {
        if values.len() != rows * cols {
            return Err(Error::LengthMismatch {
                expected: rows * cols,
                actual: values.len(),
            });
        }
        Ok(Packed2D { rows, cols, values })
    }

    /// Assemble a block from per-column arrays of one shared type
    pub fn from_columns(columns: &[Array]) -> Result<Self> {
        let cols = columns.len();
        let rows = columns.first().map(Array::len).unwrap_or(0);
        let dtype = columns.first().map(Array::dtype).ok_or_else(|| {
            Error::UnsupportedLayout("cannot pack a table with no columns".to_string())
        })?;
        for col in columns {
            if col.dtype() != dtype {
                return Err(Error::UnsupportedLayout(format!(
                    "packed layout requires a uniform element type, found {} and {}",
                    dtype,
                    col.dtype()
                )));
            }
            if col.len() != rows {
                return Err(Error::InconsistentRowCount {
                    expected: rows,
                    found: col.len(),
                });
            }
        }
        let mut values = Array::with_capacity(dtype, rows * cols);
        for r in 0..rows {
            for col in columns {
                if let Some(v) = col.get(r) {
                    values.push(&v)?;
                }
            }
        }
        Packed2D::new(rows, cols, values)
    }

    /// Element type of the block
    pub fn dtype(&self) -> DataType {
        self.values.dtype()
    }

    /// Number of rows
    pub fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub fn cols(&self) -> usize {
        self.cols
    }

    /// Cell read
    pub fn get(&self, row: usize, col: usize) -> Option<Value> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.values.get(row * self.cols + col)
    }

    /// Cell write
    pub fn set(&mut self, row: usize, col: usize, value: &Value) -> Result<()> {
        if row >= self.rows || col >= self.cols {
            return Err(Error::IndexOutOfBounds {
                index: row * self.cols + col,
                size: self.rows * self.cols,
            });
        }
        self.values.set(row * self.cols + col, value)
    }

    /// Copy out one column as a 1-D array
    pub fn column(&self, col: usize) -> Result<Array> {
        if col >= self.cols {
            return Err(Error::IndexOutOfBounds {
                index: col,
                size: self.cols,
            });
        }
        let positions: Vec<usize> = (0..self.rows).map(|r| r * self.cols + col).collect();
        self.values.take(&positions)
    }

    /// Copy out one row as scalar values
    pub fn row(&self, row: usize) -> Result<Vec<Value>> {
        if row >= self.rows {
            return Err(Error::IndexOutOfBounds {
                index: row,
                size: self.rows,
            });
        }
        Ok((0..self.cols)
            .filter_map(|c| self.values.get(row * self.cols + c))
            .collect())
    }

    /// New block holding the selected rows, in order
    pub fn take_rows(&self, rows: &[usize]) -> Result<Packed2D> {
        let mut positions = Vec::with_capacity(rows.len() * self.cols);
        for &r in rows {
            if r >= self.rows {
                return Err(Error::IndexOutOfBounds {
                    index: r,
                    size: self.rows,
                });
            }
            positions.extend((0..self.cols).map(|c| r * self.cols + c));
        }
        Packed2D::new(rows.len(), self.cols, self.values.take(&positions)?)
    }

    /// New block holding the selected columns, in order
    pub fn take_columns(&self, cols: &[usize]) -> Result<Packed2D> {
        let mut positions = Vec::with_capacity(self.rows * cols.len());
        for r in 0..self.rows {
            for &c in cols {
                if c >= self.cols {
                    return Err(Error::IndexOutOfBounds {
                        index: c,
                        size: self.cols,
                    });
                }
                positions.push(r * self.cols + c);
            }
        }
        Packed2D::new(self.rows, cols.len(), self.values.take(&positions)?)
    }

    /// Append one row. Reallocates and copies the whole block, so
    /// repeated single-row appends cost O(rows*cols) each.
    ///
    /// The whole row is checked before anything is written; a rejected
    /// value leaves the block unchanged.
    pub fn push_row(&mut self, values: &[Value]) -> Result<()> {
        if values.len() != self.cols {
            return Err(Error::LengthMismatch {
                expected: self.cols,
                actual: values.len(),
            });
        }
        for v in values {
            self.values.check_value(v)?;
        }
        for v in values {
            self.values.push(v)?;
        }
        self.rows += 1;
        Ok(())
    }

    /// Insert a column of the block's type at a position
    pub fn insert_column(&mut self, at: usize, column: &Array) -> Result<()> {
        if at > self.cols {
            return Err(Error::IndexOutOfBounds {
                index: at,
                size: self.cols,
            });
        }
        if column.dtype() != self.dtype() && self.rows > 0 {
            return Err(Error::Type(format!(
                "cannot insert {} column into {} block",
                column.dtype(),
                self.dtype()
            )));
        }
        if column.len() != self.rows {
            return Err(Error::InconsistentRowCount {
                expected: self.rows,
                found: column.len(),
            });
        }
        let new_cols = self.cols + 1;
        let mut values = Array::with_capacity(self.dtype(), self.rows * new_cols);
        for r in 0..self.rows {
            for c in 0..new_cols {
                let v = if c < at {
                    self.values.get(r * self.cols + c)
                } else if c == at {
                    column.get(r)
                } else {
                    self.values.get(r * self.cols + (c - 1))
                };
                if let Some(v) = v {
                    values.push(&v)?;
                }
            }
        }
        self.values = values;
        self.cols = new_cols;
        Ok(())
    }

    /// Cast the whole block along the numeric ladder
    pub fn cast(&self, dtype: DataType) -> Result<Packed2D> {
        Packed2D::new(self.rows, self.cols, self.values.cast(dtype)?)
    }

    /// Swap row and column roles
    pub fn transpose(&self) -> Result<Packed2D> {
        let mut positions = Vec::with_capacity(self.rows * self.cols);
        for c in 0..self.cols {
            for r in 0..self.rows {
                positions.push(r * self.cols + c);
            }
        }
        Packed2D::new(self.cols, self.rows, self.values.take(&positions)?)
    }

    /// Split the block into per-column arrays
    pub fn to_columns(&self) -> Result<Vec<Array>> {
        (0..self.cols).map(|c| self.column(c)).collect()
    }
}

/// The physical layout of a table's data
#[derive(Debug, Clone, PartialEq)]
pub enum Storage {
    /// Single homogeneous 2-D block
    Packed(Packed2D),
    /// One independently typed array per column
    Columns(Vec<Array>),
}

impl Storage {
    /// Number of columns
    pub fn column_count(&self) -> usize {
        match self {
            Storage::Packed(p) => p.cols(),
            Storage::Columns(cols) => cols.len(),
        }
    }

    /// Number of rows, when the storage itself can know it.
    /// A column list with no columns carries no row information.
    pub fn row_count(&self) -> Option<usize> {
        match self {
            Storage::Packed(p) => Some(p.rows()),
            Storage::Columns(cols) => cols.first().map(Array::len),
        }
    }

    /// Cell read
    pub fn get(&self, row: usize, col: usize) -> Option<Value> {
        match self {
            Storage::Packed(p) => p.get(row, col),
            Storage::Columns(cols) => cols.get(col).and_then(|c| c.get(row)),
        }
    }

    /// Cell write
    pub fn set(&mut self, row: usize, col: usize, value: &Value) -> Result<()> {
        match self {
            Storage::Packed(p) => p.set(row, col, value),
            Storage::Columns(cols) => {
                let column = cols.get_mut(col).ok_or(Error::IndexOutOfBounds {
                    index: col,
                    size: 0,
                })?;
                column.set(row, value)
            }
        }
    }

    /// Copy out one column
    pub fn column(&self, col: usize) -> Result<Array> {
        match self {
            Storage::Packed(p) => p.column(col),
            Storage::Columns(cols) => cols
                .get(col)
                .cloned()
                .ok_or(Error::IndexOutOfBounds {
                    index: col,
                    size: cols.len(),
                }),
        }
    }

    /// New storage with the selected rows, preserving the layout
    pub fn take_rows(&self, rows: &[usize]) -> Result<Storage> {
        match self {
            Storage::Packed(p) => Ok(Storage::Packed(p.take_rows(rows)?)),
            Storage::Columns(cols) => Ok(Storage::Columns(
                cols.iter().map(|c| c.take(rows)).collect::<Result<_>>()?,
            )),
        }
    }

    /// New storage with the selected columns, preserving the layout
    pub fn take_columns(&self, cols_sel: &[usize]) -> Result<Storage> {
        match self {
            Storage::Packed(p) => Ok(Storage::Packed(p.take_columns(cols_sel)?)),
            Storage::Columns(cols) => {
                let mut out = Vec::with_capacity(cols_sel.len());
                for &c in cols_sel {
                    let col = cols.get(c).ok_or(Error::IndexOutOfBounds {
                        index: c,
                        size: cols.len(),
                    })?;
                    out.push(col.clone());
                }
                Ok(Storage::Columns(out))
            }
        }
    }

    /// Convert to the column-list layout
    pub fn into_columns(self) -> Result<Vec<Array>> {
        match self {
            Storage::Packed(p) => p.to_columns(),
            Storage::Columns(cols) => Ok(cols),
        }
    }
}
