//! Unified row/column selection.
//!
//! A single `select` entry point takes one row selector and one column
//! selector and returns the smallest structure that can hold the result:
//! a scalar when both selectors name exactly one thing, a Series when
//! only the column selector does, and a DataFrame otherwise. Label
//! selectors that miss do not fail; the missing rows fill with the
//! element type's missing value and the requested label is echoed into
//! the result's index.

use crate::array::Array;
use crate::dataframe::DataFrame;
use crate::error::{Error, Result};
use crate::index::{range_positions, Index, Label};
use crate::series::Series;
use crate::value::Value;

/// Which rows to read
#[derive(Debug, Clone)]
pub enum RowSelector {
    /// One row by position
    Pos(usize),
    /// Half-open strided position range
    Range { start: usize, end: usize, step: usize },
    /// Explicit positions, in order
    Positions(Vec<usize>),
    /// Boolean mask over all rows
    Mask(Vec<bool>),
    /// One row by label (first match on duplicates)
    Label(Label),
    /// Rows by label, misses filled with the missing value
    Labels(Vec<Label>),
}

/// Which columns to read
#[derive(Debug, Clone)]
pub enum ColSelector {
    /// One column by position
    Pos(usize),
    /// Half-open strided position range
    Range { start: usize, end: usize, step: usize },
    /// Explicit positions, in order
    Positions(Vec<usize>),
    /// One column by name
    Name(String),
    /// Columns by name, in the given order
    Names(Vec<String>),
}

/// Result of a selection, shaped by the cardinality of the selectors
#[derive(Debug, Clone, PartialEq)]
pub enum Selection {
    Scalar(Value),
    Series(Series),
    Frame(DataFrame),
}

impl Selection {
    /// Unwrap a scalar result
    pub fn into_scalar(self) -> Result<Value> {
        match self {
            Selection::Scalar(v) => Ok(v),
            other => Err(Error::Type(format!(
                "selection produced a {}, not a scalar",
                other.kind_name()
            ))),
        }
    }

    /// Unwrap a Series result
    pub fn into_series(self) -> Result<Series> {
        match self {
            Selection::Series(s) => Ok(s),
            other => Err(Error::Type(format!(
                "selection produced a {}, not a series",
                other.kind_name()
            ))),
        }
    }

    /// Unwrap a DataFrame result
    pub fn into_frame(self) -> Result<DataFrame> {
        match self {
            Selection::Frame(df) => Ok(df),
            other => Err(Error::Type(format!(
                "selection produced a {}, not a frame",
                other.kind_name()
            ))),
        }
    }

    fn kind_name(&self) -> &'static str {
        match self {
            Selection::Scalar(_) => "scalar",
            Selection::Series(_) => "series",
            Selection::Frame(_) => "frame",
        }
    }
}

/// Resolved row selector: positions paired with the labels they should
/// carry in the output, misses as None
struct ResolvedRows {
    rows: Vec<(Option<usize>, Label)>,
    single: bool,
}

/// Resolved column selector
struct ResolvedCols {
    positions: Vec<usize>,
    single: bool,
}

impl DataFrame {
    /// Read a sub-structure of the table.
    ///
    /// Two single selectors produce a `Scalar`; a single column selector
    /// over many rows of a multi-column table produces a `Series`;
    /// anything else a `Frame`. Positional selectors out of bounds fail;
    /// label selectors that miss fill with the missing value instead.
    pub fn select(&self, rows: &RowSelector, cols: &ColSelector) -> Result<Selection> {
        let cols = self.resolve_cols(cols)?;
        let rows = self.resolve_rows(rows)?;
        match (rows.single, cols.single) {
            (true, true) => self.select_scalar(&rows, cols.positions[0]),
            // A one-column table keeps its tabular shape under selection
            (false, true) if self.column_count() > 1 => Ok(Selection::Series(
                self.select_series(&rows, cols.positions[0])?,
            )),
            _ => Ok(Selection::Frame(self.select_frame(&rows, &cols)?)),
        }
    }

    fn select_scalar(&self, rows: &ResolvedRows, col: usize) -> Result<Selection> {
        let dtype = self.storage().column(col)?.dtype();
        let value = match rows.rows[0].0 {
            Some(row) => self.get_value(row, col).ok_or(Error::IndexOutOfBounds {
                index: row,
                size: self.row_count(),
            })?,
            None => Array::missing_value(dtype),
        };
        Ok(Selection::Scalar(value))
    }

    fn select_series(&self, rows: &ResolvedRows, col: usize) -> Result<Series> {
        let data = self.storage().column(col)?;
        let positions: Vec<Option<usize>> = rows.rows.iter().map(|(p, _)| *p).collect();
        let values = data.take_or_missing(&positions)?;
        let index = self.selection_index(rows)?;
        let name = self
            .columns()
            .get(col)
            .map(|c| c.name().to_string());
        Series::with_index(values, index, name)
    }

    fn select_frame(&self, rows: &ResolvedRows, cols: &ResolvedCols) -> Result<DataFrame> {
        let positions: Vec<Option<usize>> = rows.rows.iter().map(|(p, _)| *p).collect();
        let mut arrays = Vec::with_capacity(cols.positions.len());
        let mut metadata = Vec::with_capacity(cols.positions.len());
        for &c in &cols.positions {
            let data = self.storage().column(c)?;
            let taken = data.take_or_missing(&positions)?;
            let mut col = self
                .columns()
                .get(c)
                .cloned()
                .ok_or(Error::IndexOutOfBounds {
                    index: c,
                    size: self.column_count(),
                })?;
            // A fill can promote Int64 to Float64
            col.set_dtype(taken.dtype());
            metadata.push(col);
            arrays.push(taken);
        }
        let index = self.selection_index(rows)?;
        DataFrame::from_columns(
            crate::index::ColumnIndex::new(metadata)?,
            arrays,
            Some(index),
        )
    }

    /// Output index for a row selection: matched rows keep their label,
    /// misses echo the requested one
    fn selection_index(&self, rows: &ResolvedRows) -> Result<Index> {
        let labels: Vec<Label> = rows.rows.iter().map(|(_, l)| l.clone()).collect();
        let mut index = Index::new(labels)?;
        index.set_name(self.index().name().map(String::from));
        Ok(index)
    }

    fn resolve_rows(&self, selector: &RowSelector) -> Result<ResolvedRows> {
        let len = self.row_count();
        let label_at = |p: usize| -> Result<Label> {
            self.index()
                .get(p)
                .cloned()
                .ok_or(Error::IndexOutOfBounds { index: p, size: len })
        };
        match selector {
            RowSelector::Pos(p) => Ok(ResolvedRows {
                rows: vec![(Some(*p), label_at(*p)?)],
                single: true,
            }),
            RowSelector::Range { start, end, step } => {
                let positions = range_positions(*start, *end, *step, len)?;
                let rows = positions
                    .into_iter()
                    .map(|p| Ok((Some(p), label_at(p)?)))
                    .collect::<Result<_>>()?;
                Ok(ResolvedRows { rows, single: false })
            }
            RowSelector::Positions(positions) => {
                let rows = positions
                    .iter()
                    .map(|&p| Ok((Some(p), label_at(p)?)))
                    .collect::<Result<_>>()?;
                Ok(ResolvedRows { rows, single: false })
            }
            RowSelector::Mask(mask) => {
                if mask.len() != len {
                    return Err(Error::LengthMismatch {
                        expected: len,
                        actual: mask.len(),
                    });
                }
                let rows = mask
                    .iter()
                    .enumerate()
                    .filter(|(_, &keep)| keep)
                    .map(|(p, _)| Ok((Some(p), label_at(p)?)))
                    .collect::<Result<_>>()?;
                Ok(ResolvedRows { rows, single: false })
            }
            RowSelector::Label(label) => {
                let pos = self.index().position(label);
                if pos.is_none() {
                    log::warn!("label {} not found; filling with missing value", label);
                }
                Ok(ResolvedRows {
                    rows: vec![(pos, label.clone())],
                    single: true,
                })
            }
            RowSelector::Labels(labels) => {
                let resolved = self.index().lookup(labels);
                for (pos, label) in &resolved {
                    if pos.is_none() {
                        log::warn!("label {} not found; filling with missing value", label);
                    }
                }
                Ok(ResolvedRows {
                    rows: resolved,
                    single: false,
                })
            }
        }
    }

    fn resolve_cols(&self, selector: &ColSelector) -> Result<ResolvedCols> {
        let len = self.column_count();
        let check = |p: usize| -> Result<usize> {
            if p >= len {
                Err(Error::IndexOutOfBounds { index: p, size: len })
            } else {
                Ok(p)
            }
        };
        match selector {
            ColSelector::Pos(p) => Ok(ResolvedCols {
                positions: vec![check(*p)?],
                single: true,
            }),
            ColSelector::Range { start, end, step } => Ok(ResolvedCols {
                positions: range_positions(*start, *end, *step, len)?,
                single: false,
            }),
            ColSelector::Positions(positions) => Ok(ResolvedCols {
                positions: positions.iter().map(|&p| check(p)).collect::<Result<_>>()?,
                single: false,
            }),
            ColSelector::Name(name) => {
                let pos = self
                    .columns()
                    .position(name)
                    .ok_or_else(|| Error::ColumnNotFound(name.clone()))?;
                Ok(ResolvedCols {
                    positions: vec![pos],
                    single: true,
                })
            }
            ColSelector::Names(names) => {
                let refs: Vec<&str> = names.iter().map(String::as_str).collect();
                Ok(ResolvedCols {
                    positions: self.columns().indices(&refs)?,
                    single: false,
                })
            }
        }
    }
}
