//! Label indexes for rows and columns.
//!
//! An `Index` is an ordered sequence of labels; duplicates and unsorted
//! order are allowed. Label lookup is a linear scan: `position` resolves
//! to the first match, `positions` reports every duplicate, and `lookup`
//! echoes unmatched labels back so callers can fill with missing values
//! instead of failing.

use std::fmt;

use chrono::{NaiveDate, NaiveDateTime};

use crate::column::{self, Column};
use crate::error::{Error, Result};
use crate::temporal::Frequency;
use crate::value::{DataType, Value};

/// A row label
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Label {
    Int64(i64),
    Utf8(String),
    DateTime(NaiveDateTime),
}

/// The kind of label an index holds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelKind {
    Int64,
    Utf8,
    DateTime,
}

impl Label {
    /// The kind tag of this label
    pub fn kind(&self) -> LabelKind {
        match self {
            Label::Int64(_) => LabelKind::Int64,
            Label::Utf8(_) => LabelKind::Utf8,
            Label::DateTime(_) => LabelKind::DateTime,
        }
    }

    /// Normalize a label to the given kind before comparison.
    ///
    /// Datetime indexes accept calendar dates, timestamps, and parseable
    /// strings; integers render into string indexes. Returns `None` when
    /// no sensible coercion exists.
    pub fn coerce(&self, kind: LabelKind) -> Option<Label> {
        if self.kind() == kind {
            return Some(self.clone());
        }
        match (self, kind) {
            (Label::Utf8(s), LabelKind::DateTime) => {
                Value::parse_datetime(s).map(Label::DateTime)
            }
            (Label::Utf8(s), LabelKind::Int64) => s.trim().parse().ok().map(Label::Int64),
            (Label::Int64(v), LabelKind::Utf8) => Some(Label::Utf8(v.to_string())),
            (Label::DateTime(t), LabelKind::Utf8) => {
                Some(Label::Utf8(t.format("%Y-%m-%d %H:%M:%S").to_string()))
            }
            _ => None,
        }
    }

    /// The scalar value carried by this label
    pub fn to_value(&self) -> Value {
        match self {
            Label::Int64(v) => Value::Int64(*v),
            Label::Utf8(s) => Value::Utf8(s.clone()),
            Label::DateTime(t) => Value::DateTime(*t),
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Label::Int64(v) => write!(f, "{}", v),
            Label::Utf8(s) => write!(f, "{}", s),
            Label::DateTime(t) => write!(f, "{}", t.format("%Y-%m-%d %H:%M:%S")),
        }
    }
}

impl From<i64> for Label {
    fn from(v: i64) -> Self {
        Label::Int64(v)
    }
}

impl From<&str> for Label {
    fn from(v: &str) -> Self {
        Label::Utf8(v.to_string())
    }
}

impl From<String> for Label {
    fn from(v: String) -> Self {
        Label::Utf8(v)
    }
}

impl From<NaiveDateTime> for Label {
    fn from(v: NaiveDateTime) -> Self {
        Label::DateTime(v)
    }
}

impl From<NaiveDate> for Label {
    fn from(v: NaiveDate) -> Self {
        Label::DateTime(v.and_hms_opt(0, 0, 0).unwrap_or_default())
    }
}

/// Ordered sequence of row labels
#[derive(Debug, Clone)]
pub struct Index {
    labels: Vec<Label>,
    name: Option<String>,
    format: Option<String>,
    kind: LabelKind,
    /// Generation period of a regular datetime index, if known
    period: Option<Frequency>,
}

impl Index {
    /// Create an index from labels; all labels must share one kind.
    /// Duplicates are allowed.
    pub fn new(labels: Vec<Label>) -> Result<Self> {
        let kind = labels.first().map(Label::kind).unwrap_or(LabelKind::Int64);
        if let Some(bad) = labels.iter().find(|l| l.kind() != kind) {
            return Err(Error::Type(format!(
                "mixed label kinds in index: found {:?} among {:?}",
                bad.kind(),
                kind
            )));
        }
        Ok(Index {
            labels,
            name: None,
            format: None,
            kind,
            period: None,
        })
    }

    /// Create an index with a name
    pub fn with_name(labels: Vec<Label>, name: impl Into<String>) -> Result<Self> {
        let mut index = Self::new(labels)?;
        index.name = Some(name.into());
        Ok(index)
    }

    /// Default positional index `0..len`
    pub fn default_with_len(len: usize) -> Self {
        Index {
            labels: (0..len as i64).map(Label::Int64).collect(),
            name: None,
            format: None,
            kind: LabelKind::Int64,
            period: None,
        }
    }

    /// Regular datetime index starting at `start`, recording the
    /// generation period
    pub fn datetime_range(start: NaiveDateTime, periods: usize, freq: Frequency) -> Self {
        let mut labels = Vec::with_capacity(periods);
        let mut t = start;
        for _ in 0..periods {
            labels.push(Label::DateTime(t));
            t = freq.advance(t);
        }
        Index {
            labels,
            name: None,
            format: None,
            kind: LabelKind::DateTime,
            period: Some(freq),
        }
    }

    /// Number of labels
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    /// Check if the index is empty
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    /// The label kind of this index
    pub fn kind(&self) -> LabelKind {
        self.kind
    }

    /// Index name
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Set the index name
    pub fn set_name(&mut self, name: Option<String>) {
        self.name = name;
    }

    /// Generation period, for datetime indexes built from a regular range
    pub fn period(&self) -> Option<Frequency> {
        self.period
    }

    /// Tag the index with a period (used when resampling derives a new
    /// index at a different granularity)
    pub fn set_period(&mut self, period: Option<Frequency>) {
        self.period = period;
    }

    /// All labels
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    /// Label at a position
    pub fn get(&self, pos: usize) -> Option<&Label> {
        self.labels.get(pos)
    }

    /// First position holding the label, scanning linearly.
    /// Duplicates resolve to the first match.
    pub fn position(&self, label: &Label) -> Option<usize> {
        let wanted = label.coerce(self.kind)?;
        self.labels.iter().position(|l| *l == wanted)
    }

    /// Every position holding the label, in order
    pub fn positions(&self, label: &Label) -> Vec<usize> {
        let wanted = match label.coerce(self.kind) {
            Some(w) => w,
            None => return Vec::new(),
        };
        self.labels
            .iter()
            .enumerate()
            .filter_map(|(i, l)| (*l == wanted).then_some(i))
            .collect()
    }

    /// Resolve many labels at once, echoing each requested label back
    /// next to its first-match position (or `None` on a miss). This is
    /// the mechanism reindex-style reads use to fill unmatched rows with
    /// a missing value instead of failing.
    pub fn lookup(&self, labels: &[Label]) -> Vec<(Option<usize>, Label)> {
        labels
            .iter()
            .map(|l| (self.position(l), l.clone()))
            .collect()
    }

    /// New index containing the labels at the given positions, in
    /// selection order, preserving name and format
    pub fn sub_index(&self, positions: &[usize]) -> Result<Index> {
        let mut labels = Vec::with_capacity(positions.len());
        for &pos in positions {
            let label = self.labels.get(pos).ok_or(Error::IndexOutOfBounds {
                index: pos,
                size: self.labels.len(),
            })?;
            labels.push(label.clone());
        }
        Ok(Index {
            labels,
            name: self.name.clone(),
            format: self.format.clone(),
            kind: self.kind,
            period: self.period,
        })
    }

    /// New index over a strided range of positions
    pub fn sub_range(&self, start: usize, end: usize, step: usize) -> Result<Index> {
        self.sub_index(&range_positions(start, end, step, self.len())?)
    }

    /// Concatenation: this index's labels followed by the other's.
    /// Name and format come from `self`.
    pub fn append(&self, other: &Index) -> Result<Index> {
        if !other.is_empty() && !self.is_empty() && self.kind != other.kind {
            return Err(Error::Type(format!(
                "cannot append {:?} index to {:?} index",
                other.kind, self.kind
            )));
        }
        let mut labels = self.labels.clone();
        labels.extend(other.labels.iter().cloned());
        Ok(Index {
            labels,
            name: self.name.clone(),
            format: self.format.clone(),
            kind: if self.is_empty() { other.kind } else { self.kind },
            period: self.period,
        })
    }

    /// Push one label (row append); the kind must match
    pub fn push(&mut self, label: Label) -> Result<()> {
        let coerced = label.coerce(self.kind).ok_or_else(|| {
            Error::Type(format!(
                "cannot push {:?} label onto {:?} index",
                label.kind(),
                self.kind
            ))
        })?;
        self.labels.push(coerced);
        Ok(())
    }

    /// Display format, derived by `update_format`
    pub fn format(&self) -> Option<&str> {
        self.format.as_deref()
    }

    /// Derive the display format and width from the current labels
    pub fn update_format(&mut self) {
        self.format = Some(match self.kind {
            LabelKind::DateTime => {
                let times: Vec<NaiveDateTime> = self
                    .labels
                    .iter()
                    .filter_map(|l| match l {
                        Label::DateTime(t) => Some(*t),
                        _ => None,
                    })
                    .collect();
                column::datetime_format(&times).to_string()
            }
            _ => {
                let width = self.display_width();
                format!("%{}s", width)
            }
        });
    }

    /// Widest rendered label, also covering the index name
    pub fn display_width(&self) -> usize {
        let name_len = self.name.as_deref().map(str::len).unwrap_or(0);
        match self.kind {
            LabelKind::DateTime => {
                let pattern = self.format.as_deref().unwrap_or("%Y-%m-%d %H:%M:%S");
                column::pattern_width(pattern).max(name_len)
            }
            _ => self
                .labels
                .iter()
                .map(|l| l.to_string().len())
                .max()
                .unwrap_or(0)
                .max(name_len),
        }
    }

    /// Render one label with the derived format
    pub fn format_label(&self, label: &Label, width: usize) -> String {
        match (label, self.format.as_deref()) {
            (Label::DateTime(t), Some(pattern)) if pattern.starts_with('%') && pattern.contains("%Y") => {
                format!("{:>w$}", t.format(pattern), w = width)
            }
            _ => format!("{:>w$}", label, w = width),
        }
    }
}

impl PartialEq for Index {
    fn eq(&self, other: &Self) -> bool {
        self.labels == other.labels
    }
}

/// Resolve a strided `[start, end)` range into explicit positions
pub(crate) fn range_positions(
    start: usize,
    end: usize,
    step: usize,
    len: usize,
) -> Result<Vec<usize>> {
    if step == 0 {
        return Err(Error::InvalidInput("range step must be positive".to_string()));
    }
    if end > len {
        return Err(Error::IndexOutOfBounds { index: end, size: len });
    }
    Ok((start..end).step_by(step).collect())
}

/// Column lookup table: an index whose label space is column names
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnIndex {
    columns: Vec<Column>,
}

impl ColumnIndex {
    /// Create from column metadata; names must be unique
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        for (i, col) in columns.iter().enumerate() {
            if columns[..i].iter().any(|c| c.name() == col.name()) {
                return Err(Error::DuplicateColumnName(col.name().to_string()));
            }
        }
        Ok(ColumnIndex { columns })
    }

    /// Empty column index
    pub fn empty() -> Self {
        ColumnIndex { columns: Vec::new() }
    }

    /// Number of columns
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    /// Check if there are no columns
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// All column names, in order
    pub fn names(&self) -> Vec<&str> {
        self.columns.iter().map(Column::name).collect()
    }

    /// Column metadata at a position
    pub fn get(&self, pos: usize) -> Option<&Column> {
        self.columns.get(pos)
    }

    /// Mutable column metadata at a position
    pub fn get_mut(&mut self, pos: usize) -> Option<&mut Column> {
        self.columns.get_mut(pos)
    }

    /// Position of a column by name
    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name() == name)
    }

    /// Column metadata by name
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.position(name).and_then(|p| self.columns.get(p))
    }

    /// Vectorized name-to-position resolution; any unknown name is an
    /// error naming the column
    pub fn indices(&self, names: &[&str]) -> Result<Vec<usize>> {
        names
            .iter()
            .map(|n| {
                self.position(n)
                    .ok_or_else(|| Error::ColumnNotFound((*n).to_string()))
            })
            .collect()
    }

    /// The single element type shared by every column, if there is one.
    /// Governs whether a packed 2-D block is a legal layout.
    pub fn uniform_dtype(&self) -> Option<DataType> {
        let first = self.columns.first()?.dtype();
        self.columns
            .iter()
            .all(|c| c.dtype() == first)
            .then_some(first)
    }

    /// New column index holding clones of the columns at the given
    /// positions
    pub fn sub(&self, positions: &[usize]) -> Result<ColumnIndex> {
        let mut columns = Vec::with_capacity(positions.len());
        for &pos in positions {
            let col = self.columns.get(pos).ok_or(Error::IndexOutOfBounds {
                index: pos,
                size: self.columns.len(),
            })?;
            columns.push(col.clone());
        }
        ColumnIndex::new(columns)
    }

    /// Append a column; the name must be new
    pub fn push(&mut self, column: Column) -> Result<()> {
        if self.position(column.name()).is_some() {
            return Err(Error::DuplicateColumnName(column.name().to_string()));
        }
        self.columns.push(column);
        Ok(())
    }

    /// Insert a column at a position, shifting the rest right
    pub fn insert(&mut self, pos: usize, column: Column) -> Result<()> {
        if self.position(column.name()).is_some() {
            return Err(Error::DuplicateColumnName(column.name().to_string()));
        }
        if pos > self.columns.len() {
            return Err(Error::IndexOutOfBounds {
                index: pos,
                size: self.columns.len(),
            });
        }
        self.columns.insert(pos, column);
        Ok(())
    }

    /// Remove and return the column at a position
    pub fn remove(&mut self, pos: usize) -> Result<Column> {
        if pos >= self.columns.len() {
            return Err(Error::IndexOutOfBounds {
                index: pos,
                size: self.columns.len(),
            });
        }
        Ok(self.columns.remove(pos))
    }

    /// Iterate the columns
    pub fn iter(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }
}
