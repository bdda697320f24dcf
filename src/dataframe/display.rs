//! Fixed-width text rendering of a table.
//!
//! Rendering always re-derives the display formats from the current
//! data, so a table mutated since construction still prints with the
//! right widths. `head`/`tail` truncate with an ellipsis row; `Display`
//! prints everything.

use std::fmt;

use crate::column::Column;
use crate::dataframe::DataFrame;
use crate::index::Index;
use crate::value::Value;

const ELLIPSIS: &str = "...";

impl DataFrame {
    /// Render the first `n` rows, with an ellipsis row when truncated
    pub fn head(&self, n: usize) -> String {
        let end = n.min(self.row_count());
        render(self, 0, end, end < self.row_count(), false)
    }

    /// Render the last `n` rows, with an ellipsis row when truncated
    pub fn tail(&self, n: usize) -> String {
        let start = self.row_count().saturating_sub(n);
        render(self, start, self.row_count(), false, start > 0)
    }
}

impl fmt::Display for DataFrame {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render(self, 0, self.row_count(), false, false))
    }
}

/// Per-column metadata with formats freshly derived from the data,
/// leaving the table itself untouched
fn derived_columns(df: &DataFrame) -> Vec<Column> {
    let mut cols: Vec<Column> = df.columns().iter().cloned().collect();
    for (pos, col) in cols.iter_mut().enumerate() {
        if let Ok(data) = df.storage().column(pos) {
            col.update_format_with(&data);
        }
    }
    cols
}

fn derived_index(df: &DataFrame) -> Index {
    let mut index = df.index().clone();
    index.update_format();
    index
}

fn render(
    df: &DataFrame,
    start: usize,
    end: usize,
    trailing_ellipsis: bool,
    leading_ellipsis: bool,
) -> String {
    let columns = derived_columns(df);
    let index = derived_index(df);
    let index_width = index.display_width();
    let mut out = String::new();

    // Header: blank index cell, then right-aligned column names
    out.push_str(&" ".repeat(index_width));
    for col in &columns {
        out.push(' ');
        out.push_str(&format!("{:>width$}", col.name(), width = col.format_width()));
    }
    out.push('\n');

    if leading_ellipsis {
        out.push_str(&ellipsis_row(index_width, &columns));
    }
    for row in start..end {
        match index.get(row) {
            Some(label) => out.push_str(&index.format_label(label, index_width)),
            None => out.push_str(&" ".repeat(index_width)),
        }
        for (pos, col) in columns.iter().enumerate() {
            let value = df.get_value(row, pos).unwrap_or(Value::Null);
            out.push(' ');
            out.push_str(&col.format_value(&value));
        }
        out.push('\n');
    }
    if trailing_ellipsis {
        out.push_str(&ellipsis_row(index_width, &columns));
    }
    out
}

fn ellipsis_row(index_width: usize, columns: &[Column]) -> String {
    let mut out = format!("{:>width$}", ELLIPSIS, width = index_width);
    for col in columns {
        out.push(' ');
        out.push_str(&format!("{:>width$}", ELLIPSIS, width = col.format_width()));
    }
    out.push('\n');
    out
}
