//! Row reordering by column values or index labels.
//!
//! Sorts are stable and build a new table; ties keep their original
//! relative order. Missing values sort last regardless of direction.

use std::cmp::Ordering;

use crate::dataframe::DataFrame;
use crate::error::Result;
use crate::value::Value;

/// Direction of a sort key
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    Ascending,
    Descending,
}

impl SortOrder {
    fn apply(&self, ord: Ordering) -> Ordering {
        match self {
            SortOrder::Ascending => ord,
            SortOrder::Descending => ord.reverse(),
        }
    }
}

impl DataFrame {
    /// New table with rows ordered by one or more column keys.
    ///
    /// Keys compare left to right; later keys only break ties in earlier
    /// ones.
    pub fn sort_values(&self, keys: &[(&str, SortOrder)]) -> Result<DataFrame> {
        let mut resolved = Vec::with_capacity(keys.len());
        for (name, order) in keys {
            let names = [*name];
            let positions = self.columns().indices(&names)?;
            resolved.push((self.storage().column(positions[0])?, *order));
        }
        let mut positions: Vec<usize> = (0..self.row_count()).collect();
        positions.sort_by(|&a, &b| {
            for (column, order) in &resolved {
                let va = column.get(a).unwrap_or(Value::Null);
                let vb = column.get(b).unwrap_or(Value::Null);
                // Missing sorts last in either direction
                let ord = match (va.is_missing(), vb.is_missing()) {
                    (true, true) => Ordering::Equal,
                    (true, false) => Ordering::Greater,
                    (false, true) => Ordering::Less,
                    (false, false) => order.apply(va.compare(&vb)),
                };
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
        self.take(&positions)
    }

    /// New table with rows ordered by their index labels
    pub fn sort_index(&self, order: SortOrder) -> Result<DataFrame> {
        let labels = self.index().labels();
        let mut positions: Vec<usize> = (0..self.row_count()).collect();
        positions.sort_by(|&a, &b| {
            let ord = labels[a].to_value().compare(&labels[b].to_value());
            order.apply(ord)
        });
        self.take(&positions)
    }
}
