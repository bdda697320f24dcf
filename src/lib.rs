// Core modules
pub mod array;
pub mod column;
pub mod dataframe;
pub mod error;
pub mod groupby;
pub mod index;
pub mod io;
pub mod series;
pub mod temporal;
pub mod value;

// Re-export the main types at the crate root
pub use array::Array;
pub use column::Column;
pub use dataframe::select::{ColSelector, RowSelector, Selection};
pub use dataframe::sort::SortOrder;
pub use dataframe::storage::{Packed2D, Storage};
pub use dataframe::DataFrame;
pub use error::{Error, Result};
pub use groupby::{DataFrameGroupBy, Grouping, SeriesGroupBy};
pub use index::{ColumnIndex, Index, Label, LabelKind};
pub use io::csv::{read_table, write_table, ReadOptions};
pub use series::Series;
pub use temporal::Frequency;
pub use value::{DataType, Value};

// Export version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
