//! Reading and writing tables as delimited text.

pub mod csv;
