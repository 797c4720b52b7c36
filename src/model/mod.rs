//! Output model shared by the tabular readers.
//!
//! Every tabular reader produces a [`Table`]: an ordered list of rows of
//! string cells. Rows are not required to have the same length.

mod table;

pub use table::*;
