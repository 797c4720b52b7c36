//! XLSX (Excel) workbook reader.
//!
//! Reads the first worksheet of an Office Open XML workbook (.xlsx) and
//! coerces every cell to a string.
//!
//! # Example
//!
//! ```no_run
//! use upconvert::xlsx::XlsxReader;
//!
//! let data = std::fs::read("report.xlsx")?;
//! let reader = XlsxReader::from_bytes(data)?;
//! let table = reader.read_table(0)?;
//!
//! for row in table.rows() {
//!     println!("{}", row.join(" | "));
//! }
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod cell;
mod formula;
mod parser;
mod shared_strings;
mod styles;

pub use cell::{format_number, CellRef, CellValue};
pub use parser::{Sheet, XlsxReader};
pub use styles::serial_to_datetime;
