//! # upconvert
//!
//! Convert uploaded files into structured data.
//!
//! - `.xlsx` workbooks and `.csv` files become a [`Table`]: rows of string
//!   cells, serialised as a JSON array of arrays.
//! - XML documents become a JSON object string.
//!
//! All conversions work on bytes already held in memory and keep no state
//! between calls.
//!
//! ## Quick Start
//!
//! ```no_run
//! use upconvert::{parse_file, xml_to_json};
//!
//! let data = std::fs::read("people.xlsx")?;
//! let table = parse_file(&data, Some("people.xlsx"), 0)?;
//! println!("{}", serde_json::to_string(&table)?);
//!
//! let json = xml_to_json(br#"<root><a>1</a></root>"#)?;
//! assert_eq!(json, r#"{"a":"1"}"#);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! ## Features
//!
//! - `xlsx` (default): Excel workbook support

pub mod delimited;
pub mod detect;
pub mod error;
pub mod model;
pub mod package;
pub mod xml_json;

#[cfg(feature = "xlsx")]
pub mod xlsx;

// Re-exports
pub use detect::{detect_format_from_name, FormatType};
pub use error::{Error, ErrorClass, Result};
pub use model::{Row, Table};
pub use xml_json::{generate_json, xml_to_json, FALLBACK_JSON};

use tracing::debug;

/// Parse an uploaded tabular file into a table.
///
/// The format is chosen from the extension of `filename` (`xlsx` or `csv`,
/// any case). For workbooks, `start_row` is the 0-based index of the first
/// data row emitted after the header row; CSV files are returned whole.
///
/// # Errors
///
/// - [`Error::EmptyFile`] when `data` is empty, whatever the extension
/// - [`Error::UnsupportedFormat`] for any other extension
/// - [`Error::Read`] when the file cannot be read as its format
///
/// Use [`Error::class`] and [`Error::public_message`] to report failures.
///
/// # Example
///
/// ```
/// use upconvert::parse_file;
///
/// let table = parse_file(b"name,age\nAnn,31\n", Some("people.csv"), 0)?;
/// assert_eq!(table.rows()[0], vec!["name", "age"]);
/// # Ok::<(), upconvert::Error>(())
/// ```
pub fn parse_file(data: &[u8], filename: Option<&str>, start_row: i64) -> Result<Table> {
    if data.is_empty() {
        return Err(Error::EmptyFile);
    }

    let format = detect_format_from_name(filename)?;
    debug!(%format, bytes = data.len(), start_row, "parsing upload");

    match format {
        FormatType::Xlsx => parse_xlsx(data, start_row),
        FormatType::Csv => parse_csv(data),
    }
}

/// Parse the first sheet of an `.xlsx` workbook.
#[cfg(feature = "xlsx")]
pub fn parse_xlsx(data: &[u8], start_row: i64) -> Result<Table> {
    xlsx::XlsxReader::from_bytes(data.to_vec())
        .and_then(|reader| reader.read_table(start_row))
        .map_err(|err| err.while_reading(FormatType::Xlsx))
}

/// Parse the first sheet of an `.xlsx` workbook.
#[cfg(not(feature = "xlsx"))]
pub fn parse_xlsx(_data: &[u8], _start_row: i64) -> Result<Table> {
    Err(Error::UnsupportedFormat(FormatType::Xlsx.extension().to_string()))
}

/// Parse a CSV file; every record, header included, is a row.
pub fn parse_csv(data: &[u8]) -> Result<Table> {
    delimited::read_csv(data).map_err(|err| err.while_reading(FormatType::Csv))
}
