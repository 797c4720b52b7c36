//! Format detection for uploaded files.

use crate::error::{Error, Result};

/// ZIP file magic bytes: PK\x03\x04
const ZIP_MAGIC: [u8; 4] = [0x50, 0x4B, 0x03, 0x04];

/// Tabular formats accepted by [`crate::parse_file`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormatType {
    /// Microsoft Excel workbook (.xlsx)
    Xlsx,
    /// Comma-separated values (.csv)
    Csv,
}

impl FormatType {
    /// Returns the file extension for this format.
    pub fn extension(&self) -> &'static str {
        match self {
            FormatType::Xlsx => "xlsx",
            FormatType::Csv => "csv",
        }
    }

    /// Returns a human-readable name for this format.
    pub fn name(&self) -> &'static str {
        match self {
            FormatType::Xlsx => "Excel",
            FormatType::Csv => "CSV",
        }
    }
}

impl std::fmt::Display for FormatType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Return the text after the last `.` of a filename, or `""` when there is none.
pub fn file_extension(filename: &str) -> &str {
    match filename.rfind('.') {
        Some(idx) => &filename[idx + 1..],
        None => "",
    }
}

/// Detect the format type from an uploaded file's original name.
///
/// The extension is compared case-insensitively, so `Report.XLSX` is an
/// Excel workbook.
///
/// # Example
///
/// ```
/// use upconvert::detect::{detect_format_from_name, FormatType};
///
/// assert_eq!(detect_format_from_name(Some("data.CSV"))?, FormatType::Csv);
/// assert!(detect_format_from_name(Some("notes.txt")).is_err());
/// # Ok::<(), upconvert::Error>(())
/// ```
pub fn detect_format_from_name(filename: Option<&str>) -> Result<FormatType> {
    let extension = filename.map(file_extension).unwrap_or("");

    if extension.eq_ignore_ascii_case(FormatType::Xlsx.extension()) {
        Ok(FormatType::Xlsx)
    } else if extension.eq_ignore_ascii_case(FormatType::Csv.extension()) {
        Ok(FormatType::Csv)
    } else {
        Err(Error::UnsupportedFormat(extension.to_string()))
    }
}

/// Check if data starts with ZIP magic bytes.
pub fn is_zip_file(data: &[u8]) -> bool {
    data.len() >= 4 && data[..4] == ZIP_MAGIC
}
