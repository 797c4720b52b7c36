//! Error types for the upconvert library.

use crate::detect::FormatType;
use std::io;
use thiserror::Error;

/// Result type alias for upconvert operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Message returned to clients for any fault that is not their input's.
pub const INTERNAL_ERROR_MESSAGE: &str = "Internal server error";

/// Who is responsible for a failed conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// The uploaded input was empty, of the wrong type, or unreadable.
    Client,
    /// Anything else.
    Server,
}

/// Errors that can occur during conversion.
#[derive(Error, Debug)]
pub enum Error {
    /// The uploaded file has no content.
    #[error("File is empty")]
    EmptyFile,

    /// The file extension is not one of the supported formats.
    #[error("Unsupported format: {0:?}")]
    UnsupportedFormat(String),

    /// I/O error while reading the input.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Error reading ZIP archive.
    #[error("ZIP archive error: {0}")]
    ZipArchive(String),

    /// Error parsing XML content.
    #[error("XML parse error: {0}")]
    XmlParse(String),

    /// Error reading CSV records.
    #[error("CSV error: {0}")]
    Csv(String),

    /// Error encoding JSON output.
    #[error("JSON error: {0}")]
    Json(String),

    /// Invalid or malformed data in the document.
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// A required document component is missing.
    #[error("Missing component: {0}")]
    MissingComponent(String),

    /// The workbook does not declare a single sheet.
    #[error("Workbook contains no sheets")]
    NoSheets,

    /// The input of a known format could not be read.
    #[error("Error reading {format} file: {source}")]
    Read {
        format: FormatType,
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Wrap low-level read failures of `format` into [`Error::Read`].
    ///
    /// Failures that are not about the bytes of the input are returned as-is.
    pub fn while_reading(self, format: FormatType) -> Self {
        match self {
            Error::Io(_)
            | Error::ZipArchive(_)
            | Error::XmlParse(_)
            | Error::Csv(_)
            | Error::InvalidData(_)
            | Error::MissingComponent(_) => Error::Read {
                format,
                source: Box::new(self),
            },
            other => other,
        }
    }

    /// Classify the error for status mapping.
    pub fn class(&self) -> ErrorClass {
        match self {
            Error::EmptyFile | Error::UnsupportedFormat(_) | Error::Read { .. } => {
                ErrorClass::Client
            }
            _ => ErrorClass::Server,
        }
    }

    /// The generic message a client is allowed to see.
    pub fn public_message(&self) -> &'static str {
        match self {
            Error::EmptyFile => "File is empty",
            Error::UnsupportedFormat(_) => "Unsupported file format",
            Error::Read {
                format: FormatType::Xlsx,
                ..
            } => "Error reading Excel file",
            Error::Read {
                format: FormatType::Csv,
                ..
            } => "Error reading CSV file",
            _ => INTERNAL_ERROR_MESSAGE,
        }
    }
}

impl From<zip::result::ZipError> for Error {
    fn from(err: zip::result::ZipError) -> Self {
        Error::ZipArchive(err.to_string())
    }
}

impl From<quick_xml::Error> for Error {
    fn from(err: quick_xml::Error) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<quick_xml::events::attributes::AttrError> for Error {
    fn from(err: quick_xml::events::attributes::AttrError) -> Self {
        Error::XmlParse(err.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(err: csv::Error) -> Self {
        Error::Csv(err.to_string())
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err.to_string())
    }
}
