//! Multipart form extraction.

use axum::body::Bytes;
use axum::extract::multipart::{Multipart, MultipartError, MultipartRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;
use upconvert::Table;

/// Form field carrying the uploaded file.
pub const FILE_FIELD: &str = "file";

/// Form field carrying the first data row index.
pub const START_ROW_FIELD: &str = "startRow";

/// An uploaded file, owned by the request that carried it.
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// Original filename sent by the client, if any.
    pub filename: Option<String>,
    /// Raw content.
    pub data: Bytes,
}

/// Fields of an upload form.
#[derive(Debug, Default)]
pub struct UploadForm {
    pub file: Option<UploadedFile>,
    pub start_row: Option<String>,
}

/// Why an upload form could not be used.
#[derive(Error, Debug)]
pub enum FormError {
    /// The body is not a readable multipart form.
    #[error("malformed multipart request: {detail}")]
    Malformed { status: StatusCode, detail: String },

    /// No `file` part.
    #[error("required part 'file' is not present")]
    MissingFile,

    /// `startRow` is absent or not an integer.
    #[error("missing or invalid 'startRow'")]
    InvalidStartRow,
}

impl From<MultipartRejection> for FormError {
    fn from(rejection: MultipartRejection) -> Self {
        FormError::Malformed {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

impl From<MultipartError> for FormError {
    fn from(err: MultipartError) -> Self {
        FormError::Malformed {
            status: err.status(),
            detail: err.body_text(),
        }
    }
}

impl FormError {
    /// Message sent to the client.
    pub fn public_message(&self) -> &'static str {
        match self {
            FormError::Malformed { .. } => "Malformed multipart request",
            FormError::MissingFile => "Required part 'file' is not present",
            FormError::InvalidStartRow => "Invalid startRow",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            FormError::Malformed { status, .. } => *status,
            FormError::MissingFile | FormError::InvalidStartRow => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for FormError {
    fn into_response(self) -> Response {
        (self.status(), Json(Table::message(self.public_message()))).into_response()
    }
}

impl UploadForm {
    /// Read every part of the form into memory. Unknown parts are skipped.
    pub async fn read(multipart: Result<Multipart, MultipartRejection>) -> Result<Self, FormError> {
        let mut multipart = multipart?;
        let mut form = Self::default();

        while let Some(field) = multipart.next_field().await? {
            let name = field.name().map(str::to_string);
            match name.as_deref() {
                Some(FILE_FIELD) => {
                    let filename = field.file_name().map(str::to_string);
                    let data = field.bytes().await?;
                    form.file = Some(UploadedFile { filename, data });
                }
                Some(START_ROW_FIELD) => form.start_row = Some(field.text().await?),
                _ => {}
            }
        }

        Ok(form)
    }

    /// The uploaded file, required.
    pub fn require_file(&mut self) -> Result<UploadedFile, FormError> {
        self.file.take().ok_or(FormError::MissingFile)
    }

    /// The `startRow` value as an integer, required.
    pub fn start_row(&self) -> Result<i64, FormError> {
        self.start_row
            .as_deref()
            .and_then(|value| value.trim().parse::<i32>().ok())
            .map(i64::from)
            .ok_or(FormError::InvalidStartRow)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_start_row_parsing() {
        let mut form = UploadForm::default();
        assert!(matches!(form.start_row(), Err(FormError::InvalidStartRow)));

        form.start_row = Some(" 3 ".to_string());
        assert_eq!(form.start_row().unwrap(), 3);

        form.start_row = Some("-1".to_string());
        assert_eq!(form.start_row().unwrap(), -1);

        form.start_row = Some("two".to_string());
        assert!(form.start_row().is_err());

        form.start_row = Some("9999999999".to_string());
        assert!(form.start_row().is_err());
    }

    #[test]
    fn test_missing_file() {
        let mut form = UploadForm::default();
        let err = form.require_file().unwrap_err();
        assert_eq!(err.status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.public_message(), "Required part 'file' is not present");
    }

    #[test]
    fn test_form_error_is_std_error() {
        let errors: Vec<Box<dyn std::error::Error + Send + Sync>> = vec![
            Box::new(FormError::MissingFile),
            Box::new(FormError::InvalidStartRow),
            Box::new(FormError::Malformed {
                status: StatusCode::PAYLOAD_TOO_LARGE,
                detail: "length limit exceeded".to_string(),
            }),
        ];
        let messages: Vec<String> = errors.iter().map(|err| err.to_string()).collect();
        assert_eq!(
            messages,
            vec![
                "required part 'file' is not present",
                "missing or invalid 'startRow'",
                "malformed multipart request: length limit exceeded",
            ]
        );

        let wrapped = anyhow::Error::new(FormError::MissingFile).context("reading upload");
        assert!(wrapped.downcast_ref::<FormError>().is_some());
    }
}
