//! Upload endpoints.

use crate::upload::{FormError, UploadForm};
use axum::extract::multipart::{Multipart, MultipartRejection};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use axum::{Json, Router};
use tracing::{error, info, warn};
use upconvert::error::INTERNAL_ERROR_MESSAGE;
use upconvert::{ErrorClass, Table, FALLBACK_JSON};

pub const PARSE_FILE_PATH: &str = "/upload/parseFile";
pub const GENERATE_JSON_PATH: &str = "/upload/generateJSON";

/// Routes without body limit or tracing layers.
pub fn router() -> Router {
    Router::new()
        .route(PARSE_FILE_PATH, post(parse_file))
        .route(GENERATE_JSON_PATH, post(generate_json))
}

/// `POST /upload/parseFile`: multipart `file` plus `startRow`, answered
/// with a JSON array of string rows.
pub async fn parse_file(multipart: Result<Multipart, MultipartRejection>) -> Response {
    let (file, start_row) = match read_parse_form(multipart).await {
        Ok(parts) => parts,
        Err(err) => {
            warn!(error = %err, "rejected parseFile request");
            return err.into_response();
        }
    };

    let filename = file.filename.clone();
    let bytes = file.data.len();
    let result = tokio::task::spawn_blocking(move || {
        upconvert::parse_file(&file.data, file.filename.as_deref(), start_row)
    })
    .await;

    match result {
        Ok(Ok(table)) => {
            info!(
                filename = filename.as_deref().unwrap_or(""),
                bytes,
                rows = table.row_count(),
                columns = table.column_count(),
                "parsed upload"
            );
            (StatusCode::OK, Json(table)).into_response()
        }
        Ok(Err(err)) => match err.class() {
            ErrorClass::Client => {
                warn!(filename = filename.as_deref().unwrap_or(""), error = %err, "upload rejected");
                message_response(StatusCode::BAD_REQUEST, err.public_message())
            }
            ErrorClass::Server => {
                error!(filename = filename.as_deref().unwrap_or(""), error = ?err, "conversion failed");
                message_response(StatusCode::INTERNAL_SERVER_ERROR, err.public_message())
            }
        },
        Err(err) => {
            error!(error = %err, "conversion task failed");
            message_response(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
        }
    }
}

/// `POST /upload/generateJSON`: multipart `file` holding XML, answered with
/// a JSON object. Any failure yields `{}` with status 200.
pub async fn generate_json(multipart: Result<Multipart, MultipartRejection>) -> Response {
    let json = match UploadForm::read(multipart).await.and_then(|mut form| form.require_file()) {
        Ok(file) => tokio::task::spawn_blocking(move || upconvert::generate_json(&file.data))
            .await
            .unwrap_or_else(|err| {
                error!(error = %err, "conversion task failed");
                FALLBACK_JSON.to_string()
            }),
        Err(err) => {
            warn!(error = %err, "unusable generateJSON request");
            FALLBACK_JSON.to_string()
        }
    };

    ([(header::CONTENT_TYPE, "application/json")], json).into_response()
}

async fn read_parse_form(
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(crate::upload::UploadedFile, i64), FormError> {
    let mut form = UploadForm::read(multipart).await?;
    let file = form.require_file()?;
    let start_row = form.start_row()?;
    Ok((file, start_row))
}

fn message_response(status: StatusCode, message: &str) -> Response {
    (status, Json(Table::message(message))).into_response()
}
