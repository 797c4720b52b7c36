//! HTTP front end for the `upconvert` library.
//!
//! Two multipart endpoints:
//!
//! - `POST /upload/parseFile` converts an `.xlsx` or `.csv` upload into a
//!   JSON array of string rows.
//! - `POST /upload/generateJSON` converts an XML upload into a JSON object.

pub mod config;
pub mod routes;
pub mod upload;

pub use config::ServerConfig;

use axum::extract::DefaultBodyLimit;
use axum::Router;
use tower_http::trace::TraceLayer;

/// Build the application router with its body limit and request tracing.
pub fn app(config: &ServerConfig) -> Router {
    routes::router()
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(TraceLayer::new_for_http())
}
