//! Server configuration from command-line flags and environment variables.

use clap::Parser;
use std::net::SocketAddr;

/// Default request body limit: 10 MiB.
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// HTTP upload endpoints for spreadsheet, CSV and XML conversion
#[derive(Debug, Clone, Parser)]
#[command(name = "upconvert-server", version, about)]
pub struct ServerConfig {
    /// Address to listen on
    #[arg(long, env = "UPCONVERT_BIND", default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Largest accepted request body, in bytes
    #[arg(long, env = "UPCONVERT_MAX_UPLOAD_BYTES", default_value_t = DEFAULT_MAX_UPLOAD_BYTES)]
    pub max_upload_bytes: usize,

    /// Log filter used when RUST_LOG is not set
    #[arg(long, env = "UPCONVERT_LOG", default_value = "info")]
    pub log: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: SocketAddr::from(([0, 0, 0, 0], 8080)),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
            log: "info".to_string(),
        }
    }
}

impl ServerConfig {
    /// Set the request body limit.
    pub fn with_max_upload_bytes(mut self, bytes: usize) -> Self {
        self.max_upload_bytes = bytes;
        self
    }
}
