//! Application error types and handling

use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AppError>;

/// Every upload failure maps to one fixed plain-text code.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Request body exceeds {max_bytes} bytes")]
    FileTooBig { max_bytes: u64 },

    #[error("Invalid file: {0}")]
    InvalidFile(String),

    #[error("File type not allowed: {content_type}")]
    InvalidFileType { content_type: String },

    #[error("Failed to write file: {0}")]
    CantWriteFile(#[source] std::io::Error),

    #[error("No file extension known for {content_type}")]
    CantReadFileType { content_type: String },

    /// Startup only (directory creation, listener bind). `/upload` reports
    /// storage failures as `CantWriteFile` and must never return this.
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// Startup only; never returned by a request handler.
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),
}

impl AppError {
    pub fn code(&self) -> &'static str {
        match self {
            AppError::FileTooBig { .. } => "FILE_TOO_BIG",
            AppError::InvalidFile(_) => "INVALID_FILE",
            AppError::InvalidFileType { .. } => "INVALID_FILE_TYPE",
            AppError::CantWriteFile(_) => "CANT_WRITE_FILE",
            AppError::CantReadFileType { .. } => "CANT_READ_FILE_TYPE",
            AppError::IoError(_) | AppError::Config(_) => "INTERNAL_ERROR",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::FileTooBig { .. }
            | AppError::InvalidFile(_)
            | AppError::InvalidFileType { .. } => StatusCode::BAD_REQUEST,
            AppError::CantWriteFile(_)
            | AppError::CantReadFileType { .. }
            | AppError::IoError(_)
            | AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        if status.is_server_error() {
            tracing::error!(code = self.code(), "upload failed: {}", self);
        } else {
            tracing::debug!(code = self.code(), "upload rejected: {}", self);
        }

        (
            status,
            [(header::CONTENT_TYPE, "text/plain; charset=utf-8")],
            self.code(),
        )
            .into_response()
    }
}
