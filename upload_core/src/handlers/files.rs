use axum::{
    extract::{
        multipart::{MultipartError, MultipartRejection},
        Multipart, Request, State,
    },
    http::{header, HeaderMap, Method, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use std::path::Path;
use tower_http::services::ServeDir;
use tracing::debug;

use crate::{
    error::{AppError, Result},
    files::FileUpload,
    AppState,
};

pub const FILES_PREFIX: &str = "/files";
pub const TYPE_FIELD: &str = "type";
pub const FILE_FIELD: &str = "uploadFile";

/// `POST /upload`. Replies `SUCCESS` or one of the plain-text error codes.
pub async fn upload_file(
    State(state): State<AppState>,
    headers: HeaderMap,
    multipart: std::result::Result<Multipart, MultipartRejection>,
) -> Result<&'static str> {
    let max_bytes = state.file_manager.max_upload_bytes();

    if content_length(&headers).is_some_and(|len| len > max_bytes) {
        return Err(AppError::FileTooBig { max_bytes });
    }

    let mut multipart = multipart.map_err(|e| AppError::InvalidFile(e.body_text()))?;

    let mut declared_type: Option<String> = None;
    let mut upload: Option<FileUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(e, max_bytes))?
    {
        let field_name = field.name().unwrap_or("").to_string();

        match field_name.as_str() {
            TYPE_FIELD => {
                let text = field.text().await.map_err(|e| multipart_error(e, max_bytes))?;
                if !text.trim().is_empty() {
                    declared_type = Some(text.trim().to_string());
                }
            }
            FILE_FIELD => {
                let original_filename = field.file_name().map(|s| s.to_string());
                let data = field.bytes().await.map_err(|e| multipart_error(e, max_bytes))?;

                upload = Some(FileUpload {
                    declared_type: None,
                    original_filename,
                    data,
                });
            }
            _ => {
                debug!("Ignoring unknown field: {}", field_name);
            }
        }
    }

    let mut upload = upload
        .ok_or_else(|| AppError::InvalidFile(format!("missing `{}` field", FILE_FIELD)))?;
    upload.declared_type = declared_type;

    state.file_manager.store_file(upload).await?;

    Ok("SUCCESS")
}

/// `GET /files/*`, rooted at the upload directory.
pub fn file_service(upload_dir: &Path) -> ServeDir {
    ServeDir::new(upload_dir).append_index_html_on_directories(false)
}

/// Bare `GET /files` gets a permanent redirect to `/files/`.
pub async fn redirect_bare_files_prefix(request: Request, next: Next) -> Response {
    if request.method() == Method::GET && request.uri().path() == FILES_PREFIX {
        return (
            StatusCode::MOVED_PERMANENTLY,
            [(header::LOCATION, format!("{}/", FILES_PREFIX))],
        )
            .into_response();
    }

    next.run(request).await
}

fn content_length(headers: &HeaderMap) -> Option<u64> {
    headers
        .get(header::CONTENT_LENGTH)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.trim().parse().ok())
}

fn multipart_error(err: MultipartError, max_bytes: u64) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        AppError::FileTooBig { max_bytes }
    } else {
        AppError::InvalidFile(err.body_text())
    }
}
