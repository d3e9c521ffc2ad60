use axum::body::Bytes;
use std::path::PathBuf;

/// What the upload handler pulled out of a multipart form.
#[derive(Debug, Clone)]
pub struct FileUpload {
    /// Value of the `type` form field, if sent.
    pub declared_type: Option<String>,
    pub original_filename: Option<String>,
    pub data: Bytes,
}

#[derive(Debug, Clone)]
pub struct StoredFile {
    pub filename: String,
    pub path: PathBuf,
    pub content_type: &'static str,
    pub size: u64,
}
