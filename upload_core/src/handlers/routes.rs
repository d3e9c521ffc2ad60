//! Route table for the upload service

use axum::{extract::DefaultBodyLimit, middleware, routing::post, Router};

use super::files::{file_service, redirect_bare_files_prefix, upload_file, FILES_PREFIX};
use crate::AppState;

pub fn create_routes(state: &AppState) -> Router<AppState> {
    let body_limit = usize::try_from(state.file_manager.max_upload_bytes()).unwrap_or(usize::MAX);

    Router::new()
        .route(
            "/upload",
            post(upload_file).layer(DefaultBodyLimit::max(body_limit)),
        )
        .nest_service(FILES_PREFIX, file_service(state.file_manager.storage_path()))
        .layer(middleware::from_fn(redirect_bare_files_prefix))
}
