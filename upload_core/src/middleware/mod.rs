//! Middleware components for the upload server

pub mod logging;
