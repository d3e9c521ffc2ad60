pub mod manager;
pub mod models;
pub mod sniff;
pub mod validation;

pub use manager::{FileManager, FileManagerConfig};
pub use models::{FileUpload, StoredFile};
pub use sniff::{extension_for, sniff_content_type};
pub use validation::{FileValidationConfig, FileValidator, ValidationError};
