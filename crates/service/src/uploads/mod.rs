//! Upload naming and the uploads directory.

pub mod namer;
pub mod store;

pub use namer::{derive_name, public_url, sanitize_file_name};
pub use store::{StoredUpload, UploadStore, UploadWriter};
