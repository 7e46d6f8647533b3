use std::sync::Arc;

use service::{services::RecordService, uploads::UploadStore};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub records: RecordService,
    pub uploads: Arc<UploadStore>,
    /// Already normalized: no trailing slash, empty for relative URLs.
    pub public_url_base: String,
}

impl AppState {
    pub fn new(records: RecordService, uploads: Arc<UploadStore>, public_url_base: impl Into<String>) -> Self {
        Self { records, uploads, public_url_base: public_url_base.into() }
    }
}
