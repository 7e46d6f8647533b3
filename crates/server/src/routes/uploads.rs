use axum::{
    extract::{multipart::MultipartRejection, Multipart, State},
    http::StatusCode,
    Json,
};
use serde::Serialize;
use service::uploads::public_url;
use tracing::debug;

use crate::errors::ApiError;
use crate::state::AppState;

pub const FILE_FIELD: &str = "file";

#[derive(Serialize, Debug)]
pub struct UploadResponse {
    pub message: &'static str,
    pub filename: String,
    pub url: String,
}

/// 上传单个文件（multipart 字段名 `file`）
///
/// Streams the first `file` part carrying a non-empty file name to disk. Other
/// parts are skipped. A request that is not multipart at all counts as having
/// no file.
pub async fn upload(
    State(state): State<AppState>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let mut multipart = match multipart {
        Ok(m) => m,
        Err(rejection) => {
            debug!(error = %rejection, "upload without multipart body");
            return Err(ApiError::MissingUpload);
        }
    };

    while let Some(mut field) = multipart.next_field().await? {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let original = match field.file_name() {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => continue,
        };

        let mut writer = state.uploads.begin(&original).await?;
        loop {
            match field.chunk().await {
                Ok(Some(chunk)) => {
                    if let Err(e) = writer.write_chunk(&chunk).await {
                        writer.abort().await;
                        return Err(e.into());
                    }
                }
                Ok(None) => break,
                Err(e) => {
                    writer.abort().await;
                    return Err(e.into());
                }
            }
        }
        let stored = writer.finish().await?;

        let url = public_url(&state.public_url_base, &stored.filename);
        return Ok((
            StatusCode::CREATED,
            Json(UploadResponse { message: "File uploaded", filename: stored.filename, url }),
        ));
    }

    Err(ApiError::MissingUpload)
}
