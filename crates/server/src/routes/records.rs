use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, Path, State},
    http::{header::CONTENT_TYPE, HeaderMap, StatusCode},
    Json,
};
use serde::Serialize;
use serde_json::{Map, Value};
use service::Record;

use crate::errors::ApiError;
use crate::state::AppState;

#[derive(Serialize, Debug)]
pub struct SaveResponse {
    pub message: &'static str,
    pub record: Record,
}

/// Only `application/json` bodies are parsed; other media types save as `{}`.
fn is_json_content(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(|essence| essence.trim().eq_ignore_ascii_case("application/json"))
        .unwrap_or(false)
}

/// Empty body is treated as `{}`; anything other than a JSON object is rejected.
fn parse_fields(body: &[u8]) -> Result<Map<String, Value>, ApiError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }
    match serde_json::from_slice::<Value>(body) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(ApiError::BadRequest("Request body must be a JSON object".into())),
        Err(e) => Err(ApiError::BadRequest(format!("Invalid JSON body: {e}"))),
    }
}

/// 保存一条 JSON 记录
pub async fn save(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Bytes, BytesRejection>,
) -> Result<(StatusCode, Json<SaveResponse>), ApiError> {
    let body = body?;
    let fields = if is_json_content(&headers) { parse_fields(&body)? } else { Map::new() };
    let record = state.records.create(fields).await?;
    Ok((StatusCode::CREATED, Json(SaveResponse { message: "Data saved", record })))
}

/// 列出全部记录（存储不可读时返回空数组）
pub async fn list(State(state): State<AppState>) -> Json<Vec<Record>> {
    Json(state.records.list().await)
}

/// 按 id 获取记录
pub async fn get_by_id(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<Record>, ApiError> {
    let record = state.records.get(&id).await?;
    Ok(Json(record))
}
