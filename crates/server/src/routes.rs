use axum::{
    extract::{DefaultBodyLimit, State},
    routing::{get, post},
    Json, Router,
};
use tower_http::{
    cors::CorsLayer,
    services::ServeDir,
    trace::{DefaultMakeSpan, DefaultOnFailure, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use common::types::{Health, ServiceDescriptor};
use configs::LimitsConfig;

use crate::state::AppState;

pub mod records;
pub mod uploads;

pub const SERVICE_NAME: &str = "3SVK DB";

pub async fn index() -> Json<ServiceDescriptor> {
    Json(ServiceDescriptor::new(SERVICE_NAME, env!("CARGO_PKG_VERSION")))
}

/// Reports whether the record document is readable; `/data` cannot tell the difference.
pub async fn health(State(state): State<AppState>) -> Json<Health> {
    let store = state.records.health().await;
    if store.is_ok() {
        Json(Health::ok())
    } else {
        Json(Health::degraded(store.as_str()))
    }
}

/// Build the full application router: descriptor, records, uploads and static upload serving
pub fn build_router(state: AppState, cors: CorsLayer, limits: &LimitsConfig) -> Router {
    let uploaded_files = ServeDir::new(state.uploads.dir());

    let api = Router::new()
        .route("/", get(index))
        .route("/health", get(health))
        .route(
            "/save",
            post(records::save).layer(DefaultBodyLimit::max(limits.json_body_bytes)),
        )
        .route("/data", get(records::list))
        .route("/data/:id", get(records::get_by_id))
        .route(
            "/upload",
            post(uploads::upload).layer(DefaultBodyLimit::max(limits.upload_bytes)),
        );

    api.nest_service("/uploads", uploaded_files)
        .with_state(state)
        .layer(cors)
        .layer(
            TraceLayer::new_for_http()
                // 每次请求创建 span，包含方法和路径等，日志级别为 INFO
                .make_span_with(
                    DefaultMakeSpan::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                .on_request(
                    DefaultOnRequest::new()
                        .level(Level::INFO),
                )
                // 响应返回时打点，包含状态码与耗时
                .on_response(
                    DefaultOnResponse::new()
                        .level(Level::INFO)
                        .include_headers(false),
                )
                // 失败（5xx 等）时以 ERROR 记录
                .on_failure(
                    DefaultOnFailure::new()
                        .level(Level::ERROR),
                )
        )
}
