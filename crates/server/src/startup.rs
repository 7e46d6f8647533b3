use axum::Router;
use configs::AppConfig;
use tower_http::cors::CorsLayer;
use tracing::info;

use crate::routes;
use crate::state::AppState;
use service::{
    services::RecordService,
    storage::JsonFileRecordStore,
    uploads::UploadStore,
};

/// 任意来源可访问，不回显 Origin，也不放开 credentials
pub fn build_cors() -> CorsLayer {
    CorsLayer::permissive()
}

/// Open the data document and uploads directory (creating both if absent) and wire the state.
pub async fn build_state(cfg: &AppConfig) -> anyhow::Result<AppState> {
    let store = JsonFileRecordStore::open(&cfg.storage.data_file).await?;
    let uploads = UploadStore::open(&cfg.storage.uploads_dir).await?;
    let records = RecordService::with_serialized_writes(store, cfg.storage.serialize_writes);

    info!(
        event = "storage_ready",
        data_file = %cfg.storage.data_file.display(),
        uploads_dir = %cfg.storage.uploads_dir.display(),
        serialize_writes = cfg.storage.serialize_writes,
        "storage initialized"
    );
    Ok(AppState::new(records, uploads, cfg.storage.public_url_base.clone()))
}

/// Build the application router from a validated config.
pub async fn build_app(cfg: &AppConfig) -> anyhow::Result<Router> {
    let state = build_state(cfg).await?;
    Ok(routes::build_router(state, build_cors(), &cfg.limits))
}

/// Public entry: build the app and run the HTTP server
pub async fn run(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;

    let listener = tokio::net::TcpListener::bind(cfg.bind_addr()).await?;
    let addr = listener.local_addr()?;
    info!(%addr, "3SVK DB listening");
    axum::serve(listener, app).await?;
    Ok(())
}
