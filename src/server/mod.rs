//! HTTP / WebSocket 서버

mod error;
mod upload;
mod ws;

pub use error::{ApiError, ApiResult};

use crate::error::Result;
use crate::hub::BroadcastHub;
use crate::store::Catalog;
use axum::extract::State;
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::{json, Value};
use std::future::Future;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

pub struct AppState {
    pub catalog: Arc<dyn Catalog>,
    pub hub: Arc<BroadcastHub>,
}

pub type SharedState = Arc<AppState>;

pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        // 발주서 매칭
        .route("/upload", post(upload::upload))
        .route("/match-json", post(upload::match_json))
        .route("/match-pdf", post(upload::match_pdf))
        .route("/save-matched-row", post(upload::save_matched_row))
        // 실시간 구독
        .route("/ws", get(ws::subscribe))
        .route("/ws/drug-count", get(ws::subscribe))
        .route("/health", get(health))
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

async fn health(State(state): State<SharedState>) -> Json<Value> {
    Json(json!({
        "status": "ok",
        "subscribers": state.hub.subscriber_count(),
    }))
}

/// `shutdown`이 끝나면 진행 중인 요청을 마치고 반환
pub async fn serve<F>(listener: TcpListener, router: Router, shutdown: F) -> Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    tracing::info!(addr = ?listener.local_addr().ok(), "HTTP 서버 시작");
    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}
