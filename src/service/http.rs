use std::future::Future;
use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::json;
use tokio::net::TcpListener;
use tracing::info;

use super::RpcHandler;
use crate::error::PillBuddyError;

/// Builds the HTTP routes: `POST /rpc` and `GET /health`.
pub fn router(handler: Arc<RpcHandler>) -> Router {
    Router::new()
        .route("/rpc", post(rpc))
        .route("/health", get(health))
        .with_state(handler)
}

/// Binds the listener for `address` (`host:port`).
pub async fn bind(address: &str) -> Result<TcpListener, PillBuddyError> {
    Ok(TcpListener::bind(address).await?)
}

/// Serves JSON-RPC over HTTP until `shutdown` resolves.
pub async fn serve_http<F>(
    listener: TcpListener,
    handler: Arc<RpcHandler>,
    shutdown: F,
) -> Result<(), PillBuddyError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let address = listener.local_addr()?;
    info!("{} is running on {}", handler.metadata().title, address);

    axum::serve(listener, router(handler))
        .with_graceful_shutdown(shutdown)
        .await?;

    info!("HTTP listener on {} stopped", address);
    Ok(())
}

async fn rpc(State(handler): State<Arc<RpcHandler>>, body: String) -> Response {
    match handler.handle_str(&body).await {
        Some(response) => Json(response).into_response(),
        None => StatusCode::NO_CONTENT.into_response(),
    }
}

async fn health() -> impl IntoResponse {
    Json(json!({ "status": "ok" }))
}
