// SPDX-FileCopyrightText: 2026 Kalam Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Gateway HTTP server built on axum.

use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    routing::{get, post},
    Router,
};
use tower_http::cors::CorsLayer;

use kalam_chatbot::Chatbot;
use kalam_core::KalamError;

use crate::handlers;

/// Shared state for request handlers.
///
/// `chatbot` is `None` when loading failed at startup; the engine is
/// immutable once loaded, so handlers share it through an `Arc` with
/// no locking.
#[derive(Clone)]
pub struct AppState {
    pub chatbot: Option<Arc<Chatbot>>,
}

/// Build the gateway router over the given state.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/chatbot_response", post(handlers::post_chatbot_response))
        .route("/health", get(handlers::get_health))
        .with_state(state)
        .layer(CorsLayer::permissive())
}

/// Bind and serve the gateway until the process stops.
pub async fn start_server(host: &str, port: u16, state: AppState) -> Result<(), KalamError> {
    let app = router(state);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| KalamError::Io {
            path: PathBuf::from(&addr),
            source: e,
        })?;

    tracing::info!("gateway listening on {addr}");
    axum::serve(listener, app).await.map_err(|e| KalamError::Io {
        path: PathBuf::from(&addr),
        source: e,
    })
}
