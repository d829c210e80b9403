use axum::{
    routing::{any, get, post},
    Router,
};
use std::path::Path;
use std::sync::Arc;
use tower_http::services::{ServeDir, ServeFile};
use tower_http::trace::TraceLayer;

use crate::{handlers, proxy, AppState};

pub fn create_router(state: Arc<AppState>, static_dir: &str) -> Router {
    let index = Path::new(static_dir).join("index.html");

    Router::new()
        // Health check
        .route("/health", get(handlers::health_check))

        // Fee dashboard
        .route("/api/fees", get(handlers::get_fees))
        .route("/api/fees/reload", post(handlers::reload_fees))

        // Credential-injecting upstream proxy
        .route("/api/bags/*path", any(proxy::proxy_bags))
        .route("/api/public/*path", any(proxy::proxy_public))

        .with_state(state)
        // Built dashboard, with index.html for client-side routes
        .fallback_service(ServeDir::new(static_dir).fallback(ServeFile::new(index)))
        .layer(TraceLayer::new_for_http())
}
