//! HTTP server for the selection API

use axum::{
    routing::{get, post},
    Router,
};
use crate::config::ServerConfig;
use crate::session::Session;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;
use super::handler::{
    categories_handler, country_stats_handler, current_selection_handler, presets_handler,
    select_handler, status_handler, treaty_members_handler,
};

/// API routes over `session`
pub fn router(session: Arc<Session>) -> Router {
    Router::new()
        .route("/api/status", get(status_handler))
        .route("/api/presets", get(presets_handler))
        .route("/api/categories", get(categories_handler))
        .route("/api/selection", post(select_handler).get(current_selection_handler))
        .route("/api/countries/:code/stats", get(country_stats_handler))
        .route("/api/treaties/members", get(treaty_members_handler))
        .layer(CorsLayer::permissive())
        .with_state(session)
}

/// HTTP server exposing the selection API
pub struct HttpServer {
    session: Arc<Session>,
    config: ServerConfig,
}

impl HttpServer {
    /// Create a new HTTP server
    pub fn new(session: Arc<Session>, config: ServerConfig) -> Self {
        Self { session, config }
    }

    /// Bind and serve until the process exits
    pub async fn start(&self) -> Result<(), Box<dyn std::error::Error>> {
        let app = router(Arc::clone(&self.session));

        let addr = format!("{}:{}", self.config.address, self.config.port);
        let listener = tokio::net::TcpListener::bind(&addr).await?;

        info!("API available at http://{}", addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}
