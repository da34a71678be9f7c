//! HTTP server
//!
//! Thin axum surface over the orchestrator: chat page, question endpoint and
//! health endpoint. Sessions are identified by cookie.

mod page;
mod routes;
mod session;

pub use session::ClientSession;

use axum::Router;
use std::sync::Arc;
use std::time::Instant;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::Config;
use crate::orchestrator::{Orchestrator, SharedOrchestrator};
use crate::types::Result;

/// Application state shared across handlers
pub struct AppState {
    pub orchestrator: SharedOrchestrator,
    pub start_time: Instant,
}

impl AppState {
    pub fn new(orchestrator: SharedOrchestrator) -> Self {
        Self {
            orchestrator,
            start_time: Instant::now(),
        }
    }
}

/// Build the application router
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(routes::page_routes())
        .merge(routes::health_routes())
        .with_state(Arc::new(state))
        .layer(CatchPanicLayer::custom(routes::panic_response))
        .layer(TraceLayer::new_for_http())
}

/// Run the HTTP server until Ctrl-C
pub async fn run(config: &Config) -> Result<()> {
    let orchestrator = Orchestrator::from_config(config)?;
    if orchestrator.chain().is_empty() {
        warn!("No provider has credentials; questions will be refused with 503");
    }

    let app = router(AppState::new(Arc::new(orchestrator)));

    let addr = config.server.bind_address();
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
