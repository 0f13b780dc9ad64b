//! HTTP API server.
//!
//! Builds the axum router around a shared [`HostPool`] and serves it until
//! SIGINT or SIGTERM.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::pool::HostPool;
use crate::routes::routes;

/// Shared application state.
#[derive(Debug, Clone)]
pub struct AppState {
    pub pool: Arc<HostPool>,
    /// Timezone used when `GET /availability` does not name one.
    pub default_timezone: String,
}

impl AppState {
    pub fn new(pool: Arc<HostPool>, default_timezone: impl Into<String>) -> Self {
        Self {
            pool,
            default_timezone: default_timezone.into(),
        }
    }
}

/// Builds the application with its middleware.
///
/// Panics inside a handler become plain 500 responses.
pub fn app(state: AppState) -> Router {
    Router::new()
        .merge(routes())
        .layer(TraceLayer::new_for_http())
        .layer(CatchPanicLayer::new())
        .with_state(state)
}

/// Starts the HTTP server and runs it until a shutdown signal arrives.
pub async fn start_server(config: ServerConfig) -> ServerResult<()> {
    let pool = HostPool::from_config(&config)?;
    let state = AppState::new(Arc::new(pool), config.server.default_timezone.clone());
    let hosts = state.pool.hosts().len();

    let listener = TcpListener::bind(config.server.bind).await?;
    info!(addr = %config.server.bind, hosts, "HTTP API listening");

    axum::serve(listener, app(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "failed to listen for SIGINT");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received SIGINT, initiating shutdown"),
        _ = terminate => info!("Received SIGTERM, initiating shutdown"),
    }
}
