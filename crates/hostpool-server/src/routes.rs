//! Route definitions

use axum::{
    Router,
    routing::{get, post},
};

use crate::handlers::{availability, book, health, hosts};
use crate::server::AppState;

/// Create the API router
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/hosts", get(hosts))
        .route("/availability", get(availability))
        .route("/book", post(book))
}
