//! Hucha HTTP server
//!
//! Thin HTTP layer over `hucha-core`: routing, request decoding, and the
//! wire error contract. All business rules live in the core services.

pub mod http;
pub mod state;

use axum::Router;
use hucha_core::storage::Database;

use crate::state::AppState;

/// Build the application router over the given database.
pub fn app(db: &Database) -> Router {
    http::router(AppState::new(db))
}
