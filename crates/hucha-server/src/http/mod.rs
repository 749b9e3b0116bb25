//! HTTP surface
//!
//! Canonical prefixes: `/api/expenses` and `/api/products`.

pub mod error;
pub mod expenses;
pub mod products;

use axum::Router;

use crate::state::AppState;

pub use error::ApiError;

/// Assemble the full router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api/expenses", expenses::router())
        .nest("/api/products", products::router())
        .with_state(state)
}

/// Parse a path or query value, reporting failures as a per-field
/// validation diagnostic rather than a bare 400.
pub(crate) fn parse_field<T: std::str::FromStr>(
    field: &str,
    value: &str,
) -> Result<T, hucha_core::Error> {
    value
        .parse()
        .map_err(|_| hucha_core::Error::validation(field, format!("{field} has an invalid format")))
}

/// Parse a required query parameter.
pub(crate) fn require_field<T: std::str::FromStr>(
    field: &str,
    value: Option<&str>,
) -> Result<T, hucha_core::Error> {
    match value {
        None => Err(hucha_core::Error::validation(
            field,
            format!("{field} is required"),
        )),
        Some(raw) => parse_field(field, raw),
    }
}
