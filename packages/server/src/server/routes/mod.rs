//! REST route handlers, one module per domain.

pub mod admin;
pub mod auth;
pub mod campaigns;
pub mod donations;
pub mod health;
pub mod organisations;
pub mod tags;

use axum::{routing::get, Router};

use crate::server::error::ApiError;

/// Reject text input longer than its database column allows.
pub(crate) fn ensure_max_chars(field: &str, value: &str, max: usize) -> Result<(), ApiError> {
    if value.chars().count() > max {
        return Err(ApiError::BadRequest(format!(
            "{} must be at most {} characters",
            field, max
        )));
    }
    Ok(())
}

/// Liveness endpoint, mounted outside the rate-limited API tree.
pub fn health_router() -> Router {
    Router::new().route("/health", get(health::health_handler))
}

/// The `/api` route tree.
pub fn api_router() -> Router {
    Router::new()
        .nest("/auth", auth::router())
        .nest("/organisations", organisations::router())
        .nest("/campaigns", campaigns::router())
        .nest("/donations", donations::router())
        .nest("/tags", tags::router())
        .nest("/admin", admin::router())
}
