//! Application setup and server configuration.

use std::sync::Arc;

use axum::{
    extract::Extension,
    http::{
        header::{AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware,
    Router,
};
use sqlx::PgPool;
use tower_governor::{governor::GovernorConfigBuilder, GovernorLayer};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domains::accounts::JwtService;
use crate::server::middleware::jwt_auth_middleware;
use crate::server::routes::api_router;

/// Shared application state
#[derive(Clone)]
pub struct AxumAppState {
    pub db_pool: PgPool,
    pub jwt_service: Arc<JwtService>,
}

/// Build the Axum application router.
///
/// All `/api` routes sit behind per-IP rate limiting; `/health` does not.
pub fn build_app(pool: PgPool, jwt_service: Arc<JwtService>, allowed_origins: Vec<String>) -> Router {
    let app_state = AxumAppState {
        db_pool: pool,
        jwt_service: jwt_service.clone(),
    };

    // CORS: explicit origins when configured, permissive otherwise (development)
    let cors = if allowed_origins.is_empty() {
        CorsLayer::new()
            .allow_origin(tower_http::cors::Any)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE])
    } else {
        let origins: Vec<HeaderValue> = allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
            .allow_headers([AUTHORIZATION, CONTENT_TYPE])
    };

    // Rate limiting: 10 requests per second per IP with bursts up to 20
    let rate_limit_config = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(10)
            .burst_size(20)
            .use_headers() // Extract IP from X-Forwarded-For header
            .finish()
            .expect("Rate limiter configuration is valid and should never fail"),
    );
    let rate_limit_layer = GovernorLayer {
        config: rate_limit_config,
    };

    let jwt_service_for_middleware = jwt_service;

    Router::new()
        .nest("/api", api_router().layer(rate_limit_layer))
        .merge(crate::server::routes::health_router())
        // Middleware layers (applied in reverse order - last added runs first)
        .layer(middleware::from_fn(move |req, next| {
            jwt_auth_middleware(jwt_service_for_middleware.clone(), req, next)
        }))
        .layer(Extension(app_state))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}
