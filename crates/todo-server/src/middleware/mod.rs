//! Middleware for the todo server
//!
//! This module provides middleware for:
//! - CORS (Cross-Origin Resource Sharing)
//! - Request logging with tracing
//! - Caller identity (`User-ID` header)

use axum::{
    extract::Request,
    http::{header, HeaderName, Method},
    middleware::Next,
    response::Response,
};
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::{DefaultMakeSpan, DefaultOnResponse, TraceLayer},
};
use tracing::Level;

use crate::config::CorsConfig;
use crate::error::AppError;
use crate::features::shared::{UserId, USER_ID_HEADER};

/// Create CORS layer from configuration
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::ACCEPT,
            header::CONTENT_TYPE,
            HeaderName::from_static(USER_ID_HEADER),
        ])
        .max_age(Duration::from_secs(3600));

    // Credentials cannot be combined with a wildcard origin
    if config.allowed_origins.is_empty() || config.allowed_origins.iter().any(|o| o == "*") {
        return cors.allow_origin(Any);
    }

    let origins: Vec<_> = config
        .allowed_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();
    let cors = cors.allow_origin(origins);

    if config.allow_credentials {
        cors.allow_credentials(true)
    } else {
        cors
    }
}

/// Create tracing/logging layer
pub fn tracing_layer(
) -> TraceLayer<tower_http::classify::SharedClassifier<tower_http::classify::ServerErrorsAsFailures>>
{
    TraceLayer::new_for_http()
        .make_span_with(DefaultMakeSpan::new().level(Level::INFO))
        .on_response(
            DefaultOnResponse::new()
                .level(Level::INFO)
                .latency_unit(tower_http::LatencyUnit::Micros),
        )
}

/// Reject requests without a usable `User-ID` header
///
/// Runs before the handler, so a rejected request never reaches the store.
/// The parsed identity is stored in the request extensions for [`UserId`].
pub async fn require_user_id(mut request: Request, next: Next) -> Result<Response, AppError> {
    let user = UserId::from_headers(request.headers()).map_err(|e| {
        tracing::debug!(
            method = %request.method(),
            path = %request.uri().path(),
            "Rejected request without User-ID"
        );
        e
    })?;

    request.extensions_mut().insert(user);
    Ok(next.run(request).await)
}
