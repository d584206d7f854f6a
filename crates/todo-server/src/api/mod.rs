//! HTTP application assembly

pub mod response;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde_json::json;
use sqlx::PgPool;

use crate::config::CorsConfig;
use crate::db;
use crate::error::{AppError, ServerResult};
use crate::features;
use crate::middleware;

/// Build the application router with all routes and middleware
pub fn build_router(pool: PgPool, cors: &CorsConfig) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .with_state(pool.clone())
        .merge(features::router(pool))
        // Apply layers from innermost to outermost
        .layer(middleware::tracing_layer())
        .layer(middleware::cors_layer(cors))
}

/// Health check handler
async fn health_check(State(pool): State<PgPool>) -> ServerResult<Response> {
    db::health_check(&pool).await.map_err(|e| {
        tracing::error!(error = %e, "Database health check failed");
        AppError::Unavailable("Database is unreachable".to_string())
    })?;

    Ok((
        StatusCode::OK,
        Json(json!({
            "status": "healthy",
            "database": "connected"
        })),
    )
        .into_response())
}
