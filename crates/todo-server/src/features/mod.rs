//! Feature modules implementing the todo API
//!
//! Each feature is a vertical slice with its own commands, queries, and
//! routes:
//! - `commands/` - Write operations (create, update, delete)
//! - `queries/` - Read operations (get, list)
//! - `routes.rs` - HTTP route definitions

pub mod shared;
pub mod todos;

use axum::Router;
use sqlx::PgPool;

/// Creates the feature router with every slice mounted under its prefix
///
/// - `/todos` - Todo management
pub fn router(pool: PgPool) -> Router<()> {
    Router::new().nest("/todos", todos::todos_routes().with_state(pool))
}
