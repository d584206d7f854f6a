//! Todo Server Library
//!
//! HTTP service for per-user todos with database-level audit logging.
//!
//! # Overview
//!
//! - **API Endpoints**: `/todos` CRUD scoped by the `User-ID` header
//! - **Audit Logging**: PostgreSQL triggers record every insert, update, and
//!   delete in `todos_audit`, stamped with the acting user
//! - **Configuration**: Environment-based configuration management
//! - **Middleware**: CORS, request logging, and the `User-ID` guard
//!
//! # Architecture
//!
//! - **Commands** (create, update, delete) run in a transaction that first
//!   sets the performed-by context, then mutates the row. The audit trigger
//!   fires inside that transaction.
//! - **Queries** (get, list, history) read with the owner as a filter.
//!
//! # Example
//!
//! ```no_run
//! use todo_server::{api, config::Config, db};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load()?;
//!     let pool = db::create_pool(&config.database).await?;
//!     db::run_migrations(&pool).await?;
//!
//!     let app = api::build_router(pool, &config.cors);
//!     let listener = tokio::net::TcpListener::bind("127.0.0.1:8080").await?;
//!     axum::serve(listener, app).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod audit;
pub mod config;
pub mod db;
pub mod error;
pub mod features;
pub mod middleware;

// Re-export commonly used types
pub use error::{AppError, ServerResult};
