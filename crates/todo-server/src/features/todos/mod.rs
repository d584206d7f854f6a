//! Todo feature slice
//!
//! - `commands/` - create, update, delete (audited)
//! - `queries/` - get, list, history
//! - `routes.rs` - HTTP handlers

pub mod commands;
pub mod models;
pub mod queries;
pub mod routes;

pub use commands::{
    CreateTodoCommand, CreateTodoError, DeleteTodoCommand, DeleteTodoError, UpdateTodoCommand,
    UpdateTodoError,
};
pub use models::Todo;
pub use queries::{GetTodoError, GetTodoQuery, ListTodosError, TodoHistoryError, TodoHistoryQuery};
pub use routes::todos_routes;
