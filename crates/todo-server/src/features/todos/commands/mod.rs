//! Todo commands (write operations)
//!
//! Each command runs in one transaction that first records the caller as the
//! performed-by value, so the audit trigger attributes the change.

pub mod create;
pub mod delete;
pub mod update;

pub use create::{CreateTodoCommand, CreateTodoError};
pub use delete::{DeleteTodoCommand, DeleteTodoError};
pub use update::{UpdateTodoCommand, UpdateTodoError};
