pub mod get;
pub mod history;
pub mod list;

pub use get::{GetTodoError, GetTodoQuery};
pub use history::{TodoHistoryError, TodoHistoryQuery};
pub use list::ListTodosError;
