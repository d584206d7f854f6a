//! Create todo command
//!
//! Inserts a todo owned by the caller. The insert and the performed-by
//! context share one transaction so the audit trigger sees the caller.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::audit::{set_performed_by, AuditError};
use crate::features::shared::UserId;
use crate::features::todos::models::{Todo, TODO_COLUMNS};

/// Fields accepted when creating a todo
///
/// Absent or null fields take their defaults. `id` and `user_id` in the
/// payload are ignored.
///
/// # Examples
///
/// ```rust,ignore
/// let command = CreateTodoCommand {
///     title: Some("Buy milk".to_string()),
///     description: None,
///     completed: None,
/// };
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateTodoCommand {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub completed: Option<bool>,
}

/// Errors that can occur when creating a todo
#[derive(Debug, thiserror::Error)]
pub enum CreateTodoError {
    #[error("Failed to set audit context: {0}")]
    Audit(#[from] AuditError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Insert the todo and return the stored row
///
/// # Errors
///
/// - `Audit` - The performed-by context could not be set
/// - `Database` - The insert or commit failed
#[tracing::instrument(skip(pool, command), fields(user_id = %owner))]
pub async fn handle(
    pool: PgPool,
    owner: &UserId,
    command: CreateTodoCommand,
) -> Result<Todo, CreateTodoError> {
    let mut tx = pool.begin().await?;
    set_performed_by(&mut tx, &owner.performed_by()).await?;

    let todo = sqlx::query_as::<_, Todo>(&format!(
        r#"
        INSERT INTO todos (title, description, completed, user_id)
        VALUES ($1, $2, $3, $4)
        RETURNING {TODO_COLUMNS}
        "#
    ))
    .bind(command.title.unwrap_or_default())
    .bind(command.description.unwrap_or_default())
    .bind(command.completed.unwrap_or(false))
    .bind(owner.as_str())
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(todo_id = todo.id, "Todo created");
    Ok(todo)
}
