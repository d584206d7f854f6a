//! Update todo command
//!
//! Overwrites the fields present in the payload and keeps the rest. The row
//! is looked up by id alone and the owner is then set to the caller, so a
//! caller who knows another user's todo id takes it over. That behavior is
//! long-standing API surface and is logged when it happens.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::audit::{set_performed_by, AuditError};
use crate::features::shared::UserId;
use crate::features::todos::models::{Todo, TODO_COLUMNS};

/// Fields that may be changed; `None` keeps the stored value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateTodoCommand {
    /// Taken from the path, never from the payload
    #[serde(skip)]
    pub id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub completed: Option<bool>,
}

/// Errors that can occur when updating a todo
#[derive(Debug, thiserror::Error)]
pub enum UpdateTodoError {
    #[error("Todo not found")]
    NotFound(i64),
    #[error("Failed to set audit context: {0}")]
    Audit(#[from] AuditError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl UpdateTodoCommand {
    /// Merge the present fields into `todo` and hand it to `owner`
    pub fn apply(self, mut todo: Todo, owner: &UserId) -> Todo {
        if let Some(title) = self.title {
            todo.title = title;
        }
        if let Some(description) = self.description {
            todo.description = description;
        }
        if let Some(completed) = self.completed {
            todo.completed = completed;
        }
        todo.user_id = owner.as_str().to_string();
        todo
    }
}

/// Whether a todo with `id` exists, regardless of owner
///
/// Used to report a missing row ahead of a malformed payload.
pub async fn exists(pool: &PgPool, id: i64) -> Result<bool, UpdateTodoError> {
    let found: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM todos WHERE id = $1)")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(found)
}

/// Update the todo and return the stored row
///
/// # Errors
///
/// - `NotFound` - No todo has this id
/// - `Audit` - The performed-by context could not be set
/// - `Database` - A statement or the commit failed
#[tracing::instrument(skip(pool, command), fields(user_id = %owner, todo_id = command.id))]
pub async fn handle(
    pool: PgPool,
    owner: &UserId,
    command: UpdateTodoCommand,
) -> Result<Todo, UpdateTodoError> {
    let id = command.id;
    let mut tx = pool.begin().await?;

    let current = sqlx::query_as::<_, Todo>(&format!(
        "SELECT {TODO_COLUMNS} FROM todos WHERE id = $1 FOR UPDATE"
    ))
    .bind(id)
    .fetch_optional(&mut *tx)
    .await?
    .ok_or(UpdateTodoError::NotFound(id))?;

    if current.user_id != owner.as_str() {
        tracing::warn!(
            todo_id = id,
            previous_owner = %current.user_id,
            new_owner = %owner,
            "Todo ownership reassigned by update"
        );
    }

    let todo = command.apply(current, owner);
    set_performed_by(&mut tx, &owner.performed_by()).await?;

    let updated = sqlx::query_as::<_, Todo>(&format!(
        r#"
        UPDATE todos
        SET title = $2, description = $3, completed = $4, user_id = $5
        WHERE id = $1
        RETURNING {TODO_COLUMNS}
        "#
    ))
    .bind(todo.id)
    .bind(&todo.title)
    .bind(&todo.description)
    .bind(todo.completed)
    .bind(&todo.user_id)
    .fetch_one(&mut *tx)
    .await?;

    tx.commit().await?;

    tracing::info!(todo_id = updated.id, "Todo updated");
    Ok(updated)
}
