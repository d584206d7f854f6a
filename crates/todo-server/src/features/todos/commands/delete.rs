//! Delete todo command

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::audit::{set_performed_by, AuditError};
use crate::features::shared::UserId;

/// Command to delete one of the caller's todos
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteTodoCommand {
    pub id: i64,
}

/// Errors that can occur when deleting a todo
#[derive(Debug, thiserror::Error)]
pub enum DeleteTodoError {
    /// No todo with this id belongs to the caller
    #[error("Todo not found")]
    NotFound(i64),
    #[error("Failed to set audit context: {0}")]
    Audit(#[from] AuditError),
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Delete the todo if the caller owns it
///
/// A todo owned by someone else is left intact and reported as `NotFound`.
#[tracing::instrument(skip(pool), fields(user_id = %owner, todo_id = command.id))]
pub async fn handle(
    pool: PgPool,
    owner: &UserId,
    command: DeleteTodoCommand,
) -> Result<(), DeleteTodoError> {
    let mut tx = pool.begin().await?;
    set_performed_by(&mut tx, &owner.performed_by()).await?;

    let result = sqlx::query("DELETE FROM todos WHERE id = $1 AND user_id = $2")
        .bind(command.id)
        .bind(owner.as_str())
        .execute(&mut *tx)
        .await?;

    if result.rows_affected() == 0 {
        tx.rollback().await?;
        return Err(DeleteTodoError::NotFound(command.id));
    }

    tx.commit().await?;

    tracing::info!(todo_id = command.id, "Todo deleted");
    Ok(())
}
