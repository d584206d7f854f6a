use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::features::shared::UserId;
use crate::features::todos::models::{Todo, TODO_COLUMNS};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GetTodoQuery {
    pub id: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum GetTodoError {
    #[error("Todo not found")]
    NotFound,
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[tracing::instrument(skip(pool), fields(user_id = %owner))]
pub async fn handle(pool: PgPool, owner: &UserId, query: GetTodoQuery) -> Result<Todo, GetTodoError> {
    sqlx::query_as::<_, Todo>(&format!(
        "SELECT {TODO_COLUMNS} FROM todos WHERE id = $1 AND user_id = $2"
    ))
    .bind(query.id)
    .bind(owner.as_str())
    .fetch_optional(&pool)
    .await?
    .ok_or(GetTodoError::NotFound)
}
