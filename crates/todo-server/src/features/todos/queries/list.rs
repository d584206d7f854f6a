use sqlx::PgPool;

use crate::features::shared::UserId;
use crate::features::todos::models::{Todo, TODO_COLUMNS};

#[derive(Debug, thiserror::Error)]
pub enum ListTodosError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
}

/// Every todo owned by the caller, in id order
#[tracing::instrument(skip(pool), fields(user_id = %owner))]
pub async fn handle(pool: PgPool, owner: &UserId) -> Result<Vec<Todo>, ListTodosError> {
    let todos = sqlx::query_as::<_, Todo>(&format!(
        "SELECT {TODO_COLUMNS} FROM todos WHERE user_id = $1 ORDER BY id"
    ))
    .bind(owner.as_str())
    .fetch_all(&pool)
    .await?;

    Ok(todos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::todos::commands::create::{self, CreateTodoCommand};

    #[sqlx::test(migrations = "../../migrations")]
    async fn test_list_is_owner_scoped(pool: PgPool) -> sqlx::Result<()> {
        let alice = UserId::parse("alice").unwrap();
        let bob = UserId::parse("bob").unwrap();
        for title in ["a", "b"] {
            let command = CreateTodoCommand {
                title: Some(title.to_string()),
                ..Default::default()
            };
            create::handle(pool.clone(), &alice, command).await.unwrap();
        }
        create::handle(pool.clone(), &bob, CreateTodoCommand::default())
            .await
            .unwrap();

        let todos = handle(pool.clone(), &alice).await.unwrap();
        let titles: Vec<_> = todos.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["a", "b"]);
        assert!(todos.iter().all(|t| t.user_id == "alice"));

        let empty = handle(pool.clone(), &UserId::parse("carol").unwrap()).await.unwrap();
        assert!(empty.is_empty());
        Ok(())
    }
}
