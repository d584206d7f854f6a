//! Todo API routes
//!
//! # Route Structure
//!
//! - `POST /todos` - Create a todo owned by the caller
//! - `GET /todos` - List the caller's todos
//! - `GET /todos/:id` - Get one of the caller's todos
//! - `PUT /todos/:id` - Update a todo
//! - `DELETE /todos/:id` - Delete one of the caller's todos
//! - `GET /todos/:id/history` - Audit trail of a todo
//!
//! Every path under `/todos`, matched or not, requires the `User-ID` header;
//! requests without it are rejected with `401` before any handler runs.
//! Request bodies are read as JSON whatever their `Content-Type`.
//!
//! ```rust,ignore
//! let app = Router::new()
//!     .nest("/todos", todos_routes())
//!     .with_state(pool);
//! ```

use axum::{
    body::Bytes,
    extract::{Path, State},
    http::StatusCode,
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::de::DeserializeOwned;
use sqlx::PgPool;

use super::{
    commands::{
        create, delete, update, CreateTodoCommand, CreateTodoError, DeleteTodoCommand,
        DeleteTodoError, UpdateTodoCommand, UpdateTodoError,
    },
    queries::{
        get as get_query, history, list, GetTodoError, GetTodoQuery, ListTodosError,
        TodoHistoryError, TodoHistoryQuery,
    },
};
use crate::api::response::{ErrorResponse, MessageResponse};
use crate::error::AppError;
use crate::features::shared::UserId;
use crate::middleware::require_user_id;

// ============================================================================
// Router Configuration
// ============================================================================

pub fn todos_routes() -> Router<PgPool> {
    Router::new()
        .route("/", get(list_todos).post(create_todo))
        .route("/:id", get(get_todo).put(update_todo).delete(delete_todo))
        .route("/:id/history", get(todo_history))
        .fallback(unknown_todo_route)
        .layer(middleware::from_fn(require_user_id))
}

/// Unmatched paths under `/todos` still pass through the `User-ID` guard
async fn unknown_todo_route() -> AppError {
    AppError::NotFound("Route not found".to_string())
}

/// Ids are database serials; anything that is not one cannot match a row
fn parse_id(raw: &str) -> Result<i64, TodoApiError> {
    raw.parse::<i64>().map_err(|_| TodoApiError::NotFound)
}

/// Decode a JSON request body whatever its `Content-Type`
///
/// A literal `null` body yields the payload's defaults.
fn decode_payload<T: DeserializeOwned + Default>(body: &[u8]) -> Result<T, TodoApiError> {
    serde_json::from_slice::<Option<T>>(body)
        .map(Option::unwrap_or_default)
        .map_err(|e| TodoApiError::InvalidPayload(e.to_string()))
}

// ============================================================================
// Command Handlers (Write Operations)
// ============================================================================

/// `201 Created` with the stored todo, `400` on a malformed payload
#[tracing::instrument(skip(pool, body), fields(user_id = %user))]
async fn create_todo(
    State(pool): State<PgPool>,
    user: UserId,
    body: Bytes,
) -> Result<Response, TodoApiError> {
    let command: CreateTodoCommand = decode_payload(&body)?;
    let todo = create::handle(pool, &user, command).await?;

    Ok((StatusCode::CREATED, Json(todo)).into_response())
}

/// `200 OK` with the updated todo
///
/// A missing todo is reported as `404` even when the payload is also
/// malformed.
#[tracing::instrument(skip(pool, body), fields(user_id = %user, todo_id = %id))]
async fn update_todo(
    State(pool): State<PgPool>,
    user: UserId,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, TodoApiError> {
    let id = parse_id(&id)?;

    let mut command = match decode_payload::<UpdateTodoCommand>(&body) {
        Ok(command) => command,
        Err(err) => {
            if !update::exists(&pool, id).await? {
                return Err(UpdateTodoError::NotFound(id).into());
            }
            return Err(err);
        },
    };
    command.id = id;

    let todo = update::handle(pool, &user, command).await?;

    Ok((StatusCode::OK, Json(todo)).into_response())
}

#[tracing::instrument(skip(pool), fields(user_id = %user, todo_id = %id))]
async fn delete_todo(
    State(pool): State<PgPool>,
    user: UserId,
    Path(id): Path<String>,
) -> Result<Response, TodoApiError> {
    let command = DeleteTodoCommand { id: parse_id(&id)? };
    delete::handle(pool, &user, command).await?;

    Ok((StatusCode::OK, Json(MessageResponse::new("Todo deleted successfully"))).into_response())
}

// ============================================================================
// Query Handlers (Read Operations)
// ============================================================================

#[tracing::instrument(skip(pool), fields(user_id = %user))]
async fn list_todos(State(pool): State<PgPool>, user: UserId) -> Result<Response, TodoApiError> {
    let todos = list::handle(pool, &user).await?;

    tracing::debug!(count = todos.len(), "Todos listed via API");

    Ok((StatusCode::OK, Json(todos)).into_response())
}

#[tracing::instrument(skip(pool), fields(user_id = %user, todo_id = %id))]
async fn get_todo(
    State(pool): State<PgPool>,
    user: UserId,
    Path(id): Path<String>,
) -> Result<Response, TodoApiError> {
    let query = GetTodoQuery { id: parse_id(&id)? };
    let todo = get_query::handle(pool, &user, query).await?;

    Ok((StatusCode::OK, Json(todo)).into_response())
}

#[tracing::instrument(skip(pool), fields(user_id = %user, todo_id = %id))]
async fn todo_history(
    State(pool): State<PgPool>,
    user: UserId,
    Path(id): Path<String>,
) -> Result<Response, TodoApiError> {
    let query = TodoHistoryQuery { id: parse_id(&id)? };
    let records = history::handle(pool, &user, query).await?;

    tracing::debug!(count = records.len(), "Todo history retrieved via API");

    Ok((StatusCode::OK, Json(records)).into_response())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Unified error type for todo API endpoints
#[derive(Debug, thiserror::Error)]
enum TodoApiError {
    #[error("Todo not found")]
    NotFound,
    #[error("Invalid request body: {0}")]
    InvalidPayload(String),
    #[error(transparent)]
    Create(#[from] CreateTodoError),
    #[error(transparent)]
    Update(#[from] UpdateTodoError),
    #[error(transparent)]
    Delete(#[from] DeleteTodoError),
    #[error(transparent)]
    Get(#[from] GetTodoError),
    #[error(transparent)]
    List(#[from] ListTodosError),
    #[error(transparent)]
    History(#[from] TodoHistoryError),
}

impl IntoResponse for TodoApiError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            TodoApiError::NotFound
            | TodoApiError::Update(UpdateTodoError::NotFound(_))
            | TodoApiError::Delete(DeleteTodoError::NotFound(_))
            | TodoApiError::Get(GetTodoError::NotFound)
            | TodoApiError::History(TodoHistoryError::NotFound) => {
                (StatusCode::NOT_FOUND, "NOT_FOUND")
            },
            TodoApiError::InvalidPayload(_) => (StatusCode::BAD_REQUEST, "BAD_REQUEST"),
            _ => {
                tracing::error!(error = %self, "Todo request failed");
                let error = ErrorResponse::new("INTERNAL_ERROR", "A database error occurred");
                return error.into_response_with(StatusCode::INTERNAL_SERVER_ERROR);
            },
        };

        ErrorResponse::new(code, self.to_string()).into_response_with(status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_routes_structure() {
        let _router: Router<PgPool> = todos_routes();
    }

    #[test]
    fn test_parse_id() {
        assert_eq!(parse_id("42").unwrap(), 42);
        assert!(matches!(parse_id("abc"), Err(TodoApiError::NotFound)));
        assert!(matches!(parse_id(""), Err(TodoApiError::NotFound)));
    }

    #[test]
    fn test_decode_payload() {
        let command: CreateTodoCommand = decode_payload(br#"{"title": "x"}"#).unwrap();
        assert_eq!(command.title.as_deref(), Some("x"));

        let command: CreateTodoCommand = decode_payload(b"null").unwrap();
        assert!(command.title.is_none() && command.completed.is_none());

        let command: UpdateTodoCommand = decode_payload(b" null ").unwrap();
        assert!(command.title.is_none());

        let malformed: [&[u8]; 4] = [b"", b"{\"title\": ", b"{\"completed\": 1}", b"\"x\""];
        for body in malformed {
            assert!(matches!(
                decode_payload::<CreateTodoCommand>(body),
                Err(TodoApiError::InvalidPayload(_))
            ));
        }
    }

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (TodoApiError::NotFound, StatusCode::NOT_FOUND),
            (TodoApiError::InvalidPayload("x".into()), StatusCode::BAD_REQUEST),
            (UpdateTodoError::NotFound(1).into(), StatusCode::NOT_FOUND),
            (DeleteTodoError::NotFound(1).into(), StatusCode::NOT_FOUND),
            (GetTodoError::NotFound.into(), StatusCode::NOT_FOUND),
            (TodoHistoryError::NotFound.into(), StatusCode::NOT_FOUND),
            (
                ListTodosError::Database(sqlx::Error::PoolTimedOut).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
            (
                CreateTodoError::Database(sqlx::Error::PoolClosed).into(),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }

    #[test]
    fn test_error_display() {
        assert_eq!(TodoApiError::NotFound.to_string(), "Todo not found");
        assert_eq!(
            TodoApiError::from(GetTodoError::NotFound).to_string(),
            "Todo not found"
        );
    }
}
