//! Todo row type

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use crate::audit::{Audited, ColumnDef, EntityDescriptor};

/// A todo owned by one user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Todo {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub completed: bool,
    pub user_id: String,
}

/// Column list shared by every statement returning a [`Todo`]
pub(crate) const TODO_COLUMNS: &str = "id, title, description, completed, user_id";

impl Audited for Todo {
    const DESCRIPTOR: EntityDescriptor = EntityDescriptor {
        table: "todos",
        primary_key: "id",
        owner_column: Some("user_id"),
        columns: &[
            ColumnDef::new("id", "BIGINT"),
            ColumnDef::new("title", "TEXT"),
            ColumnDef::new("description", "TEXT"),
            ColumnDef::new("completed", "BOOLEAN"),
            ColumnDef::new("user_id", "TEXT"),
        ],
    };
}
