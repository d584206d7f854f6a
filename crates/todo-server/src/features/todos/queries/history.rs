//! Audit trail of one todo
//!
//! Only records whose mirrored owner is the caller are returned, so a todo
//! handed over by an update shows each owner their own part of its history.

use serde::{Deserialize, Serialize};
use sqlx::PgPool;

use crate::audit::{audit_trail, AuditError, AuditRecord, AuditTarget};
use crate::features::shared::UserId;
use crate::features::todos::models::Todo;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TodoHistoryQuery {
    pub id: i64,
}

#[derive(Debug, thiserror::Error)]
pub enum TodoHistoryError {
    #[error("Todo not found")]
    NotFound,
    #[error("Audit error: {0}")]
    Audit(#[from] AuditError),
}

#[tracing::instrument(skip(pool), fields(user_id = %owner))]
pub async fn handle(
    pool: PgPool,
    owner: &UserId,
    query: TodoHistoryQuery,
) -> Result<Vec<AuditRecord>, TodoHistoryError> {
    let target = AuditTarget::for_entity::<Todo>()?;
    let records = audit_trail(&pool, &target, query.id, Some(owner.as_str())).await?;

    if records.is_empty() {
        return Err(TodoHistoryError::NotFound);
    }
    Ok(records)
}
