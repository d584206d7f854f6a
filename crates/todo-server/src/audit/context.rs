//! Performed-by context
//!
//! The acting user is stored in a transaction-local PostgreSQL setting that
//! the trigger functions read. It only exists inside the transaction it was
//! set on, so a pooled connection never carries it into another request.

use sqlx::{PgConnection, Postgres, Transaction};

use super::error::AuditError;

/// Custom setting read by the generated trigger functions
pub const PERFORMED_BY_SETTING: &str = "todo_audit.performed_by";

/// Non-blank identifier of the user performing a mutation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PerformedBy(String);

impl PerformedBy {
    pub fn new(identifier: impl Into<String>) -> Result<Self, AuditError> {
        let identifier = identifier.into();
        if identifier.trim().is_empty() {
            return Err(AuditError::config("performed-by identifier cannot be empty"));
        }
        Ok(Self(identifier))
    }

    /// For identifiers already checked to be non-blank
    pub(crate) fn from_non_blank(identifier: String) -> Self {
        debug_assert!(!identifier.trim().is_empty());
        Self(identifier)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Stamp `tx` with the acting user for every audited change it makes
pub async fn set_performed_by(
    tx: &mut Transaction<'_, Postgres>,
    performed_by: &PerformedBy,
) -> Result<(), AuditError> {
    sqlx::query("SELECT set_config($1, $2, true)")
        .bind(PERFORMED_BY_SETTING)
        .bind(performed_by.as_str())
        .execute(&mut **tx)
        .await?;

    tracing::debug!(performed_by = %performed_by.as_str(), "Performed-by context set");
    Ok(())
}

/// Current performed-by value on `conn`, if any
pub async fn current_performed_by(conn: &mut PgConnection) -> Result<Option<String>, AuditError> {
    let value: Option<String> =
        sqlx::query_scalar("SELECT NULLIF(current_setting($1, true), '')")
            .bind(PERFORMED_BY_SETTING)
            .fetch_one(conn)
            .await?;
    Ok(value)
}
