//! Audit logger errors

use thiserror::Error;

#[derive(Debug, Error)]
pub enum AuditError {
    /// An entity descriptor cannot be turned into audit DDL
    #[error("Audit configuration error: {0}")]
    Configuration(String),

    /// Creating an audit table, index, trigger function, or trigger failed
    #[error("Failed to provision {object}: {source}")]
    Schema {
        object: String,
        #[source]
        source: sqlx::Error,
    },

    /// Setting the performed-by context or reading audit records failed
    #[error("Audit database error: {0}")]
    Database(#[from] sqlx::Error),
}

impl AuditError {
    pub(crate) fn config(message: impl Into<String>) -> Self {
        Self::Configuration(message.into())
    }

    pub(crate) fn schema(object: impl Into<String>, source: sqlx::Error) -> Self {
        Self::Schema {
            object: object.into(),
            source,
        }
    }
}
