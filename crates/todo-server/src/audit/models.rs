//! Audit record types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use sqlx::FromRow;
use std::fmt;

/// Row-level operation that produced an audit record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AuditOperation {
    Insert,
    Update,
    Delete,
}

impl AuditOperation {
    pub const ALL: [AuditOperation; 3] = [Self::Insert, Self::Update, Self::Delete];

    /// Value stored in `audit_operation`, matching `TG_OP`
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Insert => "INSERT",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }

    /// Suffix used in trigger and function names
    pub fn suffix(&self) -> &'static str {
        match self {
            Self::Insert => "insert",
            Self::Update => "update",
            Self::Delete => "delete",
        }
    }

    /// Which row image the mirrored columns are copied from
    pub fn row_image(&self) -> &'static str {
        match self {
            Self::Insert | Self::Update => "NEW",
            Self::Delete => "OLD",
        }
    }
}

impl fmt::Display for AuditOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for AuditOperation {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "INSERT" => Ok(Self::Insert),
            "UPDATE" => Ok(Self::Update),
            "DELETE" => Ok(Self::Delete),
            _ => Err(format!("Invalid audit operation: {}", s)),
        }
    }
}

/// One entry of an audit trail
///
/// `old_values` is absent for inserts and `new_values` for deletes.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct AuditRecord {
    pub audit_id: i64,
    pub operation: String,
    pub performed_by: Option<String>,
    pub changed_at: DateTime<Utc>,
    pub old_values: Option<JsonValue>,
    pub new_values: Option<JsonValue>,
}

impl AuditRecord {
    pub fn operation(&self) -> Option<AuditOperation> {
        self.operation.parse().ok()
    }
}
