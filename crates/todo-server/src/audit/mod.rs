//! Trigger-based audit logging
//!
//! For each tracked table the logger provisions a `<table>_audit` table and
//! `AFTER INSERT/UPDATE/DELETE` row triggers. The database writes one audit
//! row per changed row, stamped with the performed-by value set on the
//! transaction that made the change.
//!
//! ```text
//! let mut tx = pool.begin().await?;
//! set_performed_by(&mut tx, &PerformedBy::new("alice")?).await?;
//! sqlx::query("DELETE FROM todos WHERE id = $1").bind(id).execute(&mut *tx).await?;
//! tx.commit().await?;
//! ```

pub mod context;
pub mod ddl;
pub mod descriptor;
pub mod error;
pub mod logger;
pub mod models;
pub mod queries;

pub use context::{current_performed_by, set_performed_by, PerformedBy, PERFORMED_BY_SETTING};
pub use descriptor::{AuditTarget, Audited, ColumnDef, EntityDescriptor};
pub use error::AuditError;
pub use logger::AuditLogger;
pub use models::{AuditOperation, AuditRecord};
pub use queries::audit_trail;
