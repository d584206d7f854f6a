//! Idempotent provisioning of audit tables and triggers

use sqlx::PgPool;
use std::collections::HashSet;
use tracing::{debug, info};

use super::ddl;
use super::descriptor::{AuditTarget, Audited, EntityDescriptor};
use super::error::AuditError;
use super::models::AuditOperation;

/// Owns the validated targets and provisions their audit objects
#[derive(Debug, Clone)]
pub struct AuditLogger {
    pool: PgPool,
    targets: Vec<AuditTarget>,
}

impl AuditLogger {
    /// Validate every descriptor; nothing is touched in the database yet
    pub fn new(pool: PgPool, descriptors: &[EntityDescriptor]) -> Result<Self, AuditError> {
        if descriptors.is_empty() {
            return Err(AuditError::config("at least one tracked table is required"));
        }

        let mut tables = HashSet::new();
        let mut targets = Vec::with_capacity(descriptors.len());
        for descriptor in descriptors {
            let target = AuditTarget::new(*descriptor)?;
            if !tables.insert(target.table()) {
                return Err(AuditError::config(format!(
                    "table '{}' is tracked twice",
                    target.table()
                )));
            }
            targets.push(target);
        }

        Ok(Self { pool, targets })
    }

    pub fn for_entity<T: Audited>(pool: PgPool) -> Result<Self, AuditError> {
        Self::new(pool, &[T::DESCRIPTOR])
    }

    pub fn targets(&self) -> &[AuditTarget] {
        &self.targets
    }

    /// Create the audit table and record index for every target
    #[tracing::instrument(skip(self))]
    pub async fn create_audit_table(&self) -> Result<(), AuditError> {
        for target in &self.targets {
            let mut tx = self.begin(target).await?;
            lock_table(&mut tx, target).await?;

            sqlx::query(&ddl::create_audit_table(target))
                .execute(&mut *tx)
                .await
                .map_err(|e| AuditError::schema(format!("table {}", target.audit_table()), e))?;

            sqlx::query(&ddl::create_audit_index(target))
                .execute(&mut *tx)
                .await
                .map_err(|e| AuditError::schema(format!("index {}", target.index_name()), e))?;

            tx.commit().await.map_err(|e| transaction_error(target, e))?;
            info!(table = target.table(), audit_table = target.audit_table(), "Audit table ready");
        }
        Ok(())
    }

    /// Install the trigger function and trigger for every operation
    #[tracing::instrument(skip(self))]
    pub async fn create_triggers(&self) -> Result<(), AuditError> {
        for target in &self.targets {
            let mut tx = self.begin(target).await?;
            lock_table(&mut tx, target).await?;

            for operation in AuditOperation::ALL {
                let function = target.function_name(operation);
                sqlx::query(&ddl::create_trigger_function(target, operation))
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| AuditError::schema(format!("function {}", function), e))?;

                let trigger = target.trigger_name(operation);
                let exists: bool = sqlx::query_scalar(ddl::TRIGGER_EXISTS_SQL)
                    .bind(&trigger)
                    .bind(target.table())
                    .fetch_one(&mut *tx)
                    .await
                    .map_err(|e| AuditError::schema(format!("trigger {}", trigger), e))?;

                if exists {
                    debug!(trigger = %trigger, "Trigger already installed");
                    continue;
                }

                sqlx::query(&ddl::create_trigger(target, operation))
                    .execute(&mut *tx)
                    .await
                    .map_err(|e| AuditError::schema(format!("trigger {}", trigger), e))?;
                debug!(trigger = %trigger, operation = %operation, "Trigger installed");
            }

            tx.commit().await.map_err(|e| transaction_error(target, e))?;
            info!(table = target.table(), "Audit triggers ready");
        }
        Ok(())
    }

    /// Table then triggers
    pub async fn provision(&self) -> Result<(), AuditError> {
        self.create_audit_table().await?;
        self.create_triggers().await
    }

    async fn begin(
        &self,
        target: &AuditTarget,
    ) -> Result<sqlx::Transaction<'static, sqlx::Postgres>, AuditError> {
        self.pool.begin().await.map_err(|e| transaction_error(target, e))
    }
}

fn transaction_error(target: &AuditTarget, source: sqlx::Error) -> AuditError {
    AuditError::schema(format!("transaction for {}", target.table()), source)
}

async fn lock_table(
    tx: &mut sqlx::Transaction<'_, sqlx::Postgres>,
    target: &AuditTarget,
) -> Result<(), AuditError> {
    sqlx::query(ddl::ADVISORY_LOCK_SQL)
        .bind(target.table())
        .execute(&mut **tx)
        .await
        .map_err(|e| AuditError::schema(format!("provisioning lock for {}", target.table()), e))?;
    Ok(())
}
