//! Reading audit trails

use sqlx::PgPool;

use super::ddl::quote_ident;
use super::descriptor::AuditTarget;
use super::error::AuditError;
use super::models::AuditRecord;

/// Audit records of one tracked row, oldest first
///
/// With `owner`, only records whose mirrored owner column matches are
/// returned. Targets without an owner column ignore it.
pub async fn audit_trail(
    pool: &PgPool,
    target: &AuditTarget,
    record_id: i64,
    owner: Option<&str>,
) -> Result<Vec<AuditRecord>, AuditError> {
    let descriptor = target.descriptor();
    let owner_filter = match (owner, descriptor.owner_column) {
        (Some(_), Some(column)) => format!(" AND {} = $2", quote_ident(column)),
        _ => String::new(),
    };

    let sql = format!(
        r#"
        SELECT audit_id,
               audit_operation AS operation,
               audit_performed_by AS performed_by,
               audit_at AS changed_at,
               audit_old AS old_values,
               audit_new AS new_values
        FROM {audit_table}
        WHERE {pk} = $1{owner_filter}
        ORDER BY audit_id ASC
        "#,
        audit_table = quote_ident(target.audit_table()),
        pk = quote_ident(descriptor.primary_key),
        owner_filter = owner_filter,
    );

    let mut query = sqlx::query_as::<_, AuditRecord>(&sql).bind(record_id);
    if !owner_filter.is_empty() {
        query = query.bind(owner);
    }

    Ok(query.fetch_all(pool).await?)
}
