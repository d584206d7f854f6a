//! DDL generation for audit tables, trigger functions, and triggers
//!
//! Every statement is derived from a validated [`AuditTarget`] and is safe to
//! run repeatedly: tables and indexes use `IF NOT EXISTS`, functions use
//! `CREATE OR REPLACE`. `CREATE TRIGGER` has no such form on older servers, so
//! callers check [`TRIGGER_EXISTS_SQL`] first.

use super::context::PERFORMED_BY_SETTING;
use super::descriptor::AuditTarget;
use super::models::AuditOperation;

/// `$1` trigger name, `$2` table name
pub const TRIGGER_EXISTS_SQL: &str = r#"
SELECT EXISTS (
    SELECT 1
    FROM pg_catalog.pg_trigger t
    JOIN pg_catalog.pg_class c ON c.oid = t.tgrelid
    WHERE t.tgname = $1
      AND c.relname = $2
      AND pg_catalog.pg_table_is_visible(c.oid)
      AND NOT t.tgisinternal
)
"#;

/// Serializes provisioning of one table across processes until commit
pub const ADVISORY_LOCK_SQL: &str = "SELECT pg_advisory_xact_lock(hashtext($1))";

/// Quote an identifier for interpolation into DDL
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub fn create_audit_table(target: &AuditTarget) -> String {
    let mut columns = vec![
        "    audit_id BIGSERIAL PRIMARY KEY".to_string(),
        "    audit_operation TEXT NOT NULL CHECK (audit_operation IN ('INSERT', 'UPDATE', 'DELETE'))"
            .to_string(),
        "    audit_performed_by TEXT".to_string(),
        "    audit_at TIMESTAMPTZ NOT NULL DEFAULT clock_timestamp()".to_string(),
        "    audit_old JSONB".to_string(),
        "    audit_new JSONB".to_string(),
    ];
    columns.extend(
        target
            .descriptor()
            .columns
            .iter()
            .map(|c| format!("    {} {}", quote_ident(c.name), c.sql_type.trim())),
    );

    format!(
        "CREATE TABLE IF NOT EXISTS {} (\n{}\n)",
        quote_ident(target.audit_table()),
        columns.join(",\n")
    )
}

/// Index on the mirrored primary key so trails are read in audit order
pub fn create_audit_index(target: &AuditTarget) -> String {
    format!(
        "CREATE INDEX IF NOT EXISTS {} ON {} ({}, audit_id)",
        quote_ident(&target.index_name()),
        quote_ident(target.audit_table()),
        quote_ident(target.descriptor().primary_key)
    )
}

pub fn create_trigger_function(target: &AuditTarget, operation: AuditOperation) -> String {
    let image = operation.row_image();
    let columns = &target.descriptor().columns;

    let mut names = vec![
        "audit_operation".to_string(),
        "audit_performed_by".to_string(),
        "audit_old".to_string(),
        "audit_new".to_string(),
    ];
    names.extend(columns.iter().map(|c| quote_ident(c.name)));

    let (old, new) = match operation {
        AuditOperation::Insert => ("NULL", "to_jsonb(NEW)"),
        AuditOperation::Update => ("to_jsonb(OLD)", "to_jsonb(NEW)"),
        AuditOperation::Delete => ("to_jsonb(OLD)", "NULL"),
    };
    let mut values = vec![
        format!("'{}'", operation.as_str()),
        format!("NULLIF(current_setting('{}', true), '')", PERFORMED_BY_SETTING),
        old.to_string(),
        new.to_string(),
    ];
    values.extend(
        columns
            .iter()
            .map(|c| format!("{}.{}", image, quote_ident(c.name))),
    );

    format!(
        "CREATE OR REPLACE FUNCTION {function}() RETURNS trigger\n\
         LANGUAGE plpgsql AS $audit$\n\
         BEGIN\n    \
             INSERT INTO {audit_table} ({names})\n    \
             VALUES ({values});\n    \
             RETURN NULL;\n\
         END;\n\
         $audit$",
        function = quote_ident(&target.function_name(operation)),
        audit_table = quote_ident(target.audit_table()),
        names = names.join(", "),
        values = values.join(", "),
    )
}

pub fn create_trigger(target: &AuditTarget, operation: AuditOperation) -> String {
    format!(
        "CREATE TRIGGER {} AFTER {} ON {} FOR EACH ROW EXECUTE FUNCTION {}()",
        quote_ident(&target.trigger_name(operation)),
        operation.as_str(),
        quote_ident(target.table()),
        quote_ident(&target.function_name(operation))
    )
}
