//! Tracked entity descriptors
//!
//! A descriptor names the tracked table, its primary key, its owner column,
//! and the storage type of every column. [`AuditTarget`] is a descriptor that
//! passed validation, together with the object names derived from it.

use std::collections::HashSet;

use super::error::AuditError;
use super::models::AuditOperation;

/// PostgreSQL truncates identifiers longer than this many bytes
pub const MAX_IDENTIFIER_LEN: usize = 63;

/// Column names starting with this prefix are reserved for audit metadata
pub const RESERVED_PREFIX: &str = "audit_";

/// One column of a tracked table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnDef {
    pub name: &'static str,
    /// Storage type used for the mirror column, e.g. `BIGINT` or `TEXT`
    pub sql_type: &'static str,
}

impl ColumnDef {
    pub const fn new(name: &'static str, sql_type: &'static str) -> Self {
        Self { name, sql_type }
    }
}

/// Static description of a tracked table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EntityDescriptor {
    pub table: &'static str,
    pub primary_key: &'static str,
    /// Column holding the owning user, if rows are owner-scoped
    pub owner_column: Option<&'static str>,
    pub columns: &'static [ColumnDef],
}

/// Implemented by row types whose table is audited
pub trait Audited {
    const DESCRIPTOR: EntityDescriptor;
}

/// A validated descriptor plus the names of its audit objects
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditTarget {
    descriptor: EntityDescriptor,
    audit_table: String,
}

impl AuditTarget {
    /// Validate `descriptor` and derive its audit object names
    ///
    /// # Errors
    ///
    /// `AuditError::Configuration` if the table name or primary key is missing
    /// or malformed, a column is duplicated, uses the reserved `audit_` prefix,
    /// has an unusable SQL type, or a derived name exceeds
    /// [`MAX_IDENTIFIER_LEN`].
    pub fn new(descriptor: EntityDescriptor) -> Result<Self, AuditError> {
        validate_identifier(descriptor.table, "table name")?;

        if descriptor.columns.is_empty() {
            return Err(AuditError::config(format!(
                "table '{}' declares no columns",
                descriptor.table
            )));
        }

        let mut seen = HashSet::new();
        for column in descriptor.columns {
            validate_identifier(column.name, "column name")?;
            if column.name.starts_with(RESERVED_PREFIX) {
                return Err(AuditError::config(format!(
                    "column '{}.{}' uses the reserved '{}' prefix",
                    descriptor.table, column.name, RESERVED_PREFIX
                )));
            }
            if !seen.insert(column.name) {
                return Err(AuditError::config(format!(
                    "column '{}.{}' is declared twice",
                    descriptor.table, column.name
                )));
            }
            validate_sql_type(descriptor.table, column)?;
        }

        if descriptor.primary_key.is_empty() {
            return Err(AuditError::config(format!(
                "table '{}' has no primary key",
                descriptor.table
            )));
        }
        if !seen.contains(descriptor.primary_key) {
            return Err(AuditError::config(format!(
                "primary key '{}' is not a column of '{}'",
                descriptor.primary_key, descriptor.table
            )));
        }
        if let Some(owner) = descriptor.owner_column {
            if !seen.contains(owner) {
                return Err(AuditError::config(format!(
                    "owner column '{}' is not a column of '{}'",
                    owner, descriptor.table
                )));
            }
        }

        let target = Self {
            audit_table: format!("{}_audit", descriptor.table),
            descriptor,
        };

        for name in target.derived_names() {
            if name.len() > MAX_IDENTIFIER_LEN {
                return Err(AuditError::config(format!(
                    "derived name '{}' exceeds {} bytes; shorten table '{}'",
                    name, MAX_IDENTIFIER_LEN, descriptor.table
                )));
            }
        }

        Ok(target)
    }

    pub fn for_entity<T: Audited>() -> Result<Self, AuditError> {
        Self::new(T::DESCRIPTOR)
    }

    pub fn descriptor(&self) -> &EntityDescriptor {
        &self.descriptor
    }

    pub fn table(&self) -> &'static str {
        self.descriptor.table
    }

    pub fn audit_table(&self) -> &str {
        &self.audit_table
    }

    pub fn index_name(&self) -> String {
        format!("{}_record_idx", self.audit_table)
    }

    pub fn trigger_name(&self, operation: AuditOperation) -> String {
        format!("{}_{}", self.audit_table, operation.suffix())
    }

    pub fn function_name(&self, operation: AuditOperation) -> String {
        format!("{}_{}_fn", self.audit_table, operation.suffix())
    }

    fn derived_names(&self) -> Vec<String> {
        let mut names = vec![self.audit_table.clone(), self.index_name()];
        for operation in AuditOperation::ALL {
            names.push(self.trigger_name(operation));
            names.push(self.function_name(operation));
        }
        names
    }
}

/// Lowercase ASCII letters, digits, and underscores; not starting with a digit
fn validate_identifier(name: &str, what: &str) -> Result<(), AuditError> {
    if name.is_empty() {
        return Err(AuditError::config(format!("{} is required", what)));
    }
    if name.len() > MAX_IDENTIFIER_LEN {
        return Err(AuditError::config(format!(
            "{} '{}' exceeds {} bytes",
            what, name, MAX_IDENTIFIER_LEN
        )));
    }
    if name.starts_with(|c: char| c.is_ascii_digit()) {
        return Err(AuditError::config(format!("{} '{}' cannot start with a digit", what, name)));
    }
    if !name
        .chars()
        .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
    {
        return Err(AuditError::config(format!(
            "{} '{}' may only contain lowercase letters, digits, and underscores",
            what, name
        )));
    }
    Ok(())
}

fn validate_sql_type(table: &str, column: &ColumnDef) -> Result<(), AuditError> {
    let sql_type = column.sql_type.trim();
    if sql_type.is_empty() {
        return Err(AuditError::config(format!(
            "column '{}.{}' has no SQL type",
            table, column.name
        )));
    }
    if !sql_type
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, ' ' | '_' | '(' | ')' | ','))
    {
        return Err(AuditError::config(format!(
            "column '{}.{}' has an unsupported SQL type '{}'",
            table, column.name, sql_type
        )));
    }
    // Mirror columns must not own sequences.
    if sql_type.to_ascii_lowercase().contains("serial") {
        return Err(AuditError::config(format!(
            "column '{}.{}' must use the underlying integer type instead of '{}'",
            table, column.name, sql_type
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const COLUMNS: &[ColumnDef] = &[
        ColumnDef::new("id", "BIGINT"),
        ColumnDef::new("body", "TEXT"),
        ColumnDef::new("owner", "TEXT"),
    ];

    fn descriptor() -> EntityDescriptor {
        EntityDescriptor {
            table: "notes",
            primary_key: "id",
            owner_column: Some("owner"),
            columns: COLUMNS,
        }
    }

    fn config_error(descriptor: EntityDescriptor) -> String {
        match AuditTarget::new(descriptor) {
            Err(AuditError::Configuration(message)) => message,
            other => panic!("expected configuration error, got {:?}", other),
        }
    }

    #[test]
    fn test_valid_descriptor_derives_names() {
        let target = AuditTarget::new(descriptor()).unwrap();
        assert_eq!(target.table(), "notes");
        assert_eq!(target.audit_table(), "notes_audit");
        assert_eq!(target.index_name(), "notes_audit_record_idx");
        assert_eq!(target.trigger_name(AuditOperation::Insert), "notes_audit_insert");
        assert_eq!(target.function_name(AuditOperation::Delete), "notes_audit_delete_fn");
    }

    #[test]
    fn test_missing_table_name() {
        let message = config_error(EntityDescriptor { table: "", ..descriptor() });
        assert!(message.contains("table name is required"));
    }

    #[test]
    fn test_missing_primary_key() {
        let message = config_error(EntityDescriptor { primary_key: "", ..descriptor() });
        assert!(message.contains("no primary key"));
    }

    #[test]
    fn test_primary_key_must_be_a_column() {
        let message = config_error(EntityDescriptor { primary_key: "uuid", ..descriptor() });
        assert!(message.contains("primary key 'uuid'"));
    }

    #[test]
    fn test_owner_column_must_be_a_column() {
        let message = config_error(EntityDescriptor {
            owner_column: Some("user_id"),
            ..descriptor()
        });
        assert!(message.contains("owner column 'user_id'"));
    }

    #[test]
    fn test_malformed_identifiers() {
        for table in ["Notes", "notes;drop", "1notes", "no tes", "\"notes\""] {
            assert!(
                AuditTarget::new(EntityDescriptor { table, ..descriptor() }).is_err(),
                "table '{}' should be rejected",
                table
            );
        }
    }

    #[test]
    fn test_reserved_prefix_rejected() {
        const CLASH: &[ColumnDef] = &[ColumnDef::new("id", "BIGINT"), ColumnDef::new("audit_at", "TEXT")];
        let message = config_error(EntityDescriptor {
            columns: CLASH,
            owner_column: None,
            ..descriptor()
        });
        assert!(message.contains("reserved"));
    }

    #[test]
    fn test_duplicate_column_rejected() {
        const DUPES: &[ColumnDef] = &[ColumnDef::new("id", "BIGINT"), ColumnDef::new("id", "TEXT")];
        let message = config_error(EntityDescriptor {
            columns: DUPES,
            owner_column: None,
            ..descriptor()
        });
        assert!(message.contains("declared twice"));
    }

    #[test]
    fn test_sql_type_rules() {
        const SERIAL: &[ColumnDef] = &[ColumnDef::new("id", "BIGSERIAL")];
        const INJECTED: &[ColumnDef] = &[ColumnDef::new("id", "TEXT); DROP TABLE x; --")];
        const NUMERIC: &[ColumnDef] = &[ColumnDef::new("id", "NUMERIC(10, 2)")];

        let base = EntityDescriptor {
            owner_column: None,
            ..descriptor()
        };
        assert!(config_error(EntityDescriptor { columns: SERIAL, ..base }).contains("underlying integer"));
        assert!(config_error(EntityDescriptor { columns: INJECTED, ..base }).contains("unsupported"));
        assert!(AuditTarget::new(EntityDescriptor { columns: NUMERIC, ..base }).is_ok());
    }

    #[test]
    fn test_derived_name_length_limit() {
        // 46 bytes + "_audit_record_idx" is exactly 63
        let fits: &'static str = Box::leak("t".repeat(46).into_boxed_str());
        assert!(AuditTarget::new(EntityDescriptor { table: fits, ..descriptor() }).is_ok());

        let too_long: &'static str = Box::leak("t".repeat(47).into_boxed_str());
        let message = config_error(EntityDescriptor { table: too_long, ..descriptor() });
        assert!(message.contains("exceeds"));
    }
}
