//! Per-engine seams
//!
//! One implementation per engine variant is chosen when a catalog is built
//! and used through these traits from then on.

use schemata_types::{
    ConstraintKind, ConstraintSet, Engine, ForeignKey, ServerVersion, TableName, TableSchema,
};

use crate::connection::Connection;
use crate::error::{Result, SchemaError};
use crate::row::CaseFolding;

// ============================================================================
// Quoting
// ============================================================================

/// Engine identifier and string quoting
pub trait Quoter {
    /// Longest identifier the engine accepts, in characters
    fn max_identifier_len(&self) -> usize;

    /// Quote one identifier segment, escaping embedded quote characters
    fn quote_simple_identifier(&self, name: &str) -> String;

    /// Quote a string literal for embedding in introspection SQL
    fn quote_string(&self, value: &str) -> String;

    /// Validate then quote an identifier
    fn quote_identifier(&self, name: &str) -> Result<String> {
        validate_identifier(name, self.max_identifier_len())?;
        Ok(self.quote_simple_identifier(name))
    }

    /// Quote a possibly schema-qualified table name
    fn quote_table_name(&self, table: &TableName) -> Result<String> {
        let name = self.quote_identifier(&table.name)?;
        match &table.schema {
            Some(schema) => Ok(format!("{}.{}", self.quote_identifier(schema)?, name)),
            None => Ok(name),
        }
    }

    /// Quote a list of column names as `a, b, c`; the list must be non-empty
    fn quote_column_list(&self, columns: &[&str]) -> Result<String> {
        if columns.is_empty() {
            return Err(SchemaError::InvalidArgument(
                "column list must not be empty".into(),
            ));
        }
        let quoted = columns
            .iter()
            .map(|c| self.quote_identifier(c))
            .collect::<Result<Vec<_>>>()?;
        Ok(quoted.join(", "))
    }
}

/// Reject names no engine could quote: empty, containing NUL, or too long
pub fn validate_identifier(name: &str, max_len: usize) -> Result<()> {
    if name.trim().is_empty() {
        return Err(SchemaError::InvalidIdentifier(
            "identifier must not be empty".into(),
        ));
    }
    if name.contains('\0') {
        return Err(SchemaError::InvalidIdentifier(format!(
            "identifier {name:?} contains a NUL character"
        )));
    }
    let len = name.chars().count();
    if len > max_len {
        return Err(SchemaError::InvalidIdentifier(format!(
            "identifier {name:?} is {len} characters long, the limit is {max_len}"
        )));
    }
    Ok(())
}

// ============================================================================
// Loading
// ============================================================================

/// Reads table metadata through a connection
pub trait SchemaLoader {
    /// Load the columns, primary key and foreign keys of `table`;
    /// `Ok(None)` when the table does not exist
    fn load_table_schema(
        &self,
        conn: &dyn Connection,
        table: &TableName,
        folding: CaseFolding,
    ) -> Result<Option<TableSchema>>;

    /// Load one kind of constraint. An engine that cannot report `kind` at
    /// all fails with [`SchemaError::NotSupported`].
    fn load_constraints(
        &self,
        conn: &dyn Connection,
        table: &TableName,
        kind: ConstraintKind,
        folding: CaseFolding,
    ) -> Result<ConstraintSet>;
}

// ============================================================================
// DDL fragments
// ============================================================================

/// Builds `ALTER TABLE` / `CREATE INDEX` statements
///
/// All methods are pure string assembly. Identifiers are validated and
/// quoted here; expressions are passed through untouched apart from an
/// emptiness check. The provided methods use the portable
/// `ADD CONSTRAINT` / `DROP CONSTRAINT` forms and engines override the ones
/// they spell differently.
pub trait DdlBuilder: Quoter {
    /// `ALTER TABLE t ADD CONSTRAINT n CHECK (expr)`; `enforce = false` needs
    /// engine support for non-enforced checks
    fn add_check(
        &self,
        name: &str,
        table: &TableName,
        expression: &str,
        enforce: bool,
    ) -> Result<String>;

    fn drop_check(&self, name: &str, table: &TableName) -> Result<String> {
        self.drop_constraint(name, table)
    }

    fn add_primary_key(&self, name: &str, table: &TableName, columns: &[&str]) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} PRIMARY KEY ({})",
            self.quote_table_name(table)?,
            self.quote_identifier(name)?,
            self.quote_column_list(columns)?
        ))
    }

    fn drop_primary_key(&self, name: &str, table: &TableName) -> Result<String> {
        self.drop_constraint(name, table)
    }

    /// The foreign key must be named
    fn add_foreign_key(&self, table: &TableName, fk: &ForeignKey) -> Result<String> {
        fk.validate()
            .map_err(|e| SchemaError::InvalidArgument(e.to_string()))?;
        let name = fk
            .name()
            .ok_or_else(|| SchemaError::InvalidArgument("foreign key needs a name".into()))?;
        let columns: Vec<&str> = fk.columns.iter().map(|c| c.as_ref()).collect();
        let foreign_columns: Vec<&str> = fk.foreign_columns.iter().map(|c| c.as_ref()).collect();
        let foreign_table = TableName {
            schema: fk.foreign_schema.clone(),
            name: fk.foreign_table.clone(),
        };

        let mut sql = format!(
            "ALTER TABLE {} ADD CONSTRAINT {} FOREIGN KEY ({}) REFERENCES {} ({})",
            self.quote_table_name(table)?,
            self.quote_identifier(name)?,
            self.quote_column_list(&columns)?,
            self.quote_table_name(&foreign_table)?,
            self.quote_column_list(&foreign_columns)?
        );
        if let Some(action) = fk.on_delete {
            sql.push_str(" ON DELETE ");
            sql.push_str(action.as_sql());
        }
        if let Some(action) = fk.on_update {
            sql.push_str(" ON UPDATE ");
            sql.push_str(action.as_sql());
        }
        Ok(sql)
    }

    fn drop_foreign_key(&self, name: &str, table: &TableName) -> Result<String> {
        self.drop_constraint(name, table)
    }

    fn add_unique(&self, name: &str, table: &TableName, columns: &[&str]) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} UNIQUE ({})",
            self.quote_table_name(table)?,
            self.quote_identifier(name)?,
            self.quote_column_list(columns)?
        ))
    }

    fn drop_unique(&self, name: &str, table: &TableName) -> Result<String> {
        self.drop_constraint(name, table)
    }

    fn create_index(
        &self,
        name: &str,
        table: &TableName,
        columns: &[&str],
        unique: bool,
    ) -> Result<String> {
        Ok(format!(
            "CREATE {}INDEX {} ON {} ({})",
            if unique { "UNIQUE " } else { "" },
            self.quote_identifier(name)?,
            self.quote_table_name(table)?,
            self.quote_column_list(columns)?
        ))
    }

    fn drop_index(&self, name: &str, table: &TableName) -> Result<String> {
        Ok(format!(
            "DROP INDEX {} ON {}",
            self.quote_identifier(name)?,
            self.quote_table_name(table)?
        ))
    }

    /// Named default constraint on one column
    fn add_default(
        &self,
        name: &str,
        table: &TableName,
        column: &str,
        expression: &str,
    ) -> Result<String>;

    fn drop_default(&self, name: &str, table: &TableName) -> Result<String>;

    /// `ALTER TABLE t DROP CONSTRAINT n`
    fn drop_constraint(&self, name: &str, table: &TableName) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} DROP CONSTRAINT {}",
            self.quote_table_name(table)?,
            self.quote_identifier(name)?
        ))
    }
}

/// Reject an empty or whitespace-only SQL expression
pub fn require_expression<'a>(what: &str, expression: &'a str) -> Result<&'a str> {
    let trimmed = expression.trim();
    if trimmed.is_empty() {
        return Err(SchemaError::InvalidArgument(format!(
            "{what} expression must not be empty"
        )));
    }
    Ok(trimmed)
}

// ============================================================================
// Dialect
// ============================================================================

/// Everything one engine variant contributes
pub trait Dialect: SchemaLoader + DdlBuilder + Send + Sync {
    fn engine(&self) -> Engine;

    fn server_version(&self) -> ServerVersion;

    /// Schema assumed for unqualified table names, if the engine has one
    fn default_schema(&self) -> Option<&str> {
        None
    }
}
