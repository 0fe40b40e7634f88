//! Table-level metadata

use core::fmt;
use std::borrow::Cow;

use crate::column::ColumnSchema;
use crate::constraint::{validate_known, ForeignKey, PrimaryKey};
use crate::error::ModelError;

#[cfg(feature = "serde")]
use crate::serde_helpers::{cow_from_string, cow_option_from_string};

/// Optionally schema-qualified table name
///
/// ```
/// use schemata_types::TableName;
///
/// let name = TableName::parse("`shop`.`orders`");
/// assert_eq!(name.schema.as_deref(), Some("shop"));
/// assert_eq!(name.name, "orders");
/// assert_eq!(name.to_string(), "shop.orders");
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TableName {
    #[cfg_attr(feature = "serde", serde(deserialize_with = "cow_option_from_string"))]
    pub schema: Option<Cow<'static, str>>,
    #[cfg_attr(feature = "serde", serde(deserialize_with = "cow_from_string"))]
    pub name: Cow<'static, str>,
}

impl TableName {
    #[must_use]
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            schema: None,
            name: name.into(),
        }
    }

    #[must_use]
    pub fn with_schema(
        schema: impl Into<Cow<'static, str>>,
        name: impl Into<Cow<'static, str>>,
    ) -> Self {
        Self {
            schema: Some(schema.into()),
            name: name.into(),
        }
    }

    /// Split `schema.table` on the last unquoted dot and strip identifier quotes
    ///
    /// Backtick, double-quote and bracket quoting are all recognised, so names
    /// that contain a dot survive when quoted.
    #[must_use]
    pub fn parse(raw: &str) -> Self {
        let parts = split_qualified(raw.trim());
        match parts.as_slice() {
            [] => Self::new(String::new()),
            [name] => Self::new(unquote(name)),
            [.., schema, name] => Self::with_schema(unquote(schema), unquote(name)),
        }
    }

    /// Apply a default schema when none was given
    #[must_use]
    pub fn or_schema(self, schema: Option<&str>) -> Self {
        match (self.schema, schema) {
            (None, Some(s)) => Self::with_schema(s.to_string(), self.name),
            (schema, _) => Self {
                schema,
                name: self.name,
            },
        }
    }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.schema {
            Some(schema) => write!(f, "{}.{}", schema, self.name),
            None => f.write_str(&self.name),
        }
    }
}

fn split_qualified(raw: &str) -> Vec<&str> {
    let mut parts = Vec::new();
    let mut start = 0usize;
    let mut closing: Option<char> = None;
    for (i, ch) in raw.char_indices() {
        match closing {
            Some(c) if ch == c => closing = None,
            Some(_) => {}
            None => match ch {
                '`' => closing = Some('`'),
                '"' => closing = Some('"'),
                '[' => closing = Some(']'),
                '.' => {
                    parts.push(&raw[start..i]);
                    start = i + 1;
                }
                _ => {}
            },
        }
    }
    if start < raw.len() {
        parts.push(&raw[start..]);
    }
    parts
}

fn unquote(part: &str) -> String {
    let part = part.trim();
    let pairs = [('`', '`'), ('"', '"'), ('[', ']')];
    for (open, close) in pairs {
        if part.len() >= 2 && part.starts_with(open) && part.ends_with(close) {
            let inner = &part[1..part.len() - 1];
            let doubled: String = [close, close].iter().collect();
            return inner.replace(&doubled, &close.to_string());
        }
    }
    part.to_string()
}

/// Loaded schema of one table
///
/// Immutable once built; a stale schema is replaced wholesale rather than
/// patched.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct TableSchema {
    pub name: TableName,

    /// Columns in physical order
    pub columns: Vec<ColumnSchema>,

    pub primary_key: Option<PrimaryKey>,

    pub foreign_keys: Vec<ForeignKey>,

    /// Auto-increment or identity column feeding generated keys
    #[cfg_attr(feature = "serde", serde(deserialize_with = "cow_option_from_string"))]
    pub sequence_name: Option<Cow<'static, str>>,
}

impl TableSchema {
    #[must_use]
    pub fn new(name: TableName) -> Self {
        Self {
            name,
            columns: Vec::new(),
            primary_key: None,
            foreign_keys: Vec::new(),
            sequence_name: None,
        }
    }

    /// Look up a column by its physical name
    #[must_use]
    pub fn column(&self, name: &str) -> Option<&ColumnSchema> {
        self.columns.iter().find(|c| c.name == name)
    }

    #[must_use]
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name()).collect()
    }

    /// Primary key column names, empty when the table has none
    #[must_use]
    pub fn primary_key_columns(&self) -> Vec<&str> {
        self.primary_key
            .as_ref()
            .map(|pk| pk.columns.iter().map(|c| c.as_ref()).collect())
            .unwrap_or_default()
    }

    /// Check every invariant of the assembled table
    pub fn validate(&self) -> Result<(), ModelError> {
        for (i, column) in self.columns.iter().enumerate() {
            if self.columns[..i].iter().any(|c| c.name == column.name) {
                return Err(ModelError::DuplicateTableColumn(column.name.to_string()));
            }
            column.validate()?;
        }

        let names = self.column_names();
        if let Some(pk) = &self.primary_key {
            pk.validate()?;
            validate_known("primary key", &pk.columns, &names)?;
        }
        for fk in &self.foreign_keys {
            fk.validate()?;
            validate_known("foreign key", &fk.columns, &names)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logical::{LogicalType, MappedType, RuntimeType};

    fn column(name: &'static str) -> ColumnSchema {
        ColumnSchema::new(
            name,
            "int",
            MappedType::new(LogicalType::Integer, RuntimeType::Integer),
        )
    }

    #[test]
    fn test_parse_table_name() {
        assert_eq!(TableName::parse("users"), TableName::new("users"));
        assert_eq!(TableName::parse("dbo.users"), TableName::with_schema("dbo", "users"));
        assert_eq!(TableName::parse("[dbo].[my.table]"), TableName::with_schema("dbo", "my.table"));
        assert_eq!(TableName::parse("`we``ird`"), TableName::new("we`ird"));
        assert_eq!(TableName::parse("[a]]b]"), TableName::new("a]b"));
    }

    #[test]
    fn test_or_schema() {
        assert_eq!(
            TableName::new("t").or_schema(Some("dbo")),
            TableName::with_schema("dbo", "t")
        );
        assert_eq!(
            TableName::with_schema("s", "t").or_schema(Some("dbo")),
            TableName::with_schema("s", "t")
        );
    }

    #[test]
    fn test_zero_column_table_is_valid() {
        let table = TableSchema::new(TableName::new("empty"));
        assert!(table.validate().is_ok());
        assert!(table.column_names().is_empty());
        assert!(table.primary_key_columns().is_empty());
    }

    #[test]
    fn test_primary_key_must_reference_existing_columns() {
        let mut table = TableSchema::new(TableName::new("t"));
        table.columns.push(column("id"));
        table.primary_key = Some(PrimaryKey::new(None::<&str>, ["missing"]));
        assert!(matches!(
            table.validate(),
            Err(ModelError::UnknownColumn { column, .. }) if column == "missing"
        ));
    }

    #[test]
    fn test_duplicate_columns_rejected() {
        let mut table = TableSchema::new(TableName::new("t"));
        table.columns.push(column("id"));
        table.columns.push(column("id"));
        assert_eq!(
            table.validate(),
            Err(ModelError::DuplicateTableColumn("id".to_string()))
        );
    }
}
