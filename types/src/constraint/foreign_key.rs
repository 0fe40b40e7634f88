//! Foreign key constraint

use std::borrow::Cow;

use super::validate_columns;
use crate::error::ModelError;
use crate::serde_helpers::into_cow_vec;

#[cfg(feature = "serde")]
use crate::serde_helpers::{cow_from_string, cow_option_from_string, cow_vec_from_strings};

/// Foreign key referential action
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum ReferentialAction {
    Cascade,
    SetNull,
    Restrict,
    NoAction,
    SetDefault,
}

impl ReferentialAction {
    /// Get the SQL representation
    #[must_use]
    pub const fn as_sql(&self) -> &'static str {
        match self {
            Self::NoAction => "NO ACTION",
            Self::Restrict => "RESTRICT",
            Self::Cascade => "CASCADE",
            Self::SetNull => "SET NULL",
            Self::SetDefault => "SET DEFAULT",
        }
    }

    /// Parse an engine spelling
    ///
    /// Accepts the SQL form (`SET NULL`) and the catalog form SQL Server uses
    /// in `sys.foreign_keys` (`SET_NULL`), case-insensitively.
    #[must_use]
    pub fn from_sql(s: &str) -> Option<Self> {
        let normalized = s.trim().replace('_', " ").to_uppercase();
        match normalized.as_str() {
            "NO ACTION" => Some(Self::NoAction),
            "RESTRICT" => Some(Self::Restrict),
            "CASCADE" => Some(Self::Cascade),
            "SET NULL" => Some(Self::SetNull),
            "SET DEFAULT" => Some(Self::SetDefault),
            _ => None,
        }
    }
}

/// Foreign key constraint
///
/// `columns` and `foreign_columns` correspond positionally.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ForeignKey {
    #[cfg_attr(feature = "serde", serde(deserialize_with = "cow_option_from_string"))]
    pub name: Option<Cow<'static, str>>,

    /// Local columns
    #[cfg_attr(feature = "serde", serde(deserialize_with = "cow_vec_from_strings"))]
    pub columns: Vec<Cow<'static, str>>,

    /// Schema of the referenced table when it differs from the owning table's
    #[cfg_attr(feature = "serde", serde(deserialize_with = "cow_option_from_string"))]
    pub foreign_schema: Option<Cow<'static, str>>,

    /// Referenced table name
    #[cfg_attr(feature = "serde", serde(deserialize_with = "cow_from_string"))]
    pub foreign_table: Cow<'static, str>,

    /// Referenced columns
    #[cfg_attr(feature = "serde", serde(deserialize_with = "cow_vec_from_strings"))]
    pub foreign_columns: Vec<Cow<'static, str>>,

    pub on_delete: Option<ReferentialAction>,
    pub on_update: Option<ReferentialAction>,
}

impl ForeignKey {
    #[must_use]
    pub fn new<N, I, S, J, T>(
        name: Option<N>,
        columns: I,
        foreign_table: impl Into<Cow<'static, str>>,
        foreign_columns: J,
    ) -> Self
    where
        N: Into<Cow<'static, str>>,
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
        J: IntoIterator<Item = T>,
        T: Into<Cow<'static, str>>,
    {
        Self {
            name: name.map(Into::into),
            columns: into_cow_vec(columns),
            foreign_schema: None,
            foreign_table: foreign_table.into(),
            foreign_columns: into_cow_vec(foreign_columns),
            on_delete: None,
            on_update: None,
        }
    }

    /// Set the referenced table's schema
    #[must_use]
    pub fn foreign_schema(self, schema: impl Into<Cow<'static, str>>) -> Self {
        Self {
            foreign_schema: Some(schema.into()),
            ..self
        }
    }

    /// Set ON DELETE action
    #[must_use]
    pub fn on_delete(self, action: ReferentialAction) -> Self {
        Self {
            on_delete: Some(action),
            ..self
        }
    }

    /// Set ON UPDATE action
    #[must_use]
    pub fn on_update(self, action: ReferentialAction) -> Self {
        Self {
            on_update: Some(action),
            ..self
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        validate_columns("foreign key", &self.columns)?;
        validate_columns("foreign key reference", &self.foreign_columns)?;
        if self.columns.len() != self.foreign_columns.len() {
            return Err(ModelError::ReferenceArity {
                local: self.columns.len(),
                referenced: self.foreign_columns.len(),
            });
        }
        Ok(())
    }
}
