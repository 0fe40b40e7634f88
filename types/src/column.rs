//! Physical column metadata

use std::borrow::Cow;

use crate::error::ModelError;
use crate::logical::{LogicalType, MappedType, RuntimeType};
use crate::value::DefaultValue;

#[cfg(feature = "serde")]
use crate::serde_helpers::cow_from_string;

/// One column of a loaded table
///
/// Built by the per-engine loaders from a single row of the engine's
/// "describe columns" output. `name` is always the name the column was
/// physically defined with, whatever key casing the driver used.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct ColumnSchema {
    /// Column name
    #[cfg_attr(feature = "serde", serde(deserialize_with = "cow_from_string"))]
    pub name: Cow<'static, str>,

    /// Logical type
    pub logical_type: LogicalType,

    /// Physical type exactly as the engine reported it, e.g. `int(11) unsigned`
    #[cfg_attr(feature = "serde", serde(deserialize_with = "cow_from_string"))]
    pub db_type: Cow<'static, str>,

    /// Host-side value type
    pub runtime_type: RuntimeType,

    pub allow_null: bool,
    pub auto_increment: bool,
    pub is_primary_key: bool,
    pub unsigned: bool,

    pub size: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,

    /// Allowed values for `enum`/`set` columns, in declaration order
    pub enum_values: Option<Vec<String>>,

    /// `None` when the column has no default at all
    pub default: Option<DefaultValue>,

    pub comment: String,
}

impl ColumnSchema {
    /// Create a column from its name, physical type and the mapped type info
    #[must_use]
    pub fn new(
        name: impl Into<Cow<'static, str>>,
        db_type: impl Into<Cow<'static, str>>,
        mapped: MappedType,
    ) -> Self {
        Self {
            name: name.into(),
            logical_type: mapped.logical,
            db_type: db_type.into(),
            runtime_type: mapped.runtime,
            allow_null: true,
            auto_increment: false,
            is_primary_key: false,
            unsigned: mapped.unsigned,
            size: mapped.size,
            precision: mapped.precision,
            scale: mapped.scale,
            enum_values: mapped.enum_values,
            default: None,
            comment: String::new(),
        }
    }

    #[must_use]
    pub fn allow_null(self, allow_null: bool) -> Self {
        Self { allow_null, ..self }
    }

    #[must_use]
    pub fn auto_increment(self, auto_increment: bool) -> Self {
        Self {
            auto_increment,
            ..self
        }
    }

    #[must_use]
    pub fn primary_key(self, is_primary_key: bool) -> Self {
        Self {
            is_primary_key,
            ..self
        }
    }

    #[must_use]
    pub fn default_value(self, default: Option<DefaultValue>) -> Self {
        Self { default, ..self }
    }

    #[must_use]
    pub fn comment(self, comment: impl Into<String>) -> Self {
        Self {
            comment: comment.into(),
            ..self
        }
    }

    /// Get the column name
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Check the column-level invariants
    ///
    /// - an auto-increment column never allows NULL
    /// - a literal default must fit the runtime type
    pub fn validate(&self) -> Result<(), ModelError> {
        if self.auto_increment && self.allow_null {
            return Err(ModelError::NullableAutoIncrement(self.name.to_string()));
        }
        if let Some(DefaultValue::Literal(value)) = &self.default {
            if !value.is_coercible_to(self.runtime_type) {
                return Err(ModelError::DefaultTypeMismatch {
                    column: self.name.to_string(),
                    value: value.to_string(),
                    runtime: self.runtime_type.as_str(),
                });
            }
        }
        Ok(())
    }
}
