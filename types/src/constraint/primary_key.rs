//! Primary key constraint

use std::borrow::Cow;

use super::validate_columns;
use crate::error::ModelError;
use crate::serde_helpers::into_cow_vec;

#[cfg(feature = "serde")]
use crate::serde_helpers::{cow_option_from_string, cow_vec_from_strings};

/// Primary key of a table
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct PrimaryKey {
    /// Constraint name, `None` when the engine does not report one
    #[cfg_attr(feature = "serde", serde(deserialize_with = "cow_option_from_string"))]
    pub name: Option<Cow<'static, str>>,

    /// Key columns in key order
    #[cfg_attr(feature = "serde", serde(deserialize_with = "cow_vec_from_strings"))]
    pub columns: Vec<Cow<'static, str>>,
}

impl PrimaryKey {
    #[must_use]
    pub fn new<N, I, S>(name: Option<N>, columns: I) -> Self
    where
        N: Into<Cow<'static, str>>,
        I: IntoIterator<Item = S>,
        S: Into<Cow<'static, str>>,
    {
        Self {
            name: name.map(Into::into),
            columns: into_cow_vec(columns),
        }
    }

    /// Get the constraint name
    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        validate_columns("primary key", &self.columns)
    }
}
