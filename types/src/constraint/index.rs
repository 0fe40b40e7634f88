//! Index entity

use std::borrow::Cow;

use super::validate_columns;
use crate::error::ModelError;
use crate::serde_helpers::into_cow_vec;

#[cfg(feature = "serde")]
use crate::serde_helpers::{cow_option_from_string, cow_vec_from_strings};

/// Table index, including the indexes backing primary keys and unique constraints
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Index {
    #[cfg_attr(feature = "serde", serde(deserialize_with = "cow_option_from_string"))]
    pub name: Option<Cow<'static, str>>,

    #[cfg_attr(feature = "serde", serde(deserialize_with = "cow_vec_from_strings"))]
    pub columns: Vec<Cow<'static, str>>,

    pub is_unique: bool,
    pub is_primary: bool,
}

impl Index {
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
            is_unique: false,
            is_primary: false,
        }
    }

    #[must_use]
    pub fn unique(self, is_unique: bool) -> Self {
        Self { is_unique, ..self }
    }

    /// Mark as the primary key index; primary indexes are always unique
    #[must_use]
    pub fn primary(self, is_primary: bool) -> Self {
        Self {
            is_primary,
            is_unique: self.is_unique || is_primary,
            ..self
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        validate_columns("index", &self.columns)
    }
}
