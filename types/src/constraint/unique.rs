//! Unique constraint

use std::borrow::Cow;

use super::validate_columns;
use crate::error::ModelError;
use crate::serde_helpers::into_cow_vec;

#[cfg(feature = "serde")]
use crate::serde_helpers::{cow_option_from_string, cow_vec_from_strings};

/// Unique constraint over one or more columns
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Unique {
    #[cfg_attr(feature = "serde", serde(deserialize_with = "cow_option_from_string"))]
    pub name: Option<Cow<'static, str>>,

    #[cfg_attr(feature = "serde", serde(deserialize_with = "cow_vec_from_strings"))]
    pub columns: Vec<Cow<'static, str>>,
}

impl Unique {
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

    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    pub fn validate(&self) -> Result<(), ModelError> {
        validate_columns("unique constraint", &self.columns)
    }
}
