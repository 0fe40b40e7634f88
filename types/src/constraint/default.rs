//! Named default constraint (SQL Server)

use std::borrow::Cow;

#[cfg(feature = "serde")]
use crate::serde_helpers::{cow_from_string, cow_option_from_string};

/// Default constraint bound to one column
///
/// Only engines that model defaults as named constraints report these; on the
/// others a column's default lives on the column itself.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct DefaultConstraint {
    #[cfg_attr(feature = "serde", serde(deserialize_with = "cow_option_from_string"))]
    pub name: Option<Cow<'static, str>>,

    #[cfg_attr(feature = "serde", serde(deserialize_with = "cow_from_string"))]
    pub column: Cow<'static, str>,

    /// Default expression as stored by the engine, e.g. `((0))`
    #[cfg_attr(feature = "serde", serde(deserialize_with = "cow_from_string"))]
    pub value: Cow<'static, str>,
}

impl DefaultConstraint {
    #[must_use]
    pub fn new<N>(
        name: Option<N>,
        column: impl Into<Cow<'static, str>>,
        value: impl Into<Cow<'static, str>>,
    ) -> Self
    where
        N: Into<Cow<'static, str>>,
    {
        Self {
            name: name.map(Into::into),
            column: column.into(),
            value: value.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }
}
