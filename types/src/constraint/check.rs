//! Check constraint

use std::borrow::Cow;

#[cfg(feature = "serde")]
use crate::serde_helpers::{cow_from_string, cow_option_from_string};

/// Check constraint
///
/// The expression is the engine's own rendering of the condition, escaping
/// included: MySQL reports `` (`C_check` <> _utf8mb4\'\') `` where MariaDB
/// reports `` `C_check` <> '' `` for the same definition.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Check {
    #[cfg_attr(feature = "serde", serde(deserialize_with = "cow_option_from_string"))]
    pub name: Option<Cow<'static, str>>,

    /// Raw SQL condition
    #[cfg_attr(feature = "serde", serde(deserialize_with = "cow_from_string"))]
    pub expression: Cow<'static, str>,
}

impl Check {
    #[must_use]
    pub fn new<N>(name: Option<N>, expression: impl Into<Cow<'static, str>>) -> Self
    where
        N: Into<Cow<'static, str>>,
    {
        Self {
            name: name.map(Into::into),
            expression: expression.into(),
        }
    }

    #[inline]
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Expression with surrounding parentheses and whitespace removed
    ///
    /// Engines differ in whether the stored condition keeps the outer
    /// parentheses of the original definition; comparing through this form
    /// ignores that difference.
    #[must_use]
    pub fn normalized_expression(&self) -> &str {
        strip_outer_parens(&self.expression)
    }
}

/// Trim `expr` and remove parentheses that wrap all of it, repeatedly
///
/// ```
/// use schemata_types::constraint::strip_outer_parens;
///
/// assert_eq!(strip_outer_parens("((0))"), "0");
/// assert_eq!(strip_outer_parens("(N'a)')"), "N'a)'");
/// assert_eq!(strip_outer_parens("(a) + (b)"), "(a) + (b)");
/// ```
#[must_use]
pub fn strip_outer_parens(expr: &str) -> &str {
    let mut expr = expr.trim();
    while expr.starts_with('(') && expr.ends_with(')') && wraps_whole(expr) {
        expr = expr[1..expr.len() - 1].trim();
    }
    expr
}

/// Whether the first `(` of `expr` is closed by its last `)`
fn wraps_whole(expr: &str) -> bool {
    let mut depth = 0i32;
    let mut in_quote = false;
    for (i, ch) in expr.char_indices() {
        match ch {
            '\'' => in_quote = !in_quote,
            _ if in_quote => {}
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return i == expr.len() - 1;
                }
            }
            _ => {}
        }
    }
    false
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalized_expression() {
        let check = Check::new(Some("ck"), " ((`age` >= 0)) ");
        assert_eq!(check.normalized_expression(), "`age` >= 0");

        let check = Check::new(None::<&str>, "(a > 0) AND (b > 0)");
        assert_eq!(check.normalized_expression(), "(a > 0) AND (b > 0)");
    }
}
