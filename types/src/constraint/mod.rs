//! Constraint entities reported by table introspection
//!
//! Every entity references columns by name. Column lists are ordered, non-empty
//! and free of duplicates; [`Check`] carries an expression instead. Names are
//! optional because some engines report certain constraints unnamed (MySQL
//! primary keys are always called `PRIMARY`, which is reported as `None`).
//!
//! ```
//! use schemata_types::constraint::{ForeignKey, ReferentialAction};
//!
//! let fk = ForeignKey::new(Some("fk_posts_user"), ["user_id"], "users", ["id"])
//!     .on_delete(ReferentialAction::Cascade);
//! assert!(fk.validate().is_ok());
//! assert_eq!(fk.on_delete, Some(ReferentialAction::Cascade));
//! ```

mod check;
mod default;
mod foreign_key;
mod index;
mod primary_key;
mod unique;

use core::fmt;
use std::borrow::Cow;

pub use check::{Check, strip_outer_parens};
pub use default::DefaultConstraint;
pub use foreign_key::{ForeignKey, ReferentialAction};
pub use index::Index;
pub use primary_key::PrimaryKey;
pub use unique::Unique;

use crate::error::ModelError;

/// The kinds of constraint a loader can be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum ConstraintKind {
    PrimaryKey,
    ForeignKeys,
    Uniques,
    Checks,
    Indexes,
    Defaults,
}

impl ConstraintKind {
    pub const ALL: [ConstraintKind; 6] = [
        ConstraintKind::PrimaryKey,
        ConstraintKind::ForeignKeys,
        ConstraintKind::Uniques,
        ConstraintKind::Checks,
        ConstraintKind::Indexes,
        ConstraintKind::Defaults,
    ];

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConstraintKind::PrimaryKey => "primary key",
            ConstraintKind::ForeignKeys => "foreign keys",
            ConstraintKind::Uniques => "unique constraints",
            ConstraintKind::Checks => "check constraints",
            ConstraintKind::Indexes => "indexes",
            ConstraintKind::Defaults => "default constraints",
        }
    }
}

impl fmt::Display for ConstraintKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Constraints of one kind loaded for one table
///
/// An empty set means the table has none of that kind; engines that cannot
/// report a kind at all fail with a not-supported error instead.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "items", rename_all = "camelCase"))]
pub enum ConstraintSet {
    PrimaryKey(Option<PrimaryKey>),
    ForeignKeys(Vec<ForeignKey>),
    Uniques(Vec<Unique>),
    Checks(Vec<Check>),
    Indexes(Vec<Index>),
    Defaults(Vec<DefaultConstraint>),
}

impl ConstraintSet {
    #[must_use]
    pub const fn kind(&self) -> ConstraintKind {
        match self {
            ConstraintSet::PrimaryKey(_) => ConstraintKind::PrimaryKey,
            ConstraintSet::ForeignKeys(_) => ConstraintKind::ForeignKeys,
            ConstraintSet::Uniques(_) => ConstraintKind::Uniques,
            ConstraintSet::Checks(_) => ConstraintKind::Checks,
            ConstraintSet::Indexes(_) => ConstraintKind::Indexes,
            ConstraintSet::Defaults(_) => ConstraintKind::Defaults,
        }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        match self {
            ConstraintSet::PrimaryKey(pk) => usize::from(pk.is_some()),
            ConstraintSet::ForeignKeys(v) => v.len(),
            ConstraintSet::Uniques(v) => v.len(),
            ConstraintSet::Checks(v) => v.len(),
            ConstraintSet::Indexes(v) => v.len(),
            ConstraintSet::Defaults(v) => v.len(),
        }
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Validate every entity in the set, and that each referenced column is
    /// among `columns`
    pub fn validate_against(&self, columns: &[&str]) -> Result<(), ModelError> {
        let known = |kind, names: &[Cow<'static, str>]| validate_known(kind, names, columns);

        match self {
            ConstraintSet::PrimaryKey(Some(pk)) => {
                pk.validate()?;
                known("primary key", &pk.columns)
            }
            ConstraintSet::PrimaryKey(None) => Ok(()),
            ConstraintSet::ForeignKeys(fks) => fks.iter().try_for_each(|fk| {
                fk.validate()?;
                known("foreign key", &fk.columns)
            }),
            ConstraintSet::Uniques(uniques) => uniques.iter().try_for_each(|u| {
                u.validate()?;
                known("unique constraint", &u.columns)
            }),
            ConstraintSet::Checks(_) => Ok(()),
            ConstraintSet::Indexes(indexes) => indexes.iter().try_for_each(|i| {
                i.validate()?;
                known("index", &i.columns)
            }),
            ConstraintSet::Defaults(defaults) => defaults.iter().try_for_each(|d| {
                known("default constraint", core::slice::from_ref(&d.column))
            }),
        }
    }
}

/// Every name in `names` must be one of `columns`
pub(crate) fn validate_known(
    kind: &'static str,
    names: &[Cow<'static, str>],
    columns: &[&str],
) -> Result<(), ModelError> {
    match names.iter().find(|n| !columns.contains(&n.as_ref())) {
        Some(n) => Err(ModelError::UnknownColumn {
            kind,
            column: n.to_string(),
        }),
        None => Ok(()),
    }
}

/// Shared column-list invariant: non-empty, no duplicates
pub(crate) fn validate_columns(
    kind: &'static str,
    columns: &[Cow<'static, str>],
) -> Result<(), ModelError> {
    if columns.is_empty() {
        return Err(ModelError::EmptyColumns { kind });
    }
    for (i, col) in columns.iter().enumerate() {
        if columns[..i].contains(col) {
            return Err(ModelError::DuplicateColumn {
                kind,
                column: col.to_string(),
            });
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate_columns() {
        assert_eq!(
            validate_columns("unique constraint", &[]),
            Err(ModelError::EmptyColumns {
                kind: "unique constraint"
            })
        );
        let dup = vec![Cow::Borrowed("a"), Cow::Borrowed("b"), Cow::Borrowed("a")];
        assert!(matches!(
            validate_columns("index", &dup),
            Err(ModelError::DuplicateColumn { column, .. }) if column == "a"
        ));
    }

    #[test]
    fn test_set_validates_column_existence() {
        let set = ConstraintSet::Uniques(vec![Unique::new(Some("uq"), ["email"])]);
        assert!(set.validate_against(&["id", "email"]).is_ok());
        assert_eq!(
            set.validate_against(&["id"]),
            Err(ModelError::UnknownColumn {
                kind: "unique constraint",
                column: "email".to_string()
            })
        );
    }

    #[test]
    fn test_empty_set_is_not_missing() {
        let set = ConstraintSet::Checks(Vec::new());
        assert!(set.is_empty());
        assert_eq!(set.kind(), ConstraintKind::Checks);
        assert_eq!(ConstraintSet::PrimaryKey(None).len(), 0);
    }
}
