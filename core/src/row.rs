//! Result rows handed back by the connection layer

use std::borrow::Cow;

use schemata_types::Value;

use crate::error::{Result, SchemaError};

/// How the driver cases result-set column keys
///
/// Only affects how keys are looked up in raw rows; loaded names keep the
/// case they were physically defined with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum CaseFolding {
    /// Keys as the server reported them
    #[default]
    Natural,
    Upper,
    Lower,
}

impl CaseFolding {
    /// Fold a canonical key the way the driver folds result keys
    #[must_use]
    pub fn fold<'a>(&self, key: &'a str) -> Cow<'a, str> {
        match self {
            CaseFolding::Natural => Cow::Borrowed(key),
            CaseFolding::Upper => Cow::Owned(key.to_uppercase()),
            CaseFolding::Lower => Cow::Owned(key.to_lowercase()),
        }
    }
}

/// One result row as ordered `(key, value)` pairs
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    columns: Vec<(String, Value)>,
}

impl Row {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column, keeping result-set order
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.push(key, value);
        self
    }

    /// Append a column; an existing key keeps its position and takes the new value
    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Value>) {
        let key = key.into();
        let value = value.into();
        match self.columns.iter_mut().find(|(k, _)| *k == key) {
            Some((_, slot)) => *slot = value,
            None => self.columns.push((key, value)),
        }
    }

    /// Exact-key lookup
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.columns.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.columns.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.columns.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Read this row through a driver's case-folding mode
    #[must_use]
    pub fn reader<'a>(&'a self, folding: CaseFolding, table: &'a str) -> RowReader<'a> {
        RowReader {
            row: self,
            folding,
            table,
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Row {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            columns: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// Group `(key, item)` pairs by key, keeping first-seen key order and the
/// item order within each group
pub fn group_by_key<T>(pairs: impl IntoIterator<Item = (String, T)>) -> Vec<(String, Vec<T>)> {
    let mut groups: Vec<(String, Vec<T>)> = Vec::new();
    for (key, item) in pairs {
        match groups.iter_mut().find(|(k, _)| *k == key) {
            Some((_, items)) => items.push(item),
            None => groups.push((key, vec![item])),
        }
    }
    groups
}

/// Looks up canonical keys in a raw row under a case-folding mode
///
/// Loaders always ask for the key as the server spells it (`Field`,
/// `COLUMN_NAME`); the reader folds it the way the driver did.
#[derive(Debug, Clone, Copy)]
pub struct RowReader<'a> {
    row: &'a Row,
    folding: CaseFolding,
    table: &'a str,
}

impl<'a> RowReader<'a> {
    /// Table the row describes, for error messages
    #[must_use]
    pub fn table(&self) -> &'a str {
        self.table
    }

    #[must_use]
    pub fn value(&self, key: &str) -> Option<&'a Value> {
        self.row.get(&self.folding.fold(key))
    }

    /// Text of a non-null value; numbers and booleans are rendered
    #[must_use]
    pub fn text(&self, key: &str) -> Option<Cow<'a, str>> {
        match self.value(key)? {
            Value::Null => None,
            Value::String(s) => Some(Cow::Borrowed(s.as_str())),
            other => Some(Cow::Owned(other.to_string())),
        }
    }

    /// Like [`RowReader::text`] but a missing key is malformed metadata.
    /// SQL NULL is still `Ok(None)`.
    pub fn optional(&self, key: &str) -> Result<Option<Cow<'a, str>>> {
        if self.value(key).is_none() {
            return Err(self.missing(key));
        }
        Ok(self.text(key))
    }

    /// A key that must be present and non-null
    pub fn required(&self, key: &str) -> Result<Cow<'a, str>> {
        self.text(key).ok_or_else(|| self.missing(key))
    }

    /// Integer column, accepting numeric text
    pub fn integer(&self, key: &str) -> Result<Option<i64>> {
        match self.value(key) {
            None | Some(Value::Null) => Ok(None),
            Some(Value::Integer(i)) => Ok(Some(*i)),
            Some(Value::Boolean(b)) => Ok(Some(i64::from(*b))),
            Some(other) => other.to_string().trim().parse().map(Some).map_err(|_| {
                SchemaError::malformed(self.table, format!("'{key}' is not an integer: {other}"))
            }),
        }
    }

    /// Flag column reported as 0/1, `YES`/`NO` or a boolean
    #[must_use]
    pub fn flag(&self, key: &str) -> bool {
        match self.value(key) {
            Some(Value::Boolean(b)) => *b,
            Some(Value::Integer(i)) => *i != 0,
            Some(Value::String(s)) => {
                s == "1" || s.eq_ignore_ascii_case("yes") || s.eq_ignore_ascii_case("true")
            }
            _ => false,
        }
    }

    fn missing(&self, key: &str) -> SchemaError {
        let folded = self.folding.fold(key);
        schemata_warn_metadata!(self.table, format_args!("result row has no '{folded}' column"));
        SchemaError::malformed(self.table, format!("result row has no '{folded}' column"))
    }
}
