//! Literal values and default-value representation

use core::fmt;
use std::borrow::Cow;

use crate::logical::RuntimeType;

/// A literal value of one of the runtime types, or SQL NULL
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(untagged))]
pub enum Value {
    Null,
    Integer(i64),
    Float(f64),
    Boolean(bool),
    String(String),
}

/// Failure to interpret literal text as a value of the requested runtime type
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot read {text:?} as {expected}")]
pub struct ValueParseError {
    pub text: String,
    pub expected: RuntimeType,
}

impl Value {
    /// Parse literal text reported by an engine into a value of `runtime` type.
    ///
    /// Strings are taken verbatim. Numbers and booleans must parse completely;
    /// anything else is an error rather than a silently wrong value.
    pub fn parse_as(text: &str, runtime: RuntimeType) -> Result<Self, ValueParseError> {
        let err = || ValueParseError {
            text: text.to_string(),
            expected: runtime,
        };
        match runtime {
            RuntimeType::String => Ok(Value::String(text.to_string())),
            RuntimeType::Integer => {
                let t = text.trim();
                if let Ok(i) = t.parse::<i64>() {
                    return Ok(Value::Integer(i));
                }
                // `1.0` style integer defaults appear on some engines
                match t.parse::<f64>() {
                    Ok(f) if f.fract() == 0.0 && f.abs() < i64::MAX as f64 => {
                        Ok(Value::Integer(f as i64))
                    }
                    _ => Err(err()),
                }
            }
            RuntimeType::Float => text.trim().parse::<f64>().map(Value::Float).map_err(|_| err()),
            RuntimeType::Boolean => match text.trim() {
                "1" => Ok(Value::Boolean(true)),
                "0" => Ok(Value::Boolean(false)),
                t if t.eq_ignore_ascii_case("true") => Ok(Value::Boolean(true)),
                t if t.eq_ignore_ascii_case("false") => Ok(Value::Boolean(false)),
                _ => Err(err()),
            },
        }
    }

    #[inline]
    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Whether this value can be carried by a column of the given runtime type
    #[must_use]
    pub fn is_coercible_to(&self, runtime: RuntimeType) -> bool {
        match (self, runtime) {
            (Value::Null, _) => true,
            (_, RuntimeType::String) => true,
            (Value::Integer(_), RuntimeType::Integer) => true,
            (Value::Integer(_) | Value::Float(_), RuntimeType::Float) => true,
            (Value::Boolean(_), RuntimeType::Boolean) => true,
            (Value::Integer(i), RuntimeType::Boolean) => *i == 0 || *i == 1,
            (Value::Boolean(_), RuntimeType::Integer) => true,
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("NULL"),
            Value::Integer(i) => write!(f, "{i}"),
            Value::Float(v) => write!(f, "{v}"),
            Value::Boolean(b) => f.write_str(if *b { "1" } else { "0" }),
            Value::String(s) => f.write_str(s),
        }
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::String(v.to_string())
    }
}

/// Raw SQL evaluated by the engine at write time, e.g. `CURRENT_TIMESTAMP(3)`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct Expression(
    #[cfg_attr(feature = "serde", serde(deserialize_with = "crate::serde_helpers::cow_from_string"))]
    Cow<'static, str>,
);

impl Expression {
    #[must_use]
    pub fn new(sql: impl Into<Cow<'static, str>>) -> Self {
        Self(sql.into())
    }

    #[inline]
    #[must_use]
    pub fn as_sql(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Expression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl PartialEq<&str> for Expression {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A column default: a literal or a raw expression
///
/// Columns without any default carry `None` instead; `Literal(Value::Null)` is
/// an explicit `DEFAULT NULL`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum DefaultValue {
    Literal(Value),
    Expression(Expression),
}

impl DefaultValue {
    #[must_use]
    pub fn expression(sql: impl Into<Cow<'static, str>>) -> Self {
        DefaultValue::Expression(Expression::new(sql))
    }

    #[must_use]
    pub const fn null() -> Self {
        DefaultValue::Literal(Value::Null)
    }

    #[must_use]
    pub fn as_expression(&self) -> Option<&Expression> {
        match self {
            DefaultValue::Expression(e) => Some(e),
            DefaultValue::Literal(_) => None,
        }
    }

    #[must_use]
    pub fn as_literal(&self) -> Option<&Value> {
        match self {
            DefaultValue::Literal(v) => Some(v),
            DefaultValue::Expression(_) => None,
        }
    }
}

impl From<Value> for DefaultValue {
    fn from(v: Value) -> Self {
        DefaultValue::Literal(v)
    }
}

impl From<Expression> for DefaultValue {
    fn from(e: Expression) -> Self {
        DefaultValue::Expression(e)
    }
}
