//! Engine-independent column type classification

use core::fmt;

/// Logical column type shared by every engine
///
/// Engines report physical type strings (`int(11) unsigned`, `nvarchar(50)`);
/// the per-engine type mappers collapse them into this enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum LogicalType {
    TinyInt,
    SmallInt,
    Integer,
    BigInt,
    Float,
    Double,
    Decimal,
    Money,
    Char,
    String,
    Text,
    Boolean,
    Date,
    Time,
    DateTime,
    Timestamp,
    Binary,
    Json,
}

impl LogicalType {
    /// Lowercase name, as used in logs and error messages
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LogicalType::TinyInt => "tinyint",
            LogicalType::SmallInt => "smallint",
            LogicalType::Integer => "integer",
            LogicalType::BigInt => "bigint",
            LogicalType::Float => "float",
            LogicalType::Double => "double",
            LogicalType::Decimal => "decimal",
            LogicalType::Money => "money",
            LogicalType::Char => "char",
            LogicalType::String => "string",
            LogicalType::Text => "text",
            LogicalType::Boolean => "boolean",
            LogicalType::Date => "date",
            LogicalType::Time => "time",
            LogicalType::DateTime => "datetime",
            LogicalType::Timestamp => "timestamp",
            LogicalType::Binary => "binary",
            LogicalType::Json => "json",
        }
    }

    #[must_use]
    pub const fn is_integer(&self) -> bool {
        matches!(
            self,
            LogicalType::TinyInt | LogicalType::SmallInt | LogicalType::Integer | LogicalType::BigInt
        )
    }

    /// Date and time types, the ones that accept current-timestamp defaults
    #[must_use]
    pub const fn is_temporal(&self) -> bool {
        matches!(
            self,
            LogicalType::Date | LogicalType::Time | LogicalType::DateTime | LogicalType::Timestamp
        )
    }
}

impl fmt::Display for LogicalType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Host-side representation of a column value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum RuntimeType {
    Integer,
    String,
    Float,
    Boolean,
}

impl RuntimeType {
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            RuntimeType::Integer => "integer",
            RuntimeType::String => "string",
            RuntimeType::Float => "float",
            RuntimeType::Boolean => "boolean",
        }
    }
}

impl fmt::Display for RuntimeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of mapping one physical type string
///
/// Mapping is total: unrecognized physical types come back as
/// [`MappedType::unknown`] instead of failing.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct MappedType {
    pub logical: LogicalType,
    pub runtime: RuntimeType,
    pub size: Option<u32>,
    pub precision: Option<u32>,
    pub scale: Option<u32>,
    pub unsigned: bool,
    pub enum_values: Option<Vec<String>>,
}

impl MappedType {
    #[must_use]
    pub fn new(logical: LogicalType, runtime: RuntimeType) -> Self {
        Self {
            logical,
            runtime,
            size: None,
            precision: None,
            scale: None,
            unsigned: false,
            enum_values: None,
        }
    }

    /// Generic string mapping used for physical types nobody recognizes
    #[must_use]
    pub fn unknown() -> Self {
        Self::new(LogicalType::String, RuntimeType::String)
    }
}
