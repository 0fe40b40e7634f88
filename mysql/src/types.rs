//! MySQL / MariaDB physical type mapping

use schemata_core::PhysicalType;
use schemata_core::default_value::unquote_sql_string;
use schemata_types::{Engine, LogicalType, MappedType, RuntimeType, ServerVersion};

/// First MySQL release with a native JSON type
const MYSQL_NATIVE_JSON: ServerVersion = ServerVersion::new(5, 7, 8);

/// Maps `SHOW COLUMNS` type strings to logical and runtime types
///
/// Mapping never fails; unknown types become strings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MySqlTypeMapper {
    engine: Engine,
    version: ServerVersion,
    tinyint1_as_boolean: bool,
}

impl MySqlTypeMapper {
    #[must_use]
    pub const fn new(engine: Engine, version: ServerVersion) -> Self {
        Self {
            engine,
            version,
            tinyint1_as_boolean: false,
        }
    }

    #[must_use]
    pub const fn tinyint1_as_boolean(self, tinyint1_as_boolean: bool) -> Self {
        Self {
            tinyint1_as_boolean,
            ..self
        }
    }

    /// Map one physical type string
    ///
    /// ```
    /// use schemata_mysql::MySqlTypeMapper;
    /// use schemata_types::{Engine, LogicalType, RuntimeType, ServerVersion};
    ///
    /// let mapper = MySqlTypeMapper::new(Engine::MySql, ServerVersion::new(8, 0, 33));
    /// let mapped = mapper.map("bigint(20) unsigned");
    /// assert_eq!(mapped.logical, LogicalType::BigInt);
    /// assert_eq!(mapped.runtime, RuntimeType::String);
    /// ```
    #[must_use]
    pub fn map(&self, raw: &str) -> MappedType {
        let physical = PhysicalType::parse(raw);
        let logical = self.logical_type(&physical);
        let unsigned = physical.has_modifier("unsigned");

        let mut mapped = MappedType::new(logical, runtime_type(logical, unsigned));
        mapped.unsigned = unsigned;

        match physical.base.as_str() {
            "enum" | "set" => {
                mapped.enum_values = Some(
                    physical
                        .params
                        .iter()
                        .map(|v| unquote_sql_string(v, false).unwrap_or_else(|| v.clone()))
                        .collect(),
                );
            }
            _ => {
                mapped.size = physical.param_u32(0);
                mapped.precision = mapped.size;
                mapped.scale = physical.param_u32(1);
            }
        }
        mapped
    }

    fn logical_type(&self, physical: &PhysicalType) -> LogicalType {
        match physical.base.as_str() {
            "tinyint" => {
                if self.tinyint1_as_boolean && physical.param_u32(0) == Some(1) {
                    LogicalType::Boolean
                } else {
                    LogicalType::TinyInt
                }
            }
            "bool" | "boolean" => LogicalType::Boolean,
            "smallint" => LogicalType::SmallInt,
            "mediumint" | "int" | "integer" => LogicalType::Integer,
            "bigint" | "serial" => LogicalType::BigInt,
            "bit" => match physical.param_u32(0).unwrap_or(1) {
                1 => LogicalType::Boolean,
                n if n <= 32 => LogicalType::Integer,
                _ => LogicalType::BigInt,
            },
            "float" => LogicalType::Float,
            "double" | "double precision" | "real" => LogicalType::Double,
            "decimal" | "numeric" | "dec" | "fixed" => LogicalType::Decimal,
            "char" | "nchar" => LogicalType::Char,
            "varchar" | "nvarchar" | "enum" | "set" => LogicalType::String,
            "tinytext" | "text" | "mediumtext" | "longtext" => LogicalType::Text,
            "json" => {
                if self.engine == Engine::MySql && self.version >= MYSQL_NATIVE_JSON {
                    LogicalType::Json
                } else {
                    LogicalType::Text
                }
            }
            "binary" | "varbinary" | "tinyblob" | "blob" | "mediumblob" | "longblob" => {
                LogicalType::Binary
            }
            "date" | "year" => LogicalType::Date,
            "time" => LogicalType::Time,
            "datetime" => LogicalType::DateTime,
            "timestamp" => LogicalType::Timestamp,
            _ => LogicalType::String,
        }
    }
}

/// Host representation for a logical type
///
/// Unsigned BIGINT does not fit an `i64` and is carried as a string, as is
/// DECIMAL so no precision is lost.
fn runtime_type(logical: LogicalType, unsigned: bool) -> RuntimeType {
    match logical {
        LogicalType::BigInt if unsigned => RuntimeType::String,
        l if l.is_integer() => RuntimeType::Integer,
        LogicalType::Boolean => RuntimeType::Boolean,
        LogicalType::Float | LogicalType::Double => RuntimeType::Float,
        _ => RuntimeType::String,
    }
}
