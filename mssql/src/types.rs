//! SQL Server physical type mapping

use schemata_core::PhysicalType;
use schemata_types::{LogicalType, MappedType, RuntimeType, ServerVersion};

/// SQL Server 2025 adds a native `json` type
const NATIVE_JSON: ServerVersion = ServerVersion::new(17, 0, 0);

/// Maps SQL Server type names to logical and runtime types
///
/// Input is the type as the loader renders it from `INFORMATION_SCHEMA`:
/// `int`, `nvarchar(50)`, `varchar(max)`, `decimal(18,4)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MssqlTypeMapper {
    version: ServerVersion,
}

impl MssqlTypeMapper {
    #[must_use]
    pub const fn new(version: ServerVersion) -> Self {
        Self { version }
    }

    #[must_use]
    pub fn map(&self, raw: &str) -> MappedType {
        let physical = PhysicalType::parse(raw);
        let is_max = physical
            .params
            .first()
            .is_some_and(|p| p.eq_ignore_ascii_case("max"));

        let logical = match physical.base.as_str() {
            "bit" => LogicalType::Boolean,
            "tinyint" => LogicalType::TinyInt,
            "smallint" => LogicalType::SmallInt,
            "int" => LogicalType::Integer,
            "bigint" => LogicalType::BigInt,
            "decimal" | "numeric" => LogicalType::Decimal,
            "money" | "smallmoney" => LogicalType::Money,
            "float" => LogicalType::Double,
            "real" => LogicalType::Float,
            "date" => LogicalType::Date,
            "time" => LogicalType::Time,
            "datetime" | "datetime2" | "smalldatetime" | "datetimeoffset" => LogicalType::DateTime,
            "timestamp" | "rowversion" => LogicalType::Binary,
            "char" | "nchar" => LogicalType::Char,
            "varchar" | "nvarchar" if is_max => LogicalType::Text,
            "varchar" | "nvarchar" => LogicalType::String,
            "text" | "ntext" => LogicalType::Text,
            "binary" | "varbinary" | "image" => LogicalType::Binary,
            "uniqueidentifier" => LogicalType::String,
            "json" if self.version >= NATIVE_JSON => LogicalType::Json,
            _ => LogicalType::String,
        };

        let mut mapped = MappedType::new(logical, runtime_type(logical));
        mapped.size = physical.param_u32(0);
        mapped.precision = mapped.size;
        mapped.scale = physical.param_u32(1);
        mapped
    }
}

fn runtime_type(logical: LogicalType) -> RuntimeType {
    match logical {
        l if l.is_integer() => RuntimeType::Integer,
        LogicalType::Boolean => RuntimeType::Boolean,
        LogicalType::Float | LogicalType::Double => RuntimeType::Float,
        _ => RuntimeType::String,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mapper() -> MssqlTypeMapper {
        MssqlTypeMapper::new(ServerVersion::new(16, 0, 1000))
    }

    #[test]
    fn test_integer_family_and_bit() {
        for (raw, logical) in [
            ("tinyint", LogicalType::TinyInt),
            ("smallint", LogicalType::SmallInt),
            ("int", LogicalType::Integer),
            ("bigint", LogicalType::BigInt),
        ] {
            let m = mapper().map(raw);
            assert_eq!((m.logical, m.runtime), (logical, RuntimeType::Integer), "{raw}");
        }
        let m = mapper().map("bit");
        assert_eq!((m.logical, m.runtime), (LogicalType::Boolean, RuntimeType::Boolean));
    }

    #[test]
    fn test_strings_and_max() {
        let m = mapper().map("nvarchar(50)");
        assert_eq!(m.logical, LogicalType::String);
        assert_eq!(m.size, Some(50));

        let m = mapper().map("varchar(max)");
        assert_eq!(m.logical, LogicalType::Text);
        assert_eq!(m.size, None);

        assert_eq!(mapper().map("nchar(2)").logical, LogicalType::Char);
        assert_eq!(mapper().map("ntext").logical, LogicalType::Text);
        assert_eq!(mapper().map("uniqueidentifier").logical, LogicalType::String);
    }

    #[test]
    fn test_numeric_and_temporal() {
        let m = mapper().map("decimal(18,4)");
        assert_eq!((m.logical, m.runtime), (LogicalType::Decimal, RuntimeType::String));
        assert_eq!((m.precision, m.scale), (Some(18), Some(4)));

        assert_eq!(mapper().map("money").logical, LogicalType::Money);
        assert_eq!(mapper().map("float").logical, LogicalType::Double);
        assert_eq!(mapper().map("real").runtime, RuntimeType::Float);
        assert_eq!(mapper().map("datetime2(7)").logical, LogicalType::DateTime);
        assert_eq!(mapper().map("rowversion").logical, LogicalType::Binary);
    }

    #[test]
    fn test_json_needs_2025() {
        assert_eq!(mapper().map("json").logical, LogicalType::String);
        let new = MssqlTypeMapper::new(ServerVersion::new(17, 0, 0));
        assert_eq!(new.map("json").logical, LogicalType::Json);
        assert_eq!(mapper().map("hierarchyid").logical, LogicalType::String);
    }
}
