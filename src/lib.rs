//! # schemata
//!
//! Schema introspection and constraint metadata for MySQL, MariaDB and SQL
//! Server, presented through one engine-independent model.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use schemata::prelude::*;
//!
//! // `conn` is any type implementing `schemata::Connection`
//! let catalog = schemata::open(conn, CatalogOptions::default())?;
//!
//! if let Some(users) = catalog.table_schema("users")? {
//!     for column in &users.columns {
//!         println!("{} {} default={:?}", column.name, column.db_type, column.default);
//!     }
//! }
//! for fk in catalog.foreign_keys("orders")? {
//!     println!("{:?} -> {}", fk.name, fk.foreign_table);
//! }
//! ```
//!
//! ## Engine Support
//!
//! | Engine     | Driver names              | Feature Flag |
//! |------------|---------------------------|--------------|
//! | MySQL      | `mysql`                   | `mysql`      |
//! | MariaDB    | `mysql`, `mariadb`        | `mysql`      |
//! | SQL Server | `sqlsrv`, `mssql`, `dblib` | `mssql`      |
//!
//! MariaDB is told apart from MySQL by the server version string.
//!
//! ## Features
//!
//! - `tracing` - Debug logs for every introspection query and cache event,
//!   warnings for malformed metadata
//! - `serde` - Serialize/Deserialize for the data model

pub mod config;

pub use config::{Config, ConfigError};

pub use schemata_core::{
    CaseFolding, Catalog, CatalogOptions, Connection, ConnectionError, DdlBuilder, Dialect,
    Quoter, Result, Row, SchemaCache, SchemaError, SchemaLoader,
};
pub use schemata_types::{
    Check, ColumnSchema, ConstraintKind, ConstraintSet, DefaultConstraint, DefaultValue, Engine,
    Expression, ForeignKey, Index, LogicalType, MappedType, PrimaryKey, ReferentialAction,
    RuntimeType, ServerVersion, TableName, TableSchema, Unique, Value,
};

/// Engine-independent machinery
pub mod core {
    pub use schemata_core::*;
}

/// Data model
pub mod types {
    pub use schemata_types::*;
}

#[cfg(feature = "mysql")]
pub mod mysql {
    //! MySQL and MariaDB dialect
    pub use schemata_mysql::*;
}

#[cfg(feature = "mssql")]
pub mod mssql {
    //! SQL Server dialect
    pub use schemata_mssql::*;
}

pub mod prelude {
    pub use crate::{
        open, CaseFolding, Catalog, CatalogOptions, Connection, ConstraintKind, DefaultValue,
        Engine, SchemaError, ServerVersion, TableName, TableSchema, Value,
    };
}

/// Identify the engine and version behind a connection
///
/// Fails with `NotSupported` for drivers of other engines and with
/// `InvalidArgument` when the server version string has no version number.
pub fn detect<C: Connection + ?Sized>(conn: &C) -> Result<(Engine, ServerVersion)> {
    let driver = conn.driver_name();
    let raw_version = conn.server_version();
    let engine = Engine::detect(driver, raw_version)
        .ok_or_else(|| SchemaError::not_supported(format!("driver '{driver}'")))?;
    let version = ServerVersion::parse(raw_version).ok_or_else(|| {
        SchemaError::InvalidArgument(format!("unrecognized server version '{raw_version}'"))
    })?;
    Ok((engine, version))
}

/// Build the dialect for an engine variant
pub fn dialect_for(
    engine: Engine,
    version: ServerVersion,
    options: &CatalogOptions,
) -> Result<Box<dyn Dialect>> {
    match engine {
        #[cfg(feature = "mysql")]
        Engine::MySql | Engine::MariaDb => Ok(Box::new(schemata_mysql::MySqlDialect::new(
            engine, version, options,
        )?)),
        #[cfg(feature = "mssql")]
        Engine::SqlServer => Ok(Box::new(schemata_mssql::MssqlDialect::new(version))),
        #[allow(unreachable_patterns)]
        _ => {
            let _ = (version, options);
            Err(SchemaError::not_supported(format!(
                "{engine} support is not compiled in"
            )))
        }
    }
}

/// Open a catalog over `conn`, choosing the dialect once from the
/// connection's driver name and server version
pub fn open<C: Connection>(conn: C, options: CatalogOptions) -> Result<Catalog<C>> {
    let (engine, version) = detect(&conn)?;
    let dialect = dialect_for(engine, version, &options)?;
    #[cfg(feature = "tracing")]
    tracing::debug!(engine = %engine, version = %version, "schemata.open");
    Ok(Catalog::new(conn, dialect, options))
}
