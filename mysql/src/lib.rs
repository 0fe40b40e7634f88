//! MySQL and MariaDB dialect for schemata
//!
//! Both engines share one [`MySqlDialect`]; behaviour that differs between
//! them, or between server versions, is decided from the [`Engine`] and
//! [`ServerVersion`] it was built with:
//!
//! - type mapping ([`MySqlTypeMapper`])
//! - the default-value quirk table ([`defaults::DEFAULT_RULES`])
//! - introspection queries (`SHOW FULL COLUMNS`, `INFORMATION_SCHEMA`)
//! - DDL fragments for constraints and indexes
//!
//! # Features
//!
//! - `tracing` - Log every introspection query via the `tracing` crate

pub mod defaults;
mod ddl;
mod loader;
pub mod quoting;
mod types;

use schemata_core::{CatalogOptions, DefaultNormalizer, Dialect, Quoter, Result, SchemaError};
use schemata_types::{Engine, ServerVersion};

pub use types::MySqlTypeMapper;

const MYSQL_CHECKS: ServerVersion = ServerVersion::new(8, 0, 16);
const MARIADB_CHECK_CATALOG: ServerVersion = ServerVersion::new(10, 2, 0);
const MARIADB_CHECK_ENFORCED: ServerVersion = ServerVersion::new(10, 2, 1);

/// Dialect for one MySQL or MariaDB server
#[derive(Debug, Clone)]
pub struct MySqlDialect {
    engine: Engine,
    version: ServerVersion,
    types: MySqlTypeMapper,
    defaults: DefaultNormalizer,
}

impl MySqlDialect {
    /// Build the dialect for a MySQL-family engine
    pub fn new(engine: Engine, version: ServerVersion, options: &CatalogOptions) -> Result<Self> {
        if !engine.is_mysql_family() {
            return Err(SchemaError::InvalidArgument(format!(
                "{engine} is not a MySQL-family engine"
            )));
        }
        Ok(Self::build(engine, version, options))
    }

    /// Oracle MySQL with default options
    #[must_use]
    pub fn mysql(version: ServerVersion) -> Self {
        Self::build(Engine::MySql, version, &CatalogOptions::default())
    }

    /// MariaDB with default options
    #[must_use]
    pub fn mariadb(version: ServerVersion) -> Self {
        Self::build(Engine::MariaDb, version, &CatalogOptions::default())
    }

    fn build(engine: Engine, version: ServerVersion, options: &CatalogOptions) -> Self {
        Self {
            engine,
            version,
            types: MySqlTypeMapper::new(engine, version)
                .tinyint1_as_boolean(options.tinyint1_as_boolean),
            defaults: DefaultNormalizer::new(defaults::DEFAULT_RULES, engine, version),
        }
    }

    #[inline]
    #[must_use]
    pub fn engine(&self) -> Engine {
        self.engine
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> ServerVersion {
        self.version
    }

    #[inline]
    #[must_use]
    pub fn is_mariadb(&self) -> bool {
        self.engine == Engine::MariaDb
    }

    #[must_use]
    pub fn type_mapper(&self) -> &MySqlTypeMapper {
        &self.types
    }

    #[must_use]
    pub fn normalizer(&self) -> &DefaultNormalizer {
        &self.defaults
    }

    /// Whether `INFORMATION_SCHEMA.CHECK_CONSTRAINTS` exists
    #[must_use]
    pub fn supports_checks(&self) -> bool {
        match self.engine {
            Engine::MariaDb => self.version >= MARIADB_CHECK_CATALOG,
            _ => self.version >= MYSQL_CHECKS,
        }
    }

    /// Whether the server enforces checks it is asked to create
    #[must_use]
    pub fn supports_check_ddl(&self) -> bool {
        match self.engine {
            Engine::MariaDb => self.version >= MARIADB_CHECK_ENFORCED,
            _ => self.version >= MYSQL_CHECKS,
        }
    }

    /// `CHECK (...) NOT ENFORCED` is MySQL-only
    #[must_use]
    pub fn supports_not_enforced_checks(&self) -> bool {
        self.engine == Engine::MySql && self.version >= MYSQL_CHECKS
    }

    fn engine_name(&self) -> &'static str {
        match self.engine {
            Engine::MariaDb => "MariaDB",
            _ => "MySQL",
        }
    }
}

impl Quoter for MySqlDialect {
    fn max_identifier_len(&self) -> usize {
        quoting::MAX_IDENTIFIER_LEN
    }

    fn quote_simple_identifier(&self, name: &str) -> String {
        quoting::quote_identifier(name)
    }

    fn quote_string(&self, value: &str) -> String {
        quoting::quote_string(value)
    }
}

impl Dialect for MySqlDialect {
    fn engine(&self) -> Engine {
        self.engine
    }

    fn server_version(&self) -> ServerVersion {
        self.version
    }
}
