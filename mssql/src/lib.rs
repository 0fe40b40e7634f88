//! SQL Server dialect for schemata
//!
//! Columns come from `INFORMATION_SCHEMA.COLUMNS`; constraints, indexes and
//! named defaults come from the `sys` catalog views. Unqualified tables are
//! looked up in `dbo`.
//!
//! # Features
//!
//! - `tracing` - Log every introspection query via the `tracing` crate

pub mod defaults;
mod ddl;
mod loader;
pub mod quoting;
mod types;

use schemata_core::{DefaultNormalizer, Dialect, Quoter};
use schemata_types::{Engine, ServerVersion};

pub use types::MssqlTypeMapper;

/// Schema unqualified table names resolve to
pub const DEFAULT_SCHEMA: &str = "dbo";

/// Dialect for one SQL Server instance
#[derive(Debug, Clone)]
pub struct MssqlDialect {
    version: ServerVersion,
    types: MssqlTypeMapper,
    defaults: DefaultNormalizer,
}

impl MssqlDialect {
    #[must_use]
    pub fn new(version: ServerVersion) -> Self {
        Self {
            version,
            types: MssqlTypeMapper::new(version),
            defaults: DefaultNormalizer::new(defaults::DEFAULT_RULES, Engine::SqlServer, version),
        }
    }

    #[inline]
    #[must_use]
    pub fn version(&self) -> ServerVersion {
        self.version
    }

    #[must_use]
    pub fn type_mapper(&self) -> &MssqlTypeMapper {
        &self.types
    }

    #[must_use]
    pub fn normalizer(&self) -> &DefaultNormalizer {
        &self.defaults
    }
}

impl Quoter for MssqlDialect {
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

impl Dialect for MssqlDialect {
    fn engine(&self) -> Engine {
        Engine::SqlServer
    }

    fn server_version(&self) -> ServerVersion {
        self.version
    }

    fn default_schema(&self) -> Option<&str> {
        Some(DEFAULT_SCHEMA)
    }
}
