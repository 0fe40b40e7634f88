//! Engine-independent machinery for schema introspection
//!
//! - [`Connection`] is the seam to the execution layer
//! - [`Dialect`] bundles one engine's quoting, loading and DDL building
//! - [`DefaultNormalizer`] runs an engine's default-value quirk table
//! - [`SchemaCache`] and [`Catalog`] own loaded metadata per connection

#[macro_use]
mod tracing;

pub mod cache;
pub mod catalog;
pub mod connection;
pub mod default_value;
pub mod dialect;
pub mod error;
pub mod options;
pub mod physical;
pub mod row;

pub use cache::SchemaCache;
pub use catalog::Catalog;
pub use connection::Connection;
pub use default_value::{DefaultError, DefaultNormalizer, DefaultRule, RawDefault, RuleResult};
pub use dialect::{DdlBuilder, Dialect, Quoter, SchemaLoader, require_expression, validate_identifier};
pub use error::{BoxError, ConnectionError, Result, SchemaError};
pub use options::CatalogOptions;
pub use physical::PhysicalType;
pub use row::{CaseFolding, Row, RowReader, group_by_key};

// Re-export the data model so engine crates need a single dependency
pub use schemata_types as types;
