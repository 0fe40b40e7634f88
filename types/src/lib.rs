//! Shared metadata model for schemata
//!
//! This crate holds the engine-independent description of a table as loaded
//! from a live database:
//!
//! - [`Engine`] and [`ServerVersion`], resolved once per connection
//! - [`ColumnSchema`] and the [`LogicalType`]/[`RuntimeType`] classification
//! - the constraint entities in [`constraint`]
//! - [`TableSchema`] and [`TableName`]
//!
//! Everything here is plain data. Loading, caching and DDL generation live in
//! `schemata-core` and the engine crates.
//!
//! # Features
//!
//! - `serde` - Enable serde serialization/deserialization of every model type

mod column;
pub mod constraint;
mod engine;
mod error;
mod logical;
pub mod serde_helpers;
mod table;
mod value;

pub use column::ColumnSchema;
pub use constraint::{
    Check, ConstraintKind, ConstraintSet, DefaultConstraint, ForeignKey, Index, PrimaryKey,
    ReferentialAction, Unique,
};
pub use engine::{Engine, ServerVersion};
pub use error::ModelError;
pub use logical::{LogicalType, MappedType, RuntimeType};
pub use table::{TableName, TableSchema};
pub use value::{DefaultValue, Expression, Value, ValueParseError};

/// Prelude module for commonly used types
pub mod prelude {
    pub use crate::constraint::*;
    pub use crate::{
        ColumnSchema, DefaultValue, Engine, Expression, LogicalType, MappedType, RuntimeType,
        ServerVersion, TableName, TableSchema, Value,
    };
}
