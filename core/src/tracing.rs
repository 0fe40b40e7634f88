//! Tracing utilities for introspection and cache observability.
//!
//! Enable the `tracing` feature to emit events via the `tracing` crate.
//! These macros no-op when the feature is disabled, avoiding `#[cfg]` boilerplate
//! at every call site. The feature is checked in the crate that expands the
//! macro, so engine crates forward their own `tracing` feature.

/// Emit a debug-level tracing event for an introspection or DDL statement.
///
/// ```ignore
/// schemata_trace_query!("mysql", &sql);
/// ```
#[macro_export]
macro_rules! schemata_trace_query {
    ($engine:expr, $sql:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(engine = %$engine, sql = %$sql, "schemata.query");
    };
}

/// Emit a debug-level tracing event for a cache hit, miss or invalidation.
///
/// ```ignore
/// schemata_trace_cache!("hit", &key);
/// schemata_trace_cache!("invalidate", &table);
/// ```
#[macro_export]
macro_rules! schemata_trace_cache {
    ($event:literal, $key:expr) => {
        #[cfg(feature = "tracing")]
        tracing::debug!(event = $event, key = ?$key, "schemata.cache");
    };
}

/// Emit a warn-level tracing event before malformed metadata is returned.
///
/// ```ignore
/// schemata_warn_metadata!(&table, &message);
/// ```
#[macro_export]
macro_rules! schemata_warn_metadata {
    ($table:expr, $message:expr) => {
        #[cfg(feature = "tracing")]
        tracing::warn!(table = %$table, detail = %$message, "schemata.malformed_metadata");
    };
}
