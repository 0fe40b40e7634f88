//! Per-connection owner of the dialect and schema cache

use std::sync::Arc;

use schemata_types::{
    Check, ConstraintKind, ConstraintSet, DefaultConstraint, Engine, ForeignKey, Index,
    PrimaryKey, ServerVersion, TableName, TableSchema, Unique,
};

use crate::cache::SchemaCache;
use crate::connection::Connection;
use crate::dialect::{DdlBuilder, Dialect};
use crate::error::{Result, SchemaError};
use crate::options::CatalogOptions;
use crate::row::Row;

/// Schema metadata for one connection
///
/// Owns the connection, the dialect chosen for it and a cache that lives and
/// dies with this value. Nothing is shared between catalogs.
pub struct Catalog<C> {
    conn: C,
    dialect: Box<dyn Dialect>,
    options: CatalogOptions,
    cache: SchemaCache,
}

impl<C: Connection> Catalog<C> {
    pub fn new(conn: C, dialect: Box<dyn Dialect>, options: CatalogOptions) -> Self {
        Self {
            conn,
            dialect,
            options,
            cache: SchemaCache::new(),
        }
    }

    #[inline]
    pub fn connection(&self) -> &C {
        &self.conn
    }

    #[inline]
    pub fn dialect(&self) -> &dyn Dialect {
        self.dialect.as_ref()
    }

    /// DDL fragment builder for this connection's engine
    #[inline]
    pub fn ddl(&self) -> &dyn DdlBuilder {
        self.dialect.as_ref()
    }

    #[inline]
    pub fn options(&self) -> &CatalogOptions {
        &self.options
    }

    #[inline]
    pub fn cache(&self) -> &SchemaCache {
        &self.cache
    }

    #[inline]
    pub fn engine(&self) -> Engine {
        self.dialect.engine()
    }

    #[inline]
    pub fn server_version(&self) -> ServerVersion {
        self.dialect.server_version()
    }

    /// Resolve a caller-supplied table name against the default schema
    pub fn resolve(&self, table: &str) -> TableName {
        let default_schema = self
            .options
            .default_schema
            .as_deref()
            .or_else(|| self.dialect.default_schema());
        TableName::parse(table).or_schema(default_schema)
    }

    /// Table schema, loaded on first use; `Ok(None)` if the table does not exist
    pub fn table_schema(&self, table: &str) -> Result<Option<Arc<TableSchema>>> {
        self.table_schema_of(&self.resolve(table))
    }

    /// Constraints of one kind, loaded on first use
    pub fn constraints(&self, table: &str, kind: ConstraintKind) -> Result<Arc<ConstraintSet>> {
        self.constraints_of(&self.resolve(table), kind)
    }

    pub fn primary_key(&self, table: &str) -> Result<Option<PrimaryKey>> {
        match self.constraints(table, ConstraintKind::PrimaryKey)?.as_ref() {
            ConstraintSet::PrimaryKey(pk) => Ok(pk.clone()),
            other => Err(self.wrong_kind(table, ConstraintKind::PrimaryKey, other)),
        }
    }

    pub fn foreign_keys(&self, table: &str) -> Result<Vec<ForeignKey>> {
        match self.constraints(table, ConstraintKind::ForeignKeys)?.as_ref() {
            ConstraintSet::ForeignKeys(fks) => Ok(fks.clone()),
            other => Err(self.wrong_kind(table, ConstraintKind::ForeignKeys, other)),
        }
    }

    pub fn uniques(&self, table: &str) -> Result<Vec<Unique>> {
        match self.constraints(table, ConstraintKind::Uniques)?.as_ref() {
            ConstraintSet::Uniques(uniques) => Ok(uniques.clone()),
            other => Err(self.wrong_kind(table, ConstraintKind::Uniques, other)),
        }
    }

    pub fn checks(&self, table: &str) -> Result<Vec<Check>> {
        match self.constraints(table, ConstraintKind::Checks)?.as_ref() {
            ConstraintSet::Checks(checks) => Ok(checks.clone()),
            other => Err(self.wrong_kind(table, ConstraintKind::Checks, other)),
        }
    }

    pub fn indexes(&self, table: &str) -> Result<Vec<Index>> {
        match self.constraints(table, ConstraintKind::Indexes)?.as_ref() {
            ConstraintSet::Indexes(indexes) => Ok(indexes.clone()),
            other => Err(self.wrong_kind(table, ConstraintKind::Indexes, other)),
        }
    }

    pub fn defaults(&self, table: &str) -> Result<Vec<DefaultConstraint>> {
        match self.constraints(table, ConstraintKind::Defaults)?.as_ref() {
            ConstraintSet::Defaults(defaults) => Ok(defaults.clone()),
            other => Err(self.wrong_kind(table, ConstraintKind::Defaults, other)),
        }
    }

    /// Forget everything cached for one table
    pub fn refresh_table_schema(&self, table: &str) {
        self.cache.invalidate(&self.resolve(table));
    }

    /// Forget everything cached
    pub fn refresh(&self) {
        self.cache.invalidate_all();
    }

    /// Run a schema-altering statement, then drop the table's cached metadata
    pub fn execute_ddl(&self, table: &str, sql: &str) -> Result<Vec<Row>> {
        schemata_trace_query!(self.engine(), sql);
        let rows = self.conn.execute(sql)?;
        self.refresh_table_schema(table);
        Ok(rows)
    }

    /// Build and run `ADD CONSTRAINT ... CHECK`
    pub fn add_check(&self, name: &str, table: &str, expression: &str, enforce: bool) -> Result<()> {
        let sql = self
            .dialect
            .add_check(name, &self.resolve(table), expression, enforce)?;
        self.execute_ddl(table, &sql).map(|_| ())
    }

    /// Build and run the engine's drop-check statement
    pub fn drop_check(&self, name: &str, table: &str) -> Result<()> {
        let sql = self.dialect.drop_check(name, &self.resolve(table))?;
        self.execute_ddl(table, &sql).map(|_| ())
    }

    pub fn quote_table_name(&self, table: &str) -> Result<String> {
        self.dialect.quote_table_name(&TableName::parse(table))
    }

    pub fn quote_column_name(&self, column: &str) -> Result<String> {
        self.dialect.quote_identifier(column)
    }

    // ========================================================================
    // Loading
    // ========================================================================

    fn table_schema_of(&self, table: &TableName) -> Result<Option<Arc<TableSchema>>> {
        let folding = self.conn.case_folding();
        let load = || self.load_table_schema(table);
        if !self.options.cache_enabled {
            return self.cache.load_table_schema(table, folding, load);
        }
        self.cache.table_schema(table, folding, load)
    }

    fn constraints_of(&self, table: &TableName, kind: ConstraintKind) -> Result<Arc<ConstraintSet>> {
        let folding = self.conn.case_folding();
        let load = || self.load_constraints(table, kind);
        if !self.options.cache_enabled {
            return self.cache.load_constraints(table, kind, folding, load);
        }
        self.cache.constraints(table, kind, folding, load)
    }

    fn load_table_schema(&self, table: &TableName) -> Result<Option<TableSchema>> {
        let folding = self.conn.case_folding();
        let Some(schema) = self.dialect.load_table_schema(&self.conn, table, folding)? else {
            return Ok(None);
        };
        schema.validate().map_err(|e| {
            schemata_warn_metadata!(table, e);
            SchemaError::from_model(table, e)
        })?;
        Ok(Some(schema))
    }

    /// Load one constraint kind and check its columns against the table
    ///
    /// With the cache disabled the check reloads the table schema.
    fn load_constraints(&self, table: &TableName, kind: ConstraintKind) -> Result<ConstraintSet> {
        let folding = self.conn.case_folding();
        let set = self
            .dialect
            .load_constraints(&self.conn, table, kind, folding)?;
        if set.is_empty() {
            return Ok(set);
        }
        if let Some(schema) = self.table_schema_of(table)? {
            let columns = schema.column_names();
            set.validate_against(&columns).map_err(|e| {
                schemata_warn_metadata!(table, e);
                SchemaError::from_model(table, e)
            })?;
        }
        Ok(set)
    }

    fn wrong_kind(&self, table: &str, expected: ConstraintKind, got: &ConstraintSet) -> SchemaError {
        SchemaError::malformed(
            table,
            format!("loader returned {} where {expected} were requested", got.kind()),
        )
    }
}

impl<C> core::fmt::Debug for Catalog<C> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Catalog")
            .field("engine", &self.dialect.engine())
            .field("server_version", &self.dialect.server_version())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
