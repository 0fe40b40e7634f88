//! Per-connection schema cache with single-flight loading
//!
//! Finished entries are read without waiting on any load. A miss takes the
//! key's load lock, so concurrent callers for one key wait for a single
//! introspection and then share its result. Failed loads are not stored.
//! Invalidation drops values but never a key's load lock, so a reload
//! after invalidation waits for the load still in flight.

use core::fmt;
use core::hash::Hash;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use schemata_types::{ConstraintKind, ConstraintSet, TableName, TableSchema};

use crate::error::Result;
use crate::row::CaseFolding;

/// Key of a cached table schema
///
/// The same table may be cached once per case-folding mode.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct TableKey {
    table: TableName,
    folding: CaseFolding,
}

/// Key of a cached constraint set
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct ConstraintKey {
    table: TableName,
    kind: ConstraintKind,
    folding: CaseFolding,
}

/// Single-flight map from key to lazily loaded value
///
/// Load locks live apart from the values and survive invalidation, so a
/// key never has two loads in flight. A load that overlaps any
/// invalidation returns its value without storing it.
#[derive(Debug)]
struct Shard<K, V> {
    values: RwLock<HashMap<K, V>>,
    locks: Mutex<HashMap<K, Arc<Mutex<()>>>>,
    /// Bumped by every invalidation
    generation: AtomicU64,
}

impl<K, V> Default for Shard<K, V> {
    fn default() -> Self {
        Self {
            values: RwLock::new(HashMap::new()),
            locks: Mutex::new(HashMap::new()),
            generation: AtomicU64::new(0),
        }
    }
}

impl<K, V> Shard<K, V>
where
    K: Clone + Eq + Hash + fmt::Debug,
    V: Clone,
{
    fn get_or_load<F>(&self, key: &K, load: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        if let Some(value) = self.get(key) {
            schemata_trace_cache!("hit", key);
            return Ok(value);
        }

        let lock = self.lock_for(key);
        let _loading = lock.lock().unwrap_or_else(PoisonError::into_inner);
        // Another caller may have finished the load while we waited
        if let Some(value) = self.get(key) {
            schemata_trace_cache!("hit", key);
            return Ok(value);
        }

        schemata_trace_cache!("miss", key);
        let generation = self.generation.load(Ordering::Acquire);
        let value = load()?;

        let mut values = self.write();
        if self.generation.load(Ordering::Acquire) == generation {
            values.insert(key.clone(), value.clone());
        }
        Ok(value)
    }

    /// Run `load` under the key's load lock without storing the result
    fn load_serialized<F>(&self, key: &K, load: F) -> Result<V>
    where
        F: FnOnce() -> Result<V>,
    {
        let lock = self.lock_for(key);
        let _loading = lock.lock().unwrap_or_else(PoisonError::into_inner);
        load()
    }

    fn get(&self, key: &K) -> Option<V> {
        self.read().get(key).cloned()
    }

    fn lock_for(&self, key: &K) -> Arc<Mutex<()>> {
        let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(locks.entry(key.clone()).or_default())
    }

    fn is_loaded(&self, key: &K) -> bool {
        self.read().contains_key(key)
    }

    fn loaded(&self) -> usize {
        self.read().len()
    }

    fn retain(&self, keep: impl Fn(&K) -> bool) {
        let mut values = self.write();
        values.retain(|key, _| keep(key));
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    fn clear(&self) {
        let mut values = self.write();
        values.clear();
        self.generation.fetch_add(1, Ordering::AcqRel);
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<K, V>> {
        self.values.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<K, V>> {
        self.values.write().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Table schemas and constraint sets loaded through one connection
#[derive(Debug, Default)]
pub struct SchemaCache {
    /// `None` records that the table does not exist
    tables: Shard<TableKey, Option<Arc<TableSchema>>>,
    constraints: Shard<ConstraintKey, Arc<ConstraintSet>>,
}

impl SchemaCache {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Cached table schema, or the result of `load` stored for next time
    pub fn table_schema<F>(
        &self,
        table: &TableName,
        folding: CaseFolding,
        load: F,
    ) -> Result<Option<Arc<TableSchema>>>
    where
        F: FnOnce() -> Result<Option<TableSchema>>,
    {
        let key = TableKey {
            table: table.clone(),
            folding,
        };
        self.tables
            .get_or_load(&key, || Ok(load()?.map(Arc::new)))
    }

    /// Cached constraint set, or the result of `load` stored for next time
    pub fn constraints<F>(
        &self,
        table: &TableName,
        kind: ConstraintKind,
        folding: CaseFolding,
        load: F,
    ) -> Result<Arc<ConstraintSet>>
    where
        F: FnOnce() -> Result<ConstraintSet>,
    {
        let key = ConstraintKey {
            table: table.clone(),
            kind,
            folding,
        };
        self.constraints.get_or_load(&key, || load().map(Arc::new))
    }

    /// Load a table schema under its key's load lock, storing nothing
    pub fn load_table_schema<F>(
        &self,
        table: &TableName,
        folding: CaseFolding,
        load: F,
    ) -> Result<Option<Arc<TableSchema>>>
    where
        F: FnOnce() -> Result<Option<TableSchema>>,
    {
        let key = TableKey {
            table: table.clone(),
            folding,
        };
        self.tables
            .load_serialized(&key, || Ok(load()?.map(Arc::new)))
    }

    /// Load a constraint set under its key's load lock, storing nothing
    pub fn load_constraints<F>(
        &self,
        table: &TableName,
        kind: ConstraintKind,
        folding: CaseFolding,
        load: F,
    ) -> Result<Arc<ConstraintSet>>
    where
        F: FnOnce() -> Result<ConstraintSet>,
    {
        let key = ConstraintKey {
            table: table.clone(),
            kind,
            folding,
        };
        self.constraints.load_serialized(&key, || load().map(Arc::new))
    }

    /// Drop every entry for `table`, across kinds and case-folding modes
    pub fn invalidate(&self, table: &TableName) {
        schemata_trace_cache!("invalidate", table);
        self.tables.retain(|key| &key.table != table);
        self.constraints.retain(|key| &key.table != table);
    }

    pub fn invalidate_all(&self) {
        schemata_trace_cache!("invalidate_all", "*");
        self.tables.clear();
        self.constraints.clear();
    }

    /// Whether a loaded schema (or a recorded not-found) is cached
    #[must_use]
    pub fn has_table_schema(&self, table: &TableName, folding: CaseFolding) -> bool {
        self.tables.is_loaded(&TableKey {
            table: table.clone(),
            folding,
        })
    }

    #[must_use]
    pub fn has_constraints(
        &self,
        table: &TableName,
        kind: ConstraintKind,
        folding: CaseFolding,
    ) -> bool {
        self.constraints.is_loaded(&ConstraintKey {
            table: table.clone(),
            kind,
            folding,
        })
    }

    /// Number of finished entries of either kind
    #[must_use]
    pub fn len(&self) -> usize {
        self.tables.loaded() + self.constraints.loaded()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
