//! Shared test connections
//!
//! - [`MockConnection`] answers queries from a script and records every
//!   statement it sees
//! - [`FakeMySql`] keeps a tiny in-memory catalog and applies the
//!   `ALTER TABLE ... CHECK` statements the DDL builder produces
#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use regex::Regex;
use schemata::{CaseFolding, Connection, ConnectionError, Row, Value};

// ============================================================================
// Scripted connection
// ============================================================================

enum Response {
    Rows(Vec<Row>),
    Error { sql_state: &'static str, message: String },
}

/// Connection answering each statement with the first scripted response
/// whose pattern matches; unmatched statements return no rows
pub struct MockConnection {
    driver: &'static str,
    version: String,
    folding: CaseFolding,
    script: Vec<(Regex, Response)>,
    log: Mutex<Vec<String>>,
    calls: AtomicUsize,
    active: AtomicUsize,
    peak: AtomicUsize,
    delay: Option<Duration>,
}

impl MockConnection {
    pub fn new(driver: &'static str, version: &str) -> Self {
        Self {
            driver,
            version: version.to_string(),
            folding: CaseFolding::Natural,
            script: Vec::new(),
            log: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            active: AtomicUsize::new(0),
            peak: AtomicUsize::new(0),
            delay: None,
        }
    }

    pub fn mysql(version: &str) -> Self {
        Self::new("mysql", version)
    }

    pub fn mssql(version: &str) -> Self {
        Self::new("sqlsrv", version)
    }

    /// Fold result-row keys the way a driver configured with `folding` would
    pub fn folding(mut self, folding: CaseFolding) -> Self {
        self.folding = folding;
        self
    }

    /// Sleep inside every `execute`, to widen race windows
    pub fn delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn on(mut self, pattern: &str, rows: Vec<Row>) -> Self {
        self.script.push((regex(pattern), Response::Rows(rows)));
        self
    }

    pub fn fail(mut self, pattern: &str, sql_state: &'static str, message: &str) -> Self {
        self.script.push((
            regex(pattern),
            Response::Error {
                sql_state,
                message: message.to_string(),
            },
        ));
        self
    }

    /// Number of statements executed so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn queries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    /// Most statements ever executing at once
    pub fn peak_concurrency(&self) -> usize {
        self.peak.load(Ordering::SeqCst)
    }

    /// Statements containing `needle`
    pub fn count(&self, needle: &str) -> usize {
        self.queries().iter().filter(|q| q.contains(needle)).count()
    }
}

impl Connection for MockConnection {
    fn execute(&self, sql: &str) -> Result<Vec<Row>, ConnectionError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.log.lock().unwrap().push(sql.to_string());
        let active = self.active.fetch_add(1, Ordering::SeqCst) + 1;
        self.peak.fetch_max(active, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            std::thread::sleep(delay);
        }
        self.active.fetch_sub(1, Ordering::SeqCst);

        match self.script.iter().find(|(pattern, _)| pattern.is_match(sql)) {
            Some((_, Response::Rows(rows))) => {
                Ok(rows.iter().map(|row| fold_keys(row, self.folding)).collect())
            }
            Some((_, Response::Error { sql_state, message })) => {
                Err(ConnectionError::new(message.clone()).with_sql_state(*sql_state))
            }
            None => Ok(Vec::new()),
        }
    }

    fn driver_name(&self) -> &str {
        self.driver
    }

    fn server_version(&self) -> &str {
        &self.version
    }

    fn case_folding(&self) -> CaseFolding {
        self.folding
    }
}

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).unwrap_or_else(|e| panic!("bad test pattern {pattern:?}: {e}"))
}

fn fold_keys(row: &Row, folding: CaseFolding) -> Row {
    row.iter()
        .map(|(key, value)| (folding.fold(key).into_owned(), value.clone()))
        .collect()
}

// ============================================================================
// Row builders
// ============================================================================

/// One `SHOW FULL COLUMNS` row
pub fn mysql_column(
    field: &str,
    ty: &str,
    nullable: bool,
    key: &str,
    default: Option<&str>,
    extra: &str,
) -> Row {
    Row::new()
        .with("Field", field)
        .with("Type", ty)
        .with("Collation", Value::Null)
        .with("Null", if nullable { "YES" } else { "NO" })
        .with("Key", key)
        .with("Default", default.map_or(Value::Null, Value::from))
        .with("Extra", extra)
        .with("Privileges", "select,insert,update,references")
        .with("Comment", "")
}

/// One foreign-key row as the MySQL loader selects it
pub fn mysql_fk(name: &str, column: &str, foreign_table: &str, foreign_column: &str) -> Row {
    Row::new()
        .with("constraint_name", name)
        .with("column_name", column)
        .with("table_schema", "shop")
        .with("referenced_table_schema", "shop")
        .with("referenced_table_name", foreign_table)
        .with("referenced_column_name", foreign_column)
        .with("update_rule", "NO ACTION")
        .with("delete_rule", "CASCADE")
}

pub const SHOW_COLUMNS: &str = r"^SHOW FULL COLUMNS FROM `";
pub const FOREIGN_KEYS: &str = r"REFERENTIAL_CONSTRAINTS";
pub const CHECKS: &str = r"CHECK_CONSTRAINTS";

// ============================================================================
// Fake MySQL
// ============================================================================

#[derive(Debug, Clone, Default)]
struct FakeTable {
    columns: Vec<Row>,
    /// `(name, clause)` as the server would store them
    checks: Vec<(String, String)>,
}

/// Just enough of a MySQL server to round-trip check constraints
pub struct FakeMySql {
    version: String,
    tables: Mutex<HashMap<String, FakeTable>>,
    log: Mutex<Vec<String>>,
    show_columns: Regex,
    checks_query: Regex,
    add_check: Regex,
    drop_check: Regex,
}

impl FakeMySql {
    pub fn new(version: &str) -> Self {
        Self {
            version: version.to_string(),
            tables: Mutex::new(HashMap::new()),
            log: Mutex::new(Vec::new()),
            show_columns: regex(r"^SHOW FULL COLUMNS FROM `(?P<table>(?:[^`]|``)+)`$"),
            checks_query: regex(r"CHECK_CONSTRAINTS.*TABLE_NAME = '(?P<table>(?:[^'\\]|\\.)*)'"),
            add_check: regex(
                r"^ALTER TABLE `(?P<table>(?:[^`]|``)+)` ADD CONSTRAINT `(?P<name>(?:[^`]|``)+)` CHECK \((?P<expr>.*)\)(?P<not_enforced> NOT ENFORCED)?$",
            ),
            drop_check: regex(
                r"^ALTER TABLE `(?P<table>(?:[^`]|``)+)` DROP (?:CHECK|CONSTRAINT) `(?P<name>(?:[^`]|``)+)`$",
            ),
        }
    }

    /// Create a table from `SHOW FULL COLUMNS` rows
    pub fn create_table(&self, name: &str, columns: Vec<Row>) {
        self.tables.lock().unwrap().insert(
            name.to_string(),
            FakeTable {
                columns,
                checks: Vec::new(),
            },
        );
    }

    pub fn queries(&self) -> Vec<String> {
        self.log.lock().unwrap().clone()
    }

    fn table_not_found(table: &str) -> ConnectionError {
        ConnectionError::new(format!("Table '{table}' doesn't exist")).with_sql_state("42S02")
    }
}

impl Connection for FakeMySql {
    fn execute(&self, sql: &str) -> Result<Vec<Row>, ConnectionError> {
        self.log.lock().unwrap().push(sql.to_string());
        let mut tables = self.tables.lock().unwrap();

        if let Some(caps) = self.show_columns.captures(sql) {
            let table = caps["table"].replace("``", "`");
            return tables
                .get(&table)
                .map(|t| t.columns.clone())
                .ok_or_else(|| Self::table_not_found(&table));
        }

        if let Some(caps) = self.checks_query.captures(sql) {
            let table = caps["table"].replace("\\'", "'");
            let rows = tables
                .get(&table)
                .map(|t| {
                    t.checks
                        .iter()
                        .map(|(name, clause)| {
                            Row::new()
                                .with("constraint_name", name.as_str())
                                .with("check_clause", clause.as_str())
                        })
                        .collect()
                })
                .unwrap_or_default();
            return Ok(rows);
        }

        if let Some(caps) = self.add_check.captures(sql) {
            let table = caps["table"].replace("``", "`");
            let t = tables
                .get_mut(&table)
                .ok_or_else(|| Self::table_not_found(&table))?;
            let name = caps["name"].replace("``", "`");
            if t.checks.iter().any(|(existing, _)| *existing == name) {
                return Err(ConnectionError::new(format!("Duplicate check constraint name '{name}'"))
                    .with_sql_state("HY000"));
            }
            // The server stores the clause wrapped in one pair of parentheses
            t.checks.push((name, format!("({})", &caps["expr"])));
            return Ok(Vec::new());
        }

        if let Some(caps) = self.drop_check.captures(sql) {
            let table = caps["table"].replace("``", "`");
            let t = tables
                .get_mut(&table)
                .ok_or_else(|| Self::table_not_found(&table))?;
            let name = caps["name"].replace("``", "`");
            let before = t.checks.len();
            t.checks.retain(|(existing, _)| *existing != name);
            if t.checks.len() == before {
                return Err(ConnectionError::new(format!("Check constraint '{name}' is not found"))
                    .with_sql_state("HY000"));
            }
            return Ok(Vec::new());
        }

        // Key and index catalogs are empty in this fake
        if sql.contains("INFORMATION_SCHEMA") {
            return Ok(Vec::new());
        }

        Err(ConnectionError::new(format!("unsupported statement: {sql}")).with_sql_state("42000"))
    }

    fn driver_name(&self) -> &str {
        "mysql"
    }

    fn server_version(&self) -> &str {
        &self.version
    }
}
