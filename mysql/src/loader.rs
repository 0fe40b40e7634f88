//! Introspection queries for MySQL and MariaDB

use std::borrow::Cow;

use schemata_core::{
    group_by_key, CaseFolding, Connection, Quoter, RawDefault, Result, Row,
    SchemaError, SchemaLoader,
};
use schemata_types::{
    Check, ColumnSchema, ConstraintKind, ConstraintSet, ForeignKey, Index, PrimaryKey,
    ReferentialAction, TableName, TableSchema, Unique,
};

use crate::MySqlDialect;

/// SQLSTATE for "base table or view not found"
const TABLE_NOT_FOUND: &str = "42S02";

impl SchemaLoader for MySqlDialect {
    fn load_table_schema(
        &self,
        conn: &dyn Connection,
        table: &TableName,
        folding: CaseFolding,
    ) -> Result<Option<TableSchema>> {
        let sql = format!("SHOW FULL COLUMNS FROM {}", self.quote_table_name(table)?);
        let Some(rows) = self.query_existing(conn, &sql)? else {
            return Ok(None);
        };
        if rows.is_empty() {
            return Ok(None);
        }

        let table_label = table.to_string();
        let mut schema = TableSchema::new(table.clone());
        let mut primary_key = Vec::new();
        for row in &rows {
            let column = self.load_column(&row.reader(folding, &table_label))?;
            if column.is_primary_key {
                primary_key.push(column.name.clone());
            }
            if column.auto_increment {
                schema.sequence_name = Some(column.name.clone());
            }
            schema.columns.push(column);
        }
        if !primary_key.is_empty() {
            schema.primary_key = Some(PrimaryKey::new(None::<&str>, primary_key));
        }
        schema.foreign_keys = self.load_foreign_keys(conn, table, folding)?;
        Ok(Some(schema))
    }

    fn load_constraints(
        &self,
        conn: &dyn Connection,
        table: &TableName,
        kind: ConstraintKind,
        folding: CaseFolding,
    ) -> Result<ConstraintSet> {
        match kind {
            ConstraintKind::PrimaryKey => {
                let mut keys = self.load_key_constraints(conn, table, "PRIMARY KEY", folding)?;
                // MySQL always names the primary key PRIMARY
                let pk = keys
                    .pop()
                    .map(|(_, columns)| PrimaryKey::new(None::<&str>, columns));
                Ok(ConstraintSet::PrimaryKey(pk))
            }
            ConstraintKind::Uniques => {
                let keys = self.load_key_constraints(conn, table, "UNIQUE", folding)?;
                Ok(ConstraintSet::Uniques(
                    keys.into_iter()
                        .map(|(name, columns)| Unique::new(Some(name), columns))
                        .collect(),
                ))
            }
            ConstraintKind::ForeignKeys => Ok(ConstraintSet::ForeignKeys(
                self.load_foreign_keys(conn, table, folding)?,
            )),
            ConstraintKind::Indexes => Ok(ConstraintSet::Indexes(
                self.load_indexes(conn, table, folding)?,
            )),
            ConstraintKind::Checks => Ok(ConstraintSet::Checks(
                self.load_checks(conn, table, folding)?,
            )),
            ConstraintKind::Defaults => Err(SchemaError::not_supported(format!(
                "{} does not have named default constraints",
                self.engine_name()
            ))),
        }
    }
}

impl MySqlDialect {
    /// Run `sql`, mapping "table not found" to `Ok(None)`
    fn query_existing(&self, conn: &dyn Connection, sql: &str) -> Result<Option<Vec<Row>>> {
        schemata_core::schemata_trace_query!(self.engine_name(), sql);
        match conn.execute(sql) {
            Ok(rows) => Ok(Some(rows)),
            Err(e) if e.has_sql_state(TABLE_NOT_FOUND) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn query(&self, conn: &dyn Connection, sql: &str) -> Result<Vec<Row>> {
        schemata_core::schemata_trace_query!(self.engine_name(), sql);
        Ok(conn.execute(sql)?)
    }

    /// Build one column from a `SHOW FULL COLUMNS` row
    fn load_column(&self, row: &schemata_core::RowReader<'_>) -> Result<ColumnSchema> {
        let name = row.required("Field")?;
        let db_type = row.required("Type")?;
        let allow_null = row.required("Null")?.eq_ignore_ascii_case("YES");
        let key = row.text("Key").unwrap_or_default();
        let extra = row.text("Extra").unwrap_or_default();
        let default = row.optional("Default")?;
        let comment = row.text("Comment").unwrap_or_default();

        let mapped = self.type_mapper().map(&db_type);
        let raw = RawDefault::new(default.as_deref(), mapped.logical, mapped.runtime)
            .allow_null(allow_null)
            .extra(&extra);
        let default = self.normalizer().normalize(&raw).map_err(|e| {
            let message = format!("column '{name}': {e}");
            schemata_core::schemata_warn_metadata!(row.table(), message);
            SchemaError::malformed(row.table(), message)
        })?;

        Ok(ColumnSchema::new(name.into_owned(), db_type.into_owned(), mapped)
            .allow_null(allow_null)
            .auto_increment(extra.to_ascii_lowercase().contains("auto_increment"))
            .primary_key(key.eq_ignore_ascii_case("PRI"))
            .default_value(default)
            .comment(comment))
    }

    /// `TABLE_SCHEMA = ...` predicate for a possibly qualified table
    fn schema_predicate(&self, column: &str, table: &TableName) -> String {
        match &table.schema {
            Some(schema) => format!("{column} = {}", self.quote_string(schema)),
            None => format!("{column} = DATABASE()"),
        }
    }

    /// Primary key or unique constraints as `(name, columns)` in key order
    fn load_key_constraints(
        &self,
        conn: &dyn Connection,
        table: &TableName,
        constraint_type: &str,
        folding: CaseFolding,
    ) -> Result<Vec<(String, Vec<Cow<'static, str>>)>> {
        let sql = format!(
            "SELECT tc.CONSTRAINT_NAME AS constraint_name, kcu.COLUMN_NAME AS column_name \
             FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc \
             JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu \
             ON kcu.CONSTRAINT_SCHEMA = tc.CONSTRAINT_SCHEMA \
             AND kcu.CONSTRAINT_NAME = tc.CONSTRAINT_NAME \
             AND kcu.TABLE_NAME = tc.TABLE_NAME \
             WHERE {} AND tc.TABLE_NAME = {} AND tc.CONSTRAINT_TYPE = {} \
             ORDER BY tc.CONSTRAINT_NAME, kcu.ORDINAL_POSITION",
            self.schema_predicate("tc.TABLE_SCHEMA", table),
            self.quote_string(&table.name),
            self.quote_string(constraint_type),
        );
        let rows = self.query(conn, &sql)?;
        let label = table.to_string();

        let pairs = rows
            .iter()
            .map(|row| {
                let r = row.reader(folding, &label);
                Ok((
                    r.required("constraint_name")?.into_owned(),
                    Cow::Owned(r.required("column_name")?.into_owned()),
                ))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(group_by_key(pairs))
    }

    fn load_foreign_keys(
        &self,
        conn: &dyn Connection,
        table: &TableName,
        folding: CaseFolding,
    ) -> Result<Vec<ForeignKey>> {
        let sql = format!(
            "SELECT kcu.CONSTRAINT_NAME AS constraint_name, kcu.COLUMN_NAME AS column_name, \
             kcu.TABLE_SCHEMA AS table_schema, \
             kcu.REFERENCED_TABLE_SCHEMA AS referenced_table_schema, \
             kcu.REFERENCED_TABLE_NAME AS referenced_table_name, \
             kcu.REFERENCED_COLUMN_NAME AS referenced_column_name, \
             rc.UPDATE_RULE AS update_rule, rc.DELETE_RULE AS delete_rule \
             FROM INFORMATION_SCHEMA.REFERENTIAL_CONSTRAINTS rc \
             JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu \
             ON kcu.CONSTRAINT_SCHEMA = rc.CONSTRAINT_SCHEMA \
             AND kcu.CONSTRAINT_NAME = rc.CONSTRAINT_NAME \
             AND kcu.TABLE_NAME = rc.TABLE_NAME \
             WHERE {} AND rc.TABLE_NAME = {} \
             ORDER BY kcu.CONSTRAINT_NAME, kcu.ORDINAL_POSITION",
            self.schema_predicate("rc.CONSTRAINT_SCHEMA", table),
            self.quote_string(&table.name),
        );
        let rows = self.query(conn, &sql)?;
        let label = table.to_string();

        let mut pairs = Vec::with_capacity(rows.len());
        for row in &rows {
            let r = row.reader(folding, &label);
            pairs.push((r.required("constraint_name")?.into_owned(), r));
        }

        let mut foreign_keys = Vec::new();
        for (name, readers) in group_by_key(pairs) {
            let Some(first) = readers.first() else {
                continue;
            };
            let mut columns = Vec::with_capacity(readers.len());
            let mut foreign_columns = Vec::with_capacity(readers.len());
            for r in &readers {
                columns.push(r.required("column_name")?.into_owned());
                foreign_columns.push(r.required("referenced_column_name")?.into_owned());
            }

            let mut fk = ForeignKey::new(
                Some(name),
                columns,
                first.required("referenced_table_name")?.into_owned(),
                foreign_columns,
            );
            let own_schema = first.text("table_schema");
            if let Some(schema) = first.text("referenced_table_schema") {
                if own_schema.as_deref() != Some(schema.as_ref()) {
                    fk = fk.foreign_schema(schema.into_owned());
                }
            }
            if let Some(action) = self.referential_action(first, "delete_rule")? {
                fk = fk.on_delete(action);
            }
            if let Some(action) = self.referential_action(first, "update_rule")? {
                fk = fk.on_update(action);
            }
            foreign_keys.push(fk);
        }
        Ok(foreign_keys)
    }

    fn referential_action(
        &self,
        row: &schemata_core::RowReader<'_>,
        key: &str,
    ) -> Result<Option<ReferentialAction>> {
        match row.text(key) {
            None => Ok(None),
            Some(rule) => ReferentialAction::from_sql(&rule).map(Some).ok_or_else(|| {
                SchemaError::malformed(row.table(), format!("unknown referential action '{rule}'"))
            }),
        }
    }

    fn load_indexes(
        &self,
        conn: &dyn Connection,
        table: &TableName,
        folding: CaseFolding,
    ) -> Result<Vec<Index>> {
        let sql = format!("SHOW INDEX FROM {}", self.quote_table_name(table)?);
        let Some(rows) = self.query_existing(conn, &sql)? else {
            return Ok(Vec::new());
        };
        let label = table.to_string();

        let mut pairs = Vec::with_capacity(rows.len());
        for row in &rows {
            let r = row.reader(folding, &label);
            let name = r.required("Key_name")?.into_owned();
            let seq = r.integer("Seq_in_index")?.unwrap_or(0);
            // Functional key parts report no column name
            let column = r.text("Column_name").map(Cow::into_owned);
            let non_unique = r.integer("Non_unique")?.unwrap_or(1);
            pairs.push((name, (seq, column, non_unique == 0)));
        }

        let mut indexes = Vec::new();
        for (name, mut parts) in group_by_key(pairs) {
            parts.sort_by_key(|(seq, _, _)| *seq);
            let is_unique = parts.iter().all(|(_, _, unique)| *unique);
            let columns: Vec<String> = parts.into_iter().filter_map(|(_, c, _)| c).collect();
            if columns.is_empty() {
                continue;
            }
            let is_primary = name == "PRIMARY";
            indexes.push(
                Index::new(Some(name), columns)
                    .unique(is_unique)
                    .primary(is_primary),
            );
        }
        Ok(indexes)
    }

    fn load_checks(
        &self,
        conn: &dyn Connection,
        table: &TableName,
        folding: CaseFolding,
    ) -> Result<Vec<Check>> {
        if !self.supports_checks() {
            return Err(SchemaError::not_supported(format!(
                "{} {} does not report check constraints",
                self.engine_name(),
                self.version()
            )));
        }

        let sql = if self.is_mariadb() {
            format!(
                "SELECT CONSTRAINT_NAME AS constraint_name, CHECK_CLAUSE AS check_clause \
                 FROM INFORMATION_SCHEMA.CHECK_CONSTRAINTS \
                 WHERE {} AND TABLE_NAME = {} \
                 ORDER BY CONSTRAINT_NAME",
                self.schema_predicate("CONSTRAINT_SCHEMA", table),
                self.quote_string(&table.name),
            )
        } else {
            format!(
                "SELECT cc.CONSTRAINT_NAME AS constraint_name, cc.CHECK_CLAUSE AS check_clause \
                 FROM INFORMATION_SCHEMA.CHECK_CONSTRAINTS cc \
                 JOIN INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc \
                 ON tc.CONSTRAINT_SCHEMA = cc.CONSTRAINT_SCHEMA \
                 AND tc.CONSTRAINT_NAME = cc.CONSTRAINT_NAME \
                 WHERE {} AND tc.TABLE_NAME = {} AND tc.CONSTRAINT_TYPE = 'CHECK' \
                 ORDER BY cc.CONSTRAINT_NAME",
                self.schema_predicate("tc.TABLE_SCHEMA", table),
                self.quote_string(&table.name),
            )
        };
        let rows = self.query(conn, &sql)?;
        let label = table.to_string();

        rows.iter()
            .map(|row| {
                let r = row.reader(folding, &label);
                Ok(Check::new(
                    Some(r.required("constraint_name")?.into_owned()),
                    r.required("check_clause")?.into_owned(),
                ))
            })
            .collect()
    }
}
