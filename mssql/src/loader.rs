//! Introspection queries for SQL Server

use std::borrow::Cow;

use schemata_core::{
    group_by_key, CaseFolding, Connection, Quoter, RawDefault, Result, Row, RowReader,
    SchemaError, SchemaLoader,
};
use schemata_types::{
    Check, ColumnSchema, ConstraintKind, ConstraintSet, DefaultConstraint, ForeignKey, Index,
    PrimaryKey, ReferentialAction, TableName, TableSchema, Unique,
};

use crate::MssqlDialect;

impl SchemaLoader for MssqlDialect {
    fn load_table_schema(
        &self,
        conn: &dyn Connection,
        table: &TableName,
        folding: CaseFolding,
    ) -> Result<Option<TableSchema>> {
        let rows = self.query(conn, &self.columns_sql(table)?)?;
        if rows.is_empty() {
            return Ok(None);
        }

        let label = table.to_string();
        let mut schema = TableSchema::new(table.clone());
        let mut primary_key = Vec::new();
        for row in &rows {
            let r = row.reader(folding, &label);
            let column = self.load_column(&r)?;
            if let Some(pk_name) = r.text("primary_key_name") {
                let position = r.integer("primary_key_position")?.unwrap_or(0);
                primary_key.push((position, pk_name.into_owned(), column.name.clone()));
            }
            if column.auto_increment {
                schema.sequence_name = Some(column.name.clone());
            }
            schema.columns.push(column);
        }

        primary_key.sort_by_key(|(position, _, _)| *position);
        if let Some((_, name, _)) = primary_key.first() {
            let name = name.clone();
            let columns = primary_key.into_iter().map(|(_, _, column)| column);
            schema.primary_key = Some(PrimaryKey::new(Some(name), columns));
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
                let mut keys = self.load_key_constraints(conn, table, "PK", folding)?;
                Ok(ConstraintSet::PrimaryKey(
                    keys.pop()
                        .map(|(name, columns)| PrimaryKey::new(Some(name), columns)),
                ))
            }
            ConstraintKind::Uniques => {
                let keys = self.load_key_constraints(conn, table, "UQ", folding)?;
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
            ConstraintKind::Defaults => Ok(ConstraintSet::Defaults(
                self.load_defaults(conn, table, folding)?,
            )),
        }
    }
}

impl MssqlDialect {
    fn query(&self, conn: &dyn Connection, sql: &str) -> Result<Vec<Row>> {
        schemata_core::schemata_trace_query!("SQL Server", sql);
        Ok(conn.execute(sql)?)
    }

    /// `OBJECT_ID(N'[schema].[table]')`
    fn object_id(&self, table: &TableName) -> Result<String> {
        Ok(format!(
            "OBJECT_ID({})",
            self.quote_string(&self.quote_table_name(table)?)
        ))
    }

    /// `TABLE_SCHEMA = ...` predicate for a possibly qualified table
    fn schema_predicate(&self, column: &str, table: &TableName) -> String {
        match &table.schema {
            Some(schema) => format!("{column} = {}", self.quote_string(schema)),
            None => format!("{column} = SCHEMA_NAME()"),
        }
    }

    fn columns_sql(&self, table: &TableName) -> Result<String> {
        let object_id = self.object_id(table)?;
        let name = self.quote_string(&table.name);
        Ok(format!(
            "SELECT c.COLUMN_NAME AS column_name, c.DATA_TYPE AS data_type, \
             c.CHARACTER_MAXIMUM_LENGTH AS character_maximum_length, \
             c.NUMERIC_PRECISION AS numeric_precision, c.NUMERIC_SCALE AS numeric_scale, \
             c.IS_NULLABLE AS is_nullable, c.COLUMN_DEFAULT AS column_default, \
             COLUMNPROPERTY({object_id}, c.COLUMN_NAME, 'IsIdentity') AS is_identity, \
             pk.CONSTRAINT_NAME AS primary_key_name, \
             pk.ORDINAL_POSITION AS primary_key_position, \
             CONVERT(NVARCHAR(4000), ep.value) AS comment \
             FROM INFORMATION_SCHEMA.COLUMNS c \
             LEFT JOIN (\
             SELECT kcu.COLUMN_NAME, kcu.CONSTRAINT_NAME, kcu.ORDINAL_POSITION \
             FROM INFORMATION_SCHEMA.TABLE_CONSTRAINTS tc \
             JOIN INFORMATION_SCHEMA.KEY_COLUMN_USAGE kcu \
             ON kcu.CONSTRAINT_SCHEMA = tc.CONSTRAINT_SCHEMA \
             AND kcu.CONSTRAINT_NAME = tc.CONSTRAINT_NAME \
             WHERE tc.CONSTRAINT_TYPE = 'PRIMARY KEY' AND {} AND tc.TABLE_NAME = {name}\
             ) pk ON pk.COLUMN_NAME = c.COLUMN_NAME \
             LEFT JOIN sys.extended_properties ep \
             ON ep.class = 1 AND ep.major_id = {object_id} \
             AND ep.minor_id = COLUMNPROPERTY({object_id}, c.COLUMN_NAME, 'ColumnId') \
             AND ep.name = N'MS_Description' \
             WHERE {} AND c.TABLE_NAME = {name} \
             ORDER BY c.ORDINAL_POSITION",
            self.schema_predicate("tc.TABLE_SCHEMA", table),
            self.schema_predicate("c.TABLE_SCHEMA", table),
        ))
    }

    /// Build one column from an `INFORMATION_SCHEMA.COLUMNS` row
    fn load_column(&self, row: &RowReader<'_>) -> Result<ColumnSchema> {
        let name = row.required("column_name")?;
        let db_type = physical_type(row)?;
        let allow_null = row.flag("is_nullable");
        let default = row.optional("column_default")?;
        let comment = row.text("comment").unwrap_or_default();

        let mapped = self.type_mapper().map(&db_type);
        let raw = RawDefault::new(default.as_deref(), mapped.logical, mapped.runtime)
            .allow_null(allow_null);
        let default = self.normalizer().normalize(&raw).map_err(|e| {
            let message = format!("column '{name}': {e}");
            schemata_core::schemata_warn_metadata!(row.table(), message);
            SchemaError::malformed(row.table(), message)
        })?;

        Ok(ColumnSchema::new(name.into_owned(), db_type, mapped)
            .allow_null(allow_null)
            .auto_increment(row.flag("is_identity"))
            .primary_key(row.text("primary_key_name").is_some())
            .default_value(default)
            .comment(comment))
    }

    /// Primary key (`PK`) or unique (`UQ`) constraints as `(name, columns)`
    fn load_key_constraints(
        &self,
        conn: &dyn Connection,
        table: &TableName,
        constraint_type: &str,
        folding: CaseFolding,
    ) -> Result<Vec<(String, Vec<Cow<'static, str>>)>> {
        let sql = format!(
            "SELECT kc.name AS constraint_name, c.name AS column_name \
             FROM sys.key_constraints kc \
             JOIN sys.index_columns ic \
             ON ic.object_id = kc.parent_object_id AND ic.index_id = kc.unique_index_id \
             JOIN sys.columns c ON c.object_id = ic.object_id AND c.column_id = ic.column_id \
             WHERE kc.parent_object_id = {} AND kc.type = {} \
             ORDER BY kc.name, ic.key_ordinal",
            self.object_id(table)?,
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
            "SELECT fk.name AS constraint_name, pc.name AS column_name, \
             OBJECT_SCHEMA_NAME(fk.parent_object_id) AS table_schema, \
             rs.name AS referenced_table_schema, rt.name AS referenced_table_name, \
             rc.name AS referenced_column_name, \
             fk.delete_referential_action_desc AS delete_rule, \
             fk.update_referential_action_desc AS update_rule \
             FROM sys.foreign_keys fk \
             JOIN sys.foreign_key_columns fkc ON fkc.constraint_object_id = fk.object_id \
             JOIN sys.columns pc \
             ON pc.object_id = fkc.parent_object_id AND pc.column_id = fkc.parent_column_id \
             JOIN sys.columns rc \
             ON rc.object_id = fkc.referenced_object_id AND rc.column_id = fkc.referenced_column_id \
             JOIN sys.tables rt ON rt.object_id = fk.referenced_object_id \
             JOIN sys.schemas rs ON rs.schema_id = rt.schema_id \
             WHERE fk.parent_object_id = {} \
             ORDER BY fk.name, fkc.constraint_column_id",
            self.object_id(table)?,
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
            if let Some(action) = referential_action(first, "delete_rule")? {
                fk = fk.on_delete(action);
            }
            if let Some(action) = referential_action(first, "update_rule")? {
                fk = fk.on_update(action);
            }
            foreign_keys.push(fk);
        }
        Ok(foreign_keys)
    }

    fn load_indexes(
        &self,
        conn: &dyn Connection,
        table: &TableName,
        folding: CaseFolding,
    ) -> Result<Vec<Index>> {
        // type 0 is the heap, which has no name and no key columns
        let sql = format!(
            "SELECT i.name AS index_name, c.name AS column_name, \
             i.is_unique AS is_unique, i.is_primary_key AS is_primary_key \
             FROM sys.indexes i \
             JOIN sys.index_columns ic \
             ON ic.object_id = i.object_id AND ic.index_id = i.index_id \
             AND ic.is_included_column = 0 \
             JOIN sys.columns c ON c.object_id = ic.object_id AND c.column_id = ic.column_id \
             WHERE i.object_id = {} AND i.type > 0 \
             ORDER BY i.name, ic.key_ordinal",
            self.object_id(table)?,
        );
        let rows = self.query(conn, &sql)?;
        let label = table.to_string();

        let mut pairs = Vec::with_capacity(rows.len());
        for row in &rows {
            let r = row.reader(folding, &label);
            pairs.push((r.required("index_name")?.into_owned(), r));
        }

        let mut indexes = Vec::new();
        for (name, readers) in group_by_key(pairs) {
            let Some(first) = readers.first() else {
                continue;
            };
            let columns = readers
                .iter()
                .map(|r| Ok(r.required("column_name")?.into_owned()))
                .collect::<Result<Vec<_>>>()?;
            indexes.push(
                Index::new(Some(name), columns)
                    .unique(first.flag("is_unique"))
                    .primary(first.flag("is_primary_key")),
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
        let sql = format!(
            "SELECT cc.name AS constraint_name, cc.definition AS check_clause \
             FROM sys.check_constraints cc \
             WHERE cc.parent_object_id = {} \
             ORDER BY cc.name",
            self.object_id(table)?,
        );
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

    fn load_defaults(
        &self,
        conn: &dyn Connection,
        table: &TableName,
        folding: CaseFolding,
    ) -> Result<Vec<DefaultConstraint>> {
        let sql = format!(
            "SELECT dc.name AS constraint_name, c.name AS column_name, \
             dc.definition AS definition \
             FROM sys.default_constraints dc \
             JOIN sys.columns c \
             ON c.object_id = dc.parent_object_id AND c.column_id = dc.parent_column_id \
             WHERE dc.parent_object_id = {} \
             ORDER BY dc.name",
            self.object_id(table)?,
        );
        let rows = self.query(conn, &sql)?;
        let label = table.to_string();

        rows.iter()
            .map(|row| {
                let r = row.reader(folding, &label);
                Ok(DefaultConstraint::new(
                    Some(r.required("constraint_name")?.into_owned()),
                    r.required("column_name")?.into_owned(),
                    r.required("definition")?.into_owned(),
                ))
            })
            .collect()
    }
}

/// Render the physical type from `DATA_TYPE` and its length or precision
///
/// `CHARACTER_MAXIMUM_LENGTH` is -1 for the `(max)` types.
fn physical_type(row: &RowReader<'_>) -> Result<String> {
    let base = row.required("data_type")?.to_ascii_lowercase();
    let ty = match base.as_str() {
        "char" | "nchar" | "varchar" | "nvarchar" | "binary" | "varbinary" => {
            match row.integer("character_maximum_length")? {
                Some(-1) => format!("{base}(max)"),
                Some(len) => format!("{base}({len})"),
                None => base,
            }
        }
        "decimal" | "numeric" => {
            match (row.integer("numeric_precision")?, row.integer("numeric_scale")?) {
                (Some(precision), Some(scale)) => format!("{base}({precision},{scale})"),
                (Some(precision), None) => format!("{base}({precision})"),
                _ => base,
            }
        }
        _ => base,
    };
    Ok(ty)
}

/// `sys.foreign_keys` spells actions `NO_ACTION`, `SET_NULL`, ...
fn referential_action(row: &RowReader<'_>, key: &str) -> Result<Option<ReferentialAction>> {
    match row.text(key) {
        None => Ok(None),
        Some(rule) => ReferentialAction::from_sql(&rule).map(Some).ok_or_else(|| {
            SchemaError::malformed(row.table(), format!("unknown referential action '{rule}'"))
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemata_core::ConnectionError;
    use schemata_types::{DefaultValue, LogicalType, ServerVersion, Value};
    use std::sync::Mutex;

    /// Answers each query with the first scripted result whose marker it contains
    struct Scripted {
        answers: Vec<(&'static str, Vec<Row>)>,
        log: Mutex<Vec<String>>,
    }

    impl Scripted {
        fn new(answers: Vec<(&'static str, Vec<Row>)>) -> Self {
            Self {
                answers,
                log: Mutex::new(Vec::new()),
            }
        }

        fn queries(&self) -> Vec<String> {
            self.log.lock().unwrap().clone()
        }
    }

    impl Connection for Scripted {
        fn execute(&self, sql: &str) -> std::result::Result<Vec<Row>, ConnectionError> {
            self.log.lock().unwrap().push(sql.to_string());
            Ok(self
                .answers
                .iter()
                .find(|(marker, _)| sql.contains(marker))
                .map(|(_, rows)| rows.clone())
                .unwrap_or_default())
        }

        fn driver_name(&self) -> &str {
            "sqlsrv"
        }

        fn server_version(&self) -> &str {
            "16.00.1000"
        }
    }

    fn column(name: &str, data_type: &str) -> Row {
        Row::new()
            .with("column_name", name)
            .with("data_type", data_type)
            .with("character_maximum_length", Value::Null)
            .with("numeric_precision", Value::Null)
            .with("numeric_scale", Value::Null)
            .with("is_nullable", "NO")
            .with("column_default", Value::Null)
            .with("is_identity", 0i64)
            .with("primary_key_name", Value::Null)
            .with("primary_key_position", Value::Null)
            .with("comment", Value::Null)
    }

    fn orders() -> TableName {
        TableName::with_schema("dbo", "orders")
    }

    fn dialect() -> MssqlDialect {
        MssqlDialect::new(ServerVersion::new(16, 0, 1000))
    }

    #[test]
    fn test_load_table_schema() {
        let id = column("id", "int")
            .with("is_identity", 1i64)
            .with("primary_key_name", "PK_orders")
            .with("primary_key_position", 1i64);
        let note = column("note", "nvarchar")
            .with("character_maximum_length", -1i64)
            .with("is_nullable", "YES")
            .with("column_default", "(N'n/a')")
            .with("comment", "free text");
        let total = column("total", "decimal")
            .with("numeric_precision", 18i64)
            .with("numeric_scale", 2i64)
            .with("column_default", "((0))");

        let conn = Scripted::new(vec![
            ("INFORMATION_SCHEMA.COLUMNS", vec![id, note, total]),
            (
                "sys.foreign_keys",
                vec![Row::new()
                    .with("constraint_name", "FK_orders_customer")
                    .with("column_name", "customer_id")
                    .with("table_schema", "dbo")
                    .with("referenced_table_schema", "dbo")
                    .with("referenced_table_name", "customers")
                    .with("referenced_column_name", "id")
                    .with("delete_rule", "CASCADE")
                    .with("update_rule", "NO_ACTION")],
            ),
        ]);

        let schema = dialect()
            .load_table_schema(&conn, &orders(), CaseFolding::Natural)
            .unwrap()
            .unwrap();

        assert_eq!(schema.column_names(), vec!["id", "note", "total"]);
        let pk = schema.primary_key.as_ref().unwrap();
        assert_eq!(pk.name(), Some("PK_orders"));
        assert_eq!(schema.sequence_name.as_deref(), Some("id"));

        let note = schema.column("note").unwrap();
        assert_eq!(note.db_type, "nvarchar(max)");
        assert_eq!(note.logical_type, LogicalType::Text);
        assert_eq!(
            note.default,
            Some(DefaultValue::Literal(Value::String("n/a".into())))
        );
        assert_eq!(note.comment, "free text");

        let total = schema.column("total").unwrap();
        assert_eq!(total.db_type, "decimal(18,2)");
        assert_eq!((total.precision, total.scale), (Some(18), Some(2)));

        let fk = &schema.foreign_keys[0];
        assert_eq!(fk.foreign_table, "customers");
        assert_eq!(fk.foreign_schema, None);
        assert_eq!(fk.on_delete, Some(ReferentialAction::Cascade));
        assert_eq!(fk.on_update, Some(ReferentialAction::NoAction));

        let queries = conn.queries();
        assert_eq!(queries.len(), 2);
        assert!(queries[0].contains("OBJECT_ID(N'[dbo].[orders]')"));
        assert!(queries[0].contains("c.TABLE_SCHEMA = N'dbo'"));
    }

    #[test]
    fn test_missing_table_is_none() {
        let conn = Scripted::new(Vec::new());
        let loaded = dialect()
            .load_table_schema(&conn, &orders(), CaseFolding::Natural)
            .unwrap();
        assert!(loaded.is_none());
        assert_eq!(conn.queries().len(), 1);
    }

    #[test]
    fn test_defaults_and_checks() {
        let conn = Scripted::new(vec![
            (
                "sys.default_constraints",
                vec![Row::new()
                    .with("constraint_name", "DF_orders_total")
                    .with("column_name", "total")
                    .with("definition", "((0))")],
            ),
            (
                "sys.check_constraints",
                vec![Row::new()
                    .with("constraint_name", "CK_orders_total")
                    .with("check_clause", "([total]>=(0))")],
            ),
        ]);
        let d = dialect();

        let defaults = d
            .load_constraints(&conn, &orders(), ConstraintKind::Defaults, CaseFolding::Natural)
            .unwrap();
        let ConstraintSet::Defaults(defaults) = defaults else {
            panic!("wrong kind");
        };
        assert_eq!(defaults[0].name(), Some("DF_orders_total"));
        assert_eq!(defaults[0].column, "total");
        assert_eq!(defaults[0].value, "((0))");

        let checks = d
            .load_constraints(&conn, &orders(), ConstraintKind::Checks, CaseFolding::Natural)
            .unwrap();
        let ConstraintSet::Checks(checks) = checks else {
            panic!("wrong kind");
        };
        assert_eq!(checks[0].normalized_expression(), "[total]>=(0)");
    }

    #[test]
    fn test_indexes_group_columns() {
        let index_row = |name: &str, column: &str, unique: bool, primary: bool| {
            Row::new()
                .with("index_name", name)
                .with("column_name", column)
                .with("is_unique", unique)
                .with("is_primary_key", primary)
        };
        let conn = Scripted::new(vec![(
            "sys.indexes",
            vec![
                index_row("IX_orders_customer", "customer_id", false, false),
                index_row("IX_orders_customer", "placed_at", false, false),
                index_row("PK_orders", "id", true, true),
            ],
        )]);

        let set = dialect()
            .load_constraints(&conn, &orders(), ConstraintKind::Indexes, CaseFolding::Natural)
            .unwrap();
        let ConstraintSet::Indexes(indexes) = set else {
            panic!("wrong kind");
        };
        assert_eq!(indexes.len(), 2);
        assert_eq!(indexes[0].columns, vec!["customer_id", "placed_at"]);
        assert!(!indexes[0].is_unique);
        assert!(indexes[1].is_primary && indexes[1].is_unique);
    }

    #[test]
    fn test_upper_folded_rows() {
        let row = Row::new()
            .with("CONSTRAINT_NAME", "UQ_orders_code")
            .with("COLUMN_NAME", "code");
        let conn = Scripted::new(vec![("sys.key_constraints", vec![row])]);

        let set = dialect()
            .load_constraints(&conn, &orders(), ConstraintKind::Uniques, CaseFolding::Upper)
            .unwrap();
        let ConstraintSet::Uniques(uniques) = set else {
            panic!("wrong kind");
        };
        assert_eq!(uniques[0].name(), Some("UQ_orders_code"));
        assert!(conn.queries()[0].contains("kc.type = N'UQ'"));
    }
}
