//! DDL fragments for MySQL and MariaDB

use schemata_core::{require_expression, DdlBuilder, Quoter, Result, SchemaError};
use schemata_types::{Engine, TableName};

use crate::MySqlDialect;

impl DdlBuilder for MySqlDialect {
    fn add_check(
        &self,
        name: &str,
        table: &TableName,
        expression: &str,
        enforce: bool,
    ) -> Result<String> {
        let expression = require_expression("check", expression)?;
        self.require_check_ddl()?;
        if !enforce && !self.supports_not_enforced_checks() {
            return Err(SchemaError::not_supported(format!(
                "{} {} cannot create non-enforced check constraints",
                self.engine_name(),
                self.version()
            )));
        }

        let mut sql = format!(
            "ALTER TABLE {} ADD CONSTRAINT {} CHECK ({})",
            self.quote_table_name(table)?,
            self.quote_identifier(name)?,
            expression
        );
        if !enforce {
            sql.push_str(" NOT ENFORCED");
        }
        Ok(sql)
    }

    fn drop_check(&self, name: &str, table: &TableName) -> Result<String> {
        self.require_check_ddl()?;
        let keyword = match self.engine() {
            Engine::MariaDb => "CONSTRAINT",
            _ => "CHECK",
        };
        Ok(format!(
            "ALTER TABLE {} DROP {} {}",
            self.quote_table_name(table)?,
            keyword,
            self.quote_identifier(name)?
        ))
    }

    /// MySQL has a single unnamed primary key; the name is only validated
    fn drop_primary_key(&self, name: &str, table: &TableName) -> Result<String> {
        self.quote_identifier(name)?;
        Ok(format!(
            "ALTER TABLE {} DROP PRIMARY KEY",
            self.quote_table_name(table)?
        ))
    }

    fn drop_foreign_key(&self, name: &str, table: &TableName) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} DROP FOREIGN KEY {}",
            self.quote_table_name(table)?,
            self.quote_identifier(name)?
        ))
    }

    fn drop_unique(&self, name: &str, table: &TableName) -> Result<String> {
        Ok(format!(
            "ALTER TABLE {} DROP INDEX {}",
            self.quote_table_name(table)?,
            self.quote_identifier(name)?
        ))
    }

    fn add_default(&self, _: &str, _: &TableName, _: &str, _: &str) -> Result<String> {
        Err(self.no_default_constraints())
    }

    fn drop_default(&self, _: &str, _: &TableName) -> Result<String> {
        Err(self.no_default_constraints())
    }
}

impl MySqlDialect {
    fn require_check_ddl(&self) -> Result<()> {
        if self.supports_check_ddl() {
            Ok(())
        } else {
            Err(SchemaError::not_supported(format!(
                "{} {} does not enforce check constraints",
                self.engine_name(),
                self.version()
            )))
        }
    }

    fn no_default_constraints(&self) -> SchemaError {
        SchemaError::not_supported(format!(
            "{} does not have named default constraints",
            self.engine_name()
        ))
    }
}
