//! DDL fragments for SQL Server

use schemata_core::{require_expression, DdlBuilder, Quoter, Result, SchemaError};
use schemata_types::TableName;

use crate::MssqlDialect;

impl DdlBuilder for MssqlDialect {
    fn add_check(
        &self,
        name: &str,
        table: &TableName,
        expression: &str,
        enforce: bool,
    ) -> Result<String> {
        let expression = require_expression("check", expression)?;
        if !enforce {
            return Err(SchemaError::not_supported(
                "SQL Server cannot create non-enforced check constraints",
            ));
        }
        Ok(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} CHECK ({})",
            self.quote_table_name(table)?,
            self.quote_identifier(name)?,
            expression
        ))
    }

    fn add_default(
        &self,
        name: &str,
        table: &TableName,
        column: &str,
        expression: &str,
    ) -> Result<String> {
        let expression = require_expression("default", expression)?;
        Ok(format!(
            "ALTER TABLE {} ADD CONSTRAINT {} DEFAULT {} FOR {}",
            self.quote_table_name(table)?,
            self.quote_identifier(name)?,
            expression,
            self.quote_identifier(column)?
        ))
    }

    fn drop_default(&self, name: &str, table: &TableName) -> Result<String> {
        self.drop_constraint(name, table)
    }
}
