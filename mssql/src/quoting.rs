//! SQL Server identifier and string quoting

/// Longest identifier (`sysname`) SQL Server accepts
pub const MAX_IDENTIFIER_LEN: usize = 128;

/// Bracket-quote one identifier segment; embedded `]` is doubled
///
/// ```
/// assert_eq!(schemata_mssql::quoting::quote_identifier("a]b"), "[a]]b]");
/// ```
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    format!("[{}]", name.replace(']', "]]"))
}

/// Unicode string literal with doubled single quotes
#[must_use]
pub fn quote_string(value: &str) -> String {
    format!("N'{}'", value.replace('\'', "''"))
}
