//! MySQL identifier and string quoting

/// Longest identifier MySQL and MariaDB accept
pub const MAX_IDENTIFIER_LEN: usize = 64;

/// Backtick-quote one identifier segment; embedded backticks are doubled
///
/// ```
/// assert_eq!(schemata_mysql::quoting::quote_identifier("we`ird"), "`we``ird`");
/// ```
#[must_use]
pub fn quote_identifier(name: &str) -> String {
    let mut out = String::with_capacity(name.len() + 2);
    out.push('`');
    for ch in name.chars() {
        if ch == '`' {
            out.push('`');
        }
        out.push(ch);
    }
    out.push('`');
    out
}

/// Single-quote a string literal with backslash escaping
#[must_use]
pub fn quote_string(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for ch in value.chars() {
        match ch {
            '\\' => out.push_str("\\\\"),
            '\'' => out.push_str("\\'"),
            '\0' => out.push_str("\\0"),
            '\n' => out.push_str("\\n"),
            '\r' => out.push_str("\\r"),
            '\x1a' => out.push_str("\\Z"),
            _ => out.push(ch),
        }
    }
    out.push('\'');
    out
}
