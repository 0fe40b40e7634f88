//! Default-value rules for SQL Server
//!
//! `INFORMATION_SCHEMA.COLUMNS.COLUMN_DEFAULT` holds the stored definition,
//! always wrapped in parentheses: `((1))`, `(N'abc')`, `(getdate())`.

use schemata_core::default_value::{is_call_of, is_numeric_literal, literal, unquote_sql_string};
use schemata_core::{DefaultRule, RawDefault, RuleResult};
use schemata_types::constraint::strip_outer_parens;
use schemata_types::{DefaultValue, Engine};

const MSSQL: &[Engine] = &[Engine::SqlServer];

pub static DEFAULT_RULES: &[DefaultRule] = &[
    DefaultRule {
        id: "no-default",
        engines: MSSQL,
        since: None,
        until: None,
        matches: is_absent,
        normalize: absent,
    },
    DefaultRule {
        id: "null",
        engines: MSSQL,
        since: None,
        until: None,
        matches: is_null,
        normalize: null,
    },
    DefaultRule {
        id: "current-timestamp",
        engines: MSSQL,
        since: None,
        until: None,
        matches: is_current_timestamp,
        normalize: current_timestamp,
    },
    DefaultRule {
        id: "quoted-string",
        engines: MSSQL,
        since: None,
        until: None,
        matches: is_quoted,
        normalize: quoted,
    },
    DefaultRule {
        id: "numeric",
        engines: MSSQL,
        since: None,
        until: None,
        matches: is_numeric,
        normalize: numeric,
    },
    DefaultRule {
        id: "expression",
        engines: MSSQL,
        since: None,
        until: None,
        matches: has_text,
        normalize: expression,
    },
];

/// Default text without its wrapping parentheses
fn inner<'a>(raw: &RawDefault<'a>) -> Option<&'a str> {
    raw.text.map(strip_outer_parens)
}

fn is_absent(raw: &RawDefault<'_>) -> bool {
    raw.text.is_none()
}

fn has_text(raw: &RawDefault<'_>) -> bool {
    raw.text.is_some()
}

fn is_null(raw: &RawDefault<'_>) -> bool {
    inner(raw).is_some_and(|t| t.eq_ignore_ascii_case("NULL"))
}

fn is_current_timestamp(raw: &RawDefault<'_>) -> bool {
    inner(raw).is_some_and(|t| {
        t.eq_ignore_ascii_case("current_timestamp") || is_call_of(t, "getdate")
    })
}

fn is_quoted(raw: &RawDefault<'_>) -> bool {
    inner(raw).and_then(unquote_national).is_some()
}

fn is_numeric(raw: &RawDefault<'_>) -> bool {
    inner(raw).is_some_and(is_numeric_literal)
}

fn absent(_: &RawDefault<'_>) -> RuleResult {
    Ok(None)
}

fn null(_: &RawDefault<'_>) -> RuleResult {
    Ok(Some(DefaultValue::null()))
}

fn current_timestamp(_: &RawDefault<'_>) -> RuleResult {
    Ok(Some(DefaultValue::expression("CURRENT_TIMESTAMP")))
}

fn quoted(raw: &RawDefault<'_>) -> RuleResult {
    let text = inner(raw)
        .and_then(unquote_national)
        .ok_or_else(|| "not a string literal".to_string())?;
    literal(&text, raw.runtime)
}

fn numeric(raw: &RawDefault<'_>) -> RuleResult {
    literal(inner(raw).unwrap_or_default(), raw.runtime)
}

fn expression(raw: &RawDefault<'_>) -> RuleResult {
    Ok(inner(raw).map(|t| DefaultValue::expression(t.to_string())))
}

/// `'x'` or `N'x'` with doubled quotes
fn unquote_national(text: &str) -> Option<String> {
    let text = text
        .strip_prefix('N')
        .or_else(|| text.strip_prefix('n'))
        .filter(|rest| rest.starts_with('\''))
        .unwrap_or(text);
    unquote_sql_string(text, false)
}
