//! Default-value quirk table for MySQL and MariaDB
//!
//! Rules are tried in order and the first match wins. Each one covers a single
//! way a server reports a default: Oracle MySQL prints string defaults
//! unquoted, MariaDB 10.2.7+ prints them as SQL literals, MariaDB 10.2.3+
//! spells current-timestamp as a function call, and so on.

use schemata_core::default_value::{is_call_of, is_numeric_literal, literal, unquote_sql_string};
use schemata_core::{DefaultRule, RawDefault, RuleResult};
use schemata_types::{DefaultValue, Engine, RuntimeType, ServerVersion, Value};

const BOTH: &[Engine] = &[Engine::MySql, Engine::MariaDb];
const MARIADB: &[Engine] = &[Engine::MariaDb];
const MYSQL: &[Engine] = &[Engine::MySql];

/// MariaDB starts reporting `current_timestamp()` and metadata NULLs
const MARIADB_10_2_3: ServerVersion = ServerVersion::new(10, 2, 3);
/// MariaDB starts quoting literal defaults
const MARIADB_10_2_7: ServerVersion = ServerVersion::new(10, 2, 7);
/// MySQL starts flagging expression defaults with `DEFAULT_GENERATED`
const MYSQL_8_0_13: ServerVersion = ServerVersion::new(8, 0, 13);

pub static DEFAULT_RULES: &[DefaultRule] = &[
    DefaultRule {
        id: "current-timestamp-keyword",
        engines: BOTH,
        since: None,
        until: None,
        matches: is_current_timestamp_keyword,
        normalize: current_timestamp,
    },
    DefaultRule {
        id: "current-timestamp-call",
        engines: MARIADB,
        since: Some(MARIADB_10_2_3),
        until: None,
        matches: is_current_timestamp_call,
        normalize: current_timestamp,
    },
    DefaultRule {
        id: "mariadb-null-timestamp",
        engines: MARIADB,
        since: Some(MARIADB_10_2_3),
        until: None,
        matches: is_null_on_not_null_temporal,
        normalize: null_literal,
    },
    DefaultRule {
        id: "mariadb-quoted-literal",
        engines: MARIADB,
        since: Some(MARIADB_10_2_7),
        until: None,
        matches: has_text,
        normalize: sql_literal,
    },
    DefaultRule {
        id: "mysql-default-generated",
        engines: MYSQL,
        since: Some(MYSQL_8_0_13),
        until: None,
        matches: is_default_generated,
        normalize: expression,
    },
    DefaultRule {
        id: "bit-literal",
        engines: BOTH,
        since: None,
        until: None,
        matches: is_bit_literal,
        normalize: bit_literal,
    },
    DefaultRule {
        id: "sql-null",
        engines: BOTH,
        since: None,
        until: None,
        matches: is_sql_null,
        normalize: sql_null,
    },
    DefaultRule {
        id: "literal",
        engines: BOTH,
        since: None,
        until: None,
        matches: has_text,
        normalize: plain_literal,
    },
];

// ============================================================================
// Predicates
// ============================================================================

fn has_text(raw: &RawDefault<'_>) -> bool {
    raw.text.is_some()
}

fn is_sql_null(raw: &RawDefault<'_>) -> bool {
    raw.text.is_none()
}

/// `CURRENT_TIMESTAMP` or `CURRENT_TIMESTAMP(n)` on a date/time column
fn is_current_timestamp_keyword(raw: &RawDefault<'_>) -> bool {
    raw.logical.is_temporal()
        && raw
            .trimmed()
            .and_then(current_timestamp_precision)
            .is_some()
}

/// `current_timestamp()` and its synonyms on a date/time column
fn is_current_timestamp_call(raw: &RawDefault<'_>) -> bool {
    raw.logical.is_temporal()
        && raw.trimmed().is_some_and(|t| {
            ["current_timestamp", "now", "localtime", "localtimestamp"]
                .iter()
                .any(|name| is_call_of(t, name))
        })
}

fn is_null_on_not_null_temporal(raw: &RawDefault<'_>) -> bool {
    raw.text.is_none() && !raw.allow_null && raw.logical.is_temporal()
}

fn is_default_generated(raw: &RawDefault<'_>) -> bool {
    raw.text.is_some() && raw.extra.to_ascii_uppercase().contains("DEFAULT_GENERATED")
}

fn is_bit_literal(raw: &RawDefault<'_>) -> bool {
    raw.trimmed().and_then(bit_digits).is_some()
}

// ============================================================================
// Normalizers
// ============================================================================

fn current_timestamp(raw: &RawDefault<'_>) -> RuleResult {
    let precision = raw.trimmed().and_then(call_precision);
    let sql = match precision {
        Some(p) => format!("CURRENT_TIMESTAMP({p})"),
        None => "CURRENT_TIMESTAMP".to_string(),
    };
    Ok(Some(DefaultValue::expression(sql)))
}

fn null_literal(_: &RawDefault<'_>) -> RuleResult {
    Ok(Some(DefaultValue::null()))
}

fn sql_null(raw: &RawDefault<'_>) -> RuleResult {
    Ok(raw.allow_null.then(DefaultValue::null))
}

fn expression(raw: &RawDefault<'_>) -> RuleResult {
    Ok(raw.trimmed().map(|t| DefaultValue::expression(t.to_string())))
}

/// Default reported as SQL text: a quoted string, NULL, a number, a bit
/// literal, or an expression
fn sql_literal(raw: &RawDefault<'_>) -> RuleResult {
    let Some(text) = raw.trimmed() else {
        return Ok(None);
    };
    if text.eq_ignore_ascii_case("NULL") {
        return Ok(Some(DefaultValue::null()));
    }
    if let Some(unquoted) = unquote_sql_string(text, true) {
        return literal(&unquoted, raw.runtime);
    }
    if bit_digits(text).is_some() {
        return bit_literal(raw);
    }
    if is_numeric_literal(text) {
        return literal(text, raw.runtime);
    }
    Ok(Some(DefaultValue::expression(text.to_string())))
}

fn bit_literal(raw: &RawDefault<'_>) -> RuleResult {
    let digits = raw
        .trimmed()
        .and_then(bit_digits)
        .ok_or_else(|| "not a bit literal".to_string())?;
    let value = if digits.is_empty() {
        0
    } else {
        i64::from_str_radix(digits, 2).map_err(|e| e.to_string())?
    };
    let value = match raw.runtime {
        RuntimeType::Boolean => Value::Boolean(value != 0),
        RuntimeType::String => Value::String(value.to_string()),
        _ => Value::Integer(value),
    };
    Ok(Some(DefaultValue::Literal(value)))
}

/// Unquoted literal exactly as Oracle MySQL prints it
fn plain_literal(raw: &RawDefault<'_>) -> RuleResult {
    // Only whitespace is insignificant for non-string columns
    match (raw.text, raw.runtime) {
        (Some(text), RuntimeType::String) => Ok(Some(DefaultValue::Literal(Value::String(
            text.to_string(),
        )))),
        (Some(text), runtime) => literal(text.trim(), runtime),
        (None, _) => Ok(None),
    }
}

// ============================================================================
// Helpers
// ============================================================================

/// `Some(None)` for `CURRENT_TIMESTAMP`/`CURRENT_TIMESTAMP()`,
/// `Some(Some(n))` for `CURRENT_TIMESTAMP(n)`
fn current_timestamp_precision(text: &str) -> Option<Option<u8>> {
    const KEYWORD: &str = "current_timestamp";
    if text.len() < KEYWORD.len() || !text.is_char_boundary(KEYWORD.len()) {
        return None;
    }
    let (head, rest) = text.split_at(KEYWORD.len());
    if !head.eq_ignore_ascii_case(KEYWORD) {
        return None;
    }
    if rest.is_empty() {
        return Some(None);
    }
    let inner = rest.strip_prefix('(')?.strip_suffix(')')?.trim();
    if inner.is_empty() {
        return Some(None);
    }
    inner.parse().ok().map(Some)
}

/// Fractional-seconds precision of `name(n)`
fn call_precision(text: &str) -> Option<u8> {
    let open = text.find('(')?;
    text[open + 1..].strip_suffix(')')?.trim().parse().ok()
}

/// Binary digits of `b'0101'`
fn bit_digits(text: &str) -> Option<&str> {
    let inner = text
        .strip_prefix("b'")
        .or_else(|| text.strip_prefix("B'"))?
        .strip_suffix('\'')?;
    inner.bytes().all(|b| b == b'0' || b == b'1').then_some(inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemata_core::DefaultNormalizer;
    use schemata_types::LogicalType;

    fn normalizer(engine: Engine, version: (u32, u32, u32)) -> DefaultNormalizer {
        DefaultNormalizer::new(
            DEFAULT_RULES,
            engine,
            ServerVersion::new(version.0, version.1, version.2),
        )
    }

    fn timestamp(text: Option<&str>) -> RawDefault<'_> {
        RawDefault::new(text, LogicalType::Timestamp, RuntimeType::String)
    }

    fn int(text: Option<&str>) -> RawDefault<'_> {
        RawDefault::new(text, LogicalType::Integer, RuntimeType::Integer)
    }

    fn varchar(text: Option<&str>) -> RawDefault<'_> {
        RawDefault::new(text, LogicalType::String, RuntimeType::String)
    }

    #[test]
    fn test_rule_sets_per_engine() {
        assert_eq!(
            normalizer(Engine::MySql, (5, 7, 44)).rule_ids(),
            ["current-timestamp-keyword", "bit-literal", "sql-null", "literal"]
        );
        assert_eq!(
            normalizer(Engine::MySql, (8, 0, 33)).rule_ids(),
            [
                "current-timestamp-keyword",
                "mysql-default-generated",
                "bit-literal",
                "sql-null",
                "literal"
            ]
        );
        assert_eq!(
            normalizer(Engine::MariaDb, (10, 2, 3)).rule_ids(),
            [
                "current-timestamp-keyword",
                "current-timestamp-call",
                "mariadb-null-timestamp",
                "bit-literal",
                "sql-null",
                "literal"
            ]
        );
    }

    #[test]
    fn test_every_current_timestamp_spelling_agrees() {
        let expected = Ok(Some(DefaultValue::expression("CURRENT_TIMESTAMP")));
        let mysql = normalizer(Engine::MySql, (8, 0, 33));
        let maria = normalizer(Engine::MariaDb, (10, 4, 12));

        assert_eq!(mysql.normalize(&timestamp(Some("CURRENT_TIMESTAMP"))), expected);
        assert_eq!(mysql.normalize(&timestamp(Some("current_timestamp"))), expected);
        assert_eq!(maria.normalize(&timestamp(Some("current_timestamp()"))), expected);
        assert_eq!(maria.normalize(&timestamp(Some("now()"))), expected);
        assert_eq!(maria.normalize(&timestamp(Some("localtimestamp"))), expected);
        assert_eq!(
            maria.normalize(&timestamp(Some("now(6)"))),
            Ok(Some(DefaultValue::expression("CURRENT_TIMESTAMP(6)")))
        );
        assert_eq!(
            mysql.normalize(&timestamp(Some("CURRENT_TIMESTAMP(3)"))),
            Ok(Some(DefaultValue::expression("CURRENT_TIMESTAMP(3)")))
        );
        assert_eq!(
            maria.normalize(&timestamp(Some("current_timestamp(2)"))),
            Ok(Some(DefaultValue::expression("CURRENT_TIMESTAMP(2)")))
        );
    }

    #[test]
    fn test_current_timestamp_text_on_string_column_is_literal() {
        let mysql = normalizer(Engine::MySql, (8, 0, 33));
        assert_eq!(
            mysql.normalize(&varchar(Some("CURRENT_TIMESTAMP"))),
            Ok(Some(DefaultValue::Literal(Value::String("CURRENT_TIMESTAMP".into()))))
        );
    }

    #[test]
    fn test_mariadb_metadata_null_on_not_null_timestamp() {
        let maria = normalizer(Engine::MariaDb, (10, 2, 3));
        let raw = timestamp(None).allow_null(false);
        assert_eq!(maria.normalize(&raw), Ok(Some(DefaultValue::null())));

        // Older MariaDB and MySQL report no default at all
        let old = normalizer(Engine::MariaDb, (10, 1, 0));
        assert_eq!(old.normalize(&raw), Ok(None));
        let mysql = normalizer(Engine::MySql, (8, 0, 33));
        assert_eq!(mysql.normalize(&raw), Ok(None));
    }

    #[test]
    fn test_null_versus_no_default() {
        let mysql = normalizer(Engine::MySql, (8, 0, 33));
        assert_eq!(mysql.normalize(&int(None)), Ok(Some(DefaultValue::null())));
        assert_eq!(mysql.normalize(&int(None).allow_null(false)), Ok(None));
    }

    #[test]
    fn test_mariadb_quoted_literals() {
        let maria = normalizer(Engine::MariaDb, (10, 4, 12));
        assert_eq!(
            maria.normalize(&varchar(Some("'it''s'"))),
            Ok(Some(DefaultValue::Literal(Value::String("it's".into()))))
        );
        assert_eq!(
            maria.normalize(&varchar(Some("''"))),
            Ok(Some(DefaultValue::Literal(Value::String(String::new()))))
        );
        assert_eq!(maria.normalize(&varchar(Some("NULL"))), Ok(Some(DefaultValue::null())));
        assert_eq!(
            maria.normalize(&int(Some("1"))),
            Ok(Some(DefaultValue::Literal(Value::Integer(1))))
        );
        assert_eq!(
            maria.normalize(&int(Some("(1 + 1)"))),
            Ok(Some(DefaultValue::expression("(1 + 1)")))
        );
    }

    #[test]
    fn test_mysql_generated_expression() {
        let mysql = normalizer(Engine::MySql, (8, 0, 33));
        let raw = RawDefault::new(Some("(rand() * 10)"), LogicalType::Double, RuntimeType::Float)
            .extra("DEFAULT_GENERATED");
        assert_eq!(
            mysql.normalize(&raw),
            Ok(Some(DefaultValue::expression("(rand() * 10)")))
        );

        let old = normalizer(Engine::MySql, (8, 0, 12));
        assert!(old.normalize(&raw).is_err());
    }

    #[test]
    fn test_bit_literals() {
        let mysql = normalizer(Engine::MySql, (5, 7, 44));
        let bit = RawDefault::new(Some("b'101'"), LogicalType::Integer, RuntimeType::Integer);
        assert_eq!(mysql.normalize(&bit), Ok(Some(DefaultValue::Literal(Value::Integer(5)))));

        let flag = RawDefault::new(Some("b'1'"), LogicalType::Boolean, RuntimeType::Boolean);
        assert_eq!(mysql.normalize(&flag), Ok(Some(DefaultValue::Literal(Value::Boolean(true)))));
    }

    #[test]
    fn test_plain_literals_keep_string_whitespace() {
        let mysql = normalizer(Engine::MySql, (5, 7, 44));
        assert_eq!(
            mysql.normalize(&varchar(Some(" padded "))),
            Ok(Some(DefaultValue::Literal(Value::String(" padded ".into()))))
        );
        assert_eq!(
            mysql.normalize(&int(Some("1"))),
            Ok(Some(DefaultValue::Literal(Value::Integer(1))))
        );
    }

    #[test]
    fn test_unparseable_literal_is_rejected() {
        let mysql = normalizer(Engine::MySql, (5, 7, 44));
        assert!(mysql.normalize(&int(Some("one"))).is_err());
    }
}
