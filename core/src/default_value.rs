//! Data-driven default-value normalization
//!
//! Each engine crate declares an ordered `&'static [DefaultRule]`. A
//! [`DefaultNormalizer`] keeps the rules that apply to one engine and server
//! version, and the first rule whose predicate matches a raw default decides
//! the result. New quirks are new table rows; nothing here branches on engine.

use core::fmt;

use schemata_types::{DefaultValue, Engine, LogicalType, RuntimeType, ServerVersion, Value};
use thiserror::Error;

/// A column default exactly as the engine reported it, with the column
/// facts the rules need
#[derive(Debug, Clone, Copy)]
pub struct RawDefault<'a> {
    /// `None` when the catalog reported SQL NULL
    pub text: Option<&'a str>,
    pub logical: LogicalType,
    pub runtime: RuntimeType,
    pub allow_null: bool,
    /// Engine-specific extra flags (MySQL `Extra`), empty elsewhere
    pub extra: &'a str,
}

impl<'a> RawDefault<'a> {
    #[must_use]
    pub fn new(text: Option<&'a str>, logical: LogicalType, runtime: RuntimeType) -> Self {
        Self {
            text,
            logical,
            runtime,
            allow_null: true,
            extra: "",
        }
    }

    #[must_use]
    pub fn allow_null(self, allow_null: bool) -> Self {
        Self { allow_null, ..self }
    }

    #[must_use]
    pub fn extra(self, extra: &'a str) -> Self {
        Self { extra, ..self }
    }

    /// Trimmed default text, `None` for SQL NULL
    #[must_use]
    pub fn trimmed(&self) -> Option<&'a str> {
        self.text.map(str::trim)
    }
}

/// Rule outcome: `Ok(None)` means the column has no default
pub type RuleResult = Result<Option<DefaultValue>, String>;

/// One row of a quirk table
#[derive(Clone, Copy)]
pub struct DefaultRule {
    /// Stable identifier used in logs and errors
    pub id: &'static str,
    /// Engines this rule applies to
    pub engines: &'static [Engine],
    /// Inclusive lower version bound
    pub since: Option<ServerVersion>,
    /// Exclusive upper version bound
    pub until: Option<ServerVersion>,
    pub matches: fn(&RawDefault<'_>) -> bool,
    pub normalize: fn(&RawDefault<'_>) -> RuleResult,
}

impl DefaultRule {
    #[must_use]
    pub fn applies_to(&self, engine: Engine, version: ServerVersion) -> bool {
        self.engines.contains(&engine) && version.within(self.since, self.until)
    }
}

impl fmt::Debug for DefaultRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DefaultRule")
            .field("id", &self.id)
            .field("engines", &self.engines)
            .field("since", &self.since)
            .field("until", &self.until)
            .finish_non_exhaustive()
    }
}

/// A raw default no rule could interpret
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DefaultError {
    #[error("default {text:?} rejected by rule '{rule}': {reason}")]
    Rejected {
        rule: &'static str,
        text: String,
        reason: String,
    },
    #[error("no default rule matches {text:?}")]
    Unmatched { text: String },
}

/// Quirk table filtered for one engine and server version
#[derive(Debug, Clone)]
pub struct DefaultNormalizer {
    rules: Vec<&'static DefaultRule>,
}

impl DefaultNormalizer {
    /// Keep the rules of `table` that apply to `engine` at `version`, in order
    #[must_use]
    pub fn new(table: &'static [DefaultRule], engine: Engine, version: ServerVersion) -> Self {
        Self {
            rules: table
                .iter()
                .filter(|r| r.applies_to(engine, version))
                .collect(),
        }
    }

    /// Identifiers of the active rules, in evaluation order
    #[must_use]
    pub fn rule_ids(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.id).collect()
    }

    /// The rule that would handle `raw`, if any
    #[must_use]
    pub fn matching_rule(&self, raw: &RawDefault<'_>) -> Option<&'static DefaultRule> {
        self.rules.iter().copied().find(|r| (r.matches)(raw))
    }

    pub fn normalize(&self, raw: &RawDefault<'_>) -> Result<Option<DefaultValue>, DefaultError> {
        let text = || raw.text.unwrap_or("NULL").to_string();
        let rule = self
            .matching_rule(raw)
            .ok_or_else(|| DefaultError::Unmatched { text: text() })?;
        (rule.normalize)(raw).map_err(|reason| DefaultError::Rejected {
            rule: rule.id,
            text: text(),
            reason,
        })
    }
}

// ============================================================================
// Literal helpers shared by the engine tables
// ============================================================================

/// Unquote a single-quoted SQL string literal
///
/// Doubled quotes are always unescaped; backslash escapes only when
/// `backslash` is set. Returns `None` if `text` is not one quoted literal.
#[must_use]
pub fn unquote_sql_string(text: &str, backslash: bool) -> Option<String> {
    let inner = text.strip_prefix('\'')?.strip_suffix('\'')?;
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();
    while let Some(ch) = chars.next() {
        match ch {
            '\'' => match chars.next() {
                Some('\'') => out.push('\''),
                _ => return None,
            },
            '\\' if backslash => match chars.next()? {
                'n' => out.push('\n'),
                'r' => out.push('\r'),
                't' => out.push('\t'),
                '0' => out.push('\0'),
                'Z' => out.push('\x1a'),
                other => out.push(other),
            },
            _ => out.push(ch),
        }
    }
    Some(out)
}

/// Numeric literal as engines print them: optional sign, digits, optional
/// fraction and exponent
#[must_use]
pub fn is_numeric_literal(text: &str) -> bool {
    let t = text.trim();
    let t = t.strip_prefix(['-', '+']).unwrap_or(t);
    let (mantissa, exponent) = match t.find(['e', 'E']) {
        Some(i) => (&t[..i], Some(&t[i + 1..])),
        None => (t, None),
    };
    let mut parts = mantissa.splitn(2, '.');
    let int = parts.next().unwrap_or("");
    let frac = parts.next();
    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    let mantissa_ok = digits(int)
        && frac.is_none_or(digits)
        && (!int.is_empty() || frac.is_some_and(|f| !f.is_empty()));
    let exponent_ok = exponent.is_none_or(|e| {
        let e = e.strip_prefix(['-', '+']).unwrap_or(e);
        !e.is_empty() && digits(e)
    });
    mantissa_ok && exponent_ok
}

/// Whether `text` is `name` or `name(...)`, case-insensitively
#[must_use]
pub fn is_call_of(text: &str, name: &str) -> bool {
    let t = text.trim();
    if t.len() < name.len() || !t.is_char_boundary(name.len()) {
        return false;
    }
    let (head, rest) = t.split_at(name.len());
    head.eq_ignore_ascii_case(name) && (rest.is_empty() || (rest.starts_with('(') && rest.ends_with(')')))
}

/// Parse a literal for a runtime type, mapping the failure to a rule reason
pub fn literal(text: &str, runtime: RuntimeType) -> RuleResult {
    Value::parse_as(text, runtime)
        .map(|v| Some(DefaultValue::Literal(v)))
        .map_err(|e| e.to_string())
}
