//! Configuration file support
//!
//! Handles loading `schemata.toml`:
//!
//! ```toml
//! [schema]
//! tinyint1_as_boolean = true
//! cache = true
//! default_schema = "app"
//! ```

use serde::Deserialize;
use std::path::{Path, PathBuf};

use schemata_core::{CatalogOptions, validate_identifier};

pub const CONFIG_FILE: &str = "schemata.toml";

/// Longest schema name any supported engine accepts
const MAX_SCHEMA_LEN: usize = 128;

// ============================================================================
// Config
// ============================================================================

/// Parsed configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub schema: SchemaSection,
}

/// The `[schema]` table
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SchemaSection {
    /// Report MySQL `tinyint(1)` columns as booleans
    pub tinyint1_as_boolean: bool,

    /// Keep loaded schemas until refreshed
    pub cache: bool,

    /// Schema for unqualified table names
    pub default_schema: Option<String>,
}

impl Default for SchemaSection {
    fn default() -> Self {
        Self {
            tinyint1_as_boolean: false,
            cache: true,
            default_schema: None,
        }
    }
}

impl Config {
    /// Load from the default config file in the working directory
    pub fn load() -> Result<Self, Error> {
        Self::load_from(Path::new(CONFIG_FILE))
    }

    /// Load from a specific path
    pub fn load_from(path: &Path) -> Result<Self, Error> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                Error::NotFound(path.into())
            } else {
                Error::Io(path.into(), e)
            }
        })?;
        Self::parse(&content, &path.display().to_string())
    }

    /// Parse configuration text
    pub fn from_toml(content: &str) -> Result<Self, Error> {
        Self::parse(content, "<inline>")
    }

    fn parse(content: &str, origin: &str) -> Result<Self, Error> {
        let config: Self =
            toml::from_str(content).map_err(|e| Error::Parse(origin.to_string(), e))?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), Error> {
        if let Some(schema) = &self.schema.default_schema {
            validate_identifier(schema, MAX_SCHEMA_LEN)
                .map_err(|e| Error::InvalidSchema(e.to_string()))?;
        }
        Ok(())
    }

    /// Catalog options described by this file
    #[must_use]
    pub fn catalog_options(&self) -> CatalogOptions {
        let options = CatalogOptions::new()
            .tinyint1_as_boolean(self.schema.tinyint1_as_boolean)
            .cache_enabled(self.schema.cache);
        match &self.schema.default_schema {
            Some(schema) => options.default_schema(schema.clone()),
            None => options,
        }
    }
}

impl From<&Config> for CatalogOptions {
    fn from(config: &Config) -> Self {
        config.catalog_options()
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("config not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("failed to read {}: {}", .0.display(), .1)]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse {0}: {1}")]
    Parse(String, #[source] toml::de::Error),

    #[error("invalid default_schema: {0}")]
    InvalidSchema(String),
}

pub type ConfigError = Error;

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_uses_defaults() {
        let cfg = Config::from_toml("").unwrap();
        assert_eq!(cfg, Config::default());
        assert_eq!(cfg.catalog_options(), CatalogOptions::default());
    }

    #[test]
    fn schema_table() {
        let cfg = Config::from_toml(
            r#"
            [schema]
            tinyint1_as_boolean = true
            cache = false
            default_schema = "app"
        "#,
        )
        .unwrap();
        let options = CatalogOptions::from(&cfg);
        assert!(options.tinyint1_as_boolean);
        assert!(!options.cache_enabled);
        assert_eq!(options.default_schema.as_deref(), Some("app"));
    }

    #[test]
    fn unknown_key_is_rejected() {
        let err = Config::from_toml("[schema]\ntinyint = true").unwrap_err();
        assert!(matches!(err, Error::Parse(..)));
    }

    #[test]
    fn blank_schema_is_rejected() {
        let err = Config::from_toml("[schema]\ndefault_schema = \"  \"").unwrap_err();
        assert!(matches!(err, Error::InvalidSchema(_)));
    }

    #[test]
    fn missing_file() {
        let err = Config::load_from(Path::new("does/not/exist/schemata.toml")).unwrap_err();
        assert!(matches!(err, Error::NotFound(_)));
    }
}
