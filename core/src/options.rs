/// Per-catalog behaviour switches
///
/// ```
/// use schemata_core::CatalogOptions;
///
/// let options = CatalogOptions::new()
///     .tinyint1_as_boolean(true)
///     .default_schema("app");
/// assert!(options.cache_enabled);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default, rename_all = "snake_case"))]
pub struct CatalogOptions {
    /// Report MySQL `tinyint(1)` columns as booleans
    pub tinyint1_as_boolean: bool,
    /// Keep loaded schemas until invalidated
    ///
    /// When off, every lookup introspects again, still one load per key at
    /// a time.
    pub cache_enabled: bool,
    /// Schema for unqualified table names, overriding the engine default
    pub default_schema: Option<String>,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            tinyint1_as_boolean: false,
            cache_enabled: true,
            default_schema: None,
        }
    }
}

impl CatalogOptions {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn tinyint1_as_boolean(self, tinyint1_as_boolean: bool) -> Self {
        Self {
            tinyint1_as_boolean,
            ..self
        }
    }

    #[must_use]
    pub fn cache_enabled(self, cache_enabled: bool) -> Self {
        Self {
            cache_enabled,
            ..self
        }
    }

    #[must_use]
    pub fn default_schema(self, schema: impl Into<String>) -> Self {
        Self {
            default_schema: Some(schema.into()),
            ..self
        }
    }
}
