use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Default maximum nesting of groups, existence scopes and count scopes
pub const DEFAULT_MAX_DEPTH: usize = 10;

/// Collation used by localized orderings when the locale is not mapped
pub const DEFAULT_COLLATION: &str = "utf8mb4_unicode_ci";

/// Compiler settings shared between requests.
///
/// Missing fields fall back to their defaults, so a partial JSON document is
/// enough:
///
/// ```rust
/// use querycrate::QueryBuilderConfig;
///
/// let config = QueryBuilderConfig::from_json(r#"{"max_depth": 4}"#).unwrap();
/// assert_eq!(config.max_depth, 4);
/// assert_eq!(config.collation_for(Some("sv")), "utf8mb4_swedish_ci");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct QueryBuilderConfig {
    /// Locale → database collation, used by `localizedasc` / `localizeddesc`
    pub collations: HashMap<String, String>,
    /// Collation for unmapped locales
    pub default_collation: String,
    /// Deepest nesting accepted before the request is rejected
    pub max_depth: usize,
}

impl Default for QueryBuilderConfig {
    fn default() -> Self {
        let collations = [("sv", "utf8mb4_swedish_ci"), ("sv-SE", "utf8mb4_swedish_ci")]
            .into_iter()
            .map(|(locale, collation)| (locale.to_string(), collation.to_string()))
            .collect();

        Self {
            collations,
            default_collation: DEFAULT_COLLATION.to_string(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

impl QueryBuilderConfig {
    /// Parse a configuration from JSON text.
    ///
    /// # Errors
    ///
    /// Returns the `serde_json` error when the text is not a valid document.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    /// Collation for `locale`, falling back to [`Self::default_collation`]
    #[must_use]
    pub fn collation_for(&self, locale: Option<&str>) -> &str {
        locale
            .and_then(|locale| self.collations.get(locale))
            .map_or(self.default_collation.as_str(), String::as_str)
    }

    /// Map another locale to a collation
    #[must_use]
    pub fn with_collation(mut self, locale: impl Into<String>, collation: impl Into<String>) -> Self {
        self.collations.insert(locale.into(), collation.into());
        self
    }

    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}
