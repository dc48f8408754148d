//! Deployment configuration.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::logging::{LogFormat, LogLevel};

/// Configuration for a shop listings deployment.
///
/// Every section has defaults, so an empty file is a valid configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShopConfig {
    /// Search backend.
    #[serde(default)]
    pub solr: SolrConfig,

    /// Where the handlers are mounted.
    #[serde(default)]
    pub mounts: MountConfig,

    /// Price and text presentation.
    #[serde(default)]
    pub presentation: PresentationConfig,

    /// Request logging.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl ShopConfig {
    /// Load config from a file. `.json` files are read as JSON, anything
    /// else as TOML.
    pub fn load(path: &str) -> Result<Self, CoreError> {
        let content = std::fs::read_to_string(path).map_err(|source| CoreError::ConfigRead {
            path: path.to_string(),
            source,
        })?;

        if path.ends_with(".json") {
            Ok(serde_json::from_str(&content)?)
        } else {
            Self::from_toml(&content)
        }
    }

    /// Parse a TOML document.
    pub fn from_toml(content: &str) -> Result<Self, CoreError> {
        Ok(toml::from_str(content)?)
    }

    /// Render as TOML.
    pub fn to_toml(&self) -> Result<String, CoreError> {
        toml::to_string_pretty(self).map_err(|e| CoreError::ConfigWrite(e.to_string()))
    }
}

/// Solr connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolrConfig {
    /// Core URL, e.g. `http://localhost:8983/solr/listings`.
    #[serde(default = "default_solr_url")]
    pub url: String,

    /// Request handler below the core URL.
    #[serde(default = "default_select_handler")]
    pub handler: String,
}

fn default_solr_url() -> String {
    "http://localhost:8983/solr/listings".to_string()
}

fn default_select_handler() -> String {
    "select".to_string()
}

impl Default for SolrConfig {
    fn default() -> Self {
        Self {
            url: default_solr_url(),
            handler: default_select_handler(),
        }
    }
}

impl SolrConfig {
    /// Full URL of the select handler.
    pub fn select_url(&self) -> String {
        format!("{}/{}", self.url.trim_end_matches('/'), self.handler.trim_start_matches('/'))
    }
}

/// Handler mount points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MountConfig {
    /// Application context path (empty for the root).
    #[serde(default)]
    pub context_path: String,

    /// Mount of the JSON listing handler.
    #[serde(default = "default_json_path")]
    pub json_path: String,

    /// Mount of the HTML listing handler.
    #[serde(default = "default_html_path")]
    pub html_path: String,
}

fn default_json_path() -> String {
    "/listings".to_string()
}

fn default_html_path() -> String {
    "/listings.html".to_string()
}

impl Default for MountConfig {
    fn default() -> Self {
        Self {
            context_path: String::new(),
            json_path: default_json_path(),
            html_path: default_html_path(),
        }
    }
}

/// Locale used for formatted prices.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum Locale {
    /// `1.234,50 €`
    #[default]
    #[serde(rename = "de")]
    German,
    /// `€1,234.50`
    #[serde(rename = "en")]
    English,
}

/// Presentation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresentationConfig {
    /// Locale for formatted prices.
    #[serde(default)]
    pub locale: Locale,

    /// ISO currency code of the `price` attribute.
    #[serde(default = "default_currency")]
    pub currency: String,
}

fn default_currency() -> String {
    "EUR".to_string()
}

impl Default for PresentationConfig {
    fn default() -> Self {
        Self {
            locale: Locale::default(),
            currency: default_currency(),
        }
    }
}

/// Logging settings.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Output format.
    #[serde(default)]
    pub format: LogFormat,

    /// Minimum level written.
    #[serde(default = "default_level")]
    pub level: LogLevel,
}

fn default_level() -> LogLevel {
    LogLevel::Info
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            format: LogFormat::default(),
            level: default_level(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_toml_is_default() {
        let config = ShopConfig::from_toml("").unwrap();
        assert_eq!(config, ShopConfig::default());
        assert_eq!(config.mounts.json_path, "/listings");
        assert_eq!(config.presentation.locale, Locale::German);
        assert_eq!(config.presentation.currency, "EUR");
    }

    #[test]
    fn test_partial_toml() {
        let config = ShopConfig::from_toml(
            r#"
[solr]
url = "http://solr:8983/solr/shop/"

[presentation]
locale = "en"
currency = "USD"

[logging]
format = "human"
level = "debug"
"#,
        )
        .unwrap();

        assert_eq!(config.solr.select_url(), "http://solr:8983/solr/shop/select");
        assert_eq!(config.presentation.locale, Locale::English);
        assert_eq!(config.logging.format, LogFormat::Human);
        assert_eq!(config.logging.level, LogLevel::Debug);
        assert_eq!(config.mounts.html_path, "/listings.html");
    }

    #[test]
    fn test_invalid_toml() {
        let err = ShopConfig::from_toml("[presentation]\nlocale = \"fr\"").unwrap_err();
        assert!(matches!(err, CoreError::ConfigParse(_)));
    }

    #[test]
    fn test_toml_roundtrip() {
        let config = ShopConfig::default();
        let text = config.to_toml().unwrap();
        assert_eq!(ShopConfig::from_toml(&text).unwrap(), config);
    }

    #[test]
    fn test_missing_file() {
        let err = ShopConfig::load("/nonexistent/shop.toml").unwrap_err();
        assert!(matches!(err, CoreError::ConfigRead { .. }));
    }
}
