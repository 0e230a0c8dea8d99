//! Configuration management using the prefer crate for discovery.

pub mod browser;
pub mod locators;

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

pub use browser::BrowserEngineConfig;
pub use locators::{Locators, PortalConfig};

/// Name prefer searches for (`evictions.toml`, `evictions.yaml`, ...).
const CONFIG_NAME: &str = "evictions";

/// Options for loading configuration.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Explicit config file path (overrides auto-discovery).
    pub config_path: Option<PathBuf>,
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Portal endpoints, pacing and dataset schema.
    #[serde(default)]
    pub portal: PortalConfig,
    /// Browser launch settings.
    #[serde(default)]
    pub browser: BrowserEngineConfig,
    /// DOM selectors.
    #[serde(default)]
    pub locators: Locators,
    /// Directory for issue files (defaults to the dataset's directory).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issues_dir: Option<String>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// Load configuration using prefer crate for discovery.
    pub async fn load() -> Self {
        match prefer::load(CONFIG_NAME).await {
            Ok(pref_config) => {
                if let Some(path) = pref_config.source_path() {
                    match Self::load_from_path(path).await {
                        Ok(config) => config,
                        Err(e) => {
                            tracing::warn!("{}; using defaults", e);
                            Self::default_with_env()
                        }
                    }
                } else {
                    Self::default_with_env()
                }
            }
            Err(_) => Self::default_with_env(),
        }
    }

    /// Default config with environment variable overrides applied.
    pub fn default_with_env() -> Self {
        let mut config = Self::default();
        config.browser = config.browser.with_env_overrides();
        config
    }

    /// Load configuration from a specific file path.
    /// Supports JSON, TOML and YAML based on file extension.
    pub async fn load_from_path(path: &Path) -> Result<Self, String> {
        let contents = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| format!("Failed to read config file: {}", e))?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("toml");

        let mut config = Self::parse(&contents, ext)?;
        config.source_path = Some(path.to_path_buf());
        config.browser = config.browser.with_env_overrides();
        Ok(config)
    }

    fn parse(contents: &str, ext: &str) -> Result<Self, String> {
        let config: Config = match ext {
            "json" => serde_json::from_str(contents)
                .map_err(|e| format!("Failed to parse JSON config: {}", e))?,
            "yaml" | "yml" => serde_yaml::from_str(contents)
                .map_err(|e| format!("Failed to parse YAML config: {}", e))?,
            _ => toml::from_str(contents)
                .map_err(|e| format!("Failed to parse TOML config: {}", e))?,
        };
        config.locators.validate()?;
        Ok(config)
    }

    /// Directory the config file was loaded from, if any.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    /// Resolve a configured path.
    /// - Paths starting with ~ are expanded
    /// - Relative paths are resolved against the config file's directory
    pub fn resolve_path(&self, path_str: &str) -> PathBuf {
        let expanded = shellexpand::tilde(path_str);
        let path = Path::new(expanded.as_ref());

        match self.base_dir() {
            Some(base) if !path.is_absolute() => base.join(path),
            _ => path.to_path_buf(),
        }
    }

    /// Configured issues directory, resolved.
    pub fn issues_dir(&self) -> Option<PathBuf> {
        self.issues_dir.as_deref().map(|dir| self.resolve_path(dir))
    }
}

/// Load configuration honoring an explicit `--config` path.
pub async fn load_config(options: &LoadOptions) -> anyhow::Result<Config> {
    if let Some(ref config_path) = options.config_path {
        let config = Config::load_from_path(config_path)
            .await
            .map_err(anyhow::Error::msg)?;
        tracing::debug!("Loaded config from {}", config_path.display());
        return Ok(config);
    }

    Ok(Config::load().await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::SchemaVersion;

    #[test]
    fn parses_toml_sections() {
        let toml = r#"
            issues_dir = "~/evictions/issues"

            [portal]
            schema = "combined"
            max_span_days = 5

            [browser]
            headless = false

            [locators]
            party_rows = "table.parties tr"
        "#;
        let config = Config::parse(toml, "toml").unwrap();
        assert_eq!(config.portal.schema, SchemaVersion::Combined);
        assert_eq!(config.portal.max_span_days, 5);
        assert_eq!(config.portal.classification_code, "G");
        assert!(!config.browser.headless);
        assert_eq!(config.locators.party_rows, "table.parties tr");
        assert_eq!(config.issues_dir.as_deref(), Some("~/evictions/issues"));
    }

    #[test]
    fn parses_json_and_yaml() {
        let json = Config::parse(r#"{"portal": {"case_delay_ms": 0}}"#, "json").unwrap();
        assert_eq!(json.portal.case_delay_ms, 0);

        let yaml = Config::parse("portal:\n  wait_timeout_secs: 5\n", "yml").unwrap();
        assert_eq!(yaml.portal.wait_timeout_secs, 5);
    }

    #[test]
    fn rejects_invalid_locator() {
        let err = Config::parse("[locators]\nsummary_rows = \"tr[[\"\n", "toml").unwrap_err();
        assert!(err.contains("summary_rows"));
    }

    #[test]
    fn relative_paths_resolve_against_config_dir() {
        let config = Config {
            issues_dir: Some("issues".to_string()),
            source_path: Some(PathBuf::from("/srv/evictions/evictions.toml")),
            ..Config::default()
        };
        assert_eq!(config.issues_dir(), Some(PathBuf::from("/srv/evictions/issues")));
        assert_eq!(config.resolve_path("/tmp/x"), PathBuf::from("/tmp/x"));
    }

    #[tokio::test]
    async fn load_from_path_records_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("evictions.toml");
        std::fs::write(&path, "[portal]\nclassification_code = \"H\"\n").unwrap();

        let config = Config::load_from_path(&path).await.unwrap();
        assert_eq!(config.portal.classification_code, "H");
        assert_eq!(config.source_path.as_deref(), Some(path.as_path()));
    }
}
