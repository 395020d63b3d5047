use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct ProviderConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    /// Source currency new sessions start with.
    #[serde(default = "default_source")]
    pub source: String,
    /// Target currency new sessions start with.
    #[serde(default = "default_target")]
    pub target: String,
    pub provider: Option<ProviderConfig>,
}

fn default_source() -> String {
    "usd".to_string()
}

fn default_target() -> String {
    "pkr".to_string()
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            source: default_source(),
            target: default_target(),
            provider: None,
        }
    }
}

impl AppConfig {
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!("No config file at {}, using defaults", config_path.display());
            return Ok(AppConfig::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("io", "fxc", "fxc")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_deserialization() {
        let yaml_str = r#"
source: "eur"
target: "inr"

provider:
  base_url: "http://example.com/rates"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.source, "eur");
        assert_eq!(config.target, "inr");
        assert_eq!(
            config.provider.unwrap().base_url,
            "http://example.com/rates"
        );
    }

    #[test]
    fn test_config_defaults_for_missing_keys() {
        let yaml_str = r#"
source: "gbp"
"#;

        let config: AppConfig = serde_yaml::from_str(yaml_str).expect("Failed to deserialize");
        assert_eq!(config.source, "gbp");
        assert_eq!(config.target, "pkr");
        assert!(config.provider.is_none());
    }

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.source, "usd");
        assert_eq!(config.target, "pkr");
        assert!(config.provider.is_none());
    }

    #[test]
    fn test_load_from_missing_path_is_an_error() {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let path = dir.path().join("nope.yaml");
        assert!(AppConfig::load_from_path(&path).is_err());
    }
}
