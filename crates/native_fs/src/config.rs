//! Runtime configuration

use crate::{FsError, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsConfig {
    pub links: LinksConfig,
    pub logging: LoggingConfig,
}

/// Link creation policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LinksConfig {
    pub symlinks: SymlinkPolicy,
    /// Ask the platform for unprivileged symbolic link creation
    pub allow_unprivileged: bool,
}

impl Default for LinksConfig {
    fn default() -> Self {
        Self {
            symlinks: SymlinkPolicy::Auto,
            allow_unprivileged: true,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SymlinkPolicy {
    /// Use symbolic links when the platform provides them
    #[serde(rename = "auto")]
    Auto,
    /// Report symbolic link creation as not implemented
    #[serde(rename = "disabled")]
    Disabled,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive when `RUST_LOG` is unset
    pub level: String,
    pub log_to_file: bool,
    pub retain_days: u32,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            log_to_file: true,
            retain_days: 7,
        }
    }
}

impl FsConfig {
    /// Load configuration from the default location
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            tracing::info!("Using default configuration");
            Ok(Self::default())
        }
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| FsError::Config(format!("{}: {}", path.display(), e)))?;
        let config = Self::from_toml(&content)?;
        tracing::info!("Configuration loaded from {:?}", path);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| FsError::Config(e.to_string()))
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        let config_path = Self::config_path();

        if let Some(parent) = config_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| FsError::Config(format!("{}: {}", parent.display(), e)))?;
        }

        let content = toml::to_string_pretty(self).map_err(|e| FsError::Config(e.to_string()))?;
        std::fs::write(&config_path, content)
            .map_err(|e| FsError::Config(format!("{}: {}", config_path.display(), e)))?;

        tracing::info!("Configuration saved to {:?}", config_path);
        Ok(())
    }

    /// Get the configuration file path
    pub fn config_path() -> PathBuf {
        ProjectDirs::from("org", "native-fs", "native-fs")
            .map(|dirs| dirs.config_dir().join("config.toml"))
            .unwrap_or_else(|| PathBuf::from("./config.toml"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = FsConfig::default();
        assert_eq!(config.links.symlinks, SymlinkPolicy::Auto);
        assert!(config.links.allow_unprivileged);
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.retain_days, 7);
    }

    #[test]
    fn test_partial_toml() {
        let config = FsConfig::from_toml(
            r#"
            [links]
            symlinks = "disabled"
            "#,
        )
        .unwrap();
        assert_eq!(config.links.symlinks, SymlinkPolicy::Disabled);
        assert!(config.links.allow_unprivileged);
        assert_eq!(config.logging, LoggingConfig::default());
    }

    #[test]
    fn test_invalid_toml() {
        let err = FsConfig::from_toml("[links]\nsymlinks = \"sometimes\"").unwrap_err();
        assert!(matches!(err, FsError::Config(_)));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = FsConfig {
            logging: LoggingConfig {
                level: "debug".to_string(),
                log_to_file: false,
                retain_days: 3,
            },
            ..Default::default()
        };
        std::fs::write(&path, toml::to_string_pretty(&config).unwrap()).unwrap();

        assert_eq!(FsConfig::load_from(&path).unwrap(), config);
    }
}
