use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

use crate::generate::GenerateConfig;
use crate::secrets::config::REPO_PATH_ENV;
use crate::secrets::SecretsConfig;
use crate::storage::StorageConfig;

pub const DEFAULT_CONFIG: &str = include_str!("../default_config.toml");

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub paste: StorageConfig,
    pub secrets: SecretsConfig,
    #[serde(default)]
    pub generate: GenerateConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub bind: SocketAddr,
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("PUBLIC_GIT_REPO_PATH is not set and secrets.repo_path is empty")]
    MissingRepoPath,
}

impl AppConfig {
    /// Reads `path`, falling back to the built-in defaults when the file
    /// does not exist, then applies environment overrides.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let raw = match std::fs::read_to_string(path) {
            Ok(raw) => raw,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                tracing::warn!(path = %path.display(), "Config file not found, using defaults");
                DEFAULT_CONFIG.to_string()
            }
            Err(e) => return Err(e.into()),
        };
        let mut config = Self::from_toml(&raw)?;
        config.apply_env(std::env::var(REPO_PATH_ENV).ok());
        config.validate()?;
        Ok(config)
    }

    pub fn from_toml(raw: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(raw)?)
    }

    /// A non-empty repo path from the environment wins over the file.
    pub fn apply_env(&mut self, repo_path: Option<String>) {
        if let Some(path) = repo_path.filter(|p| !p.trim().is_empty()) {
            self.secrets.repo_path = path.into();
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secrets.repo_path.as_os_str().is_empty() {
            return Err(ConfigError::MissingRepoPath);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::BackendKind;

    #[test]
    fn test_default_config_parses() {
        let config = AppConfig::from_toml(DEFAULT_CONFIG).unwrap();
        assert_eq!(config.paste.backend, BackendKind::Redb);
        assert_eq!(config.paste.max_text_bytes, 1024 * 1024);
        assert_eq!(config.paste.max_file_bytes, 10 * 1024 * 1024);
        assert_eq!(config.secrets.fast_tick_sec, 7);
        assert_eq!(config.secrets.slow_tick_sec, 300);
        assert_eq!(config.secrets.max_file_bytes, 5 * 1024 * 1024);
        assert_eq!(config.generate.max_amount, 1_000_000);
    }

    #[test]
    fn test_missing_repo_path_fails_fast() {
        let mut config = AppConfig::from_toml(DEFAULT_CONFIG).unwrap();
        config.apply_env(None);
        assert!(matches!(config.validate(), Err(ConfigError::MissingRepoPath)));

        config.apply_env(Some("   ".to_string()));
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_env_overrides_repo_path() {
        let mut config = AppConfig::from_toml(DEFAULT_CONFIG).unwrap();
        config.apply_env(Some("/srv/secrets-repo".to_string()));
        assert!(config.validate().is_ok());
        assert_eq!(config.secrets.repo_path, Path::new("/srv/secrets-repo"));
    }

    #[test]
    fn test_memory_backend_section() {
        let raw = r#"
            [server]
            bind = "127.0.0.1:4000"

            [paste]
            backend = "memory"
            data_dir = "/tmp/d"
            files_dir = "/tmp/f"

            [secrets]
            repo_path = "/tmp/repo"
            remote = "origin"
        "#;
        let config = AppConfig::from_toml(raw).unwrap();
        assert_eq!(config.paste.backend, BackendKind::Memory);
        assert_eq!(config.paste.public_clear_interval_sec, 3 * 24 * 60 * 60);
        assert_eq!(config.secrets.remote.as_deref(), Some("origin"));
        assert!(config.validate().is_ok());
    }
}
