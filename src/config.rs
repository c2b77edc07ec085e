//! Application configuration
//!
//! Read from `~/.config/vocab-swipe/config.toml` (platform equivalent) when
//! present:
//! ```toml
//! data_dir = "/srv/vocab"        # default: <local data dir>/vocab-swipe
//! policy = "sequential"          # "random" (default) or "skipped-last"
//! remote_url = "http://host:3000" # use a remote API instead of local files
//!
//! [server]
//! host = "0.0.0.0"
//! port = 3000
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::selector::SelectionPolicy;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Data directory not found")]
    DataDirNotFound,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data_dir: Option<PathBuf>,
    pub policy: SelectionPolicy,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remote_url: Option<String>,
    pub server: ServerConfig,
}

impl AppConfig {
    /// Platform config location, if the platform has one
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("vocab-swipe").join("config.toml"))
    }

    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::debug!("No config at {:?}, using defaults", path);
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(content)?)
    }

    /// Root of all stored data
    pub fn data_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.data_dir {
            Some(dir) => Ok(dir.clone()),
            None => dirs::data_local_dir()
                .map(|p| p.join("vocab-swipe"))
                .ok_or(ConfigError::DataDirNotFound),
        }
    }

    pub fn sources_dir(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.data_dir()?.join("sources"))
    }

    pub fn progress_dir(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.data_dir()?.join("progress"))
    }

    pub fn server_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.policy, SelectionPolicy::Random);
        assert_eq!(config.server_addr(), "127.0.0.1:3000");
        assert!(config.remote_url.is_none());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = AppConfig::from_toml_str(
            r#"
            policy = "sequential"

            [server]
            port = 8080
            "#,
        )
        .unwrap();

        assert_eq!(config.policy, SelectionPolicy::Sequential);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 8080);
    }

    #[test]
    fn test_data_dir_layout() {
        let config = AppConfig::from_toml_str(r#"data_dir = "/srv/vocab""#).unwrap();
        assert_eq!(config.sources_dir().unwrap(), PathBuf::from("/srv/vocab/sources"));
        assert_eq!(config.progress_dir().unwrap(), PathBuf::from("/srv/vocab/progress"));
    }

    #[test]
    fn test_missing_file_is_default() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::load(&temp_dir.path().join("config.toml")).unwrap();
        assert_eq!(config, AppConfig::default());
    }

    #[test]
    fn test_malformed_file_is_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.toml");
        fs::write(&path, "policy = \"shuffle\"").unwrap();

        assert!(matches!(AppConfig::load(&path), Err(ConfigError::Parse(_))));
    }
}
