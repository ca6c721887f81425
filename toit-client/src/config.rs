use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    path::{Path, PathBuf},
    time::Duration,
};

pub const DEFAULT_API_URL: &str = "https://api.toit.io";

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub api_url: String,
    /// Per-call timeout. Calls wait indefinitely when unset.
    pub timeout_secs: Option<u64>,
    pub log_level: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_secs: None,
            log_level: "warn".to_string(),
        }
    }
}

impl Config {
    /// Reads `<config dir>/toit/config.json` if present. The file is never created or written.
    pub fn load() -> Result<Self> {
        match Self::config_file_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = serde_json::from_str(&contents)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    /// Values given on the command line or through the environment win over the file.
    pub fn with_overrides(
        mut self,
        api_url: Option<String>,
        timeout_secs: Option<u64>,
        log_level: Option<String>,
    ) -> Self {
        if let Some(api_url) = api_url {
            self.api_url = api_url;
        }
        if timeout_secs.is_some() {
            self.timeout_secs = timeout_secs;
        }
        if let Some(log_level) = log_level {
            self.log_level = log_level;
        }
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.map(Duration::from_secs)
    }

    fn config_file_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("toit").join("config.json"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.api_url, "https://api.toit.io");
        assert_eq!(config.timeout(), None);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_config_serialization() {
        let config = Config {
            timeout_secs: Some(30),
            ..Config::default()
        };
        let json = serde_json::to_string(&config).unwrap();
        let deserialized: Config = serde_json::from_str(&json).unwrap();
        assert_eq!(config, deserialized);
    }

    #[test]
    fn test_load_from_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        let config = Config::load_from(&path).unwrap();
        assert_eq!(config, Config::default());
        assert!(!path.exists());
    }

    #[test]
    fn test_load_from_partial_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, r#"{ "api_url": "http://localhost:50051", "timeout_secs": 10 }"#)
            .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.api_url, "http://localhost:50051");
        assert_eq!(config.timeout(), Some(Duration::from_secs(10)));
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn test_load_from_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.json");
        std::fs::write(&path, "{ not json").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(err.to_string().contains("Failed to parse config file"));
    }

    #[test]
    fn test_overrides_win_over_file_values() {
        let config = Config {
            api_url: "http://from-file:1".to_string(),
            timeout_secs: Some(10),
            log_level: "info".to_string(),
        };

        let kept = config.clone().with_overrides(None, None, None);
        assert_eq!(kept, config);

        let overridden = config.with_overrides(
            Some("http://from-flag:2".to_string()),
            Some(3),
            Some("debug".to_string()),
        );
        assert_eq!(overridden.api_url, "http://from-flag:2");
        assert_eq!(overridden.timeout_secs, Some(3));
        assert_eq!(overridden.log_level, "debug");
    }
}
