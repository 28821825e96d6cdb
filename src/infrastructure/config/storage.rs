use super::app_config::AppConfig;
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ConfigError {
    #[error("config file not found: {0}")]
    NotFound(String),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("toml deserialization error: {0}")]
    TomlDe(#[from] toml::de::Error),
}

/// Loads the application configuration.
///
/// An explicit `path` must exist and parse. Without one, the default location
/// is used if present; a missing or malformed default file yields defaults.
///
/// # Errors
///
/// Returns `ConfigError` if an explicit file cannot be read or parsed.
pub fn load_config(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    if let Some(path) = path {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.display().to_string()));
        }
        let content = fs::read_to_string(path)?;
        let mut config: AppConfig = toml::from_str(&content)?;
        config.config = Some(path.to_path_buf());
        return Ok(config);
    }

    let Some(default_path) = AppConfig::default_config_path() else {
        return Ok(AppConfig::default());
    };
    if !default_path.exists() {
        info!("Config file not found at {:?}, using defaults.", default_path);
        return Ok(AppConfig::default());
    }

    let content = fs::read_to_string(&default_path)?;
    match toml::from_str::<AppConfig>(&content) {
        Ok(config) => Ok(config),
        Err(e) => {
            warn!("Failed to parse config file: {}. Using defaults.", e);
            Ok(AppConfig::default())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_load_explicit_config() {
        let dir = tempdir().unwrap();
        let config_file = dir.path().join("config.toml");
        fs::write(&config_file, "[downloader]\ncache_budget_bytes = 4096\n").unwrap();

        let config = load_config(Some(&config_file)).unwrap();
        assert_eq!(config.downloader.cache_budget_bytes, 4096);
        assert_eq!(config.config.as_deref(), Some(config_file.as_path()));
    }

    #[test]
    fn test_explicit_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let result = load_config(Some(&dir.path().join("nope.toml")));
        assert!(matches!(result, Err(ConfigError::NotFound(_))));
    }

    #[test]
    fn test_explicit_malformed_file_is_error() {
        let dir = tempdir().unwrap();
        let config_file = dir.path().join("config.toml");
        fs::write(&config_file, "invalid_toml = [").unwrap();

        let result = load_config(Some(&config_file));
        assert!(matches!(result, Err(ConfigError::TomlDe(_))));
    }
}
