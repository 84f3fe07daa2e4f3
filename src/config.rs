use crate::error::ConfigError;
use crate::models::Tab;
use serde::Deserialize;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const APP_DIR: &str = "todo-tui";

#[derive(Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    pub store_url: Option<String>,
    pub timeout_secs: u64,
    pub log_file: Option<PathBuf>,
    pub default_tab: Tab,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            store_url: None,
            timeout_secs: 10,
            log_file: None,
            default_tab: Tab::Today,
        }
    }
}

impl Config {
    /// Reads the config file (if any) and applies environment overrides.
    pub fn load() -> Result<Config, ConfigError> {
        let path = env::var_os("TODO_TUI_CONFIG")
            .map(PathBuf::from)
            .or_else(default_config_path);

        let mut config = match path {
            Some(path) if path.exists() => Config::from_file(&path)?,
            _ => Config::default(),
        };
        config.apply_overrides(|key| env::var(key).ok())?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Config, ConfigError> {
        let contents = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        toml::from_str(&contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> Result<(), ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(url) = lookup("TODO_STORE_URL") {
            self.store_url = Some(url);
        }
        if let Some(file) = lookup("TODO_LOG_FILE") {
            self.log_file = Some(PathBuf::from(file));
        }
        if let Some(value) = lookup("TODO_TIMEOUT_SECS") {
            self.timeout_secs = value
                .trim()
                .parse()
                .map_err(|_| ConfigError::InvalidValue {
                    key: "TODO_TIMEOUT_SECS",
                    value,
                })?;
        }
        Ok(())
    }

    pub fn store_url(&self) -> Result<&str, ConfigError> {
        match self.store_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(url),
            _ => Err(ConfigError::MissingStoreUrl),
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs.max(1))
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file.clone().unwrap_or_else(|| {
            dirs::data_local_dir()
                .unwrap_or_else(env::temp_dir)
                .join(APP_DIR)
                .join("todo-tui.log")
        })
    }
}

fn default_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(APP_DIR).join("config.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn test_parse_full_config() {
        let config: Config = toml::from_str(
            r#"
            store_url = "https://example.com/blob/1"
            timeout_secs = 3
            log_file = "/tmp/todo.log"
            default_tab = "overdue"
            "#,
        )
        .unwrap();
        assert_eq!(config.store_url().unwrap(), "https://example.com/blob/1");
        assert_eq!(config.timeout(), Duration::from_secs(3));
        assert_eq!(config.log_path(), PathBuf::from("/tmp/todo.log"));
        assert_eq!(config.default_tab, Tab::Overdue);
    }

    #[test]
    fn test_missing_keys_use_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert!(matches!(
            config.store_url(),
            Err(ConfigError::MissingStoreUrl)
        ));
    }

    #[test]
    fn test_blank_store_url_is_missing() {
        let config = Config {
            store_url: Some("  ".to_string()),
            ..Config::default()
        };
        assert!(config.store_url().is_err());
    }

    #[test]
    fn test_env_overrides_file_values() {
        let mut config: Config = toml::from_str(r#"store_url = "https://a""#).unwrap();
        let vars: HashMap<&str, &str> = [
            ("TODO_STORE_URL", "https://b"),
            ("TODO_TIMEOUT_SECS", "30"),
        ]
        .into_iter()
        .collect();
        config
            .apply_overrides(|key| vars.get(key).map(|v| v.to_string()))
            .unwrap();
        assert_eq!(config.store_url().unwrap(), "https://b");
        assert_eq!(config.timeout_secs, 30);
    }

    #[test]
    fn test_invalid_timeout_override() {
        let mut config = Config::default();
        let result = config.apply_overrides(|key| {
            (key == "TODO_TIMEOUT_SECS").then(|| "soon".to_string())
        });
        assert!(matches!(
            result,
            Err(ConfigError::InvalidValue {
                key: "TODO_TIMEOUT_SECS",
                ..
            })
        ));
    }

    #[test]
    fn test_unknown_tab_is_parse_error() {
        let result: Result<Config, _> = toml::from_str(r#"default_tab = "someday""#);
        assert!(result.is_err());
    }
}
