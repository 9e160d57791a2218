//! Configuration management.
//!
//! Settings come from three layers, highest priority first:
//!
//! 1. Command-line flags (applied by the CLI on top of [`Config`])
//! 2. Environment variables (`NOTION_TOKEN`, `NOTION_RECIPE_DB_ID`, ...)
//! 3. The config file at `~/.paprika2notion/config.json`
//!
//! Anything still unset falls back to the built-in defaults.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::PropertyNames;
use crate::remote::{ErrorCategory, NOTION_API_URL};
use crate::sync::RetryPolicy;

/// Notion integration token.
pub const ENV_TOKEN: &str = "NOTION_TOKEN";
/// Id of the recipe database.
pub const ENV_DATABASE_ID: &str = "NOTION_RECIPE_DB_ID";
/// API base URL, for proxies and tests.
pub const ENV_API_URL: &str = "NOTION_API_URL";
/// Attempts per remote call.
pub const ENV_RETRY_ATTEMPTS: &str = "P2N_RETRY_ATTEMPTS";
/// Pause between attempts, in milliseconds.
pub const ENV_RETRY_DELAY_MS: &str = "P2N_RETRY_DELAY_MS";
/// Results per listing page.
pub const ENV_PAGE_SIZE: &str = "P2N_PAGE_SIZE";

/// Default results per listing page (the Notion maximum).
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Default HTTP timeout per request.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Contents of the config file. Every key is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub token: Option<String>,
    pub database_id: Option<String>,
    pub api_url: Option<String>,
    pub page_size: Option<u32>,
    pub retry_attempts: Option<u32>,
    pub retry_delay_ms: Option<u64>,
    /// Failure categories worth a retry; all of them when unset.
    pub retry_on: Option<Vec<ErrorCategory>>,
    pub timeout_secs: Option<u64>,
    /// Column names of the recipe database.
    pub properties: PropertyNames,
}

/// Resolved settings for one run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub token: Option<String>,
    pub database_id: Option<String>,
    pub api_url: String,
    pub page_size: u32,
    pub retry: RetryPolicy,
    pub timeout: Duration,
    pub properties: PropertyNames,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            token: None,
            database_id: None,
            api_url: NOTION_API_URL.to_string(),
            page_size: DEFAULT_PAGE_SIZE,
            retry: RetryPolicy::default(),
            timeout: DEFAULT_TIMEOUT,
            properties: PropertyNames::default(),
        }
    }
}

impl Config {
    /// Load the config file (if any) and apply the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be read or
    /// parsed, or if an environment variable holds an invalid number.
    pub fn load(explicit_path: Option<&Path>) -> Result<Self> {
        let file = match explicit_path {
            Some(path) => load_file(path)?,
            None => match config_path() {
                Some(path) => load_file(&path)?,
                None => FileConfig::default(),
            },
        };
        Self::resolve(file, |key| std::env::var(key).ok())
    }

    /// Merge a file config with environment values looked up by `env`.
    ///
    /// Empty environment values count as unset.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if a numeric variable does not parse.
    pub fn resolve<F>(file: FileConfig, env: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = |key: &str| env(key).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        let mut retry = RetryPolicy::default();
        if let Some(attempts) = parse_env(&env, ENV_RETRY_ATTEMPTS)?.or(file.retry_attempts) {
            retry.max_attempts = attempts;
        }
        if let Some(ms) = parse_env::<u64>(&env, ENV_RETRY_DELAY_MS)?.or(file.retry_delay_ms) {
            retry.delay = Duration::from_millis(ms);
        }
        if let Some(categories) = file.retry_on {
            retry.retryable = categories;
        }

        Ok(Self {
            token: env(ENV_TOKEN).or(file.token),
            database_id: env(ENV_DATABASE_ID).or(file.database_id),
            api_url: env(ENV_API_URL)
                .or(file.api_url)
                .unwrap_or(defaults.api_url),
            page_size: parse_env(&env, ENV_PAGE_SIZE)?
                .or(file.page_size)
                .unwrap_or(defaults.page_size),
            retry,
            timeout: file
                .timeout_secs
                .map_or(defaults.timeout, Duration::from_secs),
            properties: file.properties,
        })
    }

    /// The Notion token.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingToken`] if none is configured.
    pub fn require_token(&self) -> Result<&str> {
        self.token.as_deref().ok_or(Error::MissingToken)
    }

    /// The recipe database id, preferring `flag` over configured values.
    ///
    /// # Errors
    ///
    /// Returns [`Error::MissingDatabaseId`] if neither is set.
    pub fn require_database_id<'a>(&'a self, flag: Option<&'a str>) -> Result<&'a str> {
        flag.or(self.database_id.as_deref())
            .filter(|id| !id.trim().is_empty())
            .ok_or(Error::MissingDatabaseId)
    }
}

/// Location of the user config file, `~/.paprika2notion/config.json`.
#[must_use]
pub fn config_path() -> Option<PathBuf> {
    directories::BaseDirs::new().map(|b| b.home_dir().join(".paprika2notion").join("config.json"))
}

/// Read a config file. A missing file yields the empty config.
///
/// # Errors
///
/// Returns [`Error::Config`] if the file cannot be read or parsed.
pub fn load_file(path: &Path) -> Result<FileConfig> {
    if !path.exists() {
        return Ok(FileConfig::default());
    }

    let content = fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {e}", path.display())))?;

    serde_json::from_str(&content)
        .map_err(|e| Error::Config(format!("Failed to parse {}: {e}", path.display())))
}

fn parse_env<T: FromStr>(env: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T::Err: std::fmt::Display,
{
    env(key)
        .map(|raw| {
            raw.trim()
                .parse()
                .map_err(|e| Error::Config(format!("{key}={raw}: {e}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_defaults() {
        let config = Config::resolve(FileConfig::default(), env(&[])).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.api_url, "https://api.notion.com");
        assert_eq!(config.retry.max_attempts, 2);
        assert!(config.require_token().is_err());
    }

    #[test]
    fn test_env_overrides_file() {
        let file = FileConfig {
            token: Some("file-token".into()),
            database_id: Some("file-db".into()),
            page_size: Some(50),
            retry_delay_ms: Some(5000),
            ..FileConfig::default()
        };
        let config = Config::resolve(
            file,
            env(&[
                (ENV_TOKEN, "env-token"),
                (ENV_PAGE_SIZE, "25"),
                (ENV_RETRY_ATTEMPTS, "4"),
            ]),
        )
        .unwrap();

        assert_eq!(config.require_token().unwrap(), "env-token");
        assert_eq!(config.database_id.as_deref(), Some("file-db"));
        assert_eq!(config.page_size, 25);
        assert_eq!(config.retry.max_attempts, 4);
        assert_eq!(config.retry.delay, Duration::from_millis(5000));
    }

    #[test]
    fn test_empty_env_value_is_unset() {
        let file = FileConfig {
            token: Some("file-token".into()),
            ..FileConfig::default()
        };
        let config = Config::resolve(file, env(&[(ENV_TOKEN, "  ")])).unwrap();
        assert_eq!(config.token.as_deref(), Some("file-token"));
    }

    #[test]
    fn test_flag_overrides_database_id() {
        let config = Config::resolve(FileConfig::default(), env(&[(ENV_DATABASE_ID, "env-db")]))
            .unwrap();
        assert_eq!(config.require_database_id(Some("flag-db")).unwrap(), "flag-db");
        assert_eq!(config.require_database_id(None).unwrap(), "env-db");
        assert!(matches!(
            Config::default().require_database_id(None),
            Err(Error::MissingDatabaseId)
        ));
    }

    #[test]
    fn test_invalid_number_is_config_error() {
        let err = Config::resolve(FileConfig::default(), env(&[(ENV_RETRY_ATTEMPTS, "many")]))
            .unwrap_err();
        assert!(matches!(err, Error::Config(ref msg) if msg.contains("P2N_RETRY_ATTEMPTS")));
    }

    #[test]
    fn test_load_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");

        assert_eq!(load_file(&path).unwrap(), FileConfig::default());

        fs::write(
            &path,
            r#"{"database_id": "db", "retry_on": ["rate_limited", "server"],
                "properties": {"identity": "Source Hash"}}"#,
        )
        .unwrap();
        let file = load_file(&path).unwrap();
        assert_eq!(file.database_id.as_deref(), Some("db"));
        assert_eq!(file.properties.identity, "Source Hash");
        assert_eq!(file.properties.title, "Recipe");

        let config = Config::resolve(file, env(&[])).unwrap();
        assert!(!config
            .retry
            .is_retryable(&crate::remote::RemoteError::Network("reset".into())));
    }

    #[test]
    fn test_malformed_file_is_config_error() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("config.json");
        fs::write(&path, "{not json").unwrap();

        assert!(matches!(load_file(&path), Err(Error::Config(_))));
    }

    #[test]
    fn test_config_path_is_under_home() {
        let path = config_path().unwrap();
        assert!(path.ends_with(".paprika2notion/config.json"));
    }
}
