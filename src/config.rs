use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants::{
    DEFAULT_API_URL, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY_MS, DEFAULT_TIMEOUT_SECONDS,
};
use crate::error::{Result, SourceError};

pub const USERNAME_ENV: &str = "ADAPTIVE_USERNAME";
pub const PASSWORD_ENV: &str = "ADAPTIVE_PASSWORD";

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    pub username: String,
    pub password: String,
    pub method_obj: MethodConfig,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    #[serde(default)]
    pub request: RequestConfig,
    /// Directory for the reshape spill file; the system temp dir when unset.
    #[serde(default)]
    pub spill_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct MethodConfig {
    pub method: String,
    pub version: String,
    pub accounts: Vec<String>,
    pub date_selected: String,
    #[serde(default)]
    pub dimensions: Vec<String>,
    /// End of the time span for wide exports. Defaults to `date_selected`.
    #[serde(default)]
    pub date_end: Option<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RequestConfig {
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
    #[serde(default = "default_retry_delay_ms")]
    pub retry_delay_ms: u64,
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

impl Default for RequestConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl RequestConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

fn default_timeout_seconds() -> u64 {
    DEFAULT_TIMEOUT_SECONDS
}

fn default_retry_delay_ms() -> u64 {
    DEFAULT_RETRY_DELAY_MS
}

fn default_max_attempts() -> u32 {
    DEFAULT_MAX_ATTEMPTS
}

impl SourceConfig {
    /// Load a config file (TOML when the extension is `.toml`, JSON otherwise),
    /// apply credential overrides from the environment and validate it.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path).map_err(|e| {
            SourceError::Config(format!("Failed to read config file '{}': {}", path.display(), e))
        })?;

        let is_toml = path.extension().and_then(|s| s.to_str()) == Some("toml");
        let mut config: SourceConfig = if is_toml {
            toml::from_str(&content)?
        } else {
            serde_json::from_str(&content)?
        };

        // .env is optional
        let _ = dotenv::dotenv();
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn apply_env_overrides(&mut self) {
        if let Ok(username) = std::env::var(USERNAME_ENV) {
            self.username = username;
        }
        if let Ok(password) = std::env::var(PASSWORD_ENV) {
            self.password = password;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.username.trim().is_empty() {
            return Err(SourceError::Config("username must not be empty".into()));
        }
        if self.password.is_empty() {
            return Err(SourceError::Config("password must not be empty".into()));
        }
        if self.method_obj.version.trim().is_empty() {
            return Err(SourceError::Config("method_obj.version must not be empty".into()));
        }
        if self.method_obj.accounts.is_empty() {
            return Err(SourceError::Config(
                "method_obj.accounts must list at least one account code".into(),
            ));
        }
        if self.request.max_attempts == 0 {
            return Err(SourceError::Config("request.max_attempts must be at least 1".into()));
        }
        Ok(())
    }
}
