//! Configuration file handling.
//!
//! The configuration lives at `~/.concierge/config.json`. Every field has a
//! default, so a partial (or missing) file is valid. `CONCIERGE_API_URL`
//! overrides the backend URL.

use crate::error::{ConfigError, ConfigResult};
use crate::session::{DEFAULT_GREETING, DEFAULT_GUEST_NAME, EngineConfig};
use crate::util::{config_dir, downloads_dir, sessions_dir};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// Environment variable overriding [`BackendConfig::api_url`].
pub const API_URL_ENV: &str = "CONCIERGE_API_URL";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConciergeConfig {
    /// Chat and save backend.
    pub backend: BackendConfig,
    /// Session behaviour.
    pub session: SessionConfig,
    /// Local file locations.
    pub storage: StorageConfig,
}

/// Backend settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BackendConfig {
    /// Base URL serving `/llm-chat` and `/save-chat`.
    pub api_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            api_url: "http://127.0.0.1:8000".to_string(),
            timeout_secs: 30,
        }
    }
}

impl BackendConfig {
    /// Request timeout.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Session settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SessionConfig {
    /// Greeting posted when a session starts. Empty disables it.
    pub greeting: String,
    /// How to address the guest before a name is known.
    pub guest_name: String,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            greeting: DEFAULT_GREETING.to_string(),
            guest_name: DEFAULT_GUEST_NAME.to_string(),
        }
    }
}

impl SessionConfig {
    /// Engine configuration derived from these settings.
    #[must_use]
    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            greeting: (!self.greeting.is_empty()).then(|| self.greeting.clone()),
            guest_name: self.guest_name.clone(),
        }
    }
}

/// Local storage settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StorageConfig {
    /// Directory for saved session records.
    pub sessions_dir: PathBuf,
    /// Directory for downloaded transcripts.
    pub downloads_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            sessions_dir: sessions_dir(),
            downloads_dir: downloads_dir(),
        }
    }
}

/// Severity of a configuration issue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IssueLevel {
    /// Works, but probably not what was intended.
    Warning,
    /// Will not work.
    Error,
}

/// A problem found by [`ConciergeConfig::validate`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigIssue {
    /// Severity.
    pub level: IssueLevel,
    /// Human-readable description.
    pub message: String,
}

impl ConfigIssue {
    fn error(message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Error,
            message: message.into(),
        }
    }

    fn warning(message: impl Into<String>) -> Self {
        Self {
            level: IssueLevel::Warning,
            message: message.into(),
        }
    }
}

impl fmt::Display for ConfigIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let level = match self.level {
            IssueLevel::Warning => "warning",
            IssueLevel::Error => "error",
        };
        write!(f, "{level}: {}", self.message)
    }
}

impl ConciergeConfig {
    /// Apply environment overrides.
    #[must_use]
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides_from(|key| std::env::var(key).ok())
    }

    /// Apply overrides read through `lookup`. Blank values are ignored.
    #[must_use]
    pub fn with_overrides_from(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(API_URL_ENV)
            && !url.trim().is_empty()
        {
            debug!(url = %url, "backend URL overridden from environment");
            self.backend.api_url = url.trim().to_string();
        }
        self
    }

    /// Check the configuration for problems.
    #[must_use]
    pub fn validate(&self) -> Vec<ConfigIssue> {
        let mut issues = Vec::new();

        let url = self.backend.api_url.trim();
        if url.is_empty() {
            issues.push(ConfigIssue::error("backend.apiUrl is empty"));
        } else if !(url.starts_with("http://") || url.starts_with("https://")) {
            issues.push(ConfigIssue::error(format!(
                "backend.apiUrl must start with http:// or https:// (got {url})"
            )));
        }

        if self.backend.timeout_secs == 0 {
            issues.push(ConfigIssue::error("backend.timeoutSecs must be positive"));
        }

        if self.session.guest_name.trim().is_empty() {
            issues.push(ConfigIssue::warning(
                "session.guestName is empty; the assistant will not address the guest",
            ));
        }

        if self.session.greeting.is_empty() {
            issues.push(ConfigIssue::warning(
                "session.greeting is empty; sessions start without a greeting",
            ));
        }

        issues
    }

    /// Whether [`validate`](Self::validate) reports any error.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate()
            .iter()
            .all(|issue| issue.level != IssueLevel::Error)
    }
}

/// Default configuration file path.
#[must_use]
pub fn config_path() -> PathBuf {
    config_dir().join("config.json")
}

/// Load the configuration from the default path.
///
/// A missing file yields the defaults.
pub async fn load_config() -> ConfigResult<ConciergeConfig> {
    load_config_from(&config_path()).await
}

/// Load the configuration from `path`.
pub async fn load_config_from(path: &Path) -> ConfigResult<ConciergeConfig> {
    if !path.exists() {
        debug!(path = %path.display(), "no config file, using defaults");
        return Ok(ConciergeConfig::default());
    }
    let content = tokio::fs::read_to_string(path).await?;
    let config = serde_json::from_str(&content)?;
    debug!(path = %path.display(), "config loaded");
    Ok(config)
}

/// Write the configuration to `path`.
pub async fn save_config(config: &ConciergeConfig, path: &Path) -> ConfigResult<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let content = serde_json::to_string_pretty(config)?;
    tokio::fs::write(path, content).await?;
    Ok(())
}

/// Write a default configuration to `path` and return it.
pub async fn init_config(path: &Path) -> ConfigResult<ConciergeConfig> {
    let config = ConciergeConfig::default();
    let issues = config.validate();
    if let Some(issue) = issues.iter().find(|i| i.level == IssueLevel::Error) {
        return Err(ConfigError::invalid(issue.message.clone()));
    }
    save_config(&config, path).await?;
    Ok(config)
}
