//! Console configuration: `~/.teamtrack/config.toml` plus env overrides.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub const ENV_BACKEND_URL: &str = "TEAMTRACK_BACKEND_URL";
pub const ENV_TRACKER_URL: &str = "TEAMTRACK_TRACKER_URL";

const DEFAULT_BACKEND_URL: &str = "http://127.0.0.1:8000";
const DEFAULT_TRACKER_URL: &str = "https://jira.intertech.com.tr";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("failed to read configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse configuration: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the team-tracking backend.
    pub backend_url: String,
    /// Issue tracker root used for `/browse/{key}` deep links.
    pub tracker_url: String,
    pub request_timeout_secs: u64,
    /// Log destination for the TUI. Defaults to `~/.teamtrack/teamtrack.log`.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            backend_url: DEFAULT_BACKEND_URL.to_string(),
            tracker_url: DEFAULT_TRACKER_URL.to_string(),
            request_timeout_secs: 10,
            log_file: None,
        }
    }
}

/// `~/.teamtrack`, falling back to the temp dir when there is no home.
pub fn teamtrack_home() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".teamtrack")
}

impl Config {
    /// Load from `path`, or from the default location when `None`.
    ///
    /// A missing default file yields defaults; a missing explicit file is
    /// an error.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let (path, explicit) = match path {
            Some(p) => (p.to_path_buf(), true),
            None => (teamtrack_home().join("config.toml"), false),
        };
        let config = match std::fs::read_to_string(&path) {
            Ok(content) => Self::from_toml_str(&content)?,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound && !explicit => {
                debug!(path = %path.display(), "No config file, using defaults");
                Self::default()
            }
            Err(source) => return Err(ConfigError::Io { path, source }),
        };
        Ok(config)
    }

    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.backend_url.trim().is_empty() {
            return Err(ConfigError::Validation("backend_url is empty".into()));
        }
        if self.request_timeout_secs == 0 {
            return Err(ConfigError::Validation(
                "request_timeout_secs must be at least 1".into(),
            ));
        }
        Ok(())
    }

    /// Apply `TEAMTRACK_*` overrides through `lookup` (normally
    /// `std::env::var`). Blank values are ignored.
    pub fn apply_env_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());
        if let Some(url) = non_blank(ENV_BACKEND_URL) {
            self.backend_url = url.trim().to_string();
        }
        if let Some(url) = non_blank(ENV_TRACKER_URL) {
            self.tracker_url = url.trim().to_string();
        }
    }

    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| teamtrack_home().join("teamtrack.log"))
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_file_gives_defaults() {
        let config = Config::from_toml_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = Config::from_toml_str(
            r#"
backend_url = "http://tracker-api:9000"
log_file = "/var/log/teamtrack.log"
"#,
        )
        .unwrap();
        assert_eq!(config.backend_url, "http://tracker-api:9000");
        assert_eq!(config.tracker_url, DEFAULT_TRACKER_URL);
        assert_eq!(config.log_path(), PathBuf::from("/var/log/teamtrack.log"));
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(
            Config::from_toml_str("request_timeout_secs = 0"),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            Config::from_toml_str("backend_url = \"  \""),
            Err(ConfigError::Validation(_))
        ));
        assert!(matches!(
            Config::from_toml_str("backend_url = 5"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn load_reads_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "tracker_url = \"https://issues.example.com\"\n").unwrap();
        let config = Config::load(Some(&path)).unwrap();
        assert_eq!(config.tracker_url, "https://issues.example.com");
        assert_eq!(config.backend_url, DEFAULT_BACKEND_URL);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent.toml");
        assert!(matches!(
            Config::load(Some(&path)),
            Err(ConfigError::Io { .. })
        ));
    }

    #[test]
    fn env_overrides_replace_non_blank_values() {
        let env: HashMap<&str, &str> = [
            (ENV_BACKEND_URL, " http://10.0.0.5:8000 "),
            (ENV_TRACKER_URL, "   "),
        ]
        .into_iter()
        .collect();
        let mut config = Config::default();
        config.apply_env_overrides(|name| env.get(name).map(|v| v.to_string()));
        assert_eq!(config.backend_url, "http://10.0.0.5:8000");
        assert_eq!(config.tracker_url, DEFAULT_TRACKER_URL);
    }
}
