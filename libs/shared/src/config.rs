use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// hCaptcha site key the board is registered under. Overridable for staging.
pub const DEFAULT_SITE_KEY: &str = "f51c9268-17ec-4426-82c2-845648d2b2b0";

/// Hosted page that renders the visual hCaptcha challenge and posts the
/// token back to the local callback listener.
pub const DEFAULT_CHALLENGE_URL: &str = "https://confessboard.app/captcha";

pub const API_URL_ENV: &str = "CONFESS_API_URL";
pub const SITE_KEY_ENV: &str = "CONFESS_SITE_KEY";

/// Command-line overrides. Highest precedence, above env and config file.
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    pub api_url: Option<String>,
    pub site_key: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Base URL of the confession API, without a trailing slash.
    pub api_url: String,
    pub site_key: String,
    pub challenge_url: String,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            api_url: "https://api.confessboard.app".to_string(),
            site_key: DEFAULT_SITE_KEY.to_string(),
            challenge_url: DEFAULT_CHALLENGE_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Read(String),
    #[error("failed to parse config file: {0}")]
    Parse(String),
    #[error("invalid api_url: {0}")]
    InvalidApiUrl(String),
    #[error("api_url scheme must be http or https")]
    UnsupportedScheme,
    #[error("site_key cannot be empty")]
    EmptySiteKey,
}

impl AppConfig {
    /// Resolve the effective config: defaults, then the optional TOML file,
    /// then environment variables, then CLI flags.
    pub fn load(path: Option<&Path>, overrides: &CliOverrides) -> Result<Self, ConfigError> {
        Self::load_with_env(path, overrides, |key| std::env::var(key).ok())
    }

    /// Same resolution with the environment lookup injected, so tests stay
    /// independent of the process environment.
    fn load_with_env(
        path: Option<&Path>,
        overrides: &CliOverrides,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        let mut config = match path {
            Some(path) if path.exists() => {
                let raw = std::fs::read_to_string(path)
                    .map_err(|e| ConfigError::Read(e.to_string()))?;
                toml::from_str(&raw).map_err(|e| ConfigError::Parse(e.to_string()))?
            }
            _ => Self::default(),
        };

        if let Some(url) = env(API_URL_ENV) {
            config.api_url = url;
        }
        if let Some(key) = env(SITE_KEY_ENV) {
            config.site_key = key;
        }

        if let Some(url) = &overrides.api_url {
            config.api_url = url.clone();
        }
        if let Some(key) = &overrides.site_key {
            config.site_key = key.clone();
        }

        config.api_url = normalize_api_url(&config.api_url)?;
        if config.site_key.trim().is_empty() {
            return Err(ConfigError::EmptySiteKey);
        }

        Ok(config)
    }
}

/// Validate the API base URL and strip any trailing slash so endpoint paths
/// can be appended with a plain `format!`.
fn normalize_api_url(url: &str) -> Result<String, ConfigError> {
    let trimmed = url.trim().trim_end_matches('/');
    let parsed = reqwest::Url::parse(trimmed)
        .map_err(|e| ConfigError::InvalidApiUrl(e.to_string()))?;

    if parsed.scheme() != "http" && parsed.scheme() != "https" {
        return Err(ConfigError::UnsupportedScheme);
    }

    Ok(trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    // All tests resolve through `load_with_env` with an explicit environment
    // so the process env never leaks into the assertions.
    fn load_no_env(path: Option<&Path>, overrides: &CliOverrides) -> Result<AppConfig, ConfigError> {
        AppConfig::load_with_env(path, overrides, |_| None)
    }

    #[test]
    fn defaults_are_valid() {
        let config = load_no_env(None, &CliOverrides::default()).unwrap();
        assert_eq!(config.site_key, DEFAULT_SITE_KEY);
        assert!(config.api_url.starts_with("https://"));
    }

    #[test]
    fn trailing_slash_is_stripped() {
        let overrides = CliOverrides {
            api_url: Some("http://localhost:3000/".to_string()),
            site_key: None,
        };
        let config = load_no_env(None, &overrides).unwrap();
        assert_eq!(config.api_url, "http://localhost:3000");
    }

    #[test]
    fn rejects_non_http_scheme() {
        let overrides = CliOverrides {
            api_url: Some("ftp://example.com".to_string()),
            site_key: None,
        };
        assert_eq!(
            load_no_env(None, &overrides),
            Err(ConfigError::UnsupportedScheme)
        );
    }

    #[test]
    fn rejects_empty_site_key() {
        let overrides = CliOverrides {
            api_url: None,
            site_key: Some("  ".to_string()),
        };
        assert_eq!(load_no_env(None, &overrides), Err(ConfigError::EmptySiteKey));
    }

    #[test]
    fn config_file_is_read_and_flags_win() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "api_url = \"http://file.example\"\nsite_key = \"file-key\"\nchallenge_url = \"http://file.example/captcha\""
        )
        .unwrap();

        let config = load_no_env(Some(file.path()), &CliOverrides::default()).unwrap();
        assert_eq!(config.api_url, "http://file.example");
        assert_eq!(config.site_key, "file-key");

        let overrides = CliOverrides {
            api_url: Some("http://flag.example".to_string()),
            site_key: None,
        };
        let config = load_no_env(Some(file.path()), &overrides).unwrap();
        assert_eq!(config.api_url, "http://flag.example");
        assert_eq!(config.site_key, "file-key");
    }

    #[test]
    fn env_overrides_file_and_flags_override_env() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "api_url = \"http://file.example\"\nsite_key = \"file-key\"").unwrap();

        let env = |key: &str| match key {
            API_URL_ENV => Some("http://env.example".to_string()),
            SITE_KEY_ENV => Some("env-key".to_string()),
            _ => None,
        };

        let config =
            AppConfig::load_with_env(Some(file.path()), &CliOverrides::default(), env).unwrap();
        assert_eq!(config.api_url, "http://env.example");
        assert_eq!(config.site_key, "env-key");

        let overrides = CliOverrides {
            api_url: Some("http://flag.example".to_string()),
            site_key: None,
        };
        let config = AppConfig::load_with_env(Some(file.path()), &overrides, env).unwrap();
        assert_eq!(config.api_url, "http://flag.example");
        assert_eq!(config.site_key, "env-key");
    }
}
