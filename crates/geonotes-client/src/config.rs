// ABOUTME: Client configuration: API base address and request timeout
// ABOUTME: Layers defaults, an optional TOML file, and GEONOTES_* environment variables

use crate::error::{NotesError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use url::Url;

/// Dev server address used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:3000";

/// Upper bound on a single request, send through body read.
pub const DEFAULT_TIMEOUT_MS: u64 = 5000;

pub const API_URL_ENV: &str = "GEONOTES_API_URL";
pub const TIMEOUT_ENV: &str = "GEONOTES_TIMEOUT_MS";

/// Settings the core needs to reach the notes API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base address of the REST server (e.g., "http://192.168.1.3:3000")
    pub api_url: String,

    /// Request deadline in milliseconds
    pub timeout_ms: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
        }
    }
}

impl ClientConfig {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            ..Self::default()
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = timeout.as_millis() as u64;
        self
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// Returns the default config file path (~/.config/geonotes/config.toml)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("geonotes").join("config.toml"))
    }

    /// Load configuration.
    ///
    /// An explicit `path` must exist. Without one, the default path is read
    /// if present. Environment variables are applied last.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config = match path {
            Some(p) => Self::from_file(p)?,
            None => match Self::default_path() {
                Some(p) if p.exists() => Self::from_file(&p)?,
                _ => Self::default(),
            },
        };

        config.apply_env()
    }

    /// Read a TOML file; missing keys keep their defaults.
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            NotesError::Config(format!("Failed to read config from {:?}: {}", path, e))
        })?;
        let config: Self = toml::from_str(&contents)
            .map_err(|e| NotesError::Config(format!("Failed to parse config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `GEONOTES_API_URL` and `GEONOTES_TIMEOUT_MS` if set.
    pub fn apply_env(self) -> Result<Self> {
        self.apply_overrides(
            std::env::var(API_URL_ENV).ok(),
            std::env::var(TIMEOUT_ENV).ok(),
        )
    }

    /// Apply raw string overrides (from env or CLI flags) and re-validate.
    pub fn apply_overrides(
        mut self,
        api_url: Option<String>,
        timeout_ms: Option<String>,
    ) -> Result<Self> {
        if let Some(url) = api_url.filter(|u| !u.trim().is_empty()) {
            self.api_url = url.trim().to_string();
        }
        if let Some(raw) = timeout_ms {
            self.timeout_ms = raw.trim().parse().map_err(|_| {
                NotesError::Config(format!("timeout_ms must be a positive integer, got {raw:?}"))
            })?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check that the address is http(s) and the timeout is non-zero.
    pub fn validate(&self) -> Result<()> {
        self.base_url()?;
        if self.timeout_ms == 0 {
            return Err(NotesError::Config("timeout_ms must be greater than 0".into()));
        }
        Ok(())
    }

    /// Parsed base address with any trailing slash removed.
    pub fn base_url(&self) -> Result<Url> {
        let trimmed = self.api_url.trim().trim_end_matches('/');
        let url = Url::parse(trimmed)
            .map_err(|e| NotesError::Config(format!("invalid api_url {:?}: {}", self.api_url, e)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(NotesError::Config(format!(
                "api_url must use http or https, got {other}"
            ))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.api_url, "http://localhost:3000");
        assert_eq!(config.timeout_ms, 5000);
        assert_eq!(config.timeout(), Duration::from_millis(5000));
    }

    #[test]
    fn test_with_timeout() {
        let config = ClientConfig::new("http://10.0.2.2:3000").with_timeout(Duration::from_millis(250));
        assert_eq!(config.api_url, "http://10.0.2.2:3000");
        assert_eq!(config.timeout_ms, 250);
    }

    #[test]
    fn test_from_file_partial() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, r#"api_url = "http://192.168.1.3:3000""#).unwrap();

        let config = ClientConfig::from_file(file.path()).unwrap();
        assert_eq!(config.api_url, "http://192.168.1.3:3000");
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
    }

    #[test]
    fn test_from_file_rejects_bad_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "api_url = ").unwrap();

        let err = ClientConfig::from_file(file.path()).unwrap_err();
        assert!(matches!(err, NotesError::Config(msg) if msg.contains("parse")));
    }

    #[test]
    fn test_load_explicit_missing_file_fails() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("nope.toml");
        assert!(matches!(
            ClientConfig::load(Some(&missing)),
            Err(NotesError::Config(_))
        ));
    }

    #[test]
    fn test_overrides_win() {
        let config = ClientConfig::default()
            .apply_overrides(Some("https://notes.example.com/".into()), Some("1200".into()))
            .unwrap();
        assert_eq!(config.api_url, "https://notes.example.com/");
        assert_eq!(config.timeout_ms, 1200);
        assert_eq!(config.base_url().unwrap().as_str(), "https://notes.example.com/");
    }

    #[test]
    fn test_blank_override_is_ignored() {
        let config = ClientConfig::default()
            .apply_overrides(Some("   ".into()), None)
            .unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_bad_timeout_override() {
        let err = ClientConfig::default()
            .apply_overrides(None, Some("soon".into()))
            .unwrap_err();
        assert!(matches!(err, NotesError::Config(_)));

        let err = ClientConfig::default()
            .apply_overrides(None, Some("0".into()))
            .unwrap_err();
        assert!(matches!(err, NotesError::Config(msg) if msg.contains("greater than 0")));
    }

    #[test]
    fn test_validate_rejects_non_http() {
        assert!(ClientConfig::new("ftp://example.com").validate().is_err());
        assert!(ClientConfig::new("not a url").validate().is_err());
        assert!(ClientConfig::new("http://localhost:3000/").validate().is_ok());
    }
}
