//! Configuration types for sat-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Service endpoint URLs
///
/// The defaults are placeholders; point them at the real service before use.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointConfig {
    /// Authentication endpoint (multipart POST, returns `{"token": ...}`)
    #[serde(default = "default_auth_url")]
    pub auth_url: String,

    /// Package discovery endpoint (JSON POST, returns `{"packages": [...]}`)
    #[serde(default = "default_query_url")]
    pub query_url: String,

    /// Package download base URL; the package identifier is appended as a path segment
    #[serde(default = "default_download_url")]
    pub download_url: String,
}

impl Default for EndpointConfig {
    fn default() -> Self {
        Self {
            auth_url: default_auth_url(),
            query_url: default_query_url(),
            download_url: default_download_url(),
        }
    }
}

/// Per-endpoint request timeouts
///
/// Each bound covers the whole request, including reading the response body.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeoutConfig {
    /// Authentication timeout (default: 30 seconds)
    #[serde(default = "default_short_timeout", with = "duration_serde")]
    pub auth: Duration,

    /// Discovery timeout (default: 30 seconds)
    #[serde(default = "default_short_timeout", with = "duration_serde")]
    pub query: Duration,

    /// Package transfer timeout (default: 60 seconds)
    #[serde(default = "default_download_timeout", with = "duration_serde")]
    pub download: Duration,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            auth: default_short_timeout(),
            query: default_short_timeout(),
            download: default_download_timeout(),
        }
    }
}

/// Main configuration for [`SatDownloader`](crate::SatDownloader)
///
/// All fields have sensible defaults, so `Config::default()` works out of the
/// box once the endpoints point at a real service.
///
/// # Example
///
/// ```
/// use sat_dl::Config;
/// use std::time::Duration;
///
/// let config = Config {
///     package_delay: Duration::from_secs(2),
///     ..Default::default()
/// };
/// assert!(config.validate().is_ok());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    /// Service endpoints
    #[serde(default)]
    pub endpoints: EndpointConfig,

    /// Request timeouts
    #[serde(default)]
    pub timeouts: TimeoutConfig,

    /// Pause after every package, including the last (default: 1 second)
    #[serde(default = "default_package_delay", with = "duration_serde")]
    pub package_delay: Duration,

    /// Default output directory for archives and documents (default: "./downloads")
    #[serde(default = "default_output_dir")]
    pub output_dir: PathBuf,

    /// Archive entries kept by extraction, matched case-insensitively against the
    /// entry name suffix (default: ["xml"])
    #[serde(default = "default_extract_extensions")]
    pub extract_extensions: Vec<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            endpoints: EndpointConfig::default(),
            timeouts: TimeoutConfig::default(),
            package_delay: default_package_delay(),
            output_dir: default_output_dir(),
            extract_extensions: default_extract_extensions(),
        }
    }
}

impl Config {
    /// Load configuration from a JSON file
    ///
    /// Missing fields fall back to their defaults. The result is validated.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Io(std::io::Error::new(
                e.kind(),
                format!("failed to read config file '{}': {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_json::from_str(&content)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that endpoints are absolute http(s) URLs, timeouts are non-zero
    /// and at least one extraction extension is configured
    pub fn validate(&self) -> Result<()> {
        validate_url("endpoints.auth_url", &self.endpoints.auth_url)?;
        validate_url("endpoints.query_url", &self.endpoints.query_url)?;
        validate_url("endpoints.download_url", &self.endpoints.download_url)?;

        for (key, timeout) in [
            ("timeouts.auth", self.timeouts.auth),
            ("timeouts.query", self.timeouts.query),
            ("timeouts.download", self.timeouts.download),
        ] {
            if timeout.is_zero() {
                return Err(Error::config(key, "timeout must be greater than zero"));
            }
        }

        if self.extract_extensions.is_empty() {
            return Err(Error::config(
                "extract_extensions",
                "at least one extension is required",
            ));
        }
        if self
            .extract_extensions
            .iter()
            .any(|ext| ext.trim_start_matches('.').is_empty())
        {
            return Err(Error::config(
                "extract_extensions",
                "extensions must not be empty",
            ));
        }

        Ok(())
    }
}

fn validate_url(key: &str, value: &str) -> Result<()> {
    let parsed = url::Url::parse(value)
        .map_err(|e| Error::config(key, format!("invalid URL '{}': {}", value, e)))?;
    match parsed.scheme() {
        "http" | "https" => Ok(()),
        other => Err(Error::config(
            key,
            format!("unsupported URL scheme '{}' in '{}'", other, value),
        )),
    }
}

fn default_auth_url() -> String {
    "https://example.com/sat/auth".to_string()
}

fn default_query_url() -> String {
    "https://example.com/sat/query".to_string()
}

fn default_download_url() -> String {
    "https://example.com/sat/download".to_string()
}

fn default_short_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_download_timeout() -> Duration {
    Duration::from_secs(60)
}

fn default_package_delay() -> Duration {
    Duration::from_secs(1)
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("./downloads")
}

fn default_extract_extensions() -> Vec<String> {
    vec!["xml".to_string()]
}

// Duration serialization helper (whole seconds)
mod duration_serde {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = u64::deserialize(deserializer)?;
        Ok(Duration::from_secs(secs))
    }
}
