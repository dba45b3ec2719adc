use crate::utils::url::{normalize_base_url, DEFAULT_API_BASE_URL};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

/// Environment variable that overrides the configured API base URL.
pub const BASE_URL_ENV: &str = "GEMINI_BASE_URL";
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;
pub const MIN_REQUEST_TIMEOUT_SECS: u64 = 1;

#[derive(Debug, Serialize, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct Config {
    /// Gemini REST base URL (defaults to the public v1beta endpoint)
    pub api_base_url: Option<String>,
    /// Upper bound for a single model listing or generation request
    pub request_timeout_secs: Option<u64>,
    /// Directory exported reports are written to (defaults to the working directory)
    pub export_dir: Option<PathBuf>,
}

/// Keys accepted by `artrestorer set` / `artrestorer unset`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKey {
    ApiBaseUrl,
    RequestTimeout,
    ExportDir,
}

impl ConfigKey {
    pub const ALL: [ConfigKey; 3] = [
        ConfigKey::ApiBaseUrl,
        ConfigKey::RequestTimeout,
        ConfigKey::ExportDir,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            ConfigKey::ApiBaseUrl => "api-base-url",
            ConfigKey::RequestTimeout => "request-timeout",
            ConfigKey::ExportDir => "export-dir",
        }
    }
}

impl fmt::Display for ConfigKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ConfigKey {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        ConfigKey::ALL
            .into_iter()
            .find(|key| key.as_str() == value)
            .ok_or_else(|| {
                let known: Vec<&str> = ConfigKey::ALL.iter().map(|key| key.as_str()).collect();
                format!("Unknown config key: {value} (expected one of: {})", known.join(", "))
            })
    }
}

impl Config {
    /// Effective base URL: `GEMINI_BASE_URL`, then the config file, then the default.
    pub fn api_base_url(&self) -> String {
        std::env::var(BASE_URL_ENV)
            .ok()
            .filter(|value| !value.trim().is_empty())
            .or_else(|| self.api_base_url.clone())
            .map(|value| normalize_base_url(value.trim()))
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string())
    }

    /// Effective request timeout. A hand-edited `0` is raised to one second.
    pub fn request_timeout(&self) -> Duration {
        let secs = self
            .request_timeout_secs
            .unwrap_or(DEFAULT_REQUEST_TIMEOUT_SECS)
            .max(MIN_REQUEST_TIMEOUT_SECS);
        Duration::from_secs(secs)
    }

    pub fn export_dir(&self) -> PathBuf {
        self.export_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn set_value(&mut self, key: ConfigKey, value: &str) -> Result<(), String> {
        let value = value.trim();
        if value.is_empty() {
            return Err(format!("A value is required for {key}"));
        }
        match key {
            ConfigKey::ApiBaseUrl => {
                if !value.starts_with("http://") && !value.starts_with("https://") {
                    return Err(format!("{key} must start with http:// or https://"));
                }
                self.api_base_url = Some(normalize_base_url(value));
            }
            ConfigKey::RequestTimeout => {
                let secs: u64 = value
                    .parse()
                    .map_err(|_| format!("{key} must be a whole number of seconds"))?;
                if secs < MIN_REQUEST_TIMEOUT_SECS {
                    return Err(format!(
                        "{key} must be at least {MIN_REQUEST_TIMEOUT_SECS} second"
                    ));
                }
                self.request_timeout_secs = Some(secs);
            }
            ConfigKey::ExportDir => self.export_dir = Some(PathBuf::from(value)),
        }
        Ok(())
    }

    pub fn unset_value(&mut self, key: ConfigKey) {
        match key {
            ConfigKey::ApiBaseUrl => self.api_base_url = None,
            ConfigKey::RequestTimeout => self.request_timeout_secs = None,
            ConfigKey::ExportDir => self.export_dir = None,
        }
    }
}

/// Get a user-friendly display string for a path
/// Converts absolute paths to use ~ notation on Unix-like systems when possible
pub fn path_display<P: AsRef<Path>>(path: P) -> String {
    let path = path.as_ref();

    #[cfg(unix)]
    {
        if let Some(home) = std::env::var_os("HOME") {
            let home_path = PathBuf::from(home);
            if let Ok(relative) = path.strip_prefix(&home_path) {
                return format!("~/{}", relative.display());
            }
        }
    }

    path.display().to_string()
}
