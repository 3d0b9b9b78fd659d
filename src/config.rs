//! Server configuration.
//!
//! Values come from the environment and may be overridden by CLI flags
//! (precedence: CLI flag > env var).

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use miette::Diagnostic;
use thiserror::Error;

pub const HOST_ENV: &str = "PIPECD_HOST";
pub const API_KEY_ENV: &str = "PIPECD_API_KEY";
pub const API_KEY_FILE_ENV: &str = "PIPECD_API_KEY_FILE";
pub const INSECURE_ENV: &str = "PIPECD_INSECURE";
pub const TIMEOUT_ENV: &str = "PIPECD_TIMEOUT";

#[derive(Error, Diagnostic, Debug)]
pub enum ConfigError {
    #[error("PIPECD_HOST is required")]
    #[diagnostic(
        code(pipecd_mcp::config::missing_host),
        help("Set PIPECD_HOST to the control plane address, e.g. pipecd.example.com:443")
    )]
    MissingHost,

    #[error("PIPECD_API_KEY or PIPECD_API_KEY_FILE is required")]
    #[diagnostic(
        code(pipecd_mcp::config::missing_api_key),
        help("Create an API key with read-only role in the PipeCD console")
    )]
    MissingApiKey,

    #[error("Failed to read API key file {path:?}")]
    #[diagnostic(code(pipecd_mcp::config::key_file))]
    KeyFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid timeout '{value}': expected a whole number of seconds")]
    #[diagnostic(code(pipecd_mcp::config::invalid_timeout))]
    InvalidTimeout { value: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

/// PipeCD API key. Redacted from debug output.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into().trim().to_string())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Read a key from a file, ignoring surrounding whitespace.
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        std::fs::read_to_string(path)
            .map(Self::new)
            .map_err(|source| ConfigError::KeyFile {
                path: path.to_path_buf(),
                source,
            })
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Backend connection settings.
#[derive(Debug, Clone)]
pub struct Config {
    /// Control plane address: `host:port` or a full URL.
    pub host: String,
    pub api_key: ApiKey,
    /// Use plain HTTP instead of TLS.
    pub insecure: bool,
    /// Per-request timeout for backend calls.
    pub timeout: Option<Duration>,
}

impl Config {
    pub fn new(host: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            host: host.into(),
            api_key: ApiKey::new(api_key),
            insecure: false,
            timeout: None,
        }
    }

    /// Load configuration from `PIPECD_*` environment variables.
    ///
    /// `PIPECD_API_KEY` wins over `PIPECD_API_KEY_FILE` when both are set.
    pub fn from_env() -> ConfigResult<Self> {
        Self::load(ConfigOverrides::default())
    }

    /// Load configuration from the environment, with `overrides` taking
    /// precedence over the matching variables.
    pub fn load(overrides: ConfigOverrides) -> ConfigResult<Self> {
        let host = overrides
            .host
            .filter(|h| !h.trim().is_empty())
            .or_else(|| non_empty_var(HOST_ENV))
            .ok_or(ConfigError::MissingHost)?;

        let api_key = match overrides.api_key_file {
            Some(path) => ApiKey::from_file(&path)?,
            None => match non_empty_var(API_KEY_ENV) {
                Some(key) => ApiKey::new(key),
                None => match non_empty_var(API_KEY_FILE_ENV) {
                    Some(path) => ApiKey::from_file(Path::new(&path))?,
                    None => ApiKey::default(),
                },
            },
        };
        if api_key.is_empty() {
            return Err(ConfigError::MissingApiKey);
        }

        let insecure = overrides.insecure || env::var(INSECURE_ENV).is_ok_and(|v| v == "true");

        let timeout = match overrides.timeout {
            Some(timeout) => Some(timeout),
            None => non_empty_var(TIMEOUT_ENV)
                .map(|v| parse_timeout(&v))
                .transpose()?,
        };

        Ok(Self {
            host,
            api_key,
            insecure,
            timeout,
        })
    }
}

/// Values given on the command line.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub host: Option<String>,
    pub api_key_file: Option<PathBuf>,
    /// Forces plain HTTP; `false` defers to `PIPECD_INSECURE`.
    pub insecure: bool,
    pub timeout: Option<Duration>,
}

/// Parse a timeout given in whole seconds.
pub fn parse_timeout(value: &str) -> ConfigResult<Duration> {
    value
        .trim()
        .parse::<u64>()
        .ok()
        .filter(|secs| *secs > 0)
        .map(Duration::from_secs)
        .ok_or_else(|| ConfigError::InvalidTimeout {
            value: value.to_string(),
        })
}

fn non_empty_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}
