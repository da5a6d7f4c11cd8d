//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/ph/ph.toml`
//! 3. Environment variables: `PH_*` prefix (`PH_ENDPOINT`, `PH_API_TOKEN`, ...)

use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use std::time::Duration;

use config::{Config, ConfigError, Environment};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

use crate::application::ApplicationError;

/// Backend host used when nothing else is configured.
pub const DEFAULT_ENDPOINT: &str = "app.dev.posthog.dev";

/// How a missing token is acquired interactively.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoginMethod {
    /// Device flow: confirm in the browser, poll until authenticated.
    #[default]
    Browser,
    /// Print the web URL and read a pasted token from stdin.
    Paste,
}

impl FromStr for LoginMethod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "browser" => Ok(Self::Browser),
            "paste" => Ok(Self::Paste),
            other => Err(format!("unknown login method: {other} (expected browser|paste)")),
        }
    }
}

impl fmt::Display for LoginMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Browser => write!(f, "browser"),
            Self::Paste => write!(f, "paste"),
        }
    }
}

/// Raw settings for intermediate parsing (all optional, to detect "not specified").
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct RawSettings {
    pub endpoint: Option<String>,
    pub api_protocol_web: Option<String>,
    pub api_port_web: Option<u16>,
    pub api_token: Option<String>,
    pub log: Option<String>,
    pub credentials_file: Option<PathBuf>,
    pub login_method: Option<LoginMethod>,
    pub request_timeout_secs: Option<u64>,
}

/// Unified configuration for ph.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Backend host; also the key of the session record in the credential file
    pub endpoint: String,
    /// URL scheme for API requests (default: https)
    pub api_protocol_web: String,
    /// Optional port appended to the endpoint
    pub api_port_web: Option<u16>,
    /// Token override; bypasses the credential file when set
    #[serde(skip_serializing)]
    pub api_token: Option<String>,
    /// Log filter directive (e.g. "debug", "ph=trace")
    pub log: Option<String>,
    /// Credential file (default: ~/.posthog/credentials.json)
    pub credentials_file: PathBuf,
    /// Interactive token acquisition method
    pub login_method: LoginMethod,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint: DEFAULT_ENDPOINT.to_string(),
            api_protocol_web: "https".to_string(),
            api_port_web: None,
            api_token: None,
            log: None,
            credentials_file: default_credentials_file(),
            login_method: LoginMethod::default(),
            request_timeout_secs: 30,
        }
    }
}

/// Get the default credential file (~/.posthog/credentials.json).
fn default_credentials_file() -> PathBuf {
    directories::BaseDirs::new()
        .map(|dirs| dirs.home_dir().join(".posthog").join("credentials.json"))
        .unwrap_or_else(|| PathBuf::from("~/.posthog/credentials.json"))
}

/// Get the XDG config directory for ph.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "ph").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("ph.toml"))
}

/// Load a TOML file into RawSettings for manual merging.
fn load_raw_settings(path: &Path) -> Result<RawSettings, ApplicationError> {
    let content = std::fs::read_to_string(path).map_err(|e| ApplicationError::Config {
        message: format!("read {}: {}", path.display(), e),
    })?;
    toml::from_str(&content).map_err(|e| ApplicationError::Config {
        message: format!("parse {}: {}", path.display(), e),
    })
}

fn config_err(e: ConfigError) -> ApplicationError {
    ApplicationError::Config {
        message: e.to_string(),
    }
}

impl Settings {
    /// Build the full URL for an API path: `{protocol}://{endpoint}[:{port}]/{path}`.
    pub fn api_url(&self, path: &str) -> String {
        let port = self
            .api_port_web
            .map(|p| format!(":{p}"))
            .unwrap_or_default();
        format!(
            "{}://{}{}/{}",
            self.api_protocol_web,
            self.endpoint,
            port,
            path.trim_start_matches('/')
        )
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Expand `~` and `$VAR` in the credential file path.
    fn expand_paths(&mut self) {
        let raw = self.credentials_file.to_string_lossy().to_string();
        if let Ok(expanded) = shellexpand::full(&raw) {
            self.credentials_file = PathBuf::from(expanded.as_ref());
        }
    }

    /// Overlay wins where it specifies a value.
    fn merge_with(&self, overlay: &RawSettings) -> Self {
        Self {
            endpoint: overlay
                .endpoint
                .clone()
                .unwrap_or_else(|| self.endpoint.clone()),
            api_protocol_web: overlay
                .api_protocol_web
                .clone()
                .unwrap_or_else(|| self.api_protocol_web.clone()),
            api_port_web: overlay.api_port_web.or(self.api_port_web),
            api_token: overlay.api_token.clone().or_else(|| self.api_token.clone()),
            log: overlay.log.clone().or_else(|| self.log.clone()),
            credentials_file: overlay
                .credentials_file
                .clone()
                .unwrap_or_else(|| self.credentials_file.clone()),
            login_method: overlay.login_method.unwrap_or(self.login_method),
            request_timeout_secs: overlay
                .request_timeout_secs
                .unwrap_or(self.request_timeout_secs),
        }
    }

    /// Load settings with layered precedence.
    ///
    /// # Precedence (lowest to highest)
    /// 1. Compiled defaults
    /// 2. Global config: `$XDG_CONFIG_HOME/ph/ph.toml`
    /// 3. Environment variables: `PH_*` prefix
    pub fn load() -> Result<Self, ApplicationError> {
        Self::load_from(global_config_path().as_deref(), None)
    }

    /// Load settings from an explicit config file and environment source.
    ///
    /// `env` replaces the process environment when given (used by tests).
    pub fn load_from(
        config_file: Option<&Path>,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ApplicationError> {
        // 1. Start with defaults
        let mut current = Self::default();

        // 2. Global config file
        if let Some(path) = config_file {
            if path.exists() {
                let raw = load_raw_settings(path)?;
                current = current.merge_with(&raw);
            }
        }

        // 3. Environment variables (explicit override)
        current = Self::apply_env_overrides(current, env)?;

        current.expand_paths();

        Ok(current)
    }

    /// Apply PH_* environment variables as explicit overrides.
    ///
    /// Empty values are ignored, so `PH_API_PORT_WEB=` means "no port".
    fn apply_env_overrides(
        settings: Self,
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ApplicationError> {
        let config = Config::builder()
            .add_source(Environment::with_prefix("PH").source(env))
            .build()
            .map_err(config_err)?;

        let value = |key: &str| -> Option<String> {
            config
                .get_string(key)
                .ok()
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_port_web = value("api_port_web")
            .map(|v| {
                v.parse::<u16>().map_err(|e| ApplicationError::Config {
                    message: format!("PH_API_PORT_WEB={v}: {e}"),
                })
            })
            .transpose()?;
        let login_method = value("login_method")
            .map(|v| {
                v.parse::<LoginMethod>()
                    .map_err(|message| ApplicationError::Config { message })
            })
            .transpose()?;
        let request_timeout_secs = value("request_timeout_secs")
            .map(|v| {
                v.parse::<u64>().map_err(|e| ApplicationError::Config {
                    message: format!("PH_REQUEST_TIMEOUT_SECS={v}: {e}"),
                })
            })
            .transpose()?;

        let overlay = RawSettings {
            endpoint: value("endpoint"),
            api_protocol_web: value("api_protocol_web"),
            api_port_web,
            api_token: value("api_token"),
            log: value("log"),
            credentials_file: value("credentials_file").map(PathBuf::from),
            login_method,
            request_timeout_secs,
        };

        Ok(settings.merge_with(&overlay))
    }

    /// Render the effective settings as TOML (token omitted).
    pub fn to_toml(&self) -> Result<String, ApplicationError> {
        toml::to_string_pretty(self).map_err(|e| ApplicationError::Config {
            message: format!("serialize settings: {e}"),
        })
    }
}
