//! Shared configuration for catalog tools.
//!
//! TOML profiles merged with `CATALOG_*` environment variables, and
//! translation to `catalog_core::StoreConfig`. Core never reads files; it
//! receives a pre-built `StoreConfig` from here.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use directories::ProjectDirs;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use catalog_core::config::DEFAULT_API_URL;
use catalog_core::{NotificationDefaults, StoreConfig, TlsVerification};

/// Name used when neither the caller nor the file picks a profile.
pub const DEFAULT_PROFILE: &str = "default";

// ── Error ───────────────────────────────────────────────────────────

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid {field}: {reason}")]
    Validation { field: String, reason: String },

    #[error("profile '{name}' not found (available: {available})")]
    ProfileNotFound { name: String, available: String },

    #[error("failed to serialize config: {0}")]
    Serialization(#[from] toml::ser::Error),

    #[error("config loading failed: {0}")]
    Figment(Box<figment::Error>),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<figment::Error> for ConfigError {
    fn from(err: figment::Error) -> Self {
        Self::Figment(Box::new(err))
    }
}

// ── TOML config structs ─────────────────────────────────────────────

/// Top-level TOML configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Config {
    /// Profile used when none is requested.
    pub default_profile: Option<String>,

    /// Global defaults.
    #[serde(default)]
    pub defaults: Defaults,

    /// Notification lifetimes in milliseconds.
    #[serde(default)]
    pub notifications: NotificationTtls,

    /// Named service profiles.
    #[serde(default)]
    pub profiles: BTreeMap<String, Profile>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_profile: Some(DEFAULT_PROFILE.into()),
            defaults: Defaults::default(),
            notifications: NotificationTtls::default(),
            profiles: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Defaults {
    #[serde(default = "default_output")]
    pub output: String,

    #[serde(default = "default_color")]
    pub color: String,

    #[serde(default)]
    pub insecure: bool,

    /// Request timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Quiet window before the identifier check fires.
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
}

impl Default for Defaults {
    fn default() -> Self {
        Self {
            output: default_output(),
            color: default_color(),
            insecure: false,
            timeout: default_timeout(),
            debounce_ms: default_debounce_ms(),
        }
    }
}

fn default_output() -> String {
    "table".into()
}
fn default_color() -> String {
    "auto".into()
}
fn default_timeout() -> u64 {
    30
}
fn default_debounce_ms() -> u64 {
    500
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct NotificationTtls {
    #[serde(default = "default_info_ms")]
    pub info_ms: u64,
    #[serde(default = "default_success_ms")]
    pub success_ms: u64,
    #[serde(default = "default_warning_ms")]
    pub warning_ms: u64,
    #[serde(default = "default_error_ms")]
    pub error_ms: u64,
}

impl Default for NotificationTtls {
    fn default() -> Self {
        Self {
            info_ms: default_info_ms(),
            success_ms: default_success_ms(),
            warning_ms: default_warning_ms(),
            error_ms: default_error_ms(),
        }
    }
}

fn default_info_ms() -> u64 {
    3000
}
fn default_success_ms() -> u64 {
    3000
}
fn default_warning_ms() -> u64 {
    3000
}
fn default_error_ms() -> u64 {
    5000
}

impl From<&NotificationTtls> for NotificationDefaults {
    fn from(ttls: &NotificationTtls) -> Self {
        Self {
            info_ttl: Duration::from_millis(ttls.info_ms),
            success_ttl: Duration::from_millis(ttls.success_ms),
            warning_ttl: Duration::from_millis(ttls.warning_ms),
            error_ttl: Duration::from_millis(ttls.error_ms),
        }
    }
}

/// A named product service.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct Profile {
    /// Collection endpoint (e.g., "http://localhost:3002/bp/products").
    pub api_url: String,

    /// Path to custom CA certificate.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ca_cert: Option<PathBuf>,

    /// Override insecure TLS setting.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub insecure: Option<bool>,

    /// Override timeout.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout: Option<u64>,
}

impl Default for Profile {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.into(),
            ca_cert: None,
            insecure: None,
            timeout: None,
        }
    }
}

// ── Config file path ────────────────────────────────────────────────

/// Resolve the config file path via XDG / platform conventions.
pub fn config_path() -> PathBuf {
    ProjectDirs::from("com", "catalog", "catalog").map_or_else(
        || {
            let mut p = dirs_fallback();
            p.push("config.toml");
            p
        },
        |dirs| dirs.config_dir().join("config.toml"),
    )
}

fn dirs_fallback() -> PathBuf {
    let mut p = PathBuf::from(std::env::var("HOME").unwrap_or_else(|_| ".".into()));
    p.push(".config");
    p.push("catalog");
    p
}

// ── Config loading ──────────────────────────────────────────────────

/// Load the full Config from the canonical file + environment.
pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&config_path())
}

/// Load from a specific file + environment. A missing file is not an error.
///
/// Environment keys nest on a double underscore, e.g.
/// `CATALOG_DEFAULTS__TIMEOUT=10`.
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    let figment = Figment::new()
        .merge(Serialized::defaults(Config::default()))
        .merge(Toml::file(path))
        .merge(Env::prefixed("CATALOG_").split("__"));

    let config: Config = figment.extract()?;
    Ok(config)
}

/// Load config, returning a default if the file doesn't exist or is invalid.
pub fn load_config_or_default() -> Config {
    load_config().unwrap_or_default()
}

// ── Config saving ───────────────────────────────────────────────────

/// Serialize config to TOML and write to the canonical config path.
pub fn save_config(cfg: &Config) -> Result<PathBuf, ConfigError> {
    let path = config_path();
    save_config_to(&path, cfg)?;
    Ok(path)
}

/// Serialize config to TOML and write it to `path`, creating parents.
pub fn save_config_to(path: &Path, cfg: &Config) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let toml_str = toml::to_string_pretty(cfg)?;
    std::fs::write(path, toml_str)?;
    Ok(())
}

// ── Profile resolution ──────────────────────────────────────────────

impl Config {
    /// Comma-separated profile names, for error messages.
    pub fn available_profiles(&self) -> String {
        if self.profiles.is_empty() {
            return "(none)".into();
        }
        self.profiles.keys().cloned().collect::<Vec<_>>().join(", ")
    }

    /// Pick the profile to use.
    ///
    /// An explicitly requested name must exist. Otherwise the default
    /// profile is used, falling back to the built-in local service when the
    /// file does not define it.
    pub fn resolve_profile(
        &self,
        requested: Option<&str>,
    ) -> Result<(String, Profile), ConfigError> {
        if let Some(name) = requested {
            return self
                .profiles
                .get(name)
                .map(|p| (name.to_owned(), p.clone()))
                .ok_or_else(|| ConfigError::ProfileNotFound {
                    name: name.to_owned(),
                    available: self.available_profiles(),
                });
        }

        let name = self
            .default_profile
            .clone()
            .unwrap_or_else(|| DEFAULT_PROFILE.into());
        let profile = self.profiles.get(&name).cloned().unwrap_or_default();
        Ok((name, profile))
    }

    /// Build a `StoreConfig` from a profile alone, without CLI flag overrides.
    pub fn to_store_config(&self, profile: &Profile) -> Result<StoreConfig, ConfigError> {
        let api_url = parse_api_url(&profile.api_url)?;

        let tls = if profile.insecure.unwrap_or(self.defaults.insecure) {
            TlsVerification::DangerAcceptInvalid
        } else if let Some(ref ca_path) = profile.ca_cert {
            TlsVerification::CustomCa(ca_path.clone())
        } else {
            TlsVerification::SystemDefaults
        };

        let timeout = profile.timeout.unwrap_or(self.defaults.timeout);
        if timeout == 0 {
            return Err(ConfigError::Validation {
                field: "timeout".into(),
                reason: "must be at least 1 second".into(),
            });
        }

        Ok(StoreConfig {
            api_url,
            tls,
            timeout: Duration::from_secs(timeout),
            validation_debounce: Duration::from_millis(self.defaults.debounce_ms),
            notifications: NotificationDefaults::from(&self.notifications),
        })
    }
}

/// Parse and check a collection URL. Only `http` and `https` are accepted.
pub fn parse_api_url(raw: &str) -> Result<url::Url, ConfigError> {
    let url: url::Url = raw.parse().map_err(|e| ConfigError::Validation {
        field: "api_url".into(),
        reason: format!("invalid URL '{raw}': {e}"),
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::Validation {
            field: "api_url".into(),
            reason: format!("unsupported scheme '{other}', expected http or https"),
        }),
    }
}
