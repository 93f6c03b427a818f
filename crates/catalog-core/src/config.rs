// ── Runtime store configuration ──
//
// These types describe *how* to reach the product service and how the
// client-side timers behave. They never touch disk: the binary builds a
// `StoreConfig` (usually through `catalog-config`) and hands it in.

use std::time::Duration;

use catalog_api::{ProductClient, TlsMode, TransportConfig};
use url::Url;

use crate::error::CoreError;
use crate::model::Severity;

/// Collection endpoint used when nothing else is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:3002/bp/products";

/// TLS verification strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TlsVerification {
    /// System CA store (strict).
    #[default]
    SystemDefaults,
    /// Custom CA certificate file.
    CustomCa(std::path::PathBuf),
    /// Skip verification (self-signed development servers).
    DangerAcceptInvalid,
}

impl From<&TlsVerification> for TlsMode {
    fn from(tls: &TlsVerification) -> Self {
        match tls {
            TlsVerification::SystemDefaults => TlsMode::System,
            TlsVerification::CustomCa(path) => TlsMode::CustomCa(path.clone()),
            TlsVerification::DangerAcceptInvalid => TlsMode::DangerAcceptInvalid,
        }
    }
}

/// Default time-to-live per notification severity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationDefaults {
    pub info_ttl: Duration,
    pub success_ttl: Duration,
    pub warning_ttl: Duration,
    pub error_ttl: Duration,
}

impl NotificationDefaults {
    pub fn ttl_for(&self, severity: Severity) -> Duration {
        match severity {
            Severity::Info => self.info_ttl,
            Severity::Success => self.success_ttl,
            Severity::Warning => self.warning_ttl,
            Severity::Error => self.error_ttl,
        }
    }
}

impl Default for NotificationDefaults {
    fn default() -> Self {
        Self {
            info_ttl: Duration::from_millis(3000),
            success_ttl: Duration::from_millis(3000),
            warning_ttl: Duration::from_millis(3000),
            error_ttl: Duration::from_millis(5000),
        }
    }
}

/// Configuration for one product service.
///
/// Built by the CLI (or any other front end), passed to the store.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    /// Collection endpoint (e.g., `http://localhost:3002/bp/products`).
    pub api_url: Url,
    /// TLS verification strategy.
    pub tls: TlsVerification,
    /// Request timeout, enforced by the HTTP client.
    pub timeout: Duration,
    /// Quiet period before the identifier uniqueness check fires.
    pub validation_debounce: Duration,
    /// Notification lifetimes.
    pub notifications: NotificationDefaults,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.parse().expect("default API URL is valid"),
            tls: TlsVerification::default(),
            timeout: Duration::from_secs(30),
            validation_debounce: Duration::from_millis(500),
            notifications: NotificationDefaults::default(),
        }
    }
}

impl StoreConfig {
    /// Transport settings for the HTTP layer.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: TlsMode::from(&self.tls),
            ..TransportConfig::default()
        }
        .with_timeout(self.timeout)
    }

    /// Build the HTTP client for this configuration.
    pub fn build_client(&self) -> Result<ProductClient, CoreError> {
        Ok(ProductClient::new(self.api_url.as_str(), &self.transport())?)
    }
}
