// ── Core error types ──
//
// User-facing errors from catalog-core. Consumers never see raw HTTP
// status handling or JSON parse failures directly: the
// `From<catalog_api::Error>` impl translates transport-layer errors into
// domain-appropriate variants.

use thiserror::Error;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot connect to product service at {url}: {reason}")]
    ConnectionFailed { url: String, reason: String },

    #[error("Product service timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Entity not found: {entity_type} with id {identifier}")]
    NotFound {
        entity_type: String,
        identifier: String,
    },

    #[error("Malformed response from product service: {message}")]
    MalformedResponse { message: String },

    // ── Operation errors ─────────────────────────────────────────────
    /// The service refused the request (4xx).
    #[error("Request rejected by product service (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    // ── API errors (wrapped, not exposed raw) ────────────────────────
    #[error("API error: {message}")]
    Api {
        message: String,
        /// HTTP status code (if applicable).
        status: Option<u16>,
    },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Text suitable for a user-facing notification.
    pub fn user_message(&self) -> String {
        match self {
            Self::Rejected {
                status: 400,
                message,
            } => {
                if message.is_empty() {
                    "Bad request".into()
                } else {
                    message.clone()
                }
            }
            Self::Rejected { status: 404, .. } | Self::NotFound { .. } => {
                "Resource not found".into()
            }
            Self::ConnectionFailed { .. } => "Could not connect to the server".into(),
            Self::Timeout { .. } => "The server took too long to respond".into(),
            Self::Rejected { status, message }
            | Self::Api {
                status: Some(status),
                message,
            } => format!("Server error ({status}): {message}"),
            Self::ValidationFailed { message } => message.clone(),
            _ => "An unexpected error occurred".into(),
        }
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<catalog_api::Error> for CoreError {
    fn from(err: catalog_api::Error) -> Self {
        match err {
            catalog_api::Error::Transport(ref e) => {
                if e.is_timeout() {
                    CoreError::Timeout { timeout_secs: 0 }
                } else if e.is_connect() {
                    CoreError::ConnectionFailed {
                        url: e
                            .url()
                            .map_or_else(|| "<unknown>".into(), ToString::to_string),
                        reason: e.to_string(),
                    }
                } else {
                    CoreError::Api {
                        message: e.to_string(),
                        status: e.status().map(|s| s.as_u16()),
                    }
                }
            }
            catalog_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            catalog_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            catalog_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                url: String::new(),
                reason: format!("TLS error: {msg}"),
            },
            catalog_api::Error::Api { status, message } if (400..500).contains(&status) => {
                CoreError::Rejected { status, message }
            }
            catalog_api::Error::Api { status, message } => CoreError::Api {
                message,
                status: Some(status),
            },
            catalog_api::Error::Deserialization { message, body: _ } => {
                CoreError::MalformedResponse { message }
            }
        }
    }
}
