// Product service wire types
//
// Every field of a product record is optional on the wire: the service is
// inconsistent about field presence, and the core mapper fills defaults.
// Single-record and list responses may arrive bare or wrapped in a
// `{ "data": ... }` envelope.

use serde::{Deserialize, Serialize};

// ── Product ──────────────────────────────────────────────────────────

/// A product record as sent and received by the service.
///
/// Dates are ISO-8601 strings (`2025-01-01` or `2025-01-01T00:00:00.000Z`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductDto {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_release: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_revision: Option<String>,
}

// ── Response envelope ────────────────────────────────────────────────

/// A payload that may be returned directly or wrapped:
/// ```json
/// [ { "id": "1", ... } ]
/// { "data": [ { "id": "1", ... } ] }
/// ```
///
/// The wrapped form is tried first, so a bare record never swallows an
/// envelope.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(untagged)]
pub enum Envelope<T> {
    Wrapped { data: T },
    Bare(T),
}

impl<T> Envelope<T> {
    /// Strip the envelope, if any.
    pub fn into_inner(self) -> T {
        match self {
            Self::Wrapped { data } | Self::Bare(data) => data,
        }
    }
}
