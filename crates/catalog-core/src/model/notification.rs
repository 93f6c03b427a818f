// ── User-facing notification types ──

use std::time::Duration;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use super::Keyed;

/// Process-unique, monotonically increasing notification id.
pub type NotificationId = u64;

#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Severity {
    Success,
    Error,
    Warning,
    Info,
}

/// A transient message queued for display.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub id: NotificationId,
    pub message: String,
    pub severity: Severity,
    /// `None` means the entry stays until dismissed.
    pub ttl: Option<Duration>,
}

impl Keyed for Notification {
    type Key = NotificationId;

    fn key(&self) -> &NotificationId {
        &self.id
    }
}
