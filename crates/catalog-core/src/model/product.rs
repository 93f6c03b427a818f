// ── Product domain type ──

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Keyed;

/// A catalog product as the client sees it.
///
/// `date_revision` is expected to fall exactly one calendar year after
/// `date_release`; the edit form enforces that, the store does not.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    /// Externally assigned, unique across the collection.
    pub id: String,
    pub name: String,
    pub description: String,
    /// Logo URL or reference.
    pub logo: String,
    pub date_release: DateTime<Utc>,
    pub date_revision: DateTime<Utc>,
}

impl Keyed for Product {
    type Key = String;

    fn key(&self) -> &String {
        &self.id
    }
}
