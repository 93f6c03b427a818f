// ── Domain model ──
//
// Canonical client-side representations. Wire types live in `catalog-api`;
// `crate::convert` bridges the two.

pub mod notification;
pub mod product;

use std::fmt::Debug;
use std::hash::Hash;

// ── Re-exports ──────────────────────────────────────────────────────

pub use notification::{Notification, NotificationId, Severity};
pub use product::Product;

/// An entity with a stable identity inside a reactive collection.
pub trait Keyed {
    type Key: Clone + Eq + Hash + Debug + Send + Sync + 'static;

    fn key(&self) -> &Self::Key;
}
