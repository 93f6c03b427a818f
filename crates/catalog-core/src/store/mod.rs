// ── Reactive data store ──
//
// Cached entity storage with push-based change notification.

mod collection;
mod product_store;

pub(crate) use collection::EntityCollection;
pub use collection::Snapshot;
pub use product_store::ProductStore;
