// ── Product repository contract ──
//
// The operations UI code and use cases depend on. `ProductStore` is the
// production implementation; anything else (fakes, alternative caches) can
// slot in behind the same trait.

use std::future::Future;
use std::sync::Arc;

use tokio::sync::watch;

use crate::error::CoreError;
use crate::model::Product;
use crate::store::Snapshot;
use crate::stream::EntityStream;

/// A cached, observable product collection backed by a remote source.
pub trait ProductRepository: Send + Sync {
    // ── Observable state ─────────────────────────────────────────────

    /// Current cached collection.
    fn snapshot(&self) -> Snapshot<Product>;

    /// Subscribe to collection changes.
    fn subscribe(&self) -> EntityStream<Product>;

    /// `true` while a `fetch_all` request is outstanding.
    fn is_loading(&self) -> bool;

    /// Subscribe to loading-flag changes.
    fn subscribe_loading(&self) -> watch::Receiver<bool>;

    // ── Operations ───────────────────────────────────────────────────

    /// Fetch every product and replace the cache wholesale.
    fn fetch_all(&self) -> impl Future<Output = Result<Snapshot<Product>, CoreError>> + Send;

    /// Create remotely, then append to the cache.
    fn create(
        &self,
        product: Product,
    ) -> impl Future<Output = Result<Arc<Product>, CoreError>> + Send;

    /// Update remotely, then replace the cached entry with the same id.
    fn update(
        &self,
        product: Product,
    ) -> impl Future<Output = Result<Arc<Product>, CoreError>> + Send;

    /// Delete remotely, then drop the cached entry with the same id.
    fn delete(&self, id: &str) -> impl Future<Output = Result<(), CoreError>> + Send;

    /// Ask the remote source whether `id` is taken. Never touches the cache.
    fn verify_exists(&self, id: &str) -> impl Future<Output = Result<bool, CoreError>> + Send;

    /// Cache-only lookup.
    fn get_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<Option<Arc<Product>>, CoreError>> + Send;
}
