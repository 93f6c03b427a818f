// ── Product store ──
//
// The authoritative client-side product cache. Every cache write happens
// right after its own network call resolves, in the same poll, so observers
// never see a finished call paired with a stale collection.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use catalog_api::{ProductClient, ProductDto};
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::collection::{EntityCollection, Snapshot};
use crate::config::StoreConfig;
use crate::error::CoreError;
use crate::gateway::ProductGateway;
use crate::model::Product;
use crate::repository::ProductRepository;
use crate::stream::EntityStream;

/// Reactive product cache in front of a [`ProductGateway`].
///
/// Cloning is not supported; share it behind an `Arc`.
pub struct ProductStore<G: ProductGateway> {
    gateway: G,
    products: EntityCollection<Product>,
    loading: watch::Sender<bool>,
    in_flight: AtomicUsize,
}

impl ProductStore<ProductClient> {
    /// Build a store talking HTTP to the configured service.
    pub fn from_config(config: &StoreConfig) -> Result<Self, CoreError> {
        Ok(Self::new(config.build_client()?))
    }
}

impl<G: ProductGateway> ProductStore<G> {
    pub fn new(gateway: G) -> Self {
        let (loading, _) = watch::channel(false);
        Self {
            gateway,
            products: EntityCollection::new(),
            loading,
            in_flight: AtomicUsize::new(0),
        }
    }

    /// The underlying gateway.
    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Number of cached products.
    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Mark one more fetch as outstanding. The flag stays raised until the
    /// last overlapping fetch settles.
    fn begin_loading(&self) -> LoadingGuard<'_, G> {
        self.loading.send_if_modified(|flag| {
            self.in_flight.fetch_add(1, Ordering::SeqCst);
            !std::mem::replace(flag, true)
        });
        LoadingGuard { store: self }
    }

    fn end_loading(&self) {
        self.loading.send_if_modified(|flag| {
            let remaining = self.in_flight.fetch_sub(1, Ordering::SeqCst) - 1;
            remaining == 0 && std::mem::replace(flag, false)
        });
    }
}

/// Clears the loading flag when the fetch settles, including on error and
/// when the future is dropped mid-flight.
struct LoadingGuard<'a, G: ProductGateway> {
    store: &'a ProductStore<G>,
}

impl<G: ProductGateway> Drop for LoadingGuard<'_, G> {
    fn drop(&mut self) {
        self.store.end_loading();
    }
}

/// Map a response record, insisting on an identifier so the cache
/// never holds an entry it cannot key.
fn keyed_record(dto: ProductDto, operation: &str) -> Result<Product, CoreError> {
    let product = Product::from(dto);
    if product.id.is_empty() {
        warn!(operation, "response record has no identifier");
        return Err(CoreError::MalformedResponse {
            message: format!("{operation} response is missing the product id"),
        });
    }
    Ok(product)
}

impl<G: ProductGateway> ProductRepository for ProductStore<G> {
    fn snapshot(&self) -> Snapshot<Product> {
        self.products.snapshot()
    }

    fn subscribe(&self) -> EntityStream<Product> {
        EntityStream::new(self.products.subscribe())
    }

    fn is_loading(&self) -> bool {
        *self.loading.borrow()
    }

    fn subscribe_loading(&self) -> watch::Receiver<bool> {
        self.loading.subscribe()
    }

    async fn fetch_all(&self) -> Result<Snapshot<Product>, CoreError> {
        let _loading = self.begin_loading();
        let response = self.gateway.list().await;

        let products = response?
            .into_inner()
            .into_iter()
            .map(|dto| keyed_record(dto, "fetch_all"))
            .collect::<Result<Vec<_>, _>>()?;
        let snapshot = self.products.replace_all(products);
        info!(count = snapshot.len(), "product cache refreshed");
        Ok(snapshot)
    }

    async fn create(&self, product: Product) -> Result<Arc<Product>, CoreError> {
        let wire = ProductDto::from(&product);
        let created = self.gateway.create(&wire).await?.into_inner();

        let created = self.products.append(keyed_record(created, "create")?);
        info!(id = %created.id, "product created");
        Ok(created)
    }

    async fn update(&self, product: Product) -> Result<Arc<Product>, CoreError> {
        let wire = ProductDto::from(&product);
        let updated = self.gateway.update(&product.id, &wire).await?.into_inner();

        let updated = Arc::new(keyed_record(updated, "update")?);
        if self.products.replace(Arc::clone(&updated)) {
            info!(id = %updated.id, "product updated");
        } else {
            debug!(id = %updated.id, "updated product is not cached, collection unchanged");
        }
        Ok(updated)
    }

    async fn delete(&self, id: &str) -> Result<(), CoreError> {
        self.gateway.delete(id).await?;

        let removed = self.products.remove(&id.to_owned()).is_some();
        info!(id, removed, "product deleted");
        Ok(())
    }

    async fn verify_exists(&self, id: &str) -> Result<bool, CoreError> {
        Ok(self.gateway.exists_by_id(id).await?)
    }

    async fn get_by_id(&self, id: &str) -> Result<Option<Arc<Product>>, CoreError> {
        Ok(self.products.get(&id.to_owned()))
    }
}
