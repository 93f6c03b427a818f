// ── Use-case façade ──
//
// Thin, UI-facing operations over a `ProductRepository`.

use std::sync::Arc;

use tracing::debug;

use crate::error::CoreError;
use crate::model::Product;
use crate::notification::NotificationBus;
use crate::repository::ProductRepository;
use crate::store::Snapshot;

pub const DELETE_SUCCESS: &str = "Product deleted successfully";
pub const DELETE_FAILURE: &str = "Error deleting the product";

/// Listing and mutation entry points for product screens.
pub struct ProductUseCases<R: ProductRepository> {
    repo: Arc<R>,
}

impl<R: ProductRepository> Clone for ProductUseCases<R> {
    fn clone(&self) -> Self {
        Self {
            repo: Arc::clone(&self.repo),
        }
    }
}

impl<R: ProductRepository> ProductUseCases<R> {
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }

    pub fn repository(&self) -> &Arc<R> {
        &self.repo
    }

    /// Cached products if the cache is populated, otherwise a fresh fetch.
    pub async fn get_products(&self) -> Result<Snapshot<Product>, CoreError> {
        let cached = self.repo.snapshot();
        if cached.is_empty() {
            self.repo.fetch_all().await
        } else {
            debug!(count = cached.len(), "serving products from cache");
            Ok(cached)
        }
    }

    /// Always go to the service, replacing the cache.
    pub async fn refresh_products(&self) -> Result<Snapshot<Product>, CoreError> {
        self.repo.fetch_all().await
    }

    pub async fn get_product(&self, id: &str) -> Result<Option<Arc<Product>>, CoreError> {
        self.repo.get_by_id(id).await
    }

    pub async fn create_product(&self, product: Product) -> Result<Arc<Product>, CoreError> {
        self.repo.create(product).await
    }

    pub async fn update_product(&self, product: Product) -> Result<Arc<Product>, CoreError> {
        self.repo.update(product).await
    }

    pub async fn delete_product(&self, id: &str) -> Result<(), CoreError> {
        self.repo.delete(id).await
    }

    pub async fn verify_product_id(&self, id: &str) -> Result<bool, CoreError> {
        self.repo.verify_exists(id).await
    }

    /// Delete and tell the user how it went.
    pub async fn delete_and_notify(
        &self,
        id: &str,
        notifications: &NotificationBus,
    ) -> Result<(), CoreError> {
        match self.delete_product(id).await {
            Ok(()) => {
                notifications.success(DELETE_SUCCESS);
                Ok(())
            }
            Err(e) => {
                notifications.error(DELETE_FAILURE);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::model::Severity;
    use crate::store::ProductStore;
    use crate::testing::{FakeGateway, api_error, dto, product};

    fn use_cases() -> ProductUseCases<ProductStore<FakeGateway>> {
        ProductUseCases::new(Arc::new(ProductStore::new(FakeGateway::default())))
    }

    #[tokio::test]
    async fn get_products_fetches_only_when_cache_is_empty() {
        let uc = use_cases();
        let gateway = uc.repository().gateway();
        gateway.push_list(Ok(vec![dto("a", "A")]));

        assert_eq!(uc.get_products().await.unwrap().len(), 1);
        assert_eq!(uc.get_products().await.unwrap().len(), 1);
        assert_eq!(gateway.calls(), ["list"]);

        uc.refresh_products().await.unwrap();
        assert_eq!(gateway.calls(), ["list", "list"]);
        assert!(uc.get_products().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_service_is_refetched_each_time() {
        let uc = use_cases();
        uc.get_products().await.unwrap();
        uc.get_products().await.unwrap();
        assert_eq!(uc.repository().gateway().calls().len(), 2);
    }

    #[tokio::test]
    async fn mutations_pass_through() {
        let uc = use_cases();
        uc.create_product(product("1", "One")).await.unwrap();
        uc.create_product(product("2", "Two")).await.unwrap();
        uc.update_product(product("1", "Uno")).await.unwrap();

        let snap = uc.get_products().await.unwrap();
        let names: Vec<&str> = snap.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Uno", "Two"]);
        assert_eq!(uc.get_product("2").await.unwrap().unwrap().name, "Two");

        uc.delete_product("1").await.unwrap();
        assert!(uc.get_product("1").await.unwrap().is_none());
        assert!(!uc.verify_product_id("1").await.unwrap());
    }

    #[tokio::test(start_paused = true)]
    async fn delete_and_notify_reports_both_outcomes() {
        let uc = use_cases();
        let bus = NotificationBus::default();
        uc.create_product(product("1", "One")).await.unwrap();

        uc.delete_and_notify("1", &bus).await.unwrap();
        uc.repository().gateway().push_delete(Err(api_error(500)));
        assert!(uc.delete_and_notify("2", &bus).await.is_err());

        let snap = bus.snapshot();
        assert_eq!(snap[0].message, DELETE_SUCCESS);
        assert_eq!(snap[0].severity, Severity::Success);
        assert_eq!(snap[1].message, DELETE_FAILURE);
        assert_eq!(snap[1].severity, Severity::Error);
    }
}
