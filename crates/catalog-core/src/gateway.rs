// ── Remote gateway seam ──
//
// The store talks to the product service only through this trait so tests
// (and alternative transports) can stand in for the HTTP client.

use std::future::Future;

use catalog_api::{Envelope, ProductClient, ProductDto};

/// Network operations the store needs from the product service.
///
/// Each call yields exactly one value or one error. Timeouts are the
/// implementation's concern.
pub trait ProductGateway: Send + Sync {
    fn list(
        &self,
    ) -> impl Future<Output = Result<Envelope<Vec<ProductDto>>, catalog_api::Error>> + Send;

    fn create(
        &self,
        product: &ProductDto,
    ) -> impl Future<Output = Result<Envelope<ProductDto>, catalog_api::Error>> + Send;

    fn update(
        &self,
        id: &str,
        product: &ProductDto,
    ) -> impl Future<Output = Result<Envelope<ProductDto>, catalog_api::Error>> + Send;

    fn delete(&self, id: &str) -> impl Future<Output = Result<(), catalog_api::Error>> + Send;

    fn exists_by_id(
        &self,
        id: &str,
    ) -> impl Future<Output = Result<bool, catalog_api::Error>> + Send;
}

impl ProductGateway for ProductClient {
    async fn list(&self) -> Result<Envelope<Vec<ProductDto>>, catalog_api::Error> {
        self.list_products().await
    }

    async fn create(&self, product: &ProductDto) -> Result<Envelope<ProductDto>, catalog_api::Error> {
        self.create_product(product).await
    }

    async fn update(
        &self,
        id: &str,
        product: &ProductDto,
    ) -> Result<Envelope<ProductDto>, catalog_api::Error> {
        self.update_product(id, product).await
    }

    async fn delete(&self, id: &str) -> Result<(), catalog_api::Error> {
        self.delete_product(id).await
    }

    async fn exists_by_id(&self, id: &str) -> Result<bool, catalog_api::Error> {
        self.verify_id(id).await
    }
}
