// Test doubles shared by the unit tests in this crate.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;

use catalog_api::{Envelope, ProductDto};
use chrono::{TimeZone, Utc};

use crate::error::CoreError;
use crate::gateway::ProductGateway;
use crate::model::Product;
use crate::validation::ExistenceCheck;

type ApiResult<T> = Result<T, catalog_api::Error>;

/// A scripted `ProductGateway`.
///
/// Each operation pops from its own response queue; an empty queue falls
/// back to a benign default (empty list, echo the body, `Ok(())`, `false`).
#[derive(Default)]
pub(crate) struct FakeGateway {
    pub list: Mutex<VecDeque<ApiResult<Envelope<Vec<ProductDto>>>>>,
    pub create: Mutex<VecDeque<ApiResult<Envelope<ProductDto>>>>,
    pub update: Mutex<VecDeque<ApiResult<Envelope<ProductDto>>>>,
    pub delete: Mutex<VecDeque<ApiResult<()>>>,
    pub exists: Mutex<VecDeque<ApiResult<bool>>>,
    pub latency: Option<Duration>,
    pub calls: Mutex<Vec<String>>,
}

impl FakeGateway {
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            latency: Some(latency),
            ..Self::default()
        }
    }

    pub fn push_list(&self, result: ApiResult<Vec<ProductDto>>) {
        self.list
            .lock()
            .unwrap()
            .push_back(result.map(Envelope::Bare));
    }

    pub fn push_create(&self, result: ApiResult<ProductDto>) {
        self.create
            .lock()
            .unwrap()
            .push_back(result.map(|data| Envelope::Wrapped { data }));
    }

    pub fn push_update(&self, result: ApiResult<ProductDto>) {
        self.update
            .lock()
            .unwrap()
            .push_back(result.map(Envelope::Bare));
    }

    pub fn push_delete(&self, result: ApiResult<()>) {
        self.delete.lock().unwrap().push_back(result);
    }

    pub fn push_exists(&self, result: ApiResult<bool>) {
        self.exists.lock().unwrap().push_back(result);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    async fn enter(&self, call: String) {
        self.calls.lock().unwrap().push(call);
        if let Some(latency) = self.latency {
            tokio::time::sleep(latency).await;
        }
    }
}

impl ProductGateway for FakeGateway {
    async fn list(&self) -> ApiResult<Envelope<Vec<ProductDto>>> {
        self.enter("list".into()).await;
        let next = self.list.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(Envelope::Bare(Vec::new())))
    }

    async fn create(&self, product: &ProductDto) -> ApiResult<Envelope<ProductDto>> {
        self.enter(format!("create:{}", product.id.as_deref().unwrap_or(""))).await;
        let next = self.create.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(Envelope::Bare(product.clone())))
    }

    async fn update(&self, id: &str, product: &ProductDto) -> ApiResult<Envelope<ProductDto>> {
        self.enter(format!("update:{id}")).await;
        let next = self.update.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(Envelope::Bare(product.clone())))
    }

    async fn delete(&self, id: &str) -> ApiResult<()> {
        self.enter(format!("delete:{id}")).await;
        let next = self.delete.lock().unwrap().pop_front();
        next.unwrap_or(Ok(()))
    }

    async fn exists_by_id(&self, id: &str) -> ApiResult<bool> {
        self.enter(format!("exists:{id}")).await;
        let next = self.exists.lock().unwrap().pop_front();
        next.unwrap_or(Ok(false))
    }
}

/// A scripted existence check: ids in `taken` exist, `fail` makes every
/// call error out.
#[derive(Default)]
pub(crate) struct FakeCheck {
    pub taken: Vec<String>,
    pub fail: bool,
    pub latency: Duration,
    pub calls: Mutex<Vec<String>>,
}

impl FakeCheck {
    pub fn taken(ids: &[&str]) -> Self {
        Self {
            taken: ids.iter().map(|s| (*s).to_owned()).collect(),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

impl ExistenceCheck for FakeCheck {
    async fn exists(&self, id: &str) -> Result<bool, CoreError> {
        self.calls.lock().unwrap().push(id.to_owned());
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        if self.fail {
            return Err(CoreError::ConnectionFailed {
                url: "http://test".into(),
                reason: "unreachable".into(),
            });
        }
        Ok(self.taken.iter().any(|t| t == id))
    }
}

pub(crate) fn dto(id: &str, name: &str) -> ProductDto {
    ProductDto {
        id: Some(id.into()),
        name: Some(name.into()),
        description: Some(format!("{name} description")),
        logo: Some(format!("https://example.com/{id}.png")),
        date_release: Some("2025-01-01T00:00:00.000Z".into()),
        date_revision: Some("2026-01-01T00:00:00.000Z".into()),
    }
}

pub(crate) fn product(id: &str, name: &str) -> Product {
    Product {
        id: id.into(),
        name: name.into(),
        description: format!("{name} description"),
        logo: format!("https://example.com/{id}.png"),
        date_release: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        date_revision: Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap(),
    }
}

pub(crate) fn api_error(status: u16) -> catalog_api::Error {
    catalog_api::Error::Api {
        status,
        message: format!("status {status}"),
    }
}
