// Product service HTTP client
//
// Wraps `reqwest::Client` with URL construction under the collection base
// path and uniform response handling. Envelope unwrapping is left to the
// caller so that both wire shapes stay visible to the store.

use serde::Serialize;
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::error::Error;
use crate::models::{Envelope, ProductDto};
use crate::transport::TransportConfig;

// ── Error response shape ─────────────────────────────────────────────

#[derive(serde::Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    message: Option<String>,
}

// ── Client ───────────────────────────────────────────────────────────

/// Async client for the product collection endpoint.
///
/// `base_url` points at the collection itself (for example
/// `http://localhost:3002/bp/products`); item and verification routes are
/// derived from it.
pub struct ProductClient {
    http: reqwest::Client,
    base_url: Url,
}

impl ProductClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build from a base URL and a transport config.
    pub fn new(base_url: &str, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Self::from_reqwest(base_url, http)
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn from_reqwest(base_url: &str, http: reqwest::Client) -> Result<Self, Error> {
        let base_url = Self::normalize_base_url(base_url)?;
        Ok(Self { http, base_url })
    }

    /// Parse the base URL and reject forms that cannot carry a path.
    fn normalize_base_url(raw: &str) -> Result<Url, Error> {
        let url = Url::parse(raw)?;
        if url.cannot_be_a_base() {
            return Err(Error::InvalidUrl(url::ParseError::RelativeUrlWithCannotBeABaseBase));
        }
        Ok(url)
    }

    /// The collection URL this client talks to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    // ── URL builder ──────────────────────────────────────────────────

    /// Append percent-encoded path segments to the collection URL.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `normalize_base_url` guarantees a hierarchical URL.
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    // ── Endpoints ────────────────────────────────────────────────────

    /// List every product.
    ///
    /// `GET {base}`
    pub async fn list_products(&self) -> Result<Envelope<Vec<ProductDto>>, Error> {
        self.get(self.endpoint(&[])).await
    }

    /// Create a product.
    ///
    /// `POST {base}`
    pub async fn create_product(&self, product: &ProductDto) -> Result<Envelope<ProductDto>, Error> {
        self.post(self.endpoint(&[]), product).await
    }

    /// Replace the product stored under `id`.
    ///
    /// `PUT {base}/{id}`
    pub async fn update_product(
        &self,
        id: &str,
        product: &ProductDto,
    ) -> Result<Envelope<ProductDto>, Error> {
        self.put(self.endpoint(&[id]), product).await
    }

    /// Delete a product.
    ///
    /// `DELETE {base}/{id}`
    pub async fn delete_product(&self, id: &str) -> Result<(), Error> {
        self.delete(self.endpoint(&[id])).await
    }

    /// Ask the service whether an id is already taken.
    ///
    /// `GET {base}/verification/{id}`
    pub async fn verify_id(&self, id: &str) -> Result<bool, Error> {
        self.get(self.endpoint(&["verification", id])).await
    }

    // ── HTTP verbs ───────────────────────────────────────────────────

    async fn get<T: DeserializeOwned>(&self, url: Url) -> Result<T, Error> {
        debug!("GET {url}");

        let resp = self.http.get(url).send().await?;
        self.handle_response(resp).await
    }

    async fn post<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("POST {url}");

        let resp = self.http.post(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    async fn put<T: DeserializeOwned, B: Serialize + Sync>(
        &self,
        url: Url,
        body: &B,
    ) -> Result<T, Error> {
        debug!("PUT {url}");

        let resp = self.http.put(url).json(body).send().await?;
        self.handle_response(resp).await
    }

    async fn delete(&self, url: Url) -> Result<(), Error> {
        debug!("DELETE {url}");

        let resp = self.http.delete(url).send().await?;
        self.handle_empty(resp).await
    }

    // ── Response handling ────────────────────────────────────────────

    async fn handle_response<T: DeserializeOwned>(
        &self,
        resp: reqwest::Response,
    ) -> Result<T, Error> {
        let status = resp.status();
        if status.is_success() {
            let body = resp.text().await?;
            serde_json::from_str(&body).map_err(|e| {
                let preview: String = body.chars().take(200).collect();
                Error::Deserialization {
                    message: format!("{e} (body preview: {preview:?})"),
                    body,
                }
            })
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn handle_empty(&self, resp: reqwest::Response) -> Result<(), Error> {
        let status = resp.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(self.parse_error(status, resp).await)
        }
    }

    async fn parse_error(&self, status: reqwest::StatusCode, resp: reqwest::Response) -> Error {
        let raw = resp.text().await.unwrap_or_default();

        let message = match serde_json::from_str::<ErrorResponse>(&raw) {
            Ok(ErrorResponse { message: Some(msg) }) => msg,
            _ if raw.is_empty() => status.to_string(),
            Ok(_) => status.to_string(),
            Err(_) => raw,
        };

        Error::Api {
            status: status.as_u16(),
            message,
        }
    }
}
