// catalog-api: Async HTTP client for the product catalog REST service.

pub mod client;
pub mod error;
pub mod models;
pub mod transport;

pub use client::ProductClient;
pub use error::Error;
pub use models::{Envelope, ProductDto};
pub use transport::{TlsMode, TransportConfig};
