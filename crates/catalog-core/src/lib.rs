// catalog-core: Reactive product store between catalog-api and consumers (CLI/UI).

pub mod config;
pub mod convert;
pub mod error;
pub mod form;
pub mod gateway;
pub mod model;
pub mod notification;
pub mod repository;
pub mod store;
pub mod stream;
pub mod use_cases;
pub mod validation;

#[cfg(test)]
pub(crate) mod testing;

// ── Primary re-exports ──────────────────────────────────────────────
pub use config::{NotificationDefaults, StoreConfig, TlsVerification};
pub use error::CoreError;
pub use form::{Field, FormErrors, FormMode, FormSession, ProductForm, one_year_later};
pub use gateway::ProductGateway;
pub use notification::NotificationBus;
pub use repository::ProductRepository;
pub use store::{ProductStore, Snapshot};
pub use stream::{EntityStream, Pagination, ProductFilter};
pub use use_cases::ProductUseCases;
pub use validation::{
    DebouncedValidator, ExistenceCheck, FieldError, Superseded, ValidationState, ValidationStatus,
};

// Re-export model types at the crate root for ergonomics.
pub use model::{Notification, NotificationId, Product, Severity};
