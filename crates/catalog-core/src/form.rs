// ── Product edit form ──
//
// Field rules for creating and editing products, plus `FormSession`, which
// drives one form from first keystroke to a successful submit.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, IntoEnumIterator};
use tokio::sync::watch;
use tracing::{debug, info};

use crate::convert::{format_form_date, from_edit_form, parse_form_date, to_domain};
use crate::error::CoreError;
use crate::model::Product;
use crate::notification::NotificationBus;
use crate::repository::ProductRepository;
use crate::use_cases::ProductUseCases;
use crate::validation::{DebouncedValidator, FieldError, Superseded, ValidationState};

pub const CREATE_SUCCESS: &str = "Product created successfully";
pub const UPDATE_SUCCESS: &str = "Product updated successfully";

/// The same calendar day one year later. 29 February rolls to 1 March.
pub fn one_year_later(date: NaiveDate) -> Option<NaiveDate> {
    let year = date.year() + 1;
    date.with_year(year)
        .or_else(|| NaiveDate::from_ymd_opt(year, 3, 1))
}

// ── Fields and errors ────────────────────────────────────────────────

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Display, AsRefStr, EnumIter,
)]
#[strum(serialize_all = "snake_case")]
pub enum Field {
    Id,
    Name,
    Description,
    Logo,
    DateRelease,
    DateRevision,
}

/// Per-field errors, at most one per field, in field order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors(BTreeMap<Field, FieldError>);

impl FormErrors {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn get(&self, field: Field) -> Option<FieldError> {
        self.0.get(&field).copied()
    }

    pub fn insert(&mut self, field: Field, error: FieldError) {
        self.0.insert(field, error);
    }

    pub fn iter(&self) -> impl Iterator<Item = (Field, FieldError)> + '_ {
        self.0.iter().map(|(f, e)| (*f, *e))
    }

    /// One line naming every failing field.
    pub fn summary(&self) -> String {
        self.iter()
            .map(|(field, error)| format!("{field}: {error}"))
            .collect::<Vec<_>>()
            .join("; ")
    }
}

fn check_length(value: &str, min: usize, max: usize) -> Option<FieldError> {
    let len = value.chars().count();
    if value.trim().is_empty() {
        Some(FieldError::Required)
    } else if len < min {
        Some(FieldError::MinLength(min))
    } else if len > max {
        Some(FieldError::MaxLength(max))
    } else {
        None
    }
}

// ── Form values ──────────────────────────────────────────────────────

/// Raw form values. Dates are `YYYY-MM-DD` strings as typed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductForm {
    pub id: String,
    pub name: String,
    pub description: String,
    pub logo: String,
    pub date_release: String,
    pub date_revision: String,
}

impl ProductForm {
    /// Pre-fill from an existing product.
    pub fn from_product(product: &Product) -> Self {
        Self {
            id: product.id.clone(),
            name: product.name.clone(),
            description: product.description.clone(),
            logo: product.logo.clone(),
            date_release: format_form_date(&product.date_release),
            date_revision: format_form_date(&product.date_revision),
        }
    }

    /// Set the release date and derive the revision date from it.
    pub fn set_release_date(&mut self, value: impl Into<String>) {
        self.date_release = value.into();
        if let Some(revision) = parse_form_date(&self.date_release).and_then(one_year_later) {
            self.date_revision = revision.format(crate::convert::FORM_DATE_FORMAT).to_string();
        }
    }

    /// Synchronous field rules, evaluated against `today`.
    pub fn validate(&self, today: NaiveDate) -> FormErrors {
        let mut errors = FormErrors::default();
        let mut put = |field, error: Option<FieldError>| {
            if let Some(error) = error {
                errors.insert(field, error);
            }
        };

        put(Field::Id, check_length(self.id.trim(), 3, 10));
        put(Field::Name, check_length(&self.name, 5, 100));
        put(Field::Description, check_length(&self.description, 10, 200));
        put(
            Field::Logo,
            self.logo.trim().is_empty().then_some(FieldError::Required),
        );

        let release = parse_form_date(&self.date_release);
        put(
            Field::DateRelease,
            match release {
                None => Some(FieldError::Required),
                Some(date) if date < today => Some(FieldError::DateInPast),
                Some(_) => None,
            },
        );

        let revision = parse_form_date(&self.date_revision);
        put(
            Field::DateRevision,
            match (release, revision) {
                (_, None) => Some(FieldError::Required),
                (Some(release), Some(revision)) if one_year_later(release) != Some(revision) => {
                    Some(FieldError::RevisionMismatch)
                }
                _ => None,
            },
        );

        errors
    }
}

// ── Session ──────────────────────────────────────────────────────────

/// Whether a session creates a new product or edits an existing one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormMode {
    Create,
    /// The identifier is fixed while editing.
    Edit { id: String },
}

/// One open product form.
pub struct FormSession<R: ProductRepository> {
    use_cases: ProductUseCases<R>,
    notifications: NotificationBus,
    validator: DebouncedValidator<R>,
    mode: FormMode,
    form: ProductForm,
    initial: ProductForm,
    last_checked: Mutex<Option<String>>,
    submitting: watch::Sender<bool>,
}

impl<R: ProductRepository> FormSession<R> {
    fn with_form(
        use_cases: ProductUseCases<R>,
        notifications: NotificationBus,
        debounce: Duration,
        mode: FormMode,
        form: ProductForm,
    ) -> Self {
        let validator = DebouncedValidator::new(Arc::clone(use_cases.repository()), debounce);
        let (submitting, _) = watch::channel(false);
        Self {
            use_cases,
            notifications,
            validator,
            mode,
            initial: form.clone(),
            form,
            last_checked: Mutex::new(None),
            submitting,
        }
    }

    /// A blank form for a new product.
    pub fn create(
        use_cases: ProductUseCases<R>,
        notifications: NotificationBus,
        debounce: Duration,
    ) -> Self {
        Self::with_form(
            use_cases,
            notifications,
            debounce,
            FormMode::Create,
            ProductForm::default(),
        )
    }

    /// A form pre-filled from the cached product `id`.
    pub async fn edit(
        use_cases: ProductUseCases<R>,
        notifications: NotificationBus,
        debounce: Duration,
        id: &str,
    ) -> Result<Self, CoreError> {
        let product = use_cases
            .get_product(id)
            .await?
            .ok_or_else(|| CoreError::NotFound {
                entity_type: "product".into(),
                identifier: id.to_owned(),
            })?;
        let form = ProductForm::from_product(&product);
        Ok(Self::with_form(
            use_cases,
            notifications,
            debounce,
            FormMode::Edit { id: id.to_owned() },
            form,
        ))
    }

    pub fn mode(&self) -> &FormMode {
        &self.mode
    }

    pub fn form(&self) -> &ProductForm {
        &self.form
    }

    /// Mutable access to the values. The identifier is reset on the next
    /// submit while editing.
    pub fn form_mut(&mut self) -> &mut ProductForm {
        &mut self.form
    }

    pub fn validator(&self) -> &DebouncedValidator<R> {
        &self.validator
    }

    pub fn is_submitting(&self) -> bool {
        *self.submitting.borrow()
    }

    pub fn subscribe_submitting(&self) -> watch::Receiver<bool> {
        self.submitting.subscribe()
    }

    /// Run the debounced uniqueness check on the current identifier.
    /// Always clear while editing.
    pub async fn check_id(&self) -> Result<Option<FieldError>, Superseded> {
        if !matches!(self.mode, FormMode::Create) {
            return Ok(None);
        }
        let id = self.form.id.trim().to_owned();
        *self
            .last_checked
            .lock()
            .unwrap_or_else(PoisonError::into_inner) = Some(id.clone());
        self.validator.validate(&id).await
    }

    /// Every field error, including the remote identifier check. While
    /// editing the identifier is fixed, so its rules are skipped.
    pub async fn errors(&self, today: NaiveDate) -> FormErrors {
        let mut errors = self.form.validate(today);
        if !matches!(self.mode, FormMode::Create) {
            errors.0.remove(&Field::Id);
            return errors;
        }

        let checked = self
            .last_checked
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let stale = checked.as_deref() != Some(self.form.id.trim());
        let remote = if stale || self.validator.state() == ValidationState::Pending {
            self.check_id().await.ok().flatten()
        } else {
            self.validator.error()
        };

        if let Some(error) = remote {
            errors.0.entry(Field::Id).or_insert(error);
        }
        errors
    }

    /// Validate, then create or update through the use cases, notifying
    /// the user either way.
    pub async fn submit(&self, today: NaiveDate) -> Result<Arc<Product>, CoreError> {
        let errors = self.errors(today).await;
        if !errors.is_empty() {
            debug!(errors = %errors.summary(), "form submission blocked");
            return Err(CoreError::ValidationFailed {
                message: errors.summary(),
            });
        }

        let _submitting = SubmitGuard::raise(&self.submitting);
        let mut dto = from_edit_form(&self.form);
        if let FormMode::Edit { id } = &self.mode {
            dto.id = Some(id.clone());
        }
        let product = to_domain(dto);

        let (result, success) = match self.mode {
            FormMode::Create => (self.use_cases.create_product(product).await, CREATE_SUCCESS),
            FormMode::Edit { .. } => (self.use_cases.update_product(product).await, UPDATE_SUCCESS),
        };

        match result {
            Ok(saved) => {
                info!(id = %saved.id, "product form submitted");
                self.notifications.success(success);
                Ok(saved)
            }
            Err(e) => {
                self.notifications.report(&e);
                Err(e)
            }
        }
    }

    /// Restore the values the session opened with and drop any pending
    /// identifier check.
    pub fn reset(&mut self) {
        self.form = self.initial.clone();
        self.validator.reset();
        *self
            .last_checked
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner) = None;
    }
}

/// Holds `submitting` high for the duration of a submit, whatever the outcome.
struct SubmitGuard<'a>(&'a watch::Sender<bool>);

impl<'a> SubmitGuard<'a> {
    fn raise(flag: &'a watch::Sender<bool>) -> Self {
        flag.send_replace(true);
        Self(flag)
    }
}

impl Drop for SubmitGuard<'_> {
    fn drop(&mut self) {
        self.0.send_replace(false);
    }
}

/// All fields, in display order.
pub fn fields() -> impl Iterator<Item = Field> {
    Field::iter()
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use pretty_assertions::assert_eq;
    use tokio_test::{assert_pending, assert_ready, task};

    use super::*;
    use crate::model::Severity;
    use crate::store::ProductStore;
    use crate::testing::{FakeGateway, api_error, dto};

    const DEBOUNCE: Duration = Duration::from_millis(500);

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn today() -> NaiveDate {
        date(2025, 6, 1)
    }

    fn valid_form() -> ProductForm {
        let mut form = ProductForm {
            id: "trj-crd".into(),
            name: "Tarjeta Credito".into(),
            description: "Tarjeta de consumo".into(),
            logo: "https://example.com/logo.png".into(),
            ..ProductForm::default()
        };
        form.set_release_date("2025-07-01");
        form
    }

    type Store = ProductStore<FakeGateway>;

    fn session(gateway: FakeGateway) -> (FormSession<Store>, NotificationBus) {
        let uc = ProductUseCases::new(Arc::new(ProductStore::new(gateway)));
        let bus = NotificationBus::default();
        (FormSession::create(uc, bus.clone(), DEBOUNCE), bus)
    }

    // ── Rules ────────────────────────────────────────────────────────

    #[test]
    fn one_year_later_rolls_leap_day_forward() {
        assert_eq!(one_year_later(date(2024, 2, 29)), Some(date(2025, 3, 1)));
        assert_eq!(one_year_later(date(2025, 1, 31)), Some(date(2026, 1, 31)));
        assert_eq!(one_year_later(date(2023, 2, 28)), Some(date(2024, 2, 28)));
    }

    #[test]
    fn release_date_fills_revision() {
        let mut form = ProductForm::default();
        form.set_release_date("2024-02-29");
        assert_eq!(form.date_revision, "2025-03-01");

        form.set_release_date("garbage");
        assert_eq!(form.date_revision, "2025-03-01");
    }

    #[test]
    fn valid_form_has_no_errors() {
        assert!(valid_form().validate(today()).is_empty());
    }

    #[test]
    fn blank_form_requires_everything() {
        let errors = ProductForm::default().validate(today());
        for field in fields() {
            assert_eq!(errors.get(field), Some(FieldError::Required), "{field}");
        }
    }

    #[test]
    fn length_limits() {
        let form = ProductForm {
            id: "ab".into(),
            name: "x".repeat(101),
            description: "short".into(),
            ..valid_form()
        };
        let errors = form.validate(today());

        assert_eq!(errors.get(Field::Id), Some(FieldError::MinLength(3)));
        assert_eq!(errors.get(Field::Name), Some(FieldError::MaxLength(100)));
        assert_eq!(errors.get(Field::Description), Some(FieldError::MinLength(10)));

        let long_id = ProductForm {
            id: "a".repeat(11),
            ..valid_form()
        };
        assert_eq!(
            long_id.validate(today()).get(Field::Id),
            Some(FieldError::MaxLength(10))
        );
    }

    #[test]
    fn date_rules() {
        let mut past = valid_form();
        past.set_release_date("2025-05-31");
        assert_eq!(
            past.validate(today()).get(Field::DateRelease),
            Some(FieldError::DateInPast)
        );

        let mut same_day = valid_form();
        same_day.set_release_date("2025-06-01");
        assert!(same_day.validate(today()).is_empty());

        let mismatch = ProductForm {
            date_revision: "2026-07-02".into(),
            ..valid_form()
        };
        let errors = mismatch.validate(today());
        assert_eq!(
            errors.get(Field::DateRevision),
            Some(FieldError::RevisionMismatch)
        );
        assert_eq!(
            errors.summary(),
            "date_revision: The revision date must be exactly one year after release"
        );
    }

    #[test]
    fn from_product_round_trips_through_the_form() {
        let product = to_domain(dto("abc", "Product name"));
        let form = ProductForm::from_product(&product);
        assert_eq!(form.date_release, "2025-01-01");
        assert_eq!(form.date_revision, "2026-01-01");
        assert_eq!(to_domain(from_edit_form(&form)), product);
    }

    // ── Session ──────────────────────────────────────────────────────

    #[tokio::test(start_paused = true)]
    async fn create_submit_checks_id_then_creates() {
        let (mut session, bus) = session(FakeGateway::default());
        *session.form_mut() = valid_form();

        let saved = session.submit(today()).await.unwrap();

        assert_eq!(saved.id, "trj-crd");
        let calls = session.use_cases.repository().gateway().calls();
        assert_eq!(calls, ["exists:trj-crd", "create:trj-crd"]);
        assert_eq!(bus.snapshot()[0].message, CREATE_SUCCESS);
        assert!(!session.is_submitting());
    }

    #[tokio::test(start_paused = true)]
    async fn taken_id_blocks_submit() {
        let gateway = FakeGateway::default();
        gateway.push_exists(Ok(true));
        let (mut session, bus) = session(gateway);
        *session.form_mut() = valid_form();

        assert_eq!(
            session.check_id().await,
            Ok(Some(FieldError::AlreadyExists))
        );
        let err = session.submit(today()).await.unwrap_err();

        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert_eq!(err.user_message(), "id: This ID already exists");
        let calls = session.use_cases.repository().gateway().calls();
        assert_eq!(calls, ["exists:trj-crd"]);
        assert!(bus.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn invalid_form_never_reaches_the_service() {
        let (session, _) = session(FakeGateway::default());

        let err = session.submit(today()).await.unwrap_err();

        assert!(matches!(err, CoreError::ValidationFailed { .. }));
        assert!(!session.use_cases.repository().gateway().calls().iter().any(|c| c.starts_with("create")));
    }

    #[tokio::test(start_paused = true)]
    async fn failed_create_notifies_and_clears_submitting() {
        let gateway = FakeGateway::default();
        gateway.push_create(Err(catalog_api::Error::Api {
            status: 400,
            message: "Duplicate identifier".into(),
        }));
        let (mut session, bus) = session(gateway);
        *session.form_mut() = valid_form();

        assert!(session.submit(today()).await.is_err());

        let snap = bus.snapshot();
        assert_eq!(snap[0].severity, Severity::Error);
        assert_eq!(snap[0].message, "Duplicate identifier");
        assert!(!session.is_submitting());
        assert!(session.use_cases.repository().snapshot().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn submitting_flag_spans_the_request() {
        let (mut session, _) = session(FakeGateway::with_latency(Duration::from_millis(100)));
        *session.form_mut() = valid_form();
        assert_eq!(session.check_id().await, Ok(None));

        let mut submit = task::spawn(session.submit(today()));
        assert_pending!(submit.poll());
        assert!(session.is_submitting());

        tokio::time::advance(Duration::from_millis(100)).await;
        assert_ready!(submit.poll()).unwrap();
        assert!(!session.is_submitting());
    }

    #[tokio::test(start_paused = true)]
    async fn edit_updates_under_the_original_id() {
        let store = ProductStore::new(FakeGateway::default());
        store.gateway().push_list(Ok(vec![dto("abc", "Old name")]));
        store.fetch_all().await.unwrap();
        let uc = ProductUseCases::new(Arc::new(store));
        let bus = NotificationBus::default();

        let mut session = FormSession::edit(uc.clone(), bus.clone(), DEBOUNCE, "abc")
            .await
            .unwrap();
        assert_eq!(session.form().name, "Old name");
        assert_eq!(session.mode(), &FormMode::Edit { id: "abc".into() });

        session.form_mut().name = "New name".into();
        session.form_mut().id = "changed".into();
        session.form_mut().set_release_date("2025-08-01");
        let saved = session.submit(today()).await.unwrap();

        assert_eq!(saved.id, "abc");
        assert_eq!(uc.get_product("abc").await.unwrap().unwrap().name, "New name");
        assert_eq!(bus.snapshot()[0].message, UPDATE_SUCCESS);
        assert!(!uc.repository().gateway().calls().iter().any(|c| c.starts_with("exists")));

        session.reset();
        assert_eq!(session.form().name, "Old name");
    }

    #[tokio::test]
    async fn edit_ignores_rules_on_the_fixed_id() {
        let store = ProductStore::new(FakeGateway::default());
        store.gateway().push_list(Ok(vec![dto("abc", "Old name")]));
        store.fetch_all().await.unwrap();
        let uc = ProductUseCases::new(Arc::new(store));

        let mut session = FormSession::edit(uc, NotificationBus::default(), DEBOUNCE, "abc")
            .await
            .unwrap();
        session.form_mut().id = "x".into();
        session.form_mut().set_release_date("2025-08-01");

        assert_eq!(
            session.form().validate(today()).get(Field::Id),
            Some(FieldError::MinLength(3))
        );
        assert!(session.errors(today()).await.is_empty());
        assert_eq!(session.submit(today()).await.unwrap().id, "abc");
    }

    #[tokio::test]
    async fn edit_of_unknown_id_is_not_found() {
        let uc = ProductUseCases::new(Arc::new(ProductStore::new(FakeGateway::default())));
        let result = FormSession::edit(uc, NotificationBus::default(), DEBOUNCE, "nope").await;
        assert!(matches!(result, Err(CoreError::NotFound { .. })));
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_check_does_not_block_submit() {
        let gateway = FakeGateway::default();
        gateway.push_exists(Err(api_error(503)));
        let (mut session, _) = session(gateway);
        *session.form_mut() = valid_form();

        assert!(session.submit(today()).await.is_ok());
    }
}
