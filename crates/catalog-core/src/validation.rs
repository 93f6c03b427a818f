// ── Debounced uniqueness validation ──
//
// Checks a candidate identifier against the remote service without flooding
// it: each new value restarts a quiet window, and only the most recent value
// ever reaches the service or the published outcome. Superseded checks are
// cancelled outright, so a slow stale response cannot land after a newer one.

use std::fmt;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::error::CoreError;
use crate::repository::ProductRepository;

/// Something that can tell whether an identifier is already taken.
pub trait ExistenceCheck: Send + Sync {
    fn exists(&self, id: &str) -> impl Future<Output = Result<bool, CoreError>> + Send;
}

impl<R: ProductRepository> ExistenceCheck for R {
    fn exists(&self, id: &str) -> impl Future<Output = Result<bool, CoreError>> + Send {
        self.verify_exists(id)
    }
}

// ── Outcomes ─────────────────────────────────────────────────────────

/// A field-level validation failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldError {
    Required,
    MinLength(usize),
    MaxLength(usize),
    /// The identifier is already taken on the server.
    AlreadyExists,
    /// The date lies before today.
    DateInPast,
    /// The revision date is not exactly one year after release.
    RevisionMismatch,
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Required => f.write_str("This field is required"),
            Self::MinLength(n) => write!(f, "Must be at least {n} characters"),
            Self::MaxLength(n) => write!(f, "Must be at most {n} characters"),
            Self::AlreadyExists => f.write_str("This ID already exists"),
            Self::DateInPast => f.write_str("The date must be today or later"),
            Self::RevisionMismatch => {
                f.write_str("The revision date must be exactly one year after release")
            }
        }
    }
}

/// Tri-state outcome of the most recent check.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ValidationState {
    /// A check is waiting for its window or its response.
    Pending,
    #[default]
    Clear,
    Conflict,
}

impl ValidationState {
    /// The caller-facing form: a conflict is an error, anything else is not.
    pub fn error(self) -> Option<FieldError> {
        match self {
            Self::Conflict => Some(FieldError::AlreadyExists),
            Self::Pending | Self::Clear => None,
        }
    }
}

/// Published outcome, tagged with the generation of the value it belongs to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ValidationStatus {
    pub generation: u64,
    pub state: ValidationState,
}

/// Returned by [`DebouncedValidator::validate`] when a newer value replaced
/// this one before it finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
#[error("validation superseded by a newer value")]
pub struct Superseded;

// ── Validator ────────────────────────────────────────────────────────

/// Single-flight debounced existence check for one form field.
pub struct DebouncedValidator<C: ExistenceCheck> {
    check: Arc<C>,
    delay: Duration,
    status: watch::Sender<ValidationStatus>,
    /// Generation whose request is currently on the wire, if any.
    checking: watch::Sender<Option<u64>>,
    pending: Mutex<CancellationToken>,
}

impl<C: ExistenceCheck> DebouncedValidator<C> {
    pub fn new(check: Arc<C>, delay: Duration) -> Self {
        let (status, _) = watch::channel(ValidationStatus::default());
        let (checking, _) = watch::channel(None);
        Self {
            check,
            delay,
            status,
            checking,
            pending: Mutex::new(CancellationToken::new()),
        }
    }

    /// Validate `value`, waiting out the quiet window first.
    ///
    /// Resolves to `Ok(None)` when clear (including on a failed request),
    /// `Ok(Some(FieldError::AlreadyExists))` on conflict, and
    /// `Err(Superseded)` if another call to `validate` or `reset` arrived
    /// before this one finished. A superseded call never touches the
    /// published state. Dropping the future early settles it as clear.
    pub async fn validate(&self, value: &str) -> Result<Option<FieldError>, Superseded> {
        let value = value.trim();
        if value.is_empty() {
            self.begin(ValidationState::Clear);
            return Ok(None);
        }

        let (generation, token) = self.begin(ValidationState::Pending);
        let mut guard = CheckGuard {
            validator: self,
            generation,
            armed: true,
        };

        tokio::select! {
            biased;
            () = token.cancelled() => return Err(Superseded),
            () = tokio::time::sleep(self.delay) => {}
        }

        self.checking.send_replace(Some(generation));
        debug!(value, generation, "checking identifier availability");
        let result = tokio::select! {
            biased;
            () = token.cancelled() => return Err(Superseded),
            result = self.check.exists(value) => result,
        };
        self.checking
            .send_if_modified(|c| *c == Some(generation) && c.take().is_some());

        let state = match result {
            Ok(true) => ValidationState::Conflict,
            Ok(false) => ValidationState::Clear,
            Err(e) => {
                warn!(value, error = %e, "existence check failed, treating as available");
                ValidationState::Clear
            }
        };

        guard.armed = false;
        if self.settle(generation, state) {
            Ok(state.error())
        } else {
            Err(Superseded)
        }
    }

    /// Abandon any pending check and go back to clear.
    pub fn reset(&self) {
        self.begin(ValidationState::Clear);
    }

    /// Current outcome.
    pub fn state(&self) -> ValidationState {
        self.status.borrow().state
    }

    /// Caller-facing form of the current outcome.
    pub fn error(&self) -> Option<FieldError> {
        self.state().error()
    }

    /// Subscribe to outcome changes.
    pub fn subscribe(&self) -> watch::Receiver<ValidationStatus> {
        self.status.subscribe()
    }

    /// `true` only while the existence request itself is in flight.
    pub fn is_checking(&self) -> bool {
        self.checking.borrow().is_some()
    }

    /// Start a new generation: cancel whatever was pending and publish
    /// `initial` for the new value.
    fn begin(&self, initial: ValidationState) -> (u64, CancellationToken) {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        pending.cancel();
        *pending = CancellationToken::new();
        let token = pending.clone();

        let mut generation = 0;
        self.status.send_modify(|status| {
            status.generation += 1;
            status.state = initial;
            generation = status.generation;
        });
        self.checking.send_if_modified(|c| c.take().is_some());
        (generation, token)
    }

    /// Publish `state` only if `generation` is still the latest.
    fn settle(&self, generation: u64, state: ValidationState) -> bool {
        self.status.send_if_modified(|status| {
            if status.generation != generation {
                return false;
            }
            status.state = state;
            true
        })
    }
}

/// Settles an abandoned check: a `validate` future dropped before its
/// outcome is published leaves the field clear and not checking.
struct CheckGuard<'a, C: ExistenceCheck> {
    validator: &'a DebouncedValidator<C>,
    generation: u64,
    armed: bool,
}

impl<C: ExistenceCheck> Drop for CheckGuard<'_, C> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let generation = self.generation;
        let validator = self.validator;
        validator
            .checking
            .send_if_modified(|c| *c == Some(generation) && c.take().is_some());
        if validator.settle(generation, ValidationState::Clear) {
            debug!(generation, "identifier check abandoned");
        }
    }
}
