// ── Notification bus ──
//
// A transient, self-expiring queue of user-facing messages. Publishers and
// renderers never see each other: one side calls `publish`, the other
// watches `queue()`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;

use tokio::task::AbortHandle;
use tracing::{debug, warn};

use crate::config::NotificationDefaults;
use crate::error::CoreError;
use crate::model::{Notification, NotificationId, Severity};
use crate::store::{EntityCollection, Snapshot};
use crate::stream::EntityStream;

/// Shared handle to the notification queue. Clones publish into the same
/// queue.
#[derive(Clone)]
pub struct NotificationBus {
    inner: Arc<Inner>,
}

struct Inner {
    queue: EntityCollection<Notification>,
    next_id: AtomicU64,
    defaults: NotificationDefaults,
    timers: Mutex<HashMap<NotificationId, AbortHandle>>,
}

impl Inner {
    fn timers(&self) -> std::sync::MutexGuard<'_, HashMap<NotificationId, AbortHandle>> {
        self.timers.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn expire(&self, id: NotificationId) {
        self.timers().remove(&id);
        if self.queue.remove(&id).is_some() {
            debug!(id, "notification expired");
        }
    }
}

impl Drop for Inner {
    fn drop(&mut self) {
        for (_, timer) in self.timers().drain() {
            timer.abort();
        }
    }
}

impl Default for NotificationBus {
    fn default() -> Self {
        Self::new(NotificationDefaults::default())
    }
}

impl NotificationBus {
    pub fn new(defaults: NotificationDefaults) -> Self {
        Self {
            inner: Arc::new(Inner {
                queue: EntityCollection::new(),
                next_id: AtomicU64::new(1),
                defaults,
                timers: Mutex::new(HashMap::new()),
            }),
        }
    }

    /// Queue a message. With a non-zero `ttl` it removes itself once the
    /// ttl elapses; otherwise it stays until dismissed.
    ///
    /// Expiry timers run on the ambient Tokio runtime. Outside a runtime the
    /// message is still queued but never expires on its own.
    pub fn publish(
        &self,
        message: impl Into<String>,
        severity: Severity,
        ttl: Option<Duration>,
    ) -> NotificationId {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        let ttl = ttl.filter(|t| !t.is_zero());
        self.inner.queue.append(Notification {
            id,
            message: message.into(),
            severity,
            ttl,
        });
        debug!(id, %severity, "notification published");

        if let Some(ttl) = ttl {
            self.schedule_expiry(id, ttl);
        }
        id
    }

    fn schedule_expiry(&self, id: NotificationId, ttl: Duration) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            warn!(id, "no Tokio runtime, notification will not expire");
            return;
        };

        // Hold the timer table while spawning so the task cannot finish
        // before its handle is recorded.
        let mut timers = self.inner.timers();
        let weak: Weak<Inner> = Arc::downgrade(&self.inner);
        let task = runtime.spawn(async move {
            tokio::time::sleep(ttl).await;
            if let Some(inner) = weak.upgrade() {
                inner.expire(id);
            }
        });
        timers.insert(id, task.abort_handle());
    }

    /// Remove a message now and cancel its timer. Returns `false` if it was
    /// already gone.
    pub fn dismiss(&self, id: NotificationId) -> bool {
        if let Some(timer) = self.inner.timers().remove(&id) {
            timer.abort();
        }
        let removed = self.inner.queue.remove(&id).is_some();
        if removed {
            debug!(id, "notification dismissed");
        }
        removed
    }

    // ── Shortcuts with per-severity default lifetimes ───────────────

    pub fn info(&self, message: impl Into<String>) -> NotificationId {
        self.with_default_ttl(message, Severity::Info)
    }

    pub fn success(&self, message: impl Into<String>) -> NotificationId {
        self.with_default_ttl(message, Severity::Success)
    }

    pub fn warning(&self, message: impl Into<String>) -> NotificationId {
        self.with_default_ttl(message, Severity::Warning)
    }

    pub fn error(&self, message: impl Into<String>) -> NotificationId {
        self.with_default_ttl(message, Severity::Error)
    }

    /// Publish the user-facing text of `err` as an error.
    pub fn report(&self, err: &CoreError) -> NotificationId {
        self.error(err.user_message())
    }

    fn with_default_ttl(&self, message: impl Into<String>, severity: Severity) -> NotificationId {
        let ttl = self.inner.defaults.ttl_for(severity);
        self.publish(message, severity, Some(ttl))
    }

    // ── Observation ─────────────────────────────────────────────────

    /// Subscribe to the queue, in publish order.
    pub fn queue(&self) -> EntityStream<Notification> {
        EntityStream::new(self.inner.queue.subscribe())
    }

    pub fn snapshot(&self) -> Snapshot<Notification> {
        self.inner.queue.snapshot()
    }

    pub fn len(&self) -> usize {
        self.inner.queue.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.queue.is_empty()
    }
}
