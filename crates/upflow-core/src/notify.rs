//! Observer notifications with at-most-once delivery per session.

use std::fmt;
use std::sync::Arc;

use upflow_model::UploadSession;

/// An observer callback; receives the session id.
pub type Callback = Arc<dyn Fn(&str) + Send + Sync>;

/// Fires the `started` and `cancelled` callbacks for one session.
///
/// Delivery is guarded by the session's `CallbackLedger`: however many
/// times the surrounding retry loops resolve, each callback runs at most
/// once per session lifetime. Each session owns its own notifier binding;
/// there is no process-wide observer state.
#[derive(Clone, Default)]
pub struct Notifier {
    on_started: Option<Callback>,
    on_cancelled: Option<Callback>,
}

impl fmt::Debug for Notifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Notifier")
            .field("on_started", &self.on_started.is_some())
            .field("on_cancelled", &self.on_cancelled.is_some())
            .finish()
    }
}

impl Notifier {
    /// Create a notifier from the per-upload configuration callbacks.
    #[must_use]
    pub fn new(on_started: Option<Callback>, on_cancelled: Option<Callback>) -> Self {
        Self {
            on_started,
            on_cancelled,
        }
    }

    /// Fire `started`, if it has not fired for this session yet.
    pub fn fire_started(&self, session: &mut UploadSession) {
        if !session.ledger.claim_started() {
            return;
        }
        if let Some(callback) = &self.on_started {
            callback(&session.id);
        }
    }

    /// Fire `cancelled`, if it has not fired for this session yet.
    pub fn fire_cancelled(&self, session: &mut UploadSession) {
        if !session.ledger.claim_cancelled() {
            return;
        }
        if let Some(callback) = &self.on_cancelled {
            callback(&session.id);
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
