//! The upload driver: per-upload configuration, session registry, and the
//! public cancellation entry point.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::Mutex;

use upflow_model::{Endpoints, RequestLog, RetryPolicy, UploadSession, UploadStatus};

use crate::backoff::{BackoffPolicy, RetryEligibility};
use crate::coordinator::{CancelCoordinator, CancelOutcome};
use crate::error::{UploadError, UploadResult};
use crate::notify::{Callback, Notifier};
use crate::transport::Transport;

/// Per-upload configuration consumed at initiate time.
///
/// Everything here is immutable once the session exists; the retry policy
/// and callbacks are bound to the session for its whole lifetime.
#[derive(Clone)]
pub struct UploadConfig {
    /// Base URL of the storage service (scheme, host, optional prefix).
    pub base_url: String,
    /// The object key to upload to.
    pub object_key: String,
    /// Headers merged into every request of this session.
    pub headers_common: HashMap<String, String>,
    /// Headers applied only to the initiate request.
    pub headers_at_initiate: HashMap<String, String>,
    /// Retry bounds for the cancellation phases.
    pub retry: RetryPolicy,
    /// Observer fired once when the session is created.
    pub started: Option<Callback>,
    /// Observer fired once when a cancellation resolves successfully.
    pub cancelled: Option<Callback>,
    /// Optional per-kind retry eligibility override.
    pub retry_eligible: Option<RetryEligibility>,
}

impl UploadConfig {
    /// Configuration with default retry bounds, no extra headers, and no
    /// observers.
    #[must_use]
    pub fn new(base_url: &str, object_key: &str) -> Self {
        Self {
            base_url: base_url.to_owned(),
            object_key: object_key.to_owned(),
            headers_common: HashMap::new(),
            headers_at_initiate: HashMap::new(),
            retry: RetryPolicy::default(),
            started: None,
            cancelled: None,
            retry_eligible: None,
        }
    }
}

impl fmt::Debug for UploadConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadConfig")
            .field("base_url", &self.base_url)
            .field("object_key", &self.object_key)
            .field("retry", &self.retry)
            .finish_non_exhaustive()
    }
}

/// Everything the driver keeps per registered session.
#[derive(Clone)]
pub(crate) struct SessionEntry {
    pub(crate) session: Arc<Mutex<UploadSession>>,
    pub(crate) notifier: Notifier,
    pub(crate) backoff: BackoffPolicy,
    pub(crate) endpoints: Endpoints,
    pub(crate) log: RequestLog,
}

/// Client-side driver for the chunked upload protocol.
///
/// Owns the session registry. The transport and per-session configuration
/// are the only state shared with in-flight operations, and both are
/// read-only; each session sits behind its own lock, so independent
/// uploads proceed (and cancel) concurrently.
pub struct UploadDriver<T> {
    transport: Arc<T>,
    sessions: DashMap<String, SessionEntry>,
}

impl<T> fmt::Debug for UploadDriver<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UploadDriver")
            .field("sessions", &self.sessions.len())
            .finish_non_exhaustive()
    }
}

impl<T: Transport> UploadDriver<T> {
    /// Create a driver over the given transport.
    pub fn new(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
            sessions: DashMap::new(),
        }
    }

    pub(crate) fn transport(&self) -> &Arc<T> {
        &self.transport
    }

    pub(crate) fn insert(&self, upload_id: String, entry: SessionEntry) {
        self.sessions.insert(upload_id, entry);
    }

    /// Resolve a registry entry, cloning the handles out so no map guard is
    /// held across an await point.
    pub(crate) fn entry(&self, upload_id: &str) -> UploadResult<SessionEntry> {
        self.sessions
            .get(upload_id)
            .map(|entry| entry.clone())
            .ok_or_else(|| UploadError::UnknownUpload {
                upload_id: upload_id.to_owned(),
            })
    }

    pub(crate) fn make_backoff(
        retry: RetryPolicy,
        eligible: Option<RetryEligibility>,
    ) -> BackoffPolicy {
        match eligible {
            Some(predicate) => BackoffPolicy::with_eligibility(retry, predicate),
            None => BackoffPolicy::new(retry),
        }
    }

    /// Cancel an upload by id.
    ///
    /// Resolves the session, then runs the cancellation coordinator to one
    /// of its two terminal outcomes. Rejected only for unknown ids and for
    /// sessions that are already `Cancelled`; a `CancelFailed` session may
    /// be cancelled again.
    pub async fn cancel(&self, upload_id: &str) -> UploadResult<CancelOutcome> {
        let entry = self.entry(upload_id)?;
        let mut session = entry.session.lock().await;

        if session.status() == UploadStatus::Cancelled {
            return Err(UploadError::AlreadyCancelled {
                upload_id: upload_id.to_owned(),
            });
        }

        let coordinator = CancelCoordinator::new(
            Arc::clone(&self.transport),
            entry.backoff.clone(),
            entry.endpoints.clone(),
        );
        Ok(coordinator.cancel(&mut session, &entry.notifier).await)
    }

    /// Shared handle to a session's request log, for auditing/telemetry.
    #[must_use]
    pub fn request_log(&self, upload_id: &str) -> Option<RequestLog> {
        self.sessions.get(upload_id).map(|entry| entry.log.clone())
    }

    /// Current status of a session.
    pub async fn status(&self, upload_id: &str) -> UploadResult<UploadStatus> {
        let entry = self.entry(upload_id)?;
        let session = entry.session.lock().await;
        Ok(session.status())
    }
}
