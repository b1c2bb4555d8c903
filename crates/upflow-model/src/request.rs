//! Request classification and the observable per-session request log.
//!
//! Every request the driver issues is appended to a [`RequestLog`], in
//! order, as method + discriminator. The log is the basis for the driver's
//! ordering guarantees and is exposed to external collaborators for
//! auditing and telemetry, not just for tests.

use std::sync::Arc;

use http::Method;
use parking_lot::Mutex;

/// The kinds of request the driver issues against the storage service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestKind {
    /// `POST` creating the upload session.
    Initiate,
    /// `PUT` of a single part (1-based part number).
    UploadPart(u32),
    /// `POST` assembling the uploaded parts.
    Complete,
    /// `DELETE` tearing down the session and its stored parts.
    Abort,
    /// `GET` confirming no parts remain after an abort.
    VerifyNoParts,
}

impl RequestKind {
    /// The HTTP method used for this request kind.
    #[must_use]
    pub fn method(self) -> Method {
        match self {
            RequestKind::Initiate | RequestKind::Complete => Method::POST,
            RequestKind::UploadPart(_) => Method::PUT,
            RequestKind::Abort => Method::DELETE,
            RequestKind::VerifyNoParts => Method::GET,
        }
    }

    /// The discriminator recorded in the request log.
    #[must_use]
    pub fn label(self) -> String {
        match self {
            RequestKind::Initiate => "initiate".to_owned(),
            RequestKind::UploadPart(n) => format!("upload-part-{n}"),
            RequestKind::Complete => "complete".to_owned(),
            RequestKind::Abort => "abort".to_owned(),
            RequestKind::VerifyNoParts => "verify".to_owned(),
        }
    }
}

/// One recorded request: method plus discriminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestRecord {
    /// HTTP method of the request.
    pub method: Method,
    /// Discriminator, e.g. `upload-part-2` or a phase name.
    pub label: String,
}

impl From<RequestKind> for RequestRecord {
    fn from(kind: RequestKind) -> Self {
        Self {
            method: kind.method(),
            label: kind.label(),
        }
    }
}

/// Shared, ordered log of the requests issued for one session.
///
/// Cloning the log yields another handle onto the same underlying sequence.
#[derive(Debug, Clone, Default)]
pub struct RequestLog {
    inner: Arc<Mutex<Vec<RequestRecord>>>,
}

impl RequestLog {
    /// Append a request to the log.
    pub fn record(&self, kind: RequestKind) {
        self.inner.lock().push(kind.into());
    }

    /// Snapshot of all records, in issue order.
    #[must_use]
    pub fn records(&self) -> Vec<RequestRecord> {
        self.inner.lock().clone()
    }

    /// The comma-joined discriminator sequence, e.g.
    /// `initiate,upload-part-1,complete,abort,verify`.
    #[must_use]
    pub fn order(&self) -> String {
        self.inner
            .lock()
            .iter()
            .map(|r| r.label.clone())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Number of requests recorded.
    #[must_use]
    pub fn len(&self) -> usize {
        self.inner.lock().len()
    }

    /// Whether no requests have been recorded yet.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.inner.lock().is_empty()
    }
}

/// Outcome observed for a single cancellation attempt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome {
    /// The transport returned a response with this status code.
    Status(u16),
    /// The transport failed before a response was received.
    NetworkError(String),
}

/// Ephemeral record of one attempt within a cancellation phase.
///
/// Exists only while a cancellation is in flight; used for logging and
/// telemetry, never persisted.
#[derive(Debug, Clone)]
pub struct CancellationAttempt {
    /// Which phase the attempt belongs to ([`RequestKind::Abort`] or
    /// [`RequestKind::VerifyNoParts`]).
    pub kind: RequestKind,
    /// Zero-based attempt counter within the phase.
    pub attempt_index: u32,
    /// What the attempt observed.
    pub outcome: AttemptOutcome,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
