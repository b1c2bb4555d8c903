//! Upload session state management.
//!
//! Tracks one in-flight chunked upload: the server-issued session id, the
//! header configuration applied to its requests, the parts uploaded so far,
//! and the lifecycle status. Created at initiate time and mutated by the
//! driver until a terminal status is reached.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};

use crate::request::RequestLog;

/// Lifecycle status of an upload session.
///
/// Transitions are monotonic: retries within a phase never change the
/// status; only phase boundaries do. `Cancelled` is fully terminal,
/// `CancelFailed` admits a fresh cancellation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStatus {
    /// Initiated; parts may be uploaded.
    Active,
    /// A complete request is in flight.
    Completing,
    /// The complete request succeeded.
    Completed,
    /// A cancellation is in flight.
    Cancelling,
    /// Cancellation resolved successfully.
    Cancelled,
    /// Cancellation exhausted its abort retries; external intervention or a
    /// fresh cancel call is required.
    CancelFailed,
}

impl UploadStatus {
    /// Whether a transition from `self` to `next` is allowed.
    #[must_use]
    pub fn permits(self, next: UploadStatus) -> bool {
        use UploadStatus::{Active, CancelFailed, Cancelled, Cancelling, Completed, Completing};
        matches!(
            (self, next),
            (Active, Completing | Cancelling)
                | (Completing, Completed | Cancelling)
                | (Completed, Cancelling)
                | (Cancelling, Cancelled | CancelFailed)
                | (CancelFailed, Cancelling)
        )
    }
}

/// At-most-once delivery guard for the `started` and `cancelled` callbacks.
///
/// Retry loops may resolve the same outcome more than once; the ledger makes
/// sure each notification reaches the observer a single time per session.
#[derive(Debug, Clone, Copy, Default)]
pub struct CallbackLedger {
    started_fired: bool,
    cancelled_fired: bool,
}

impl CallbackLedger {
    /// Claim the `started` notification. Returns `true` on the first claim
    /// and `false` on every subsequent one.
    pub fn claim_started(&mut self) -> bool {
        let first = !self.started_fired;
        self.started_fired = true;
        first
    }

    /// Claim the `cancelled` notification. Returns `true` on the first claim
    /// and `false` on every subsequent one.
    pub fn claim_cancelled(&mut self) -> bool {
        let first = !self.cancelled_fired;
        self.cancelled_fired = true;
        first
    }

    /// Whether `started` has been delivered.
    #[must_use]
    pub fn started_fired(&self) -> bool {
        self.started_fired
    }

    /// Whether `cancelled` has been delivered.
    #[must_use]
    pub fn cancelled_fired(&self) -> bool {
        self.cancelled_fired
    }
}

/// A single part recorded against an upload session.
#[derive(Debug, Clone)]
pub struct UploadedPart {
    /// The part number (1-based).
    pub part_number: u32,
    /// The entity tag returned by the server for this part.
    pub etag: String,
    /// Size of this part in bytes.
    pub size: u64,
    /// When this part was uploaded.
    pub uploaded_at: DateTime<Utc>,
}

/// An in-flight chunked upload session.
///
/// The `id` is issued by the server at initiate time and is immutable
/// afterwards. The request log is a shared handle: every request the driver
/// issues for this session is appended to it, in order, and external
/// collaborators may clone the handle to observe the sequence.
#[derive(Debug)]
pub struct UploadSession {
    /// Opaque session token issued by the server.
    pub id: String,
    /// The object key this upload will create.
    pub object_key: String,
    /// Headers merged into every request for this session.
    pub headers_common: HashMap<String, String>,
    /// Headers applied only to the initiate request.
    pub headers_at_initiate: HashMap<String, String>,
    /// Parts uploaded so far, keyed by part number (1-based).
    pub parts: BTreeMap<u32, UploadedPart>,
    /// When the session was initiated.
    pub initiated: DateTime<Utc>,
    /// At-most-once notification ledger.
    pub ledger: CallbackLedger,
    status: UploadStatus,
    log: RequestLog,
}

impl UploadSession {
    /// Create a new session in the `Active` state.
    #[must_use]
    pub fn new(
        id: String,
        object_key: String,
        headers_common: HashMap<String, String>,
        headers_at_initiate: HashMap<String, String>,
        log: RequestLog,
    ) -> Self {
        Self {
            id,
            object_key,
            headers_common,
            headers_at_initiate,
            parts: BTreeMap::new(),
            initiated: Utc::now(),
            ledger: CallbackLedger::default(),
            status: UploadStatus::Active,
            log,
        }
    }

    /// Current lifecycle status.
    #[must_use]
    pub fn status(&self) -> UploadStatus {
        self.status
    }

    /// Move the session to a new status.
    ///
    /// Transitions must be permitted by [`UploadStatus::permits`]; setting
    /// the current status again is a no-op.
    pub fn set_status(&mut self, next: UploadStatus) {
        debug_assert!(
            self.status == next || self.status.permits(next),
            "illegal status transition {:?} -> {next:?}",
            self.status,
        );
        self.status = next;
    }

    /// Shared handle to this session's request log.
    #[must_use]
    pub fn log(&self) -> RequestLog {
        self.log.clone()
    }

    /// Insert or replace a part.
    pub fn put_part(&mut self, part: UploadedPart) {
        self.parts.insert(part.part_number, part);
    }

    /// Get a part by its number.
    #[must_use]
    pub fn get_part(&self, part_number: u32) -> Option<&UploadedPart> {
        self.parts.get(&part_number)
    }

    /// Number of parts recorded so far.
    #[must_use]
    pub fn parts_count(&self) -> usize {
        self.parts.len()
    }

    /// Total size of all recorded parts.
    #[must_use]
    pub fn total_size(&self) -> u64 {
        self.parts.values().map(|p| p.size).sum()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
