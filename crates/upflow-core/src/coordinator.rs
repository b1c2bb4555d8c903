//! The cancellation coordinator.
//!
//! Given an active session, issues the abort request, interprets its
//! outcome, verifies that no orphaned parts remain, retries transient
//! failures with bounded backoff, and fires the `cancelled` notification
//! at most once.
//!
//! The two phases escalate differently on retry exhaustion: an
//! unconfirmed abort is a `CancelFailed` outcome with no notification
//! (the server-side session may still hold parts), while an unconfirmed
//! verification only degrades the confirmation — the authoritative abort
//! already succeeded, so cancellation is still declared successful.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use upflow_model::{
    AttemptOutcome, CancellationAttempt, Endpoints, ListPartsResponse, RequestKind, UploadSession,
    UploadStatus, merge_headers,
};

use crate::backoff::BackoffPolicy;
use crate::notify::Notifier;
use crate::transport::{Transport, TransportRequest};

/// Terminal outcome of a `cancel` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CancelOutcome {
    /// The abort succeeded (or the session was already gone); `cancelled`
    /// has fired.
    Cancelled,
    /// The abort phase exhausted its retries; `cancelled` did not fire and
    /// the session requires external intervention or a fresh `cancel`.
    CancelFailed,
}

/// Resolution of a single cancellation phase.
///
/// Modeled as its own two-outcome type rather than a boolean so the
/// asymmetric escalation rules of the two phases stay independently
/// visible and testable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// The phase observed its desired end state.
    Confirmed,
    /// The phase exhausted its retry budget without confirmation.
    NotConfirmed,
}

/// Orchestrates the abort and verification requests for one session.
///
/// Shares no mutable state across sessions: the transport is behind an
/// `Arc`, and the backoff policy and endpoints are per-upload read-only
/// configuration.
#[derive(Debug)]
pub struct CancelCoordinator<T> {
    transport: Arc<T>,
    backoff: BackoffPolicy,
    endpoints: Endpoints,
}

impl<T: Transport> CancelCoordinator<T> {
    /// Create a coordinator for one session's configuration.
    #[must_use]
    pub fn new(transport: Arc<T>, backoff: BackoffPolicy, endpoints: Endpoints) -> Self {
        Self {
            transport,
            backoff,
            endpoints,
        }
    }

    /// Cancel the given session.
    ///
    /// Resolves to one of the two terminal outcomes; never errors. The
    /// caller is responsible for rejecting sessions that are already
    /// `Cancelled` before delegating here.
    pub async fn cancel(&self, session: &mut UploadSession, notifier: &Notifier) -> CancelOutcome {
        session.set_status(UploadStatus::Cancelling);
        debug!(upload_id = %session.id, "cancellation started");

        if self.abort_phase(session).await == Confirmation::NotConfirmed {
            session.set_status(UploadStatus::CancelFailed);
            warn!(upload_id = %session.id, "cancellation failed: abort not confirmed");
            return CancelOutcome::CancelFailed;
        }

        if self.verify_phase(session).await == Confirmation::NotConfirmed {
            // Degraded success: the abort itself was acknowledged, only the
            // confirmation step timed out. Orphaned parts may remain.
            warn!(upload_id = %session.id, "cleanup verification not confirmed");
        }

        notifier.fire_cancelled(session);
        session.set_status(UploadStatus::Cancelled);
        debug!(upload_id = %session.id, "cancellation resolved");
        CancelOutcome::Cancelled
    }

    /// Abort phase: `DELETE` on the session endpoint.
    ///
    /// `404` means the session is already gone server-side (prior abort,
    /// expiry, or a completion racing the cancel) and counts as success
    /// without retry.
    async fn abort_phase(&self, session: &UploadSession) -> Confirmation {
        let (method, url) = self.endpoints.abort(&session.id);
        let headers = merge_headers(&HashMap::new(), &session.headers_common);
        let log = session.log();
        let mut attempt_index: u32 = 0;

        loop {
            log.record(RequestKind::Abort);
            let request = TransportRequest::new(method.clone(), url.clone(), headers.clone());

            let outcome = match self.transport.send(request).await {
                Ok(resp) if resp.is_success() || resp.is_gone() => {
                    debug!(
                        upload_id = %session.id,
                        status = resp.status.as_u16(),
                        "abort acknowledged"
                    );
                    return Confirmation::Confirmed;
                }
                Ok(resp) => AttemptOutcome::Status(resp.status.as_u16()),
                Err(err) => AttemptOutcome::NetworkError(err.to_string()),
            };

            let attempt = CancellationAttempt {
                kind: RequestKind::Abort,
                attempt_index,
                outcome,
            };
            match self.backoff.delay_before(RequestKind::Abort, attempt_index) {
                Some(delay) => {
                    warn!(upload_id = %session.id, ?attempt, ?delay, "abort failed, backing off");
                    tokio::time::sleep(delay).await;
                    attempt_index += 1;
                }
                None => {
                    warn!(upload_id = %session.id, ?attempt, "abort retry budget exhausted");
                    return Confirmation::NotConfirmed;
                }
            }
        }
    }

    /// Verification phase: `GET` on the list-remaining-parts endpoint.
    ///
    /// `404` or a 2xx listing with zero parts confirms cleanup. A 2xx
    /// listing that still reports parts is not-yet-confirmed and retried
    /// like any other failure.
    async fn verify_phase(&self, session: &UploadSession) -> Confirmation {
        let (method, url) = self.endpoints.list_parts(&session.id);
        let headers = merge_headers(&HashMap::new(), &session.headers_common);
        let log = session.log();
        let mut attempt_index: u32 = 0;

        loop {
            log.record(RequestKind::VerifyNoParts);
            let request = TransportRequest::new(method.clone(), url.clone(), headers.clone());

            let outcome = match self.transport.send(request).await {
                Ok(resp) if resp.is_gone() => {
                    debug!(upload_id = %session.id, "cleanup confirmed: session gone");
                    return Confirmation::Confirmed;
                }
                Ok(resp) if resp.is_success() => match remaining_parts(&resp.body) {
                    Some(0) => {
                        debug!(upload_id = %session.id, "cleanup confirmed: no parts remain");
                        return Confirmation::Confirmed;
                    }
                    Some(count) => {
                        warn!(upload_id = %session.id, remaining = count, "parts still present");
                        AttemptOutcome::Status(resp.status.as_u16())
                    }
                    None => AttemptOutcome::Status(resp.status.as_u16()),
                },
                Ok(resp) => AttemptOutcome::Status(resp.status.as_u16()),
                Err(err) => AttemptOutcome::NetworkError(err.to_string()),
            };

            let attempt = CancellationAttempt {
                kind: RequestKind::VerifyNoParts,
                attempt_index,
                outcome,
            };
            match self
                .backoff
                .delay_before(RequestKind::VerifyNoParts, attempt_index)
            {
                Some(delay) => {
                    warn!(upload_id = %session.id, ?attempt, ?delay, "verify failed, backing off");
                    tokio::time::sleep(delay).await;
                    attempt_index += 1;
                }
                None => return Confirmation::NotConfirmed,
            }
        }
    }
}

/// Number of parts a 2xx listing body still attributes to the session.
///
/// An empty body counts as an empty listing; an unparseable body is
/// `None` (treated as a retryable failure by the caller).
fn remaining_parts(body: &[u8]) -> Option<usize> {
    if body.is_empty() {
        return Some(0);
    }
    serde_json::from_slice::<ListPartsResponse>(body)
        .ok()
        .map(|listing| listing.parts.len())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
