//! Backoff policy: retry eligibility plus bounded, capped delays.
//!
//! One component answers both retry questions: *whether* a request kind
//! may ever retry (injectable predicate) and *how many times / how long*
//! (`max_retries` bound, exponential delay capped by
//! `backoff_base_secs`). The delay curve itself is not load-bearing; the
//! count ceiling and per-kind eligibility are.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use upflow_model::{RequestKind, RetryPolicy};

/// Millisecond seed for the exponential curve.
const BACKOFF_SEED_MS: u64 = 100;

/// Decides whether a request kind is ever eligible for retry.
pub type RetryEligibility = Arc<dyn Fn(RequestKind) -> bool + Send + Sync>;

/// Deterministic backoff decisions for one upload's retry configuration.
#[derive(Clone)]
pub struct BackoffPolicy {
    policy: RetryPolicy,
    eligible: RetryEligibility,
}

impl fmt::Debug for BackoffPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BackoffPolicy")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl BackoffPolicy {
    /// Create a policy under which every request kind is retryable.
    #[must_use]
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            policy,
            eligible: Arc::new(|_| true),
        }
    }

    /// Create a policy with an injected per-kind eligibility predicate.
    #[must_use]
    pub fn with_eligibility(policy: RetryPolicy, eligible: RetryEligibility) -> Self {
        Self { policy, eligible }
    }

    /// The delay to wait before retrying after failed attempt
    /// `attempt_index` (zero-based), or `None` when the attempt must not
    /// be retried, because the kind is ineligible or the retry budget
    /// (`max_retries` additional attempts) is exhausted.
    ///
    /// Deterministic function of its inputs; no hidden state.
    #[must_use]
    pub fn delay_before(&self, kind: RequestKind, attempt_index: u32) -> Option<Duration> {
        if !(self.eligible)(kind) {
            return None;
        }
        if attempt_index >= self.policy.max_retries {
            return None;
        }
        Some(delay_for_attempt(
            attempt_index,
            self.policy.backoff_base_secs,
        ))
    }

    /// The configured retry budget.
    #[must_use]
    pub fn max_retries(&self) -> u32 {
        self.policy.max_retries
    }
}

/// Exponential delay seeded at [`BACKOFF_SEED_MS`], capped at `cap_secs`.
fn delay_for_attempt(attempt_index: u32, cap_secs: f64) -> Duration {
    let exp = attempt_index.min(16);
    let uncapped = BACKOFF_SEED_MS.saturating_mul(2u64.saturating_pow(exp));
    let cap = Duration::from_secs_f64(cap_secs.max(0.0));
    Duration::from_millis(uncapped).min(cap)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
