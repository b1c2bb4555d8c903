//! Retry configuration and header merging.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

/// Per-upload retry configuration. Immutable after session creation.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RetryPolicy {
    /// Number of *additional* attempts after the first one.
    pub max_retries: u32,
    /// Upper bound, in seconds, on any single backoff delay.
    pub backoff_base_secs: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            backoff_base_secs: 30.0,
        }
    }
}

/// Merge request headers, with `overrides` winning on key collision.
///
/// Used to layer `headers_common` (and, at initiate time,
/// `headers_at_initiate`) over method-specific defaults.
#[must_use]
pub fn merge_headers(
    defaults: &HashMap<String, String>,
    overrides: &HashMap<String, String>,
) -> HashMap<String, String> {
    let mut merged = defaults.clone();
    for (name, value) in overrides {
        merged.insert(name.clone(), value.clone());
    }
    merged
}
