//! Upflow core: the chunked-upload driver and its cancellation coordinator.
//!
//! The driver orchestrates the happy path (initiate → upload parts →
//! complete) over a pluggable [`Transport`], and the cancellation
//! coordinator tears down server-side resources (the open session and any
//! already-stored parts) under unreliable network conditions, with bounded
//! backoff and at-most-once observer notifications.

mod backoff;
mod coordinator;
mod driver;
mod error;
mod notify;
mod transport;
mod uploader;

pub use backoff::{BackoffPolicy, RetryEligibility};
pub use coordinator::{CancelCoordinator, CancelOutcome, Confirmation};
pub use driver::{UploadConfig, UploadDriver};
pub use error::{UploadError, UploadResult};
pub use notify::{Callback, Notifier};
pub use transport::{Transport, TransportError, TransportRequest, TransportResponse};
