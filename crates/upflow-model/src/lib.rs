//! Data model for the Upflow chunked-upload driver.
//!
//! This crate holds the pure data side of the driver: upload session state,
//! the observable per-session request log, retry configuration, endpoint
//! construction, and the JSON wire types exchanged with the storage service.
//! All protocol behavior (transports, retries, notifications) lives in
//! `upflow-core`.

mod config;
mod endpoints;
mod request;
mod session;
mod wire;

pub use config::{RetryPolicy, merge_headers};
pub use endpoints::Endpoints;
pub use request::{AttemptOutcome, CancellationAttempt, RequestKind, RequestLog, RequestRecord};
pub use session::{CallbackLedger, UploadSession, UploadStatus, UploadedPart};
pub use wire::{
    CompleteRequest, CompletedPart, InitiateResponse, ListPartsResponse, PartSummary,
};
