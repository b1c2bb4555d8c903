//! Error types for the upload driver.

use crate::transport::TransportError;

/// Driver error type.
///
/// Retryable cancellation failures are handled inside the coordinator and
/// never surface here; these variants cover the happy path and the two
/// entry-point rejections of `cancel`.
#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    /// The upload id is not present in the session registry.
    #[error("unknown upload: {upload_id}")]
    UnknownUpload {
        /// The id that could not be resolved.
        upload_id: String,
    },

    /// Cancellation was requested for a session that is already cancelled.
    #[error("upload already cancelled: {upload_id}")]
    AlreadyCancelled {
        /// The id of the cancelled session.
        upload_id: String,
    },

    /// The initiate request failed or returned no usable session id.
    #[error("initiate failed for {object_key}: {reason}")]
    Initiate {
        /// The object key being uploaded.
        object_key: String,
        /// What went wrong.
        reason: String,
    },

    /// A part upload failed.
    #[error("upload of part {part_number} failed: {reason}")]
    PartUpload {
        /// The part number that failed (1-based).
        part_number: u32,
        /// What went wrong.
        reason: String,
    },

    /// The complete request failed.
    #[error("complete failed for upload {upload_id}: {reason}")]
    Complete {
        /// The id of the session being completed.
        upload_id: String,
        /// What went wrong.
        reason: String,
    },

    /// Transport-level failure outside the retrying cancellation path.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// Internal error with context.
    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

/// Convenience result type for driver operations.
pub type UploadResult<T> = Result<T, UploadError>;
