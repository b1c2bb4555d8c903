//! Happy-path upload operations: initiate, upload part, complete.
//!
//! These perform no retries of their own: retry semantics are specified
//! for the cancellation phases only; everything here surfaces the first
//! failure to the caller.

use std::collections::HashMap;
use std::sync::Arc;

use bytes::Bytes;
use chrono::Utc;
use tokio::sync::Mutex;
use tracing::debug;

use upflow_model::{
    CompleteRequest, CompletedPart, Endpoints, InitiateResponse, RequestKind, RequestLog,
    UploadSession, UploadStatus, UploadedPart, merge_headers,
};

use crate::driver::{SessionEntry, UploadConfig, UploadDriver};
use crate::error::{UploadError, UploadResult};
use crate::notify::Notifier;
use crate::transport::{Transport, TransportRequest};

impl<T: Transport> UploadDriver<T> {
    /// Initiate an upload session.
    ///
    /// Sends the initiate request with `headers_at_initiate` layered over
    /// `headers_common`, registers the session under the server-issued id,
    /// and fires the `started` observer. Returns the upload id.
    pub async fn initiate(&self, config: UploadConfig) -> UploadResult<String> {
        let endpoints = Endpoints::new(&config.base_url, &config.object_key);
        let (method, url) = endpoints.initiate();
        let headers = merge_headers(&config.headers_common, &config.headers_at_initiate);

        let log = RequestLog::default();
        log.record(RequestKind::Initiate);

        let response = self
            .transport()
            .send(TransportRequest::new(method, url, headers))
            .await
            .map_err(|e| UploadError::Initiate {
                object_key: config.object_key.clone(),
                reason: e.to_string(),
            })?;

        if !response.is_success() {
            return Err(UploadError::Initiate {
                object_key: config.object_key.clone(),
                reason: format!("status {}", response.status),
            });
        }

        let parsed: InitiateResponse =
            serde_json::from_slice(&response.body).map_err(|e| UploadError::Initiate {
                object_key: config.object_key.clone(),
                reason: format!("invalid initiate response: {e}"),
            })?;
        let upload_id = parsed.upload_id;

        let mut session = UploadSession::new(
            upload_id.clone(),
            config.object_key.clone(),
            config.headers_common.clone(),
            config.headers_at_initiate.clone(),
            log.clone(),
        );
        let notifier = Notifier::new(config.started.clone(), config.cancelled.clone());
        notifier.fire_started(&mut session);

        debug!(upload_id = %upload_id, object_key = %config.object_key, "upload initiated");

        self.insert(
            upload_id.clone(),
            SessionEntry {
                session: Arc::new(Mutex::new(session)),
                notifier,
                backoff: Self::make_backoff(config.retry, config.retry_eligible.clone()),
                endpoints,
                log,
            },
        );
        Ok(upload_id)
    }

    /// Upload one part. Returns the entity tag the server assigned.
    pub async fn upload_part(
        &self,
        upload_id: &str,
        part_number: u32,
        body: Bytes,
    ) -> UploadResult<String> {
        let entry = self.entry(upload_id)?;
        let mut session = entry.session.lock().await;

        let (method, url) = entry.endpoints.upload_part(upload_id, part_number);
        let headers = merge_headers(&HashMap::new(), &session.headers_common);
        let size = body.len() as u64;

        entry.log.record(RequestKind::UploadPart(part_number));
        let response = self
            .transport()
            .send(TransportRequest::new(method, url, headers).with_body(body))
            .await
            .map_err(|e| UploadError::PartUpload {
                part_number,
                reason: e.to_string(),
            })?;

        if !response.is_success() {
            return Err(UploadError::PartUpload {
                part_number,
                reason: format!("status {}", response.status),
            });
        }

        let etag = response.header("etag").unwrap_or_default().to_owned();
        session.put_part(UploadedPart {
            part_number,
            etag: etag.clone(),
            size,
            uploaded_at: Utc::now(),
        });

        debug!(upload_id = %upload_id, part_number, size, "part uploaded");
        Ok(etag)
    }

    /// Complete the upload, assembling all recorded parts in ascending
    /// part-number order.
    pub async fn complete(&self, upload_id: &str) -> UploadResult<()> {
        let entry = self.entry(upload_id)?;
        let mut session = entry.session.lock().await;
        session.set_status(UploadStatus::Completing);

        let body = CompleteRequest {
            parts: session
                .parts
                .values()
                .map(|p| CompletedPart {
                    part_number: p.part_number,
                    etag: p.etag.clone(),
                })
                .collect(),
        };
        let payload =
            serde_json::to_vec(&body).map_err(|e| UploadError::Internal(anyhow::anyhow!(e)))?;

        let (method, url) = entry.endpoints.complete(upload_id);
        let headers = merge_headers(&HashMap::new(), &session.headers_common);

        entry.log.record(RequestKind::Complete);
        let response = self
            .transport()
            .send(TransportRequest::new(method, url, headers).with_body(Bytes::from(payload)))
            .await
            .map_err(|e| UploadError::Complete {
                upload_id: upload_id.to_owned(),
                reason: e.to_string(),
            })?;

        if !response.is_success() {
            return Err(UploadError::Complete {
                upload_id: upload_id.to_owned(),
                reason: format!("status {}", response.status),
            });
        }

        session.set_status(UploadStatus::Completed);
        debug!(upload_id = %upload_id, parts = session.parts_count(), "upload completed");
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
