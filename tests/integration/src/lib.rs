//! End-to-end lifecycle tests for the Upflow upload driver.
//!
//! All tests run against [`ScriptedTransport`], an in-memory stand-in for
//! the storage service whose abort and verification answers are
//! configurable per test. No network is involved, so the suite runs under
//! a plain `cargo test`.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU16, AtomicUsize, Ordering};
use std::sync::{Arc, Once};

use async_trait::async_trait;
use bytes::Bytes;
use http::{Method, StatusCode};
use parking_lot::Mutex;

use upflow_core::{Transport, TransportError, TransportRequest, TransportResponse};

static INIT: Once = Once::new();

/// Initialize tracing (once).
pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
            )
            .with_test_writer()
            .init();
    });
}

/// In-memory storage service with scriptable cancellation answers.
///
/// The happy path always succeeds: initiate issues the fixed id `u-it`,
/// part uploads echo an ETag derived from the part number, and complete
/// returns 200. Abort (`DELETE`) and verification (`GET`) answer with the
/// configured status codes; the verification body is configurable for
/// remaining-parts scenarios. The last request headers per method are
/// captured for assertions.
pub struct ScriptedTransport {
    delete_status: AtomicU16,
    get_parts_status: AtomicU16,
    get_parts_body: Mutex<String>,
    headers_seen: Mutex<HashMap<String, HashMap<String, String>>>,
}

impl Default for ScriptedTransport {
    fn default() -> Self {
        Self {
            delete_status: AtomicU16::new(204),
            get_parts_status: AtomicU16::new(200),
            get_parts_body: Mutex::new(r#"{"parts":[]}"#.to_owned()),
            headers_seen: Mutex::new(HashMap::new()),
        }
    }
}

impl ScriptedTransport {
    /// Status answered to abort requests.
    pub fn set_delete_status(&self, status: u16) {
        self.delete_status.store(status, Ordering::SeqCst);
    }

    /// Status answered to verification requests.
    pub fn set_get_parts_status(&self, status: u16) {
        self.get_parts_status.store(status, Ordering::SeqCst);
    }

    /// Body answered to 2xx verification requests.
    pub fn set_get_parts_body(&self, body: &str) {
        *self.get_parts_body.lock() = body.to_owned();
    }

    /// Headers of the last request seen for a method.
    #[must_use]
    pub fn headers_for(&self, method: &Method) -> HashMap<String, String> {
        self.headers_seen
            .lock()
            .get(method.as_str())
            .cloned()
            .unwrap_or_default()
    }
}

#[async_trait]
impl Transport for ScriptedTransport {
    async fn send(&self, request: TransportRequest) -> Result<TransportResponse, TransportError> {
        self.headers_seen
            .lock()
            .insert(request.method.as_str().to_owned(), request.headers.clone());

        let mut headers = HashMap::new();
        let (status, body): (u16, Vec<u8>) = if request.method == Method::POST
            && request.url.ends_with("/uploads")
        {
            (201, br#"{"uploadId":"u-it"}"#.to_vec())
        } else if request.method == Method::PUT {
            let part = request.url.rsplit("partNumber=").next().unwrap_or_default();
            headers.insert("ETag".to_owned(), format!("\"etag-{part}\""));
            (200, Vec::new())
        } else if request.method == Method::POST {
            (200, Vec::new())
        } else if request.method == Method::DELETE {
            (self.delete_status.load(Ordering::SeqCst), Vec::new())
        } else if request.method == Method::GET {
            let status = self.get_parts_status.load(Ordering::SeqCst);
            let body = if (200..300).contains(&status) {
                self.get_parts_body.lock().clone().into_bytes()
            } else {
                Vec::new()
            };
            (status, body)
        } else {
            panic!("unexpected method: {}", request.method)
        };

        Ok(TransportResponse {
            status: StatusCode::from_u16(status).expect("status"),
            headers,
            body: Bytes::from(body),
        })
    }
}

/// Counter-backed observer callback for `started`/`cancelled` assertions.
#[must_use]
pub fn counting_callback(counter: &Arc<AtomicUsize>) -> upflow_core::Callback {
    let counter = Arc::clone(counter);
    Arc::new(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    })
}

mod test_lifecycle;
