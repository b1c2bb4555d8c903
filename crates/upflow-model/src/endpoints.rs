//! Endpoint construction for the five protocol operations.

use http::Method;

/// Builds method + URL pairs for one object's upload endpoints.
#[derive(Debug, Clone)]
pub struct Endpoints {
    base_url: String,
    object_key: String,
}

impl Endpoints {
    /// Create an endpoint builder for one object key.
    #[must_use]
    pub fn new(base_url: &str, object_key: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_owned(),
            object_key: object_key.trim_matches('/').to_owned(),
        }
    }

    fn uploads_url(&self) -> String {
        format!("{}/{}/uploads", self.base_url, self.object_key)
    }

    /// `POST .../uploads`: create the upload session.
    #[must_use]
    pub fn initiate(&self) -> (Method, String) {
        (Method::POST, self.uploads_url())
    }

    /// `PUT .../uploads/{id}?partNumber=N`: upload part N.
    #[must_use]
    pub fn upload_part(&self, upload_id: &str, part_number: u32) -> (Method, String) {
        (
            Method::PUT,
            format!("{}/{upload_id}?partNumber={part_number}", self.uploads_url()),
        )
    }

    /// `POST .../uploads/{id}`: assemble the uploaded parts.
    #[must_use]
    pub fn complete(&self, upload_id: &str) -> (Method, String) {
        (Method::POST, format!("{}/{upload_id}", self.uploads_url()))
    }

    /// `DELETE .../uploads/{id}`: abort the session.
    #[must_use]
    pub fn abort(&self, upload_id: &str) -> (Method, String) {
        (Method::DELETE, format!("{}/{upload_id}", self.uploads_url()))
    }

    /// `GET .../uploads/{id}`: list remaining parts (verification).
    #[must_use]
    pub fn list_parts(&self, upload_id: &str) -> (Method, String) {
        (Method::GET, format!("{}/{upload_id}", self.uploads_url()))
    }
}
