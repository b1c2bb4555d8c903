//! JSON wire types exchanged with the storage service.

use serde::{Deserialize, Serialize};

/// Response body of the initiate request.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitiateResponse {
    /// The server-issued session token.
    pub upload_id: String,
}

/// One part as reported by the list-remaining-parts endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartSummary {
    /// The part number (1-based).
    pub part_number: u32,
    /// The entity tag of the stored part.
    pub etag: String,
    /// Size of the stored part in bytes.
    #[serde(default)]
    pub size: u64,
}

/// Response body of the list-remaining-parts (verification) request.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPartsResponse {
    /// Parts still attributed to the session.
    #[serde(default)]
    pub parts: Vec<PartSummary>,
}

/// One entry of the complete request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedPart {
    /// The part number (1-based).
    pub part_number: u32,
    /// The entity tag recorded when the part was uploaded.
    pub etag: String,
}

/// Request body of the complete request: all parts, ascending part number.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteRequest {
    /// The parts to assemble.
    pub parts: Vec<CompletedPart>,
}
