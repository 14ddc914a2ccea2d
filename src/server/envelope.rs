// src/server/envelope.rs

//! Optional JSON body of a push-style delivery.

use serde::Deserialize;

/// `{ "message": { "data": "...", "id": "..." }, "subscription": "..." }`
///
/// `data` is kept as delivered (base64 text); nothing in the run depends on
/// it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PushEnvelope {
    #[serde(default)]
    pub message: PushMessage,

    #[serde(default)]
    pub subscription: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct PushMessage {
    #[serde(default)]
    pub data: Option<String>,

    #[serde(default)]
    pub id: String,
}

/// Parse a request body. An empty body is not an error: it just means the
/// request wasn't a push delivery.
pub fn parse(body: &[u8]) -> Result<Option<PushEnvelope>, serde_json::Error> {
    if body.is_empty() {
        return Ok(None);
    }
    serde_json::from_slice(body).map(Some)
}
