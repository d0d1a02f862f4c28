//! Decoder for the service's uniform `{status, data, message}` envelope.
//!
//! Every response, list or add, success or rejection, arrives wrapped in
//! this shape with HTTP 200; the real failure signal is the `status` tag.
//! The envelope is transient — it is decoded, translated into a payload or
//! an [`ApiError`], and discarded. Callers never see it. `message` lives
//! inside `data`, which is where the service actually puts it.

use serde::Deserialize;
use serde_json::Value;

use crate::error::{ApiError, ApiStatus};

/// A closed tag set: a status string outside these three is a decode
/// error, not a silently tolerated unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
enum Status {
    Success,
    Fail,
    Error,
}

#[derive(Debug, Deserialize)]
struct Envelope {
    status: Status,
    #[serde(default)]
    data: EnvelopeData,
}

/// The `data` payload of a successful envelope.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct EnvelopeData {
    /// Count of matching records on the server, which may exceed the page.
    #[serde(default)]
    pub total: u64,
    /// Raw transaction objects, decoded individually by the codec.
    #[serde(default)]
    pub transactions: Vec<Value>,
    #[serde(default)]
    message: Option<String>,
}

/// Parse an envelope body, returning the data payload on `success` and an
/// [`ApiError::Api`] carrying the server's verbatim message otherwise.
pub(crate) fn decode(body: &str) -> Result<EnvelopeData, ApiError> {
    let envelope: Envelope = serde_json::from_str(body)
        .map_err(|e| ApiError::Decode(format!("malformed response envelope: {e}")))?;
    let status = match envelope.status {
        Status::Success => return Ok(envelope.data),
        Status::Fail => ApiStatus::Fail,
        Status::Error => ApiStatus::Error,
    };
    Err(ApiError::Api {
        status,
        message: envelope.data.message.unwrap_or_default(),
    })
}
