//! # Callback Codec
//!
//! Decodes the single string payload delivered to the callback function.

use crate::domain::{CallbackPayload, CorrelationError};

/// Parse an inbound callback payload.
///
/// Anything that is not a JSON object with the callback field tags is
/// rejected before the store is touched.
pub fn parse_callback(raw: &str) -> Result<CallbackPayload, CorrelationError> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Err(CorrelationError::MalformedCallback(
            "empty payload".to_string(),
        ));
    }
    serde_json::from_str(raw).map_err(|e| CorrelationError::MalformedCallback(e.to_string()))
}

/// Encode a callback payload, as a relay would deliver it.
pub fn encode_callback(payload: &CallbackPayload) -> Result<String, CorrelationError> {
    serde_json::to_string(payload).map_err(|e| CorrelationError::MalformedCallback(e.to_string()))
}
