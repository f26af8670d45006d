//! # Domain Invariants
//!
//! Business rules for request/callback correlation.

use super::entities::PendingRecord;
use super::errors::CorrelationError;

/// Invariant: the gateway's correlation id is the success signal.
///
/// An empty id means the dispatch did not take effect.
pub fn invariant_correlation_id_present(correlation_id: &str) -> bool {
    !correlation_id.trim().is_empty()
}

/// Invariant: a record is created at most once.
///
/// `existing` is the raw value currently stored under the record key.
/// An empty value counts as absent.
pub fn invariant_create_once(
    correlation_id: &str,
    existing: Option<&[u8]>,
) -> Result<(), CorrelationError> {
    match existing {
        Some(bytes) if !bytes.is_empty() => Err(CorrelationError::DuplicateRequest(
            correlation_id.to_string(),
        )),
        _ => Ok(()),
    }
}

/// Invariant: completion preserves the record's identity and input.
pub fn invariant_completion_preserves_input(before: &PendingRecord, after: &PendingRecord) -> bool {
    before.correlation_id == after.correlation_id && before.input == after.input
}

/// Invariant: a required caller field is not blank.
pub fn invariant_non_blank(field: &str, value: &str) -> Result<(), CorrelationError> {
    if value.trim().is_empty() {
        return Err(CorrelationError::InvalidInput(format!(
            "{} must not be empty",
            field
        )));
    }
    Ok(())
}
