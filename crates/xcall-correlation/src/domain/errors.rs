//! # Domain Errors
//!
//! Error types for request/callback correlation.
//!
//! Every error is returned synchronously to the caller of the entry point that
//! raised it. Nothing here is retried internally.

use thiserror::Error;

/// Correlation identifier assigned by the dispatch gateway.
pub type CorrelationId = String;

/// Correlation error types.
#[derive(Debug, Error)]
pub enum CorrelationError {
    /// Caller-supplied input could not be parsed into the expected shape.
    /// Raised before anything reaches the dispatch gateway.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Remote invocation failed. The request never took effect and may be
    /// resubmitted from scratch.
    #[error("Dispatch failed: {0}")]
    Dispatch(#[from] DispatchFailure),

    /// Dispatch succeeded but the pending record could not be written.
    /// The remote side believes the call is tracked.
    #[error("Persistence failed for {correlation_id}: {reason}")]
    Persistence {
        /// Identifier returned by the gateway for the dispatched call
        correlation_id: CorrelationId,
        /// Underlying store failure
        reason: String,
    },

    /// A pending record already exists for this identifier.
    #[error("Duplicate request: {0}")]
    DuplicateRequest(CorrelationId),

    /// No pending record exists for this identifier.
    #[error("Record not found: {0}")]
    NotFound(CorrelationId),

    /// A callback referenced an identifier the store never created.
    #[error("Unknown correlation id: {0:?}")]
    UnknownCorrelation(CorrelationId),

    /// The callback payload could not be decoded.
    #[error("Malformed callback: {0}")]
    MalformedCallback(String),

    /// The operation name is not in the host operation table.
    #[error("Unsupported operation: {0}")]
    UnsupportedOperation(String),

    /// A compare-and-swap write lost a race against another writer.
    #[error("Concurrent update of {0}")]
    ConcurrentUpdate(CorrelationId),

    /// Raw storage failure.
    #[error("Storage error: {0}")]
    Storage(#[from] LedgerError),
}

impl CorrelationError {
    /// Correlation id carried by the error, if the failure happened after dispatch.
    pub fn correlation_id(&self) -> Option<&str> {
        match self {
            Self::Persistence { correlation_id, .. }
            | Self::DuplicateRequest(correlation_id)
            | Self::NotFound(correlation_id)
            | Self::UnknownCorrelation(correlation_id)
            | Self::ConcurrentUpdate(correlation_id) => Some(correlation_id),
            _ => None,
        }
    }

    /// Whether the host may safely issue a fresh submit for the same intent.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Dispatch(_))
    }
}

/// Errors from the raw key-value store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    /// Backend failure (I/O, endorsement, ...).
    #[error("Backend error: {0}")]
    Backend(String),

    /// The store does not offer the requested primitive.
    #[error("Unsupported primitive: {0}")]
    Unsupported(&'static str),
}

/// Errors from the remote invocation primitive.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DispatchFailure {
    /// The call never reached the destination.
    #[error("Transport error: {0}")]
    Transport(String),

    /// The destination contract answered with a non-success status.
    #[error("Rejected by destination ({status}): {message}")]
    Rejected {
        /// Status code returned by the destination
        status: i32,
        /// Message returned by the destination
        message: String,
    },

    /// The destination answered without a correlation id.
    #[error("Destination returned an empty correlation id")]
    EmptyCorrelationId,
}
