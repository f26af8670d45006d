//! # Callback Resolver
//!
//! Matches an inbound callback to its pending record and writes the output.
//!
//! A remote error still completes the record: the error is logged and the
//! payload's `output` (empty when absent) is stored.

use super::pending_store::PendingRequestStore;
use crate::algorithms::parse_callback;
use crate::domain::{CorrelationError, PendingRecord};
use crate::metrics::CorrelationMetrics;
use crate::ports::outbound::LedgerStore;
use std::sync::Arc;
use xcall_telemetry::log_callback_event;

/// Resolves callbacks against a [`PendingRequestStore`].
pub struct CallbackResolver<S: LedgerStore> {
    store: Arc<PendingRequestStore<S>>,
    metrics: Arc<CorrelationMetrics>,
}

impl<S: LedgerStore> CallbackResolver<S> {
    /// Create a resolver.
    pub fn new(store: Arc<PendingRequestStore<S>>, metrics: Arc<CorrelationMetrics>) -> Self {
        Self { store, metrics }
    }

    /// Parse `raw_payload` and complete the matching record.
    ///
    /// Nothing is written unless the payload parses and names a known record.
    pub fn resolve(&self, raw_payload: &str) -> Result<PendingRecord, CorrelationError> {
        self.try_resolve(raw_payload).inspect_err(|e| {
            self.metrics.record_callback_rejected();
            tracing::warn!("[xcall] callback rejected: {}", e);
        })
    }

    fn try_resolve(&self, raw_payload: &str) -> Result<PendingRecord, CorrelationError> {
        let payload = parse_callback(raw_payload)?;
        let correlation_id = payload.correlation_id.as_str();

        if correlation_id.trim().is_empty() {
            return Err(CorrelationError::UnknownCorrelation(
                correlation_id.to_string(),
            ));
        }
        // Read first so an unknown id never reaches the write path.
        if let Err(e) = self.store.get(correlation_id) {
            return Err(match e {
                CorrelationError::NotFound(id) => CorrelationError::UnknownCorrelation(id),
                other => other,
            });
        }

        let remote_error = payload.is_error();
        if remote_error {
            log_callback_event!(
                warn,
                "callback carries remote error",
                correlation_id,
                error = payload.error_message.as_deref().unwrap_or_default(),
                upstream = payload.upstream_correlation_id.as_deref().unwrap_or_default()
            );
        }

        let output = payload.output.as_deref().unwrap_or_default();
        let record = self.store.complete(correlation_id, output)?;

        self.metrics.record_callback_resolved(remote_error);
        log_callback_event!(
            info,
            "callback resolved",
            correlation_id,
            output_len = output.len()
        );
        Ok(record)
    }
}
