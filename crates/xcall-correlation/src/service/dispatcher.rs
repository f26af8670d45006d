//! # Request Dispatcher
//!
//! Build envelope, dispatch, then persist the pending record under the id the
//! gateway returned.
//!
//! ## Failure ordering
//!
//! ```text
//! build fails      -> InvalidInput, nothing dispatched, nothing stored
//! dispatch fails   -> Dispatch, nothing stored
//! store fails      -> Persistence { correlation_id }, request already in flight
//! ```
//!
//! The last case cannot be rolled back. The error carries the id so the caller
//! can reconcile it.

use super::pending_store::PendingRequestStore;
use crate::algorithms::RequestEnvelopeBuilder;
use crate::domain::{
    invariant_correlation_id_present, CallIntent, CorrelationError, CorrelationId,
    DispatchFailure,
};
use crate::metrics::CorrelationMetrics;
use crate::ports::outbound::{DispatchGateway, LedgerStore};
use std::sync::Arc;
use xcall_telemetry::log_request_event;

/// Dispatches intents and records them for callback resolution.
pub struct RequestDispatcher<G: DispatchGateway, S: LedgerStore> {
    gateway: Arc<G>,
    store: Arc<PendingRequestStore<S>>,
    builder: RequestEnvelopeBuilder,
    metrics: Arc<CorrelationMetrics>,
}

impl<G: DispatchGateway, S: LedgerStore> RequestDispatcher<G, S> {
    /// Create a dispatcher.
    pub fn new(
        gateway: Arc<G>,
        store: Arc<PendingRequestStore<S>>,
        builder: RequestEnvelopeBuilder,
        metrics: Arc<CorrelationMetrics>,
    ) -> Self {
        Self {
            gateway,
            store,
            builder,
            metrics,
        }
    }

    /// Dispatch `intent` and return its correlation id.
    pub async fn submit(&self, intent: &CallIntent) -> Result<CorrelationId, CorrelationError> {
        let envelope = self.builder.build(intent).inspect_err(|e| {
            self.metrics.record_invalid_input();
            tracing::warn!("[xcall] rejected intent: {}", e);
        })?;

        let correlation_id = match self
            .gateway
            .dispatch(&envelope.destination, &envelope.args)
            .await
        {
            Ok(id) if invariant_correlation_id_present(&id) => id,
            Ok(_) => {
                self.metrics.record_dispatch_failure();
                tracing::warn!(
                    "[xcall] gateway {} returned no correlation id",
                    envelope.destination
                );
                return Err(DispatchFailure::EmptyCorrelationId.into());
            }
            Err(failure) => {
                self.metrics.record_dispatch_failure();
                tracing::warn!(
                    "[xcall] dispatch to {} failed: {}",
                    envelope.destination,
                    failure
                );
                return Err(failure.into());
            }
        };

        if let Err(e) = self.store.create(&correlation_id, &envelope.original_input) {
            self.metrics.record_persistence_failure();
            log_request_event!(
                error,
                "dispatcher",
                "request dispatched but not recorded",
                correlation_id,
                error = %e
            );
            return Err(CorrelationError::Persistence {
                correlation_id,
                reason: e.to_string(),
            });
        }

        self.metrics.record_submitted();
        log_request_event!(
            info,
            "dispatcher",
            "request dispatched",
            correlation_id,
            destination = %envelope.destination,
            semantics = %envelope.body.semantics(),
            mutating = envelope.body.semantics().is_mutating(),
            has_callback = envelope.body.callback().is_some()
        );
        Ok(correlation_id)
    }
}
