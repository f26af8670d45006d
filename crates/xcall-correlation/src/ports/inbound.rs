//! # Inbound Ports
//!
//! API trait defining what the correlation engine exposes to its host
//! contract layer.

use crate::domain::{CallIntent, CorrelationError, CorrelationId, PendingRecord, RecordState};
use async_trait::async_trait;

/// Correlation API - inbound port.
#[async_trait]
pub trait CorrelationApi: Send + Sync {
    /// Dispatch a service-style call and track it.
    ///
    /// `input` must be a JSON document. Blank callback parts mean fire-and-forget.
    async fn submit_service_call(
        &self,
        service_name: &str,
        input: &str,
        callback_contract: Option<&str>,
        callback_function: Option<&str>,
        timeout: u64,
    ) -> Result<CorrelationId, CorrelationError>;

    /// Dispatch a direct cross-chain call and track it.
    async fn submit_direct_call(
        &self,
        destination_chain_id: &str,
        destination_contract: &str,
        semantics_verb: &str,
        arguments: &[String],
        callback_contract: Option<&str>,
        callback_function: Option<&str>,
    ) -> Result<CorrelationId, CorrelationError>;

    /// Dispatch an already-typed intent and track it.
    async fn submit_intent(&self, intent: &CallIntent) -> Result<CorrelationId, CorrelationError>;

    /// Reconcile an inbound callback against its pending record.
    fn resolve_callback(&self, raw_payload: &str) -> Result<(), CorrelationError>;

    /// Get a record by correlation id.
    fn get_record(&self, correlation_id: &str) -> Result<PendingRecord, CorrelationError>;

    /// List records, optionally only those in `state`.
    fn list_records(
        &self,
        state: Option<RecordState>,
    ) -> Result<Vec<PendingRecord>, CorrelationError>;
}
