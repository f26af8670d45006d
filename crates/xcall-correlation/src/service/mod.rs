//! # Service Layer
//!
//! Wires the dispatcher, resolver and pending store to injected adapters and
//! exposes them through [`CorrelationApi`].

pub mod dispatcher;
pub mod pending_store;
pub mod resolver;

pub use dispatcher::RequestDispatcher;
pub use pending_store::PendingRequestStore;
pub use resolver::CallbackResolver;

use crate::algorithms::RequestEnvelopeBuilder;
use crate::domain::{
    CallIntent, CallbackTarget, CorrelationConfig, CorrelationError, CorrelationId, DirectCall,
    PendingRecord, RecordState, ServiceCall,
};
use crate::metrics::{CorrelationMetrics, MetricsSnapshot};
use crate::ports::inbound::CorrelationApi;
use crate::ports::outbound::{DispatchGateway, LedgerStore};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Correlation engine bound to a gateway and a ledger.
pub struct CorrelationService<G: DispatchGateway, S: LedgerStore> {
    config: CorrelationConfig,
    store: Arc<PendingRequestStore<S>>,
    dispatcher: RequestDispatcher<G, S>,
    resolver: CallbackResolver<S>,
    metrics: Arc<CorrelationMetrics>,
}

impl<G: DispatchGateway, S: LedgerStore> CorrelationService<G, S> {
    /// Create a service with the default configuration.
    pub fn new(gateway: Arc<G>, ledger: Arc<S>) -> Self {
        let config = CorrelationConfig::default();
        Self::assemble(gateway, ledger, config)
    }

    /// Create a service with a custom configuration.
    pub fn with_config(
        gateway: Arc<G>,
        ledger: Arc<S>,
        config: CorrelationConfig,
    ) -> Result<Self, CorrelationError> {
        config.validate()?;
        Ok(Self::assemble(gateway, ledger, config))
    }

    fn assemble(gateway: Arc<G>, ledger: Arc<S>, config: CorrelationConfig) -> Self {
        info!(
            "[xcall] correlation service ready (prefix={}, cas={})",
            config.key_prefix,
            ledger.supports_compare_and_swap()
        );
        let metrics = Arc::new(CorrelationMetrics::new());
        let store = Arc::new(PendingRequestStore::new(ledger, config.clone()));
        let dispatcher = RequestDispatcher::new(
            gateway,
            store.clone(),
            RequestEnvelopeBuilder::new(config.clone()),
            metrics.clone(),
        );
        let resolver = CallbackResolver::new(store.clone(), metrics.clone());
        Self {
            config,
            store,
            dispatcher,
            resolver,
            metrics,
        }
    }

    /// Active configuration.
    pub fn config(&self) -> &CorrelationConfig {
        &self.config
    }

    /// Pending record store.
    pub fn store(&self) -> &PendingRequestStore<S> {
        &self.store
    }

    /// Current counters.
    pub fn metrics(&self) -> MetricsSnapshot {
        self.metrics.snapshot()
    }

    /// Dispatch a typed intent.
    pub async fn submit(&self, intent: &CallIntent) -> Result<CorrelationId, CorrelationError> {
        self.dispatcher.submit(intent).await
    }

    /// Resolve a callback and return the completed record.
    pub fn resolve(&self, raw_payload: &str) -> Result<PendingRecord, CorrelationError> {
        self.resolver.resolve(raw_payload)
    }
}

#[async_trait]
impl<G: DispatchGateway, S: LedgerStore> CorrelationApi for CorrelationService<G, S> {
    async fn submit_service_call(
        &self,
        service_name: &str,
        input: &str,
        callback_contract: Option<&str>,
        callback_function: Option<&str>,
        timeout: u64,
    ) -> Result<CorrelationId, CorrelationError> {
        let mut call = ServiceCall::new(service_name, input, timeout);
        call.callback = CallbackTarget::from_optional(callback_contract, callback_function);
        self.submit(&call.into()).await
    }

    async fn submit_direct_call(
        &self,
        destination_chain_id: &str,
        destination_contract: &str,
        semantics_verb: &str,
        arguments: &[String],
        callback_contract: Option<&str>,
        callback_function: Option<&str>,
    ) -> Result<CorrelationId, CorrelationError> {
        let mut call = DirectCall::new(
            destination_chain_id,
            destination_contract,
            semantics_verb,
            arguments.to_vec(),
        );
        call.callback = CallbackTarget::from_optional(callback_contract, callback_function);
        self.submit(&call.into()).await
    }

    async fn submit_intent(&self, intent: &CallIntent) -> Result<CorrelationId, CorrelationError> {
        self.submit(intent).await
    }

    fn resolve_callback(&self, raw_payload: &str) -> Result<(), CorrelationError> {
        self.resolve(raw_payload).map(|_| ())
    }

    fn get_record(&self, correlation_id: &str) -> Result<PendingRecord, CorrelationError> {
        self.store.get(correlation_id)
    }

    fn list_records(
        &self,
        state: Option<RecordState>,
    ) -> Result<Vec<PendingRecord>, CorrelationError> {
        self.store.list(state)
    }
}
