//! Loopback Dispatch Adapter
//!
//! Implements `DispatchGateway` without a network: every envelope is accepted,
//! kept for inspection and given a fresh correlation id.

use crate::domain::{CorrelationId, DispatchFailure};
use crate::ports::outbound::DispatchGateway;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::HashMap;
use tracing::{info, warn};
use uuid::Uuid;

/// Envelope accepted by the loopback gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DispatchedEnvelope {
    /// Id handed back to the caller.
    pub correlation_id: CorrelationId,
    /// Contract the envelope was sent to.
    pub destination: String,
    /// Positional arguments as sent.
    pub args: Vec<Vec<u8>>,
}

impl DispatchedEnvelope {
    /// Remote operation name (first positional argument).
    pub fn operation(&self) -> Option<&str> {
        self.args.first().and_then(|a| std::str::from_utf8(a).ok())
    }
}

/// In-process gateway assigning UUID correlation ids.
pub struct LoopbackDispatchGateway {
    dispatched: RwLock<HashMap<String, Vec<DispatchedEnvelope>>>,
    rejection: RwLock<Option<DispatchFailure>>,
}

impl LoopbackDispatchGateway {
    /// Create a gateway that accepts everything.
    pub fn new() -> Self {
        Self {
            dispatched: RwLock::new(HashMap::new()),
            rejection: RwLock::new(None),
        }
    }

    /// Reject subsequent dispatches with `failure`, or accept again with `None`.
    pub fn set_rejection(&self, failure: Option<DispatchFailure>) {
        *self.rejection.write() = failure;
    }

    /// Envelopes dispatched to `destination`, oldest first.
    pub fn dispatched_to(&self, destination: &str) -> Vec<DispatchedEnvelope> {
        self.dispatched
            .read()
            .get(destination)
            .cloned()
            .unwrap_or_default()
    }

    /// Find a dispatched envelope by correlation id.
    pub fn find(&self, correlation_id: &str) -> Option<DispatchedEnvelope> {
        self.dispatched
            .read()
            .values()
            .flatten()
            .find(|e| e.correlation_id == correlation_id)
            .cloned()
    }

    /// Total envelopes accepted.
    pub fn dispatch_count(&self) -> usize {
        self.dispatched.read().values().map(Vec::len).sum()
    }
}

impl Default for LoopbackDispatchGateway {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl DispatchGateway for LoopbackDispatchGateway {
    async fn dispatch(
        &self,
        destination: &str,
        args: &[Vec<u8>],
    ) -> Result<CorrelationId, DispatchFailure> {
        if let Some(failure) = self.rejection.read().clone() {
            warn!("[xcall] loopback rejecting dispatch to {}: {}", destination, failure);
            return Err(failure);
        }

        let correlation_id = Uuid::new_v4().to_string();
        info!(
            "[xcall] loopback accepted {} args for {} as {}",
            args.len(),
            destination,
            correlation_id
        );

        self.dispatched
            .write()
            .entry(destination.to_string())
            .or_default()
            .push(DispatchedEnvelope {
                correlation_id: correlation_id.clone(),
                destination: destination.to_string(),
                args: args.to_vec(),
            });

        Ok(correlation_id)
    }
}
