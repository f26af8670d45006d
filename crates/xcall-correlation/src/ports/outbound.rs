//! # Outbound Ports
//!
//! Traits for external dependencies: the remote invocation primitive and the
//! ledger key-value store.

use crate::domain::{CorrelationId, DispatchFailure, LedgerError};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};

/// Remote invocation primitive - outbound port.
///
/// Performs the call described by `args` on `destination` and returns the
/// correlation id the remote side will echo back in its callback.
#[async_trait]
pub trait DispatchGateway: Send + Sync {
    /// Dispatch an envelope.
    async fn dispatch(
        &self,
        destination: &str,
        args: &[Vec<u8>],
    ) -> Result<CorrelationId, DispatchFailure>;
}

/// Key-value pairs returned by a prefix scan.
pub type ScanResult = Vec<(String, Vec<u8>)>;

/// Ledger key-value store - outbound port.
///
/// Only `get` and `put` are required. Stores that can offer an atomic
/// compare-and-swap advertise it through `supports_compare_and_swap`.
pub trait LedgerStore: Send + Sync {
    /// Read a value.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError>;

    /// Write a value.
    fn put(&self, key: &str, value: &[u8]) -> Result<(), LedgerError>;

    /// All entries whose key starts with `prefix`, in key order.
    fn prefix_scan(&self, _prefix: &str) -> Result<ScanResult, LedgerError> {
        Err(LedgerError::Unsupported("prefix_scan"))
    }

    /// Whether `compare_and_swap` is available.
    fn supports_compare_and_swap(&self) -> bool {
        false
    }

    /// Write `new` only if the current value equals `expected`
    /// (`None` = key absent). Returns `false` when the current value differs.
    fn compare_and_swap(
        &self,
        _key: &str,
        _expected: Option<&[u8]>,
        _new: &[u8],
    ) -> Result<bool, LedgerError> {
        Err(LedgerError::Unsupported("compare_and_swap"))
    }
}

// =============================================================================
// Mock Implementations for Testing
// =============================================================================

/// Mock dispatch gateway for testing.
///
/// Hands out `tx-1`, `tx-2`, ... and records every call.
#[derive(Default)]
pub struct MockDispatchGateway {
    /// Failure returned instead of an id, if set.
    pub failure: Option<DispatchFailure>,
    /// Fixed id returned for every call, if set.
    pub fixed_id: Option<CorrelationId>,
    counter: AtomicU64,
    calls: Mutex<Vec<(String, Vec<Vec<u8>>)>>,
}

impl MockDispatchGateway {
    /// Gateway that always fails with `failure`.
    pub fn failing(failure: DispatchFailure) -> Self {
        Self {
            failure: Some(failure),
            ..Default::default()
        }
    }

    /// Gateway that returns the same id for every call.
    pub fn with_fixed_id(id: impl Into<CorrelationId>) -> Self {
        Self {
            fixed_id: Some(id.into()),
            ..Default::default()
        }
    }

    /// Calls received so far.
    pub fn calls(&self) -> Vec<(String, Vec<Vec<u8>>)> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl DispatchGateway for MockDispatchGateway {
    async fn dispatch(
        &self,
        destination: &str,
        args: &[Vec<u8>],
    ) -> Result<CorrelationId, DispatchFailure> {
        self.calls.lock().push((destination.to_string(), args.to_vec()));

        if let Some(failure) = &self.failure {
            return Err(failure.clone());
        }
        if let Some(id) = &self.fixed_id {
            return Ok(id.clone());
        }
        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        Ok(format!("tx-{}", n))
    }
}
