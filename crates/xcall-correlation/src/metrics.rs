//! Metrics hooks for correlation operations
//!
//! Thread-safe counters for monitoring dispatch and callback traffic.
//!
//! ## Usage
//!
//! ```ignore
//! use xcall_correlation::metrics::CorrelationMetrics;
//!
//! let metrics = CorrelationMetrics::new();
//! metrics.record_submitted();
//! let snapshot = metrics.snapshot();
//! ```

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Metrics collector for the correlation engine.
#[derive(Debug, Default)]
pub struct CorrelationMetrics {
    /// Requests dispatched and recorded
    pub requests_submitted: AtomicU64,
    /// Intents rejected before dispatch
    pub invalid_inputs: AtomicU64,
    /// Dispatches that failed at the gateway
    pub dispatch_failures: AtomicU64,
    /// Dispatches whose pending record could not be written
    pub persistence_failures: AtomicU64,
    /// Callbacks applied to a record
    pub callbacks_resolved: AtomicU64,
    /// Callbacks applied that carried a remote error
    pub callbacks_with_error: AtomicU64,
    /// Callbacks rejected (malformed, unknown id, lost race)
    pub callbacks_rejected: AtomicU64,
}

impl CorrelationMetrics {
    /// Create a new metrics collector
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a fully tracked submission
    pub fn record_submitted(&self) {
        self.requests_submitted.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an intent rejected before dispatch
    pub fn record_invalid_input(&self) {
        self.invalid_inputs.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a gateway failure
    pub fn record_dispatch_failure(&self) {
        self.dispatch_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record a dispatched request left without a pending record
    pub fn record_persistence_failure(&self) {
        self.persistence_failures.fetch_add(1, Ordering::Relaxed);
    }

    /// Record an applied callback
    ///
    /// # Arguments
    /// * `remote_error` - Whether the payload carried an error message
    pub fn record_callback_resolved(&self, remote_error: bool) {
        self.callbacks_resolved.fetch_add(1, Ordering::Relaxed);
        if remote_error {
            self.callbacks_with_error.fetch_add(1, Ordering::Relaxed);
        }
    }

    /// Record a rejected callback
    pub fn record_callback_rejected(&self) {
        self.callbacks_rejected.fetch_add(1, Ordering::Relaxed);
    }

    /// Get current metrics snapshot
    pub fn snapshot(&self) -> MetricsSnapshot {
        MetricsSnapshot {
            requests_submitted: self.requests_submitted.load(Ordering::Relaxed),
            invalid_inputs: self.invalid_inputs.load(Ordering::Relaxed),
            dispatch_failures: self.dispatch_failures.load(Ordering::Relaxed),
            persistence_failures: self.persistence_failures.load(Ordering::Relaxed),
            callbacks_resolved: self.callbacks_resolved.load(Ordering::Relaxed),
            callbacks_with_error: self.callbacks_with_error.load(Ordering::Relaxed),
            callbacks_rejected: self.callbacks_rejected.load(Ordering::Relaxed),
        }
    }
}

/// Point-in-time copy of [`CorrelationMetrics`].
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetricsSnapshot {
    /// See [`CorrelationMetrics::requests_submitted`]
    pub requests_submitted: u64,
    /// See [`CorrelationMetrics::invalid_inputs`]
    pub invalid_inputs: u64,
    /// See [`CorrelationMetrics::dispatch_failures`]
    pub dispatch_failures: u64,
    /// See [`CorrelationMetrics::persistence_failures`]
    pub persistence_failures: u64,
    /// See [`CorrelationMetrics::callbacks_resolved`]
    pub callbacks_resolved: u64,
    /// See [`CorrelationMetrics::callbacks_with_error`]
    pub callbacks_with_error: u64,
    /// See [`CorrelationMetrics::callbacks_rejected`]
    pub callbacks_rejected: u64,
}

impl MetricsSnapshot {
    /// Requests dispatched whose callback has not been observed yet.
    ///
    /// Approximate: repeated callbacks for one id are counted each time.
    pub fn outstanding(&self) -> u64 {
        self.requests_submitted
            .saturating_sub(self.callbacks_resolved)
    }
}
