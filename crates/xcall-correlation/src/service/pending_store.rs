//! # Pending Request Store
//!
//! Persists one [`PendingRecord`] per outstanding request under
//! `key_prefix + correlation_id`.
//!
//! When the ledger offers compare-and-swap, both create and complete are
//! atomic. Otherwise they fall back to read-then-write, which is only safe
//! when the host serialises invocations (the usual case for contract
//! execution, where every transaction runs against a single state view).

use crate::domain::{
    invariant_completion_preserves_input, invariant_create_once, CorrelationConfig,
    CorrelationError, LedgerError, PendingRecord, RecordState,
};
use crate::ports::outbound::LedgerStore;
use std::sync::Arc;
use tracing::{debug, warn};

/// Keyed store of pending records over a [`LedgerStore`].
pub struct PendingRequestStore<S: LedgerStore> {
    store: Arc<S>,
    config: CorrelationConfig,
}

impl<S: LedgerStore> PendingRequestStore<S> {
    /// Create a store over `store`, namespaced by `config.key_prefix`.
    pub fn new(store: Arc<S>, config: CorrelationConfig) -> Self {
        Self { store, config }
    }

    /// Underlying ledger.
    pub fn ledger(&self) -> &Arc<S> {
        &self.store
    }

    /// Persist a new record in the `Pending` state.
    ///
    /// Fails with `DuplicateRequest` if a non-empty record already exists.
    pub fn create(
        &self,
        correlation_id: &str,
        original_input: &str,
    ) -> Result<PendingRecord, CorrelationError> {
        let key = self.config.record_key(correlation_id);
        let record = PendingRecord::new(correlation_id, original_input);
        let bytes = encode_record(&record)?;

        if self.store.supports_compare_and_swap() {
            if self.store.compare_and_swap(&key, None, &bytes)? {
                debug!("[xcall] created record {}", key);
                return Ok(record);
            }
            // An empty value counts as absent; retry against it once.
            let existing = self.store.get(&key)?;
            invariant_create_once(correlation_id, existing.as_deref())?;
            if self
                .store
                .compare_and_swap(&key, existing.as_deref(), &bytes)?
            {
                debug!("[xcall] created record {} over empty value", key);
                return Ok(record);
            }
            return Err(CorrelationError::DuplicateRequest(
                correlation_id.to_string(),
            ));
        }

        let existing = self.store.get(&key)?;
        invariant_create_once(correlation_id, existing.as_deref())?;
        self.store.put(&key, &bytes)?;
        debug!("[xcall] created record {}", key);
        Ok(record)
    }

    /// Load a record. Absent and empty values are both `NotFound`.
    pub fn get(&self, correlation_id: &str) -> Result<PendingRecord, CorrelationError> {
        self.load(correlation_id).map(|(record, _)| record)
    }

    /// Record the callback output. Overwrites any earlier output.
    ///
    /// Fails with `NotFound` if the record does not exist and with
    /// `ConcurrentUpdate` if a compare-and-swap loses a race.
    pub fn complete(
        &self,
        correlation_id: &str,
        output: &str,
    ) -> Result<PendingRecord, CorrelationError> {
        let (before, raw) = self.load(correlation_id)?;
        let state = before.state();
        if !state.can_transition_to(RecordState::Completed) {
            return Err(CorrelationError::InvalidInput(format!(
                "record {} cannot move from {} to {}",
                correlation_id,
                state,
                RecordState::Completed
            )));
        }
        if state.is_terminal() {
            warn!(
                "[xcall] record {} already {}, overwriting output",
                correlation_id, state
            );
        }

        let mut after = before.clone();
        after.complete(output);
        debug_assert!(invariant_completion_preserves_input(&before, &after));
        let bytes = encode_record(&after)?;
        let key = self.config.record_key(correlation_id);

        if self.store.supports_compare_and_swap() {
            if !self.store.compare_and_swap(&key, Some(&raw), &bytes)? {
                return Err(CorrelationError::ConcurrentUpdate(
                    correlation_id.to_string(),
                ));
            }
        } else {
            self.store.put(&key, &bytes)?;
        }

        debug!("[xcall] completed record {}", key);
        Ok(after)
    }

    /// List records under the prefix, optionally filtered by state.
    ///
    /// Requires a ledger that supports prefix scans. Values that do not decode
    /// as records are skipped.
    pub fn list(&self, state: Option<RecordState>) -> Result<Vec<PendingRecord>, CorrelationError> {
        let entries = self.store.prefix_scan(&self.config.key_prefix)?;
        let mut records = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            if value.is_empty() {
                continue;
            }
            // Foreign or damaged entries under the prefix must not hide the rest.
            let record = match decode_record(&key, &value) {
                Ok(record) => record,
                Err(e) => {
                    warn!("[xcall] skipping {} while listing: {}", key, e);
                    continue;
                }
            };
            if state.map_or(true, |s| record.state() == s) {
                records.push(record);
            }
        }
        Ok(records)
    }

    fn load(&self, correlation_id: &str) -> Result<(PendingRecord, Vec<u8>), CorrelationError> {
        let key = self.config.record_key(correlation_id);
        match self.store.get(&key)? {
            Some(raw) if !raw.is_empty() => {
                let record = decode_record(&key, &raw)?;
                Ok((record, raw))
            }
            _ => Err(CorrelationError::NotFound(correlation_id.to_string())),
        }
    }
}

fn encode_record(record: &PendingRecord) -> Result<Vec<u8>, CorrelationError> {
    serde_json::to_vec(record).map_err(|e| {
        CorrelationError::Storage(LedgerError::Backend(format!(
            "encode record {}: {}",
            record.correlation_id, e
        )))
    })
}

fn decode_record(key: &str, bytes: &[u8]) -> Result<PendingRecord, CorrelationError> {
    serde_json::from_slice(bytes).map_err(|e| {
        CorrelationError::Storage(LedgerError::Backend(format!(
            "corrupt record at {}: {}",
            key, e
        )))
    })
}
