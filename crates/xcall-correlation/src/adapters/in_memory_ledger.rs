//! In-memory Ledger Adapter
//!
//! Implements `LedgerStore` over a sorted map.

use crate::domain::LedgerError;
use crate::ports::outbound::{LedgerStore, ScanResult};
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::debug;

/// In-memory ledger for tests and single-process hosts.
///
/// Compare-and-swap runs under the write lock, so it is atomic with respect to
/// every other operation on the same store.
pub struct InMemoryLedgerStore {
    data: RwLock<BTreeMap<String, Vec<u8>>>,
    compare_and_swap: bool,
    fail_writes: AtomicBool,
}

impl InMemoryLedgerStore {
    /// Create a store offering compare-and-swap.
    pub fn new() -> Self {
        Self {
            data: RwLock::new(BTreeMap::new()),
            compare_and_swap: true,
            fail_writes: AtomicBool::new(false),
        }
    }

    /// Create a get/put-only store, like a plain chaincode stub.
    pub fn without_compare_and_swap() -> Self {
        Self {
            compare_and_swap: false,
            ..Self::new()
        }
    }

    /// Make every subsequent write fail (for exercising persistence failures).
    pub fn fail_writes(&self, fail: bool) {
        self.fail_writes.store(fail, Ordering::SeqCst);
    }

    /// Number of stored keys.
    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    fn check_writable(&self) -> Result<(), LedgerError> {
        if self.fail_writes.load(Ordering::SeqCst) {
            return Err(LedgerError::Backend("write rejected".to_string()));
        }
        Ok(())
    }
}

impl Default for InMemoryLedgerStore {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerStore for InMemoryLedgerStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
        Ok(self.data.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: &[u8]) -> Result<(), LedgerError> {
        self.check_writable()?;
        debug!("[xcall] put {} ({} bytes)", key, value.len());
        self.data.write().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    fn prefix_scan(&self, prefix: &str) -> Result<ScanResult, LedgerError> {
        let data = self.data.read();
        Ok(data
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }

    fn supports_compare_and_swap(&self) -> bool {
        self.compare_and_swap
    }

    fn compare_and_swap(
        &self,
        key: &str,
        expected: Option<&[u8]>,
        new: &[u8],
    ) -> Result<bool, LedgerError> {
        if !self.compare_and_swap {
            return Err(LedgerError::Unsupported("compare_and_swap"));
        }
        self.check_writable()?;

        let mut data = self.data.write();
        if data.get(key).map(Vec::as_slice) != expected {
            return Ok(false);
        }
        data.insert(key.to_string(), new.to_vec());
        Ok(true)
    }
}
