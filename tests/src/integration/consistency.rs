//! # Ledger Consistency Tests
//!
//! Behaviour that depends on which primitives the ledger offers and on what
//! happens between a dispatch and the write that records it.
//!
//! - get/put-only ledgers still support the full lifecycle
//! - compare-and-swap turns lost races into explicit errors
//! - a failed write after a successful dispatch reports the id in flight

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use parking_lot::{Mutex, RwLock};
    use xcall_correlation::{
        CorrelationApi, CorrelationConfigBuilder, CorrelationError, CorrelationService,
        InMemoryLedgerStore, LedgerError, LedgerStore, LoopbackDispatchGateway,
        MockDispatchGateway, RecordState,
    };

    // =============================================================================
    // TEST LEDGERS
    // =============================================================================

    /// Ledger offering only the two required primitives.
    #[derive(Default)]
    struct GetPutLedger {
        data: RwLock<HashMap<String, Vec<u8>>>,
    }

    impl LedgerStore for GetPutLedger {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
            Ok(self.data.read().get(key).cloned())
        }

        fn put(&self, key: &str, value: &[u8]) -> Result<(), LedgerError> {
            self.data.write().insert(key.to_string(), value.to_vec());
            Ok(())
        }
    }

    /// Ledger that lets another writer slip in just before the next
    /// compare-and-swap.
    #[derive(Default)]
    struct InterleavingLedger {
        inner: InMemoryLedgerStore,
        intruder: Mutex<Option<(String, Vec<u8>)>>,
    }

    impl InterleavingLedger {
        fn intrude(&self, key: &str, value: &[u8]) {
            *self.intruder.lock() = Some((key.to_string(), value.to_vec()));
        }
    }

    impl LedgerStore for InterleavingLedger {
        fn get(&self, key: &str) -> Result<Option<Vec<u8>>, LedgerError> {
            self.inner.get(key)
        }

        fn put(&self, key: &str, value: &[u8]) -> Result<(), LedgerError> {
            self.inner.put(key, value)
        }

        fn prefix_scan(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, LedgerError> {
            self.inner.prefix_scan(prefix)
        }

        fn supports_compare_and_swap(&self) -> bool {
            true
        }

        fn compare_and_swap(
            &self,
            key: &str,
            expected: Option<&[u8]>,
            new: &[u8],
        ) -> Result<bool, LedgerError> {
            if let Some((k, v)) = self.intruder.lock().take() {
                self.inner.put(&k, &v)?;
            }
            self.inner.compare_and_swap(key, expected, new)
        }
    }

    fn callback(id: &str, output: &str) -> String {
        format!(r#"{{"requestID":"{}","output":"{}"}}"#, id, output)
    }

    // =============================================================================
    // GET/PUT-ONLY LEDGER
    // =============================================================================

    #[tokio::test]
    async fn test_get_put_ledger_full_lifecycle() {
        let ledger = Arc::new(GetPutLedger::default());
        let service =
            CorrelationService::new(Arc::new(MockDispatchGateway::default()), ledger.clone());

        let id = service
            .submit_direct_call("1", "kv", "tx", &["x".to_string()], None, None)
            .await
            .unwrap();
        service.resolve_callback(&callback(&id, "done")).unwrap();

        let record = service.get_record(&id).unwrap();
        assert_eq!(record.output.as_deref(), Some("done"));
        assert!(ledger.data.read().contains_key("css_tx-1"));
    }

    #[tokio::test]
    async fn test_get_put_ledger_cannot_list() {
        let service = CorrelationService::new(
            Arc::new(MockDispatchGateway::default()),
            Arc::new(GetPutLedger::default()),
        );
        let err = service.list_records(None).unwrap_err();
        assert!(matches!(
            err,
            CorrelationError::Storage(LedgerError::Unsupported("prefix_scan"))
        ));
    }

    #[tokio::test]
    async fn test_reused_id_rejected_on_both_ledgers() {
        let cas = CorrelationService::new(
            Arc::new(MockDispatchGateway::with_fixed_id("same")),
            Arc::new(InMemoryLedgerStore::new()),
        );
        let plain = CorrelationService::new(
            Arc::new(MockDispatchGateway::with_fixed_id("same")),
            Arc::new(InMemoryLedgerStore::without_compare_and_swap()),
        );

        for service in [&cas, &plain] {
            service
                .submit_direct_call("1", "kv", "tx", &["first".to_string()], None, None)
                .await
                .unwrap();
            let err = service
                .submit_direct_call("1", "kv", "tx", &["second".to_string()], None, None)
                .await
                .unwrap_err();
            assert!(matches!(err, CorrelationError::Persistence { .. }));
            assert_eq!(err.correlation_id(), Some("same"));
            assert_eq!(service.get_record("same").unwrap().input, r#"["first"]"#);
        }
    }

    // =============================================================================
    // COMPARE-AND-SWAP RACES
    // =============================================================================

    #[tokio::test]
    async fn test_lost_completion_race_is_reported() {
        let ledger = Arc::new(InterleavingLedger::default());
        let service =
            CorrelationService::new(Arc::new(MockDispatchGateway::default()), ledger.clone());
        let id = service
            .submit_direct_call("1", "kv", "tx", &[], None, None)
            .await
            .unwrap();

        let competing = br#"{"id":"tx-1","input":"[]","output":"theirs"}"#;
        ledger.intrude("css_tx-1", competing);

        let err = service.resolve_callback(&callback(&id, "ours")).unwrap_err();
        assert!(matches!(err, CorrelationError::ConcurrentUpdate(ref i) if i == "tx-1"));
        assert_eq!(
            service.get_record(&id).unwrap().output.as_deref(),
            Some("theirs")
        );
        assert_eq!(service.metrics().callbacks_rejected, 1);
    }

    #[tokio::test]
    async fn test_lost_create_race_is_persistence_failure() {
        let ledger = Arc::new(InterleavingLedger::default());
        let service =
            CorrelationService::new(Arc::new(MockDispatchGateway::default()), ledger.clone());

        ledger.intrude("css_tx-1", br#"{"id":"tx-1","input":"other"}"#);
        let err = service
            .submit_direct_call("1", "kv", "tx", &[], None, None)
            .await
            .unwrap_err();

        assert!(matches!(err, CorrelationError::Persistence { ref correlation_id, .. } if correlation_id == "tx-1"));
        assert_eq!(service.get_record("tx-1").unwrap().input, "other");
    }

    // =============================================================================
    // PARTIAL FAILURE
    // =============================================================================

    #[tokio::test]
    async fn test_write_failure_after_dispatch_reports_id() {
        let gateway = Arc::new(LoopbackDispatchGateway::new());
        let ledger = Arc::new(InMemoryLedgerStore::new());
        let service = CorrelationService::new(gateway.clone(), ledger.clone());
        ledger.fail_writes(true);

        let err = service
            .submit_service_call("svc", r#"{"k":1}"#, None, None, 10)
            .await
            .unwrap_err();

        // The request is in flight even though nothing was recorded.
        assert_eq!(gateway.dispatch_count(), 1);
        let in_flight = err.correlation_id().unwrap().to_string();
        assert!(gateway.find(&in_flight).is_some());
        assert!(ledger.is_empty());
        assert_eq!(service.metrics().persistence_failures, 1);

        // Its callback cannot be matched.
        ledger.fail_writes(false);
        assert!(matches!(
            service.resolve_callback(&callback(&in_flight, "late")),
            Err(CorrelationError::UnknownCorrelation(_))
        ));
    }

    #[tokio::test]
    async fn test_custom_prefix_isolates_records() {
        let ledger = Arc::new(InMemoryLedgerStore::new());
        let gateway = Arc::new(MockDispatchGateway::default());
        let config = CorrelationConfigBuilder::new()
            .key_prefix("xreq_")
            .build()
            .unwrap();
        let custom = CorrelationService::with_config(gateway.clone(), ledger.clone(), config)
            .unwrap();
        let default = CorrelationService::new(gateway, ledger.clone());

        custom
            .submit_direct_call("1", "kv", "tx", &[], None, None)
            .await
            .unwrap();
        default
            .submit_direct_call("1", "kv", "tx", &[], None, None)
            .await
            .unwrap();

        assert_eq!(custom.list_records(Some(RecordState::Pending)).unwrap().len(), 1);
        assert_eq!(default.list_records(None).unwrap().len(), 1);
        assert!(ledger.get("xreq_tx-1").unwrap().is_some());
        assert!(ledger.get("css_tx-2").unwrap().is_some());
    }
}
