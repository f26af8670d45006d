//! # Integration Test Flows
//!
//! Full request lifecycles through `CorrelationService` with the loopback
//! gateway and the in-memory ledger.
//!
//! ## Flows Tested:
//!
//! 1. **Service call**: submit -> callback -> query
//! 2. **Direct call**: positional framing and recorded input
//! 3. **Host operations**: the same lifecycle through `ContractHandler`
//! 4. **Failure paths**: invalid intent, rejected dispatch, unknown callback

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use serde_json::json;
    use xcall_correlation::{
        decode_endpoint, encode_callback, CallbackPayload, ContractHandler, CorrelationApi,
        CorrelationConfig, CorrelationError, CorrelationService, DispatchFailure,
        EndpointSemantics, InMemoryLedgerStore, LedgerStore, LoopbackDispatchGateway,
        PendingRecord, RecordState,
    };
    use xcall_telemetry::{init_telemetry, TelemetryConfig};

    type Service = CorrelationService<LoopbackDispatchGateway, InMemoryLedgerStore>;

    // =============================================================================
    // TEST FIXTURES
    // =============================================================================

    struct Harness {
        gateway: Arc<LoopbackDispatchGateway>,
        ledger: Arc<InMemoryLedgerStore>,
        service: Arc<Service>,
    }

    fn harness() -> Harness {
        let _ = init_telemetry(TelemetryConfig {
            console_output: false,
            ..TelemetryConfig::default()
        });
        let gateway = Arc::new(LoopbackDispatchGateway::new());
        let ledger = Arc::new(InMemoryLedgerStore::new());
        let service = Arc::new(CorrelationService::new(gateway.clone(), ledger.clone()));
        Harness {
            gateway,
            ledger,
            service,
        }
    }

    fn callback(id: &str, output: &str) -> String {
        encode_callback(&CallbackPayload {
            correlation_id: id.to_string(),
            output: Some(output.to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    fn ledger_snapshot(ledger: &InMemoryLedgerStore) -> Vec<(String, Vec<u8>)> {
        ledger.prefix_scan("").unwrap()
    }

    // =============================================================================
    // HAPPY PATHS
    // =============================================================================

    /// Service call with callback: the output lands in the record, the input
    /// stays exactly as submitted.
    #[tokio::test]
    async fn test_service_call_round_trip() {
        let h = harness();
        let input = json!({"pair": "ETH/USDT"}).to_string();

        let id = h
            .service
            .submit_service_call("eth-usdt-price", &input, Some("cb_cc"), Some("cb_fn"), 100)
            .await
            .unwrap();

        let envelope = h.gateway.find(&id).unwrap();
        assert_eq!(envelope.destination, "cc_cross");
        assert_eq!(envelope.operation(), Some("callservice"));

        let before = h.service.get_record(&id).unwrap();
        assert_eq!(before.state(), RecordState::Pending);

        h.service.resolve_callback(&callback(&id, "result-X")).unwrap();

        let after = h.service.get_record(&id).unwrap();
        assert_eq!(after.output.as_deref(), Some("result-X"));
        assert_eq!(after.input, before.input);
        assert_eq!(after.input, r#"{"pair":"ETH/USDT"}"#);
    }

    /// Direct query without callback: four positional args, query semantics,
    /// recorded input is the argument array.
    #[tokio::test]
    async fn test_direct_query_without_callback() {
        let h = harness();

        let id = h
            .service
            .submit_direct_call("100001", "getkey", "query", &["a".to_string()], None, None)
            .await
            .unwrap();

        let envelope = h.gateway.find(&id).unwrap();
        assert_eq!(envelope.args.len(), 4);
        assert_eq!(envelope.operation(), Some("sendrequest"));
        let endpoint = decode_endpoint(&envelope.args[1]).unwrap();
        assert_eq!(endpoint.dest_chain_id, "100001");
        assert_eq!(endpoint.endpoint_address, "getkey");
        assert_eq!(endpoint.endpoint_type, EndpointSemantics::Query);
        assert_eq!(envelope.args[2], b"contract_query".to_vec());

        let record = h.service.get_record(&id).unwrap();
        assert_eq!(record.input, r#"["a"]"#);
        assert!(record.is_pending());
    }

    /// The record key is the configured prefix followed by the id.
    #[tokio::test]
    async fn test_record_stored_under_prefixed_key() {
        let h = harness();
        let id = h
            .service
            .submit_direct_call("7", "kv", "tx", &[], None, None)
            .await
            .unwrap();

        let raw = h.ledger.get(&format!("css_{}", id)).unwrap().unwrap();
        let stored: serde_json::Value = serde_json::from_slice(&raw).unwrap();
        assert_eq!(stored["id"], id.as_str());
        assert_eq!(stored["input"], "[]");
        assert!(stored["output"].is_null());
    }

    /// Service input reaches the gateway and the record byte for byte.
    #[tokio::test]
    async fn test_service_input_is_not_rewritten() {
        let h = harness();
        let input = r#"{ "pair": "ETH/USDT", "amount": 123456789012345678901234567890 }"#;

        let id = h
            .service
            .submit_service_call("price", input, None, None, 100)
            .await
            .unwrap();

        assert_eq!(h.service.get_record(&id).unwrap().input, input);
        let envelope = h.gateway.find(&id).unwrap();
        let request: serde_json::Value = serde_json::from_slice(&envelope.args[1]).unwrap();
        assert_eq!(
            request["input"],
            r#"{"header":{},"body":{ "pair": "ETH/USDT", "amount": 123456789012345678901234567890 }}"#
        );
    }

    /// `callfisco` records its whole argument and answers callbacks like any
    /// other request.
    #[tokio::test]
    async fn test_callfisco_lifecycle() {
        let h = harness();
        let handler = ContractHandler::new(h.service.clone(), CorrelationConfig::default());
        let raw = r#"{"service_name":"fisco-kv","cc_code":"cc_cross","cb_cc":"cb_cc","cross_data":{"key":"a"}}"#;

        let id = handler.invoke("callfisco", &[raw.to_string()]).await.unwrap();
        let id = String::from_utf8(id).unwrap();
        handler
            .invoke("callback", &[callback(&id, "value-a")])
            .await
            .unwrap();

        let record = h.service.get_record(&id).unwrap();
        assert_eq!(record.input, raw);
        assert_eq!(record.output.as_deref(), Some("value-a"));
    }

    /// A foreign value under the record prefix does not break `pending`.
    #[tokio::test]
    async fn test_pending_ignores_foreign_values() {
        let h = harness();
        let handler = ContractHandler::new(h.service.clone(), CorrelationConfig::default());
        let id = h
            .service
            .submit_direct_call("1", "kv", "tx", &[], None, None)
            .await
            .unwrap();
        h.ledger.put("css_meta", b"v2").unwrap();

        let pending = handler.invoke("pending", &[]).await.unwrap();
        let pending: Vec<String> = serde_json::from_slice(&pending).unwrap();
        assert_eq!(pending, vec![id]);
    }

    /// Host operations drive the same lifecycle with positional strings.
    #[tokio::test]
    async fn test_contract_handler_lifecycle() {
        let h = harness();
        let handler = ContractHandler::new(h.service.clone(), CorrelationConfig::default());

        let id = handler
            .invoke(
                "CallCross",
                &[
                    "100001".into(),
                    "getkey".into(),
                    "invoke".into(),
                    r#"["k","v"]"#.into(),
                    "cb_cc".into(),
                    "callback".into(),
                ],
            )
            .await
            .unwrap();
        let id = String::from_utf8(id).unwrap();
        assert_eq!(h.gateway.find(&id).unwrap().args.len(), 6);

        let ack = handler.invoke("callback", &[callback(&id, "ok")]).await.unwrap();
        assert_eq!(ack, b"success");

        let record = handler.invoke("query", &[id.clone()]).await.unwrap();
        let record: PendingRecord = serde_json::from_slice(&record).unwrap();
        assert_eq!(record.output.as_deref(), Some("ok"));
        assert_eq!(record.input, r#"["k","v"]"#);
    }

    /// Interleaved requests resolve independently and in any order.
    #[tokio::test]
    async fn test_out_of_order_callbacks() {
        let h = harness();
        let mut ids = Vec::new();
        for i in 0..5 {
            let id = h
                .service
                .submit_direct_call("1", "kv", "tx", &[i.to_string()], None, None)
                .await
                .unwrap();
            ids.push(id);
        }

        for id in ids.iter().rev().step_by(2) {
            h.service.resolve_callback(&callback(id, id)).unwrap();
        }

        let pending = h.service.list_records(Some(RecordState::Pending)).unwrap();
        assert_eq!(pending.len(), 2);
        for (i, id) in ids.iter().enumerate() {
            let record = h.service.get_record(id).unwrap();
            assert_eq!(record.input, format!(r#"["{}"]"#, i));
            if record.state() == RecordState::Completed {
                assert_eq!(record.output.as_deref(), Some(id.as_str()));
            }
        }
    }

    /// Many tasks submitting and resolving concurrently on one service.
    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_submissions() {
        let h = harness();
        let mut handles = Vec::new();
        for i in 0..32 {
            let service = h.service.clone();
            handles.push(tokio::spawn(async move {
                let id = service
                    .submit_service_call("svc", &json!({ "n": i }).to_string(), None, None, 10)
                    .await
                    .unwrap();
                service
                    .resolve_callback(&callback(&id, &format!("out-{}", i)))
                    .unwrap();
                id
            }));
        }

        let mut ids = Vec::new();
        for handle in handles {
            ids.push(handle.await.unwrap());
        }
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 32);
        assert!(h
            .service
            .list_records(Some(RecordState::Pending))
            .unwrap()
            .is_empty());
        assert_eq!(h.service.metrics().callbacks_resolved, 32);
    }

    // =============================================================================
    // FAILURE PATHS
    // =============================================================================

    /// A callback for an id never dispatched changes nothing.
    #[tokio::test]
    async fn test_unknown_callback_leaves_store_unchanged() {
        let h = harness();
        h.service
            .submit_direct_call("1", "kv", "tx", &[], None, None)
            .await
            .unwrap();
        let before = ledger_snapshot(&h.ledger);

        let err = h
            .service
            .resolve_callback(&callback("never-dispatched", "x"))
            .unwrap_err();
        assert!(matches!(err, CorrelationError::UnknownCorrelation(_)));
        assert_eq!(ledger_snapshot(&h.ledger), before);
    }

    /// A malformed payload changes nothing.
    #[tokio::test]
    async fn test_malformed_callback_leaves_store_unchanged() {
        let h = harness();
        let id = h
            .service
            .submit_direct_call("1", "kv", "tx", &[], None, None)
            .await
            .unwrap();
        let before = ledger_snapshot(&h.ledger);

        let err = h.service.resolve_callback(&format!("{{{}", id)).unwrap_err();
        assert!(matches!(err, CorrelationError::MalformedCallback(_)));
        assert_eq!(ledger_snapshot(&h.ledger), before);
        assert!(h.service.get_record(&id).unwrap().is_pending());
    }

    /// A rejected dispatch leaves no record behind and is retryable.
    #[tokio::test]
    async fn test_rejected_dispatch_creates_no_record() {
        let h = harness();
        h.gateway.set_rejection(Some(DispatchFailure::Rejected {
            status: 403,
            message: "contract not bound".into(),
        }));

        let err = h
            .service
            .submit_direct_call("1", "kv", "tx", &[], None, None)
            .await
            .unwrap_err();
        assert!(err.is_retryable());
        assert!(h.ledger.is_empty());

        h.gateway.set_rejection(None);
        assert!(h
            .service
            .submit_direct_call("1", "kv", "tx", &[], None, None)
            .await
            .is_ok());
        assert_eq!(h.ledger.len(), 1);
    }

    /// Invalid intents never reach the gateway.
    #[tokio::test]
    async fn test_invalid_intent_not_dispatched() {
        let h = harness();
        let err = h
            .service
            .submit_service_call("", "{}", None, None, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, CorrelationError::InvalidInput(_)));

        let err = h
            .service
            .submit_service_call("svc", "not json", None, None, 10)
            .await
            .unwrap_err();
        assert!(matches!(err, CorrelationError::InvalidInput(_)));

        assert_eq!(h.gateway.dispatch_count(), 0);
        assert!(h.ledger.is_empty());
        assert_eq!(h.service.metrics().invalid_inputs, 2);
    }

    /// An error callback completes the record with an empty output.
    #[tokio::test]
    async fn test_error_callback_completes_record() {
        let h = harness();
        let id = h
            .service
            .submit_service_call("svc", "{}", Some("cb"), Some("fn"), 10)
            .await
            .unwrap();

        let payload = encode_callback(&CallbackPayload {
            correlation_id: id.clone(),
            error_message: Some("provider timeout".into()),
            upstream_correlation_id: Some("ic-1".into()),
            ..Default::default()
        })
        .unwrap();
        h.service.resolve_callback(&payload).unwrap();

        let record = h.service.get_record(&id).unwrap();
        assert_eq!(record.state(), RecordState::Completed);
        assert_eq!(record.output.as_deref(), Some(""));
        assert_eq!(h.service.metrics().callbacks_with_error, 1);
    }
}
