//! # XCall Correlation
//!
//! Asynchronous cross-chain request/callback correlation.
//!
//! **Architecture:** Hexagonal (DDD + Ports/Adapters)
//!
//! ## Purpose
//!
//! A contract on the local chain asks for work on another chain and later
//! receives the answer through a callback. This crate:
//! - Frames outgoing calls into the envelopes a cross-chain gateway expects
//! - Records every dispatched request under the gateway's correlation id
//! - Matches inbound callbacks to their record and stores the output
//!
//! ## Request Lifecycle
//!
//! | Step | Component | Failure |
//! |------|-----------|---------|
//! | Build envelope | `RequestEnvelopeBuilder` | `InvalidInput` |
//! | Dispatch | `DispatchGateway` | `Dispatch` |
//! | Record | `PendingRequestStore` | `Persistence` (id included) |
//! | Resolve | `CallbackResolver` | `MalformedCallback`, `UnknownCorrelation` |
//!
//! ## Module Structure
//!
//! ```text
//! xcall-correlation/
//! ├── domain/          # Records, intents, envelopes, config, errors
//! ├── algorithms/      # Endpoint codec, envelope builder, callback codec
//! ├── ports/           # CorrelationApi, DispatchGateway, LedgerStore
//! ├── adapters/        # In-memory ledger, loopback gateway, contract handler
//! ├── service/         # Dispatcher, resolver, pending store
//! └── metrics.rs       # Counters
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod adapters;
pub mod algorithms;
pub mod domain;
pub mod metrics;
pub mod ports;
pub mod service;

// Re-exports
pub use adapters::{
    ContractHandler, DispatchedEnvelope, InMemoryLedgerStore, LoopbackDispatchGateway, Operation,
    CALLBACK_ACK,
};
pub use algorithms::{
    classify_verb, decode_endpoint, encode_callback, encode_endpoint, parse_callback,
    RequestEnvelopeBuilder,
};
pub use domain::{
    CallIntent, CallbackPayload, CallbackTarget, CorrelationConfig, CorrelationConfigBuilder,
    CorrelationError, CorrelationId, DirectCall, DispatchFailure, EndpointDescriptor,
    EndpointSemantics, LedgerError, PendingRecord, RecordState, RequestEnvelope, ServiceCall,
};
pub use metrics::{CorrelationMetrics, MetricsSnapshot};
pub use ports::{CorrelationApi, DispatchGateway, LedgerStore, MockDispatchGateway};
pub use service::{CallbackResolver, CorrelationService, PendingRequestStore, RequestDispatcher};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
