//! # Adapters Module
//!
//! In-memory ledger, loopback gateway and the host operation table.

pub mod contract_handler;
pub mod in_memory_ledger;
pub mod loopback_gateway;

pub use contract_handler::{ContractHandler, Operation, CALLBACK_ACK};
pub use in_memory_ledger::InMemoryLedgerStore;
pub use loopback_gateway::{DispatchedEnvelope, LoopbackDispatchGateway};
