//! # Contract Handler
//!
//! Adapter exposing the correlation engine as a table of named host
//! operations with positional string arguments, the way a contract invoke
//! arrives from its host.
//!
//! ## Supported Operations
//!
//! - `callservice`: service_name, input JSON, [timeout], [cb_contract], [cb_function]
//! - `callcross`: chain_id, contract, verb, args JSON, [cb_contract], [cb_function]
//! - `callfabric`: numeric chain_id, contract, verb, cb_contract, arg...
//! - `callfisco`: one JSON object `{service_name, cc_code, cb_cc, cross_data}`
//! - `callback`: raw callback payload
//! - `query`: correlation id
//! - `pending`: no arguments
//!
//! Names are matched case-insensitively.

use crate::algorithms::parse_call_arguments;
use crate::domain::{CorrelationConfig, CorrelationError, RecordState, ServiceCall};
use crate::ports::inbound::CorrelationApi;
use serde::Deserialize;
use serde_json::value::RawValue;
use std::sync::Arc;
use tracing::debug;

/// Payload returned by a successful `callback`.
pub const CALLBACK_ACK: &str = "success";

/// Host operations understood by [`ContractHandler`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Operation {
    /// Dispatch a service-style call.
    CallService,
    /// Dispatch a direct cross-chain call.
    CallCross,
    /// Dispatch a direct call to a numerically identified chain.
    CallFabric,
    /// Dispatch a service call described by a single JSON argument.
    CallFisco,
    /// Resolve an inbound callback.
    Callback,
    /// Read one record.
    Query,
    /// List ids still awaiting a callback.
    Pending,
}

const OPERATIONS: &[(&str, Operation)] = &[
    ("callservice", Operation::CallService),
    ("callcross", Operation::CallCross),
    ("callfabric", Operation::CallFabric),
    ("callfisco", Operation::CallFisco),
    ("callback", Operation::Callback),
    ("query", Operation::Query),
    ("pending", Operation::Pending),
];

impl Operation {
    /// Look up an operation by name, ignoring case.
    pub fn parse(name: &str) -> Result<Self, CorrelationError> {
        let lowered = name.to_lowercase();
        OPERATIONS
            .iter()
            .find(|(n, _)| *n == lowered)
            .map(|(_, op)| *op)
            .ok_or_else(|| CorrelationError::UnsupportedOperation(name.to_string()))
    }

    /// Canonical name.
    pub fn name(&self) -> &'static str {
        OPERATIONS
            .iter()
            .find(|(_, op)| op == self)
            .map(|(n, _)| *n)
            .unwrap_or_default()
    }
}

/// Host-facing adapter over a [`CorrelationApi`].
pub struct ContractHandler<A: CorrelationApi> {
    api: Arc<A>,
    config: CorrelationConfig,
}

impl<A: CorrelationApi> ContractHandler<A> {
    /// Create a handler. `config` supplies the default timeout and callback function.
    pub fn new(api: Arc<A>, config: CorrelationConfig) -> Self {
        Self { api, config }
    }

    /// Run operation `function` with positional `args` and return its payload.
    pub async fn invoke(&self, function: &str, args: &[String]) -> Result<Vec<u8>, CorrelationError> {
        let operation = Operation::parse(function)?;
        debug!("[xcall] invoke {} ({} args)", operation.name(), args.len());

        match operation {
            Operation::CallService => self.handle_call_service(args).await,
            Operation::CallCross => self.handle_call_cross(args).await,
            Operation::CallFabric => self.handle_call_fabric(args).await,
            Operation::CallFisco => self.handle_call_fisco(args).await,
            Operation::Callback => {
                let payload = required(args, 0, "callback payload")?;
                self.api.resolve_callback(payload)?;
                Ok(CALLBACK_ACK.as_bytes().to_vec())
            }
            Operation::Query => {
                let id = required(args, 0, "correlation id")?;
                let record = self.api.get_record(id)?;
                to_json(&record)
            }
            Operation::Pending => {
                let ids: Vec<String> = self
                    .api
                    .list_records(Some(RecordState::Pending))?
                    .into_iter()
                    .map(|r| r.correlation_id)
                    .collect();
                to_json(&ids)
            }
        }
    }

    async fn handle_call_service(&self, args: &[String]) -> Result<Vec<u8>, CorrelationError> {
        let service_name = required(args, 0, "service name")?;
        let input = required(args, 1, "service input")?;
        let timeout = match optional(args, 2) {
            Some(raw) => raw.trim().parse::<u64>().map_err(|_| {
                CorrelationError::InvalidInput(format!("timeout must be numeric: {}", raw))
            })?,
            None => self.config.default_timeout,
        };

        let id = self
            .api
            .submit_service_call(service_name, input, optional(args, 3), optional(args, 4), timeout)
            .await?;
        Ok(id.into_bytes())
    }

    async fn handle_call_cross(&self, args: &[String]) -> Result<Vec<u8>, CorrelationError> {
        let chain_id = required(args, 0, "chain id")?;
        let contract = required(args, 1, "contract")?;
        let verb = required(args, 2, "verb")?;
        let arguments = parse_call_arguments(required(args, 3, "call arguments")?)?;

        let id = self
            .api
            .submit_direct_call(
                chain_id,
                contract,
                verb,
                &arguments,
                optional(args, 4),
                optional(args, 5),
            )
            .await?;
        Ok(id.into_bytes())
    }

    async fn handle_call_fabric(&self, args: &[String]) -> Result<Vec<u8>, CorrelationError> {
        let chain_id = required(args, 0, "chain id")?
            .trim()
            .parse::<u64>()
            .map_err(|_| CorrelationError::InvalidInput("Incorrect chain id type".to_string()))?;
        let contract = required(args, 1, "contract")?;
        let verb = required(args, 2, "verb")?;
        let callback_contract = required(args, 3, "callback contract")?;

        let id = self
            .api
            .submit_direct_call(
                &chain_id.to_string(),
                contract,
                verb,
                &args[4..],
                Some(callback_contract),
                Some(self.config.default_callback_function.as_str()),
            )
            .await?;
        Ok(id.into_bytes())
    }

    async fn handle_call_fisco(&self, args: &[String]) -> Result<Vec<u8>, CorrelationError> {
        let raw = required(args, 0, "call data")?;
        let data: FiscoCallData = serde_json::from_str(raw)
            .map_err(|e| CorrelationError::InvalidInput(format!("call data format: {}", e)))?;

        let call = ServiceCall::new(
            data.service_name,
            data.cross_data.get(),
            self.config.default_timeout,
        )
        .with_gateway(&data.cc_code)
        .with_callback(&data.cb_cc, &self.config.default_callback_function)
        .with_recorded_input(raw);

        let id = self.api.submit_intent(&call.into()).await?;
        Ok(id.into_bytes())
    }
}

/// Single argument of `callfisco`.
#[derive(Debug, Deserialize)]
struct FiscoCallData {
    service_name: String,
    #[serde(default)]
    cc_code: String,
    #[serde(default)]
    cb_cc: String,
    cross_data: Box<RawValue>,
}

fn required<'a>(args: &'a [String], index: usize, name: &str) -> Result<&'a str, CorrelationError> {
    args.get(index)
        .map(String::as_str)
        .ok_or_else(|| CorrelationError::InvalidInput(format!("missing argument {}: {}", index, name)))
}

fn optional(args: &[String], index: usize) -> Option<&str> {
    args.get(index)
        .map(String::as_str)
        .filter(|s| !s.trim().is_empty())
}

fn to_json<T: serde::Serialize>(value: &T) -> Result<Vec<u8>, CorrelationError> {
    serde_json::to_vec(value)
        .map_err(|e| CorrelationError::InvalidInput(format!("result encoding: {}", e)))
}
