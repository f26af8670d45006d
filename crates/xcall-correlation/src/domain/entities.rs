//! # Domain Entities
//!
//! Call intents, wire envelopes, callback payloads and the pending record.

use super::errors::CorrelationId;
use super::value_objects::{CallbackTarget, EndpointDescriptor, EndpointSemantics, RecordState};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

/// Locally persisted state for one outstanding cross-chain request.
///
/// Stored as JSON with the field tags `id`, `input` and `output`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingRecord {
    /// Identifier assigned by the dispatch gateway.
    #[serde(rename = "id")]
    pub correlation_id: CorrelationId,
    /// Serialised input exactly as submitted.
    pub input: String,
    /// Callback output, `None` until completion.
    #[serde(default)]
    pub output: Option<String>,
}

impl PendingRecord {
    /// Create a record in the `Pending` state.
    pub fn new(correlation_id: impl Into<CorrelationId>, input: impl Into<String>) -> Self {
        Self {
            correlation_id: correlation_id.into(),
            input: input.into(),
            output: None,
        }
    }

    /// Current lifecycle state, derived from the presence of an output.
    pub fn state(&self) -> RecordState {
        if self.output.is_some() {
            RecordState::Completed
        } else {
            RecordState::Pending
        }
    }

    /// Check if still awaiting a callback.
    pub fn is_pending(&self) -> bool {
        self.state() == RecordState::Pending
    }

    /// Write the callback output. `input` is left untouched.
    pub fn complete(&mut self, output: impl Into<String>) {
        self.output = Some(output.into());
    }
}

/// Service-style call: routed by service name to an off-chain provider.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ServiceCall {
    /// Service definition name.
    pub service_name: String,
    /// Caller input as JSON text, embedded in the envelope body byte for byte.
    pub input: String,
    /// Advisory timeout forwarded to the remote side.
    pub timeout: u64,
    /// Optional callback target.
    pub callback: Option<CallbackTarget>,
    /// Gateway contract overriding the configured one.
    pub gateway: Option<String>,
    /// Text persisted in the pending record instead of `input`.
    pub recorded_input: Option<String>,
}

impl ServiceCall {
    /// Create a fire-and-forget service call.
    pub fn new(service_name: impl Into<String>, input: impl Into<String>, timeout: u64) -> Self {
        Self {
            service_name: service_name.into(),
            input: input.into(),
            timeout,
            callback: None,
            gateway: None,
            recorded_input: None,
        }
    }

    /// Attach a callback. Blank parts leave the call fire-and-forget.
    pub fn with_callback(mut self, contract: &str, function: &str) -> Self {
        self.callback = CallbackTarget::from_parts(contract, function);
        self
    }

    /// Route through `contract` instead of the configured service gateway.
    /// A blank contract keeps the configured one.
    pub fn with_gateway(mut self, contract: &str) -> Self {
        let contract = contract.trim();
        self.gateway = (!contract.is_empty()).then(|| contract.to_string());
        self
    }

    /// Persist `raw` as the record input, e.g. the whole host argument the
    /// call was extracted from.
    pub fn with_recorded_input(mut self, raw: impl Into<String>) -> Self {
        self.recorded_input = Some(raw.into());
        self
    }
}

/// Direct cross-chain call to a contract on another chain.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectCall {
    /// Destination chain identifier.
    pub destination_chain_id: String,
    /// Destination contract.
    pub destination_contract: String,
    /// Caller-supplied verb, classified into [`EndpointSemantics`].
    pub semantics_verb: String,
    /// Positional call arguments.
    pub arguments: Vec<String>,
    /// Optional callback target.
    pub callback: Option<CallbackTarget>,
}

impl DirectCall {
    /// Create a fire-and-forget direct call.
    pub fn new(
        destination_chain_id: impl Into<String>,
        destination_contract: impl Into<String>,
        semantics_verb: impl Into<String>,
        arguments: Vec<String>,
    ) -> Self {
        Self {
            destination_chain_id: destination_chain_id.into(),
            destination_contract: destination_contract.into(),
            semantics_verb: semantics_verb.into(),
            arguments,
            callback: None,
        }
    }

    /// Attach a callback. Blank parts leave the call fire-and-forget.
    pub fn with_callback(mut self, contract: &str, function: &str) -> Self {
        self.callback = CallbackTarget::from_parts(contract, function);
        self
    }
}

/// Typed call intent accepted by the dispatcher.
#[derive(Clone, Debug, PartialEq)]
pub enum CallIntent {
    /// Service-style call.
    Service(ServiceCall),
    /// Direct cross-chain call.
    Direct(DirectCall),
}

impl CallIntent {
    /// Callback target, if any.
    pub fn callback(&self) -> Option<&CallbackTarget> {
        match self {
            Self::Service(call) => call.callback.as_ref(),
            Self::Direct(call) => call.callback.as_ref(),
        }
    }
}

impl From<ServiceCall> for CallIntent {
    fn from(call: ServiceCall) -> Self {
        Self::Service(call)
    }
}

impl From<DirectCall> for CallIntent {
    fn from(call: DirectCall) -> Self {
        Self::Direct(call)
    }
}

/// Envelope body for service-style calls: `{header: {}, body: input}`.
///
/// `body` is embedded verbatim.
#[derive(Debug, Serialize)]
pub struct InputData<'a> {
    /// Always an empty object.
    pub header: serde_json::Map<String, serde_json::Value>,
    /// Caller input.
    pub body: &'a RawValue,
}

impl<'a> InputData<'a> {
    /// Wrap caller input.
    pub fn wrap(body: &'a RawValue) -> Self {
        Self {
            header: serde_json::Map::new(),
            body,
        }
    }
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

/// Service request blob sent as the single structured argument.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ServiceRequest {
    /// Service definition name.
    #[serde(rename = "serviceName", default, skip_serializing_if = "String::is_empty")]
    pub service_name: String,
    /// Serialised [`InputData`].
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub input: String,
    /// Advisory timeout, in blocks of the destination chain.
    #[serde(default, skip_serializing_if = "is_zero")]
    pub timeout: u64,
    /// Callback target; absent means fire-and-forget.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub callback: Option<CallbackTarget>,
}

/// Fields of a direct-style envelope, framed positionally on the wire.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DirectRequest {
    /// Encoded destination.
    pub endpoint: EndpointDescriptor,
    /// Resolved semantics.
    pub semantics: EndpointSemantics,
    /// JSON array of the call arguments.
    pub call_arguments: String,
    /// Callback target; absent means fire-and-forget.
    pub callback: Option<CallbackTarget>,
}

/// Envelope body, tagged by call shape.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EnvelopeBody {
    /// Service-style request blob.
    Service(ServiceRequest),
    /// Direct-style positional fields.
    Direct(DirectRequest),
}

impl EnvelopeBody {
    /// Callback section, if present.
    pub fn callback(&self) -> Option<&CallbackTarget> {
        match self {
            Self::Service(req) => req.callback.as_ref(),
            Self::Direct(req) => req.callback.as_ref(),
        }
    }

    /// Endpoint semantics of the call.
    pub fn semantics(&self) -> EndpointSemantics {
        match self {
            Self::Service(_) => EndpointSemantics::Service,
            Self::Direct(req) => req.semantics,
        }
    }
}

/// Canonical envelope ready for the dispatch gateway.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RequestEnvelope {
    /// Contract that receives the envelope.
    pub destination: String,
    /// Positional byte-string arguments; the first is the remote operation name.
    pub args: Vec<Vec<u8>>,
    /// Structured view of what `args` encodes.
    pub body: EnvelopeBody,
    /// Serialised original input, persisted in the pending record.
    pub original_input: String,
}

/// Inbound callback payload.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackPayload {
    /// Identifier of the originating request.
    #[serde(rename = "requestID", default)]
    pub correlation_id: CorrelationId,
    /// Remote error, if the call failed.
    #[serde(rename = "errMsg", default, skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
    /// Remote result.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Identifier assigned by the interchain relay.
    #[serde(rename = "icRequestID", default, skip_serializing_if = "Option::is_none")]
    pub upstream_correlation_id: Option<CorrelationId>,
}

impl CallbackPayload {
    /// Check if the payload reports a remote failure.
    pub fn is_error(&self) -> bool {
        self.error_message
            .as_deref()
            .is_some_and(|msg| !msg.trim().is_empty())
    }
}
