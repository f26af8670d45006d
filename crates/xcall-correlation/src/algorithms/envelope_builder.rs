//! # Request Envelope Builder
//!
//! Turns a typed call intent into the positional argument list handed to the
//! dispatch gateway.
//!
//! ## Wire framing
//!
//! ```text
//! service: [service_operation, ServiceRequest JSON]
//! direct:  [direct_operation, endpoint JSON, semantics tag, args JSON,
//!           (callback contract, callback function)]
//! ```
//!
//! The direct-style list is positional. The two callback elements are only
//! appended when the call has a callback target.

use super::endpoint_codec::{encode_endpoint, endpoint_to_bytes};
use crate::domain::{
    invariant_non_blank, CallIntent, CorrelationConfig, CorrelationError, DirectCall,
    DirectRequest, EnvelopeBody, InputData, RequestEnvelope, ServiceCall, ServiceRequest,
};
use serde_json::value::RawValue;

/// Builds canonical envelopes for a fixed gateway configuration.
#[derive(Clone, Debug)]
pub struct RequestEnvelopeBuilder {
    config: CorrelationConfig,
}

impl RequestEnvelopeBuilder {
    /// Create a builder.
    pub fn new(config: CorrelationConfig) -> Self {
        Self { config }
    }

    /// Build the envelope for any intent.
    pub fn build(&self, intent: &CallIntent) -> Result<RequestEnvelope, CorrelationError> {
        match intent {
            CallIntent::Service(call) => self.build_service(call),
            CallIntent::Direct(call) => self.build_direct(call),
        }
    }

    /// Build a service-style envelope.
    ///
    /// The caller's input must be JSON and is carried through unchanged, both
    /// into the envelope body and into the recorded input.
    pub fn build_service(&self, call: &ServiceCall) -> Result<RequestEnvelope, CorrelationError> {
        invariant_non_blank("service_name", &call.service_name)?;

        let body = parse_service_input(&call.input)?;
        let input = serde_json::to_string(&InputData::wrap(&body))
            .map_err(|e| CorrelationError::InvalidInput(format!("service input: {}", e)))?;

        let request = ServiceRequest {
            service_name: call.service_name.clone(),
            input,
            timeout: call.timeout,
            callback: call.callback.clone(),
        };

        let blob = serde_json::to_vec(&request)
            .map_err(|e| CorrelationError::InvalidInput(format!("service request: {}", e)))?;

        Ok(RequestEnvelope {
            destination: call
                .gateway
                .clone()
                .unwrap_or_else(|| self.config.service_gateway.clone()),
            args: vec![self.config.service_operation.as_bytes().to_vec(), blob],
            body: EnvelopeBody::Service(request),
            original_input: call
                .recorded_input
                .clone()
                .unwrap_or_else(|| call.input.clone()),
        })
    }

    /// Build a direct-style envelope.
    pub fn build_direct(&self, call: &DirectCall) -> Result<RequestEnvelope, CorrelationError> {
        invariant_non_blank("destination_chain_id", &call.destination_chain_id)?;
        invariant_non_blank("destination_contract", &call.destination_contract)?;

        let endpoint = encode_endpoint(
            &call.destination_chain_id,
            &call.destination_contract,
            &call.semantics_verb,
        );
        let semantics = endpoint.endpoint_type;
        let call_arguments = serde_json::to_string(&call.arguments)
            .map_err(|e| CorrelationError::InvalidInput(format!("call arguments: {}", e)))?;

        let mut args = vec![
            self.config.direct_operation.as_bytes().to_vec(),
            endpoint_to_bytes(&endpoint)?,
            semantics.wire_tag().as_bytes().to_vec(),
            call_arguments.as_bytes().to_vec(),
        ];
        if let Some(callback) = &call.callback {
            args.push(callback.contract.as_bytes().to_vec());
            args.push(callback.function.as_bytes().to_vec());
        }

        Ok(RequestEnvelope {
            destination: self.config.cross_chain_gateway.clone(),
            args,
            body: EnvelopeBody::Direct(DirectRequest {
                endpoint,
                semantics,
                call_arguments: call_arguments.clone(),
                callback: call.callback.clone(),
            }),
            original_input: call_arguments,
        })
    }
}

/// Validate loosely-typed service input. Must be valid JSON; the text is
/// kept as given.
pub fn parse_service_input(raw: &str) -> Result<Box<RawValue>, CorrelationError> {
    serde_json::from_str(raw)
        .map_err(|e| CorrelationError::InvalidInput(format!("service input is not JSON: {}", e)))
}

/// Parse loosely-typed call arguments. Must be a JSON array of strings.
pub fn parse_call_arguments(raw: &str) -> Result<Vec<String>, CorrelationError> {
    serde_json::from_str(raw).map_err(|e| {
        CorrelationError::InvalidInput(format!("call arguments must be a string array: {}", e))
    })
}
