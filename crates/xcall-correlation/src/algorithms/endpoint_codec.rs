//! # Endpoint Codec
//!
//! Maps (destination chain, destination contract, verb) to the endpoint
//! descriptor understood by the cross-chain gateway.
//!
//! Verb classification is case-insensitive and fails safe: anything that is not
//! a known mutation verb is a read-only query, never an error.

use crate::domain::{CorrelationError, EndpointDescriptor, EndpointSemantics};

/// Literal requesting service-style routing. Bypasses verb classification.
pub const SERVICE_ROUTING: &str = "service";

/// Fabric-style mutation verb.
pub const VERB_INVOKE: &str = "invoke";

/// Ledger-style mutation verb.
pub const VERB_TX: &str = "tx";

/// Classify a caller-supplied verb.
pub fn classify_verb(verb: &str) -> EndpointSemantics {
    if verb == SERVICE_ROUTING {
        return EndpointSemantics::Service;
    }

    let verb = verb.trim();
    if verb.eq_ignore_ascii_case(VERB_INVOKE) || verb.eq_ignore_ascii_case(VERB_TX) {
        EndpointSemantics::Transaction
    } else {
        EndpointSemantics::Query
    }
}

/// Encode a destination using the verb classification rules.
pub fn encode_endpoint(chain_id: &str, contract: &str, verb: &str) -> EndpointDescriptor {
    encode_endpoint_with(chain_id, contract, classify_verb(verb))
}

/// Encode a destination with already-resolved semantics.
pub fn encode_endpoint_with(
    chain_id: &str,
    contract: &str,
    semantics: EndpointSemantics,
) -> EndpointDescriptor {
    EndpointDescriptor {
        dest_chain_id: chain_id.to_string(),
        endpoint_address: contract.to_string(),
        endpoint_type: semantics,
        dest_chain_type: semantics,
    }
}

/// Serialise a descriptor to its wire bytes.
pub fn endpoint_to_bytes(descriptor: &EndpointDescriptor) -> Result<Vec<u8>, CorrelationError> {
    serde_json::to_vec(descriptor)
        .map_err(|e| CorrelationError::InvalidInput(format!("endpoint encoding: {}", e)))
}

/// Decode a descriptor from its wire bytes.
pub fn decode_endpoint(bytes: &[u8]) -> Result<EndpointDescriptor, CorrelationError> {
    serde_json::from_slice(bytes)
        .map_err(|e| CorrelationError::InvalidInput(format!("endpoint decoding: {}", e)))
}
