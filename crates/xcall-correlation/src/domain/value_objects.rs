//! # Domain Value Objects
//!
//! Immutable value types for request/callback correlation.

use serde::{Deserialize, Serialize};
use std::fmt;

/// How the remote side processes a cross-chain call.
///
/// Serialised with the wire tags understood by the cross-chain gateway.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EndpointSemantics {
    /// Read-only contract query.
    #[serde(rename = "contract_query")]
    Query,
    /// State-mutating contract transaction.
    #[serde(rename = "contract_tx")]
    Transaction,
    /// Routed to an off-chain service provider.
    #[serde(rename = "service")]
    Service,
}

impl EndpointSemantics {
    /// Wire tag for this semantics.
    pub fn wire_tag(&self) -> &'static str {
        match self {
            Self::Query => "contract_query",
            Self::Transaction => "contract_tx",
            Self::Service => "service",
        }
    }

    /// Parse a wire tag.
    pub fn from_wire_tag(tag: &str) -> Option<Self> {
        match tag {
            "contract_query" => Some(Self::Query),
            "contract_tx" => Some(Self::Transaction),
            "service" => Some(Self::Service),
            _ => None,
        }
    }

    /// Whether the remote call may mutate state.
    pub fn is_mutating(&self) -> bool {
        matches!(self, Self::Transaction)
    }
}

impl fmt::Display for EndpointSemantics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_tag())
    }
}

/// Wire-level endpoint descriptor handed to the cross-chain gateway.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointDescriptor {
    /// Destination chain identifier.
    #[serde(rename = "DestChainID")]
    pub dest_chain_id: String,
    /// Destination contract address or name.
    #[serde(rename = "EndpointAddress")]
    pub endpoint_address: String,
    /// Endpoint semantics.
    #[serde(rename = "EndpointType")]
    pub endpoint_type: EndpointSemantics,
    /// Mirrors `endpoint_type`; gateways read either field.
    #[serde(rename = "DestChainType")]
    pub dest_chain_type: EndpointSemantics,
}

/// Contract and function the gateway calls back with the result.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackTarget {
    /// Callback contract.
    #[serde(rename = "chainCode")]
    pub contract: String,
    /// Callback function.
    #[serde(rename = "funcName")]
    pub function: String,
}

impl CallbackTarget {
    /// Build a target only if both parts are non-blank after trimming.
    ///
    /// `None` means fire-and-forget.
    pub fn from_parts(contract: &str, function: &str) -> Option<Self> {
        let contract = contract.trim();
        let function = function.trim();
        if contract.is_empty() || function.is_empty() {
            return None;
        }
        Some(Self {
            contract: contract.to_string(),
            function: function.to_string(),
        })
    }

    /// Same as [`CallbackTarget::from_parts`] for optional inputs.
    pub fn from_optional(contract: Option<&str>, function: Option<&str>) -> Option<Self> {
        Self::from_parts(contract.unwrap_or_default(), function.unwrap_or_default())
    }
}

/// Pending record lifecycle.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum RecordState {
    /// Dispatched, no callback observed yet.
    #[default]
    Pending,
    /// A callback has written the output.
    Completed,
}

impl RecordState {
    /// Check if transition is valid.
    ///
    /// `Completed -> Completed` is accepted: a repeated callback overwrites the output.
    pub fn can_transition_to(&self, next: RecordState) -> bool {
        matches!(next, Self::Completed)
    }

    /// Check if terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed)
    }
}

impl fmt::Display for RecordState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pending => f.write_str("PENDING"),
            Self::Completed => f.write_str("COMPLETED"),
        }
    }
}
