//! Correlation engine configuration
//!
//! Key prefix and remote operation names are passed in at construction rather
//! than held in process-wide constants.

use super::errors::CorrelationError;
use serde::{Deserialize, Serialize};
use std::env;

/// Default namespace for pending-record keys.
pub const DEFAULT_KEY_PREFIX: &str = "css_";

/// Default contract handling both service-style and direct-style envelopes.
pub const DEFAULT_GATEWAY_CONTRACT: &str = "cc_cross";

/// Configuration for the correlation engine.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrelationConfig {
    /// Prefix of every pending-record key.
    pub key_prefix: String,
    /// Contract receiving service-style envelopes.
    pub service_gateway: String,
    /// Remote operation selecting service-style handling.
    pub service_operation: String,
    /// Contract receiving direct-style envelopes.
    pub cross_chain_gateway: String,
    /// Remote operation selecting direct-style handling.
    pub direct_operation: String,
    /// Callback function used when a host operation does not name one.
    pub default_callback_function: String,
    /// Advisory timeout used when a host operation does not supply one.
    pub default_timeout: u64,
}

impl Default for CorrelationConfig {
    fn default() -> Self {
        Self {
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
            service_gateway: DEFAULT_GATEWAY_CONTRACT.to_string(),
            service_operation: "callservice".to_string(),
            cross_chain_gateway: DEFAULT_GATEWAY_CONTRACT.to_string(),
            direct_operation: "sendrequest".to_string(),
            default_callback_function: "callback".to_string(),
            default_timeout: 100,
        }
    }
}

impl CorrelationConfig {
    /// Create configuration from environment variables.
    ///
    /// # Environment Variables
    ///
    /// - `XCALL_KEY_PREFIX` (default: `css_`)
    /// - `XCALL_SERVICE_GATEWAY` (default: `cc_cross`)
    /// - `XCALL_SERVICE_OPERATION` (default: `callservice`)
    /// - `XCALL_CROSS_CHAIN_GATEWAY` (default: `cc_cross`)
    /// - `XCALL_DIRECT_OPERATION` (default: `sendrequest`)
    /// - `XCALL_CALLBACK_FUNCTION` (default: `callback`)
    /// - `XCALL_DEFAULT_TIMEOUT` (default: 100)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            key_prefix: env::var("XCALL_KEY_PREFIX").unwrap_or(defaults.key_prefix),
            service_gateway: env::var("XCALL_SERVICE_GATEWAY").unwrap_or(defaults.service_gateway),
            service_operation: env::var("XCALL_SERVICE_OPERATION")
                .unwrap_or(defaults.service_operation),
            cross_chain_gateway: env::var("XCALL_CROSS_CHAIN_GATEWAY")
                .unwrap_or(defaults.cross_chain_gateway),
            direct_operation: env::var("XCALL_DIRECT_OPERATION")
                .unwrap_or(defaults.direct_operation),
            default_callback_function: env::var("XCALL_CALLBACK_FUNCTION")
                .unwrap_or(defaults.default_callback_function),
            default_timeout: env::var("XCALL_DEFAULT_TIMEOUT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(defaults.default_timeout),
        }
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), CorrelationError> {
        let fields = [
            ("key_prefix", &self.key_prefix),
            ("service_gateway", &self.service_gateway),
            ("service_operation", &self.service_operation),
            ("cross_chain_gateway", &self.cross_chain_gateway),
            ("direct_operation", &self.direct_operation),
            ("default_callback_function", &self.default_callback_function),
        ];
        for (name, value) in fields {
            if value.trim().is_empty() {
                return Err(CorrelationError::InvalidInput(format!(
                    "config field {} must not be blank",
                    name
                )));
            }
        }
        Ok(())
    }

    /// Ledger key for a correlation id.
    pub fn record_key(&self, correlation_id: &str) -> String {
        format!("{}{}", self.key_prefix, correlation_id)
    }
}

/// Fluent builder for [`CorrelationConfig`].
#[derive(Clone, Debug, Default)]
pub struct CorrelationConfigBuilder {
    config: CorrelationConfig,
}

impl CorrelationConfigBuilder {
    /// Start from the defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the key prefix.
    pub fn key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.key_prefix = prefix.into();
        self
    }

    /// Set the service gateway contract and operation.
    pub fn service_gateway(mut self, contract: impl Into<String>, operation: impl Into<String>) -> Self {
        self.config.service_gateway = contract.into();
        self.config.service_operation = operation.into();
        self
    }

    /// Set the cross-chain gateway contract and operation.
    pub fn cross_chain_gateway(
        mut self,
        contract: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        self.config.cross_chain_gateway = contract.into();
        self.config.direct_operation = operation.into();
        self
    }

    /// Set the default callback function.
    pub fn default_callback_function(mut self, function: impl Into<String>) -> Self {
        self.config.default_callback_function = function.into();
        self
    }

    /// Set the default advisory timeout.
    pub fn default_timeout(mut self, timeout: u64) -> Self {
        self.config.default_timeout = timeout;
        self
    }

    /// Build and validate.
    pub fn build(self) -> Result<CorrelationConfig, CorrelationError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
