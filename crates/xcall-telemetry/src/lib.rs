//! # XCall Telemetry
//!
//! Logging bootstrap shared by the XCall crates.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use xcall_telemetry::{init_telemetry, TelemetryConfig};
//!
//! let config = TelemetryConfig::from_env();
//! let _guard = init_telemetry(config).expect("Failed to init telemetry");
//! ```
//!
//! ## Environment Variables
//!
//! | Variable | Default | Description |
//! |----------|---------|-------------|
//! | `OTEL_SERVICE_NAME` | `xcall` | Service name in logs |
//! | `XCALL_LOG_LEVEL` | `info` | Log level filter |
//! | `XCALL_JSON_LOGS` | `false` | JSON formatted output |
//! | `XCALL_CONSOLE_OUTPUT` | `true` | Write logs to stdout |

#![warn(missing_docs)]

mod config;
mod logging;

pub use config::TelemetryConfig;
pub use logging::init_logging;

use thiserror::Error;

/// Telemetry initialization errors
#[derive(Error, Debug)]
pub enum TelemetryError {
    /// The log filter or another setting could not be parsed.
    #[error("Invalid configuration: {0}")]
    Config(String),
}

/// Initialize logging for the process.
///
/// Calling this more than once is harmless: later calls return a guard whose
/// [`TelemetryGuard::owns_subscriber`] is `false`.
pub fn init_telemetry(config: TelemetryConfig) -> Result<TelemetryGuard, TelemetryError> {
    let owns_subscriber = logging::init_logging(&config)?;
    Ok(TelemetryGuard {
        service_name: config.service_name,
        owns_subscriber,
    })
}

/// Guard returned by [`init_telemetry`]. Logs a shutdown line when dropped.
pub struct TelemetryGuard {
    service_name: String,
    owns_subscriber: bool,
}

impl TelemetryGuard {
    /// Whether this guard's call installed the global subscriber.
    pub fn owns_subscriber(&self) -> bool {
        self.owns_subscriber
    }
}

impl Drop for TelemetryGuard {
    fn drop(&mut self) {
        if self.owns_subscriber {
            tracing::info!(service = %self.service_name, "Shutting down telemetry...");
        }
    }
}
