//! Structured logging.
//!
//! Logs carry consistent fields so that log shippers can index them:
//! - `subsystem`: component that emitted the line (dispatcher, resolver, ...)
//! - `correlation_id`: identifier returned by the dispatch gateway
//! - Additional context fields

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::{TelemetryConfig, TelemetryError};

/// Install the global `tracing` subscriber.
///
/// Returns `false` when a global subscriber was already installed, which is the
/// normal case for test binaries that initialise logging from several tests.
pub fn init_logging(config: &TelemetryConfig) -> Result<bool, TelemetryError> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .map_err(|e| TelemetryError::Config(e.to_string()))?;

    let json_layer = (config.console_output && config.json_logs).then(|| {
        tracing_subscriber::fmt::layer()
            .json()
            .with_target(true)
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
    });

    let text_layer = (config.console_output && !config.json_logs)
        .then(|| tracing_subscriber::fmt::layer().with_target(true));

    let installed = tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .try_init()
        .is_ok();

    if installed {
        tracing::debug!(
            service = %config.service_name,
            json_logs = config.json_logs,
            "Structured logging configured"
        );
    }

    Ok(installed)
}

/// Log a request-related event with standard fields.
#[macro_export]
macro_rules! log_request_event {
    ($level:ident, $subsystem:expr, $msg:expr, $correlation_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = $subsystem,
            correlation_id = %$correlation_id,
            $($($field)*,)?
            $msg
        )
    };
}

/// Log a callback-related event with standard fields.
#[macro_export]
macro_rules! log_callback_event {
    ($level:ident, $msg:expr, $correlation_id:expr $(, $($field:tt)*)?) => {
        tracing::$level!(
            subsystem = "resolver",
            correlation_id = %$correlation_id,
            $($($field)*,)?
            $msg
        )
    };
}
