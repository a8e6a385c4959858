//! Logging setup for applications embedding provconf.
//!
//! The library only emits `tracing` events; nothing is printed unless a
//! subscriber is installed, either by the host application or with
//! [`init_logging`].

use pc_common::{Error, Result};
use tracing_subscriber::EnvFilter;

/// Environment variable read for the filter when none is given.
pub const LOG_ENV_VAR: &str = "PC_LOG";

const DEFAULT_FILTER: &str = "info";

/// Output format of the installed subscriber.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    #[default]
    Text,
    /// One JSON object per event.
    Json,
}

fn build_filter(filter: Option<&str>) -> Result<EnvFilter> {
    match filter {
        Some(directives) => {
            EnvFilter::try_new(directives).map_err(|e| Error::Logging(e.to_string()))
        }
        None => Ok(EnvFilter::try_from_env(LOG_ENV_VAR)
            .unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))),
    }
}

/// Install a global stderr subscriber.
///
/// `filter` takes `EnvFilter` directives (`"pc_config=debug"`); without one
/// the filter comes from `PC_LOG`, defaulting to `info`. Fails if a global
/// subscriber is already set.
pub fn init_logging(format: LogFormat, filter: Option<&str>) -> Result<()> {
    let filter = build_filter(filter)?;
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let installed = match format {
        LogFormat::Text => builder.try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
    installed.map_err(|e| Error::Logging(e.to_string()))
}
