#![forbid(unsafe_code)]

//! Log subscriber setup for the CLI.

use tracing_subscriber::EnvFilter;

use crate::error::{HarnessError, Result};

/// Environment variable holding the log filter directives.
pub const LOG_ENV: &str = "WAYPOINT_LOG";

/// Filter used when [`LOG_ENV`] is unset or invalid.
pub const DEFAULT_FILTER: &str = "warn";

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER))
}

/// Install a stderr subscriber, as JSON lines when `json` is set.
pub fn init(json: bool) -> Result<()> {
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter())
        .with_writer(std::io::stderr);
    let installed = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
    installed.map_err(|e| HarnessError::Logging(e.to_string()))
}
