//! Logging and tracing setup.
//!
//! Logs go to **stderr** so they never mix with anything the host process
//! reads from stdout. Session tokens and passwords are never logged.
//!
//! # Environment Variables
//!
//! - `RUST_LOG`: Controls log levels (e.g., `info`, `debug`, `orynetwork_provider=debug`)
//!
//! # Examples
//!
//! ```bash
//! # Show request-level logs for the provider only
//! RUST_LOG=orynetwork_provider=debug ./my-host
//! ```

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

fn env_filter(default_level: &str) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}

fn install(default_level: &str) -> Result<(), tracing_subscriber::util::TryInitError> {
    tracing_subscriber::registry()
        .with(env_filter(default_level))
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(true)
                .with_thread_ids(false)
                .with_file(false)
                .with_line_number(false),
        )
        .try_init()
}

/// Initialize the default logging subscriber at `info` level.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging() {
    init_logging_with_default("info");
}

/// Initialize logging with a custom default level.
///
/// The level is used only if `RUST_LOG` is not set.
///
/// # Panics
///
/// Panics if a global subscriber has already been set.
pub fn init_logging_with_default(default_level: &str) {
    if let Err(err) = install(default_level) {
        panic!("failed to install logging subscriber: {err}");
    }
}

/// Try to initialize logging, returning false if already initialized.
pub fn try_init_logging() -> bool {
    install("info").is_ok()
}
