//! Logging setup for the `minish` binary.
//!
//! Diagnostics go to stderr through `tracing`. The level is taken from the
//! `RUST_LOG` environment variable and defaults to `warn`, so an interactive
//! session only shows reported errors unless asked for more:
//! - `RUST_LOG=debug` - substitution results and parsed requests
//! - `RUST_LOG=info` - process spawns

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Install the global subscriber for the process.
pub fn init_logging() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let stderr_layer = fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true)
        .without_time();

    if let Err(e) = tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .try_init()
    {
        eprintln!("Warning: failed to initialize logging: {}", e);
    }
}
