//! Logging initialization.
//!
//! Logs go to STDERR so that JSON written to STDOUT stays machine-readable.
//! The level comes from `RUST_LOG` (default `warn`); `--verbose` forces
//! `debug`.

use tracing_subscriber::EnvFilter;

pub fn init(verbose: bool) -> anyhow::Result<()> {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize logging: {}", e))
}
