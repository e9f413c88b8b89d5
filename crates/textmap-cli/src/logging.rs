use tracing_subscriber::EnvFilter;

use crate::cli::LogLevel;

/// Install the stderr fmt subscriber.
///
/// `RUST_LOG`, when set and valid, takes precedence over `--log-level`.
pub fn init(level: LogLevel) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_directive()));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
