//! Tracing initialization for `orbitctl`.

use tracing_subscriber::EnvFilter;

/// Install the global `tracing` subscriber.
///
/// Respects `RUST_LOG` if set, otherwise filters at `level`. Logs go to
/// stderr so command output on stdout stays clean.
pub fn init(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
