//! Subscriber setup for the command-line tools.
//!
//! The library only emits `tracing` events; binaries call `init` once to send
//! them to stderr, keeping stdout free for JSON output.

use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (`EnvFilter` syntax).
pub const ENV_LOG_FILTER: &str = "BLOCKFENCE_LOG";

const DEFAULT_FILTER: &str = "warn";

/// Install a stderr `fmt` subscriber. `verbose` lowers the default filter to
/// `debug` when `BLOCKFENCE_LOG` is unset. Safe to call more than once.
pub fn init(verbose: bool) {
    let filter = EnvFilter::try_from_env(ENV_LOG_FILTER).unwrap_or_else(|_| {
        EnvFilter::new(if verbose { "blockfence=debug" } else { DEFAULT_FILTER })
    });
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}
