//! Structured logging initialization.
//!
//! Mirrors the reference implementation's env-filtered subscriber: the
//! filter is read from `CODEGRAPH_LOG`, falling back to `RUST_LOG`, falling
//! back to `warn`. `--verbose` on the CLI raises the default by one level
//! without needing either environment variable set.

use std::sync::OnceLock;
use tracing_subscriber::EnvFilter;

static INIT: OnceLock<()> = OnceLock::new();

/// Initializes the global tracing subscriber. Safe to call more than once;
/// only the first call takes effect.
pub fn init(verbose: bool) {
    INIT.get_or_init(|| {
        let default_level = if verbose { "info" } else { "warn" };
        let filter = EnvFilter::try_from_env("CODEGRAPH_LOG")
            .or_else(|_| EnvFilter::try_from_env("RUST_LOG"))
            .unwrap_or_else(|_| EnvFilter::new(default_level));

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .compact()
            .init();
    });
}
