//! Process-wide tracing/logging setup.

use tracing_subscriber::EnvFilter;

/// Default filter: our own crates at info, everything else at warn.
const DEFAULT_FILTER: &str = "warn,stockbridge=info,stockbridge_source=info,\
                              stockbridge_reconciler=info,stockbridge_core=info";

/// Initialize logging for the process.
///
/// `RUST_LOG` overrides the default filter. Safe to call more than once;
/// later calls are no-ops.
pub fn init() {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .compact()
        .try_init();
}
