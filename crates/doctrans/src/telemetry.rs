//! Tracing subscriber setup for binaries and tests.

use tracing_subscriber::EnvFilter;

/// Installs the global tracing subscriber with an `info` default.
///
/// Respects `RUST_LOG` when set. Safe to call more than once; later calls
/// are no-ops.
pub fn init() {
    init_with_default("info");
}

/// Installs the global tracing subscriber with the given default directives.
pub fn init_with_default(directives: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(directives));

    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();

    // `try_init` bridges `log` records when it installs the subscriber; make
    // sure the bridge also exists when a subscriber was installed elsewhere.
    let _ = tracing_log::LogTracer::init();
}
