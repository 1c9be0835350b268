//! Shared helpers for the integration suites.

use std::sync::Once;

static INIT: Once = Once::new();

/// Initializes a tracing subscriber once per test binary.
///
/// Honors `RUST_LOG`; defaults to warnings so failing runs stay readable.
pub fn init_test_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "warn".into()),
            )
            .with_test_writer()
            .try_init();
    });
}
