//! Logging initialization.
//!
//! Structured logging goes through `tracing`; the filter comes from
//! `RUST_LOG` with an `info` default.

use once_cell::sync::OnceCell;
use tracing_subscriber::EnvFilter;

static INIT: OnceCell<()> = OnceCell::new();

/// Initialize the tracing subscriber once. Safe to call repeatedly
/// (later calls, including from tests, are no-ops).
pub fn init() {
    INIT.get_or_init(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .try_init();
    });
}
