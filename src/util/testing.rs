//! Test support shared by unit and integration tests.

use std::path::{Path, PathBuf};
use std::sync::OnceLock;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

static TRACING: OnceLock<()> = OnceLock::new();

/// Route crate logs to the test harness, once per test binary.
///
/// Honors `RUST_LOG`; defaults to trace for costtree and warn elsewhere.
pub fn init_test_setup() {
    TRACING.get_or_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("warn,costtree=trace"));
        let layer = fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_filter(filter);
        // another harness may already own the global dispatcher
        if let Err(e) = tracing_subscriber::registry().with(layer).try_init() {
            eprintln!("test tracing not installed: {e}");
        }
        tracing::debug!("test tracing ready");
    });
}

/// Directory of a checked-in snapshot fixture under `tests/resources`.
pub fn resource_dir(name: &str) -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("resources")
        .join(name)
}
