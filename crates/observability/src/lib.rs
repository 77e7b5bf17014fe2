//! Tracing setup shared by every binary and test harness.

/// Tracing subscriber configuration.
pub mod tracing;

pub use crate::tracing::{LogFormat, UnknownLogFormat};

/// Initialize process-wide tracing from `RUST_LOG` (default `info`), JSON output.
///
/// This is safe to call multiple times; subsequent calls become no-ops and
/// return `false`.
pub fn init() -> bool {
    tracing::init()
}

/// Initialize process-wide tracing with an explicit format and filter.
///
/// This is safe to call multiple times; subsequent calls become no-ops and
/// return `false`.
pub fn init_with(format: LogFormat, filter: &str) -> bool {
    tracing::init_with(format, filter)
}
