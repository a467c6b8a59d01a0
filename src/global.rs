//! src/global.rs
//! Lazily-created process-wide context and its free-function surface.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use crate::context::LogContext;
use crate::sink::Sink;

static GLOBAL: OnceLock<Arc<LogContext>> = OnceLock::new();

/// Returns the process-wide context, creating it on first use.
///
/// The uptime clock starts at the first call, so hosts that want log
/// timestamps measured from program start should touch the facility (register
/// a sink, or call this) early in `main`.
#[must_use]
pub fn global() -> Arc<LogContext> {
    Arc::clone(GLOBAL.get_or_init(|| Arc::new(LogContext::new())))
}

/// Registers a console sink on the process-wide context. Idempotent.
pub fn register_console_sink() {
    global().register_console_sink();
}

/// Registers a file sink on the process-wide context. Idempotent per path.
pub fn register_file_sink(path: impl Into<PathBuf>) {
    global().register_file_sink(path);
}

/// Registers a custom sink on the process-wide context. Idempotent per identity.
pub fn register_sink(sink: Arc<dyn Sink>) {
    global().register_sink(sink);
}

/// Removes every sink from the process-wide context.
pub fn clear_sinks() {
    global().clear_sinks();
}

/// Sets the frame index on the process-wide context.
pub fn set_frame_index(frame: u64) {
    global().set_frame_index(frame);
}

/// Events routed through the process-wide context.
#[must_use]
pub fn events_routed() -> u64 {
    global().events_routed()
}

/// Error tally of the process-wide context.
#[must_use]
pub fn error_count() -> u64 {
    global().error_count()
}

/// Shuts the process-wide context down; late routing calls become no-ops.
pub fn shutdown() {
    global().shutdown();
}
