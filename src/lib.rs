#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]

//! # Overview
//!
//! `logfan` is a process-wide logging facility: subsystems hold a named
//! [`Module`] handle and route severity-tagged messages through a shared
//! [`LogContext`], which fans each event out to every registered [`Sink`]
//! (console, file, or caller-defined) in registration order. The context
//! also owns the centralized bookkeeping the sinks render into each header:
//! a monotonic event counter, an error tally, a host-supplied frame index,
//! and an uptime clock.
//!
//! # Design
//!
//! The whole pipeline serializes on one reentrant lock, making counter
//! increments, fan-out, and severity side effects atomic across threads.
//! Severity drives escalation: [`Error`](Severity::Error) fires the
//! [`logfan_bp`] debugger anchor and bumps the error tally,
//! [`Fatal`](Severity::Fatal) additionally guarantees console visibility by
//! auto-provisioning a console sink, terminates tracked child processes, and
//! aborts the process. Routing below Fatal is a no-op while no sinks are
//! registered, so quiet configurations pay nothing for chatty call sites.
//!
//! # Invariants
//!
//! - The sink registry is only read or mutated under the routing lock;
//!   dispatch order is registration order.
//! - The event counter grows by exactly one per completed routing call and
//!   never changes on skipped calls.
//! - The error tally counts only Error/Fatal events that reached at least
//!   one sink.
//! - A Fatal event terminates the process even when the registry is empty
//!   or the context has been shut down.
//!
//! # Errors
//!
//! Sink I/O is best-effort: a sink that fails to open or write its
//! destination drops that one event locally, without disturbing the other
//! sinks or the routing call. No severity below Fatal ever panics, aborts,
//! or returns an error to the caller.
//!
//! # Examples
//!
//! Register a file sink on an explicit context and route one event:
//!
//! ```
//! use logfan::{LogContext, Module, Severity};
//! use std::sync::Arc;
//!
//! let ctx = Arc::new(LogContext::new());
//! let dir = tempfile::tempdir()?;
//! let path = dir.path().join("app.log");
//! ctx.register_file_sink(&path);
//!
//! let boot = Module::with_context(Arc::clone(&ctx), "boot");
//! logfan::report!(boot, Severity::Info, "cold start in {}ms", 12);
//!
//! assert_eq!(ctx.events_routed(), 1);
//! assert_eq!(ctx.error_count(), 0);
//! let line = std::fs::read_to_string(&path)?;
//! assert!(line.contains("INFO boot"));
//! assert!(line.ends_with("cold start in 12ms\n"));
//! # Ok::<(), std::io::Error>(())
//! ```
//!
//! Hosts that prefer ambient state can use the process-wide context through
//! the free functions ([`register_console_sink`], [`register_file_sink`],
//! [`clear_sinks`]) and plain [`Module::new`].

mod context;
mod event;
mod fatal;
mod global;
mod macros;
mod module;
mod severity;
mod sink;
mod thread_name;

pub use context::LogContext;
pub use event::{HeaderStyle, LogEvent, SourceLocation};
pub use fatal::{FatalHook, logfan_bp};
pub use global::{
    clear_sinks, error_count, events_routed, global, register_console_sink, register_file_sink,
    register_sink, set_frame_index, shutdown,
};
pub use module::Module;
pub use severity::Severity;
pub use sink::{ConsoleSink, FileSink, Sink, SinkIdentity};
pub use thread_name::{current_thread_label, register_thread_name};
