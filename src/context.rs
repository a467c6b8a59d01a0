//! The routing pipeline and its process-wide state.
//!
//! [`LogContext`] owns everything the facility shares across call sites: the
//! ordered sink registry, the monotonic event counter, the error tally, the
//! host-supplied frame index, the uptime clock, and the fatal escalation
//! hooks. All of it is reachable only through a shared-ownership handle, so
//! teardown is an explicit, deterministic state instead of a static
//! destruction race: a context that has been [shut down](LogContext::shutdown)
//! turns late routing calls into no-ops.

use std::cell::RefCell;
use std::fmt;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use parking_lot::{Mutex, ReentrantMutex};

use crate::event::{LogEvent, SourceLocation};
use crate::fatal::{self, FatalHook};
use crate::severity::Severity;
use crate::sink::{ConsoleSink, FileSink, Sink, SinkIdentity};
use crate::thread_name;

/// Process-wide logging state: sink registry, counters, clock, escalation.
///
/// The registry and every counter are serialized by one reentrant lock, making
/// the whole pipeline (counter increment, fan-out, severity side effects)
/// atomic across threads. Reentrancy is load-bearing: the fatal path
/// re-enters the public registration surface to guarantee console visibility,
/// and sinks are allowed to route again during dispatch.
///
/// # Examples
///
/// ```
/// use logfan::{LogContext, Severity};
/// use std::sync::Arc;
///
/// let ctx = Arc::new(LogContext::new());
/// assert_eq!(ctx.sink_count(), 0);
///
/// // Routing without sinks is a no-op for everything below Fatal.
/// ctx.route("boot", Severity::Info, None, format_args!("skipped"));
/// assert_eq!(ctx.events_routed(), 0);
/// ```
pub struct LogContext {
    sinks: ReentrantMutex<RefCell<Vec<Arc<dyn Sink>>>>,
    events_routed: AtomicU64,
    error_count: AtomicU64,
    frame_index: AtomicU64,
    start: Instant,
    enabled: AtomicBool,
    children: Mutex<Vec<u32>>,
    fatal_hook: Mutex<Option<FatalHook>>,
}

impl LogContext {
    /// Creates an empty, enabled context. The uptime clock starts here.
    #[must_use]
    pub fn new() -> Self {
        Self {
            sinks: ReentrantMutex::new(RefCell::new(Vec::new())),
            events_routed: AtomicU64::new(0),
            error_count: AtomicU64::new(0),
            frame_index: AtomicU64::new(0),
            start: Instant::now(),
            enabled: AtomicBool::new(true),
            children: Mutex::new(Vec::new()),
            fatal_hook: Mutex::new(None),
        }
    }

    // ------------------------------------------------------------------
    // Sink registry
    // ------------------------------------------------------------------

    /// Registers a console sink bound to stderr.
    ///
    /// Idempotent: if a console-class sink is already present this is a no-op,
    /// so the terminal probe runs only when a sink is actually constructed.
    pub fn register_console_sink(&self) {
        let guard = self.sinks.lock();
        let exists = guard
            .borrow()
            .iter()
            .any(|sink| sink.identity() == SinkIdentity::Console);
        if !exists {
            guard.borrow_mut().push(Arc::new(ConsoleSink::stderr()));
        }
    }

    /// Registers a file sink appending to `path`.
    ///
    /// Idempotent per distinct path; a second registration for the same path
    /// is discarded.
    pub fn register_file_sink(&self, path: impl Into<PathBuf>) {
        self.register_sink(Arc::new(FileSink::new(path)));
    }

    /// Appends `sink` to the registry unless one with the same identity exists.
    ///
    /// Insertion order is dispatch order. The dedup scan is linear and runs
    /// under the routing lock; registration is not a hot path.
    pub fn register_sink(&self, sink: Arc<dyn Sink>) {
        let guard = self.sinks.lock();
        let identity = sink.identity();
        let exists = guard.borrow().iter().any(|s| s.identity() == identity);
        if !exists {
            guard.borrow_mut().push(sink);
        }
    }

    /// Removes every sink, releasing owned destinations.
    ///
    /// Subsequent non-Fatal routing calls become no-ops until a sink is
    /// registered again.
    pub fn clear_sinks(&self) {
        self.sinks.lock().borrow_mut().clear();
    }

    /// Number of registered sinks.
    pub fn sink_count(&self) -> usize {
        self.sinks.lock().borrow().len()
    }

    /// Reports whether at least one sink is registered.
    ///
    /// Callers on uncommon informational paths can use this to skip building
    /// expensive report arguments entirely; the pipeline itself never renders
    /// a message that no sink will receive.
    pub fn has_sinks(&self) -> bool {
        self.sink_count() != 0
    }

    /// Reports whether a sink with `identity` is registered.
    pub fn has_sink(&self, identity: &SinkIdentity) -> bool {
        self.sinks
            .lock()
            .borrow()
            .iter()
            .any(|sink| sink.identity() == *identity)
    }

    // ------------------------------------------------------------------
    // Counters and clock
    // ------------------------------------------------------------------

    /// Total events that completed routing (monotonic, starts at zero).
    pub fn events_routed(&self) -> u64 {
        self.events_routed.load(Ordering::Relaxed)
    }

    /// Total Error- and Fatal-severity events that reached at least one sink.
    pub fn error_count(&self) -> u64 {
        self.error_count.load(Ordering::Relaxed)
    }

    /// Current host-application frame index; zero means "unused".
    pub fn frame_index(&self) -> u64 {
        self.frame_index.load(Ordering::Relaxed)
    }

    /// Sets the frame index included in subsequent event headers.
    ///
    /// The host updates this from its main loop; the facility never advances
    /// it on its own.
    pub fn set_frame_index(&self, frame: u64) {
        self.frame_index.store(frame, Ordering::Relaxed);
    }

    /// Uptime since the context was created.
    pub fn uptime(&self) -> Duration {
        self.start.elapsed()
    }

    // ------------------------------------------------------------------
    // Fatal escalation
    // ------------------------------------------------------------------

    /// Tracks a child process to be terminated when a fatal event fires.
    pub fn track_child(&self, pid: u32) {
        let mut children = self.children.lock();
        if !children.contains(&pid) {
            children.push(pid);
        }
    }

    /// Stops tracking a child process (it exited or is managed elsewhere).
    pub fn untrack_child(&self, pid: u32) {
        self.children.lock().retain(|&p| p != pid);
    }

    /// Replaces the terminal action of the fatal path.
    ///
    /// Without a hook a fatal event ends the process via
    /// [`std::process::abort`] and the routing call never returns. A hook is
    /// strictly a test/embedder interception point: when it returns, routing
    /// returns normally. Child-process termination happens before the hook
    /// either way.
    pub fn set_fatal_hook<F>(&self, hook: F)
    where
        F: Fn() + Send + Sync + 'static,
    {
        *self.fatal_hook.lock() = Some(Arc::new(hook));
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Disables the context and drops every sink.
    ///
    /// Routing calls after shutdown proceed without touching counters or
    /// destinations; only Fatal severity keeps its termination guarantee.
    /// Shutdown is idempotent and cannot be undone.
    pub fn shutdown(&self) {
        self.enabled.store(false, Ordering::Release);
        self.clear_sinks();
    }

    /// Reports whether [`shutdown`](Self::shutdown) has run.
    pub fn is_shut_down(&self) -> bool {
        !self.enabled.load(Ordering::Acquire)
    }

    // ------------------------------------------------------------------
    // Routing
    // ------------------------------------------------------------------

    /// Routes one formatted message from `module` to every registered sink.
    ///
    /// The pipeline, atomic under the routing lock:
    ///
    /// 1. empty registry and severity below Fatal: return without side
    ///    effects (the message is never rendered);
    /// 2. increment the event counter;
    /// 3. Fatal only: auto-provision a console sink through
    ///    [`register_console_sink`](Self::register_console_sink) so the
    ///    message is visible even in file-only configurations;
    /// 4. render the message once and dispatch to every sink in registration
    ///    order, swallowing per-sink I/O failures;
    /// 5. Error and Fatal: fire the [`logfan_bp`](crate::logfan_bp) debugger
    ///    anchor, and tally the error if the event reached a sink;
    /// 6. Fatal only: terminate tracked children, then run the fatal action
    ///    (process abort unless a hook was installed).
    pub fn route(
        &self,
        module: &str,
        severity: Severity,
        source: Option<SourceLocation>,
        message: fmt::Arguments<'_>,
    ) {
        if self.is_shut_down() {
            // Late calls during teardown are inert, but Fatal keeps its
            // termination guarantee.
            if severity == Severity::Fatal {
                self.escalate_fatal();
            }
            return;
        }

        let guard = self.sinks.lock();
        if guard.borrow().is_empty() && severity != Severity::Fatal {
            return;
        }

        self.events_routed.fetch_add(1, Ordering::Relaxed);

        if severity == Severity::Fatal {
            // Re-enters the routing lock; this is why it is reentrant.
            self.register_console_sink();
        }

        let text = fmt::format(message);
        let thread = thread_name::current_thread_label();
        let snapshot: Vec<Arc<dyn Sink>> = guard.borrow().iter().map(Arc::clone).collect();
        let event = LogEvent {
            elapsed: self.start.elapsed(),
            frame: self.frame_index.load(Ordering::Relaxed),
            severity,
            module,
            source,
            thread: thread.as_deref(),
            message: &text,
        };

        let mut reached = false;
        for sink in &snapshot {
            // Best-effort per sink: one failing destination must not starve
            // the others.
            if sink.report(&event).is_ok() {
                reached = true;
            }
        }

        if severity.is_error() {
            fatal::logfan_bp();
            if reached {
                self.error_count.fetch_add(1, Ordering::Relaxed);
            }
        }

        if severity == Severity::Fatal {
            self.escalate_fatal();
        }
    }

    /// Terminal step of a fatal report. Never returns unless a hook is set.
    fn escalate_fatal(&self) {
        let children = self.children.lock().clone();
        fatal::terminate_children(&children);
        let hook = self.fatal_hook.lock().clone();
        match hook {
            Some(hook) => hook(),
            None => process::abort(),
        }
    }
}

impl Default for LogContext {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::Mutex as StdMutex;
    use std::sync::atomic::AtomicUsize;

    /// Sink that records rendered lines in memory.
    struct RecordingSink {
        label: String,
        lines: StdMutex<Vec<String>>,
    }

    impl RecordingSink {
        fn new(label: &str) -> Arc<Self> {
            Arc::new(Self {
                label: label.to_owned(),
                lines: StdMutex::new(Vec::new()),
            })
        }

        fn lines(&self) -> Vec<String> {
            self.lines.lock().expect("lines lock").clone()
        }
    }

    impl Sink for RecordingSink {
        fn identity(&self) -> SinkIdentity {
            SinkIdentity::Custom(self.label.clone())
        }

        fn report(&self, event: &LogEvent<'_>) -> io::Result<()> {
            let mut buf = Vec::new();
            event.write_line(&mut buf, crate::event::HeaderStyle::Plain)?;
            self.lines
                .lock()
                .expect("lines lock")
                .push(String::from_utf8(buf).expect("utf-8"));
            Ok(())
        }
    }

    /// Sink whose destination always fails.
    struct BrokenSink;

    impl Sink for BrokenSink {
        fn identity(&self) -> SinkIdentity {
            SinkIdentity::Custom("broken".to_owned())
        }

        fn report(&self, _event: &LogEvent<'_>) -> io::Result<()> {
            Err(io::Error::other("destination gone"))
        }
    }

    #[test]
    fn empty_registry_skips_counters_below_fatal() {
        let ctx = LogContext::new();
        ctx.route("core", Severity::Error, None, format_args!("x"));
        assert_eq!(ctx.events_routed(), 0);
        assert_eq!(ctx.error_count(), 0);
    }

    #[test]
    fn routed_event_reaches_sink_and_counts() {
        let ctx = LogContext::new();
        let sink = RecordingSink::new("mem");
        ctx.register_sink(Arc::clone(&sink) as Arc<dyn Sink>);

        ctx.route("core", Severity::Info, None, format_args!("hello {}", 1));

        assert_eq!(ctx.events_routed(), 1);
        assert_eq!(ctx.error_count(), 0);
        let lines = sink.lines();
        assert_eq!(lines.len(), 1);
        assert!(lines[0].contains("INFO core"));
        assert!(lines[0].ends_with("hello 1\n"));
    }

    #[test]
    fn error_severity_increments_tally_once() {
        let ctx = LogContext::new();
        let sink = RecordingSink::new("mem");
        ctx.register_sink(sink);

        ctx.route("core", Severity::Error, None, format_args!("bad"));
        ctx.route("core", Severity::Warning, None, format_args!("meh"));

        assert_eq!(ctx.events_routed(), 2);
        assert_eq!(ctx.error_count(), 1);
    }

    #[test]
    fn error_tally_requires_a_reachable_sink() {
        let ctx = LogContext::new();
        ctx.register_sink(Arc::new(BrokenSink));

        ctx.route("core", Severity::Error, None, format_args!("lost"));

        assert_eq!(ctx.events_routed(), 1, "the call itself completed");
        assert_eq!(ctx.error_count(), 0, "no sink accepted the event");
    }

    #[test]
    fn broken_sink_does_not_starve_later_sinks() {
        let ctx = LogContext::new();
        let sink = RecordingSink::new("mem");
        ctx.register_sink(Arc::new(BrokenSink));
        ctx.register_sink(Arc::clone(&sink) as Arc<dyn Sink>);

        ctx.route("core", Severity::Error, None, format_args!("kept"));

        assert_eq!(sink.lines().len(), 1);
        assert_eq!(ctx.error_count(), 1);
    }

    #[test]
    fn custom_sink_registration_dedups_by_identity() {
        let ctx = LogContext::new();
        ctx.register_sink(RecordingSink::new("a"));
        ctx.register_sink(RecordingSink::new("a"));
        ctx.register_sink(RecordingSink::new("b"));
        assert_eq!(ctx.sink_count(), 2);
    }

    #[test]
    fn clear_sinks_returns_registry_to_silent() {
        let ctx = LogContext::new();
        let sink = RecordingSink::new("mem");
        ctx.register_sink(Arc::clone(&sink) as Arc<dyn Sink>);
        ctx.clear_sinks();

        ctx.route("core", Severity::Info, None, format_args!("dropped"));

        assert!(!ctx.has_sinks());
        assert_eq!(ctx.events_routed(), 0);
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn dispatch_preserves_registration_order() {
        let ctx = LogContext::new();
        let order = Arc::new(StdMutex::new(Vec::new()));

        struct OrderSink {
            tag: &'static str,
            order: Arc<StdMutex<Vec<&'static str>>>,
        }

        impl Sink for OrderSink {
            fn identity(&self) -> SinkIdentity {
                SinkIdentity::Custom(self.tag.to_owned())
            }

            fn report(&self, _event: &LogEvent<'_>) -> io::Result<()> {
                self.order.lock().expect("order lock").push(self.tag);
                Ok(())
            }
        }

        ctx.register_sink(Arc::new(OrderSink {
            tag: "first",
            order: Arc::clone(&order),
        }));
        ctx.register_sink(Arc::new(OrderSink {
            tag: "second",
            order: Arc::clone(&order),
        }));

        ctx.route("core", Severity::Info, None, format_args!("ordered"));

        assert_eq!(*order.lock().expect("order lock"), vec!["first", "second"]);
    }

    #[test]
    fn fatal_hook_intercepts_termination() {
        let ctx = LogContext::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let observer = Arc::clone(&fired);
        ctx.set_fatal_hook(move || {
            observer.fetch_add(1, Ordering::SeqCst);
        });
        let sink = RecordingSink::new("mem");
        ctx.register_sink(Arc::clone(&sink) as Arc<dyn Sink>);

        ctx.route("core", Severity::Fatal, None, format_args!("unrecoverable"));

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(ctx.events_routed(), 1);
        assert_eq!(ctx.error_count(), 1);
        assert!(sink.lines()[0].contains("FATAL ERROR core"));
    }

    #[test]
    fn fatal_auto_provisions_a_console_sink() {
        let ctx = LogContext::new();
        ctx.set_fatal_hook(|| {});
        ctx.register_sink(RecordingSink::new("mem"));
        assert!(!ctx.has_sink(&SinkIdentity::Console));

        ctx.route("core", Severity::Fatal, None, format_args!("visible"));

        assert!(ctx.has_sink(&SinkIdentity::Console));
    }

    #[test]
    fn fatal_terminates_even_with_empty_registry() {
        let ctx = LogContext::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let observer = Arc::clone(&fired);
        ctx.set_fatal_hook(move || {
            observer.fetch_add(1, Ordering::SeqCst);
        });

        ctx.route("core", Severity::Fatal, None, format_args!("last words"));

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(ctx.events_routed(), 1, "fatal is never skipped");
        assert!(ctx.has_sink(&SinkIdentity::Console), "console was provisioned");
    }

    #[test]
    fn shutdown_makes_routing_inert() {
        let ctx = LogContext::new();
        let sink = RecordingSink::new("mem");
        ctx.register_sink(Arc::clone(&sink) as Arc<dyn Sink>);

        ctx.shutdown();
        ctx.route("core", Severity::Error, None, format_args!("late"));

        assert!(ctx.is_shut_down());
        assert_eq!(ctx.events_routed(), 0);
        assert_eq!(ctx.sink_count(), 0);
        assert!(sink.lines().is_empty());
    }

    #[test]
    fn shutdown_keeps_the_fatal_guarantee() {
        let ctx = LogContext::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let observer = Arc::clone(&fired);
        ctx.set_fatal_hook(move || {
            observer.fetch_add(1, Ordering::SeqCst);
        });

        ctx.shutdown();
        ctx.route("core", Severity::Fatal, None, format_args!("still fatal"));

        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert_eq!(ctx.events_routed(), 0, "no dispatch after shutdown");
    }

    #[test]
    fn child_tracking_dedups_and_untracks() {
        let ctx = LogContext::new();
        ctx.track_child(41);
        ctx.track_child(41);
        ctx.track_child(42);
        ctx.untrack_child(41);
        assert_eq!(*ctx.children.lock(), vec![42]);
    }

    #[test]
    fn sink_may_reenter_routing_during_dispatch() {
        struct ReentrantSink {
            ctx: StdMutex<Option<Arc<LogContext>>>,
            seen: AtomicUsize,
        }

        impl Sink for ReentrantSink {
            fn identity(&self) -> SinkIdentity {
                SinkIdentity::Custom("reentrant".to_owned())
            }

            fn report(&self, event: &LogEvent<'_>) -> io::Result<()> {
                self.seen.fetch_add(1, Ordering::SeqCst);
                if event.severity == Severity::Warning {
                    let ctx = self.ctx.lock().expect("ctx lock").clone();
                    if let Some(ctx) = ctx {
                        ctx.route("inner", Severity::Info, None, format_args!("from sink"));
                    }
                }
                Ok(())
            }
        }

        let ctx = Arc::new(LogContext::new());
        let sink = Arc::new(ReentrantSink {
            ctx: StdMutex::new(Some(Arc::clone(&ctx))),
            seen: AtomicUsize::new(0),
        });
        ctx.register_sink(Arc::clone(&sink) as Arc<dyn Sink>);

        ctx.route("outer", Severity::Warning, None, format_args!("trigger"));

        assert_eq!(sink.seen.load(Ordering::SeqCst), 2, "outer + reentered event");
        assert_eq!(ctx.events_routed(), 2);
    }
}
