//! Per-subsystem reporting handles.

use std::fmt;
use std::sync::Arc;

use crate::context::LogContext;
use crate::event::SourceLocation;
use crate::severity::Severity;

/// A named reporting handle, constructed once per subsystem.
///
/// The handle pairs a module name with a shared [`LogContext`] and is the
/// call-site surface of the facility: subsystems keep one `Module` in a
/// locally centralized place and route every diagnostic through it. Cloning
/// is cheap and handles may be shared freely across threads.
///
/// # Examples
///
/// ```
/// use logfan::{LogContext, Module, Severity};
/// use std::sync::Arc;
///
/// let ctx = Arc::new(LogContext::new());
/// let net = Module::with_context(Arc::clone(&ctx), "net");
///
/// // No sinks are registered, so this is a silent no-op.
/// net.report(Severity::Info, format_args!("listening"));
/// assert_eq!(ctx.events_routed(), 0);
/// ```
#[derive(Clone)]
pub struct Module {
    name: String,
    ctx: Arc<LogContext>,
}

impl Module {
    /// Creates a handle bound to the process-wide context.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_context(crate::global(), name)
    }

    /// Creates a handle bound to an explicit context.
    #[must_use]
    pub fn with_context(ctx: Arc<LogContext>, name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ctx,
        }
    }

    /// The module name rendered in every header this handle emits.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The context this handle routes through.
    #[must_use]
    pub fn context(&self) -> &Arc<LogContext> {
        &self.ctx
    }

    /// Routes a formatted message. See [`LogContext::route`].
    ///
    /// Prefer the [`report!`](crate::report) macro, which forwards
    /// `format_args!` without an intermediate allocation at the call site.
    pub fn report(&self, severity: Severity, message: fmt::Arguments<'_>) {
        self.ctx.route(&self.name, severity, None, message);
    }

    /// Routes a formatted message annotated with its call site.
    ///
    /// Prefer the [`report_source!`](crate::report_source) macro, which
    /// captures `file!()` and `line!()` automatically.
    pub fn report_source(
        &self,
        severity: Severity,
        file: &'static str,
        line: u32,
        message: fmt::Arguments<'_>,
    ) {
        self.ctx
            .route(&self.name, severity, Some(SourceLocation { file, line }), message);
    }
}

impl fmt::Debug for Module {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Module").field("name", &self.name).finish_non_exhaustive()
    }
}
