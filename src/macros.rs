//! Call-site macros forwarding `format_args!` into the routing pipeline.

/// Routes a formatted message through a [`Module`](crate::Module) handle.
///
/// Formatting is delegated to `format_args!`, so the template is only
/// rendered once the pipeline has decided the event will reach a sink.
///
/// # Examples
///
/// ```
/// use logfan::{LogContext, Module, Severity};
/// use std::sync::Arc;
///
/// let ctx = Arc::new(LogContext::new());
/// let dir = tempfile::tempdir()?;
/// let path = dir.path().join("app.log");
/// ctx.register_file_sink(&path);
///
/// let net = Module::with_context(ctx, "net");
/// logfan::report!(net, Severity::Info, "listening on port {}", 8080);
///
/// let text = std::fs::read_to_string(&path)?;
/// assert!(text.contains("INFO net"));
/// assert!(text.contains("listening on port 8080"));
/// # Ok::<(), std::io::Error>(())
/// ```
#[macro_export]
macro_rules! report {
    ($module:expr, $severity:expr, $($arg:tt)+) => {
        $module.report($severity, ::std::format_args!($($arg)+))
    };
}

/// Routes a formatted message annotated with the call site's `file:line`.
///
/// # Examples
///
/// ```
/// use logfan::{LogContext, Module, Severity};
/// use std::sync::Arc;
///
/// let ctx = Arc::new(LogContext::new());
/// let dir = tempfile::tempdir()?;
/// let path = dir.path().join("app.log");
/// ctx.register_file_sink(&path);
///
/// let disk = Module::with_context(ctx, "disk");
/// logfan::report_source!(disk, Severity::Error, "checksum mismatch in block {}", 9);
///
/// let text = std::fs::read_to_string(&path)?;
/// assert!(text.contains("ERROR disk"));
/// assert!(text.contains(file!()));
/// # Ok::<(), std::io::Error>(())
/// ```
#[macro_export]
macro_rules! report_source {
    ($module:expr, $severity:expr, $($arg:tt)+) => {
        $module.report_source(
            $severity,
            ::std::file!(),
            ::std::line!(),
            ::std::format_args!($($arg)+),
        )
    };
}
