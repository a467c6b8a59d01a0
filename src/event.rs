//! Log event values and the shared header renderer.
//!
//! A [`LogEvent`] is an ephemeral view assembled by the routing pipeline for
//! exactly one dispatch: every field borrows from the caller or from state
//! captured under the routing lock, and nothing is persisted once the sinks
//! return. Sinks render the same bracketed header through
//! [`LogEvent::write_header`], so console and file output stay line-compatible
//! and custom sinks can opt into the standard layout.

use std::io::{self, Write};
use std::time::Duration;

use crate::severity::Severity;

/* ANSI sequences */
const RED: &str = "\x1b[1;31m";
const YELLOW: &str = "\x1b[1;33m";
const GREEN: &str = "\x1b[1;32m";
const MAGENTA: &str = "\x1b[1;35m";
const CYAN: &str = "\x1b[1;36m";
const BOLD: &str = "\x1b[1m";
const NORMAL: &str = "\x1b[0m";

/// Source location captured at the call site via `file!()` and `line!()`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SourceLocation {
    /// Source file path as produced by `file!()`.
    pub file: &'static str,
    /// 1-based line number as produced by `line!()`.
    pub line: u32,
}

/// Selects the header rendition a sink asks for.
///
/// File sinks always use [`Plain`](HeaderStyle::Plain); the console sink picks
/// [`Ansi`](HeaderStyle::Ansi) when its construction-time terminal probe
/// enabled color.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HeaderStyle {
    /// Uncolored header, identical byte layout on every destination.
    #[default]
    Plain,
    /// ANSI-colored header for interactive terminals.
    Ansi,
}

impl HeaderStyle {
    /// Reports whether ANSI escape sequences are emitted.
    #[must_use]
    pub const fn is_ansi(self) -> bool {
        matches!(self, Self::Ansi)
    }
}

/// One fully-assembled log event, valid for the duration of a single dispatch.
#[derive(Clone, Copy, Debug)]
pub struct LogEvent<'a> {
    /// Monotonic uptime since the owning context was created.
    pub elapsed: Duration,
    /// Host-application frame index; zero means "unused" and is not rendered.
    pub frame: u64,
    /// Escalation level of this event.
    pub severity: Severity,
    /// Name of the subsystem that reported the event.
    pub module: &'a str,
    /// Optional call-site location, rendered as `{file:line}`.
    pub source: Option<SourceLocation>,
    /// Optional registered name of the reporting thread.
    pub thread: Option<&'a str>,
    /// Formatted message body.
    pub message: &'a str,
}

impl LogEvent<'_> {
    /// Writes the bracketed event header.
    ///
    /// Layout: `[<elapsed> (<frame>) <SEVERITY> <module> {<file>:<line>}
    /// (<thread>)] ` where the frame, source, and thread fields appear only
    /// when present/nonzero. Elapsed seconds are printed with four decimal
    /// places in a five-wide field.
    pub fn write_header(&self, w: &mut dyn Write, style: HeaderStyle) -> io::Result<()> {
        let secs = self.elapsed.as_secs_f64();
        if style.is_ansi() {
            write!(w, "{BOLD}[{GREEN}{secs:5.4} ")?;
            if self.frame != 0 {
                write!(w, "({}) ", self.frame)?;
            }
            let color = match self.severity {
                Severity::Info => CYAN,
                Severity::Warning => YELLOW,
                Severity::Error | Severity::Fatal => RED,
            };
            write!(w, "{BOLD}{color}{}", self.severity.label())?;
            write!(w, "{NORMAL}{BOLD} {}", self.module)?;
            if let Some(src) = self.source {
                write!(w, "{BOLD}{YELLOW} {{{}:{}}}", src.file, src.line)?;
            }
            if let Some(thread) = self.thread {
                write!(w, "{BOLD}{MAGENTA} ({thread})")?;
            }
            write!(w, "{NORMAL}{BOLD}] {NORMAL}")
        } else {
            write!(w, "[{secs:5.4} ")?;
            if self.frame != 0 {
                write!(w, "({}) ", self.frame)?;
            }
            write!(w, "{} {}", self.severity.label(), self.module)?;
            if let Some(src) = self.source {
                write!(w, " {{{}:{}}}", src.file, src.line)?;
            }
            if let Some(thread) = self.thread {
                write!(w, " ({thread})")?;
            }
            write!(w, "] ")
        }
    }

    /// Writes the header, the message body, and the line terminator.
    pub fn write_line(&self, w: &mut dyn Write, style: HeaderStyle) -> io::Result<()> {
        self.write_header(w, style)?;
        writeln!(w, "{}", self.message)
    }
}
