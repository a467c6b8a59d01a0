//! Console sink: renders events to the process's standard error stream.

use std::io::{self, Write};

use is_terminal::IsTerminal;
use parking_lot::Mutex;

use super::{Sink, SinkIdentity};
use crate::event::{HeaderStyle, LogEvent};

/// Sink that renders log events to standard error.
///
/// Interactive capability is probed once at construction and cached: color is
/// enabled only when stderr is a terminal and the `TERM` hint names an
/// xterm-compatible terminal. On an interactive terminal each report first
/// clears the current line, so log output overwrites in-place progress
/// displays instead of appending after them.
///
/// Output is serialized by a sink-local lock in addition to the routing lock
/// held by the caller, keeping bytes contiguous under re-entrant dispatch.
pub struct ConsoleSink {
    out: Mutex<Box<dyn Write + Send>>,
    interactive: bool,
    style: HeaderStyle,
}

impl ConsoleSink {
    /// Creates the standard console sink bound to the process's stderr.
    #[must_use]
    pub fn stderr() -> Self {
        let interactive = io::stderr().is_terminal();
        let style = if interactive && term_hints_ansi() {
            HeaderStyle::Ansi
        } else {
            HeaderStyle::Plain
        };
        Self {
            out: Mutex::new(Box::new(io::stderr())),
            interactive,
            style,
        }
    }

    /// Creates a console-class sink over an arbitrary writer.
    ///
    /// The sink reports [`SinkIdentity::Console`], participates in console
    /// dedup, and renders the plain (uncolored, no line clearing) header.
    /// Intended for tests and embedders that redirect console output.
    #[must_use]
    pub fn with_writer(writer: Box<dyn Write + Send>) -> Self {
        Self {
            out: Mutex::new(writer),
            interactive: false,
            style: HeaderStyle::Plain,
        }
    }

    /// Reports whether the construction-time probe found an interactive terminal.
    #[must_use]
    pub const fn is_interactive(&self) -> bool {
        self.interactive
    }

    /// Returns the header style selected at construction.
    #[must_use]
    pub const fn style(&self) -> HeaderStyle {
        self.style
    }
}

impl Sink for ConsoleSink {
    fn identity(&self) -> SinkIdentity {
        SinkIdentity::Console
    }

    fn report(&self, event: &LogEvent<'_>) -> io::Result<()> {
        let mut out = self.out.lock();
        if self.interactive {
            clear_line(out.as_mut())?;
        }
        event.write_line(out.as_mut(), self.style)?;
        out.flush()
    }
}

/// Blanks the terminal's current line so the event starts at column zero.
fn clear_line(w: &mut dyn Write) -> io::Result<()> {
    let width = terminal_width();
    write!(w, "\r")?;
    for _ in 0..width {
        write!(w, " ")?;
    }
    write!(w, "\r")
}

/// Reports whether the `TERM` hint promises ANSI color support.
fn term_hints_ansi() -> bool {
    std::env::var("TERM").is_ok_and(|term| term.starts_with("xterm"))
}

/// Queries the stderr terminal width, defaulting to 80 columns.
#[cfg(unix)]
fn terminal_width() -> usize {
    let mut ws = libc::winsize {
        ws_row: 0,
        ws_col: 0,
        ws_xpixel: 0,
        ws_ypixel: 0,
    };
    // SAFETY: TIOCGWINSZ writes into the winsize out-parameter and has no
    // other side effects; a failed ioctl leaves `ws` zeroed.
    let rc = unsafe { libc::ioctl(libc::STDERR_FILENO, libc::TIOCGWINSZ, &raw mut ws) };
    let width = if rc == -1 { 80 } else { usize::from(ws.ws_col) };
    width.max(10)
}

#[cfg(not(unix))]
fn terminal_width() -> usize {
    80
}
