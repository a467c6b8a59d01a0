//! src/severity.rs
//! Severity classification for routed log events.

use std::fmt;

/// Severity level attached to every routed log event.
///
/// Levels are ordered by escalation: [`Info`](Severity::Info) and
/// [`Warning`](Severity::Warning) are informational, [`Error`](Severity::Error)
/// is recorded in the process-wide error tally, and [`Fatal`](Severity::Fatal)
/// always terminates the process after dispatch.
///
/// # Examples
///
/// ```
/// use logfan::Severity;
///
/// assert!(Severity::Fatal > Severity::Error);
/// assert_eq!(Severity::Warning.label(), "WARNING");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Severity {
    /// Non-error informative message.
    Info,
    /// Non-error warning message.
    Warning,
    /// Recoverable error message; increments the error tally.
    Error,
    /// Non-recoverable error message; terminates the process.
    Fatal,
}

impl Severity {
    /// Returns the header label rendered by every sink.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
            Self::Fatal => "FATAL ERROR",
        }
    }

    /// Reports whether the level participates in error accounting.
    ///
    /// Both [`Error`](Severity::Error) and [`Fatal`](Severity::Fatal) trip the
    /// debugger trap and the error tally; only `Fatal` escalates to process
    /// termination.
    #[must_use]
    pub const fn is_error(self) -> bool {
        matches!(self, Self::Error | Self::Fatal)
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}
