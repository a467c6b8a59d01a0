//! File sink: appends rendered events to a named file.

use std::fs::OpenOptions;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use parking_lot::Mutex;

use super::{Sink, SinkIdentity};
use crate::event::{HeaderStyle, LogEvent};

/// Sink that appends one plain-text line per event to a file.
///
/// The file is opened in append mode immediately before each write and closed
/// again afterwards. Holding no file handle between events trades throughput
/// for crash-safety: a partial write cannot corrupt later events, and external
/// rotation or truncation between writes is tolerated. A failed open drops
/// the event for this sink only.
pub struct FileSink {
    path: PathBuf,
    lock: Mutex<()>,
}

impl FileSink {
    /// Creates a file sink bound to `path`.
    ///
    /// The path is not opened or validated here; the first report performs
    /// the first open, so a sink registered before its log directory exists
    /// simply drops events until the destination becomes writable.
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Returns the destination path.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn identity(&self) -> SinkIdentity {
        SinkIdentity::File(self.path.clone())
    }

    fn report(&self, event: &LogEvent<'_>) -> io::Result<()> {
        let _guard = self.lock.lock();
        let file = OpenOptions::new().create(true).append(true).open(&self.path)?;
        let mut out = BufWriter::new(file);
        event.write_line(&mut out, HeaderStyle::Plain)?;
        out.flush()
    }
}
