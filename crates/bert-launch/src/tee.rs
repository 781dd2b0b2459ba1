//! Output duplication
//!
//! [`Tee`] copies every byte to the console and, when one is attached, to a
//! log file. A log that fails mid-run is dropped with a warning and the
//! console keeps receiving output, the same way `tee(1)` keeps going when
//! one of its files goes bad.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;
use tracing::warn;

/// Writer that fans out to a console and an optional log
#[derive(Debug)]
pub struct Tee<C: Write, L: Write = File> {
    console: C,
    log: Option<L>,
}

impl<C: Write, L: Write> Tee<C, L> {
    /// Duplicate to `console` and `log`
    pub fn new(console: C, log: Option<L>) -> Self {
        Self { console, log }
    }

    /// Whether the log side is still attached
    pub fn has_log(&self) -> bool {
        self.log.is_some()
    }

    /// Flush both sides and close the log
    ///
    /// # Errors
    ///
    /// Returns the console flush error. Log flush errors detach the log
    /// instead.
    pub fn finish(mut self) -> io::Result<()> {
        self.flush()?;
        self.log = None;
        Ok(())
    }

    fn detach_log(&mut self, err: &io::Error) {
        warn!("log write failed, continuing on console only: {err}");
        self.log = None;
    }
}

impl<C: Write> Tee<C, File> {
    /// Open `path` as the log side
    ///
    /// When the file cannot be opened the tee runs console-only; the warning
    /// is the only trace, as with `tee(1)`.
    pub fn open(console: C, path: &Path, append: bool) -> Self {
        let log = OpenOptions::new()
            .create(true)
            .write(true)
            .append(append)
            .truncate(!append)
            .open(path);

        match log {
            Ok(file) => Self::new(console, Some(file)),
            Err(err) => {
                warn!("cannot open log {}: {err}", path.display());
                Self::new(console, None)
            }
        }
    }
}

impl<C: Write, L: Write> Write for Tee<C, L> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.console.write_all(buf)?;
        // stdout is line buffered; `\r` progress lines must not wait for a newline.
        self.console.flush()?;
        if let Some(log) = self.log.as_mut() {
            if let Err(err) = log.write_all(buf) {
                self.detach_log(&err);
            }
        }
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        if let Some(log) = self.log.as_mut() {
            if let Err(err) = log.flush() {
                self.detach_log(&err);
            }
        }
        self.console.flush()
    }
}

impl<C: Write, L: Write> Drop for Tee<C, L> {
    fn drop(&mut self) {
        let _ = self.flush();
    }
}
