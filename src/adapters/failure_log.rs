//! CSV failure log adapter.
//!
//! Implements [`FailureLog`] as an append-only text file of
//! `timestamp, message` lines.  Timestamps are RFC 3339 UTC with whole
//! seconds.  A line is flushed as soon as it is written so a crash loses
//! at most the event in flight.

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::Path;

use chrono::{DateTime, SecondsFormat, Utc};
use log::{info, warn};

use crate::app::ports::FailureLog;
use crate::error::LogError;

pub struct CsvFailureLog<W> {
    out: W,
}

impl CsvFailureLog<Box<dyn Write>> {
    /// Append to `path` (created if missing).  When the file cannot be
    /// opened every line is discarded instead; failures are still on the
    /// console through the event sink.
    pub fn append_or_discard(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match open_append(path) {
            Ok(file) => {
                info!("FailureLog: appending to {}", path.display());
                Self::new(Box::new(file))
            }
            Err(e) => {
                warn!("FailureLog: cannot open {} ({}), records will be dropped", path.display(), e);
                Self::new(Box::new(io::sink()))
            }
        }
    }
}

/// Open (or create) `path` for appending.
fn open_append(path: &Path) -> io::Result<File> {
    OpenOptions::new().create(true).append(true).open(path)
}

impl<W: Write> CsvFailureLog<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

/// Flatten newlines and quote the field when it carries a comma or quote.
fn csv_field(message: &str) -> String {
    let flat: String = message
        .chars()
        .map(|c| if c == '\n' || c == '\r' { ' ' } else { c })
        .collect();
    if flat.contains(',') || flat.contains('"') {
        format!("\"{}\"", flat.replace('"', "\"\""))
    } else {
        flat
    }
}

impl<W: Write> FailureLog for CsvFailureLog<W> {
    fn append(&mut self, timestamp: DateTime<Utc>, message: &str) -> Result<(), LogError> {
        writeln!(
            self.out,
            "{}, {}",
            timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
            csv_field(message)
        )?;
        self.out.flush()?;
        Ok(())
    }
}
