//! Read side: parse the record log back into structured records.
//!
//! ## Design Principles
//!
//! 1. **Tolerant**: every historical line format is accepted, richest first
//! 2. **Resilient**: a line that matches no format becomes [`LogEntry::Unparsed`]
//!    and never aborts the read
//! 3. **Stateless**: each [`LogReader::read_all`] call re-reads the log from the
//!    start; nothing is cached between calls
//!
//! Only storage failures are returned as errors.

mod formats;

pub use formats::LineFormat;

use crate::error::Result;
use crate::store::{LogStore, RecordLines};
use crate::types::{LogEntry, MessageRecord, MessageView};
use std::sync::Arc;

/// Parses the record log of a [`LogStore`].
#[derive(Clone)]
pub struct LogReader {
    store: Arc<dyn LogStore>,
}

impl LogReader {
    pub fn new(store: Arc<dyn LogStore>) -> Self {
        Self { store }
    }

    /// Lazily parse every non-blank line, in file order.
    pub fn read_all(&self) -> Result<LogEntries<'_>> {
        Ok(LogEntries {
            lines: self.store.read_lines()?,
            line_number: 0,
        })
    }

    /// Collect every entry, parsed or not.
    pub fn entries(&self) -> Result<Vec<LogEntry>> {
        self.read_all()?.collect()
    }

    /// Collect parsed records only, in file order.
    pub fn records(&self) -> Result<Vec<MessageRecord>> {
        let mut records = Vec::new();
        for entry in self.read_all()? {
            if let Some(record) = entry?.into_record() {
                records.push(record);
            }
        }
        Ok(records)
    }

    /// The flat read-endpoint view of [`Self::records`].
    pub fn views(&self) -> Result<Vec<MessageView>> {
        Ok(self.records()?.iter().map(MessageView::from).collect())
    }
}

/// Iterator returned by [`LogReader::read_all`].
pub struct LogEntries<'a> {
    lines: RecordLines<'a>,
    line_number: usize,
}

impl Iterator for LogEntries<'_> {
    type Item = Result<LogEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let line = match self.lines.next()? {
                Ok(line) => line,
                Err(e) => return Some(Err(e)),
            };
            self.line_number += 1;

            let trimmed = line.trim();
            if trimmed.is_empty() {
                continue;
            }

            return Some(Ok(match LineFormat::detect(trimmed) {
                Some((format, record)) => {
                    tracing::trace!(line = self.line_number, format = format.name(), "Parsed line");
                    LogEntry::Record(record)
                }
                None => {
                    tracing::debug!(line = self.line_number, "Unrecognized record log line");
                    LogEntry::Unparsed(trimmed.to_string())
                }
            }));
        }
    }
}
