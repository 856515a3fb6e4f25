//! Totals over the record log.

use crate::error::Result;
use crate::types::{Direction, LogEntry};
use serde::Serialize;

/// Message counts by direction, from one pass over the log.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LogStats {
    /// Parsed records
    pub total: usize,
    pub sent: usize,
    pub received: usize,
    /// Legacy records with no recorded direction
    pub unspecified: usize,
    /// Lines matching no known format (not counted in `total`)
    pub unparsed: usize,
}

impl LogStats {
    /// Tally entries as produced by [`LogReader::read_all`](crate::reader::LogReader::read_all).
    pub fn collect<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = Result<LogEntry>>,
    {
        let mut stats = LogStats::default();
        for entry in entries {
            stats.add(&entry?);
        }
        Ok(stats)
    }

    pub fn add(&mut self, entry: &LogEntry) {
        match entry {
            LogEntry::Record(record) => {
                self.total += 1;
                match record.direction {
                    Some(Direction::Sent) => self.sent += 1,
                    Some(Direction::Received) => self.received += 1,
                    None => self.unspecified += 1,
                }
            }
            LogEntry::Unparsed(_) => self.unparsed += 1,
        }
    }
}
