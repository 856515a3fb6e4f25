//! In-memory message store for tests and embedding.

use super::{AppendOutcome, LogStore, RecordLines};
use crate::error::{Error, Result};
use crate::types::{Fingerprint, MessageRecord};
use std::sync::{Mutex, MutexGuard};

#[derive(Debug, Default)]
struct Inner {
    lines: Vec<String>,
    fingerprints: Vec<String>,
}

/// Record log and fingerprint index held as two vectors.
///
/// Lines are stored exactly as the file store would write them, so the
/// [`LogReader`](crate::reader::LogReader) sees the same text either way.
#[derive(Debug, Default)]
pub struct MemoryLogStore {
    inner: Mutex<Inner>,
}

impl MemoryLogStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the record log with raw lines, e.g. legacy-format history.
    pub fn with_lines<I, S>(lines: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let store = Self::default();
        if let Ok(mut inner) = store.inner.lock() {
            inner.lines = lines.into_iter().map(Into::into).collect();
        }
        store
    }

    /// Number of record lines currently held.
    pub fn line_count(&self) -> usize {
        self.lock().map(|inner| inner.lines.len()).unwrap_or(0)
    }

    /// Number of fingerprints currently held.
    pub fn fingerprint_count(&self) -> usize {
        self.lock().map(|inner| inner.fingerprints.len()).unwrap_or(0)
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| Error::storage("<memory>", std::io::Error::other("store mutex poisoned")))
    }
}

impl LogStore for MemoryLogStore {
    fn ensure_initialized(&self) -> Result<()> {
        Ok(())
    }

    fn contains_fingerprint(&self, fingerprint: &Fingerprint) -> Result<bool> {
        Ok(self
            .lock()?
            .fingerprints
            .iter()
            .any(|fp| fp == fingerprint.as_str()))
    }

    fn append_fingerprint(&self, fingerprint: &Fingerprint) -> Result<()> {
        self.lock()?.fingerprints.push(fingerprint.to_string());
        Ok(())
    }

    fn append_record(&self, record: &MessageRecord) -> Result<()> {
        let line = record.to_line();
        self.lock()?
            .lines
            .push(line.trim_end_matches('\n').to_string());
        Ok(())
    }

    fn append_if_absent(
        &self,
        fingerprint: &Fingerprint,
        record: &MessageRecord,
    ) -> Result<AppendOutcome> {
        // Single guard across check and both appends
        let mut inner = self.lock()?;
        if inner.fingerprints.iter().any(|fp| fp == fingerprint.as_str()) {
            return Ok(AppendOutcome::AlreadyPresent);
        }
        inner.fingerprints.push(fingerprint.to_string());
        inner
            .lines
            .push(record.to_line().trim_end_matches('\n').to_string());
        Ok(AppendOutcome::Appended)
    }

    fn read_lines(&self) -> Result<RecordLines<'_>> {
        // Snapshot so readers never hold the lock while parsing
        let lines = self.lock()?.lines.clone();
        Ok(Box::new(lines.into_iter().map(Ok)))
    }
}
