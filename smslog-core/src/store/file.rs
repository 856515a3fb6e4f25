//! File-backed message store.

use super::lock::WriterLock;
use super::{AppendOutcome, LogStore, RecordLines};
use crate::config::StorageConfig;
use crate::error::{Error, Result};
use crate::types::{Fingerprint, MessageRecord};
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufRead, BufReader, Write};
use std::os::unix::fs::OpenOptionsExt;
use std::path::{Path, PathBuf};

/// Permission bits for newly created store files.
const FILE_MODE: u32 = 0o644;

/// Record log and fingerprint index as two text files.
#[derive(Debug, Clone)]
pub struct FileLogStore {
    log_path: PathBuf,
    index_path: PathBuf,
    lock_path: PathBuf,
}

impl FileLogStore {
    /// Create a store over explicit file paths. Nothing is touched on disk yet.
    pub fn new(log_path: impl Into<PathBuf>, index_path: impl Into<PathBuf>) -> Self {
        let log_path = log_path.into();
        let mut lock_name = log_path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_else(|| "messages".into());
        lock_name.push(".lock");
        let lock_path = log_path.with_file_name(lock_name);

        Self {
            log_path,
            index_path: index_path.into(),
            lock_path,
        }
    }

    /// Create a store at the paths named by the storage config.
    pub fn from_config(config: &StorageConfig) -> Self {
        Self::new(config.log_path(), config.index_path())
    }

    pub fn log_path(&self) -> &Path {
        &self.log_path
    }

    pub fn index_path(&self) -> &Path {
        &self.index_path
    }

    fn open_append(path: &Path) -> Result<File> {
        OpenOptions::new()
            .append(true)
            .create(true)
            .mode(FILE_MODE)
            .open(path)
            .map_err(|e| Error::storage(path, e))
    }

    /// Write one complete line in a single call so readers never see half of it.
    fn append_line(path: &Path, line: &str) -> Result<()> {
        let mut file = Self::open_append(path)?;
        file.write_all(line.as_bytes())
            .map_err(|e| Error::storage(path, e))
    }

    fn index_len(&self) -> Result<u64> {
        match fs::metadata(&self.index_path) {
            Ok(meta) => Ok(meta.len()),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(0),
            Err(e) => Err(Error::storage(&self.index_path, e)),
        }
    }

    /// Cut the index back to `len` bytes after a failed append.
    fn truncate_index(&self, len: u64) {
        let result = OpenOptions::new()
            .write(true)
            .open(&self.index_path)
            .and_then(|file| file.set_len(len));
        match result {
            Ok(()) => tracing::warn!(
                path = %self.index_path.display(),
                len,
                "Rolled back fingerprint after failed record append"
            ),
            Err(e) => tracing::error!(
                path = %self.index_path.display(),
                error = %e,
                "Failed to roll back fingerprint index"
            ),
        }
    }

    fn create_if_absent(path: &Path) -> Result<()> {
        match OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(FILE_MODE)
            .open(path)
        {
            Ok(_) => {
                tracing::info!(path = %path.display(), "Created store file");
                Ok(())
            }
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => Ok(()),
            Err(e) => Err(Error::storage(path, e)),
        }
    }
}

impl LogStore for FileLogStore {
    fn ensure_initialized(&self) -> Result<()> {
        for path in [&self.log_path, &self.index_path] {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent).map_err(|e| Error::storage(parent, e))?;
            }
            Self::create_if_absent(path)?;
        }
        Ok(())
    }

    fn contains_fingerprint(&self, fingerprint: &Fingerprint) -> Result<bool> {
        let file = match File::open(&self.index_path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(false),
            Err(e) => return Err(Error::storage(&self.index_path, e)),
        };

        for line in BufReader::new(file).lines() {
            let line = line.map_err(|e| Error::storage(&self.index_path, e))?;
            if line.trim() == fingerprint.as_str() {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn append_fingerprint(&self, fingerprint: &Fingerprint) -> Result<()> {
        Self::append_line(&self.index_path, &format!("{}\n", fingerprint))
    }

    fn append_record(&self, record: &MessageRecord) -> Result<()> {
        Self::append_line(&self.log_path, &record.to_line())
    }

    fn append_if_absent(
        &self,
        fingerprint: &Fingerprint,
        record: &MessageRecord,
    ) -> Result<AppendOutcome> {
        let _lock =
            WriterLock::acquire(&self.lock_path).map_err(|e| Error::storage(&self.lock_path, e))?;

        if self.contains_fingerprint(fingerprint)? {
            return Ok(AppendOutcome::AlreadyPresent);
        }

        // Never leave a fingerprint in the index whose record was not written
        let index_len = self.index_len()?;
        let appended = self
            .append_fingerprint(fingerprint)
            .and_then(|()| self.append_record(record));
        if let Err(e) = appended {
            self.truncate_index(index_len);
            return Err(e);
        }
        Ok(AppendOutcome::Appended)
    }

    fn read_lines(&self) -> Result<RecordLines<'_>> {
        let file = match File::open(&self.log_path) {
            Ok(file) => file,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.log_path.display(), "Record log not found, reading as empty");
                return Ok(Box::new(std::iter::empty()));
            }
            Err(e) => return Err(Error::storage(&self.log_path, e)),
        };

        let path = self.log_path.clone();
        Ok(Box::new(
            BufReader::new(file)
                .lines()
                .map(move |line| line.map_err(|e| Error::storage(&path, e))),
        ))
    }
}
