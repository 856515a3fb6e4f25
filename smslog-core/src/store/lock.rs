//! Advisory writer lock for the file store.
//!
//! Lock strategy:
//! - `<log file>.lock` sits next to the record log.
//! - Writers take an exclusive OS file lock (flock) for the duration of one
//!   check-then-append sequence, then release it.
//! - flock locks belong to the open file description, so the lock also
//!   excludes other threads in the same process.

use std::fs::{File, OpenOptions};
use std::io;
use std::os::fd::AsRawFd;
use std::path::{Path, PathBuf};

/// Exclusive lock held until dropped.
pub(crate) struct WriterLock {
    file: File,
    path: PathBuf,
}

impl WriterLock {
    /// Block until the exclusive lock on `path` is acquired.
    pub(crate) fn acquire(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(path)?;

        loop {
            match lock_file_blocking(&file) {
                Ok(()) => break,
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            }
        }

        tracing::trace!(path = %path.display(), "writer lock acquired");
        Ok(Self {
            file,
            path: path.to_path_buf(),
        })
    }
}

impl Drop for WriterLock {
    fn drop(&mut self) {
        // The lock file is left in place; removing it would let a waiter lock
        // an unlinked inode while a newcomer locks a fresh one.
        if let Err(e) = unlock_file(&self.file) {
            tracing::warn!(path = %self.path.display(), error = %e, "failed to release writer lock");
        }
    }
}

#[cfg(unix)]
fn lock_file_blocking(file: &File) -> io::Result<()> {
    const LOCK_EX: i32 = 2;
    let fd = file.as_raw_fd();
    // SAFETY: flock is called with a valid file descriptor and constant flags.
    let rc = unsafe { flock(fd, LOCK_EX) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(unix)]
fn unlock_file(file: &File) -> io::Result<()> {
    const LOCK_UN: i32 = 8;
    let fd = file.as_raw_fd();
    // SAFETY: flock is called with a valid file descriptor and constant flags.
    let rc = unsafe { flock(fd, LOCK_UN) };
    if rc == 0 {
        Ok(())
    } else {
        Err(io::Error::last_os_error())
    }
}

#[cfg(unix)]
unsafe extern "C" {
    fn flock(fd: i32, operation: i32) -> i32;
}

#[cfg(not(unix))]
compile_error!("smslog writer locks currently require Unix (macOS/Linux)");
