//! Message store: the record log plus the fingerprint index.
//!
//! Both sequences are append-only. There is no update, delete, compaction or
//! rotation. Every record appended through [`LogStore::append_if_absent`] has a
//! matching fingerprint in the index.
//!
//! ## Implementations
//!
//! | Store | Backing | Writer serialization |
//! |-------|---------|----------------------|
//! | [`FileLogStore`] | Two text files in a data directory | `flock` on `<log>.lock` |
//! | [`MemoryLogStore`] | Two `Vec<String>` | `Mutex` |

mod file;
mod lock;
mod memory;

pub use file::FileLogStore;
pub use memory::MemoryLogStore;

use crate::error::Result;
use crate::types::{Fingerprint, MessageRecord};

/// Result of [`LogStore::append_if_absent`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppendOutcome {
    /// Fingerprint and record were appended
    Appended,
    /// Fingerprint was already in the index; nothing was written
    AlreadyPresent,
}

/// Lazy iterator over record log lines (newline stripped).
pub type RecordLines<'a> = Box<dyn Iterator<Item = Result<String>> + Send + 'a>;

/// Storage abstraction injected into the ingest pipeline and log reader.
pub trait LogStore: Send + Sync {
    /// Create the record log and fingerprint index if absent. Idempotent.
    fn ensure_initialized(&self) -> Result<()>;

    /// Scan the fingerprint index for an exact line match.
    ///
    /// Linear in the number of stored messages.
    fn contains_fingerprint(&self, fingerprint: &Fingerprint) -> Result<bool>;

    /// Append one fingerprint line. Uniqueness is the caller's job.
    fn append_fingerprint(&self, fingerprint: &Fingerprint) -> Result<()>;

    /// Append one record as a single whole-line write.
    fn append_record(&self, record: &MessageRecord) -> Result<()>;

    /// Check the index and, if the fingerprint is new, append fingerprint then record.
    ///
    /// Implementations hold a writer lock across all three steps so two concurrent
    /// callers with the same fingerprint cannot both append. If the record cannot
    /// be written, the fingerprint is taken back out so a retry can still store it.
    fn append_if_absent(
        &self,
        fingerprint: &Fingerprint,
        record: &MessageRecord,
    ) -> Result<AppendOutcome>;

    /// Stream the record log from the beginning. A missing log yields nothing.
    fn read_lines(&self) -> Result<RecordLines<'_>>;
}
