mod journal;
mod memory;
mod slot;

pub use journal::{Journal, JournalStore};
pub use memory::MemoryStore;
pub use slot::{FileSlots, MemorySlots, SlotBackend, SlotStore};

use std::io;

use crate::model::ReservationRecord;

/// Ordered, durable collection of reservations.
///
/// `list` never fails: unreadable or corrupt storage reads as empty.
/// Writes are immediate; a returned `Ok` means the change is persisted.
pub trait ReservationStore {
    /// All records in insertion order.
    fn list(&self) -> Vec<ReservationRecord>;

    /// Persist one more record. Callers validate before appending.
    fn append(&mut self, record: ReservationRecord) -> Result<(), StoreError>;

    /// Delete by id. Returns whether a record was removed.
    fn remove(&mut self, id: &str) -> Result<bool, StoreError>;
}

impl<S: ReservationStore + ?Sized> ReservationStore for &mut S {
    fn list(&self) -> Vec<ReservationRecord> {
        (**self).list()
    }

    fn append(&mut self, record: ReservationRecord) -> Result<(), StoreError> {
        (**self).append(record)
    }

    fn remove(&mut self, id: &str) -> Result<bool, StoreError> {
        (**self).remove(id)
    }
}

impl<S: ReservationStore + ?Sized> ReservationStore for Box<S> {
    fn list(&self) -> Vec<ReservationRecord> {
        (**self).list()
    }

    fn append(&mut self, record: ReservationRecord) -> Result<(), StoreError> {
        (**self).append(record)
    }

    fn remove(&mut self, id: &str) -> Result<bool, StoreError> {
        (**self).remove(id)
    }
}

#[derive(Debug)]
pub enum StoreError {
    Io(io::Error),
    Encode(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::Io(e) => write!(f, "storage write failed: {e}"),
            StoreError::Encode(e) => write!(f, "cannot encode reservations: {e}"),
        }
    }
}

impl std::error::Error for StoreError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            StoreError::Io(e) => Some(e),
            StoreError::Encode(_) => None,
        }
    }
}

impl From<io::Error> for StoreError {
    fn from(e: io::Error) -> Self {
        StoreError::Io(e)
    }
}

/// Record a degraded read: count it and log why the store looks empty.
pub(crate) fn note_corrupt_read(source: &str, reason: &dyn std::fmt::Display) {
    metrics::counter!(crate::observability::STORE_CORRUPT_READS_TOTAL, "source" => source.to_string())
        .increment(1);
    tracing::warn!("{source}: unreadable reservation data, treating as empty: {reason}");
}
