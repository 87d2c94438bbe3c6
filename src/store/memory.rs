
use crate::model::ReservationRecord;

use super::{ReservationStore, StoreError};

/// Volatile store. Nothing survives the process.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    records: Vec<ReservationRecord>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed with existing records, kept in the given order.
    pub fn with_records(records: Vec<ReservationRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

impl ReservationStore for MemoryStore {
    fn list(&self) -> Vec<ReservationRecord> {
        self.records.clone()
    }

    fn append(&mut self, record: ReservationRecord) -> Result<(), StoreError> {
        debug_assert!(record.check_in < record.check_out);
        self.records.push(record);
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<bool, StoreError> {
        if let Some(pos) = self.records.iter().position(|r| r.id == id) {
            self.records.remove(pos);
            Ok(true)
        } else {
            Ok(false)
        }
    }
}
