#![forbid(unsafe_code)]

use super::{SelectionStore, upsert};
use crate::domain::SelectionRecord;
use parking_lot::Mutex;

/// Selections that live as long as the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: Mutex<Vec<SelectionRecord>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start from an existing list, kept as given (duplicates included).
    pub fn with_records(records: Vec<SelectionRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }
}

impl SelectionStore for MemoryStore {
    fn get_selections(&self) -> Vec<SelectionRecord> {
        self.records.lock().clone()
    }

    fn save_selection(&self, record: SelectionRecord) {
        upsert(&mut self.records.lock(), record);
    }
}
