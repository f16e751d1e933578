//! Append-only feedback store (`feedback.csv`).

use std::path::PathBuf;

use postcraft_core::FeedbackRecord;

use crate::error::StoreError;
use crate::table::CsvTable;

pub struct FeedbackStore {
    table: CsvTable<FeedbackRecord>,
}

impl FeedbackStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            table: CsvTable::new(path),
        }
    }

    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be read.
    pub fn load_all(&self) -> Result<Vec<FeedbackRecord>, StoreError> {
        self.table.read_all()
    }

    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O or serialization failure.
    pub fn append(&self, record: &FeedbackRecord) -> Result<(), StoreError> {
        self.table.append(std::slice::from_ref(record))
    }
}
