//! Trends table (`trends.csv`), rewritten wholesale on every analysis run.

use std::path::PathBuf;

use postcraft_core::{TrendRow, TrendSummary};

use crate::error::StoreError;
use crate::table::CsvTable;

pub struct TrendStore {
    table: CsvTable<TrendRow>,
}

impl TrendStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            table: CsvTable::new(path),
        }
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.table.exists()
    }

    /// Replaces the table with `summary`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O or serialization failure.
    pub fn write(&self, summary: &TrendSummary) -> Result<usize, StoreError> {
        let rows = summary.to_rows();
        self.table.replace(&rows)?;
        Ok(rows.len())
    }

    /// Loads the last written summary; `None` if no trends table exists.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file exists but cannot be parsed.
    pub fn load(&self) -> Result<Option<TrendSummary>, StoreError> {
        if !self.table.exists() {
            return Ok(None);
        }
        let rows = self.table.read_all()?;
        Ok(Some(TrendSummary::from_rows(&rows)))
    }
}

#[cfg(test)]
mod tests {
    use postcraft_core::{ScopeTrends, SCOPE_ALL};

    use super::*;

    #[test]
    fn write_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = TrendStore::new(dir.path().join("trends.csv"));
        assert!(store.load().unwrap().is_none());

        let mut t = ScopeTrends {
            post_count: 2,
            ..ScopeTrends::default()
        };
        t.hashtag_frequency.insert("#ai".into(), 2);
        t.engagement_by_weekday.insert("Tuesday".into(), 17.33);
        let mut summary = TrendSummary::default();
        summary.scopes.insert(SCOPE_ALL.into(), t);

        store.write(&summary).unwrap();
        assert_eq!(store.load().unwrap(), Some(summary));
    }
}
