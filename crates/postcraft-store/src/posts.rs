//! Append-oriented post store (`posts.csv`).

use std::collections::{BTreeSet, HashSet};
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use postcraft_core::{PostKey, PostRecord};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::table::CsvTable;

/// On-disk shape of a [`PostRecord`]; hashtags are space-separated.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PostRow {
    source_profile: String,
    author: String,
    timestamp: DateTime<Utc>,
    like_count: u64,
    comment_count: u64,
    share_count: u64,
    hashtags: String,
    text: String,
}

impl From<&PostRecord> for PostRow {
    fn from(p: &PostRecord) -> Self {
        Self {
            source_profile: p.source_profile.clone(),
            author: p.author.clone(),
            timestamp: p.timestamp,
            like_count: p.like_count,
            comment_count: p.comment_count,
            share_count: p.share_count,
            hashtags: p
                .hashtags
                .iter()
                .map(String::as_str)
                .collect::<Vec<_>>()
                .join(" "),
            text: p.text.clone(),
        }
    }
}

impl From<PostRow> for PostRecord {
    fn from(r: PostRow) -> Self {
        Self {
            author: r.author,
            text: r.text,
            timestamp: r.timestamp,
            like_count: r.like_count,
            comment_count: r.comment_count,
            share_count: r.share_count,
            hashtags: r
                .hashtags
                .split_whitespace()
                .map(str::to_owned)
                .collect::<BTreeSet<_>>(),
            source_profile: r.source_profile,
        }
    }
}

pub struct PostStore {
    table: CsvTable<PostRow>,
}

impl PostStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            table: CsvTable::new(path),
        }
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.table.exists()
    }

    #[must_use]
    pub fn path(&self) -> &std::path::Path {
        self.table.path()
    }

    /// Loads every stored post in file order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be read or a row is malformed.
    pub fn load_all(&self) -> Result<Vec<PostRecord>, StoreError> {
        Ok(self
            .table
            .read_all()?
            .into_iter()
            .map(PostRecord::from)
            .collect())
    }

    /// De-duplication keys of every stored post.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be read.
    pub fn existing_keys(&self) -> Result<HashSet<PostKey>, StoreError> {
        Ok(self.load_all()?.iter().map(PostRecord::key).collect())
    }

    /// Appends records to the store. Callers are responsible for
    /// de-duplicating against [`Self::existing_keys`] first.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O or serialization failure.
    pub fn append(&self, records: &[PostRecord]) -> Result<usize, StoreError> {
        let rows: Vec<PostRow> = records.iter().map(PostRow::from).collect();
        self.table.append(&rows)?;
        tracing::debug!(
            path = %self.table.path().display(),
            count = rows.len(),
            "appended posts"
        );
        Ok(rows.len())
    }
}
