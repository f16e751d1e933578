//! Append-only generated-posts store (`generated_posts.csv`).
//!
//! Keyword, trend, and refine generations share one file and are told apart
//! by the `variant` column.

use std::path::PathBuf;

use chrono::{DateTime, Utc, Weekday};
use postcraft_core::{weekday_name, GeneratedPost, Variant};
use serde::{Deserialize, Serialize};

use crate::error::StoreError;
use crate::table::CsvTable;

/// List columns hold a `;`-delimited sub-record; items containing `;` or
/// quotes are quoted the same way the outer CSV quotes fields.
const LIST_SEPARATOR: u8 = b';';

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeneratedPostRow {
    id: String,
    variant: Variant,
    generation_timestamp: DateTime<Utc>,
    suggested_posting_day: String,
    suggested_posting_hour: u32,
    source_keywords: String,
    source_trend_snapshot: Option<String>,
    feedback_ids: String,
    prompt_digest: String,
    text: String,
    explanation: String,
}

fn join_list(items: &[String], path: &str) -> Result<String, StoreError> {
    if items.is_empty() {
        return Ok(String::new());
    }
    let mut writer = csv::WriterBuilder::new()
        .delimiter(LIST_SEPARATOR)
        .terminator(csv::Terminator::Any(b'\n'))
        .from_writer(Vec::new());
    writer
        .write_record(items)
        .map_err(|source| StoreError::Csv {
            path: path.to_string(),
            source,
        })?;
    let bytes = writer.into_inner().map_err(|e| StoreError::Io {
        path: path.to_string(),
        source: e.into_error(),
    })?;
    let joined = String::from_utf8_lossy(&bytes).into_owned();
    Ok(joined.strip_suffix('\n').unwrap_or(&joined).to_string())
}

fn split_list(raw: &str, path: &str) -> Result<Vec<String>, StoreError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(LIST_SEPARATOR)
        .has_headers(false)
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(raw.as_bytes());
    let mut items = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|source| StoreError::Csv {
            path: path.to_string(),
            source,
        })?;
        items.extend(record.iter().filter(|s| !s.is_empty()).map(str::to_owned));
    }
    Ok(items)
}

impl GeneratedPostRow {
    fn from_post(p: &GeneratedPost, path: &str) -> Result<Self, StoreError> {
        Ok(Self {
            id: p.id.clone(),
            variant: p.variant,
            generation_timestamp: p.generation_timestamp,
            suggested_posting_day: weekday_name(p.suggested_posting_day).to_string(),
            suggested_posting_hour: p.suggested_posting_hour,
            source_keywords: join_list(&p.source_keywords, path)?,
            source_trend_snapshot: p.source_trend_snapshot.clone(),
            feedback_ids: join_list(&p.feedback_ids, path)?,
            prompt_digest: p.prompt_digest.clone(),
            text: p.text.clone(),
            explanation: p.explanation.clone(),
        })
    }

    fn into_post(self, path: &str) -> Result<GeneratedPost, StoreError> {
        let suggested_posting_day =
            self.suggested_posting_day
                .parse::<Weekday>()
                .map_err(|_| StoreError::InvalidRow {
                    path: path.to_string(),
                    reason: format!(
                        "post {} has unknown weekday '{}'",
                        self.id, self.suggested_posting_day
                    ),
                })?;

        Ok(GeneratedPost {
            id: self.id,
            variant: self.variant,
            text: self.text,
            explanation: self.explanation,
            source_keywords: split_list(&self.source_keywords, path)?,
            source_trend_snapshot: self.source_trend_snapshot.filter(|s| !s.is_empty()),
            feedback_ids: split_list(&self.feedback_ids, path)?,
            prompt_digest: self.prompt_digest,
            suggested_posting_day,
            suggested_posting_hour: self.suggested_posting_hour,
            generation_timestamp: self.generation_timestamp,
        })
    }
}

pub struct GeneratedPostStore {
    table: CsvTable<GeneratedPostRow>,
}

impl GeneratedPostStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            table: CsvTable::new(path),
        }
    }

    /// Loads every generated post in generation order.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be read or a row is malformed.
    pub fn load_all(&self) -> Result<Vec<GeneratedPost>, StoreError> {
        let path = self.table.path().display().to_string();
        self.table
            .read_all()?
            .into_iter()
            .map(|row| row.into_post(&path))
            .collect()
    }

    /// Returns `true` if a generated post with `id` has been stored.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the file cannot be read.
    pub fn contains(&self, id: &str) -> Result<bool, StoreError> {
        Ok(self.table.read_all()?.iter().any(|row| row.id == id))
    }

    /// Appends `posts`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O or serialization failure.
    pub fn append(&self, posts: &[GeneratedPost]) -> Result<usize, StoreError> {
        let path = self.table.path().display().to_string();
        let rows = posts
            .iter()
            .map(|p| GeneratedPostRow::from_post(p, &path))
            .collect::<Result<Vec<_>, _>>()?;
        self.table.append(&rows)?;
        Ok(rows.len())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn generated(id: &str, keywords: &[&str]) -> GeneratedPost {
        GeneratedPost {
            id: id.to_string(),
            variant: Variant::Keyword,
            text: "Scaling creatives with AI.\n\n#AI #DTC".to_string(),
            explanation: "keyword focus".to_string(),
            source_keywords: keywords.iter().map(|k| (*k).to_string()).collect(),
            source_trend_snapshot: None,
            feedback_ids: vec![],
            prompt_digest: "abc123".to_string(),
            suggested_posting_day: Weekday::Tue,
            suggested_posting_hour: 15,
            generation_timestamp: Utc.with_ymd_and_hms(2024, 5, 7, 12, 0, 0).unwrap(),
        }
    }

    #[test]
    fn append_then_load_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let store = GeneratedPostStore::new(dir.path().join("generated_posts.csv"));
        let mut second = generated("p2", &[]);
        second.variant = Variant::Refine;
        second.feedback_ids = vec!["f1".into(), "f2".into()];
        second.source_trend_snapshot = Some("{\"best_tone\":\"positive\"}".into());
        let posts = vec![generated("p1", &["ai", "growth"]), second];

        store.append(&posts).unwrap();
        assert_eq!(store.load_all().unwrap(), posts);
    }

    #[test]
    fn keywords_containing_separator_survive_reload() {
        let dir = tempfile::tempdir().unwrap();
        let store = GeneratedPostStore::new(dir.path().join("generated_posts.csv"));
        let post = generated("p1", &["a;b", "say \"hi\"", "growth"]);

        store.append(std::slice::from_ref(&post)).unwrap();
        let loaded = store.load_all().unwrap();
        assert_eq!(loaded[0].source_keywords, vec!["a;b", "say \"hi\"", "growth"]);
        assert_eq!(loaded, vec![post]);
    }

    #[test]
    fn plain_lists_split_on_separator() {
        assert_eq!(split_list("ai; growth", "t").unwrap(), vec!["ai", "growth"]);
        assert_eq!(split_list("\"a;b\";c", "t").unwrap(), vec!["a;b", "c"]);
        assert!(split_list("", "t").unwrap().is_empty());
        assert_eq!(join_list(&["ai".into(), "growth".into()], "t").unwrap(), "ai;growth");
        assert_eq!(join_list(&["a;b".into()], "t").unwrap(), "\"a;b\"");
        assert_eq!(join_list(&[], "t").unwrap(), "");
    }

    #[test]
    fn contains_finds_stored_ids_only() {
        let dir = tempfile::tempdir().unwrap();
        let store = GeneratedPostStore::new(dir.path().join("generated_posts.csv"));
        assert!(!store.contains("p1").unwrap());
        store.append(&[generated("p1", &[])]).unwrap();
        assert!(store.contains("p1").unwrap());
        assert!(!store.contains("p2").unwrap());
    }

    #[test]
    fn variant_column_is_lowercase() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("generated_posts.csv");
        let store = GeneratedPostStore::new(&path);
        store.append(&[generated("p1", &[])]).unwrap();
        let raw = std::fs::read_to_string(path).unwrap();
        assert!(raw.contains("p1,keyword,"), "raw csv: {raw}");
        assert!(raw.contains(",Tuesday,15,"), "raw csv: {raw}");
    }
}
