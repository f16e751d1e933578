//! Typed access to one CSV file with a header row.

use std::fs::OpenOptions;
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreError;

/// A CSV file whose rows deserialize into `T`.
///
/// Missing files read as empty. Appends write the header only when the file
/// is new or empty. [`CsvTable::replace`] writes to a sibling temp file and
/// renames it over the original so readers never see a half-written table.
#[derive(Debug, Clone)]
pub struct CsvTable<T> {
    path: PathBuf,
    _row: PhantomData<fn() -> T>,
}

impl<T> CsvTable<T> {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            _row: PhantomData,
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn io_err(&self, source: std::io::Error) -> StoreError {
        StoreError::Io {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn csv_err(&self, source: csv::Error) -> StoreError {
        StoreError::Csv {
            path: self.path.display().to_string(),
            source,
        }
    }

    fn ensure_parent(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| self.io_err(e))?;
        }
        Ok(())
    }
}

impl<T: DeserializeOwned> CsvTable<T> {
    /// Reads every row. A missing file yields an empty `Vec`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Csv`] if the file cannot be opened or a row does
    /// not deserialize.
    pub fn read_all(&self) -> Result<Vec<T>, StoreError> {
        if !self.exists() {
            return Ok(Vec::new());
        }
        let mut reader = csv::Reader::from_path(&self.path).map_err(|e| self.csv_err(e))?;
        reader
            .deserialize()
            .collect::<Result<Vec<T>, _>>()
            .map_err(|e| self.csv_err(e))
    }
}

impl<T: Serialize> CsvTable<T> {
    /// Appends `rows`, creating the file (and its directory) if needed.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O or serialization failure.
    pub fn append(&self, rows: &[T]) -> Result<(), StoreError> {
        if rows.is_empty() {
            return Ok(());
        }
        self.ensure_parent()?;

        let needs_header = std::fs::metadata(&self.path)
            .map(|m| m.len() == 0)
            .unwrap_or(true);
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .map_err(|e| self.io_err(e))?;

        let mut writer = csv::WriterBuilder::new()
            .has_headers(needs_header)
            .from_writer(file);
        for row in rows {
            writer.serialize(row).map_err(|e| self.csv_err(e))?;
        }
        writer.flush().map_err(|e| self.io_err(e))?;
        Ok(())
    }

    /// Replaces the whole file with `rows`.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] on I/O or serialization failure.
    pub fn replace(&self, rows: &[T]) -> Result<(), StoreError> {
        self.ensure_parent()?;

        let mut tmp_name = self.path.as_os_str().to_owned();
        tmp_name.push(".tmp");
        let tmp_path = PathBuf::from(tmp_name);

        {
            let mut writer = csv::Writer::from_path(&tmp_path).map_err(|e| self.csv_err(e))?;
            for row in rows {
                writer.serialize(row).map_err(|e| self.csv_err(e))?;
            }
            writer.flush().map_err(|e| self.io_err(e))?;
        }

        std::fs::rename(&tmp_path, &self.path).map_err(|e| self.io_err(e))
    }
}
