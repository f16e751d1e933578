//! Raw response snapshots captured when a fetch fails for good.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};

use crate::error::StoreError;

/// One failed response, keyed by `(profile_id, timestamp, attempt)`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticSnapshot {
    pub profile_id: String,
    pub timestamp: DateTime<Utc>,
    pub attempt: u32,
    pub reason: String,
    /// Raw response body, when the server sent one.
    pub body: Option<String>,
}

impl DiagnosticSnapshot {
    /// File name derived from the snapshot key.
    #[must_use]
    pub fn file_name(&self) -> String {
        let profile: String = self
            .profile_id
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' { c } else { '_' })
            .collect();
        format!(
            "{profile}_{}_attempt{}.html",
            self.timestamp.format("%Y%m%dT%H%M%SZ"),
            self.attempt
        )
    }
}

/// Destination for diagnostic snapshots.
pub trait DiagnosticsSink: Send + Sync {
    /// Persists one snapshot.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError`] if the snapshot cannot be written.
    fn record(&self, snapshot: &DiagnosticSnapshot) -> Result<(), StoreError>;
}

/// Writes each snapshot as one file under a directory.
pub struct DiagnosticsDir {
    dir: PathBuf,
}

impl DiagnosticsDir {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl DiagnosticsSink for DiagnosticsDir {
    fn record(&self, snapshot: &DiagnosticSnapshot) -> Result<(), StoreError> {
        let io_err = |path: &Path, source| StoreError::Io {
            path: path.display().to_string(),
            source,
        };

        std::fs::create_dir_all(&self.dir).map_err(|e| io_err(&self.dir, e))?;
        let path = self.dir.join(snapshot.file_name());

        let contents = match &snapshot.body {
            Some(body) => body.clone(),
            None => format!("<!-- no response body: {} -->\n", snapshot.reason),
        };
        std::fs::write(&path, contents).map_err(|e| io_err(&path, e))?;

        tracing::info!(
            profile = %snapshot.profile_id,
            attempt = snapshot.attempt,
            path = %path.display(),
            "saved diagnostic snapshot"
        );
        Ok(())
    }
}
