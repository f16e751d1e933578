use std::path::PathBuf;

use postcraft_store::StoreError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TrendError {
    #[error("post store not found at {}: run scrape first", path.display())]
    PostsMissing { path: PathBuf },

    #[error(transparent)]
    Store(#[from] StoreError),
}
