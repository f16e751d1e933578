//! CSV-backed persistence for posts, trends, generated posts, and feedback,
//! plus the on-disk diagnostics store for failed fetches.

pub mod diagnostics;
pub mod error;
pub mod feedback;
pub mod generated;
pub mod posts;
pub mod table;
pub mod trends;

pub use diagnostics::{DiagnosticSnapshot, DiagnosticsDir, DiagnosticsSink};
pub use error::StoreError;
pub use feedback::FeedbackStore;
pub use generated::GeneratedPostStore;
pub use posts::PostStore;
pub use table::CsvTable;
pub use trends::TrendStore;
