//! Persistence of completed analyses and the capped per-user history.

pub mod bounded;
pub mod store;
pub mod types;

pub use bounded::{BoundedHistory, HISTORY_CAP};
pub use store::{AnalysisRepository, SqliteHistory};
pub use types::{AnalysisSummary, StoredAnalysis};
