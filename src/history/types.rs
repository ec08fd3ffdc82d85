use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::analyzer::{AnalysisResult, Severity};

/// A completed analysis as persisted. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredAnalysis {
    pub id: String,
    pub created_at: DateTime<Utc>,
    /// Where the source photo lives (file path or URI)
    pub photo_uri: String,
    pub result: AnalysisResult,
}

impl StoredAnalysis {
    /// Wrap a freshly normalized result with a new id and the current time.
    pub fn new(photo_uri: impl Into<String>, result: AnalysisResult) -> Self {
        Self {
            id: format!("analysis_{}", Uuid::new_v4().simple()),
            created_at: Utc::now(),
            photo_uri: photo_uri.into(),
            result,
        }
    }

    pub fn summary(&self) -> AnalysisSummary {
        AnalysisSummary {
            id: self.id.clone(),
            created_at: self.created_at,
            overall: self.result.scores.overall,
            severity: self.result.severity,
        }
    }
}

/// Summary of a stored analysis for list views.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisSummary {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub overall: f64,
    pub severity: Severity,
}
