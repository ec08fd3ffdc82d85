//! Commands for browsing stored analyses and comparing progress.

use serde::Serialize;
use tracing::info;

use super::AppContext;
use crate::analyzer::Region;
use crate::error::{ClearSkinError, Result};
use crate::history::{AnalysisRepository, AnalysisSummary, StoredAnalysis};
use crate::progress::{
    compare, compare_history, improvement_message, key_insights, rank_distribution, score_label,
    ComparisonResult,
};

/// A stored analysis with its display-ready derived fields.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisView {
    #[serde(flatten)]
    pub analysis: StoredAnalysis,
    pub score_label: String,
    pub insights: Vec<String>,
    /// Regions by percentage, highest first
    pub ranked_distribution: Vec<RankedRegion>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RankedRegion {
    pub region: Region,
    pub percentage: f64,
}

impl AnalysisView {
    pub fn from_stored(analysis: StoredAnalysis) -> Self {
        let result = &analysis.result;
        let ranked_distribution = rank_distribution(&result.distribution)
            .into_iter()
            .map(|(region, percentage)| RankedRegion { region, percentage })
            .collect();
        Self {
            score_label: score_label(result.scores.overall).to_string(),
            insights: key_insights(result),
            ranked_distribution,
            analysis,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ProgressView {
    #[serde(flatten)]
    pub comparison: ComparisonResult,
    pub message: String,
}

impl From<ComparisonResult> for ProgressView {
    fn from(comparison: ComparisonResult) -> Self {
        let message = improvement_message(comparison.improvement_percentage).to_string();
        Self {
            comparison,
            message,
        }
    }
}

/// The user's history, newest first, optionally truncated.
pub async fn list_history(ctx: &AppContext, limit: Option<usize>) -> Result<Vec<AnalysisSummary>> {
    let mut history = ctx.history.history(ctx.user_id())?;
    if let Some(limit) = limit {
        history.truncate(limit);
    }
    info!("Listed {} analyses for {}", history.len(), ctx.user_id());
    Ok(history.iter().map(StoredAnalysis::summary).collect())
}

pub async fn get_analysis(ctx: &AppContext, id: &str) -> Result<AnalysisView> {
    let analysis = find(ctx, id)?;
    Ok(AnalysisView::from_stored(analysis))
}

/// Latest analysis for the user, if any.
pub async fn last_analysis(ctx: &AppContext) -> Result<Option<AnalysisView>> {
    Ok(ctx
        .history
        .last_analysis(ctx.user_id())?
        .map(AnalysisView::from_stored))
}

/// Oldest vs newest analysis in the user's history.
/// `None` until there are at least two.
pub async fn compare_progress(ctx: &AppContext) -> Result<Option<ProgressView>> {
    let history = ctx.history.history(ctx.user_id())?;
    let comparison = compare_history(&history);
    if let Some(ref c) = comparison {
        info!(
            "Progress {} -> {}: {:.1}%",
            c.baseline_id, c.followup_id, c.improvement_percentage
        );
    }
    Ok(comparison.map(ProgressView::from))
}

/// Compare two specific analyses. Order does not matter; the earlier one
/// becomes the baseline.
pub async fn compare_pair(ctx: &AppContext, first_id: &str, second_id: &str) -> Result<ProgressView> {
    let first = find(ctx, first_id)?;
    let second = find(ctx, second_id)?;
    Ok(compare(&first, &second).into())
}

fn find(ctx: &AppContext, id: &str) -> Result<StoredAnalysis> {
    ctx.history
        .get(id)?
        .ok_or_else(|| ClearSkinError::NotFound(id.to_string()))
}
