//! Comparison between two normalized analyses.
//!
//! Everything here is pure and total over `AnalysisResult`s produced by
//! `normalize`; nothing can fail.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::analyzer::{AnalysisResult, Distribution, Region, ScoreMetric};
use crate::history::StoredAnalysis;

/// Sub-score changes at or below this magnitude are treated as noise.
pub const TREND_THRESHOLD: f64 = 0.5;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Improved,
    Declined,
    Unchanged,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricDelta {
    pub name: ScoreMetric,
    pub delta: f64,
    pub trend: Trend,
}

/// Derived comparison of a baseline and a later follow-up. Never persisted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub baseline_id: String,
    pub followup_id: String,
    pub improvement_percentage: f64,
    pub metrics: Vec<MetricDelta>,
    pub areas_improved: Vec<ScoreMetric>,
    pub areas_worsened: Vec<ScoreMetric>,
}

/// Relative change in the overall score, in percent.
///
/// A zero baseline yields exactly 0 instead of an infinite or NaN result.
pub fn overall_improvement(baseline: &AnalysisResult, followup: &AnalysisResult) -> f64 {
    let base = baseline.scores.overall;
    let next = followup.scores.overall;
    if base == 0.0 || !base.is_finite() || !next.is_finite() {
        return 0.0;
    }
    (next - base) / base * 100.0
}

pub fn classify_trend(delta: f64) -> Trend {
    if delta > TREND_THRESHOLD {
        Trend::Improved
    } else if delta < -TREND_THRESHOLD {
        Trend::Declined
    } else {
        Trend::Unchanged
    }
}

/// Delta and trend for each sub-score, in canonical metric order.
pub fn per_metric_delta(baseline: &AnalysisResult, followup: &AnalysisResult) -> Vec<MetricDelta> {
    ScoreMetric::ALL
        .into_iter()
        .map(|name| {
            let delta = followup.scores.get(name) - baseline.scores.get(name);
            MetricDelta {
                name,
                delta,
                trend: classify_trend(delta),
            }
        })
        .collect()
}

/// Regions sorted by percentage, highest first. Equal values keep the
/// canonical region order.
pub fn rank_distribution(distribution: &Distribution) -> Vec<(Region, f64)> {
    let mut ranked: Vec<(Region, f64)> = distribution.iter().collect();
    // Stable sort over canonical order handles ties.
    ranked.sort_by(|a, b| rank_key(b.1).total_cmp(&rank_key(a.1)));
    ranked
}

// Folds -0.0 into 0.0 and sinks NaN so `total_cmp` sees only real ties.
fn rank_key(value: f64) -> f64 {
    if value.is_nan() {
        f64::NEG_INFINITY
    } else {
        value + 0.0
    }
}

/// Compare two stored analyses. The earlier one is always the baseline,
/// whichever order they are passed in.
pub fn compare(first: &StoredAnalysis, second: &StoredAnalysis) -> ComparisonResult {
    let (baseline, followup) = match chronological(first, second) {
        Ordering::Greater => (second, first),
        _ => (first, second),
    };

    let metrics = per_metric_delta(&baseline.result, &followup.result);
    let by_trend = |trend: Trend| -> Vec<ScoreMetric> {
        metrics
            .iter()
            .filter(|m| m.trend == trend)
            .map(|m| m.name)
            .collect()
    };
    let areas_improved = by_trend(Trend::Improved);
    let areas_worsened = by_trend(Trend::Declined);

    ComparisonResult {
        baseline_id: baseline.id.clone(),
        followup_id: followup.id.clone(),
        improvement_percentage: overall_improvement(&baseline.result, &followup.result),
        metrics,
        areas_improved,
        areas_worsened,
    }
}

/// Compare the oldest entry of a history against the newest.
/// Returns `None` with fewer than two analyses.
pub fn compare_history(analyses: &[StoredAnalysis]) -> Option<ComparisonResult> {
    if analyses.len() < 2 {
        return None;
    }
    let oldest = analyses.iter().min_by(|a, b| chronological(a, b))?;
    let newest = analyses.iter().max_by(|a, b| chronological(a, b))?;
    Some(compare(oldest, newest))
}

// Creation time, then id, so equal timestamps still order deterministically.
fn chronological(a: &StoredAnalysis, b: &StoredAnalysis) -> Ordering {
    a.created_at
        .cmp(&b.created_at)
        .then_with(|| a.id.cmp(&b.id))
}
