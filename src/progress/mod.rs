//! Longitudinal progress between analyses.

pub mod insights;
pub mod metrics;

pub use insights::{improvement_message, key_insights, score_label, subscore_band};
pub use metrics::{
    classify_trend, compare, compare_history, overall_improvement, per_metric_delta,
    rank_distribution, ComparisonResult, MetricDelta, Trend, TREND_THRESHOLD,
};
