//! Human-readable labels and insights derived from a result.

use crate::analyzer::{AnalysisResult, ScoreMetric};

use super::metrics::rank_distribution;

/// Sub-scores considered for the "could improve" insight.
const IMPROVABLE: [ScoreMetric; 3] = [
    ScoreMetric::Hydration,
    ScoreMetric::Texture,
    ScoreMetric::Clarity,
];

/// Sub-scores below this get a "could improve" insight.
const IMPROVE_BELOW: f64 = 7.0;

const MAX_INSIGHTS: usize = 3;

/// Label for the 0-100 overall score.
pub fn score_label(overall: f64) -> &'static str {
    band(overall / 10.0)
}

/// Label for a 0-10 sub-score.
pub fn subscore_band(value: f64) -> &'static str {
    band(value)
}

fn band(value: f64) -> &'static str {
    if value >= 8.0 {
        "Excellent"
    } else if value >= 6.0 {
        "Good"
    } else if value >= 4.0 {
        "Fair"
    } else if value >= 2.0 {
        "Poor"
    } else {
        "Very Poor"
    }
}

pub fn improvement_message(percentage: f64) -> &'static str {
    if percentage >= 10.0 {
        "Amazing progress! Your skin is improving significantly."
    } else if percentage >= 0.0 {
        "You're on the right track! Keep up the good work."
    } else {
        "Don't worry, results take time. Stay consistent with your routine."
    }
}

/// Up to three short observations about a single result.
pub fn key_insights(result: &AnalysisResult) -> Vec<String> {
    let mut insights = vec![format!(
        "{} {} acne detected",
        result.severity.label(),
        result.acne_type.as_str()
    )];

    if let Some((region, value)) = rank_distribution(&result.distribution).first() {
        if *value > 0.0 {
            insights.push(format!("Focus area: {}", region.label()));
        }
    }

    // min_by keeps the first of equal elements, so ties resolve in IMPROVABLE order
    let lowest = IMPROVABLE
        .into_iter()
        .map(|m| (m, result.scores.get(m)))
        .min_by(|a, b| a.1.total_cmp(&b.1));
    if let Some((metric, value)) = lowest {
        if value < IMPROVE_BELOW {
            insights.push(format!("{} could improve", metric.label()));
        }
    }

    insights.truncate(MAX_INSIGHTS);
    insights
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyzer::{AcneType, Severity};

    #[test]
    fn test_score_label_bands() {
        assert_eq!(score_label(95.0), "Excellent");
        assert_eq!(score_label(80.0), "Excellent");
        assert_eq!(score_label(79.9), "Good");
        assert_eq!(score_label(60.0), "Good");
        assert_eq!(score_label(40.0), "Fair");
        assert_eq!(score_label(20.0), "Poor");
        assert_eq!(score_label(19.0), "Very Poor");
        assert_eq!(score_label(0.0), "Very Poor");
    }

    #[test]
    fn test_subscore_band() {
        assert_eq!(subscore_band(10.0), "Excellent");
        assert_eq!(subscore_band(6.5), "Good");
        assert_eq!(subscore_band(4.0), "Fair");
        assert_eq!(subscore_band(2.0), "Poor");
        assert_eq!(subscore_band(1.9), "Very Poor");
    }

    #[test]
    fn test_improvement_message() {
        assert!(improvement_message(12.0).starts_with("Amazing"));
        assert!(improvement_message(0.0).starts_with("You're on the right track"));
        assert!(improvement_message(-3.0).starts_with("Don't worry"));
    }

    #[test]
    fn test_key_insights_full() {
        let mut result = AnalysisResult::default();
        result.severity = Severity::Mild;
        result.acne_type = AcneType::Comedonal;
        result.distribution.nose = 55.0;
        result.distribution.chin = 20.0;
        result.scores.hydration = 6.0;
        result.scores.texture = 4.5;
        result.scores.clarity = 8.0;

        assert_eq!(
            key_insights(&result),
            vec![
                "Mild comedonal acne detected".to_string(),
                "Focus area: Nose".to_string(),
                "Texture could improve".to_string(),
            ]
        );
    }

    #[test]
    fn test_key_insights_skip_empty_distribution_and_good_scores() {
        let mut result = AnalysisResult::default();
        result.scores.hydration = 9.0;
        result.scores.texture = 7.0;
        result.scores.clarity = 8.0;

        assert_eq!(key_insights(&result), vec!["Moderate mixed acne detected".to_string()]);
    }

    #[test]
    fn test_key_insights_lowest_tie_uses_canonical_order() {
        let mut result = AnalysisResult::default();
        result.scores.hydration = 6.0;
        result.scores.texture = 3.0;
        result.scores.clarity = 3.0;

        let insights = key_insights(&result);
        assert_eq!(insights.last().map(String::as_str), Some("Texture could improve"));
    }
}
