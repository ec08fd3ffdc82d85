//! Normalization of untrusted vision-model payloads.
//!
//! `normalize` is the single chokepoint between the provider and everything
//! else: it accepts any JSON value and always returns an `AnalysisResult`
//! whose fields are in range. Every field is extracted with an explicit type
//! check and falls back to its default independently of the others.

use serde_json::Value;
use tracing::debug;

use super::types::{AcneType, AnalysisResult, Distribution, Region, Severity, SkinScores};

pub const DEFAULT_SUBSCORE: f64 = 5.0;
pub const DEFAULT_OVERALL: f64 = 50.0;
pub const DEFAULT_CONFIDENCE: f64 = 0.8;
pub const DEFAULT_REGION_SCORE: f64 = 0.0;

pub const SUBSCORE_RANGE: (f64, f64) = (0.0, 10.0);
pub const OVERALL_RANGE: (f64, f64) = (0.0, 100.0);
pub const REGION_RANGE: (f64, f64) = (0.0, 100.0);
pub const CONFIDENCE_RANGE: (f64, f64) = (0.0, 1.0);

pub const MAX_RECOMMENDATIONS: usize = 5;
pub const FALLBACK_RECOMMENDATION: &str = "Consult a dermatologist for personalized advice";
pub const FALLBACK_SUMMARY: &str = "Analysis complete. Please review your scores below.";

/// `min(max(value, lo), hi)`.
///
/// Callers must filter out NaN first; `normalize` treats it as missing.
pub fn clamp(value: f64, lo: f64, hi: f64) -> f64 {
    value.max(lo).min(hi)
}

/// Coerce a parsed provider payload into a bounded `AnalysisResult`.
///
/// Never fails. Missing, wrong-typed or out-of-domain fields are replaced
/// with their defaults; numbers are clamped to their ranges.
pub fn normalize(raw: &Value) -> AnalysisResult {
    let acne_type = raw
        .get("acne_type")
        .and_then(Value::as_str)
        .and_then(AcneType::parse)
        .unwrap_or_else(|| {
            debug!("acne_type missing or invalid, defaulting to mixed");
            AcneType::default()
        });

    let severity = raw
        .get("severity")
        .and_then(Value::as_str)
        .and_then(Severity::parse)
        .unwrap_or_else(|| {
            debug!("severity missing or invalid, defaulting to moderate");
            Severity::default()
        });

    let distribution = normalize_distribution(raw.get("distribution"));
    let scores = normalize_scores(raw.get("scores"));

    let confidence = bounded(
        raw.get("confidence"),
        CONFIDENCE_RANGE,
        DEFAULT_CONFIDENCE,
        "confidence",
    );

    let recommendations = match raw.get("recommendations").and_then(Value::as_array) {
        Some(items) => items
            .iter()
            .take(MAX_RECOMMENDATIONS)
            .map(|item| match item {
                Value::String(text) => text.clone(),
                other => other.to_string(),
            })
            .collect(),
        None => {
            debug!("recommendations is not an array, using fallback");
            vec![FALLBACK_RECOMMENDATION.to_string()]
        }
    };

    let summary = match raw.get("summary") {
        Some(Value::String(text)) => text.clone(),
        _ => {
            debug!("summary is not text, using fallback");
            FALLBACK_SUMMARY.to_string()
        }
    };

    AnalysisResult {
        acne_type,
        severity,
        distribution,
        scores,
        confidence,
        recommendations,
        summary,
    }
}

fn normalize_distribution(raw: Option<&Value>) -> Distribution {
    let region = |r: Region| {
        bounded(
            raw.and_then(|d| d.get(r.as_str())),
            REGION_RANGE,
            DEFAULT_REGION_SCORE,
            r.as_str(),
        )
    };

    Distribution {
        forehead: region(Region::Forehead),
        cheeks: region(Region::Cheeks),
        chin: region(Region::Chin),
        jaw: region(Region::Jaw),
        nose: region(Region::Nose),
    }
}

fn normalize_scores(raw: Option<&Value>) -> SkinScores {
    let sub = |key: &str| {
        bounded(
            raw.and_then(|s| s.get(key)),
            SUBSCORE_RANGE,
            DEFAULT_SUBSCORE,
            key,
        )
    };

    SkinScores {
        hydration: sub("hydration"),
        texture: sub("texture"),
        inflammation: sub("inflammation"),
        clarity: sub("clarity"),
        pores: sub("pores"),
        dark_spots: sub("dark_spots"),
        overall: bounded(
            raw.and_then(|s| s.get("overall")),
            OVERALL_RANGE,
            DEFAULT_OVERALL,
            "overall",
        ),
    }
}

/// A JSON number as `f64`. Strings, booleans and null are "missing".
///
/// Numbers keep their source text, so a literal beyond `f64` range such as
/// `1e400` comes back as an infinity of the right sign and clamps to a bound.
fn json_number(value: Option<&Value>) -> Option<f64> {
    let Some(Value::Number(n)) = value else {
        return None;
    };
    n.as_f64()
        .filter(|v| v.is_finite())
        .or_else(|| n.to_string().parse::<f64>().ok())
        .filter(|v| !v.is_nan())
}

fn bounded(value: Option<&Value>, (lo, hi): (f64, f64), default: f64, field: &str) -> f64 {
    match json_number(value) {
        Some(v) => clamp(v, lo, hi),
        None => {
            debug!("{} missing or non-numeric, defaulting to {}", field, default);
            default
        }
    }
}
