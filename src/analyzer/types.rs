//! Type definitions for skin analysis results.
//!
//! `AnalysisResult` is the trusted, bounded record produced by
//! `normalize`. It serializes with the same snake_case keys the vision
//! provider is asked to emit, so a stored record is itself a valid payload.

use serde::{Deserialize, Serialize};

use super::normalize::{
    DEFAULT_CONFIDENCE, DEFAULT_OVERALL, DEFAULT_REGION_SCORE, DEFAULT_SUBSCORE,
    FALLBACK_RECOMMENDATION, FALLBACK_SUMMARY, MAX_RECOMMENDATIONS,
};

/// Dominant acne presentation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AcneType {
    Inflammatory,
    Comedonal,
    Cystic,
    #[default]
    Mixed,
}

impl AcneType {
    pub const ALL: [AcneType; 4] = [
        AcneType::Inflammatory,
        AcneType::Comedonal,
        AcneType::Cystic,
        AcneType::Mixed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            AcneType::Inflammatory => "inflammatory",
            AcneType::Comedonal => "comedonal",
            AcneType::Cystic => "cystic",
            AcneType::Mixed => "mixed",
        }
    }

    /// Exact, case-sensitive match against the wire literals.
    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Mild,
    #[default]
    Moderate,
    Severe,
}

impl Severity {
    pub const ALL: [Severity; 3] = [Severity::Mild, Severity::Moderate, Severity::Severe];

    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Mild => "mild",
            Severity::Moderate => "moderate",
            Severity::Severe => "severe",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|s| s.as_str() == value)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Severity::Mild => "Mild",
            Severity::Moderate => "Moderate",
            Severity::Severe => "Severe",
        }
    }
}

/// Facial regions, in canonical display order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Forehead,
    Cheeks,
    Chin,
    Jaw,
    Nose,
}

impl Region {
    pub const ALL: [Region; 5] = [
        Region::Forehead,
        Region::Cheeks,
        Region::Chin,
        Region::Jaw,
        Region::Nose,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Region::Forehead => "forehead",
            Region::Cheeks => "cheeks",
            Region::Chin => "chin",
            Region::Jaw => "jaw",
            Region::Nose => "nose",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Region::Forehead => "Forehead",
            Region::Cheeks => "Cheeks",
            Region::Chin => "Chin",
            Region::Jaw => "Jaw",
            Region::Nose => "Nose",
        }
    }
}

/// Per-region intensity, each independently in [0, 100].
/// Not a partition: the values need not sum to 100.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Distribution {
    pub forehead: f64,
    pub cheeks: f64,
    pub chin: f64,
    pub jaw: f64,
    pub nose: f64,
}

impl Distribution {
    pub fn get(&self, region: Region) -> f64 {
        match region {
            Region::Forehead => self.forehead,
            Region::Cheeks => self.cheeks,
            Region::Chin => self.chin,
            Region::Jaw => self.jaw,
            Region::Nose => self.nose,
        }
    }

    /// Regions paired with their value, in canonical order.
    pub fn iter(&self) -> impl Iterator<Item = (Region, f64)> + '_ {
        Region::ALL.into_iter().map(move |r| (r, self.get(r)))
    }
}

impl Default for Distribution {
    fn default() -> Self {
        Self {
            forehead: DEFAULT_REGION_SCORE,
            cheeks: DEFAULT_REGION_SCORE,
            chin: DEFAULT_REGION_SCORE,
            jaw: DEFAULT_REGION_SCORE,
            nose: DEFAULT_REGION_SCORE,
        }
    }
}

/// The six 0-10 sub-scores, in canonical display order.
/// Higher is better for every one of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScoreMetric {
    Hydration,
    Texture,
    Inflammation,
    Clarity,
    Pores,
    DarkSpots,
}

impl ScoreMetric {
    pub const ALL: [ScoreMetric; 6] = [
        ScoreMetric::Hydration,
        ScoreMetric::Texture,
        ScoreMetric::Inflammation,
        ScoreMetric::Clarity,
        ScoreMetric::Pores,
        ScoreMetric::DarkSpots,
    ];

    /// Key used in the provider payload and in stored records.
    pub fn key(&self) -> &'static str {
        match self {
            ScoreMetric::Hydration => "hydration",
            ScoreMetric::Texture => "texture",
            ScoreMetric::Inflammation => "inflammation",
            ScoreMetric::Clarity => "clarity",
            ScoreMetric::Pores => "pores",
            ScoreMetric::DarkSpots => "dark_spots",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ScoreMetric::Hydration => "Hydration",
            ScoreMetric::Texture => "Texture",
            ScoreMetric::Inflammation => "Inflammation",
            ScoreMetric::Clarity => "Clarity",
            ScoreMetric::Pores => "Pores",
            ScoreMetric::DarkSpots => "Dark Spots",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SkinScores {
    pub hydration: f64,
    pub texture: f64,
    pub inflammation: f64,
    pub clarity: f64,
    pub pores: f64,
    pub dark_spots: f64,
    /// 0-100 composite
    pub overall: f64,
}

impl SkinScores {
    pub fn get(&self, metric: ScoreMetric) -> f64 {
        match metric {
            ScoreMetric::Hydration => self.hydration,
            ScoreMetric::Texture => self.texture,
            ScoreMetric::Inflammation => self.inflammation,
            ScoreMetric::Clarity => self.clarity,
            ScoreMetric::Pores => self.pores,
            ScoreMetric::DarkSpots => self.dark_spots,
        }
    }
}

impl Default for SkinScores {
    fn default() -> Self {
        Self {
            hydration: DEFAULT_SUBSCORE,
            texture: DEFAULT_SUBSCORE,
            inflammation: DEFAULT_SUBSCORE,
            clarity: DEFAULT_SUBSCORE,
            pores: DEFAULT_SUBSCORE,
            dark_spots: DEFAULT_SUBSCORE,
            overall: DEFAULT_OVERALL,
        }
    }
}

/// Normalized result of one skin analysis.
///
/// Only ever built by `normalize` (or `Default`, which equals
/// `normalize(&json!({}))`), so every numeric field is within its bound.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub acne_type: AcneType,
    pub severity: Severity,
    pub distribution: Distribution,
    pub scores: SkinScores,
    /// 0.0-1.0 model confidence
    pub confidence: f64,
    /// At most five entries
    pub recommendations: Vec<String>,
    pub summary: String,
}

impl AnalysisResult {
    /// True when every numeric field is finite and inside its declared range.
    pub fn is_within_bounds(&self) -> bool {
        let in_range = |v: f64, lo: f64, hi: f64| v.is_finite() && v >= lo && v <= hi;

        self.distribution.iter().all(|(_, v)| in_range(v, 0.0, 100.0))
            && ScoreMetric::ALL
                .iter()
                .all(|m| in_range(self.scores.get(*m), 0.0, 10.0))
            && in_range(self.scores.overall, 0.0, 100.0)
            && in_range(self.confidence, 0.0, 1.0)
            && self.recommendations.len() <= MAX_RECOMMENDATIONS
    }
}

impl Default for AnalysisResult {
    fn default() -> Self {
        Self {
            acne_type: AcneType::default(),
            severity: Severity::default(),
            distribution: Distribution::default(),
            scores: SkinScores::default(),
            confidence: DEFAULT_CONFIDENCE,
            recommendations: vec![FALLBACK_RECOMMENDATION.to_string()],
            summary: FALLBACK_SUMMARY.to_string(),
        }
    }
}
