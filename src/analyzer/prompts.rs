//! Prompt and schema for skin analysis vision API calls.

use super::types::{AcneType, Region, ScoreMetric, Severity};

/// Instruction sent alongside the facial photo.
pub const ANALYSIS_PROMPT: &str = r#"You are an expert dermatologist AI assistant. Analyze this facial skin image for acne and overall skin health.

Respond with a JSON object of this shape:
{
  "acne_type": "inflammatory" | "comedonal" | "cystic" | "mixed",
  "severity": "mild" | "moderate" | "severe",
  "distribution": {
    "forehead": <percentage 0-100>,
    "cheeks": <percentage 0-100>,
    "chin": <percentage 0-100>,
    "jaw": <percentage 0-100>,
    "nose": <percentage 0-100>
  },
  "scores": {
    "hydration": <score 0-10>,
    "texture": <score 0-10>,
    "inflammation": <score 0-10>,
    "clarity": <score 0-10>,
    "pores": <score 0-10>,
    "dark_spots": <score 0-10>,
    "overall": <score 0-100>
  },
  "confidence": <confidence 0-1>,
  "recommendations": ["<actionable recommendation>", "..."],
  "summary": "<brief summary of the skin condition and key concerns>"
}

Distribution values rate each region independently; they do not need to sum to 100.

Scoring guidelines (higher is always better, meaning fewer issues):
- 0-2: Very poor (severe issues)
- 3-4: Poor (significant issues)
- 5-6: Fair (moderate issues)
- 7-8: Good (mild issues)
- 9-10: Excellent (minimal to no issues)

Overall score:
- 0-20: Very poor
- 21-40: Poor
- 41-60: Fair
- 61-80: Good
- 81-100: Excellent

Give at most 5 recommendations. Be realistic and helpful, focus on actionable insights.
Respond with valid JSON only, no additional text."#;

/// System instruction for providers that take one separately.
pub const SYSTEM_PROMPT: &str =
    "You are a skin analysis assistant. Always respond with valid JSON only, no markdown formatting or code blocks.";

/// JSON schema of the provider response, for structured-output providers.
pub fn analysis_response_schema() -> serde_json::Value {
    let number = |description: &str| {
        serde_json::json!({ "type": "number", "description": description })
    };

    let mut regions = serde_json::Map::new();
    for region in Region::ALL {
        regions.insert(region.as_str().to_string(), number("0-100 intensity"));
    }

    let mut scores = serde_json::Map::new();
    for metric in ScoreMetric::ALL {
        scores.insert(metric.key().to_string(), number("0-10, higher is better"));
    }
    scores.insert("overall".to_string(), number("0-100, higher is better"));

    let region_keys: Vec<&str> = Region::ALL.iter().map(|r| r.as_str()).collect();
    let mut score_keys: Vec<&str> = ScoreMetric::ALL.iter().map(|m| m.key()).collect();
    score_keys.push("overall");

    serde_json::json!({
        "type": "object",
        "properties": {
            "acne_type": {
                "type": "string",
                "enum": AcneType::ALL.iter().map(|t| t.as_str()).collect::<Vec<_>>()
            },
            "severity": {
                "type": "string",
                "enum": Severity::ALL.iter().map(|s| s.as_str()).collect::<Vec<_>>()
            },
            "distribution": {
                "type": "object",
                "properties": regions,
                "required": region_keys,
                "additionalProperties": false
            },
            "scores": {
                "type": "object",
                "properties": scores,
                "required": score_keys,
                "additionalProperties": false
            },
            "confidence": number("0.0-1.0 confidence in the assessment"),
            "recommendations": {
                "type": "array",
                "items": { "type": "string" }
            },
            "summary": { "type": "string" }
        },
        "required": ["acne_type", "severity", "distribution", "scores",
                     "confidence", "recommendations", "summary"],
        "additionalProperties": false
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_structure() {
        let schema = analysis_response_schema();
        assert_eq!(schema["type"], "object");
        assert!(schema["properties"]["distribution"].is_object());
        assert!(schema["properties"]["scores"].is_object());
    }

    #[test]
    fn test_schema_enums_match_types() {
        let schema = analysis_response_schema();
        let acne: Vec<&str> = schema["properties"]["acne_type"]["enum"]
            .as_array()
            .unwrap()
            .iter()
            .map(|v| v.as_str().unwrap())
            .collect();
        assert_eq!(acne, vec!["inflammatory", "comedonal", "cystic", "mixed"]);

        let severities = schema["properties"]["severity"]["enum"].as_array().unwrap();
        assert_eq!(severities.len(), 3);
    }

    #[test]
    fn test_schema_scores_use_wire_keys() {
        let schema = analysis_response_schema();
        let scores = &schema["properties"]["scores"]["properties"];
        assert!(scores["dark_spots"].is_object());
        assert!(scores["overall"].is_object());
        assert_eq!(
            schema["properties"]["scores"]["required"].as_array().unwrap().len(),
            7
        );
    }

    #[test]
    fn test_prompt_mentions_every_field() {
        for key in ["acne_type", "severity", "distribution", "confidence", "recommendations", "summary"] {
            assert!(ANALYSIS_PROMPT.contains(key), "prompt missing {}", key);
        }
        for metric in ScoreMetric::ALL {
            assert!(ANALYSIS_PROMPT.contains(metric.key()));
        }
        for region in Region::ALL {
            assert!(ANALYSIS_PROMPT.contains(region.as_str()));
        }
    }

    #[test]
    fn test_prompt_includes_scoring_guidance() {
        assert!(ANALYSIS_PROMPT.contains("higher is always better"));
        assert!(ANALYSIS_PROMPT.contains("81-100: Excellent"));
    }
}
