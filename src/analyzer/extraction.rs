//! Locating and parsing the JSON payload inside a provider's text reply.

use serde_json::Value;
use tracing::error;

use crate::error::AnalysisError;

const FENCE: &str = "```";
const JSON_FENCE: &str = "```json";
const EXCERPT_CHARS: usize = 500;

/// Parse the JSON payload out of a free-form provider reply.
///
/// The payload may be wrapped in a fenced code block (optionally tagged
/// `json`). A reply that cannot be reduced to valid JSON is a fatal
/// `AnalysisError::Parse` for this attempt; anything that does parse is
/// returned as-is for `normalize` to coerce.
pub fn extract_json_payload(text: &str) -> Result<Value, AnalysisError> {
    let payload = unwrap_code_fence(text);
    serde_json::from_str(payload).map_err(|e| {
        let err = AnalysisError::Parse {
            message: e.to_string(),
            excerpt: excerpt(text),
        };
        error!("{}", err);
        err
    })
}

/// Return the content of the first fenced block, or the whole text trimmed
/// when no fence is present. An unterminated fence runs to the end.
pub fn unwrap_code_fence(text: &str) -> &str {
    let body = if let Some(start) = text.find(JSON_FENCE) {
        &text[start + JSON_FENCE.len()..]
    } else if let Some(start) = text.find(FENCE) {
        strip_language_tag(&text[start + FENCE.len()..])
    } else {
        return text.trim();
    };

    match body.find(FENCE) {
        Some(end) => body[..end].trim(),
        None => body.trim(),
    }
}

/// Drop an info string such as `JSON` or `javascript` right after a fence.
fn strip_language_tag(body: &str) -> &str {
    let tag_len = body
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(body.len());
    if tag_len > 0 && body[tag_len..].starts_with(['\n', '\r']) {
        &body[tag_len..]
    } else {
        body
    }
}

fn excerpt(text: &str) -> String {
    if text.chars().count() > EXCERPT_CHARS {
        format!("{}...", text.chars().take(EXCERPT_CHARS).collect::<String>())
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_plain_json() {
        let value = extract_json_payload(r#"  {"severity": "mild"}  "#).unwrap();
        assert_eq!(value, json!({"severity": "mild"}));
    }

    #[test]
    fn test_json_tagged_fence() {
        let text = "```json\n{\"severity\":\"mild\",\"scores\":{\"overall\":72}}\n```";
        let value = extract_json_payload(text).unwrap();
        assert_eq!(value["scores"]["overall"], 72);
    }

    #[test]
    fn test_untagged_fence_with_surrounding_prose() {
        let text = "Here is the analysis:\n```\n{\"acne_type\": \"cystic\"}\n```\nHope this helps!";
        let value = extract_json_payload(text).unwrap();
        assert_eq!(value["acne_type"], "cystic");
    }

    #[test]
    fn test_uppercase_tag_is_skipped() {
        let text = "```JSON\n{\"confidence\": 0.9}\n```";
        let value = extract_json_payload(text).unwrap();
        assert_eq!(value["confidence"], 0.9);
    }

    #[test]
    fn test_unterminated_fence_runs_to_end() {
        let text = "```json\n{\"summary\": \"ok\"}\n";
        assert_eq!(unwrap_code_fence(text), "{\"summary\": \"ok\"}");
    }

    #[test]
    fn test_only_first_block_used() {
        let text = "```json\n{\"a\": 1}\n```\n```json\n{\"b\": 2}\n```";
        assert_eq!(extract_json_payload(text).unwrap(), json!({"a": 1}));
    }

    #[test]
    fn test_non_object_json_still_parses() {
        assert_eq!(extract_json_payload("[1, 2]").unwrap(), json!([1, 2]));
    }

    #[test]
    fn test_malformed_json_is_parse_error() {
        let err = extract_json_payload("```json\n{\"severity\": \n```").unwrap_err();
        assert!(matches!(err, AnalysisError::Parse { .. }));
    }

    #[test]
    fn test_prose_only_is_parse_error() {
        let err = extract_json_payload("I cannot analyze this image.").unwrap_err();
        match err {
            AnalysisError::Parse { excerpt, .. } => {
                assert_eq!(excerpt, "I cannot analyze this image.")
            }
            other => panic!("expected parse error, got {:?}", other),
        }
    }

    #[test]
    fn test_excerpt_truncates_on_char_boundary() {
        let long = "é".repeat(600);
        let short = excerpt(&long);
        assert!(short.ends_with("..."));
        assert_eq!(short.chars().count(), EXCERPT_CHARS + 3);
    }
}
