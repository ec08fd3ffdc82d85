//! Vision API calls for skin analysis across the supported providers.
//!
//! Each provider gets the same prompt and photo; its text reply goes through
//! `extract_json_payload` and then `normalize`, so the caller only ever sees
//! a bounded `AnalysisResult` or an `AnalysisError`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{error, info};

use super::extraction::extract_json_payload;
use super::image_prep::PreparedImage;
use super::normalize::normalize;
use super::prompts::{analysis_response_schema, ANALYSIS_PROMPT, SYSTEM_PROMPT};
use super::types::AnalysisResult;
use crate::error::AnalysisError;

pub const DEFAULT_TIMEOUT_SECS: u64 = 60;
const MAX_OUTPUT_TOKENS: u32 = 1024;
const ERROR_BODY_CHARS: usize = 1024;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Provider {
    #[default]
    Gemini,
    Claude,
    OpenAi,
}

impl Provider {
    pub fn as_str(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini",
            Provider::Claude => "claude",
            Provider::OpenAi => "openai",
        }
    }

    pub fn default_model(&self) -> &'static str {
        match self {
            Provider::Gemini => "gemini-2.0-flash",
            Provider::Claude => "claude-sonnet-4-20250514",
            Provider::OpenAi => "gpt-4o",
        }
    }

    /// Provider-specific environment variable holding the API key.
    pub fn api_key_env(&self) -> &'static str {
        match self {
            Provider::Gemini => "GEMINI_API_KEY",
            Provider::Claude => "ANTHROPIC_API_KEY",
            Provider::OpenAi => "OPENAI_API_KEY",
        }
    }

    fn endpoint(&self, model: &str) -> String {
        match self {
            Provider::Gemini => format!(
                "https://generativelanguage.googleapis.com/v1beta/models/{}:generateContent",
                model
            ),
            Provider::Claude => "https://api.anthropic.com/v1/messages".to_string(),
            Provider::OpenAi => "https://api.openai.com/v1/chat/completions".to_string(),
        }
    }
}

impl fmt::Display for Provider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Provider {
    type Err = AnalysisError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "gemini" => Ok(Provider::Gemini),
            "claude" => Ok(Provider::Claude),
            "openai" => Ok(Provider::OpenAi),
            other => Err(AnalysisError::UnsupportedProvider(other.to_string())),
        }
    }
}

/// Everything needed to call one provider. Built from `AppConfig`.
#[derive(Debug, Clone)]
pub struct ProviderConfig {
    pub provider: Provider,
    pub model: String,
    pub api_key: Option<String>,
    pub timeout: Duration,
    /// Overrides the provider's public endpoint (proxies, local mocks).
    pub endpoint: Option<String>,
}

impl ProviderConfig {
    pub fn new(provider: Provider, api_key: Option<String>) -> Self {
        Self {
            provider,
            model: provider.default_model().to_string(),
            api_key,
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
            endpoint: None,
        }
    }
}

/// Analyze a prepared facial photo with the configured provider.
///
/// # Errors
/// - No API key configured (checked before any network I/O)
/// - Network failure or timeout
/// - Non-2xx HTTP response
/// - Reply text that does not contain parseable JSON
pub async fn analyze_image(
    image: &PreparedImage,
    config: &ProviderConfig,
) -> Result<AnalysisResult, AnalysisError> {
    let provider = config.provider;
    let api_key = config
        .api_key
        .as_deref()
        .filter(|k| !k.trim().is_empty())
        .ok_or_else(|| AnalysisError::MissingApiKey(provider.to_string()))?;

    info!(
        "Analyzing photo with provider '{}' model '{}'",
        provider, config.model
    );

    let client = reqwest::Client::builder()
        .timeout(config.timeout)
        .build()
        .map_err(|e| AnalysisError::Request {
            provider: provider.to_string(),
            message: format!("Failed to build HTTP client: {}", e),
        })?;

    let url = config
        .endpoint
        .clone()
        .unwrap_or_else(|| provider.endpoint(&config.model));
    let body = build_request_body(provider, &config.model, image);

    let request = match provider {
        Provider::Gemini => client.post(&url).header("x-goog-api-key", api_key),
        Provider::Claude => client
            .post(&url)
            .header("x-api-key", api_key)
            .header("anthropic-version", "2023-06-01"),
        Provider::OpenAi => client
            .post(&url)
            .header("Authorization", format!("Bearer {}", api_key)),
    };

    let response = request
        .header("content-type", "application/json")
        .json(&body)
        .send()
        .await
        .map_err(|e| {
            let err = if e.is_timeout() {
                AnalysisError::Timeout {
                    provider: provider.to_string(),
                    seconds: config.timeout.as_secs(),
                }
            } else {
                AnalysisError::Request {
                    provider: provider.to_string(),
                    message: e.to_string(),
                }
            };
            error!("{}", err);
            err
        })?;

    let body_text = handle_api_response(response, provider).await?;
    let envelope: Value = serde_json::from_str(&body_text).map_err(|e| {
        let err = AnalysisError::Envelope {
            provider: provider.to_string(),
            message: format!("Failed to parse API response wrapper: {}", e),
        };
        error!("{}", err);
        err
    })?;

    let text = extract_response_text(provider, &envelope)?;
    let payload = extract_json_payload(&text)?;
    let result = normalize(&payload);

    info!(
        "Analysis complete: severity={}, overall={}, confidence={}",
        result.severity.as_str(),
        result.scores.overall,
        result.confidence
    );
    Ok(result)
}

/// Build the provider-specific request body carrying the prompt and photo.
pub fn build_request_body(provider: Provider, model: &str, image: &PreparedImage) -> Value {
    match provider {
        Provider::Gemini => serde_json::json!({
            "contents": [{
                "parts": [
                    { "text": ANALYSIS_PROMPT },
                    { "inline_data": { "mime_type": image.media_type(), "data": image.base64 } }
                ]
            }],
            "generationConfig": {
                "temperature": 0.4,
                "topK": 32,
                "topP": 1,
                "maxOutputTokens": MAX_OUTPUT_TOKENS
            }
        }),
        Provider::Claude => serde_json::json!({
            "model": model,
            "max_tokens": MAX_OUTPUT_TOKENS,
            "system": SYSTEM_PROMPT,
            "messages": [{
                "role": "user",
                "content": [
                    {
                        "type": "image",
                        "source": {
                            "type": "base64",
                            "media_type": image.media_type(),
                            "data": image.base64
                        }
                    },
                    { "type": "text", "text": ANALYSIS_PROMPT }
                ]
            }]
        }),
        Provider::OpenAi => serde_json::json!({
            "model": model,
            "max_tokens": MAX_OUTPUT_TOKENS,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": ANALYSIS_PROMPT },
                    { "type": "image_url", "image_url": { "url": image.data_url() } }
                ]
            }],
            "response_format": {
                "type": "json_schema",
                "json_schema": {
                    "name": "skin_analysis",
                    "strict": true,
                    "schema": analysis_response_schema()
                }
            }
        }),
    }
}

/// Pull the model's text reply out of the provider's response envelope.
pub fn extract_response_text(provider: Provider, envelope: &Value) -> Result<String, AnalysisError> {
    let text = match provider {
        Provider::Gemini => envelope["candidates"][0]["content"]["parts"][0]["text"].as_str(),
        Provider::Claude => envelope["content"][0]["text"].as_str(),
        Provider::OpenAi => envelope["choices"][0]["message"]["content"].as_str(),
    };

    text.map(|s| s.to_string()).ok_or_else(|| {
        let err = AnalysisError::Envelope {
            provider: provider.to_string(),
            message: "No text content in API response".to_string(),
        };
        error!("{}", err);
        err
    })
}

async fn handle_api_response(
    response: reqwest::Response,
    provider: Provider,
) -> Result<String, AnalysisError> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<failed to read body>".to_string());
        let err = AnalysisError::Provider {
            provider: provider.to_string(),
            status: status.as_u16(),
            body: body.chars().take(ERROR_BODY_CHARS).collect(),
        };
        error!("{}", err);
        return Err(err);
    }

    response.text().await.map_err(|e| AnalysisError::Request {
        provider: provider.to_string(),
        message: format!("Failed to read API response body: {}", e),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn tiny_image() -> PreparedImage {
        PreparedImage {
            base64: "aGVsbG8=".to_string(),
            width: 400,
            height: 400,
        }
    }

    #[test]
    fn test_provider_from_str() {
        assert_eq!("gemini".parse::<Provider>().unwrap(), Provider::Gemini);
        assert_eq!(" Claude ".parse::<Provider>().unwrap(), Provider::Claude);
        assert_eq!("openai".parse::<Provider>().unwrap(), Provider::OpenAi);

        let err = "watson".parse::<Provider>().unwrap_err();
        assert!(matches!(err, AnalysisError::UnsupportedProvider(ref p) if p == "watson"));
    }

    #[test]
    fn test_provider_serde_names() {
        assert_eq!(serde_json::to_value(Provider::OpenAi).unwrap(), "openai");
        let p: Provider = serde_json::from_value(json!("claude")).unwrap();
        assert_eq!(p, Provider::Claude);
    }

    #[test]
    fn test_gemini_body_embeds_photo_and_prompt() {
        let body = build_request_body(Provider::Gemini, "gemini-2.0-flash", &tiny_image());
        let parts = &body["contents"][0]["parts"];
        assert_eq!(parts[0]["text"], ANALYSIS_PROMPT);
        assert_eq!(parts[1]["inline_data"]["mime_type"], "image/jpeg");
        assert_eq!(parts[1]["inline_data"]["data"], "aGVsbG8=");
        assert_eq!(body["generationConfig"]["topK"], 32);
    }

    #[test]
    fn test_claude_body_uses_base64_image_block() {
        let body = build_request_body(Provider::Claude, "claude-sonnet-4-20250514", &tiny_image());
        assert_eq!(body["model"], "claude-sonnet-4-20250514");
        let content = &body["messages"][0]["content"];
        assert_eq!(content[0]["type"], "image");
        assert_eq!(content[0]["source"]["data"], "aGVsbG8=");
    }

    #[test]
    fn test_openai_body_uses_data_url_and_schema() {
        let body = build_request_body(Provider::OpenAi, "gpt-4o", &tiny_image());
        let content = &body["messages"][0]["content"];
        assert_eq!(content[1]["image_url"]["url"], "data:image/jpeg;base64,aGVsbG8=");
        assert_eq!(body["response_format"]["json_schema"]["name"], "skin_analysis");
    }

    #[test]
    fn test_extract_response_text_per_provider() {
        let gemini = json!({"candidates": [{"content": {"parts": [{"text": "{}"}]}}]});
        assert_eq!(extract_response_text(Provider::Gemini, &gemini).unwrap(), "{}");

        let claude = json!({"content": [{"type": "text", "text": "claude"}]});
        assert_eq!(extract_response_text(Provider::Claude, &claude).unwrap(), "claude");

        let openai = json!({"choices": [{"message": {"content": "openai"}}]});
        assert_eq!(extract_response_text(Provider::OpenAi, &openai).unwrap(), "openai");
    }

    #[test]
    fn test_extract_response_text_missing() {
        let err = extract_response_text(Provider::Gemini, &json!({"candidates": []})).unwrap_err();
        assert!(matches!(err, AnalysisError::Envelope { .. }));
    }

    #[tokio::test]
    async fn test_missing_api_key_fails_before_network() {
        let config = ProviderConfig::new(Provider::Gemini, None);
        let err = analyze_image(&tiny_image(), &config).await.unwrap_err();
        assert!(matches!(err, AnalysisError::MissingApiKey(ref p) if p == "gemini"));

        let config = ProviderConfig::new(Provider::Claude, Some("   ".to_string()));
        let err = analyze_image(&tiny_image(), &config).await.unwrap_err();
        assert!(matches!(err, AnalysisError::MissingApiKey(_)));
    }

    #[test]
    fn test_provider_config_defaults() {
        let config = ProviderConfig::new(Provider::OpenAi, Some("k".to_string()));
        assert_eq!(config.model, "gpt-4o");
        assert_eq!(config.timeout, Duration::from_secs(60));
        assert!(config.endpoint.is_none());
    }
}
