use thiserror::Error;

/// Failures of a single analysis attempt.
///
/// Field-level anomalies in the provider payload never show up here: they are
/// absorbed by `analyzer::normalize`. Only an unparseable response, a
/// transport problem or a local precondition (image, key, provider) fails.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("Failed to parse analysis response as JSON: {message}. Raw response (first 500 chars): {excerpt}")]
    Parse { message: String, excerpt: String },

    #[error("Vision API error: {status} from {provider} - {body}")]
    Provider {
        provider: String,
        status: u16,
        body: String,
    },

    #[error("Vision API request failed for {provider}: {message}")]
    Request { provider: String, message: String },

    #[error("Vision API timeout after {seconds}s for provider '{provider}'")]
    Timeout { provider: String, seconds: u64 },

    #[error("Unexpected response from {provider}: {message}")]
    Envelope { provider: String, message: String },

    #[error("No API key configured for '{0}'")]
    MissingApiKey(String),

    #[error("Unsupported AI provider: '{0}'. Supported: gemini, claude, openai")]
    UnsupportedProvider(String),

    #[error("Image error: {0}")]
    Image(String),
}

impl AnalysisError {
    /// Whether re-initiating the provider request can reasonably succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            AnalysisError::Parse { .. }
            | AnalysisError::Request { .. }
            | AnalysisError::Timeout { .. }
            | AnalysisError::Envelope { .. } => true,
            AnalysisError::Provider { status, .. } => *status == 429 || *status >= 500,
            AnalysisError::MissingApiKey(_)
            | AnalysisError::UnsupportedProvider(_)
            | AnalysisError::Image(_) => false,
        }
    }

    /// Message suitable for an end user. Details stay in the logs.
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::MissingApiKey(provider) => format!(
                "No API key configured for '{}'. Please set it in your config.",
                provider
            ),
            AnalysisError::Image(msg) => msg.clone(),
            AnalysisError::UnsupportedProvider(_) => self.to_string(),
            _ => "Analysis failed, please retry.".to_string(),
        }
    }
}

#[derive(Debug, Error)]
pub enum ClearSkinError {
    #[error("Analysis failed: {0}")]
    Analysis(#[from] AnalysisError),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Analysis not found: {0}")]
    NotFound(String),
}

impl From<rusqlite::Error> for ClearSkinError {
    fn from(err: rusqlite::Error) -> Self {
        ClearSkinError::Storage(err.to_string())
    }
}

impl From<ClearSkinError> for String {
    fn from(err: ClearSkinError) -> Self {
        err.to_string()
    }
}

pub type Result<T> = std::result::Result<T, ClearSkinError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_failure_is_retryable() {
        let err = AnalysisError::Parse {
            message: "expected value".to_string(),
            excerpt: "not json".to_string(),
        };
        assert!(err.is_retryable());
        assert_eq!(err.user_message(), "Analysis failed, please retry.");
    }

    #[test]
    fn test_client_errors_not_retryable() {
        let err = AnalysisError::Provider {
            provider: "gemini".to_string(),
            status: 400,
            body: "bad request".to_string(),
        };
        assert!(!err.is_retryable());

        let err = AnalysisError::Provider {
            provider: "gemini".to_string(),
            status: 503,
            body: String::new(),
        };
        assert!(err.is_retryable());
    }

    #[test]
    fn test_missing_key_message_names_provider() {
        let err = AnalysisError::MissingApiKey("claude".to_string());
        assert!(!err.is_retryable());
        assert!(err.user_message().contains("claude"));
    }

    #[test]
    fn test_clearskin_error_into_string() {
        let err: ClearSkinError = AnalysisError::Image("too small".to_string()).into();
        let msg: String = err.into();
        assert!(msg.contains("Analysis failed"));
        assert!(msg.contains("too small"));
    }
}
