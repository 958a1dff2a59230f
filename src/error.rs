use thiserror::Error;

/// Message returned whenever the upstream credential is missing.
pub const MISSING_API_KEY: &str = "API key not configured on server";

#[derive(Debug, Error)]
pub enum MonumentError {
    #[error("{0}")]
    ConfigError(String),

    #[error("{0}")]
    ValidationError(String),

    #[error("Method not allowed")]
    MethodNotAllowed,

    #[error("Invalid image format")]
    InvalidImageFormat,

    #[error("Request body exceeds {0} bytes")]
    PayloadTooLarge(usize),

    #[error("{message}")]
    UpstreamError {
        status: u16,
        message: String,
        details: Option<serde_json::Value>,
    },

    #[error("{0}")]
    NoContentError(String),

    #[error("Request error: {0}")]
    RequestError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl MonumentError {
    pub fn missing_api_key() -> Self {
        MonumentError::ConfigError(MISSING_API_KEY.to_string())
    }

    pub fn validation(message: impl Into<String>) -> Self {
        MonumentError::ValidationError(message.into())
    }

    /// Extra payload attached to the error body, if any.
    pub fn details(&self) -> Option<&serde_json::Value> {
        match self {
            MonumentError::UpstreamError { details, .. } => details.as_ref(),
            _ => None,
        }
    }

    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            MonumentError::ValidationError(_)
                | MonumentError::InvalidImageFormat
                | MonumentError::MethodNotAllowed
                | MonumentError::PayloadTooLarge(_)
        )
    }
}

impl From<reqwest::Error> for MonumentError {
    fn from(err: reqwest::Error) -> Self {
        MonumentError::RequestError(err.to_string())
    }
}

impl From<serde_json::Error> for MonumentError {
    fn from(err: serde_json::Error) -> Self {
        MonumentError::SerializationError(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, MonumentError>;

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_display_is_the_caller_facing_message() {
        assert_eq!(
            MonumentError::missing_api_key().to_string(),
            "API key not configured on server"
        );
        assert_eq!(
            MonumentError::InvalidImageFormat.to_string(),
            "Invalid image format"
        );
        let upstream = MonumentError::UpstreamError {
            status: 429,
            message: "Quota exceeded".into(),
            details: Some(json!({"error": {"code": 429}})),
        };
        assert_eq!(upstream.to_string(), "Quota exceeded");
        assert_eq!(upstream.details(), Some(&json!({"error": {"code": 429}})));
    }

    #[test]
    fn test_client_error_classification() {
        assert!(MonumentError::validation("Image is required").is_client_error());
        assert!(MonumentError::InvalidImageFormat.is_client_error());
        assert!(MonumentError::PayloadTooLarge(1024).is_client_error());
        assert!(!MonumentError::NoContentError("x".into()).is_client_error());
        assert!(!MonumentError::missing_api_key().is_client_error());
    }
}
