use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error, Clone)]
pub enum ProviderError {
    #[error("Token exchange error: {0}")]
    TokenExchange(String),

    #[error("Fetch identity error: {0}")]
    FetchIdentity(String),

    /// The provider answered, but with something we could not use. Carries
    /// the raw response body so failures can be diagnosed from the log.
    #[error("Invalid provider response: {message}")]
    InvalidResponse {
        message: String,
        body: Option<String>,
    },

    #[error("Provider identity has no identifier")]
    MissingIdentifier,

    #[error("Provider call timed out after {0:?}")]
    Timeout(Duration),

    #[error("Serde error: {0}")]
    Serde(String),
}

impl ProviderError {
    /// Raw provider response body, when this failure kind carries one.
    pub fn response_body(&self) -> Option<&str> {
        match self {
            Self::InvalidResponse { body, .. } => body.as_deref(),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_is_sync_and_send() {
        fn assert_sync_send<T: Sync + Send>() {}
        assert_sync_send::<ProviderError>();
    }

    #[test]
    fn test_response_body_only_for_invalid_response() {
        let err = ProviderError::InvalidResponse {
            message: "not json".to_string(),
            body: Some("<html>gateway error</html>".to_string()),
        };
        assert_eq!(err.response_body(), Some("<html>gateway error</html>"));

        let err = ProviderError::TokenExchange("boom".to_string());
        assert_eq!(err.response_body(), None);
    }

    #[test]
    fn test_error_display() {
        let err = ProviderError::Timeout(Duration::from_secs(10));
        assert_eq!(err.to_string(), "Provider call timed out after 10s");

        let err = ProviderError::MissingIdentifier;
        assert_eq!(err.to_string(), "Provider identity has no identifier");
    }
}
