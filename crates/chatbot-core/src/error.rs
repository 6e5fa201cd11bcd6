use thiserror::Error;

/// Shown instead of calling the endpoint when no API key is configured.
pub const CREDENTIAL_REQUIRED: &str =
    "Please add your Google Gemini API key first! Check the instructions above.";

const INVALID_KEY: &str =
    "API key is invalid or has insufficient permissions. Please check your API key.";
const RATE_LIMITED: &str = "Rate limit exceeded. Please wait a moment before trying again.";
const NOT_FOUND: &str = "API endpoint not found. Please check if your API key is valid.";
const OVERLOADED: &str = "The service is currently overloaded. Please try again later.";
const GENERIC: &str = "Sorry, I encountered an error. Please try again later.";

/// HTTP status the endpoint uses to signal a transient overload.
pub const OVERLOADED_STATUS: u16 = 503;

/// Failures surfaced by the request pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiFailure {
    #[error("network failure: {0}")]
    Network(String),
    #[error("API request failed: {status} - {message}")]
    HttpStatus { status: u16, message: String },
    #[error("Invalid response format from API")]
    InvalidFormat,
    #[error("service still overloaded after {attempts} attempts")]
    RetriesExhausted { attempts: u32 },
}

impl ApiFailure {
    /// Only an overload response is worth another attempt.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            ApiFailure::HttpStatus { status, .. } if *status == OVERLOADED_STATUS
        )
    }

    /// The message shown to the user for this failure.
    pub fn user_message(&self) -> &'static str {
        match self {
            ApiFailure::HttpStatus { status: 403, .. } => INVALID_KEY,
            ApiFailure::HttpStatus { status: 429, .. } => RATE_LIMITED,
            ApiFailure::HttpStatus { status: 404, .. } => NOT_FOUND,
            ApiFailure::RetriesExhausted { .. } => OVERLOADED,
            ApiFailure::HttpStatus { .. } | ApiFailure::InvalidFormat | ApiFailure::Network(_) => {
                GENERIC
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn http(status: u16) -> ApiFailure {
        ApiFailure::HttpStatus {
            status,
            message: "Unknown error".to_string(),
        }
    }

    #[test]
    fn test_status_specific_messages() {
        assert_eq!(http(403).user_message(), INVALID_KEY);
        assert_eq!(http(429).user_message(), RATE_LIMITED);
        assert_eq!(http(404).user_message(), NOT_FOUND);
    }

    #[test]
    fn test_exhausted_retries_reads_as_overload() {
        let failure = ApiFailure::RetriesExhausted { attempts: 3 };
        assert_eq!(failure.user_message(), OVERLOADED);
    }

    #[test]
    fn test_everything_else_is_generic() {
        assert_eq!(http(500).user_message(), GENERIC);
        assert_eq!(http(400).user_message(), GENERIC);
        assert_eq!(ApiFailure::InvalidFormat.user_message(), GENERIC);
        assert_eq!(
            ApiFailure::Network("connection refused".to_string()).user_message(),
            GENERIC
        );
    }

    #[test]
    fn test_only_503_is_transient() {
        assert!(http(503).is_transient());
        assert!(!http(500).is_transient());
        assert!(!http(429).is_transient());
        assert!(!ApiFailure::InvalidFormat.is_transient());
        assert!(!ApiFailure::RetriesExhausted { attempts: 3 }.is_transient());
    }

    #[test]
    fn test_display_includes_status_and_message() {
        let failure = ApiFailure::HttpStatus {
            status: 400,
            message: "API key not valid".to_string(),
        };
        assert_eq!(failure.to_string(), "API request failed: 400 - API key not valid");
    }
}
