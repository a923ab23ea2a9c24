//! Error types for element service access.

use thiserror::Error;

/// HTTP statuses worth retrying: rate limiting and upstream gateway
/// hiccups. Anything else fails fast.
const RETRYABLE_STATUSES: [u16; 4] = [429, 502, 503, 504];

/// Errors from the element data service layer.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ElementsError {
    /// The category label was empty or produced no candidate tokens.
    #[error("invalid category label: {0:?}")]
    InvalidCategory(String),

    /// Every candidate (token, filter) pair was rejected as a query
    /// syntax error. Carries the last syntax error's message.
    #[error("category {label:?} could not be resolved: {detail}")]
    UnresolvableCategory { label: String, detail: String },

    /// Connection could not be established.
    #[error("connection error: {0}")]
    Connect(String),

    /// The request timed out.
    #[error("request timed out: {0}")]
    Timeout(String),

    /// Non-success HTTP status from the service.
    #[error("service returned HTTP {status}: {message}")]
    Http { status: u16, message: String },

    /// The service answered 200 but reported an error payload. Never
    /// retried; the query itself is at fault.
    #[error("service error: {0}")]
    Service(String),

    /// Response body could not be decoded.
    #[error("invalid service response: {0}")]
    Decode(String),
}

impl ElementsError {
    /// Whether a fresh attempt at the same call could succeed.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Connect(_) | Self::Timeout(_) => true,
            Self::Http { status, .. } => RETRYABLE_STATUSES.contains(status),
            _ => false,
        }
    }

    /// Whether this is a query-syntax rejection from the service.
    ///
    /// The service has no structured code for these, so detection goes
    /// by message text, whether the rejection arrived as an error
    /// payload or as an HTTP error body.
    #[must_use]
    pub fn is_query_syntax(&self) -> bool {
        match self {
            Self::Service(message) | Self::Http { message, .. } => {
                message.contains("Error with query syntax") || message.contains("Lexical error")
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for ElementsError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            Self::Timeout(err.to_string())
        } else if err.is_connect() {
            Self::Connect(err.to_string())
        } else if err.is_decode() {
            Self::Decode(err.to_string())
        } else {
            Self::Connect(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, ElementsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retryable_classification() {
        assert!(ElementsError::Timeout("45s elapsed".to_string()).is_retryable());
        assert!(
            ElementsError::Http {
                status: 503,
                message: "unavailable".to_string()
            }
            .is_retryable()
        );
        assert!(
            !ElementsError::Http {
                status: 400,
                message: "bad request".to_string()
            }
            .is_retryable()
        );
        assert!(!ElementsError::Service("boom".to_string()).is_retryable());
    }

    #[test]
    fn syntax_detection_matches_service_messages() {
        assert!(ElementsError::Service("Error with query syntax near ==".to_string())
            .is_query_syntax());
        assert!(ElementsError::Service("Lexical error at line 1".to_string()).is_query_syntax());
        assert!(!ElementsError::Service("internal failure".to_string()).is_query_syntax());
        assert!(
            ElementsError::Http {
                status: 400,
                message: "Error with query syntax".to_string()
            }
            .is_query_syntax()
        );
    }
}
