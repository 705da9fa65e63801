//! Error types for algorithmia-client

use thiserror::Error;

/// Errors returned by the hosting platform or the transport underneath it.
#[derive(Error, Debug)]
pub enum ApiError {
    /// Transport-level failure (DNS, TLS, connection reset)
    #[error("HTTP error: {0}")]
    Http(String),

    /// The API answered with a non-success status
    #[error("{url} returned HTTP {status}: {body}")]
    Status {
        status: u16,
        url: String,
        body: String,
    },

    /// An invocation returned an `error` payload instead of a result
    #[error("algorithm exception ({error_type}): {message}")]
    AlgorithmException { error_type: String, message: String },

    /// Algorithm name already taken in the owner's namespace
    #[error("algorithm already exists: {0}")]
    AlreadyExists(String),

    /// Resource does not exist
    #[error("not found: {0}")]
    NotFound(String),

    /// Response body did not match the expected shape
    #[error("invalid response: {0}")]
    InvalidResponse(String),

    /// URL could not be composed from the configured endpoints
    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    /// IO error (reading a local file for upload)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ApiError {
    /// Whether this error means the requested build is not callable yet.
    ///
    /// The platform answers invocations of a revision that is still compiling
    /// with an algorithm exception; everything else is fatal.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, ApiError::AlgorithmException { .. })
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        ApiError::Http(err.to_string())
    }
}

/// Result type for platform operations
pub type ApiResult<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn algorithm_exception_is_not_ready() {
        let err = ApiError::AlgorithmException {
            error_type: "AlgorithmError".to_string(),
            message: "version is still compiling".to_string(),
        };
        assert!(err.is_not_ready());
        assert!(err.to_string().contains("still compiling"));
    }

    #[test]
    fn other_errors_are_fatal() {
        assert!(!ApiError::AlreadyExists("alice/x".to_string()).is_not_ready());
        assert!(!ApiError::Status {
            status: 401,
            url: "https://api.example.com/v1/data/.my".to_string(),
            body: "unauthorized".to_string(),
        }
        .is_not_ready());
    }
}
