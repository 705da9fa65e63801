//! Error taxonomy for the deployment pipeline.

use algorithmia_client::ApiError;

use crate::stage::DeployStage;

/// Deployment errors.
#[derive(Debug, thiserror::Error)]
pub enum DeployError {
    #[error("configuration error: {0}")]
    Config(String),

    #[error("platform error: {0}")]
    Platform(#[from] ApiError),

    #[error("git error: {0}")]
    GitError(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("{target} returned no `{field}` in its result")]
    MissingResult { target: String, field: String },

    #[error("{namespace} reports no {kind}")]
    MissingRevision {
        namespace: String,
        kind: &'static str,
    },

    #[error("cannot move from stage {from} to {to}")]
    InvalidTransition { from: DeployStage, to: DeployStage },
}

impl DeployError {
    /// Whether the error came from the platform's readiness signal.
    pub fn is_not_ready(&self) -> bool {
        matches!(self, DeployError::Platform(e) if e.is_not_ready())
    }
}

/// Result type for deployment operations.
pub type Result<T> = std::result::Result<T, DeployError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deploy_error_display() {
        let err = DeployError::GitError("push rejected".to_string());
        assert!(err.to_string().contains("git error"));

        let err = DeployError::MissingResult {
            target: "alice/movie_sentiment/0.1.0".to_string(),
            field: "prob".to_string(),
        };
        assert!(err.to_string().contains("`prob`"));
    }

    #[test]
    fn test_platform_readiness_passes_through() {
        let err: DeployError = ApiError::AlgorithmException {
            error_type: "AlgorithmError".to_string(),
            message: "compiling".to_string(),
        }
        .into();
        assert!(err.is_not_ready());
        assert!(!DeployError::Config("x".to_string()).is_not_ready());
    }
}
