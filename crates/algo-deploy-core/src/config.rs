//! Deployment configuration, fixed for the lifetime of one run.

use std::path::{Path, PathBuf};

use algorithmia_client::{
    AlgoNamespace, AlgorithmDetails, AlgorithmSettings, CreateVersionInfo, DataUri, NewAlgorithm,
};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::retry::RetryPolicy;

/// Remote collection used when none is given.
pub const DEFAULT_DATA_PATH: &str = ".my/mycollection";

/// Local staging directory, wiped at the start of every run.
pub const DEFAULT_WORK_DIR: &str = "algo";

/// Result member read from smoke-test invocations.
pub const DEFAULT_RESULT_FIELD: &str = "prob";

/// Script extension used when the supplied script has none.
pub const DEFAULT_SCRIPT_EXTENSION: &str = "py";

/// API key and account name.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub api_key: String,
    pub username: String,
}

impl Credentials {
    pub fn new(api_key: impl Into<String>, username: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            username: username.into(),
        }
    }
}

// Keep the key out of logs and panics.
impl std::fmt::Debug for Credentials {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Credentials")
            .field("api_key", &"<redacted>")
            .field("username", &self.username)
            .finish()
    }
}

/// Metadata, settings and sample input sent when the algorithm is created.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmProfile {
    pub details: AlgorithmDetails,
    pub settings: AlgorithmSettings,
    pub sample_input: CreateVersionInfo,
}

impl AlgorithmProfile {
    pub fn to_new_algorithm(&self) -> NewAlgorithm {
        NewAlgorithm {
            details: self.details.clone(),
            settings: self.settings.clone(),
            version_info: self.sample_input.clone(),
        }
    }
}

/// Everything one deployment needs besides the trained artifacts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeploymentConfig {
    pub credentials: Credentials,
    pub algoname: String,
    /// Inference script copied to `src/<algoname>.<ext>`.
    pub model_script: PathBuf,
    /// Dependency manifest copied to `requirements.txt`.
    pub dependency_file: PathBuf,
    /// Remote collection path, with or without the `data://` scheme.
    pub data_path: String,
    pub work_dir: PathBuf,
    pub profile: AlgorithmProfile,
    pub retry: RetryPolicy,
    /// Payload for both smoke-test invocations.
    pub test_input: Value,
    pub result_field: String,
}

impl DeploymentConfig {
    pub fn new(
        credentials: Credentials,
        algoname: impl Into<String>,
        model_script: impl Into<PathBuf>,
        dependency_file: impl Into<PathBuf>,
    ) -> Self {
        Self {
            credentials,
            algoname: algoname.into(),
            model_script: model_script.into(),
            dependency_file: dependency_file.into(),
            data_path: DEFAULT_DATA_PATH.to_string(),
            work_dir: PathBuf::from(DEFAULT_WORK_DIR),
            profile: AlgorithmProfile::default(),
            retry: RetryPolicy::default(),
            test_input: default_test_input(),
            result_field: DEFAULT_RESULT_FIELD.to_string(),
        }
    }

    pub fn with_data_path(mut self, data_path: &str) -> Self {
        self.data_path = data_path.to_string();
        self
    }

    pub fn with_work_dir(mut self, work_dir: impl Into<PathBuf>) -> Self {
        self.work_dir = work_dir.into();
        self
    }

    pub fn with_profile(mut self, profile: AlgorithmProfile) -> Self {
        self.profile = profile;
        self
    }

    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn with_test_input(mut self, test_input: Value) -> Self {
        self.test_input = test_input;
        self
    }

    pub fn with_result_field(mut self, field: &str) -> Self {
        self.result_field = field.to_string();
        self
    }

    /// `username/algoname`
    pub fn namespace(&self) -> AlgoNamespace {
        AlgoNamespace::new(&self.credentials.username, &self.algoname)
    }

    pub fn data_uri(&self) -> DataUri {
        DataUri::new(&self.data_path)
    }

    /// Extension of the inference script, `py` if it has none.
    pub fn script_extension(&self) -> String {
        extension_or_default(&self.model_script)
    }
}

fn extension_or_default(path: &Path) -> String {
    path.extension()
        .and_then(|e| e.to_str())
        .filter(|e| !e.is_empty())
        .unwrap_or(DEFAULT_SCRIPT_EXTENSION)
        .to_string()
}

/// Smoke-test payload sent when none is configured.
pub fn default_test_input() -> Value {
    json!({
        "text": "This is a very positive review for the movie. I absolutely loved it!"
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> DeploymentConfig {
        DeploymentConfig::new(
            Credentials::new("simKEY", "alice"),
            "movie_sentiment",
            "model.py",
            "requirements.txt",
        )
    }

    #[test]
    fn defaults() {
        let config = config();
        assert_eq!(config.data_uri().to_string(), "data://.my/mycollection");
        assert_eq!(config.work_dir, PathBuf::from("algo"));
        assert_eq!(config.retry, RetryPolicy::default());
        assert_eq!(config.result_field, "prob");
        assert_eq!(config.namespace().to_string(), "alice/movie_sentiment");
    }

    #[test]
    fn data_path_accepts_full_uri() {
        let config = config().with_data_path("data://.my/models");
        assert_eq!(config.data_uri().path(), ".my/models");
    }

    #[test]
    fn script_extension_follows_source_file() {
        assert_eq!(config().script_extension(), "py");
        let mut config = config();
        config.model_script = PathBuf::from("scripts/handler.R");
        assert_eq!(config.script_extension(), "R");
        config.model_script = PathBuf::from("scripts/handler");
        assert_eq!(config.script_extension(), "py");
    }

    #[test]
    fn credentials_debug_hides_key() {
        let debug = format!("{:?}", Credentials::new("simSECRET", "alice"));
        assert!(!debug.contains("simSECRET"));
        assert!(debug.contains("alice"));
    }

    #[test]
    fn profile_maps_to_creation_request() {
        let algorithm = AlgorithmProfile::default().to_new_algorithm();
        assert_eq!(algorithm.settings.package_set, "tensorflow-gpu-1.12");
        assert_eq!(algorithm, NewAlgorithm::default());
    }
}
