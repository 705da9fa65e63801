//! Identifiers and wire payloads for the v1 API.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{ApiError, ApiResult};

/// Scheme prefix for platform-managed data paths.
pub const DATA_SCHEME: &str = "data://";

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// An algorithm addressed as `owner/name`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AlgoNamespace {
    owner: String,
    name: String,
}

impl AlgoNamespace {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }

    pub fn owner(&self) -> &str {
        &self.owner
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// `owner/name/version`, the path segment used to call one build.
    pub fn at(&self, version: &str) -> String {
        format!("{}/{}/{}", self.owner, self.name, version)
    }
}

impl std::fmt::Display for AlgoNamespace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.owner, self.name)
    }
}

/// A location in platform-managed storage, always rendered as `data://<path>`.
///
/// The inner path never carries the scheme nor leading/trailing slashes.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DataUri(String);

impl DataUri {
    /// Accepts either a bare path (`.my/models`) or a full `data://` URI.
    pub fn new(path: &str) -> Self {
        let bare = path.strip_prefix(DATA_SCHEME).unwrap_or(path);
        DataUri(bare.trim_matches('/').to_string())
    }

    /// Path without the scheme.
    pub fn path(&self) -> &str {
        &self.0
    }

    /// Last path segment.
    pub fn name(&self) -> &str {
        self.0.rsplit('/').next().unwrap_or(&self.0)
    }

    /// Parent path without the scheme; empty for a top-level entry.
    pub fn parent_path(&self) -> &str {
        match self.0.rfind('/') {
            Some(idx) => &self.0[..idx],
            None => "",
        }
    }

    /// Child entry below this directory.
    pub fn join(&self, name: &str) -> DataUri {
        DataUri::new(&format!("{}/{}", self.0, name.trim_matches('/')))
    }
}

impl std::fmt::Display for DataUri {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", DATA_SCHEME, self.0)
    }
}

// ---------------------------------------------------------------------------
// Algorithm creation
// ---------------------------------------------------------------------------

/// Descriptive metadata shown on the algorithm page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmDetails {
    pub summary: String,
    pub label: String,
    pub tagline: String,
}

impl Default for AlgorithmDetails {
    fn default() -> Self {
        Self {
            summary: "This algorithms returns the sentiment of movie reviews.".to_string(),
            label: "Movie Review Sentiment Analysis".to_string(),
            tagline: "movie_review_sentiment".to_string(),
        }
    }
}

/// Runtime and access settings for a hosted algorithm.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmSettings {
    pub source_visibility: String,
    pub package_set: String,
    pub license: String,
    pub network_access: String,
    pub pipeline_enabled: bool,
}

impl Default for AlgorithmSettings {
    fn default() -> Self {
        Self {
            source_visibility: "closed".to_string(),
            package_set: "tensorflow-gpu-1.12".to_string(),
            license: "apl".to_string(),
            network_access: "full".to_string(),
            pipeline_enabled: true,
        }
    }
}

/// Version information sent with a creation call.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateVersionInfo {
    /// Example request body, rendered as JSON text.
    pub sample_input: String,
}

impl Default for CreateVersionInfo {
    fn default() -> Self {
        Self {
            sample_input:
                "{\n    \"text\": \"This is a positive review. I really liked it! It was great!\"\n}"
                    .to_string(),
        }
    }
}

/// Everything the platform needs to allocate a new algorithm.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAlgorithm {
    pub details: AlgorithmDetails,
    pub settings: AlgorithmSettings,
    pub version_info: CreateVersionInfo,
}

/// Request body of `POST /v1/algorithms/{owner}`.
#[derive(Debug, Serialize)]
pub(crate) struct CreateAlgorithmRequest<'a> {
    pub name: &'a str,
    pub details: &'a AlgorithmDetails,
    pub settings: &'a AlgorithmSettings,
    pub version_info: &'a CreateVersionInfo,
}

// ---------------------------------------------------------------------------
// Algorithm metadata and publishing
// ---------------------------------------------------------------------------

/// Revision identifiers reported for an algorithm.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmVersionInfo {
    /// Revision of the latest pushed build.
    #[serde(default)]
    pub git_hash: Option<String>,
    /// Version tag of the latest published release.
    #[serde(default)]
    pub semantic_version: Option<String>,
}

/// Subset of `GET /v1/algorithms/{owner}/{name}` this client reads.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AlgorithmInfo {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub version_info: AlgorithmVersionInfo,
}

/// Which component of the semantic version a publish bumps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VersionType {
    Major,
    #[default]
    Minor,
    Revision,
}

#[derive(Debug, Serialize)]
pub(crate) struct PublishRequest {
    pub version_info: PublishVersionInfo,
}

#[derive(Debug, Serialize)]
pub(crate) struct PublishVersionInfo {
    pub version_type: VersionType,
}

// ---------------------------------------------------------------------------
// Invocation
// ---------------------------------------------------------------------------

/// Successful algorithm response.
#[derive(Debug, Clone, PartialEq)]
pub struct Invocation {
    pub result: Value,
    pub metadata: Option<Value>,
}

impl Invocation {
    /// Member `field` of an object result, of any JSON type.
    pub fn field(&self, field: &str) -> Option<&Value> {
        self.result.get(field)
    }
}

#[derive(Debug, Deserialize)]
struct InvocationEnvelope {
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    metadata: Option<Value>,
    #[serde(default)]
    error: Option<InvocationFault>,
}

#[derive(Debug, Deserialize)]
struct InvocationFault {
    #[serde(default)]
    message: String,
    #[serde(default)]
    error_type: Option<String>,
}

/// Decode an invocation response body.
///
/// An `error` member wins over everything else, including a success status.
pub fn parse_invocation(body: &[u8]) -> ApiResult<Invocation> {
    let envelope: InvocationEnvelope = serde_json::from_slice(body)?;
    if let Some(fault) = envelope.error {
        return Err(ApiError::AlgorithmException {
            error_type: fault
                .error_type
                .unwrap_or_else(|| "AlgorithmError".to_string()),
            message: fault.message,
        });
    }
    let result = envelope
        .result
        .ok_or_else(|| ApiError::InvalidResponse("response has no result".to_string()))?;
    Ok(Invocation {
        result,
        metadata: envelope.metadata,
    })
}
