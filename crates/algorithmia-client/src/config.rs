//! Endpoint configuration and URL composition.

use reqwest::Url;
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::types::{AlgoNamespace, DataUri};

/// Platform endpoints plus the API key used to authenticate against them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// REST API root
    pub api_url: String,
    /// Git host serving algorithm source repositories
    pub git_url: String,
    /// Web UI root, used only for status links
    pub web_url: String,
    /// API key (`Authorization: Simple <key>`)
    #[serde(skip_serializing)]
    pub api_key: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        ClientConfig {
            api_url: std::env::var("ALGORITHMIA_API")
                .unwrap_or_else(|_| "https://api.algorithmia.com".to_string()),
            git_url: std::env::var("ALGORITHMIA_GIT")
                .unwrap_or_else(|_| "https://git.algorithmia.com".to_string()),
            web_url: std::env::var("ALGORITHMIA_WEB")
                .unwrap_or_else(|_| "https://algorithmia.com".to_string()),
            api_key: std::env::var("ALGORITHMIA_API_KEY").ok(),
        }
    }
}

impl ClientConfig {
    /// Create a new config from environment variables
    pub fn from_env() -> Self {
        Self::default()
    }

    /// Create config for a specific API root
    pub fn new(api_url: &str) -> Self {
        ClientConfig {
            api_url: api_url.to_string(),
            ..Self::default()
        }
    }

    /// Set the API key
    pub fn with_api_key(mut self, api_key: &str) -> Self {
        self.api_key = Some(api_key.to_string());
        self
    }

    /// Override the git host
    pub fn with_git_url(mut self, git_url: &str) -> Self {
        self.git_url = git_url.to_string();
        self
    }

    fn api(&self, path: &str) -> String {
        format!("{}/v1/{}", self.api_url.trim_end_matches('/'), path)
    }

    /// `GET`/`PUT` target for a data entry.
    pub fn data_url(&self, uri: &DataUri) -> String {
        self.api(&format!("data/{}", uri.path()))
    }

    /// `POST` target that creates a child entry below `parent_path`.
    pub fn data_parent_url(&self, parent_path: &str) -> String {
        if parent_path.is_empty() {
            self.api("data")
        } else {
            self.api(&format!("data/{}", parent_path))
        }
    }

    pub fn algorithms_url(&self, owner: &str) -> String {
        self.api(&format!("algorithms/{}", owner))
    }

    pub fn algorithm_url(&self, ns: &AlgoNamespace) -> String {
        self.api(&format!("algorithms/{}", ns))
    }

    pub fn versions_url(&self, ns: &AlgoNamespace) -> String {
        self.api(&format!("algorithms/{}/versions", ns))
    }

    /// Invocation endpoint for one build (git hash or semantic version).
    pub fn invoke_url(&self, ns: &AlgoNamespace, version: &str) -> String {
        self.api(&format!("algo/{}", ns.at(version)))
    }

    /// Clone URL with the owner and percent-encoded API key in the userinfo.
    pub fn clone_url(&self, ns: &AlgoNamespace, api_key: &str) -> ApiResult<Url> {
        let raw = format!(
            "{}/git/{}/{}.git",
            self.git_url.trim_end_matches('/'),
            ns.owner(),
            ns.name()
        );
        let mut url = Url::parse(&raw).map_err(|e| ApiError::InvalidUrl(format!("{raw}: {e}")))?;
        url.set_username(ns.owner())
            .map_err(|_| ApiError::InvalidUrl(format!("{raw}: cannot carry credentials")))?;
        url.set_password(Some(api_key))
            .map_err(|_| ApiError::InvalidUrl(format!("{raw}: cannot carry credentials")))?;
        Ok(url)
    }

    /// Public page of an algorithm.
    pub fn web_algorithm_url(&self, ns: &AlgoNamespace) -> String {
        format!("{}/algorithms/{}", self.web_url.trim_end_matches('/'), ns)
    }

    /// Source view of an algorithm.
    pub fn web_source_url(&self, ns: &AlgoNamespace) -> String {
        format!("{}/source", self.web_algorithm_url(ns))
    }
}
