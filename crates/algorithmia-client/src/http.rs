//! reqwest-backed implementation of the platform traits.

use std::path::Path;

use async_trait::async_trait;
use reqwest::{RequestBuilder, Response, StatusCode};
use serde_json::Value;
use tracing::debug;

use crate::config::ClientConfig;
use crate::error::{ApiError, ApiResult};
use crate::traits::{AlgorithmRegistry, DataStore};
use crate::types::{
    parse_invocation, AlgoNamespace, AlgorithmInfo, CreateAlgorithmRequest, DataUri, Invocation,
    NewAlgorithm, PublishRequest, PublishVersionInfo, VersionType,
};

/// HTTP client for the v1 API
pub struct AlgorithmiaClient {
    config: ClientConfig,
    http_client: reqwest::Client,
}

impl AlgorithmiaClient {
    /// Create a new client
    pub fn new(config: ClientConfig) -> ApiResult<Self> {
        let http_client = reqwest::Client::builder()
            .user_agent(concat!("algorithmia-client/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(AlgorithmiaClient {
            config,
            http_client,
        })
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.config.api_key {
            Some(key) => request.header(reqwest::header::AUTHORIZATION, format!("Simple {key}")),
            None => request,
        }
    }

    /// Turn a non-success status into `ApiError::Status`.
    async fn check(response: Response) -> ApiResult<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let url = response.url().to_string();
        let body = response.text().await.unwrap_or_default();
        Err(ApiError::Status {
            status: status.as_u16(),
            url,
            body,
        })
    }
}

#[async_trait]
impl DataStore for AlgorithmiaClient {
    async fn dir_exists(&self, dir: &DataUri) -> ApiResult<bool> {
        let url = self.config.data_url(dir);
        let response = self.authorized(self.http_client.get(&url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(false);
        }
        Self::check(response).await?;
        Ok(true)
    }

    async fn create_dir(&self, dir: &DataUri) -> ApiResult<()> {
        let url = self.config.data_parent_url(dir.parent_path());
        debug!("Creating data directory {}", dir);
        let response = self
            .authorized(self.http_client.post(&url))
            .json(&serde_json::json!({ "name": dir.name() }))
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn put_file(&self, remote: &DataUri, local: &Path) -> ApiResult<()> {
        let bytes = tokio::fs::read(local).await?;
        debug!("Uploading {} bytes to {}", bytes.len(), remote);
        let url = self.config.data_url(remote);
        let response = self
            .authorized(self.http_client.put(&url))
            .body(bytes)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }
}

#[async_trait]
impl AlgorithmRegistry for AlgorithmiaClient {
    async fn create(&self, ns: &AlgoNamespace, algorithm: &NewAlgorithm) -> ApiResult<()> {
        let url = self.config.algorithms_url(ns.owner());
        let request = CreateAlgorithmRequest {
            name: ns.name(),
            details: &algorithm.details,
            settings: &algorithm.settings,
            version_info: &algorithm.version_info,
        };
        let response = self
            .authorized(self.http_client.post(&url))
            .json(&request)
            .send()
            .await?;
        if response.status() == StatusCode::CONFLICT {
            return Err(ApiError::AlreadyExists(ns.to_string()));
        }
        Self::check(response).await?;
        Ok(())
    }

    async fn info(&self, ns: &AlgoNamespace) -> ApiResult<AlgorithmInfo> {
        let url = self.config.algorithm_url(ns);
        let response = self.authorized(self.http_client.get(&url)).send().await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Err(ApiError::NotFound(ns.to_string()));
        }
        let response = Self::check(response).await?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn publish(&self, ns: &AlgoNamespace, version_type: VersionType) -> ApiResult<()> {
        let url = self.config.versions_url(ns);
        let request = PublishRequest {
            version_info: PublishVersionInfo { version_type },
        };
        let response = self
            .authorized(self.http_client.post(&url))
            .json(&request)
            .send()
            .await?;
        Self::check(response).await?;
        Ok(())
    }

    async fn invoke(
        &self,
        ns: &AlgoNamespace,
        version: &str,
        input: &Value,
    ) -> ApiResult<Invocation> {
        let url = self.config.invoke_url(ns, version);
        let response = self
            .authorized(self.http_client.post(&url))
            .json(input)
            .send()
            .await?;
        let status = response.status();
        let body = response.bytes().await?;

        // Error payloads come back with both success and failure statuses.
        match parse_invocation(&body) {
            Err(err @ ApiError::AlgorithmException { .. }) => Err(err),
            _ if !status.is_success() => Err(ApiError::Status {
                status: status.as_u16(),
                url,
                body: String::from_utf8_lossy(&body).to_string(),
            }),
            parsed => parsed,
        }
    }
}
