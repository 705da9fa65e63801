//! Capability traits for the hosting platform.
//!
//! - `DataStore`: managed file storage (collections and files)
//! - `AlgorithmRegistry`: algorithm lifecycle (create, inspect, publish, invoke)
//!
//! `AlgorithmiaClient` implements both over HTTP; `fakes::MemoryPlatform`
//! implements both in memory for tests.

use std::path::Path;

use async_trait::async_trait;
use serde_json::Value;

use crate::error::ApiResult;
use crate::types::{AlgoNamespace, AlgorithmInfo, DataUri, Invocation, NewAlgorithm, VersionType};

/// Platform-managed file storage.
#[async_trait]
pub trait DataStore: Send + Sync {
    /// Whether a directory exists.
    async fn dir_exists(&self, dir: &DataUri) -> ApiResult<bool>;

    /// Create a directory. Fails if the parent does not exist.
    async fn create_dir(&self, dir: &DataUri) -> ApiResult<()>;

    /// Upload a local file, overwriting any existing remote file.
    async fn put_file(&self, remote: &DataUri, local: &Path) -> ApiResult<()>;
}

/// Hosted algorithm lifecycle.
#[async_trait]
pub trait AlgorithmRegistry: Send + Sync {
    /// Allocate a new algorithm. Returns `ApiError::AlreadyExists` if the
    /// name is taken.
    async fn create(&self, ns: &AlgoNamespace, algorithm: &NewAlgorithm) -> ApiResult<()>;

    /// Current metadata, including the latest git hash and semantic version.
    async fn info(&self, ns: &AlgoNamespace) -> ApiResult<AlgorithmInfo>;

    /// Publish the latest build under a new semantic version.
    async fn publish(&self, ns: &AlgoNamespace, version_type: VersionType) -> ApiResult<()>;

    /// Call one build of an algorithm with a JSON input.
    async fn invoke(&self, ns: &AlgoNamespace, version: &str, input: &Value)
        -> ApiResult<Invocation>;
}
