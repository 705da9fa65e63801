//! In-memory fakes for the platform traits (testing only)
//!
//! `MemoryPlatform` implements both `DataStore` and `AlgorithmRegistry`,
//! records every call in order, and can be told to report builds as not
//! ready for a number of invocations.

use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use serde_json::{json, Value};

use crate::error::{ApiError, ApiResult};
use crate::traits::{AlgorithmRegistry, DataStore};
use crate::types::{
    AlgoNamespace, AlgorithmInfo, AlgorithmVersionInfo, DataUri, Invocation, NewAlgorithm,
    VersionType,
};

/// Git hash reported for a freshly created algorithm.
pub const DEFAULT_BUILD_HASH: &str = "3f786850e387550fdab836ed7e6dc881de23001b";

/// One recorded platform call.
#[derive(Debug, Clone, PartialEq)]
pub enum PlatformCall {
    DirExists(String),
    CreateDir(String),
    PutFile { remote: String, bytes: usize },
    Create(String),
    Info(String),
    Publish(String),
    Invoke { target: String, input: Value },
}

#[derive(Debug)]
struct AlgorithmState {
    algorithm: NewAlgorithm,
    git_hash: String,
    versions: Vec<String>,
}

#[derive(Debug)]
struct PlatformState {
    dirs: BTreeSet<String>,
    files: BTreeMap<String, Vec<u8>>,
    algorithms: BTreeMap<String, AlgorithmState>,
    calls: Vec<PlatformCall>,
    build_hash: String,
    not_ready_remaining: u32,
    never_ready: bool,
    result: Value,
}

/// In-memory hosting platform.
#[derive(Debug)]
pub struct MemoryPlatform {
    state: Mutex<PlatformState>,
}

impl Default for MemoryPlatform {
    fn default() -> Self {
        Self {
            state: Mutex::new(PlatformState {
                // Every account has a home directory.
                dirs: BTreeSet::from([".my".to_string()]),
                files: BTreeMap::new(),
                algorithms: BTreeMap::new(),
                calls: Vec::new(),
                build_hash: DEFAULT_BUILD_HASH.to_string(),
                not_ready_remaining: 0,
                never_ready: false,
                result: json!({ "prob": 0.97 }),
            }),
        }
    }
}

impl MemoryPlatform {
    pub fn new() -> Self {
        Self::default()
    }

    /// Git hash assigned to algorithms created from now on.
    pub fn with_build_hash(self, hash: &str) -> Self {
        self.state.lock().unwrap().build_hash = hash.to_string();
        self
    }

    /// Fail the next `n` invocations with an algorithm exception.
    pub fn with_not_ready_failures(self, n: u32) -> Self {
        self.state.lock().unwrap().not_ready_remaining = n;
        self
    }

    /// Fail every invocation with an algorithm exception.
    pub fn never_ready(self) -> Self {
        self.state.lock().unwrap().never_ready = true;
        self
    }

    /// Result object returned by successful invocations.
    pub fn with_result(self, result: Value) -> Self {
        self.state.lock().unwrap().result = result;
        self
    }

    /// Pre-create a directory.
    pub fn with_dir(self, path: &str) -> Self {
        self.state
            .lock()
            .unwrap()
            .dirs
            .insert(DataUri::new(path).path().to_string());
        self
    }

    /// Simulate a push that triggered a new build.
    pub fn set_git_hash(&self, ns: &AlgoNamespace, hash: &str) {
        let mut state = self.state.lock().unwrap();
        if let Some(algo) = state.algorithms.get_mut(&ns.to_string()) {
            algo.git_hash = hash.to_string();
        }
    }

    pub fn calls(&self) -> Vec<PlatformCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn dirs(&self) -> Vec<String> {
        self.state.lock().unwrap().dirs.iter().cloned().collect()
    }

    /// Remote file paths (without scheme) in upload order-independent form.
    pub fn files(&self) -> Vec<String> {
        self.state.lock().unwrap().files.keys().cloned().collect()
    }

    pub fn file(&self, uri: &DataUri) -> Option<Vec<u8>> {
        self.state.lock().unwrap().files.get(uri.path()).cloned()
    }

    pub fn algorithm(&self, ns: &AlgoNamespace) -> Option<NewAlgorithm> {
        self.state
            .lock()
            .unwrap()
            .algorithms
            .get(&ns.to_string())
            .map(|a| a.algorithm.clone())
    }

    /// Published semantic versions, oldest first.
    pub fn versions(&self, ns: &AlgoNamespace) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .algorithms
            .get(&ns.to_string())
            .map(|a| a.versions.clone())
            .unwrap_or_default()
    }
}

#[async_trait]
impl DataStore for MemoryPlatform {
    async fn dir_exists(&self, dir: &DataUri) -> ApiResult<bool> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(PlatformCall::DirExists(dir.to_string()));
        Ok(state.dirs.contains(dir.path()))
    }

    async fn create_dir(&self, dir: &DataUri) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(PlatformCall::CreateDir(dir.to_string()));
        let parent = dir.parent_path();
        if !parent.is_empty() && !state.dirs.contains(parent) {
            return Err(ApiError::NotFound(format!("data://{parent}")));
        }
        state.dirs.insert(dir.path().to_string());
        Ok(())
    }

    async fn put_file(&self, remote: &DataUri, local: &Path) -> ApiResult<()> {
        let bytes = tokio::fs::read(local).await?;
        let mut state = self.state.lock().unwrap();
        state.calls.push(PlatformCall::PutFile {
            remote: remote.to_string(),
            bytes: bytes.len(),
        });
        if !state.dirs.contains(remote.parent_path()) {
            return Err(ApiError::NotFound(format!("data://{}", remote.parent_path())));
        }
        state.files.insert(remote.path().to_string(), bytes);
        Ok(())
    }
}

#[async_trait]
impl AlgorithmRegistry for MemoryPlatform {
    async fn create(&self, ns: &AlgoNamespace, algorithm: &NewAlgorithm) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(PlatformCall::Create(ns.to_string()));
        let key = ns.to_string();
        if state.algorithms.contains_key(&key) {
            return Err(ApiError::AlreadyExists(key));
        }
        let git_hash = state.build_hash.clone();
        state.algorithms.insert(
            key,
            AlgorithmState {
                algorithm: algorithm.clone(),
                git_hash,
                versions: Vec::new(),
            },
        );
        Ok(())
    }

    async fn info(&self, ns: &AlgoNamespace) -> ApiResult<AlgorithmInfo> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(PlatformCall::Info(ns.to_string()));
        let algo = state
            .algorithms
            .get(&ns.to_string())
            .ok_or_else(|| ApiError::NotFound(ns.to_string()))?;
        Ok(AlgorithmInfo {
            name: Some(ns.name().to_string()),
            version_info: AlgorithmVersionInfo {
                git_hash: Some(algo.git_hash.clone()),
                semantic_version: algo.versions.last().cloned(),
            },
        })
    }

    async fn publish(&self, ns: &AlgoNamespace, version_type: VersionType) -> ApiResult<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(PlatformCall::Publish(ns.to_string()));
        let algo = state
            .algorithms
            .get_mut(&ns.to_string())
            .ok_or_else(|| ApiError::NotFound(ns.to_string()))?;
        let next = bump(algo.versions.last().map(String::as_str), version_type);
        algo.versions.push(next);
        Ok(())
    }

    async fn invoke(
        &self,
        ns: &AlgoNamespace,
        version: &str,
        input: &Value,
    ) -> ApiResult<Invocation> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(PlatformCall::Invoke {
            target: ns.at(version),
            input: input.clone(),
        });
        let callable = state
            .algorithms
            .get(&ns.to_string())
            .map(|a| a.git_hash == version || a.versions.iter().any(|v| v == version))
            .unwrap_or(false);
        if !callable {
            return Err(ApiError::NotFound(ns.at(version)));
        }
        if state.never_ready || state.not_ready_remaining > 0 {
            state.not_ready_remaining = state.not_ready_remaining.saturating_sub(1);
            return Err(ApiError::AlgorithmException {
                error_type: "AlgorithmError".to_string(),
                message: format!("{} is not yet available", ns.at(version)),
            });
        }
        Ok(Invocation {
            result: state.result.clone(),
            metadata: Some(json!({ "content_type": "json" })),
        })
    }
}

fn bump(current: Option<&str>, version_type: VersionType) -> String {
    let parts: Vec<u64> = current
        .map(|v| v.split('.').filter_map(|p| p.parse().ok()).collect())
        .unwrap_or_default();
    let (major, minor, patch) = match parts.as_slice() {
        [major, minor, patch] => (*major, *minor, *patch),
        _ => (0, 0, 0),
    };
    match version_type {
        VersionType::Major => format!("{}.0.0", major + 1),
        VersionType::Minor => format!("{}.{}.0", major, minor + 1),
        VersionType::Revision => format!("{}.{}.{}", major, minor, patch + 1),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bump_versions() {
        assert_eq!(bump(None, VersionType::Minor), "0.1.0");
        assert_eq!(bump(Some("0.1.0"), VersionType::Minor), "0.2.0");
        assert_eq!(bump(Some("0.2.3"), VersionType::Revision), "0.2.4");
        assert_eq!(bump(Some("0.2.3"), VersionType::Major), "1.0.0");
    }

    #[tokio::test]
    async fn create_twice_conflicts() {
        let platform = MemoryPlatform::new();
        let ns = AlgoNamespace::new("alice", "movie_sentiment");
        platform.create(&ns, &NewAlgorithm::default()).await.unwrap();
        let err = platform
            .create(&ns, &NewAlgorithm::default())
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::AlreadyExists(_)));
    }

    #[tokio::test]
    async fn not_ready_failures_run_out() {
        let platform = MemoryPlatform::new().with_not_ready_failures(2);
        let ns = AlgoNamespace::new("alice", "movie_sentiment");
        platform.create(&ns, &NewAlgorithm::default()).await.unwrap();
        let input = json!({"text": "great movie"});

        for _ in 0..2 {
            let err = platform
                .invoke(&ns, DEFAULT_BUILD_HASH, &input)
                .await
                .unwrap_err();
            assert!(err.is_not_ready());
        }
        let ok = platform.invoke(&ns, DEFAULT_BUILD_HASH, &input).await.unwrap();
        assert_eq!(ok.field("prob"), Some(&json!(0.97)));
    }

    #[tokio::test]
    async fn unpublished_version_is_not_callable() {
        let platform = MemoryPlatform::new();
        let ns = AlgoNamespace::new("alice", "movie_sentiment");
        platform.create(&ns, &NewAlgorithm::default()).await.unwrap();
        let err = platform
            .invoke(&ns, "0.1.0", &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        platform.publish(&ns, VersionType::Minor).await.unwrap();
        assert!(platform.invoke(&ns, "0.1.0", &json!({})).await.is_ok());
    }
}
