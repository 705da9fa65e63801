//! Smoke-testing and promotion of a pushed build.
//!
//! [`verify_revision`] calls the build addressed by its git hash until the
//! platform stops reporting it as not ready. Only the [`VerifiedRevision`]
//! it returns unlocks [`promote`], so a release can never be published
//! before its hash-addressed build has answered.

use algorithmia_client::{AlgoNamespace, AlgorithmRegistry, ApiError, VersionType};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{DeployError, Result};
use crate::obs::emit_invocation_ok;
use crate::retry::{retry_when, RetryPolicy};

/// What to send and what to read back.
#[derive(Debug, Clone)]
pub struct SmokeTest<'a> {
    pub input: &'a Value,
    pub result_field: &'a str,
    pub retry: &'a RetryPolicy,
}

/// Proof that the hash-addressed build answered an invocation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VerifiedRevision {
    namespace: AlgoNamespace,
    git_hash: String,
    result: Value,
}

impl VerifiedRevision {
    pub fn namespace(&self) -> &AlgoNamespace {
        &self.namespace
    }

    pub fn git_hash(&self) -> &str {
        &self.git_hash
    }

    /// Value of the configured result field; not checked against anything.
    pub fn result(&self) -> &Value {
        &self.result
    }
}

/// A published, live release.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Release {
    pub git_hash: String,
    pub semantic_version: String,
    pub result: Value,
}

/// Invoke `ns` at `version`, retrying while the build is not ready, and
/// return `test.result_field` of the result, whatever its JSON type.
pub async fn invoke_until_ready(
    registry: &dyn AlgorithmRegistry,
    ns: &AlgoNamespace,
    version: &str,
    test: &SmokeTest<'_>,
) -> Result<Value> {
    let invocation = retry_when(test.retry, ApiError::is_not_ready, |_| {
        registry.invoke(ns, version, test.input)
    })
    .await?;

    let target = ns.at(version);
    let value = invocation
        .field(test.result_field)
        .cloned()
        .ok_or_else(|| DeployError::MissingResult {
            target: target.clone(),
            field: test.result_field.to_string(),
        })?;
    emit_invocation_ok(&target, &value);
    Ok(value)
}

/// Read the latest git hash and smoke-test that build.
pub async fn verify_revision(
    registry: &dyn AlgorithmRegistry,
    ns: &AlgoNamespace,
    test: &SmokeTest<'_>,
) -> Result<VerifiedRevision> {
    let info = registry.info(ns).await?;
    let git_hash = info
        .version_info
        .git_hash
        .ok_or_else(|| DeployError::MissingRevision {
            namespace: ns.to_string(),
            kind: "git hash",
        })?;

    let result = invoke_until_ready(registry, ns, &git_hash, test).await?;
    debug!("Build {} answered", ns.at(&git_hash));
    Ok(VerifiedRevision {
        namespace: ns.clone(),
        git_hash,
        result,
    })
}

/// Publish the verified build and smoke-test it under its new version.
pub async fn promote(
    registry: &dyn AlgorithmRegistry,
    verified: VerifiedRevision,
    test: &SmokeTest<'_>,
) -> Result<Release> {
    let ns = &verified.namespace;
    registry.publish(ns, VersionType::Minor).await?;

    let info = registry.info(ns).await?;
    let semantic_version =
        info.version_info
            .semantic_version
            .ok_or_else(|| DeployError::MissingRevision {
                namespace: ns.to_string(),
                kind: "semantic version",
            })?;

    let result = invoke_until_ready(registry, ns, &semantic_version, test).await?;
    debug!("Release {} answered", ns.at(&semantic_version));
    Ok(Release {
        git_hash: verified.git_hash,
        semantic_version,
        result,
    })
}
