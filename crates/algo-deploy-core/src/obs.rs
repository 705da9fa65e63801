//! Structured observability hooks for deployment runs.
//!
//! This module provides:
//! - A run-scoped tracing span via [`deploy_span`]
//! - Emission functions for stage changes, uploads, retries and outcomes
//!
//! Events are emitted at `info!` level unless noted. Filtering follows
//! `RUST_LOG`; JSON output is selected by the binary's `--json` flag.

use tracing::{info, warn};

use crate::stage::DeployStage;

/// Span covering one deployment, tagged with the run id and algorithm namespace.
///
/// # Example
///
/// ```ignore
/// pipeline.execute().instrument(deploy_span("5f0c...", "alice/movie_sentiment")).await
/// // every event inside carries run_id and algorithm
/// ```
pub fn deploy_span(run_id: &str, algorithm: &str) -> tracing::Span {
    tracing::info_span!("algo_deploy.run", run_id = %run_id, algorithm = %algorithm)
}

/// Emit event: pipeline reached a new stage.
pub fn emit_stage_entered(stage: DeployStage) {
    info!(event = "stage.entered", stage = %stage);
}

/// Emit event: a local artifact landed in remote storage.
pub fn emit_artifact_uploaded(remote: &str, bytes: u64, sha256: &str) {
    info!(
        event = "artifact.uploaded",
        remote = %remote,
        bytes = bytes,
        sha256 = %sha256,
    );
}

/// Emit event: a recoverable failure; another attempt follows.
pub fn emit_retry_attempt(attempt: u32, max_attempts: u32, error: &dyn std::fmt::Display) {
    warn!(
        event = "retry.attempt_failed",
        attempt = attempt,
        max_attempts = max_attempts,
        error = %error,
    );
}

/// Emit event: an invocation returned a result.
pub fn emit_invocation_ok(target: &str, value: &serde_json::Value) {
    info!(event = "invocation.ok", target = %target, value = %value);
}

/// Emit event: deployment finished and the algorithm is live.
pub fn emit_deploy_finished(algorithm: &str, version: &str, duration_ms: u64) {
    info!(
        event = "deploy.finished",
        algorithm = %algorithm,
        version = %version,
        duration_ms = duration_ms,
    );
}

/// Emit event: deployment aborted (warning level).
pub fn emit_deploy_failed(stage: DeployStage, error: &dyn std::fmt::Display) {
    warn!(event = "deploy.failed", last_stage = %stage, error = %error);
}
