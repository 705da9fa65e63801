//! Summary of a finished deployment.

use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::artifacts::UploadedArtifact;
use crate::stage::DeployStage;

/// Everything a successful run produced, in pipeline order.
#[derive(Debug, Clone, Serialize)]
pub struct DeployReport {
    pub run_id: Uuid,
    pub algorithm: String,
    pub data_uri: String,
    pub collection_created: bool,
    pub artifacts: Vec<UploadedArtifact>,
    pub algorithm_url: String,
    pub source_url: String,
    pub commit: String,
    pub committed_files: Vec<String>,
    pub git_hash: String,
    pub hash_result: Value,
    pub semantic_version: String,
    pub version_result: Value,
    pub stage: DeployStage,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
}

impl DeployReport {
    pub fn duration_ms(&self) -> u64 {
        (self.finished_at - self.started_at)
            .num_milliseconds()
            .max(0) as u64
    }

    /// Human-readable summary.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Deployment {}\n", self.run_id));
        out.push_str(&format!("  algorithm:  {}\n", self.algorithm));
        out.push_str(&format!("  version:    {}\n", self.semantic_version));
        out.push_str(&format!("  git hash:   {}\n", self.git_hash));
        out.push_str(&format!("  page:       {}\n", self.algorithm_url));
        out.push_str(&format!("  data:       {}\n", self.data_uri));
        for artifact in &self.artifacts {
            out.push_str(&format!(
                "    {} ({} bytes, sha256 {})\n",
                artifact.remote,
                artifact.bytes,
                &artifact.sha256[..12.min(artifact.sha256.len())]
            ));
        }
        out.push_str(&format!(
            "  smoke test: {} @ hash, {} @ {}\n",
            self.hash_result, self.version_result, self.semantic_version
        ));
        out.push_str(&format!("  took:       {} ms\n", self.duration_ms()));
        out
    }
}
