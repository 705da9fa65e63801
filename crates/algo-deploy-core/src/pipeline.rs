//! End-to-end deployment run.
//!
//! [`DeployPipeline::run`] drives one algorithm from trained artifacts to a
//! published release:
//!
//! 1. make sure the remote data collection exists
//! 2. wipe the local workspace and upload the model and word index
//! 3. create the algorithm
//! 4. push the inference script and dependency manifest to its repository
//! 5. smoke-test the build at its git hash, retrying while it compiles
//! 6. publish a minor version and smoke-test it at that version
//!
//! Any failure aborts the run. Nothing already done is rolled back.

use std::time::Instant;

use algorithmia_client::{AlgoNamespace, AlgorithmRegistry, ClientConfig, DataStore};
use chrono::Utc;
use tracing::Instrument;
use uuid::Uuid;

use crate::artifacts::{upload_artifacts, TrainedArtifacts};
use crate::config::DeploymentConfig;
use crate::error::Result;
use crate::git::VersionControl;
use crate::obs::{deploy_span, emit_deploy_failed, emit_deploy_finished, emit_stage_entered};
use crate::provision::provision_algorithm;
use crate::publisher::{publish_source, SourceFiles, SourceLayout};
use crate::report::DeployReport;
use crate::stage::DeployStage;
use crate::storage::ensure_collection;
use crate::verify::{promote, verify_revision, SmokeTest};
use crate::workspace::Workspace;

/// Receives the human-facing progress lines of a run.
pub trait StatusSink: Send + Sync {
    fn status(&self, message: &str);
}

/// Drops every progress line.
#[derive(Debug, Default, Clone, Copy)]
pub struct SilentStatus;

impl StatusSink for SilentStatus {
    fn status(&self, _message: &str) {}
}

/// One configured deployment and the capabilities it runs against.
pub struct DeployPipeline<'a> {
    config: &'a DeploymentConfig,
    endpoints: &'a ClientConfig,
    store: &'a dyn DataStore,
    registry: &'a dyn AlgorithmRegistry,
    vcs: &'a dyn VersionControl,
    status: &'a dyn StatusSink,
}

impl<'a> DeployPipeline<'a> {
    pub fn new(
        config: &'a DeploymentConfig,
        endpoints: &'a ClientConfig,
        store: &'a dyn DataStore,
        registry: &'a dyn AlgorithmRegistry,
        vcs: &'a dyn VersionControl,
    ) -> Self {
        Self {
            config,
            endpoints,
            store,
            registry,
            vcs,
            status: &SilentStatus,
        }
    }

    /// Route progress lines to `status`.
    pub fn with_status(mut self, status: &'a dyn StatusSink) -> Self {
        self.status = status;
        self
    }

    /// Run every step in order and report what was deployed.
    pub async fn run(&self, artifacts: &TrainedArtifacts) -> Result<DeployReport> {
        let run_id = Uuid::new_v4();
        let ns = self.config.namespace();
        let span = deploy_span(&run_id.to_string(), &ns.to_string());
        let started = Instant::now();

        let mut stage = DeployStage::Unprovisioned;
        let outcome = self
            .execute(run_id, &ns, artifacts, &mut stage)
            .instrument(span.clone())
            .await;

        span.in_scope(|| match &outcome {
            Ok(report) => emit_deploy_finished(
                &report.algorithm,
                &report.semantic_version,
                started.elapsed().as_millis() as u64,
            ),
            Err(e) => emit_deploy_failed(stage, e),
        });
        outcome
    }

    async fn execute(
        &self,
        run_id: Uuid,
        ns: &AlgoNamespace,
        artifacts: &TrainedArtifacts,
        stage: &mut DeployStage,
    ) -> Result<DeployReport> {
        let started_at = Utc::now();
        let config = self.config;

        let data_uri = config.data_uri();
        let collection_created = ensure_collection(self.store, &data_uri).await?;
        enter(stage, DeployStage::StorageReady)?;

        let workspace = Workspace::reset(&config.work_dir)?;
        let uploaded = upload_artifacts(self.store, &workspace, &data_uri, artifacts).await?;
        enter(stage, DeployStage::ArtifactsUploaded)?;

        self.status.status(&format!("Algorithm namespace: {}", ns));
        provision_algorithm(self.registry, ns, &config.profile).await?;
        let algorithm_url = self.endpoints.web_algorithm_url(ns);
        self.status.status(&format!("Algorithm URL: {}", algorithm_url));
        enter(stage, DeployStage::ResourceCreated)?;

        let clone_url = self.endpoints.clone_url(ns, &config.credentials.api_key)?;
        self.status.status(
            "Pushing source code upstream, uploading model file & compiling algorithm...",
        );
        let published = publish_source(
            self.vcs,
            clone_url.as_str(),
            &workspace.clone_dir(&config.algoname),
            &SourceLayout::new(&config.algoname, &config.script_extension()),
            &SourceFiles {
                script: &config.model_script,
                manifest: &config.dependency_file,
            },
        )
        .await?;
        let source_url = self.endpoints.web_source_url(ns);
        self.status.status(&format!(
            "Algorithm Source Code is available at: {}",
            source_url
        ));
        enter(stage, DeployStage::SourcePushed)?;

        let smoke_test = SmokeTest {
            input: &config.test_input,
            result_field: &config.result_field,
            retry: &config.retry,
        };

        self.status
            .status("Testing new compiled algorithm via API endpoint...");
        let verified = verify_revision(self.registry, ns, &smoke_test).await?;
        self.status.status("Test complete!");
        let git_hash = verified.git_hash().to_string();
        let hash_result = verified.result().clone();
        enter(stage, DeployStage::RevisionVerified)?;

        self.status.status("Publishing and deploying algorithm...");
        let release = promote(self.registry, verified, &smoke_test).await?;
        self.status.status("Algorithm has been deployed!");
        enter(stage, DeployStage::Published)?;

        Ok(DeployReport {
            run_id,
            algorithm: ns.to_string(),
            data_uri: data_uri.to_string(),
            collection_created,
            artifacts: uploaded,
            algorithm_url,
            source_url,
            commit: published.commit,
            committed_files: published.files,
            git_hash,
            hash_result,
            semantic_version: release.semantic_version,
            version_result: release.result,
            stage: *stage,
            started_at,
            finished_at: Utc::now(),
        })
    }
}

fn enter(stage: &mut DeployStage, to: DeployStage) -> Result<()> {
    stage.advance(to)?;
    emit_stage_entered(to);
    Ok(())
}
