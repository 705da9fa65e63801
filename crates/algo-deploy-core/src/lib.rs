//! Algo-Deploy Core Library
//!
//! Takes a trained text-classification model from local files to a
//! published, callable algorithm on the hosting platform.
//!
//! ## Layer 1 - Pipeline
//!
//! The individual steps ([`ensure_collection`], [`upload_artifacts`],
//! [`provision_algorithm`], [`publish_source`], [`verify_revision`],
//! [`promote`]) are usable on their own; [`DeployPipeline`] runs them in
//! order against the platform and version-control seams.

pub mod artifacts;
pub mod config;
pub mod error;
pub mod fakes;
pub mod git;
pub mod obs;
pub mod pipeline;
pub mod provision;
pub mod publisher;
pub mod report;
pub mod retry;
pub mod stage;
pub mod storage;
pub mod telemetry;
pub mod verify;
pub mod workspace;

pub use artifacts::{
    digest_file, upload_artifacts, ModelArtifact, ModelFile, TrainedArtifacts, UploadedArtifact,
    WordIndex, MODEL_FILE_NAME, WORD_INDEX_FILE_NAME,
};
pub use config::{
    default_test_input, AlgorithmProfile, Credentials, DeploymentConfig, DEFAULT_DATA_PATH,
    DEFAULT_RESULT_FIELD, DEFAULT_WORK_DIR,
};
pub use error::{DeployError, Result};
pub use git::{capture_head_sha, GitCli, VersionControl};
pub use pipeline::{DeployPipeline, SilentStatus, StatusSink};
pub use provision::provision_algorithm;
pub use publisher::{publish_source, PublishedSource, SourceFiles, SourceLayout, COMMIT_MESSAGE};
pub use report::DeployReport;
pub use retry::{retry_when, RetryPolicy};
pub use stage::DeployStage;
pub use storage::ensure_collection;
pub use telemetry::init_tracing;
pub use verify::{invoke_until_ready, promote, verify_revision, Release, SmokeTest, VerifiedRevision};
pub use workspace::Workspace;

/// Crate version, reported by the binary.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
