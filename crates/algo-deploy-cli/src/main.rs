//! Algo-Deploy CLI
//!
//! The `algo-deploy` command ships a trained text classifier to the hosting
//! platform in one run:
//!
//! - uploads the model and word index to a data collection
//! - creates the algorithm and pushes its inference script
//! - calls the fresh build until it answers, then publishes it
//!
//! Every flag can also be set through the environment variable shown in
//! `--help`. Platform endpoints come from `ALGORITHMIA_API`,
//! `ALGORITHMIA_GIT` and `ALGORITHMIA_WEB`.

use std::path::PathBuf;
use std::time::Duration;

use algo_deploy_core::{
    init_tracing, AlgorithmProfile, Credentials, DeployPipeline, DeployReport, DeploymentConfig,
    GitCli, ModelFile, RetryPolicy, StatusSink, TrainedArtifacts, VersionControl, WordIndex,
    DEFAULT_DATA_PATH, DEFAULT_RESULT_FIELD, DEFAULT_WORK_DIR,
};
use algorithmia_client::{AlgorithmRegistry, AlgorithmiaClient, ClientConfig, DataStore};
use anyhow::{Context, Result};
use clap::Parser;
use serde_json::Value;
use tracing::{debug, Level};

#[derive(Parser, Debug)]
#[command(name = "algo-deploy")]
#[command(author = "Stevedores Org")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Deploy a trained text classifier as a hosted algorithm", long_about = None)]
struct Cli {
    /// Platform API key
    #[arg(short = 'k', long, env = "ALGORITHMIA_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Platform account name
    #[arg(short, long, env = "ALGORITHMIA_USERNAME")]
    username: String,

    /// Name of the algorithm to create
    #[arg(short, long, env = "ALGO_DEPLOY_ALGONAME")]
    algoname: String,

    /// Inference script, published as src/<algoname>.<ext>
    #[arg(short, long, env = "ALGO_DEPLOY_MODEL_SCRIPT")]
    model_script: PathBuf,

    /// Dependency manifest, published as requirements.txt
    #[arg(short = 'd', long, env = "ALGO_DEPLOY_MODEL_DEPENDENCY_FILE")]
    model_dependency_file: PathBuf,

    /// Remote data collection for the model and word index
    #[arg(short = 'p', long, env = "ALGO_DEPLOY_DATA_PATH", default_value = DEFAULT_DATA_PATH)]
    data_path: String,

    /// Serialized trained model
    #[arg(long, env = "ALGO_DEPLOY_MODEL_FILE")]
    model_file: PathBuf,

    /// Word index of the tokenizer (JSON object of token to id)
    #[arg(long, env = "ALGO_DEPLOY_WORD_INDEX")]
    word_index: PathBuf,

    /// Local staging directory, wiped on every run
    #[arg(long, env = "ALGO_DEPLOY_WORK_DIR", default_value = DEFAULT_WORK_DIR)]
    work_dir: PathBuf,

    /// Runtime environment of the algorithm
    #[arg(long, env = "ALGO_DEPLOY_PACKAGE_SET", default_value = "tensorflow-gpu-1.12")]
    package_set: String,

    /// License of the published algorithm
    #[arg(long, env = "ALGO_DEPLOY_LICENSE", default_value = "apl")]
    license: String,

    /// Summary shown on the algorithm page
    #[arg(long, env = "ALGO_DEPLOY_SUMMARY")]
    summary: Option<String>,

    /// Display label
    #[arg(long, env = "ALGO_DEPLOY_LABEL")]
    label: Option<String>,

    /// One-line tagline
    #[arg(long, env = "ALGO_DEPLOY_TAGLINE")]
    tagline: Option<String>,

    /// Example request shown on the algorithm page
    #[arg(long, env = "ALGO_DEPLOY_SAMPLE_INPUT")]
    sample_input: Option<String>,

    /// JSON payload for the smoke-test calls
    #[arg(long, env = "ALGO_DEPLOY_TEST_INPUT", value_parser = parse_json)]
    test_input: Option<Value>,

    /// Result member read from the smoke-test calls
    #[arg(long, env = "ALGO_DEPLOY_RESULT_FIELD", default_value = DEFAULT_RESULT_FIELD)]
    result_field: String,

    /// Calls made against a build before giving up on it
    #[arg(long, env = "ALGO_DEPLOY_MAX_ATTEMPTS", default_value = "10")]
    max_attempts: u32,

    /// Pause between two calls against a build that is not ready
    #[arg(long, env = "ALGO_DEPLOY_RETRY_DELAY_MS", default_value = "1000")]
    retry_delay_ms: u64,

    /// Emit JSON-formatted log lines and a JSON report
    #[arg(long)]
    json: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

fn parse_json(raw: &str) -> std::result::Result<Value, String> {
    serde_json::from_str(raw).map_err(|e| format!("invalid JSON: {e}"))
}

impl Cli {
    fn deployment_config(&self) -> DeploymentConfig {
        let mut profile = AlgorithmProfile::default();
        profile.settings.package_set = self.package_set.clone();
        profile.settings.license = self.license.clone();
        if let Some(summary) = &self.summary {
            profile.details.summary = summary.clone();
        }
        if let Some(label) = &self.label {
            profile.details.label = label.clone();
        }
        if let Some(tagline) = &self.tagline {
            profile.details.tagline = tagline.clone();
        }
        if let Some(sample) = &self.sample_input {
            profile.sample_input.sample_input = sample.clone();
        }

        let mut config = DeploymentConfig::new(
            Credentials::new(&self.api_key, &self.username),
            &self.algoname,
            &self.model_script,
            &self.model_dependency_file,
        )
        .with_data_path(&self.data_path)
        .with_work_dir(&self.work_dir)
        .with_profile(profile)
        .with_retry(RetryPolicy::new(
            self.max_attempts,
            Duration::from_millis(self.retry_delay_ms),
        ))
        .with_result_field(&self.result_field);
        if let Some(input) = &self.test_input {
            config = config.with_test_input(input.clone());
        }
        config
    }

    fn trained_artifacts(&self) -> Result<TrainedArtifacts> {
        let word_index = WordIndex::load(&self.word_index)
            .with_context(|| format!("Failed to load word index {:?}", self.word_index))?;
        debug!("Loaded word index with {} tokens", word_index.len());
        let model = ModelFile::load(&self.model_file)
            .with_context(|| format!("Failed to load model {:?}", self.model_file))?;
        debug!("Loaded model of {} bytes", model.len());
        Ok(TrainedArtifacts::new(model, word_index))
    }
}

/// Prints progress lines; to stderr when stdout carries the JSON report.
struct ConsoleStatus {
    stderr: bool,
}

impl StatusSink for ConsoleStatus {
    fn status(&self, message: &str) {
        if self.stderr {
            eprintln!("{message}");
        } else {
            println!("{message}");
        }
    }
}

async fn deploy(
    cli: &Cli,
    endpoints: &ClientConfig,
    store: &dyn DataStore,
    registry: &dyn AlgorithmRegistry,
    vcs: &dyn VersionControl,
    status: &dyn StatusSink,
) -> Result<DeployReport> {
    let config = cli.deployment_config();
    let artifacts = cli.trained_artifacts()?;

    DeployPipeline::new(&config, endpoints, store, registry, vcs)
        .with_status(status)
        .run(&artifacts)
        .await
        .with_context(|| format!("Deployment of {} failed", config.namespace()))
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    init_tracing(cli.json, level);

    let endpoints = ClientConfig::from_env().with_api_key(&cli.api_key);
    let client =
        AlgorithmiaClient::new(endpoints.clone()).context("Failed to build platform client")?;
    let vcs = GitCli::for_user(&cli.username);
    let status = ConsoleStatus { stderr: cli.json };

    let report = deploy(&cli, &endpoints, &client, &client, &vcs, &status).await?;

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.render_text());
    }
    Ok(())
}
