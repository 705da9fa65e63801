//! In-memory fakes for the pipeline's seams (testing only)
//!
//! `RecordingVcs` satisfies [`VersionControl`] without touching git: a clone
//! creates an empty `src/` tree, commits get deterministic SHAs, and every
//! call is recorded in order. `RecordingStatus` keeps progress lines.

use std::fs;
use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::error::{DeployError, Result};
use crate::git::VersionControl;
use crate::pipeline::StatusSink;

/// One recorded version-control call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VcsCall {
    Clone { url: String, dest: String },
    Add(Vec<String>),
    Commit(String),
    Push(String),
}

#[derive(Debug, Default)]
struct VcsState {
    calls: Vec<VcsCall>,
    staged: Vec<String>,
    commits: Vec<String>,
    pushed: Vec<String>,
}

#[derive(Debug, Default)]
pub struct RecordingVcs {
    state: Mutex<VcsState>,
    fail_push: bool,
}

impl RecordingVcs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject every push.
    pub fn failing_push(mut self) -> Self {
        self.fail_push = true;
        self
    }

    pub fn calls(&self) -> Vec<VcsCall> {
        self.state.lock().unwrap().calls.clone()
    }

    /// Commits that reached the remote, oldest first.
    pub fn pushed_commits(&self) -> Vec<String> {
        self.state.lock().unwrap().pushed.clone()
    }

    /// Files included in the most recent commit.
    pub fn committed_files(&self) -> Vec<String> {
        self.state.lock().unwrap().staged.clone()
    }
}

#[async_trait]
impl VersionControl for RecordingVcs {
    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        self.state.lock().unwrap().calls.push(VcsCall::Clone {
            url: url.to_string(),
            dest: dest.to_string_lossy().to_string(),
        });
        if dest.exists() {
            return Err(DeployError::GitError(format!(
                "destination path {:?} already exists",
                dest
            )));
        }
        fs::create_dir_all(dest.join("src"))?;
        Ok(())
    }

    async fn add(&self, repo: &Path, files: &[String]) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(VcsCall::Add(files.to_vec()));
        for file in files {
            if !repo.join(file).is_file() {
                return Err(DeployError::GitError(format!(
                    "pathspec '{file}' did not match any files"
                )));
            }
        }
        state.staged = files.to_vec();
        Ok(())
    }

    async fn commit(&self, _repo: &Path, message: &str) -> Result<String> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(VcsCall::Commit(message.to_string()));
        let mut hasher = Sha256::new();
        hasher.update(state.commits.len().to_le_bytes());
        hasher.update(message.as_bytes());
        for file in &state.staged {
            hasher.update(file.as_bytes());
        }
        // Git SHAs are 40 hex chars.
        let sha = hex::encode(hasher.finalize())[..40].to_string();
        state.commits.push(sha.clone());
        Ok(sha)
    }

    async fn push(&self, _repo: &Path, remote: &str) -> Result<()> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(VcsCall::Push(remote.to_string()));
        if self.fail_push {
            return Err(DeployError::GitError(format!(
                "failed to push some refs to '{remote}'"
            )));
        }
        if let Some(head) = state.commits.last().cloned() {
            state.pushed.push(head);
        }
        Ok(())
    }
}

/// Collects progress lines instead of printing them.
#[derive(Debug, Default)]
pub struct RecordingStatus {
    lines: Mutex<Vec<String>>,
}

impl RecordingStatus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl StatusSink for RecordingStatus {
    fn status(&self, message: &str) {
        self.lines.lock().unwrap().push(message.to_string());
    }
}
