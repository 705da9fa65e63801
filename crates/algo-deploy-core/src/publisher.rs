//! Source repository publisher.
//!
//! Clones the algorithm's backing repository into the workspace, drops the
//! inference script and dependency manifest into their fixed locations,
//! commits exactly those two files and pushes. The push is what makes the
//! platform start a build.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{DeployError, Result};
use crate::git::VersionControl;

pub const COMMIT_MESSAGE: &str = "Add algorithm files";
pub const DEPENDENCY_MANIFEST: &str = "requirements.txt";
pub const ORIGIN: &str = "origin";

/// Repository-relative destinations of the two published files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceLayout {
    pub script: String,
    pub manifest: String,
}

impl SourceLayout {
    /// `src/<algoname>.<ext>` and `requirements.txt`.
    pub fn new(algoname: &str, extension: &str) -> Self {
        Self {
            script: format!("src/{algoname}.{extension}"),
            manifest: DEPENDENCY_MANIFEST.to_string(),
        }
    }

    pub fn files(&self) -> Vec<String> {
        vec![self.script.clone(), self.manifest.clone()]
    }
}

/// Local files to publish.
#[derive(Debug, Clone)]
pub struct SourceFiles<'a> {
    pub script: &'a Path,
    pub manifest: &'a Path,
}

/// What the push produced.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishedSource {
    pub clone_dir: PathBuf,
    pub files: Vec<String>,
    pub commit: String,
}

/// Clone `clone_url` into `clone_dir`, install `sources` per `layout`,
/// commit and push to origin.
pub async fn publish_source(
    vcs: &dyn VersionControl,
    clone_url: &str,
    clone_dir: &Path,
    layout: &SourceLayout,
    sources: &SourceFiles<'_>,
) -> Result<PublishedSource> {
    vcs.clone_repo(clone_url, clone_dir).await?;

    install(sources.script, &clone_dir.join(&layout.script))?;
    install(sources.manifest, &clone_dir.join(&layout.manifest))?;

    let files = layout.files();
    vcs.add(clone_dir, &files).await?;
    let commit = vcs.commit(clone_dir, COMMIT_MESSAGE).await?;

    debug!("Pushing {} to {}", commit, ORIGIN);
    vcs.push(clone_dir, ORIGIN).await?;

    Ok(PublishedSource {
        clone_dir: clone_dir.to_path_buf(),
        files,
        commit,
    })
}

fn install(from: &Path, to: &Path) -> Result<()> {
    if let Some(parent) = to.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::copy(from, to)
        .map_err(|e| DeployError::Config(format!("cannot copy {:?}: {}", from, e)))?;
    Ok(())
}
