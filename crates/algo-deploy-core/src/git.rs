//! Git integration for publishing algorithm source.

use std::path::Path;
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use crate::error::{DeployError, Result};

/// Version-control operations the publisher needs.
#[async_trait]
pub trait VersionControl: Send + Sync {
    /// Clone `url` into `dest`, which must not exist yet.
    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<()>;

    /// Stage paths relative to the repository root.
    async fn add(&self, repo: &Path, files: &[String]) -> Result<()>;

    /// Commit staged changes and return the new HEAD SHA.
    async fn commit(&self, repo: &Path, message: &str) -> Result<String>;

    /// Push the current branch to `remote`.
    async fn push(&self, repo: &Path, remote: &str) -> Result<()>;
}

/// `VersionControl` backed by the `git` executable.
#[derive(Debug, Clone)]
pub struct GitCli {
    author_name: String,
    author_email: String,
}

impl GitCli {
    pub fn new(author_name: &str, author_email: &str) -> Self {
        Self {
            author_name: author_name.to_string(),
            author_email: author_email.to_string(),
        }
    }

    /// Identity derived from a platform username.
    pub fn for_user(username: &str) -> Self {
        Self::new(username, &format!("{username}@users.noreply.algorithmia.com"))
    }

    async fn run(&self, dir: Option<&Path>, args: &[&str], what: &str) -> Result<String> {
        let mut cmd = Command::new("git");
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            // Never block on a credential prompt.
            .env("GIT_TERMINAL_PROMPT", "0");
        if let Some(dir) = dir {
            cmd.current_dir(dir);
        }

        let output = cmd
            .output()
            .await
            .map_err(|e| DeployError::GitError(format!("failed to run git: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(DeployError::GitError(format!(
                "git {what} failed: {}",
                stderr.trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

#[async_trait]
impl VersionControl for GitCli {
    async fn clone_repo(&self, url: &str, dest: &Path) -> Result<()> {
        debug!("Cloning into {:?}", dest);
        let dest = dest.to_string_lossy().into_owned();
        // The URL carries credentials; keep it out of error messages.
        self.run(None, &["clone", "--quiet", url, dest.as_str()], "clone")
            .await
            .map(|_| ())
    }

    async fn add(&self, repo: &Path, files: &[String]) -> Result<()> {
        let mut args = vec!["add", "--"];
        args.extend(files.iter().map(String::as_str));
        self.run(Some(repo), &args, "add").await.map(|_| ())
    }

    async fn commit(&self, repo: &Path, message: &str) -> Result<String> {
        let name = format!("user.name={}", self.author_name);
        let email = format!("user.email={}", self.author_email);
        self.run(
            Some(repo),
            &[
                "-c",
                name.as_str(),
                "-c",
                email.as_str(),
                "commit",
                "--quiet",
                "-m",
                message,
            ],
            "commit",
        )
        .await?;
        capture_head_sha(repo).await
    }

    async fn push(&self, repo: &Path, remote: &str) -> Result<()> {
        self.run(Some(repo), &["push", "--quiet", remote, "HEAD"], "push")
            .await
            .map(|_| ())
    }
}

/// Capture the HEAD commit SHA of a repository.
pub async fn capture_head_sha(repo_dir: &Path) -> Result<String> {
    let sha = GitCli::for_user("algo-deploy")
        .run(Some(repo_dir), &["rev-parse", "HEAD"], "rev-parse HEAD")
        .await?;
    if sha.is_empty() {
        return Err(DeployError::GitError(
            "git rev-parse HEAD returned empty output".to_string(),
        ));
    }
    Ok(sha)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::process::Command as StdCommand;

    fn run_git(dir: &Path, args: &[&str]) -> String {
        let output = StdCommand::new("git")
            .args(args)
            .current_dir(dir)
            .output()
            .unwrap();
        assert!(
            output.status.success(),
            "git {:?} failed: {}",
            args,
            String::from_utf8_lossy(&output.stderr)
        );
        String::from_utf8_lossy(&output.stdout).trim().to_string()
    }

    /// Bare "remote" seeded with one commit holding an empty `src/` marker.
    fn make_remote(root: &Path) -> std::path::PathBuf {
        let seed = root.join("seed");
        std::fs::create_dir_all(seed.join("src")).unwrap();
        std::fs::write(seed.join("src/.gitkeep"), b"").unwrap();
        run_git(&seed, &["init", "--quiet"]);
        run_git(&seed, &["add", "."]);
        run_git(
            &seed,
            &[
                "-c",
                "user.name=seed",
                "-c",
                "user.email=seed@example.com",
                "commit",
                "--quiet",
                "-m",
                "initial",
            ],
        );
        let bare = root.join("remote.git");
        run_git(
            root,
            &["clone", "--quiet", "--bare", "seed", "remote.git"],
        );
        bare
    }

    #[tokio::test]
    async fn clone_commit_push_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let remote = make_remote(dir.path());
        let clone = dir.path().join("work");
        let git = GitCli::for_user("alice");

        git.clone_repo(remote.to_str().unwrap(), &clone).await.unwrap();
        std::fs::write(clone.join("requirements.txt"), b"tensorflow\n").unwrap();
        git.add(&clone, &["requirements.txt".to_string()]).await.unwrap();
        let sha = git.commit(&clone, "Add algorithm files").await.unwrap();
        assert_eq!(sha.len(), 40, "SHA should be 40 hex chars, got: {sha}");
        git.push(&clone, "origin").await.unwrap();

        let remote_head = run_git(&remote, &["rev-parse", "HEAD"]);
        assert_eq!(remote_head, sha);
        let author = run_git(&remote, &["log", "-1", "--format=%an"]);
        assert_eq!(author, "alice");
    }

    #[tokio::test]
    async fn clone_failure_is_a_git_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = GitCli::for_user("alice")
            .clone_repo(
                dir.path().join("missing.git").to_str().unwrap(),
                &dir.path().join("work"),
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DeployError::GitError(_)));
    }

    #[tokio::test]
    async fn capture_head_sha_fails_outside_repo() {
        let dir = tempfile::tempdir().unwrap();
        assert!(capture_head_sha(dir.path()).await.is_err());
    }
}
