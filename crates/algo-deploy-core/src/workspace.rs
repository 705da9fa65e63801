//! Local staging directory.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Result;

/// A scratch directory that is emptied at the start of every run.
///
/// Holds the serialized artifacts and the clone of the algorithm's source
/// repository. Nothing in it survives into the next run.
#[derive(Debug, Clone)]
pub struct Workspace {
    root: PathBuf,
}

impl Workspace {
    /// Delete `root` if it exists, then recreate it empty.
    pub fn reset(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if root.exists() {
            debug!("Removing previous workspace {:?}", root);
            fs::remove_dir_all(&root)?;
        }
        fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path of a file staged directly in the workspace.
    pub fn file(&self, name: &str) -> PathBuf {
        self.root.join(name)
    }

    /// Where the algorithm's source repository gets cloned.
    pub fn clone_dir(&self, algoname: &str) -> PathBuf {
        self.root.join(algoname)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reset_creates_missing_directory() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("algo");
        let ws = Workspace::reset(&root).unwrap();
        assert!(ws.root().is_dir());
        assert_eq!(fs::read_dir(ws.root()).unwrap().count(), 0);
    }

    #[test]
    fn reset_clears_previous_contents() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("algo");
        fs::create_dir_all(root.join("old_clone/src")).unwrap();
        fs::write(root.join("stale.h5"), b"stale").unwrap();

        let ws = Workspace::reset(&root).unwrap();
        assert_eq!(fs::read_dir(ws.root()).unwrap().count(), 0);
    }

    #[test]
    fn paths_live_under_root() {
        let ws = Workspace {
            root: PathBuf::from("algo"),
        };
        assert_eq!(ws.file("word_index.json"), PathBuf::from("algo/word_index.json"));
        assert_eq!(ws.clone_dir("movie_sentiment"), PathBuf::from("algo/movie_sentiment"));
    }
}
