//! Trained-model artifacts: local serialization and upload.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use algorithmia_client::{DataStore, DataUri};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use tempfile::NamedTempFile;

use crate::error::{DeployError, Result};
use crate::obs::emit_artifact_uploaded;
use crate::workspace::Workspace;

/// File name of the serialized model, locally and remotely.
pub const MODEL_FILE_NAME: &str = "text_classification_model.h5";

/// File name of the serialized word index, locally and remotely.
pub const WORD_INDEX_FILE_NAME: &str = "word_index.json";

/// A trained model that can write itself to disk.
pub trait ModelArtifact: Send + Sync {
    /// Name used for the local and remote file.
    fn file_name(&self) -> &str;

    /// Serialize the model to `path`.
    fn save(&self, path: &Path) -> Result<()>;
}

/// A model already serialized by the training job, held in memory.
///
/// The bytes are read when the value is built, so later changes to the
/// source file (including a workspace reset) do not affect what is saved.
#[derive(Debug, Clone)]
pub struct ModelFile {
    bytes: Vec<u8>,
    file_name: String,
}

impl ModelFile {
    /// Read the serialized model at `source`.
    pub fn load(source: &Path) -> Result<Self> {
        let bytes = fs::read(source).map_err(|e| {
            DeployError::Config(format!("cannot read model {:?}: {}", source, e))
        })?;
        Ok(Self::from_bytes(bytes))
    }

    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self {
            bytes,
            file_name: MODEL_FILE_NAME.to_string(),
        }
    }

    pub fn with_file_name(mut self, file_name: &str) -> Self {
        self.file_name = file_name.to_string();
        self
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }
}

impl ModelArtifact for ModelFile {
    fn file_name(&self) -> &str {
        &self.file_name
    }

    fn save(&self, path: &Path) -> Result<()> {
        write_atomic(path, &self.bytes)
    }
}

/// Token → integer id map the classifier uses to encode input text.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WordIndex(BTreeMap<String, u32>);

impl WordIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a JSON object of `token: id` pairs.
    pub fn load(path: &Path) -> Result<Self> {
        let bytes = fs::read(path).map_err(|e| {
            DeployError::Config(format!("cannot read word index {:?}: {}", path, e))
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    pub fn insert(&mut self, token: impl Into<String>, id: u32) {
        self.0.insert(token.into(), id);
    }

    pub fn get(&self, token: &str) -> Option<u32> {
        self.0.get(token).copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Serialize to `path` as JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let bytes = serde_json::to_vec(&self.0)?;
        write_atomic(path, &bytes)
    }
}

impl FromIterator<(String, u32)> for WordIndex {
    fn from_iter<I: IntoIterator<Item = (String, u32)>>(iter: I) -> Self {
        WordIndex(iter.into_iter().collect())
    }
}

/// The in-memory outputs of training, passed explicitly into the pipeline.
pub struct TrainedArtifacts {
    pub model: Box<dyn ModelArtifact>,
    pub word_index: WordIndex,
}

impl TrainedArtifacts {
    pub fn new(model: impl ModelArtifact + 'static, word_index: WordIndex) -> Self {
        Self {
            model: Box::new(model),
            word_index,
        }
    }
}

/// One file that made it to remote storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedArtifact {
    pub local: PathBuf,
    pub remote: DataUri,
    pub bytes: u64,
    pub sha256: String,
}

/// Serialize the model and word index into the workspace, then upload both
/// below `collection`.
///
/// The model goes first. A failure on the second upload leaves the first in
/// place remotely.
pub async fn upload_artifacts(
    store: &dyn DataStore,
    workspace: &Workspace,
    collection: &DataUri,
    artifacts: &TrainedArtifacts,
) -> Result<Vec<UploadedArtifact>> {
    let model_local = workspace.file(artifacts.model.file_name());
    artifacts.model.save(&model_local)?;
    let model = upload_one(store, &model_local, collection.join(artifacts.model.file_name())).await?;

    let index_local = workspace.file(WORD_INDEX_FILE_NAME);
    artifacts.word_index.save(&index_local)?;
    let index = upload_one(store, &index_local, collection.join(WORD_INDEX_FILE_NAME)).await?;

    Ok(vec![model, index])
}

async fn upload_one(store: &dyn DataStore, local: &Path, remote: DataUri) -> Result<UploadedArtifact> {
    let (bytes, sha256) = digest_file(local)?;
    store.put_file(&remote, local).await?;
    emit_artifact_uploaded(&remote.to_string(), bytes, &sha256);
    Ok(UploadedArtifact {
        local: local.to_path_buf(),
        remote,
        bytes,
        sha256,
    })
}

/// Size and SHA-256 hex digest of a local file.
pub fn digest_file(path: &Path) -> Result<(u64, String)> {
    let content = fs::read(path)?;
    let mut hasher = Sha256::new();
    hasher.update(&content);
    Ok((content.len() as u64, hex::encode(hasher.finalize())))
}

// Write to a temp file in the same directory, then rename over `path`.
fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}
