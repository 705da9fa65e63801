//! Pipeline stages. Each run moves forward one stage at a time and never back.

use serde::{Deserialize, Serialize};

use crate::error::{DeployError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DeployStage {
    Unprovisioned,
    StorageReady,
    ArtifactsUploaded,
    ResourceCreated,
    SourcePushed,
    RevisionVerified,
    Published,
}

impl DeployStage {
    pub const ALL: [DeployStage; 7] = [
        DeployStage::Unprovisioned,
        DeployStage::StorageReady,
        DeployStage::ArtifactsUploaded,
        DeployStage::ResourceCreated,
        DeployStage::SourcePushed,
        DeployStage::RevisionVerified,
        DeployStage::Published,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DeployStage::Unprovisioned => "UNPROVISIONED",
            DeployStage::StorageReady => "STORAGE_READY",
            DeployStage::ArtifactsUploaded => "ARTIFACTS_UPLOADED",
            DeployStage::ResourceCreated => "RESOURCE_CREATED",
            DeployStage::SourcePushed => "SOURCE_PUSHED",
            DeployStage::RevisionVerified => "REVISION_VERIFIED",
            DeployStage::Published => "PUBLISHED",
        }
    }

    /// The only stage reachable from this one.
    pub fn next(self) -> Option<DeployStage> {
        let idx = Self::ALL.iter().position(|s| *s == self)?;
        Self::ALL.get(idx + 1).copied()
    }

    /// Move to `to`, which must be the immediate successor.
    pub fn advance(&mut self, to: DeployStage) -> Result<()> {
        if self.next() != Some(to) {
            return Err(DeployError::InvalidTransition { from: *self, to });
        }
        *self = to;
        Ok(())
    }

    pub fn is_terminal(&self) -> bool {
        *self == DeployStage::Published
    }
}

impl std::fmt::Display for DeployStage {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
