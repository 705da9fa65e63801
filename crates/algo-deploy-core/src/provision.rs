//! Algorithm resource creation.

use algorithmia_client::{AlgoNamespace, AlgorithmRegistry};
use tracing::info;

use crate::config::AlgorithmProfile;
use crate::error::Result;

/// Create `ns` with the profile's metadata, settings and sample input.
///
/// Not idempotent: an existing name surfaces as `ApiError::AlreadyExists`.
pub async fn provision_algorithm(
    registry: &dyn AlgorithmRegistry,
    ns: &AlgoNamespace,
    profile: &AlgorithmProfile,
) -> Result<()> {
    registry.create(ns, &profile.to_new_algorithm()).await?;
    info!(
        package_set = %profile.settings.package_set,
        license = %profile.settings.license,
        "Created algorithm {}",
        ns
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::DeployError;
    use algorithmia_client::fakes::MemoryPlatform;
    use algorithmia_client::ApiError;

    #[tokio::test]
    async fn creates_with_profile() {
        let platform = MemoryPlatform::new();
        let ns = AlgoNamespace::new("alice", "movie_sentiment");
        let mut profile = AlgorithmProfile::default();
        profile.details.label = "Sentiment".to_string();

        provision_algorithm(&platform, &ns, &profile).await.unwrap();

        let created = platform.algorithm(&ns).unwrap();
        assert_eq!(created.details.label, "Sentiment");
        assert_eq!(created.settings.source_visibility, "closed");
    }

    #[tokio::test]
    async fn taken_name_fails() {
        let platform = MemoryPlatform::new();
        let ns = AlgoNamespace::new("alice", "movie_sentiment");
        let profile = AlgorithmProfile::default();
        provision_algorithm(&platform, &ns, &profile).await.unwrap();

        let err = provision_algorithm(&platform, &ns, &profile)
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            DeployError::Platform(ApiError::AlreadyExists(_))
        ));
    }
}
