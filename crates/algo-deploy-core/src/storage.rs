//! Remote collection preparation.

use algorithmia_client::{DataStore, DataUri};
use tracing::info;

use crate::error::Result;

/// Make sure `uri` exists in remote storage.
///
/// Returns `true` when the directory had to be created. Repeated calls after
/// the first are read-only.
pub async fn ensure_collection(store: &dyn DataStore, uri: &DataUri) -> Result<bool> {
    if store.dir_exists(uri).await? {
        info!("Data collection {} already exists", uri);
        return Ok(false);
    }
    store.create_dir(uri).await?;
    info!("Created data collection {}", uri);
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use algorithmia_client::fakes::{MemoryPlatform, PlatformCall};

    #[tokio::test]
    async fn creates_once_then_noop() {
        let platform = MemoryPlatform::new();
        let uri = DataUri::new(".my/mycollection");

        assert!(ensure_collection(&platform, &uri).await.unwrap());
        assert!(!ensure_collection(&platform, &uri).await.unwrap());

        let creates = platform
            .calls()
            .into_iter()
            .filter(|c| matches!(c, PlatformCall::CreateDir(_)))
            .count();
        assert_eq!(creates, 1);
    }

    #[tokio::test]
    async fn existing_collection_is_left_alone() {
        let platform = MemoryPlatform::new().with_dir(".my/mycollection");
        let uri = DataUri::new("data://.my/mycollection");
        assert!(!ensure_collection(&platform, &uri).await.unwrap());
        assert_eq!(
            platform.calls(),
            vec![PlatformCall::DirExists("data://.my/mycollection".to_string())]
        );
    }

    #[tokio::test]
    async fn missing_parent_is_fatal() {
        let platform = MemoryPlatform::new();
        let uri = DataUri::new("nope/mycollection");
        assert!(ensure_collection(&platform, &uri).await.is_err());
    }
}
