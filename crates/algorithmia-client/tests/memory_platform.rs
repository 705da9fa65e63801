use algorithmia_client::fakes::{MemoryPlatform, PlatformCall, DEFAULT_BUILD_HASH};
use algorithmia_client::{
    parse_invocation, AlgoNamespace, AlgorithmRegistry, ApiError, DataStore, DataUri,
    NewAlgorithm, VersionType,
};
use serde_json::json;

fn ns() -> AlgoNamespace {
    AlgoNamespace::new("alice", "movie_sentiment")
}

// ---------------------------------------------------------------------------
// Data API
// ---------------------------------------------------------------------------

#[tokio::test]
async fn collection_then_file() {
    let platform = MemoryPlatform::new();
    let dir = DataUri::new("data://.my/mycollection");
    assert!(!platform.dir_exists(&dir).await.unwrap());

    platform.create_dir(&dir).await.unwrap();
    assert!(platform.dir_exists(&dir).await.unwrap());
    assert_eq!(platform.dirs(), vec![".my", ".my/mycollection"]);

    let local = tempfile::NamedTempFile::new().unwrap();
    std::fs::write(local.path(), b"{\"great\":1}").unwrap();
    let remote = dir.join("word_index.json");
    platform.put_file(&remote, local.path()).await.unwrap();

    assert_eq!(platform.file(&remote).unwrap(), b"{\"great\":1}");
    assert!(platform.calls().contains(&PlatformCall::PutFile {
        remote: "data://.my/mycollection/word_index.json".to_string(),
        bytes: 11,
    }));
}

#[tokio::test]
async fn upload_into_missing_collection_fails() {
    let platform = MemoryPlatform::new();
    let local = tempfile::NamedTempFile::new().unwrap();
    let err = platform
        .put_file(&DataUri::new(".my/nowhere/model.h5"), local.path())
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
}

// ---------------------------------------------------------------------------
// Algorithm API
// ---------------------------------------------------------------------------

#[tokio::test]
async fn publish_assigns_increasing_minor_versions() {
    let platform = MemoryPlatform::new();
    platform.create(&ns(), &NewAlgorithm::default()).await.unwrap();

    let info = platform.info(&ns()).await.unwrap();
    assert_eq!(info.version_info.git_hash.as_deref(), Some(DEFAULT_BUILD_HASH));
    assert!(info.version_info.semantic_version.is_none());

    platform.publish(&ns(), VersionType::Minor).await.unwrap();
    platform.publish(&ns(), VersionType::Minor).await.unwrap();
    let info = platform.info(&ns()).await.unwrap();
    assert_eq!(info.version_info.semantic_version.as_deref(), Some("0.2.0"));
}

#[tokio::test]
async fn configured_build_hash_is_reported_and_callable() {
    let hash = "a94a8fe5ccb19ba61c4c0873d391e987982fbbd3";
    let platform = MemoryPlatform::new().with_build_hash(hash);
    platform.create(&ns(), &NewAlgorithm::default()).await.unwrap();

    let info = platform.info(&ns()).await.unwrap();
    assert_eq!(info.version_info.git_hash.as_deref(), Some(hash));
    let invocation = platform
        .invoke(&ns(), hash, &json!({"text": "great movie"}))
        .await
        .unwrap();
    assert_eq!(invocation.field("prob"), Some(&json!(0.97)));
}

#[tokio::test]
async fn unknown_version_is_not_callable() {
    let platform = MemoryPlatform::new();
    platform.create(&ns(), &NewAlgorithm::default()).await.unwrap();

    let err = platform
        .invoke(&ns(), "1.0.0", &json!({"text": "great movie"}))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::NotFound(_)));
    assert!(!err.is_not_ready());
}

#[tokio::test]
async fn new_push_moves_the_callable_hash() {
    let platform = MemoryPlatform::new();
    platform.create(&ns(), &NewAlgorithm::default()).await.unwrap();
    platform.set_git_hash(&ns(), "a94a8fe5ccb19ba61c4c0873d391e987982fbbd3");

    let input = json!({"text": "great movie"});
    assert!(platform
        .invoke(&ns(), DEFAULT_BUILD_HASH, &input)
        .await
        .is_err());
    let invocation = platform
        .invoke(&ns(), "a94a8fe5ccb19ba61c4c0873d391e987982fbbd3", &input)
        .await
        .unwrap();
    assert_eq!(invocation.field("prob"), Some(&json!(0.97)));
}

// ---------------------------------------------------------------------------
// Invocation payloads
// ---------------------------------------------------------------------------

#[test]
fn compile_error_payload_is_not_ready() {
    let body = br#"{"error":{"message":"algorithm hash 3f78 not found","error_type":"AlgorithmError"}}"#;
    let err = parse_invocation(body).unwrap_err();
    assert!(err.is_not_ready());
}

#[test]
fn non_numeric_result_member_is_kept_as_is() {
    let body = br#"{"result":{"prob":[0.97],"label":"positive"}}"#;
    let invocation = parse_invocation(body).unwrap();
    assert_eq!(invocation.field("prob"), Some(&json!([0.97])));
    assert_eq!(invocation.field("label"), Some(&json!("positive")));
}

#[test]
fn result_payload_parses() {
    let body = br#"{"result":{"prob":0.8123},"metadata":{"content_type":"json","duration":0.4}}"#;
    let invocation = parse_invocation(body).unwrap();
    assert_eq!(invocation.field("prob"), Some(&json!(0.8123)));
    assert_eq!(invocation.field("missing"), None);
}
