//! Source adapter tests through the backend registry

mod common;

use filelinker::config::BackendsConfig;
use filelinker::errors::FilelinkerError;
use filelinker::sources::BackendRegistry;
use filelinker::storage::{LinkKind, LinkRecord, SourceConfig, SourceType};

use common::{ALIST_API, MockHttp, alist_listing, test_config};

const GITHUB_API: &str = "https://api.github.com";

fn registry(http: std::sync::Arc<MockHttp>) -> BackendRegistry {
    BackendRegistry::new(&test_config().backends, http)
}

fn repo(git_ref: Option<&str>) -> SourceConfig {
    SourceConfig {
        owner: Some("acme".into()),
        repo: Some("tools".into()),
        git_ref: git_ref.map(String::from),
        ..Default::default()
    }
}

fn releases(tag: Option<&str>, count: Option<u32>, flatten: bool) -> SourceConfig {
    SourceConfig {
        owner: Some("acme".into()),
        repo: Some("tools".into()),
        tag: tag.map(String::from),
        count,
        flatten_release_folder: flatten,
        ..Default::default()
    }
}

// =============================================================================
// Registry
// =============================================================================

#[test]
fn test_registry_without_alist_url() {
    let backends = BackendsConfig::default();
    let registry = BackendRegistry::new(&backends, MockHttp::new());

    assert!(!registry.supports(SourceType::AList));
    assert!(registry.supports(SourceType::RepoContents));
    assert!(registry.supports(SourceType::ReleaseAssets));
    assert!(registry.supports(SourceType::None));

    let err = registry.resolve(SourceType::AList).err().unwrap();
    assert!(matches!(err, FilelinkerError::UnsupportedSourceType(_)));
    let err = registry.resolve_tag("dropbox").err().unwrap();
    assert!(matches!(err, FilelinkerError::UnsupportedSourceType(_)));
}

// =============================================================================
// AList
// =============================================================================

#[tokio::test]
async fn test_alist_listing_keeps_upstream_order() {
    let http = MockHttp::new();
    http.respond(
        &format!("{}/api/fs/list", ALIST_API),
        200,
        &alist_listing(&[("zz.txt", false, 9), ("aa", true, 0), ("Mm.bin", false, 1)]),
    );
    let adapter = registry(http.clone()).resolve(SourceType::AList).unwrap();

    let items = adapter
        .list_files("/docs/guide", &SourceConfig::default())
        .await
        .unwrap();
    let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["zz.txt", "aa", "Mm.bin"]);
    assert!(items[1].is_directory);
    assert_eq!(items[0].download_locator, format!("{}/d/docs/guide/zz.txt", ALIST_API));
    assert!(items[0].modified_at.is_some());

    let seen = http.seen.lock().clone();
    let auth = seen[0]
        .headers
        .iter()
        .find(|(k, _)| k == "Authorization")
        .map(|(_, v)| v.as_str());
    assert_eq!(auth, Some("alist-token"));
}

#[tokio::test]
async fn test_alist_envelope_errors() {
    let http = MockHttp::new();
    let url = format!("{}/api/fs/list", ALIST_API);
    let adapter = registry(http.clone()).resolve(SourceType::AList).unwrap();

    http.respond(&url, 200, r#"{"code":500,"message":"object not found"}"#);
    let err = adapter.list_files("/missing", &SourceConfig::default()).await.unwrap_err();
    assert!(matches!(err, FilelinkerError::NotFound(_)));

    http.respond(&url, 200, r#"{"code":401,"message":"token is invalidated"}"#);
    let err = adapter.list_files("/docs", &SourceConfig::default()).await.unwrap_err();
    assert!(matches!(err, FilelinkerError::BackendUnavailable(_)));
    assert_eq!(err.status_code(), 500);

    http.respond(&url, 502, "bad gateway");
    let err = adapter.list_files("/docs", &SourceConfig::default()).await.unwrap_err();
    assert!(matches!(err, FilelinkerError::BackendUnavailable(_)));
}

// =============================================================================
// Repository contents
// =============================================================================

#[tokio::test]
async fn test_repo_contents_sorts_directories_first() {
    let http = MockHttp::new();
    http.respond(
        &format!("{}/repos/acme/tools/contents/src?ref=main", GITHUB_API),
        200,
        r#"[
            {"name":"b.txt","type":"file","size":2,"download_url":"https://raw.example/b.txt"},
            {"name":"zeta","type":"dir"},
            {"name":"A.txt","type":"file","size":1,"download_url":"https://raw.example/A.txt"},
            {"name":"Alpha","type":"dir"}
        ]"#,
    );
    let adapter = registry(http).resolve(SourceType::RepoContents).unwrap();

    let items = adapter.list_files("/src", &repo(Some("main"))).await.unwrap();
    let names: Vec<&str> = items.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["Alpha", "zeta", "A.txt", "b.txt"]);
    assert!(items.iter().all(|i| i.source_tag == "repo_contents"));
}

#[tokio::test]
async fn test_repo_contents_download_with_and_without_ref() {
    let http = MockHttp::new();
    let adapter = registry(http.clone()).resolve(SourceType::RepoContents).unwrap();

    let mut record = LinkRecord::new("/src", LinkKind::Folder, SourceType::RepoContents);
    record.source_config = repo(Some("v1.0"));
    let url = adapter.resolve_download("lib/main.rs", &record).await.unwrap();
    assert_eq!(
        url,
        "https://raw.githubusercontent.com/acme/tools/v1.0/src/lib/main.rs"
    );
    assert_eq!(http.count("GET"), 0);

    record.source_config = repo(None);
    http.respond(
        &format!("{}/repos/acme/tools/contents/src/lib/main.rs", GITHUB_API),
        200,
        r#"{"name":"main.rs","type":"file","size":7,"download_url":"https://raw.example/main.rs"}"#,
    );
    let url = adapter.resolve_download("lib/main.rs", &record).await.unwrap();
    assert_eq!(url, "https://raw.example/main.rs");

    let err = adapter.resolve_download("lib/gone.rs", &record).await.unwrap_err();
    assert!(matches!(err, FilelinkerError::NotFound(_)));
}

// =============================================================================
// Release assets
// =============================================================================

#[tokio::test]
async fn test_pinned_release_flattens_to_assets() {
    let http = MockHttp::new();
    http.respond(
        &format!("{}/repos/acme/tools/releases/tags/v2.0", GITHUB_API),
        200,
        r#"{"tag_name":"v2.0","assets":[
            {"name":"tool-linux.tar.gz","size":100,"browser_download_url":"https://github.com/acme/tools/releases/download/v2.0/tool-linux.tar.gz"},
            {"name":"tool.exe","size":50}
        ]}"#,
    );
    let adapter = registry(http).resolve(SourceType::ReleaseAssets).unwrap();

    let items = adapter
        .list_files("/", &releases(Some("v2.0"), None, true))
        .await
        .unwrap();
    assert_eq!(items.len(), 2);
    assert!(items.iter().all(|i| !i.is_directory));
    assert_eq!(
        items[1].download_locator,
        "https://github.com/acme/tools/releases/download/v2.0/tool.exe"
    );
}

#[tokio::test]
async fn test_flatten_ignored_for_several_releases() {
    let http = MockHttp::new();
    http.respond(
        &format!("{}/repos/acme/tools/releases?per_page=3", GITHUB_API),
        200,
        r#"[
            {"tag_name":"v3","published_at":"2024-03-01T00:00:00Z","assets":[]},
            {"tag_name":"v2","assets":[{"name":"x.zip","size":1}]},
            {"tag_name":"v1","assets":[]}
        ]"#,
    );
    let adapter = registry(http).resolve(SourceType::ReleaseAssets).unwrap();
    let config = releases(None, Some(3), true);

    let root = adapter.list_files("/", &config).await.unwrap();
    let names: Vec<&str> = root.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["v3", "v2", "v1"]);
    assert!(root.iter().all(|i| i.is_directory));

    let assets = adapter.list_files("/v2", &config).await.unwrap();
    assert_eq!(assets.len(), 1);
    assert_eq!(assets[0].name, "x.zip");

    let err = adapter.list_files("/v9", &config).await.unwrap_err();
    assert!(matches!(err, FilelinkerError::NotFound(_)));
    let err = adapter.list_files("/v2/deeper", &config).await.unwrap_err();
    assert!(matches!(err, FilelinkerError::NotFound(_)));
}

#[tokio::test]
async fn test_release_download_urls() {
    let adapter = registry(MockHttp::new())
        .resolve(SourceType::ReleaseAssets)
        .unwrap();

    let mut record = LinkRecord::new("/", LinkKind::Folder, SourceType::ReleaseAssets);
    record.source_config = releases(None, None, false);
    assert_eq!(
        adapter.resolve_download("v1/app.zip", &record).await.unwrap(),
        "https://github.com/acme/tools/releases/download/v1/app.zip"
    );
    assert_eq!(
        adapter.resolve_download("app.zip", &record).await.unwrap(),
        "https://github.com/acme/tools/releases/latest/download/app.zip"
    );

    record.source_config = releases(Some("v7"), None, true);
    assert_eq!(
        adapter.resolve_download("app.zip", &record).await.unwrap(),
        "https://github.com/acme/tools/releases/download/v7/app.zip"
    );

    let err = adapter.resolve_download("a/b/c", &record).await.unwrap_err();
    assert!(matches!(err, FilelinkerError::NotFound(_)));
}

// =============================================================================
// Direct
// =============================================================================

#[tokio::test]
async fn test_direct_adapter_returns_target() {
    let adapter = registry(MockHttp::new()).resolve(SourceType::None).unwrap();
    let record = LinkRecord::new("https://cdn.example.org/a.bin", LinkKind::File, SourceType::None);

    assert_eq!(
        adapter.resolve_download("/", &record).await.unwrap(),
        "https://cdn.example.org/a.bin"
    );
    assert!(adapter.resolve_download("more", &record).await.is_err());
    let err = adapter.list_files("/", &SourceConfig::default()).await.unwrap_err();
    assert!(matches!(err, FilelinkerError::InvalidConfiguration(_)));
}
