//! Resolver tests
//!
//! Lookup, access gate, expiry and quota, then dispatch on the link kind.

mod common;

use chrono::{Duration, Utc};

use filelinker::errors::FilelinkerError;
use filelinker::services::{Resolution, ResolveRequest};
use filelinker::storage::{LinkKind, LinkRecord, SourceConfig, SourceType};

use common::{ALIST_API, MockHttp, alist_listing, services};

fn folder(target: &str) -> LinkRecord {
    LinkRecord::new(target, LinkKind::Folder, SourceType::AList)
}

fn file(target: &str) -> LinkRecord {
    LinkRecord::new(target, LinkKind::File, SourceType::None)
}

// =============================================================================
// Lookup
// =============================================================================

#[tokio::test]
async fn test_unknown_code_is_not_found() {
    let services = services(MockHttp::new());
    let err = services
        .resolver
        .resolve(&ResolveRequest::new("nope0"))
        .await
        .unwrap_err();
    assert!(matches!(err, FilelinkerError::NotFound(_)));
    assert_eq!(err.status_code(), 404);
}

// =============================================================================
// Folder listing
// =============================================================================

#[tokio::test]
async fn test_folder_sub_path_joins_link_root() {
    let http = MockHttp::new();
    let list_url = format!("{}/api/fs/list", ALIST_API);
    http.respond(&list_url, 200, &alist_listing(&[("intro.md", false, 120)]));
    let services = services(http.clone());
    services.store.put("docs1", &folder("/docs")).await.unwrap();

    let resolution = services
        .resolver
        .resolve(&ResolveRequest::new("docs1").with_sub_path("guide/"))
        .await
        .unwrap();

    match resolution {
        Resolution::Listing { path, items, .. } => {
            assert_eq!(path, "/docs/guide");
            assert_eq!(items.len(), 1);
            assert_eq!(items[0].name, "intro.md");
        }
        other => panic!("expected listing, got {:?}", other),
    }

    let seen = http.seen.lock().clone();
    let post = seen.iter().find(|s| s.method == "POST").unwrap();
    let body = post.body.as_ref().unwrap();
    assert_eq!(body["path"], "/docs/guide");
}

#[tokio::test]
async fn test_folder_root_lists_target() {
    let http = MockHttp::new();
    http.respond(
        &format!("{}/api/fs/list", ALIST_API),
        200,
        &alist_listing(&[("a", true, 0), ("b.txt", false, 3)]),
    );
    let services = services(http.clone());
    services.store.put("root1", &folder("/share")).await.unwrap();

    let resolution = services
        .resolver
        .resolve(&ResolveRequest::new("root1"))
        .await
        .unwrap();
    let Resolution::Listing { path, items, .. } = resolution else {
        panic!("expected listing");
    };
    assert_eq!(path, "/share");
    assert_eq!(items.len(), 2);
}

#[tokio::test]
async fn test_folder_file_request_reports_size() {
    let http = MockHttp::new();
    let download = format!("{}/d/docs/guide/intro.pdf", ALIST_API);
    http.length(&download, 2048);
    let services = services(http.clone());
    services.store.put("docs2", &folder("/docs")).await.unwrap();

    let mut request = ResolveRequest::new("docs2").with_sub_path("guide/intro.pdf");
    request.as_file = true;
    let resolution = services.resolver.resolve(&request).await.unwrap();

    assert_eq!(
        resolution,
        Resolution::FileInfo {
            name: "intro.pdf".into(),
            size: 2048,
            download_url: download,
            access_code: None,
        }
    );
}

#[tokio::test]
async fn test_folder_file_download_flag() {
    let services = services(MockHttp::new());
    services.store.put("docs3", &folder("/docs")).await.unwrap();

    let mut request = ResolveRequest::new("docs3").with_sub_path("a b.zip");
    request.as_file = true;
    request.download = true;
    let resolution = services.resolver.resolve(&request).await.unwrap();

    let Resolution::Download { url, file_name, .. } = resolution else {
        panic!("expected download");
    };
    assert_eq!(url, format!("{}/d/docs/a%20b.zip", ALIST_API));
    assert_eq!(file_name, "a b.zip");
}

#[tokio::test]
async fn test_parent_segments_stay_inside_folder() {
    let http = MockHttp::new();
    http.respond(&format!("{}/api/fs/list", ALIST_API), 200, &alist_listing(&[]));
    let services = services(http.clone());
    services.store.put("docs4", &folder("/docs")).await.unwrap();

    let resolution = services
        .resolver
        .resolve(&ResolveRequest::new("docs4").with_sub_path("../secret"))
        .await
        .unwrap();
    assert!(matches!(resolution, Resolution::Listing { ref path, .. } if path == "/docs/secret"));
    let seen = http.seen.lock().clone();
    let post = seen.iter().find(|s| s.method == "POST").unwrap();
    assert_eq!(post.body.as_ref().unwrap()["path"], "/docs/secret");

    let mut request = ResolveRequest::new("docs4").with_sub_path("../../secret/key.pem");
    request.as_file = true;
    request.download = true;
    let Resolution::Download { url, file_name, .. } =
        services.resolver.resolve(&request).await.unwrap()
    else {
        panic!("expected download");
    };
    assert_eq!(url, format!("{}/d/docs/secret/key.pem", ALIST_API));
    assert!(!url.contains(".."));
    assert_eq!(file_name, "key.pem");
}

// =============================================================================
// Repository sources
// =============================================================================

const GITHUB_API: &str = "https://api.github.com";

fn repo_folder(target: &str, config: SourceConfig) -> LinkRecord {
    let mut record = LinkRecord::new(target, LinkKind::Folder, SourceType::RepoContents);
    record.source_config = config;
    record
}

fn acme_tools() -> SourceConfig {
    SourceConfig {
        owner: Some("acme".into()),
        repo: Some("tools".into()),
        ..Default::default()
    }
}

#[tokio::test]
async fn test_repo_folder_with_ref_lists_and_downloads_raw() {
    let http = MockHttp::new();
    http.respond(
        &format!("{}/repos/acme/tools/contents/src/lib?ref=main", GITHUB_API),
        200,
        r#"[{"name":"mod.rs","type":"file","size":4,"download_url":"https://raw.example/mod.rs"},
            {"name":"net","type":"dir"}]"#,
    );
    let services = services(http.clone());
    let config = SourceConfig {
        git_ref: Some("main".into()),
        ..acme_tools()
    };
    services.store.put("repo1", &repo_folder("/src", config)).await.unwrap();

    let Resolution::Listing { path, items, .. } = services
        .resolver
        .resolve(&ResolveRequest::new("repo1").with_sub_path("lib"))
        .await
        .unwrap()
    else {
        panic!("expected listing");
    };
    assert_eq!(path, "/src/lib");
    assert_eq!(items[0].name, "net");
    assert_eq!(http.count("GET"), 1);

    let mut request = ResolveRequest::new("repo1").with_sub_path("lib/mod.rs");
    request.as_file = true;
    request.download = true;
    let Resolution::Download { url, .. } = services.resolver.resolve(&request).await.unwrap() else {
        panic!("expected download");
    };
    assert_eq!(url, "https://raw.githubusercontent.com/acme/tools/main/src/lib/mod.rs");
    // 有 ref 时不再查询元数据
    assert_eq!(http.count("GET"), 1);
}

#[tokio::test]
async fn test_repo_folder_without_ref_looks_up_metadata() {
    let http = MockHttp::new();
    http.respond(
        &format!("{}/repos/acme/tools/contents/src/lib/mod.rs", GITHUB_API),
        200,
        r#"{"name":"mod.rs","type":"file","size":4,"download_url":"https://raw.example/mod.rs"}"#,
    );
    let services = services(http.clone());
    services.store.put("repo2", &repo_folder("/src", acme_tools())).await.unwrap();

    let mut request = ResolveRequest::new("repo2").with_sub_path("lib/mod.rs");
    request.as_file = true;
    request.download = true;
    let Resolution::Download { url, .. } = services.resolver.resolve(&request).await.unwrap() else {
        panic!("expected download");
    };
    assert_eq!(url, "https://raw.example/mod.rs");
    assert_eq!(http.count("GET"), 1);
}

#[tokio::test]
async fn test_flattened_release_folder_lists_assets_only() {
    let http = MockHttp::new();
    http.respond(
        &format!("{}/repos/acme/tools/releases/latest", GITHUB_API),
        200,
        r#"{"tag_name":"v4","assets":[{"name":"tool.tar.gz","size":10}]}"#,
    );
    let services = services(http);
    let mut record = LinkRecord::new("/", LinkKind::Folder, SourceType::ReleaseAssets);
    record.source_config = SourceConfig {
        tag: Some("latest".into()),
        flatten_release_folder: true,
        ..acme_tools()
    };
    services.store.put("rel01", &record).await.unwrap();

    let Resolution::Listing { items, .. } = services
        .resolver
        .resolve(&ResolveRequest::new("rel01"))
        .await
        .unwrap()
    else {
        panic!("expected listing");
    };
    assert_eq!(items.len(), 1);
    assert!(!items[0].is_directory);
    assert_eq!(
        items[0].download_locator,
        "https://github.com/acme/tools/releases/download/v4/tool.tar.gz"
    );

    // 扁平化后没有更深的目录
    let err = services
        .resolver
        .resolve(&ResolveRequest::new("rel01").with_sub_path("v4"))
        .await
        .unwrap_err();
    assert!(matches!(err, FilelinkerError::NotFound(_)));

    let mut request = ResolveRequest::new("rel01").with_sub_path("tool.tar.gz");
    request.as_file = true;
    request.download = true;
    let Resolution::Download { url, .. } = services.resolver.resolve(&request).await.unwrap() else {
        panic!("expected download");
    };
    assert_eq!(url, "https://github.com/acme/tools/releases/latest/download/tool.tar.gz");
}

// =============================================================================
// File links
// =============================================================================

#[tokio::test]
async fn test_unprotected_file_link_downloads_directly() {
    let http = MockHttp::new();
    let services = services(http.clone());
    services
        .store
        .put("file01", &file("https://cdn.example.org/pkg/tool-1.2.tar.gz"))
        .await
        .unwrap();

    let resolution = services
        .resolver
        .resolve(&ResolveRequest::new("file01"))
        .await
        .unwrap();

    assert_eq!(
        resolution,
        Resolution::Download {
            url: "https://cdn.example.org/pkg/tool-1.2.tar.gz".into(),
            file_name: "tool-1.2.tar.gz".into(),
            access_code: None,
        }
    );
    assert_eq!(http.count("HEAD"), 0);
}

#[tokio::test]
async fn test_protected_file_link_returns_info_after_gate() {
    let http = MockHttp::new();
    http.length("https://cdn.example.org/report.pdf", 10);
    let services = services(http);
    let mut record = file("https://cdn.example.org/report.pdf");
    record.access_code = Some("s3cret".into());
    services.store.put("file02", &record).await.unwrap();

    let mut request = ResolveRequest::new("file02");
    request.query_access_code = Some("s3cret".into());
    let resolution = services.resolver.resolve(&request).await.unwrap();

    assert_eq!(
        resolution,
        Resolution::FileInfo {
            name: "report.pdf".into(),
            size: 10,
            download_url: "https://cdn.example.org/report.pdf".into(),
            access_code: Some("s3cret".into()),
        }
    );
}

// =============================================================================
// Access gate
// =============================================================================

#[tokio::test]
async fn test_gate_blocks_without_counting() {
    let services = services(MockHttp::new());
    let mut record = folder("/private");
    record.access_code = Some("s3cret".into());
    record.max_visits = Some(3);
    services.store.put("priv1", &record).await.unwrap();

    for supplied in [None, Some("wrong")] {
        let mut request = ResolveRequest::new("priv1");
        request.query_access_code = supplied.map(String::from);
        let resolution = services.resolver.resolve(&request).await.unwrap();
        assert_eq!(resolution, Resolution::AccessGate { code: "priv1".into() });
    }

    let stored = services.store.get("priv1").await.unwrap().unwrap();
    assert_eq!(stored.visits, 0);
}

#[tokio::test]
async fn test_gate_accepts_header_and_query_prefers_query() {
    let http = MockHttp::new();
    http.respond(&format!("{}/api/fs/list", ALIST_API), 200, &alist_listing(&[]));
    let services = services(http);
    let mut record = folder("/private");
    record.access_code = Some("s3cret".into());
    services.store.put("priv2", &record).await.unwrap();

    let mut via_header = ResolveRequest::new("priv2");
    via_header.header_access_code = Some("s3cret".into());
    let resolution = services.resolver.resolve(&via_header).await.unwrap();
    assert!(matches!(resolution, Resolution::Listing { access_code: Some(ref c), .. } if c == "s3cret"));

    // 查询参数错误时不回退到请求头
    let mut both = ResolveRequest::new("priv2");
    both.query_access_code = Some("wrong".into());
    both.header_access_code = Some("s3cret".into());
    let resolution = services.resolver.resolve(&both).await.unwrap();
    assert!(matches!(resolution, Resolution::AccessGate { .. }));
}

// =============================================================================
// Expiry and quota
// =============================================================================

#[tokio::test]
async fn test_expired_link_is_gone() {
    let services = services(MockHttp::new());
    let mut record = file("https://example.org/a.zip");
    record.expire_at = Some(Utc::now() - Duration::minutes(1));
    record.max_visits = Some(5);
    record.visits = 0;
    services.store.put("old001", &record).await.unwrap();

    let err = services
        .resolver
        .resolve(&ResolveRequest::new("old001"))
        .await
        .unwrap_err();
    assert!(matches!(err, FilelinkerError::Gone(_)));
    assert_eq!(err.status_code(), 410);
}

#[tokio::test]
async fn test_expired_check_runs_after_gate() {
    let services = services(MockHttp::new());
    let mut record = file("https://example.org/a.zip");
    record.expire_at = Some(Utc::now() - Duration::minutes(1));
    record.access_code = Some("pw".into());
    services.store.put("old002", &record).await.unwrap();

    let resolution = services
        .resolver
        .resolve(&ResolveRequest::new("old002"))
        .await
        .unwrap();
    assert!(matches!(resolution, Resolution::AccessGate { .. }));
}

#[tokio::test]
async fn test_quota_counts_then_goes() {
    let services = services(MockHttp::new());
    let mut record = file("https://example.org/once.bin");
    record.max_visits = Some(1);
    services.store.put("once01", &record).await.unwrap();

    let first = services
        .resolver
        .resolve(&ResolveRequest::new("once01"))
        .await
        .unwrap();
    assert!(matches!(first, Resolution::Download { .. }));

    let stored = services.store.get("once01").await.unwrap().unwrap();
    assert_eq!(stored.visits, 1);

    let err = services
        .resolver
        .resolve(&ResolveRequest::new("once01"))
        .await
        .unwrap_err();
    assert!(matches!(err, FilelinkerError::Gone(_)));

    let stored = services.store.get("once01").await.unwrap().unwrap();
    assert_eq!(stored.visits, 1);
}

#[tokio::test]
async fn test_unlimited_links_are_counted() {
    let services = services(MockHttp::new());
    services
        .store
        .put("cnt001", &file("https://example.org/x.bin"))
        .await
        .unwrap();

    for _ in 0..3 {
        services
            .resolver
            .resolve(&ResolveRequest::new("cnt001"))
            .await
            .unwrap();
    }
    let stored = services.store.get("cnt001").await.unwrap().unwrap();
    assert_eq!(stored.visits, 3);
}

#[tokio::test]
async fn test_legacy_short_code_resolves_as_folder() {
    let http = MockHttp::new();
    http.respond(&format!("{}/api/fs/list", ALIST_API), 200, &alist_listing(&[]));
    let services = services(http);
    services.store.put("leg01", &LinkRecord::legacy("/legacy")).await.unwrap();

    let resolution = services
        .resolver
        .resolve(&ResolveRequest::new("leg01"))
        .await
        .unwrap();
    assert!(matches!(resolution, Resolution::Listing { ref path, .. } if path == "/legacy"));
}
