use spec_vendor_core::config::UpstreamConfig;
use spec_vendor_core::contract::{FetchError, RemoteKind, Upstream};
use spec_vendor_core::download::{HttpUpstream, USER_AGENT};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> HttpUpstream {
    HttpUpstream::new(UpstreamConfig {
        api_base: format!("{}/repos/org/platform", server.uri()),
        raw_base: format!("{}/raw", server.uri()),
        spec_root: "docs/openapi".into(),
    })
    .unwrap()
}

#[tokio::test]
async fn fetch_returns_body_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/raw/docs/openapi/kas.yaml"))
        .and(header("user-agent", USER_AGENT))
        .respond_with(ResponseTemplate::new(200).set_body_string("openapi: 3.0.0\n"))
        .mount(&server)
        .await;

    let upstream = client_for(&server);
    let body = upstream
        .fetch(&format!("{}/raw/docs/openapi/kas.yaml", server.uri()))
        .await
        .unwrap();
    assert_eq!(body, b"openapi: 3.0.0\n");
}

#[tokio::test]
async fn non_success_status_is_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let upstream = client_for(&server);
    let err = upstream
        .fetch(&format!("{}/raw/missing.yaml", server.uri()))
        .await
        .unwrap_err();
    assert!(matches!(err, FetchError::Status { status: 404, .. }));
}

#[tokio::test]
async fn list_dir_reads_contents_api() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/repos/org/platform/contents/docs/openapi"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            r#"[{"name":"kas","path":"docs/openapi/kas","type":"dir"},
                {"name":"common.yaml","path":"docs/openapi/common.yaml","type":"file"}]"#,
        ))
        .mount(&server)
        .await;

    let upstream = client_for(&server);
    let entries = upstream.list_dir("docs/openapi").await.unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].kind, RemoteKind::Dir);
    assert!(entries[1].is_yaml_file());
}

#[tokio::test]
async fn list_dir_rejects_non_json() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>rate limited</html>"))
        .mount(&server)
        .await;

    let upstream = client_for(&server);
    let err = upstream.list_dir("docs/openapi").await.unwrap_err();
    assert!(matches!(err, FetchError::Json { .. }));
}
