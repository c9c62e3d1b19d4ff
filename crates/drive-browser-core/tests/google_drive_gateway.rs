mod common;

use common::staging_dir;
use drive_browser_core::config::BrowserSettings;
use drive_browser_core::storage::GoogleDriveGateway;
use drive_browser_core::{FileEntry, GatewayError, StorageGateway};
use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ACCESS_TOKEN: &str = "ya29.test-token";

fn settings() -> BrowserSettings {
    BrowserSettings {
        google_client_id: Some("client-id".into()),
        google_client_secret: Some("client-secret".into()),
        google_refresh_token: Some("1//refresh".into()),
        ..BrowserSettings::default()
    }
}

async fn mount_token(server: &MockServer, expires_in: u64) {
    Mock::given(method("POST"))
        .and(path("/token"))
        .and(body_string_contains("grant_type=refresh_token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": ACCESS_TOKEN,
            "expires_in": expires_in,
            "token_type": "Bearer",
        })))
        .mount(server)
        .await;
}

async fn gateway(server: &MockServer) -> Result<GoogleDriveGateway, GatewayError> {
    GoogleDriveGateway::with_base_urls(
        &settings(),
        server.uri(),
        format!("{}/token", server.uri()),
    )
    .await
}

async fn connected(server: &MockServer) -> GoogleDriveGateway {
    mount_token(server, 3600).await;
    match gateway(server).await {
        Ok(gateway) => gateway,
        Err(e) => panic!("gateway failed to connect: {e}"),
    }
}

async fn mount_error(server: &MockServer, route: &str, status: u16, reason: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(status).set_body_json(json!({
            "error": {
                "code": status,
                "errors": [{ "reason": reason }],
                "message": reason,
            }
        })))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_list_follows_page_tokens() {
    let server = MockServer::start().await;
    let gateway = connected(&server).await;

    Mock::given(method("GET"))
        .and(path("/files"))
        .and(query_param("pageToken", "page-2"))
        .and(header("authorization", format!("Bearer {ACCESS_TOKEN}").as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "files": [{ "id": "c", "name": "c.txt" }],
        })))
        .with_priority(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nextPageToken": "page-2",
            "files": [
                { "id": "a", "name": "a.txt" },
                { "id": "b", "name": "b.txt" },
            ],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let files = gateway.list_files().await;

    assert_eq!(
        files.ok(),
        Some(vec![
            FileEntry::new("a", "a.txt"),
            FileEntry::new("b", "b.txt"),
            FileEntry::new("c", "c.txt"),
        ])
    );
}

#[tokio::test]
async fn test_rejected_refresh_token_fails_connect() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/token"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": "invalid_grant",
            "error_description": "Token has been expired or revoked.",
        })))
        .mount(&server)
        .await;

    let result = gateway(&server).await;

    assert!(matches!(
        result,
        Err(GatewayError::Auth(reason)) if reason.starts_with("invalid_grant")
    ));
}

#[tokio::test]
async fn test_missing_credentials_fail_before_any_request() {
    let server = MockServer::start().await;
    let result = GoogleDriveGateway::with_base_urls(
        &BrowserSettings::default(),
        server.uri(),
        format!("{}/token", server.uri()),
    )
    .await;

    assert!(matches!(result, Err(GatewayError::Config(_))));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn test_huge_token_lifetime_is_accepted() {
    let server = MockServer::start().await;
    mount_token(&server, u64::MAX).await;

    assert!(gateway(&server).await.is_ok());
}

#[tokio::test]
async fn test_unauthorized_listing_maps_to_auth() {
    let server = MockServer::start().await;
    let gateway = connected(&server).await;
    mount_error(&server, "/files", 401, "authError").await;

    assert!(matches!(
        gateway.list_files().await,
        Err(GatewayError::Auth(_))
    ));
}

#[tokio::test]
async fn test_insufficient_scope_maps_to_auth() {
    let server = MockServer::start().await;
    let gateway = connected(&server).await;
    mount_error(&server, "/files", 403, "insufficientPermissions").await;

    assert!(matches!(
        gateway.list_files().await,
        Err(GatewayError::Auth(_))
    ));
}

#[tokio::test]
async fn test_rate_limit_stays_api_error() {
    let server = MockServer::start().await;
    let gateway = connected(&server).await;
    mount_error(&server, "/files", 403, "rateLimitExceeded").await;

    assert!(matches!(
        gateway.list_files().await,
        Err(GatewayError::Api { status: 403, .. })
    ));
}

#[tokio::test]
async fn test_unknown_file_maps_to_not_found() {
    let server = MockServer::start().await;
    let gateway = connected(&server).await;
    mount_error(&server, "/files/missing", 404, "notFound").await;

    let dir = staging_dir();
    let result = gateway.download_file("missing", &dir).await;

    assert!(matches!(result, Err(GatewayError::NotFound(id)) if id == "missing"));
}

#[tokio::test]
async fn test_download_writes_named_file_without_leftovers() {
    let server = MockServer::start().await;
    let gateway = connected(&server).await;
    let content = b"%PDF-1.7 quarterly numbers".to_vec();

    Mock::given(method("GET"))
        .and(path("/files/f1"))
        .and(query_param("alt", "media"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content.clone()))
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/f1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "f1",
            "name": "Q3/report.pdf",
        })))
        .mount(&server)
        .await;

    let dir = staging_dir();
    let result = gateway.download_file("f1", &dir).await;

    let expected = dir.join("Q3_report.pdf");
    assert_eq!(result.ok(), Some(expected.clone()));
    assert_eq!(tokio::fs::read(&expected).await.ok(), Some(content));
    assert!(!dir.join("Q3_report.pdf.part").exists());

    tokio::fs::remove_dir_all(&dir).await.ok();
}

#[tokio::test]
async fn test_short_body_fails_and_leaves_nothing_behind() {
    let server = MockServer::start().await;
    let gateway = connected(&server).await;

    Mock::given(method("GET"))
        .and(path("/files/f2"))
        .and(query_param("alt", "media"))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("content-length", "4096")
                .set_body_bytes(b"only a few bytes".to_vec()),
        )
        .with_priority(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/files/f2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "f2",
            "name": "big.bin",
        })))
        .mount(&server)
        .await;

    let dir = staging_dir();
    let result = gateway.download_file("f2", &dir).await;

    assert!(
        matches!(
            result,
            Err(GatewayError::Truncated { .. } | GatewayError::Http(_))
        ),
        "truncated transfer must not succeed: {result:?}"
    );
    assert!(!dir.join("big.bin").exists());
    assert!(!dir.join("big.bin.part").exists());

    tokio::fs::remove_dir_all(&dir).await.ok();
}

#[tokio::test]
async fn test_check_connection_hits_about() {
    let server = MockServer::start().await;
    let gateway = connected(&server).await;

    Mock::given(method("GET"))
        .and(path("/about"))
        .and(query_param("fields", "user"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "user": { "displayName": "Drive Owner" },
        })))
        .expect(1)
        .mount(&server)
        .await;

    assert!(gateway.check_connection().await.is_ok());
}
