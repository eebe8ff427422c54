//! HTTP client and backend wiring against a mock Vault server.

use prometheus::Registry;
use secrecy::ExposeSecret;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use test_utils::fixtures::{health_body, kv1_body, kv2_body, lookup_self_body, renew_self_body};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;
use tokio_util::sync::CancellationToken;
use vault_backend::{
    Engine, StoreClient, SupervisorExit, VaultBackend, VaultClient, VaultConfig, VaultError,
    VaultMetrics,
};
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "s.initial-token";

fn config(server: &MockServer) -> VaultConfig {
    VaultConfig::new(server.uri(), TOKEN).with_timeout(Duration::from_secs(5))
}

fn client(server: &MockServer) -> VaultClient {
    VaultClient::new(&config(server)).unwrap()
}

async fn mount_health(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v1/sys/health"))
        .and(query_param("standbycode", "299"))
        .respond_with(ResponseTemplate::new(200).set_body_json(health_body()))
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_lookup_self_sends_token() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/auth/token/lookup-self"))
        .and(header("X-Vault-Token", TOKEN))
        .respond_with(ResponseTemplate::new(200).set_body_json(lookup_self_body(1_200, true)))
        .expect(1)
        .mount(&server)
        .await;

    let lookup = client(&server).lookup_self().await.unwrap();

    assert_eq!(lookup.ttl().unwrap(), 1_200);
    assert!(lookup.renewable().unwrap());
}

#[tokio::test]
async fn test_lookup_self_forbidden_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/auth/token/lookup-self"))
        .respond_with(
            ResponseTemplate::new(403).set_body_json(json!({ "errors": ["permission denied"] })),
        )
        .mount(&server)
        .await;

    let err = client(&server).lookup_self().await.unwrap_err();

    assert!(matches!(err, VaultError::StoreUnavailable(ref msg) if msg.contains("403")));
}

#[tokio::test]
async fn test_renew_self_posts_increment_and_swaps_token() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/auth/token/renew-self"))
        .and(header("X-Vault-Token", TOKEN))
        .and(body_json(json!({ "increment": 600 })))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(renew_self_body("s.renewed-token", 600)),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/auth/token/lookup-self"))
        .and(header("X-Vault-Token", "s.renewed-token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lookup_self_body(600, true)))
        .expect(1)
        .mount(&server)
        .await;

    let client = client(&server);
    client.renew_self(600).await.unwrap();

    assert_eq!(client.session().token().expose_secret(), "s.renewed-token");
    assert_eq!(client.lookup_self().await.unwrap().ttl().unwrap(), 600);
}

#[tokio::test]
async fn test_read_existing_secret() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/secret/data/app"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kv2_body(&[("password", "abc")])))
        .mount(&server)
        .await;

    let secret = client(&server).read("secret/data/app").await.unwrap().unwrap();

    let entry = Engine::Kv2.extract(&secret).unwrap();
    assert_eq!(entry.get("password").as_deref(), Some("abc"));
}

#[tokio::test]
async fn test_read_missing_secret_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/kv/missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({ "errors": [] })))
        .mount(&server)
        .await;

    assert!(client(&server).read("kv/missing").await.unwrap().is_none());
}

#[tokio::test]
async fn test_read_deleted_version_keeps_envelope() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/secret/data/app"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "data": {
                "data": null,
                "metadata": { "deletion_time": "2024-03-02T10:00:00Z", "version": 3 }
            }
        })))
        .mount(&server)
        .await;

    let secret = client(&server).read("secret/data/app").await.unwrap().unwrap();

    assert!(secret.data.is_some());
    assert!(Engine::Kv2.extract(&secret).is_none());
}

#[tokio::test]
async fn test_read_truncated_not_found_body_is_unavailable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.unwrap();
        let mut request = [0_u8; 4096];
        let _ = socket.read(&mut request).await;
        socket
            .write_all(
                b"HTTP/1.1 404 Not Found\r\n\
                  content-type: application/json\r\n\
                  content-length: 512\r\n\r\n\
                  {\"data\":",
            )
            .await
            .unwrap();
        socket.shutdown().await.unwrap();
    });

    let config =
        VaultConfig::new(format!("http://{addr}"), TOKEN).with_timeout(Duration::from_secs(5));
    let err = VaultClient::new(&config)
        .unwrap()
        .read("kv/app")
        .await
        .unwrap_err();

    assert!(matches!(err, VaultError::StoreUnavailable(_)));
}

#[tokio::test]
async fn test_read_server_error_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/kv/app"))
        .respond_with(ResponseTemplate::new(503).set_body_string("sealed"))
        .mount(&server)
        .await;

    let err = client(&server).read("kv/app").await.unwrap_err();

    assert!(matches!(err, VaultError::StoreUnavailable(_)));
}

#[tokio::test]
async fn test_health() {
    let server = MockServer::start().await;
    mount_health(&server).await;

    let health = client(&server).health().await.unwrap();

    assert_eq!(health.cluster_name, "vault-cluster-e2e");
    assert_eq!(health.version, "1.15.4");
}

#[tokio::test]
async fn test_connect_fails_when_unreachable() {
    let server = MockServer::start().await;
    let config = config(&server);
    drop(server);

    let result = VaultBackend::connect(
        &config,
        Arc::new(VaultMetrics::new(&Registry::new()).unwrap()),
        CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(VaultError::StoreUnavailable(_))));
}

#[tokio::test]
async fn test_connect_rejects_invalid_policy() {
    let server = MockServer::start().await;
    let config = config(&server).with_renew_ttl_increment(0);

    let result = VaultBackend::connect(
        &config,
        Arc::new(VaultMetrics::new(&Registry::new()).unwrap()),
        CancellationToken::new(),
    )
    .await;

    assert!(matches!(result, Err(VaultError::InvalidConfig(_))));
}

#[tokio::test]
async fn test_backend_reads_and_supervises() {
    let server = MockServer::start().await;
    mount_health(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/auth/token/lookup-self"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lookup_self_body(3_600, true)))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/kv/app"))
        .respond_with(ResponseTemplate::new(200).set_body_json(kv1_body(&[("data", "payload")])))
        .mount(&server)
        .await;

    let registry = Registry::new();
    let metrics = Arc::new(VaultMetrics::new(&registry).unwrap());
    let config = config(&server)
        .with_engine(Engine::Kv1)
        .with_token_polling_period(Duration::from_millis(20));

    let backend = VaultBackend::connect(&config, Arc::clone(&metrics), CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(backend.read_secret("kv/app", "").await.unwrap(), "payload");
    let uri = server.uri();
    assert_eq!(
        metrics
            .info
            .with_label_values(&[
                uri.as_str(),
                "1.15.4",
                "kv1",
                "5b6e2f0c-1b0a-4c2e-9a3b-7f2d1e0c9b8a",
                "vault-cluster-e2e",
            ])
            .get(),
        1
    );

    let exit = backend.join_supervisor().await.unwrap();
    assert!(matches!(exit, SupervisorExit::Healthy));
    assert_eq!(metrics.token_ttl.get(), 3_600);
}

#[tokio::test]
async fn test_backend_cancel_stops_supervisor() {
    let server = MockServer::start().await;
    mount_health(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/auth/token/lookup-self"))
        .respond_with(ResponseTemplate::new(200).set_body_json(lookup_self_body(3_600, true)))
        .expect(0)
        .mount(&server)
        .await;

    let cancel = CancellationToken::new();
    let config = config(&server).with_token_polling_period(Duration::from_secs(3_600));
    let backend = VaultBackend::connect(
        &config,
        Arc::new(VaultMetrics::new(&Registry::new()).unwrap()),
        cancel.clone(),
    )
    .await
    .unwrap();

    assert!(!backend.supervisor_finished());
    cancel.cancel();

    let exit = backend.join_supervisor().await.unwrap();
    assert!(matches!(exit, SupervisorExit::Cancelled));
}
