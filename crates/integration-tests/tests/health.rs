mod harness;

use harness::config::ConfigBuilder;
use harness::server::TestServer;

#[tokio::test]
async fn health_endpoint_returns_ok_when_enabled() {
    let config = ConfigBuilder::new()
        .with_provider("provider-a", "http://127.0.0.1:9/v1/chat/completions")
        .with_health()
        .build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server.client().get(server.url("/health")).send().await.unwrap();

    assert_eq!(resp.status(), 200);
    assert_eq!(resp.text().await.unwrap(), "ok");
}

#[tokio::test]
async fn health_endpoint_is_off_by_default() {
    let config = ConfigBuilder::new()
        .with_provider("provider-a", "http://127.0.0.1:9/v1/chat/completions")
        .build();
    let server = TestServer::start(config).await.unwrap();

    let resp = server.client().get(server.url("/health")).send().await.unwrap();

    assert_eq!(resp.status(), 404);
}
