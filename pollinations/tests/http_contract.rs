//! HTTP contract tests against a local mock host.

use std::time::Duration;

use mimesis_pollinations::{Client, Error, ImageRequest, RetryPolicy};
use wiremock::matchers::{method, path, path_regex, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fast_policy(max_retries: u32) -> RetryPolicy {
    RetryPolicy::new(max_retries)
        .with_base_delay(Duration::from_millis(5))
        .with_max_delay(Duration::from_millis(20))
}

fn client_for(server: &MockServer, max_retries: u32) -> Client {
    Client::builder()
        .image_host(server.uri())
        .text_host(server.uri())
        .retry_policy(fast_policy(max_retries))
        .timeout(Duration::from_secs(5))
        .build()
        .unwrap()
}

#[tokio::test]
async fn validated_url_on_success() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .and(path_regex(r"^/prompt/.+"))
        .and(query_param("width", "1280"))
        .and(query_param("height", "720"))
        .and(query_param("nologo", "true"))
        .and(query_param("seed", "7"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 2);
    let request = ImageRequest::new("a red fox in snow")
        .with_size(1280, 720)
        .with_seed(7);
    let image = client.image().generate(&request).await;

    assert!(image.validated);
    assert_eq!(image.attempts, 1);
    assert_eq!(image.seed, 7);
    assert!(image.url.contains("/prompt/a%20red%20fox%20in%20snow"));
}

#[tokio::test]
async fn url_returned_when_every_check_fails() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(500))
        .expect(3)
        .mount(&server)
        .await;

    let client = client_for(&server, 2);
    let request = ImageRequest::new("storm over the sea").with_seed(3);
    let image = client.image().generate(&request).await;

    assert!(!image.validated);
    assert_eq!(image.attempts, 3);
    assert!(!image.url.is_empty());
    assert_eq!(image.url, client.image().build_url(&request, 3).to_string());
}

#[tokio::test]
async fn recovers_after_transient_failure() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 2);
    let image = client
        .image()
        .generate(&ImageRequest::new("tea garden").with_seed(1))
        .await;

    assert!(image.validated);
    assert_eq!(image.attempts, 2);
}

#[tokio::test]
async fn request_can_override_retries() {
    let server = MockServer::start().await;
    Mock::given(method("HEAD"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 4);
    let image = client
        .image()
        .generate(&ImageRequest::new("empty room").with_max_retries(0))
        .await;

    assert!(!image.validated);
    assert_eq!(image.attempts, 1);
}

#[tokio::test]
async fn url_returned_when_host_unreachable() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    drop(listener);

    let client = Client::builder()
        .image_host(format!("http://127.0.0.1:{port}"))
        .retry_policy(fast_policy(1))
        .build()
        .unwrap();
    let image = client
        .image()
        .generate(&ImageRequest::new("nobody home").with_seed(9))
        .await;

    assert!(!image.validated);
    assert_eq!(image.attempts, 2);
    assert!(image.url.starts_with(&format!("http://127.0.0.1:{port}/prompt/")));
}

#[tokio::test]
async fn text_retries_server_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/hello%20world"))
        .respond_with(ResponseTemplate::new(502))
        .up_to_n_times(1)
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/hello%20world"))
        .respond_with(ResponseTemplate::new(200).set_body_string("a bright hello"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 2);
    let text = client.text().generate("hello world").await.unwrap();
    assert_eq!(text, "a bright hello");
}

#[tokio::test]
async fn text_does_not_retry_client_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(400).set_body_string("bad prompt"))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server, 3);
    let err = client.text().generate("???").await.unwrap_err();
    assert!(matches!(err, Error::Status { status: 400, .. }));
}

#[tokio::test]
async fn text_rejects_blank_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string("  \n"))
        .mount(&server)
        .await;

    let client = client_for(&server, 0);
    let err = client.text().generate("anything").await.unwrap_err();
    assert!(matches!(err, Error::EmptyResponse));
}

#[tokio::test]
async fn download_returns_bytes() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/files/fox.png"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(vec![0x89, b'P', b'N', b'G']))
        .mount(&server)
        .await;

    let client = client_for(&server, 0);
    let bytes = client
        .image()
        .download(&format!("{}/files/fox.png", server.uri()))
        .await
        .unwrap();
    assert_eq!(&bytes[..], &[0x89, b'P', b'N', b'G']);
}
