//! Smoke tests for the blocking wrapper: same operations, same typed
//! errors, no async context required on the caller's side.

use metasys::MetasysError;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const ID_A: &str = "aaaaaaaa-1111-2222-3333-444444444444";

/// Start a mock server on a private runtime the test keeps alive.
fn start_server() -> (tokio::runtime::Runtime, MockServer) {
    let runtime = tokio::runtime::Runtime::new().expect("runtime should start");
    let server = runtime.block_on(MockServer::start());
    (runtime, server)
}

#[test]
fn test_blocking_login_and_read() {
    let (runtime, server) = start_server();
    runtime.block_on(async {
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "accessToken": "abc123",
                "expires": "2030-01-01T00:00:00Z",
            })))
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path(format!("/objects/{ID_A}/attributes/presentValue")))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "item": { "presentValue": 72.5 }
            })))
            .mount(&server)
            .await;
    });

    let client = metasys::blocking::MetasysClient::from_async(
        metasys::MetasysClient::builder()
            .base_url(server.uri())
            .build()
            .expect("client should build"),
    )
    .expect("blocking client should build");

    let token = client
        .login("api-user", "secret", false)
        .expect("login should succeed");
    assert_eq!(token.access_token, "abc123");
    assert!(client.current_token().is_some());

    let variant = client
        .read_property(Uuid::parse_str(ID_A).unwrap(), "presentValue")
        .expect("read should succeed")
        .expect("value should be present");
    assert_eq!(variant.numeric_value(), Some(72.5));

    client.close();
    assert!(client.current_token().is_none());
}

#[test]
fn test_blocking_surfaces_typed_errors() {
    let (runtime, server) = start_server();
    runtime.block_on(async {
        Mock::given(method("POST"))
            .and(path("/login"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "message": "no" })),
            )
            .mount(&server)
            .await;
    });

    let client = metasys::blocking::MetasysClient::from_async(
        metasys::MetasysClient::builder()
            .base_url(server.uri())
            .build()
            .expect("client should build"),
    )
    .expect("blocking client should build");

    let err = client
        .login("api-user", "secret", false)
        .expect_err("login should fail");
    assert!(matches!(err, MetasysError::Auth { status: 401, .. }));
}
