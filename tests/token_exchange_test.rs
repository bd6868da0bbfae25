//! Token exchange integration tests using wiremock
//!
//! Verifies the form body sent by `TokenExchangeClient::exchange` and that
//! the token set is passed through untouched or not at all.

mod common;

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{body_string_contains, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skolauth::discovery::DiscoveryDocument;
use skolauth::error::SkolauthError;
use skolauth::token::TokenExchangeClient;

use common::{discovery_body, test_registration};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn document_for(server: &MockServer) -> DiscoveryDocument {
    DiscoveryDocument::from_value(discovery_body("https://idp/a", &server.uri())).unwrap()
}

fn token_client() -> TokenExchangeClient {
    TokenExchangeClient::new(Arc::new(reqwest::Client::new()))
}

// ---------------------------------------------------------------------------
// Success
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_exchange_posts_form_and_returns_body_unmodified() {
    let server = MockServer::start().await;
    let token_body = json!({
        "access_token": "AT",
        "token_type": "Bearer",
        "expires_in": 3600,
        "id_token": "IT",
        "refresh_token": "RT",
        "custom": {"nested": [1, 2, 3]}
    });

    Mock::given(method("POST"))
        .and(path("/t"))
        .and(header("content-type", "application/x-www-form-urlencoded"))
        .and(body_string_contains("grant_type=authorization_code"))
        .and(body_string_contains("client_id=app"))
        .and(body_string_contains("client_secret=s3cret"))
        .and(body_string_contains("redirect_uri=myapp%3A%2F%2Fcallback"))
        .and(body_string_contains("code=XYZ"))
        .respond_with(ResponseTemplate::new(200).set_body_json(token_body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let tokens = token_client()
        .exchange(&document_for(&server), "XYZ", &test_registration())
        .await
        .unwrap();

    assert_eq!(serde_json::to_value(&tokens).unwrap(), token_body);
}

#[tokio::test]
async fn test_exchange_body_parameter_order() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/t"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"access_token": "AT"})))
        .mount(&server)
        .await;

    token_client()
        .exchange(&document_for(&server), "a b&c", &test_registration())
        .await
        .unwrap();

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
    assert_eq!(
        String::from_utf8(requests[0].body.clone()).unwrap(),
        "grant_type=authorization_code&client_id=app&client_secret=s3cret\
         &redirect_uri=myapp%3A%2F%2Fcallback&code=a+b%26c"
    );
}

// ---------------------------------------------------------------------------
// Failures
// ---------------------------------------------------------------------------

#[tokio::test]
async fn test_exchange_non_200_is_token_exchange_failed() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/t"))
        .respond_with(
            ResponseTemplate::new(400).set_body_json(json!({"error": "invalid_grant"})),
        )
        .mount(&server)
        .await;

    let err = token_client()
        .exchange(&document_for(&server), "XYZ", &test_registration())
        .await
        .unwrap_err();

    match err.downcast_ref::<SkolauthError>() {
        Some(SkolauthError::TokenExchangeFailed(message)) => {
            assert!(message.contains("400"));
            assert!(message.contains("invalid_grant"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_exchange_malformed_json() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/t"))
        .respond_with(ResponseTemplate::new(200).set_body_string("access_token=AT"))
        .mount(&server)
        .await;

    let err = token_client()
        .exchange(&document_for(&server), "XYZ", &test_registration())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SkolauthError>(),
        Some(SkolauthError::TokenExchangeFailed(_))
    ));
}

#[tokio::test]
async fn test_exchange_unreachable_endpoint() {
    let server = MockServer::start().await;
    let doc = document_for(&server);
    drop(server);

    let err = token_client()
        .exchange(&doc, "XYZ", &test_registration())
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SkolauthError>(),
        Some(SkolauthError::TokenExchangeFailed(_))
    ));
}
