//! Discovery integration tests using wiremock
//!
//! Verifies `DiscoveryClient::fetch` and the authorization URL built from a
//! fetched document.

mod common;

use std::sync::Arc;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use skolauth::authorization::build_authorization_request;
use skolauth::discovery::DiscoveryClient;
use skolauth::error::SkolauthError;

use common::{discovery_body, test_registration};

const WELL_KNOWN: &str = "/.well-known/openid-configuration";

fn discovery_client() -> DiscoveryClient {
    DiscoveryClient::new(Arc::new(reqwest::Client::new()))
}

#[tokio::test]
async fn test_fetch_returns_whole_document() {
    let server = MockServer::start().await;
    let body = discovery_body("https://idp/a", &server.uri());
    Mock::given(method("GET"))
        .and(path(WELL_KNOWN))
        .respond_with(ResponseTemplate::new(200).set_body_json(body.clone()))
        .expect(1)
        .mount(&server)
        .await;

    let doc = discovery_client()
        .fetch(&format!("{}{}", server.uri(), WELL_KNOWN))
        .await
        .unwrap();

    assert_eq!(doc.authorization_endpoint(), Some("https://idp/a"));
    assert_eq!(doc.token_endpoint(), Some(format!("{}/t", server.uri()).as_str()));
    assert_eq!(doc.get("response_types_supported"), Some(&json!(["code"])));
    assert_eq!(serde_json::to_value(&doc).unwrap(), body);
}

#[tokio::test]
async fn test_fetch_non_200_is_discovery_failed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WELL_KNOWN))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let url = format!("{}{}", server.uri(), WELL_KNOWN);
    let err = discovery_client().fetch(&url).await.unwrap_err();

    match err.downcast_ref::<SkolauthError>() {
        Some(SkolauthError::DiscoveryFailed { url: failed, status }) => {
            assert_eq!(failed, &url);
            assert_eq!(*status, 404);
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_fetch_array_body_is_malformed() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WELL_KNOWN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!(["not", "an", "object"])))
        .mount(&server)
        .await;

    let err = discovery_client()
        .fetch(&format!("{}{}", server.uri(), WELL_KNOWN))
        .await
        .unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SkolauthError>(),
        Some(SkolauthError::DiscoveryMalformed(_))
    ));
}

#[tokio::test]
async fn test_fetch_unreachable_provider() {
    let server = MockServer::start().await;
    let url = format!("{}{}", server.uri(), WELL_KNOWN);
    drop(server);

    let err = discovery_client().fetch(&url).await.unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SkolauthError>(),
        Some(SkolauthError::DiscoveryUnavailable { .. })
    ));
}

#[tokio::test]
async fn test_document_without_authorization_endpoint_cannot_build_url() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(WELL_KNOWN))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "token_endpoint": "https://idp/t"
        })))
        .mount(&server)
        .await;

    let doc = discovery_client()
        .fetch(&format!("{}{}", server.uri(), WELL_KNOWN))
        .await
        .unwrap();
    let err = build_authorization_request(&doc, &test_registration()).unwrap_err();

    assert!(matches!(
        err.downcast_ref::<SkolauthError>(),
        Some(SkolauthError::MissingAuthorizationEndpoint)
    ));
}
