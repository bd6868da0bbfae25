//! Authorization request URL construction
//!
//! The URL is a pure function of the discovery document and the client
//! registration: the same inputs always produce byte-identical output, and
//! building it never touches the network.

use url::form_urlencoded;

use crate::config::ClientRegistration;
use crate::discovery::DiscoveryDocument;
use crate::error::{Result, SkolauthError};

/// The URL the rendering surface loads to start consent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthorizationRequest {
    /// Fully-built authorization URL
    pub url: String,
}

impl std::fmt::Display for AuthorizationRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url)
    }
}

/// Builds the authorization request for a tenant.
///
/// Parameters are appended in a fixed order: `response_type`, `scope`,
/// `client_id`, `redirect_uri`.
///
/// # Errors
///
/// Returns [`SkolauthError::MissingAuthorizationEndpoint`] when the document
/// has no string `authorization_endpoint`.
///
/// # Examples
///
/// ```
/// use skolauth::authorization::build_authorization_request;
/// use skolauth::config::ClientRegistration;
/// use skolauth::discovery::DiscoveryDocument;
///
/// let doc = DiscoveryDocument::from_value(serde_json::json!({
///     "authorization_endpoint": "https://idp/a",
///     "token_endpoint": "https://idp/t"
/// }))
/// .unwrap();
/// let reg = ClientRegistration {
///     client_id: "app".to_string(),
///     client_secret: "secret".to_string(),
///     redirect_uri: "myapp://callback".to_string(),
///     scope: "openid".to_string(),
///     response_type: "code".to_string(),
/// };
///
/// let request = build_authorization_request(&doc, &reg).unwrap();
/// assert_eq!(
///     request.url,
///     "https://idp/a?response_type=code&scope=openid&client_id=app&redirect_uri=myapp%3A%2F%2Fcallback"
/// );
/// ```
pub fn build_authorization_request(
    doc: &DiscoveryDocument,
    reg: &ClientRegistration,
) -> Result<AuthorizationRequest> {
    let endpoint = doc
        .authorization_endpoint()
        .ok_or(SkolauthError::MissingAuthorizationEndpoint)?;

    let query = form_urlencoded::Serializer::new(String::new())
        .append_pair("response_type", &reg.response_type)
        .append_pair("scope", &reg.scope)
        .append_pair("client_id", &reg.client_id)
        .append_pair("redirect_uri", &reg.redirect_uri)
        .finish();

    let separator = if endpoint.contains('?') { '&' } else { '?' };

    Ok(AuthorizationRequest {
        url: format!("{endpoint}{separator}{query}"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn registration() -> ClientRegistration {
        ClientRegistration {
            client_id: "SkoApp.Prod.test".to_string(),
            client_secret: "secret".to_string(),
            redirect_uri: "skoapp-prod://sign-in-callback".to_string(),
            scope: "openid".to_string(),
            response_type: "code".to_string(),
        }
    }

    fn doc(value: serde_json::Value) -> DiscoveryDocument {
        DiscoveryDocument::from_value(value).unwrap()
    }

    #[test]
    fn test_build_contains_params_in_order() {
        let request = build_authorization_request(
            &doc(json!({ "authorization_endpoint": "https://idp.example/authorize" })),
            &registration(),
        )
        .unwrap();

        assert_eq!(
            request.url,
            "https://idp.example/authorize?response_type=code&scope=openid\
             &client_id=SkoApp.Prod.test&redirect_uri=skoapp-prod%3A%2F%2Fsign-in-callback"
        );
    }

    #[test]
    fn test_build_is_deterministic() {
        let d = doc(json!({ "authorization_endpoint": "https://idp.example/authorize" }));
        let reg = registration();
        let a = build_authorization_request(&d, &reg).unwrap();
        let b = build_authorization_request(&d, &reg).unwrap();
        assert_eq!(a.url.as_bytes(), b.url.as_bytes());
    }

    #[test]
    fn test_build_encodes_scope_spaces() {
        let mut reg = registration();
        reg.scope = "openid profile".to_string();
        let request = build_authorization_request(
            &doc(json!({ "authorization_endpoint": "https://idp.example/authorize" })),
            &reg,
        )
        .unwrap();
        assert!(request.url.contains("scope=openid+profile"));
    }

    #[test]
    fn test_build_appends_to_existing_query() {
        let request = build_authorization_request(
            &doc(json!({ "authorization_endpoint": "https://idp.example/authorize?tenant=42" })),
            &registration(),
        )
        .unwrap();
        assert!(request
            .url
            .starts_with("https://idp.example/authorize?tenant=42&response_type=code"));
    }

    #[test]
    fn test_build_missing_endpoint_fails() {
        let err = build_authorization_request(
            &doc(json!({ "token_endpoint": "https://idp.example/token" })),
            &registration(),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SkolauthError>(),
            Some(SkolauthError::MissingAuthorizationEndpoint)
        ));
    }

    #[test]
    fn test_build_non_string_endpoint_fails() {
        let err = build_authorization_request(
            &doc(json!({ "authorization_endpoint": null })),
            &registration(),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SkolauthError>(),
            Some(SkolauthError::MissingAuthorizationEndpoint)
        ));
    }

    #[test]
    fn test_request_displays_as_url() {
        let request = AuthorizationRequest {
            url: "https://idp/a?x=1".to_string(),
        };
        assert_eq!(request.to_string(), "https://idp/a?x=1");
    }
}
