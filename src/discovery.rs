//! OpenID Connect discovery
//!
//! Each tenant publishes an OpenID well-known configuration document. The
//! document is kept as an opaque JSON object; only `authorization_endpoint`
//! and `token_endpoint` are read by the login flow.
//!
//! # References
//!
//! - OpenID Connect Discovery 1.0 <https://openid.net/specs/openid-connect-discovery-1_0.html>

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Result, SkolauthError};

/// A tenant's OIDC discovery document.
///
/// Stored wholesale; a new fetch replaces the previous document rather than
/// merging into it.
///
/// # Examples
///
/// ```
/// use skolauth::discovery::DiscoveryDocument;
///
/// let doc = DiscoveryDocument::from_value(serde_json::json!({
///     "authorization_endpoint": "https://idp.example/authorize",
///     "token_endpoint": "https://idp.example/token"
/// }))
/// .unwrap();
///
/// assert_eq!(doc.authorization_endpoint(), Some("https://idp.example/authorize"));
/// assert_eq!(doc.token_endpoint(), Some("https://idp.example/token"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DiscoveryDocument(Map<String, Value>);

impl DiscoveryDocument {
    /// Wraps a JSON value, which must be an object.
    ///
    /// # Errors
    ///
    /// Returns [`SkolauthError::DiscoveryMalformed`] for any other JSON type.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            other => Err(SkolauthError::DiscoveryMalformed(format!(
                "expected a JSON object, got {}",
                json_type_name(&other)
            ))
            .into()),
        }
    }

    /// Returns a raw metadata value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns a metadata value if it is a string.
    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.0.get(key).and_then(Value::as_str)
    }

    /// The `authorization_endpoint` URL, when present as a string.
    pub fn authorization_endpoint(&self) -> Option<&str> {
        self.get_str("authorization_endpoint")
    }

    /// The `token_endpoint` URL, when present as a string.
    pub fn token_endpoint(&self) -> Option<&str> {
        self.get_str("token_endpoint")
    }

    /// The `issuer` identifier, when present as a string.
    pub fn issuer(&self) -> Option<&str> {
        self.get_str("issuer")
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Fetches discovery documents.
#[derive(Debug, Clone)]
pub struct DiscoveryClient {
    http: Arc<reqwest::Client>,
}

impl DiscoveryClient {
    /// Creates a discovery client using the shared HTTP client.
    pub fn new(http: Arc<reqwest::Client>) -> Self {
        Self { http }
    }

    /// Fetches and parses the document at `well_known_url`.
    ///
    /// # Errors
    ///
    /// - [`SkolauthError::DiscoveryUnavailable`] on transport failure.
    /// - [`SkolauthError::DiscoveryFailed`] on a non-200 status.
    /// - [`SkolauthError::DiscoveryMalformed`] if the body is not a JSON
    ///   object.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::sync::Arc;
    /// use skolauth::discovery::DiscoveryClient;
    ///
    /// # async fn example() -> skolauth::error::Result<()> {
    /// let client = DiscoveryClient::new(Arc::new(reqwest::Client::new()));
    /// let doc = client
    ///     .fetch("https://idp.example/.well-known/openid-configuration")
    ///     .await?;
    /// println!("token endpoint: {:?}", doc.token_endpoint());
    /// # Ok(())
    /// # }
    /// ```
    pub async fn fetch(&self, well_known_url: &str) -> Result<DiscoveryDocument> {
        tracing::debug!("Fetching discovery document: {}", well_known_url);

        let resp = self.http.get(well_known_url).send().await.map_err(|e| {
            SkolauthError::DiscoveryUnavailable {
                url: well_known_url.to_string(),
                message: e.to_string(),
            }
        })?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(SkolauthError::DiscoveryFailed {
                url: well_known_url.to_string(),
                status: status.as_u16(),
            }
            .into());
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| SkolauthError::DiscoveryUnavailable {
                url: well_known_url.to_string(),
                message: e.to_string(),
            })?;

        let value: Value = serde_json::from_slice(&body)
            .map_err(|e| SkolauthError::DiscoveryMalformed(e.to_string()))?;
        let doc = DiscoveryDocument::from_value(value)?;

        tracing::info!(
            issuer = doc.issuer().unwrap_or("-"),
            authorization_endpoint = doc.authorization_endpoint().unwrap_or("-"),
            token_endpoint = doc.token_endpoint().unwrap_or("-"),
            "Discovered identity provider"
        );

        Ok(doc)
    }
}
