//! Authorization code exchange
//!
//! The token set is opaque: whatever JSON object the token endpoint returns
//! is handed to the caller untouched. It is never persisted or refreshed.

use std::io::Write;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::ClientRegistration;
use crate::discovery::DiscoveryDocument;
use crate::error::{Result, SkolauthError};

/// Token set returned by the token endpoint.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TokenSet(Map<String, Value>);

impl TokenSet {
    /// Wraps a parsed token response.
    ///
    /// # Errors
    ///
    /// Returns [`SkolauthError::TokenExchangeFailed`] if `value` is not a
    /// JSON object.
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Object(map) => Ok(Self(map)),
            _ => Err(SkolauthError::TokenExchangeFailed(
                "token response is not a JSON object".to_string(),
            )
            .into()),
        }
    }

    /// Returns a field of the token set.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the underlying JSON object.
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Renders the token set as JSON indented by four spaces.
    pub fn to_pretty_json(&self) -> Result<String> {
        let mut buf = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut ser = serde_json::Serializer::with_formatter(&mut buf, formatter);
        self.serialize(&mut ser)?;
        String::from_utf8(buf).map_err(|e| {
            SkolauthError::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)).into()
        })
    }

    /// Writes the pretty JSON followed by a newline.
    pub fn write_to<W: Write>(&self, mut out: W) -> Result<()> {
        let json = self.to_pretty_json()?;
        writeln!(out, "{json}")?;
        out.flush()?;
        Ok(())
    }
}

/// Exchanges authorization codes at a tenant's token endpoint.
#[derive(Debug, Clone)]
pub struct TokenExchangeClient {
    http: Arc<reqwest::Client>,
}

impl TokenExchangeClient {
    /// Creates a token exchange client using the shared HTTP client.
    pub fn new(http: Arc<reqwest::Client>) -> Self {
        Self { http }
    }

    /// Exchanges `code` for a token set.
    ///
    /// The form body carries `grant_type`, `client_id`, `client_secret`,
    /// `redirect_uri` and `code`, in that order. The request is not retried.
    ///
    /// # Errors
    ///
    /// Returns [`SkolauthError::TokenExchangeFailed`] when the document has
    /// no `token_endpoint`, on transport failure, on a non-200 status and
    /// when the body is not a JSON object.
    pub async fn exchange(
        &self,
        doc: &DiscoveryDocument,
        code: &str,
        reg: &ClientRegistration,
    ) -> Result<TokenSet> {
        let endpoint = doc.token_endpoint().ok_or_else(|| {
            SkolauthError::TokenExchangeFailed(
                "discovery document has no token_endpoint".to_string(),
            )
        })?;

        let params = [
            ("grant_type", "authorization_code"),
            ("client_id", reg.client_id.as_str()),
            ("client_secret", reg.client_secret.as_str()),
            ("redirect_uri", reg.redirect_uri.as_str()),
            ("code", code),
        ];

        tracing::debug!("Exchanging authorization code at {}", endpoint);

        let resp = self
            .http
            .post(endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| {
                SkolauthError::TokenExchangeFailed(format!("token request failed: {e}"))
            })?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            let body = resp.text().await.unwrap_or_default();
            return Err(SkolauthError::token_status(status.as_u16(), &body).into());
        }

        let body = resp.bytes().await.map_err(|e| {
            SkolauthError::TokenExchangeFailed(format!("failed to read token response: {e}"))
        })?;
        let value: Value = serde_json::from_slice(&body).map_err(|e| {
            SkolauthError::TokenExchangeFailed(format!("failed to parse token response: {e}"))
        })?;
        let tokens = TokenSet::from_value(value)?;

        tracing::info!(
            fields = tokens.as_map().len(),
            "Authorization code exchanged"
        );

        Ok(tokens)
    }
}
