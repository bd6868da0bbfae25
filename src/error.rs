//! Error types for Skolauth
//!
//! This module defines the failure taxonomy of the login flow, using
//! `thiserror` for ergonomic error handling. Every failure is surfaced as a
//! value; no component aborts the process.

use thiserror::Error;

/// Main error type for Skolauth operations
///
/// Covers the directory search, OIDC discovery, authorization URL
/// construction, redirect observation, token exchange and the ambient
/// configuration and I/O concerns around them.
#[derive(Error, Debug)]
pub enum SkolauthError {
    /// The directory service could not be reached
    #[error("Directory unavailable: {0}")]
    DirectoryUnavailable(String),

    /// The directory service answered with a non-success status
    #[error("Directory search failed with status {status}")]
    DirectorySearchFailed {
        /// HTTP status returned by the directory
        status: u16,
    },

    /// The directory response was not the expected JSON document
    #[error("Directory response malformed: {0}")]
    DirectoryResponseMalformed(String),

    /// The discovery document could not be fetched
    #[error("Discovery unavailable for {url}: {message}")]
    DiscoveryUnavailable {
        /// Well-known URL that was requested
        url: String,
        /// Transport failure description
        message: String,
    },

    /// The discovery endpoint answered with a non-success status
    #[error("Discovery failed for {url} with status {status}")]
    DiscoveryFailed {
        /// Well-known URL that was requested
        url: String,
        /// HTTP status returned by the provider
        status: u16,
    },

    /// The discovery endpoint answered with something other than a JSON object
    #[error("Discovery document malformed: {0}")]
    DiscoveryMalformed(String),

    /// The discovery document lacks a usable `authorization_endpoint`
    #[error("Discovery document has no authorization_endpoint")]
    MissingAuthorizationEndpoint,

    /// The configured redirect URI cannot be used as a callback prefix
    #[error("Invalid redirect URI: {0}")]
    InvalidRedirectUri(String),

    /// The requested tenant is not part of the last search results
    #[error("Tenant not found in last search results: {0}")]
    TenantNotFound(String),

    /// An operation needed a selected tenant but none is active
    #[error("No authorization flow is active; select a tenant first")]
    NoActiveFlow,

    /// The identity provider redirected back without an authorization code
    #[error("Authorization denied: {error}{}", parenthesized(.description))]
    AuthorizationDenied {
        /// OAuth `error` parameter, or `missing_code` when absent
        error: String,
        /// OAuth `error_description` parameter
        description: Option<String>,
    },

    /// The rendering surface failed to load or report navigations
    #[error("Rendering surface error: {0}")]
    Surface(String),

    /// The rendering surface stopped emitting events before the callback
    #[error("Consent was abandoned before the provider redirected back")]
    ConsentAbandoned,

    /// The token endpoint could not produce a token set
    #[error("Token exchange failed: {0}")]
    TokenExchangeFailed(String),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization errors
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// YAML parsing errors
    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// HTTP client construction errors
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
}

impl SkolauthError {
    /// Builds a [`SkolauthError::TokenExchangeFailed`] for a non-success status.
    pub fn token_status(status: u16, body: &str) -> Self {
        if body.is_empty() {
            Self::TokenExchangeFailed(format!("token endpoint returned {status}"))
        } else {
            Self::TokenExchangeFailed(format!("token endpoint returned {status}: {body}"))
        }
    }
}

fn parenthesized(description: &Option<String>) -> String {
    description
        .as_deref()
        .map(|d| format!(" ({d})"))
        .unwrap_or_default()
}

/// Result type alias for Skolauth operations
///
/// Uses `anyhow::Error` so failures keep their context; the concrete
/// [`SkolauthError`] is recoverable with `downcast_ref`.
pub type Result<T> = anyhow::Result<T>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_directory_search_failed_display() {
        let error = SkolauthError::DirectorySearchFailed { status: 503 };
        assert_eq!(error.to_string(), "Directory search failed with status 503");
    }

    #[test]
    fn test_discovery_failed_display() {
        let error = SkolauthError::DiscoveryFailed {
            url: "https://idp.example/.well-known/openid-configuration".to_string(),
            status: 404,
        };
        let s = error.to_string();
        assert!(s.contains("status 404"));
        assert!(s.contains("idp.example"));
    }

    #[test]
    fn test_missing_authorization_endpoint_display() {
        let error = SkolauthError::MissingAuthorizationEndpoint;
        assert_eq!(
            error.to_string(),
            "Discovery document has no authorization_endpoint"
        );
    }

    #[test]
    fn test_authorization_denied_with_description() {
        let error = SkolauthError::AuthorizationDenied {
            error: "access_denied".to_string(),
            description: Some("user cancelled".to_string()),
        };
        assert_eq!(
            error.to_string(),
            "Authorization denied: access_denied (user cancelled)"
        );
    }

    #[test]
    fn test_authorization_denied_without_description() {
        let error = SkolauthError::AuthorizationDenied {
            error: "access_denied".to_string(),
            description: None,
        };
        assert_eq!(error.to_string(), "Authorization denied: access_denied");
    }

    #[test]
    fn test_token_status_includes_body_when_present() {
        let error = SkolauthError::token_status(400, "invalid_grant");
        assert_eq!(
            error.to_string(),
            "Token exchange failed: token endpoint returned 400: invalid_grant"
        );
        let error = SkolauthError::token_status(500, "");
        assert_eq!(
            error.to_string(),
            "Token exchange failed: token endpoint returned 500"
        );
    }

    #[test]
    fn test_config_error_display() {
        let error = SkolauthError::Config("invalid format".to_string());
        assert_eq!(error.to_string(), "Configuration error: invalid format");
    }

    #[test]
    fn test_io_error_conversion() {
        let io_error = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error: SkolauthError = io_error.into();
        assert!(matches!(error, SkolauthError::Io(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_error = serde_json::from_str::<serde_json::Value>("{invalid json}").unwrap_err();
        let error: SkolauthError = json_error.into();
        assert!(matches!(error, SkolauthError::Serialization(_)));
    }

    #[test]
    fn test_yaml_error_conversion() {
        let yaml_error = serde_yaml::from_str::<serde_yaml::Value>("invalid: : yaml").unwrap_err();
        let error: SkolauthError = yaml_error.into();
        assert!(matches!(error, SkolauthError::Yaml(_)));
    }

    #[test]
    fn test_downcast_from_anyhow() {
        let err: anyhow::Error = SkolauthError::ConsentAbandoned.into();
        assert!(matches!(
            err.downcast_ref::<SkolauthError>(),
            Some(SkolauthError::ConsentAbandoned)
        ));
    }

    #[test]
    fn test_error_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<SkolauthError>();
    }
}
