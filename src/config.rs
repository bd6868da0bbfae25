//! Configuration management for Skolauth
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.
//! Defaults reproduce the Skolengo mobile application registration.

use crate::error::{Result, SkolauthError};
use serde::{Deserialize, Serialize};
use std::path::Path;
use url::Url;

/// Hard upper bound on the number of tenants kept from one search.
pub const MAX_SEARCH_RESULTS: usize = 100;

/// Main configuration structure for Skolauth
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// School directory settings
    #[serde(default)]
    pub directory: DirectoryConfig,

    /// Fixed OAuth client registration
    #[serde(default)]
    pub client: ClientRegistration,

    /// Shared HTTP client settings
    #[serde(default)]
    pub http: HttpConfig,
}

/// School directory configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectoryConfig {
    /// Search endpoint of the directory service
    #[serde(default = "default_directory_url")]
    pub base_url: String,

    /// Maximum number of tenants kept per search (at most 100)
    #[serde(default = "default_max_results")]
    pub max_results: usize,
}

fn default_directory_url() -> String {
    "https://api.skolengo.com/api/v1/bff-sko-app/schools".to_string()
}

fn default_max_results() -> usize {
    MAX_SEARCH_RESULTS
}

impl Default for DirectoryConfig {
    fn default() -> Self {
        Self {
            base_url: default_directory_url(),
            max_results: default_max_results(),
        }
    }
}

/// OAuth client registration shared by every tenant
///
/// These values are not derived from discovery. They are loaded once at
/// start-up and are read-only for the lifetime of the process.
///
/// # Examples
///
/// ```
/// use skolauth::config::ClientRegistration;
///
/// let reg = ClientRegistration::default();
/// assert_eq!(reg.scope, "openid");
/// assert_eq!(reg.response_type, "code");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientRegistration {
    /// OAuth `client_id`
    #[serde(default = "default_client_id")]
    pub client_id: String,

    /// OAuth `client_secret` sent to the token endpoint
    #[serde(default = "default_client_secret")]
    pub client_secret: String,

    /// Custom-scheme callback the provider redirects to
    #[serde(default = "default_redirect_uri")]
    pub redirect_uri: String,

    /// Requested scope
    #[serde(default = "default_scope")]
    pub scope: String,

    /// Requested response type
    #[serde(default = "default_response_type")]
    pub response_type: String,
}

fn default_client_id() -> String {
    "SkoApp.Prod.0d349217-9a4e-41ec-9af9-df9e69e09494".to_string()
}

fn default_client_secret() -> String {
    "7cb4d9a8-2580-4041-9ae8-d5803869183f".to_string()
}

fn default_redirect_uri() -> String {
    "skoapp-prod://sign-in-callback".to_string()
}

fn default_scope() -> String {
    "openid".to_string()
}

fn default_response_type() -> String {
    "code".to_string()
}

impl Default for ClientRegistration {
    fn default() -> Self {
        Self {
            client_id: default_client_id(),
            client_secret: default_client_secret(),
            redirect_uri: default_redirect_uri(),
            scope: default_scope(),
            response_type: default_response_type(),
        }
    }
}

/// HTTP client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpConfig {
    /// Per-request timeout (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    /// `User-Agent` header sent with every request
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_timeout_seconds() -> u64 {
    30
}

fn default_user_agent() -> String {
    concat!("skolauth/", env!("CARGO_PKG_VERSION")).to_string()
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: default_timeout_seconds(),
            user_agent: default_user_agent(),
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::debug!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| SkolauthError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| SkolauthError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(url) = std::env::var("SKOLAUTH_DIRECTORY_URL") {
            self.directory.base_url = url;
        }

        if let Ok(max_results) = std::env::var("SKOLAUTH_MAX_RESULTS") {
            if let Ok(value) = max_results.parse() {
                self.directory.max_results = value;
            } else {
                tracing::warn!("Invalid SKOLAUTH_MAX_RESULTS: {}", max_results);
            }
        }

        if let Ok(client_id) = std::env::var("SKOLAUTH_CLIENT_ID") {
            self.client.client_id = client_id;
        }

        if let Ok(client_secret) = std::env::var("SKOLAUTH_CLIENT_SECRET") {
            self.client.client_secret = client_secret;
        }

        if let Ok(redirect_uri) = std::env::var("SKOLAUTH_REDIRECT_URI") {
            self.client.redirect_uri = redirect_uri;
        }

        if let Ok(scope) = std::env::var("SKOLAUTH_SCOPE") {
            self.client.scope = scope;
        }

        if let Ok(timeout) = std::env::var("SKOLAUTH_HTTP_TIMEOUT") {
            if let Ok(value) = timeout.parse() {
                self.http.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid SKOLAUTH_HTTP_TIMEOUT: {}", timeout);
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(url) = &cli.directory_url {
            self.directory.base_url = url.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns [`SkolauthError::Config`] naming the first offending field
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.directory.base_url).map_err(|e| {
            SkolauthError::Config(format!(
                "directory.base_url is not a valid URL ({}): {}",
                self.directory.base_url, e
            ))
        })?;

        if self.directory.max_results == 0 || self.directory.max_results > MAX_SEARCH_RESULTS {
            return Err(SkolauthError::Config(format!(
                "directory.max_results must be between 1 and {}",
                MAX_SEARCH_RESULTS
            ))
            .into());
        }

        let required = [
            ("client.client_id", &self.client.client_id),
            ("client.client_secret", &self.client.client_secret),
            ("client.redirect_uri", &self.client.redirect_uri),
            ("client.scope", &self.client.scope),
            ("client.response_type", &self.client.response_type),
        ];
        for (name, value) in required {
            if value.trim().is_empty() {
                return Err(SkolauthError::Config(format!("{} cannot be empty", name)).into());
            }
        }

        Url::parse(&self.client.redirect_uri).map_err(|e| {
            SkolauthError::Config(format!(
                "client.redirect_uri is not a valid URI ({}): {}",
                self.client.redirect_uri, e
            ))
        })?;

        if self.http.timeout_seconds == 0 {
            return Err(SkolauthError::Config(
                "http.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        Ok(())
    }
}
