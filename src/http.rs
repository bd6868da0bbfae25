//! Shared HTTP client construction
//!
//! One [`reqwest::Client`] is built per process and shared by the directory,
//! discovery and token clients so they reuse connections and settings.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;

use crate::config::HttpConfig;
use crate::error::{Result, SkolauthError};

/// Builds the shared HTTP client from configuration.
///
/// # Errors
///
/// Returns [`SkolauthError::Config`] if the TLS backend cannot be
/// initialized or the user agent is not a valid header value.
///
/// # Examples
///
/// ```
/// use skolauth::config::HttpConfig;
/// use skolauth::http::build_client;
///
/// let client = build_client(&HttpConfig::default());
/// assert!(client.is_ok());
/// ```
pub fn build_client(config: &HttpConfig) -> Result<Arc<Client>> {
    let client = Client::builder()
        .timeout(Duration::from_secs(config.timeout_seconds))
        .user_agent(config.user_agent.as_str())
        .build()
        .map_err(|e| SkolauthError::Config(format!("Failed to create HTTP client: {}", e)))?;

    tracing::debug!(
        "Initialized HTTP client: timeout={}s, user_agent={}",
        config.timeout_seconds,
        config.user_agent
    );

    Ok(Arc::new(client))
}
