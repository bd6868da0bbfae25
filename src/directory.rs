//! School directory search
//!
//! [`DirectoryClient`] queries the Skolengo school directory with a free-text
//! filter and normalizes each result into a [`TenantRecord`]. Each entry of
//! `data` is decoded into typed structures on its own, and entries that do
//! not decode are skipped; a record only escapes this module once its id,
//! name and discovery URL are all present.
//!
//! # Wire format
//!
//! ```text
//! GET <base>?filter[text]=<text>
//!
//! {"data": [{"id": "...", "attributes": {"name": "...", "addressLine1": ...,
//!   "addressLine2": ..., "addressLine3": ..., "zipCode": ..., "city": ...,
//!   "country": ..., "emsOIDCWellKnownUrl": "..."}}]}
//! ```

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::{DirectoryConfig, MAX_SEARCH_RESULTS};
use crate::error::{Result, SkolauthError};

/// A school resolvable through the directory, with its identity provider
/// discovery URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenantRecord {
    /// Directory identifier
    pub id: String,
    /// Display name of the school
    pub name: String,
    /// Six address fields joined by single spaces
    pub address: String,
    /// OIDC well-known configuration URL of the school's provider
    pub discovery_url: String,
}

#[derive(Debug, Deserialize)]
struct DirectoryResponse {
    data: Vec<serde_json::Value>,
}

#[derive(Debug, Deserialize)]
struct DirectoryEntry {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    attributes: Option<SchoolAttributes>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SchoolAttributes {
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    address_line1: Option<String>,
    #[serde(default)]
    address_line2: Option<String>,
    #[serde(default)]
    address_line3: Option<String>,
    #[serde(default)]
    zip_code: Option<String>,
    #[serde(default)]
    city: Option<String>,
    #[serde(default)]
    country: Option<String>,
    #[serde(default, rename = "emsOIDCWellKnownUrl")]
    ems_oidc_well_known_url: Option<String>,
}

impl SchoolAttributes {
    /// Joins the six address fields positionally; absent fields are empty
    /// segments so the separator count never changes.
    fn address(&self) -> String {
        join_address([
            self.address_line1.as_deref(),
            self.address_line2.as_deref(),
            self.address_line3.as_deref(),
            self.zip_code.as_deref(),
            self.city.as_deref(),
            self.country.as_deref(),
        ])
    }
}

/// Joins six positional address fields with single spaces.
///
/// # Examples
///
/// ```
/// use skolauth::directory::join_address;
///
/// let address = join_address([None, None, None, None, Some("Paris"), None]);
/// assert_eq!(address, "    Paris ");
/// ```
pub fn join_address(fields: [Option<&str>; 6]) -> String {
    fields.map(|f| f.unwrap_or("")).join(" ")
}

impl DirectoryEntry {
    fn into_record(self) -> Option<TenantRecord> {
        let attributes = self.attributes.unwrap_or_default();
        let address = attributes.address();
        Some(TenantRecord {
            id: self.id?,
            name: attributes.name?,
            address,
            discovery_url: attributes.ems_oidc_well_known_url?,
        })
    }
}

/// Client for the school directory search endpoint.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    http: Arc<reqwest::Client>,
    base_url: Url,
    max_results: usize,
}

impl DirectoryClient {
    /// Creates a directory client from configuration.
    ///
    /// `max_results` is clamped to the hard cap of 100.
    ///
    /// # Errors
    ///
    /// Returns [`SkolauthError::Config`] if the base URL does not parse.
    pub fn new(http: Arc<reqwest::Client>, config: &DirectoryConfig) -> Result<Self> {
        let base_url = Url::parse(&config.base_url).map_err(|e| {
            SkolauthError::Config(format!("invalid directory URL {}: {e}", config.base_url))
        })?;
        Ok(Self {
            http,
            base_url,
            max_results: config.max_results.min(MAX_SEARCH_RESULTS),
        })
    }

    /// Builds the search URL for `text`.
    fn search_url(&self, text: &str) -> Url {
        let mut url = self.base_url.clone();
        url.query_pairs_mut().append_pair("filter[text]", text);
        url
    }

    /// Searches the directory.
    ///
    /// Returns at most `max_results` records in the order the directory
    /// returned them.
    ///
    /// # Errors
    ///
    /// - [`SkolauthError::DirectoryUnavailable`] on transport failure.
    /// - [`SkolauthError::DirectorySearchFailed`] on a non-200 status.
    /// - [`SkolauthError::DirectoryResponseMalformed`] if the body is not a
    ///   JSON document with a `data` array of objects.
    pub async fn search(&self, text: &str) -> Result<Vec<TenantRecord>> {
        let url = self.search_url(text);
        tracing::debug!("Searching directory: {}", url);

        let resp = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| SkolauthError::DirectoryUnavailable(e.to_string()))?;

        let status = resp.status();
        if status != reqwest::StatusCode::OK {
            return Err(SkolauthError::DirectorySearchFailed {
                status: status.as_u16(),
            }
            .into());
        }

        let body = resp
            .bytes()
            .await
            .map_err(|e| SkolauthError::DirectoryUnavailable(e.to_string()))?;

        let records = parse_directory_response(&body, self.max_results)?;
        tracing::info!("Got {} schools for \"{}\"", records.len(), text);
        Ok(records)
    }
}

/// Decodes a directory response body into at most `limit` records.
fn parse_directory_response(body: &[u8], limit: usize) -> Result<Vec<TenantRecord>> {
    let response: DirectoryResponse = serde_json::from_slice(body)
        .map_err(|e| SkolauthError::DirectoryResponseMalformed(e.to_string()))?;

    let records = response
        .data
        .into_iter()
        .enumerate()
        .filter_map(|(index, value)| {
            let entry: DirectoryEntry = match serde_json::from_value(value) {
                Ok(entry) => entry,
                Err(e) => {
                    tracing::debug!("Skipping undecodable directory entry {}: {}", index, e);
                    return None;
                }
            };
            let record = entry.into_record();
            if record.is_none() {
                tracing::debug!("Skipping directory entry {} without id, name or discovery URL", index);
            }
            record
        })
        .inspect(|r| tracing::debug!("{} {} {} {}", r.id, r.name, r.address, r.discovery_url))
        .take(limit)
        .collect();

    Ok(records)
}
