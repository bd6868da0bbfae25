//! Login flow orchestration
//!
//! [`LoginFlow`] sequences the whole authorization code flow for one tenant
//! at a time:
//!
//! ```text
//! search --> select --> discovery --> authorization URL
//!        --> surface + RedirectObserver --> token exchange --> TokenSet
//! ```
//!
//! The flow owns the last directory result set and at most one
//! [`ActiveFlow`]. Selecting a tenant always discards the previous active
//! flow first, and any failure leaves no partial state behind. The client
//! registration is shared read-only.

use std::sync::Arc;

use futures::StreamExt;

use crate::authorization::{build_authorization_request, AuthorizationRequest};
use crate::config::{ClientRegistration, Config};
use crate::directory::{DirectoryClient, TenantRecord};
use crate::discovery::{DiscoveryClient, DiscoveryDocument};
use crate::error::{Result, SkolauthError};
use crate::http::build_client;
use crate::redirect::{ObserverState, RedirectObserver};
use crate::surface::RenderingSurface;
use crate::token::{TokenExchangeClient, TokenSet};

/// Result of a directory search as seen by the user.
///
/// A failed search leaves an empty result list, like a search without
/// matches, but is reported separately so callers can tell them apart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The directory returned this many tenants
    Matches(usize),
    /// The directory answered but nothing matched
    NoMatches,
    /// The directory could not be queried; carries the error message
    Failed(String),
}

/// How a tenant is picked from the last result set.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Selection<'a> {
    /// Zero-based position in the last result set
    Index(usize),
    /// Directory identifier
    Id(&'a str),
}

impl<'a> Selection<'a> {
    /// Interprets user input: a positive number is a one-based position as
    /// shown in the result table, anything else (including `0`) a tenant id.
    ///
    /// # Examples
    ///
    /// ```
    /// use skolauth::flow::Selection;
    ///
    /// assert_eq!(Selection::parse("2"), Selection::Index(1));
    /// assert_eq!(Selection::parse("0750001A"), Selection::Id("0750001A"));
    /// ```
    pub fn parse(input: &'a str) -> Self {
        let input = input.trim();
        match input.parse::<usize>() {
            Ok(n) if n > 0 => Self::Index(n - 1),
            _ => Self::Id(input),
        }
    }
}

/// State of a tenant whose provider has been discovered.
#[derive(Debug, Clone)]
pub struct ActiveFlow {
    /// Selected tenant, `None` when started from a bare discovery URL
    pub tenant: Option<TenantRecord>,
    /// Discovery document of the tenant's provider
    pub document: DiscoveryDocument,
    /// Authorization request to load on the surface
    pub request: AuthorizationRequest,
}

/// Orchestrates directory search, discovery, consent and token exchange.
#[derive(Debug)]
pub struct LoginFlow {
    directory: DirectoryClient,
    discovery: DiscoveryClient,
    tokens: TokenExchangeClient,
    registration: Arc<ClientRegistration>,
    last_results: Vec<TenantRecord>,
    active: Option<ActiveFlow>,
}

impl LoginFlow {
    /// Creates a flow from explicit clients.
    pub fn new(
        directory: DirectoryClient,
        discovery: DiscoveryClient,
        tokens: TokenExchangeClient,
        registration: Arc<ClientRegistration>,
    ) -> Self {
        Self {
            directory,
            discovery,
            tokens,
            registration,
            last_results: Vec::new(),
            active: None,
        }
    }

    /// Creates a flow whose clients share one HTTP client built from
    /// `config`.
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built or the directory
    /// URL is invalid.
    pub fn from_config(config: &Config) -> Result<Self> {
        let http = build_client(&config.http)?;
        let directory = DirectoryClient::new(Arc::clone(&http), &config.directory)?;
        let discovery = DiscoveryClient::new(Arc::clone(&http));
        let tokens = TokenExchangeClient::new(http);
        Ok(Self::new(
            directory,
            discovery,
            tokens,
            Arc::new(config.client.clone()),
        ))
    }

    /// Client registration used by this flow.
    pub fn registration(&self) -> &ClientRegistration {
        &self.registration
    }

    /// Tenants returned by the last search.
    pub fn last_results(&self) -> &[TenantRecord] {
        &self.last_results
    }

    /// Currently active flow, if a tenant has been selected.
    pub fn active(&self) -> Option<&ActiveFlow> {
        self.active.as_ref()
    }

    /// Searches the directory and replaces the last result set.
    ///
    /// Directory failures never escape: the result set is cleared and the
    /// failure is reported as [`SearchOutcome::Failed`].
    pub async fn search(&mut self, text: &str) -> SearchOutcome {
        match self.directory.search(text).await {
            Ok(records) => {
                self.last_results = records;
                if self.last_results.is_empty() {
                    SearchOutcome::NoMatches
                } else {
                    SearchOutcome::Matches(self.last_results.len())
                }
            }
            Err(e) => {
                tracing::warn!("Directory search for \"{}\" failed: {}", text, e);
                self.last_results.clear();
                SearchOutcome::Failed(e.to_string())
            }
        }
    }

    /// Selects a tenant from the last result set and discovers its provider.
    ///
    /// Any previously active flow is discarded before anything else happens.
    ///
    /// # Errors
    ///
    /// - [`SkolauthError::TenantNotFound`] if the selection matches nothing.
    /// - Discovery errors from [`DiscoveryClient::fetch`].
    /// - [`SkolauthError::MissingAuthorizationEndpoint`] from URL building.
    pub async fn select(&mut self, selection: Selection<'_>) -> Result<&ActiveFlow> {
        self.active = None;

        let tenant = match selection {
            Selection::Index(index) => self.last_results.get(index),
            Selection::Id(id) => self.last_results.iter().find(|t| t.id == id),
        }
        .cloned()
        .ok_or_else(|| {
            let wanted = match selection {
                Selection::Index(index) => format!("#{}", index.saturating_add(1)),
                Selection::Id(id) => id.to_string(),
            };
            SkolauthError::TenantNotFound(wanted)
        })?;

        tracing::info!(tenant = %tenant.id, "Selected {}", tenant.name);
        self.activate(Some(tenant.clone()), &tenant.discovery_url)
            .await
    }

    /// Starts a flow directly from a discovery URL, bypassing the directory.
    ///
    /// # Errors
    ///
    /// Same as [`select`](Self::select), minus tenant lookup.
    pub async fn select_well_known(&mut self, well_known_url: &str) -> Result<&ActiveFlow> {
        self.active = None;
        self.activate(None, well_known_url).await
    }

    async fn activate(
        &mut self,
        tenant: Option<TenantRecord>,
        well_known_url: &str,
    ) -> Result<&ActiveFlow> {
        let document = self.discovery.fetch(well_known_url).await?;
        let request = build_authorization_request(&document, &self.registration)?;
        tracing::debug!("Authorization URL: {}", request);

        Ok(&*self.active.insert(ActiveFlow {
            tenant,
            document,
            request,
        }))
    }

    /// Runs consent on `surface` and exchanges the resulting code.
    ///
    /// The surface is subscribed before the authorization URL is loaded.
    /// Navigation events are fed to a [`RedirectObserver`] one at a time;
    /// the stream is dropped as soon as the observer turns terminal. The
    /// active flow is consumed whatever the result.
    ///
    /// # Errors
    ///
    /// - [`SkolauthError::NoActiveFlow`] if no tenant is selected.
    /// - [`SkolauthError::ConsentAbandoned`] if the stream ends first.
    /// - [`SkolauthError::AuthorizationDenied`] if the callback has no code.
    /// - [`SkolauthError::TokenExchangeFailed`] from the exchange.
    pub async fn authorize<S>(&mut self, surface: &mut S) -> Result<TokenSet>
    where
        S: RenderingSurface + ?Sized,
    {
        let active = self.active.take().ok_or(SkolauthError::NoActiveFlow)?;
        let code = self.await_code(surface, &active.request).await?;
        self.exchange_code(&active.document, &code).await
    }

    /// Exchanges a code obtained out of band with the active flow's
    /// provider, consuming the active flow.
    ///
    /// # Errors
    ///
    /// [`SkolauthError::NoActiveFlow`] or any exchange error.
    pub async fn exchange(&mut self, code: &str) -> Result<TokenSet> {
        let active = self.active.take().ok_or(SkolauthError::NoActiveFlow)?;
        self.exchange_code(&active.document, code).await
    }

    async fn exchange_code(&self, document: &DiscoveryDocument, code: &str) -> Result<TokenSet> {
        self.tokens
            .exchange(document, code, &self.registration)
            .await
    }

    async fn await_code<S>(&self, surface: &mut S, request: &AuthorizationRequest) -> Result<String>
    where
        S: RenderingSurface + ?Sized,
    {
        let mut observer = RedirectObserver::new(&self.registration.redirect_uri)?;
        let mut events = surface.subscribe()?;

        observer.begin();
        surface.load(&request.url).await?;

        while let Some(event) = events.next().await {
            observer.observe(&event);
            if let ObserverState::Terminal(outcome) = observer.state() {
                drop(events);
                return outcome.clone().into_code();
            }
        }

        Err(SkolauthError::ConsentAbandoned.into())
    }
}
