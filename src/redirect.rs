//! Redirect observation for the consent surface
//!
//! [`RedirectObserver`] classifies the navigation attempts reported by a
//! rendering surface while the user goes through the provider's hosted
//! consent pages. It has no knowledge of any browser toolkit: it is fed
//! `(uri, kind)` pairs and moves through
//!
//! ```text
//! Idle --begin()--> AwaitingConsent --callback--> Terminal(Code | Error)
//! ```
//!
//! A navigation is a callback when its scheme, host and path match the
//! registered redirect URI. A callback that arrives as a redirect and carries
//! a `code` query parameter completes the flow; a callback without `code`
//! fails it. Anything else keeps the observer waiting. Events seen before
//! [`RedirectObserver::begin`] or after the terminal transition are ignored,
//! so the terminal classification happens exactly once.

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{Result, SkolauthError};

/// How the rendering surface reached a URI.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NavigationKind {
    /// Ordinary top-level load
    Load,
    /// The previous request was answered with a redirect to this URI
    Redirected,
}

/// A navigation attempt reported by a rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NavigationEvent {
    /// Target URI
    pub uri: String,
    /// Load or redirect
    pub kind: NavigationKind,
}

impl NavigationEvent {
    /// Creates a [`NavigationKind::Load`] event.
    pub fn load(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            kind: NavigationKind::Load,
        }
    }

    /// Creates a [`NavigationKind::Redirected`] event.
    pub fn redirected(uri: impl Into<String>) -> Self {
        Self {
            uri: uri.into(),
            kind: NavigationKind::Redirected,
        }
    }
}

/// Classification of one observed navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedirectKind {
    /// Still inside the provider's consent pages
    Navigating,
    /// Callback carrying an authorization code
    TerminalWithCode(String),
    /// Callback without an authorization code
    TerminalWithoutCode,
}

/// A classified navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RedirectEvent {
    /// URI that was classified
    pub uri: String,
    /// Classification
    pub kind: RedirectKind,
}

/// Final outcome of a consent round.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TerminalOutcome {
    /// The provider issued an authorization code
    Code(String),
    /// The provider redirected back without a code
    Error {
        /// OAuth `error` parameter, if any
        error: Option<String>,
        /// OAuth `error_description` parameter, if any
        description: Option<String>,
    },
}

impl TerminalOutcome {
    /// Converts the outcome into the authorization code or a
    /// [`SkolauthError::AuthorizationDenied`].
    pub fn into_code(self) -> Result<String> {
        match self {
            Self::Code(code) => Ok(code),
            Self::Error { error, description } => Err(SkolauthError::AuthorizationDenied {
                error: error.unwrap_or_else(|| "missing_code".to_string()),
                description,
            }
            .into()),
        }
    }
}

/// Observer state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObserverState {
    /// Authorization URL not loaded yet
    Idle,
    /// Consent pages in progress
    AwaitingConsent,
    /// Callback observed; no further transitions
    Terminal(TerminalOutcome),
}

/// Scheme, host and path of the registered redirect URI.
#[derive(Debug, Clone, PartialEq, Eq)]
struct CallbackPrefix {
    scheme: String,
    host: Option<String>,
    path: String,
}

impl CallbackPrefix {
    fn from_url(url: &Url) -> Self {
        Self {
            scheme: url.scheme().to_ascii_lowercase(),
            host: url.host_str().map(str::to_ascii_lowercase),
            path: url.path().trim_end_matches('/').to_string(),
        }
    }

    fn matches(&self, url: &Url) -> bool {
        Self::from_url(url) == *self
    }
}

/// State machine classifying consent-surface navigations.
///
/// # Examples
///
/// ```
/// use skolauth::redirect::{NavigationEvent, ObserverState, RedirectObserver, TerminalOutcome};
///
/// let mut observer = RedirectObserver::new("myapp://callback").unwrap();
/// observer.begin();
///
/// observer.observe(&NavigationEvent::load("https://idp.example/consent"));
/// observer.observe(&NavigationEvent::redirected("myapp://callback?code=ABC123"));
///
/// assert_eq!(
///     observer.state(),
///     &ObserverState::Terminal(TerminalOutcome::Code("ABC123".to_string()))
/// );
/// ```
#[derive(Debug, Clone)]
pub struct RedirectObserver {
    callback: CallbackPrefix,
    state: ObserverState,
}

impl RedirectObserver {
    /// Creates an idle observer for the given redirect URI.
    ///
    /// # Errors
    ///
    /// Returns [`SkolauthError::InvalidRedirectUri`] if `redirect_uri` is not
    /// an absolute URI.
    pub fn new(redirect_uri: &str) -> Result<Self> {
        let url = Url::parse(redirect_uri)
            .map_err(|e| SkolauthError::InvalidRedirectUri(format!("{redirect_uri}: {e}")))?;
        Ok(Self {
            callback: CallbackPrefix::from_url(&url),
            state: ObserverState::Idle,
        })
    }

    /// Marks the start of the authorization URL load.
    ///
    /// Only moves `Idle` to `AwaitingConsent`; has no effect in other states.
    pub fn begin(&mut self) {
        if self.state == ObserverState::Idle {
            self.state = ObserverState::AwaitingConsent;
        }
    }

    /// Current state.
    pub fn state(&self) -> &ObserverState {
        &self.state
    }

    /// Whether the callback has been observed.
    pub fn is_terminal(&self) -> bool {
        matches!(self.state, ObserverState::Terminal(_))
    }

    /// Terminal outcome, once reached.
    pub fn outcome(&self) -> Option<&TerminalOutcome> {
        match &self.state {
            ObserverState::Terminal(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Feeds one navigation event.
    ///
    /// Returns `None` when the event is ignored (before [`begin`](Self::begin)
    /// or after a terminal transition), otherwise its classification.
    pub fn observe(&mut self, event: &NavigationEvent) -> Option<RedirectEvent> {
        if self.state != ObserverState::AwaitingConsent {
            tracing::trace!("Ignoring navigation in state {:?}: {}", self.state, event.uri);
            return None;
        }

        let kind = self.classify(event);
        match &kind {
            RedirectKind::Navigating => {
                tracing::debug!("Consent navigation ({:?}): {}", event.kind, event.uri);
            }
            RedirectKind::TerminalWithCode(code) => {
                tracing::info!("Received authorization code on redirect URI");
                self.state = ObserverState::Terminal(TerminalOutcome::Code(code.clone()));
            }
            RedirectKind::TerminalWithoutCode => {
                let (error, description) = error_params(&event.uri);
                tracing::warn!(
                    "Redirect URI reached without a code: error={}",
                    error.as_deref().unwrap_or("-")
                );
                self.state = ObserverState::Terminal(TerminalOutcome::Error { error, description });
            }
        }

        Some(RedirectEvent {
            uri: event.uri.clone(),
            kind,
        })
    }

    fn classify(&self, event: &NavigationEvent) -> RedirectKind {
        let Ok(url) = Url::parse(&event.uri) else {
            return RedirectKind::Navigating;
        };
        if !self.callback.matches(&url) {
            return RedirectKind::Navigating;
        }

        match query_param(&url, "code") {
            Some(code) if event.kind == NavigationKind::Redirected => {
                RedirectKind::TerminalWithCode(code)
            }
            Some(_) => RedirectKind::Navigating,
            None => RedirectKind::TerminalWithoutCode,
        }
    }
}

/// First non-empty value of `name` in the query string.
fn query_param(url: &Url, name: &str) -> Option<String> {
    url.query_pairs()
        .find(|(k, v)| k == name && !v.is_empty())
        .map(|(_, v)| v.into_owned())
}

fn error_params(uri: &str) -> (Option<String>, Option<String>) {
    match Url::parse(uri) {
        Ok(url) => (
            query_param(&url, "error"),
            query_param(&url, "error_description"),
        ),
        Err(_) => (None, None),
    }
}
