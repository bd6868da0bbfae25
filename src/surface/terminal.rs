//! Terminal rendering surface
//!
//! Custom-scheme redirect URIs such as `skoapp-prod://sign-in-callback`
//! cannot be served by a local listener, so the consent happens in the
//! user's own browser. This surface prints the authorization URL, tries to
//! open it, and then asks the user to paste the URL the browser was sent to
//! at the end of the consent (visible in the address bar or the developer
//! tools network tab).
//!
//! The pasted line becomes a single [`NavigationEvent`] of kind
//! [`NavigationKind::Redirected`]: whatever its scheme, it is the URL the
//! provider redirected the browser to. Anything other than the registered
//! callback therefore ends the consent round as abandoned.

use std::thread;

use colored::Colorize;
use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;
use crate::error::{Result, SkolauthError};
use crate::prompt::Prompt;
use crate::redirect::NavigationEvent;
use crate::surface::{NavigationStream, RenderingSurface};

/// Surface backed by the system browser and terminal input.
#[derive(Debug)]
pub struct TerminalSurface {
    open_browser: bool,
    navigation_tx: Option<mpsc::UnboundedSender<NavigationEvent>>,
}

impl TerminalSurface {
    /// Creates a terminal surface; `open_browser` controls whether the
    /// system browser is launched on load.
    pub fn new(open_browser: bool) -> Self {
        Self {
            open_browser,
            navigation_tx: None,
        }
    }

    /// Attempts to open `url` in the user's default browser.
    ///
    /// Errors are ignored; the URL is always printed as well.
    fn try_open_browser(&self, url: &str) {
        #[cfg(target_os = "macos")]
        {
            let _ = std::process::Command::new("open").arg(url).spawn();
        }
        #[cfg(target_os = "linux")]
        {
            let _ = std::process::Command::new("xdg-open").arg(url).spawn();
        }
        #[cfg(target_os = "windows")]
        {
            let _ = std::process::Command::new("cmd")
                .args(["/C", "start", "", url])
                .spawn();
        }
        #[cfg(not(any(target_os = "macos", target_os = "linux", target_os = "windows")))]
        {
            let _ = url;
        }
    }
}

/// Turns a pasted line into a navigation event.
///
/// Returns `None` for blank lines.
pub fn navigation_from_input(line: &str) -> Option<NavigationEvent> {
    let uri = line.trim();
    if uri.is_empty() {
        return None;
    }
    Some(NavigationEvent::redirected(uri))
}

/// Reads the pasted callback URL.
///
/// Only one non-blank line is read; the stream ends right after it, so no
/// reader is left waiting on the terminal once the flow moves on.
fn read_navigation(tx: mpsc::UnboundedSender<NavigationEvent>) {
    let mut prompt = match Prompt::new() {
        Ok(p) => p,
        Err(e) => {
            tracing::error!("Cannot read from terminal: {}", e);
            return;
        }
    };

    loop {
        match prompt.read_line("Callback URL> ") {
            Ok(Some(line)) => {
                if let Some(event) = navigation_from_input(&line) {
                    let _ = tx.send(event);
                    return;
                }
            }
            Ok(None) => return,
            Err(e) => {
                tracing::error!("Failed to read callback URL: {}", e);
                return;
            }
        }
    }
}

#[async_trait::async_trait]
impl RenderingSurface for TerminalSurface {
    fn subscribe(&mut self) -> Result<NavigationStream> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.navigation_tx = Some(tx);
        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }

    async fn load(&mut self, url: &str) -> Result<()> {
        let tx = self
            .navigation_tx
            .take()
            .ok_or_else(|| SkolauthError::Surface("load called before subscribe".to_string()))?;

        eprintln!(
            "\n{}\n{}\n",
            "Open the following URL in your browser and sign in:".bold(),
            url.cyan()
        );
        if self.open_browser {
            self.try_open_browser(url);
        }
        eprintln!(
            "When the browser is sent to the app callback, paste that URL below.\n"
        );

        // Not spawn_blocking: a pending read must not hold up runtime shutdown.
        thread::Builder::new()
            .name("skolauth-callback-input".to_string())
            .spawn(move || read_navigation(tx))
            .map_err(SkolauthError::Io)?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::redirect::{NavigationKind, RedirectObserver};

    #[test]
    fn test_custom_scheme_is_redirect() {
        let event = navigation_from_input("  skoapp-prod://sign-in-callback?code=abc \n").unwrap();
        assert_eq!(event.kind, NavigationKind::Redirected);
        assert_eq!(event.uri, "skoapp-prod://sign-in-callback?code=abc");
    }

    #[test]
    fn test_https_is_redirect() {
        let event = navigation_from_input("https://idp.example/consent").unwrap();
        assert_eq!(event.kind, NavigationKind::Redirected);
    }

    #[test]
    fn test_pasted_loopback_callback_completes_observer() {
        let mut observer = RedirectObserver::new("http://127.0.0.1:8080/callback").unwrap();
        observer.begin();

        let event = navigation_from_input("http://127.0.0.1:8080/callback?code=XYZ").unwrap();
        observer.observe(&event);

        assert!(observer.is_terminal());
        assert_eq!(observer.outcome().cloned().unwrap().into_code().unwrap(), "XYZ");
    }

    #[test]
    fn test_pasted_consent_page_is_not_terminal() {
        let mut observer = RedirectObserver::new("http://127.0.0.1:8080/callback").unwrap();
        observer.begin();

        observer.observe(&navigation_from_input("https://idp.example/consent").unwrap());

        assert!(!observer.is_terminal());
    }

    #[test]
    fn test_blank_line_is_skipped() {
        assert!(navigation_from_input("   ").is_none());
    }

    #[tokio::test]
    async fn test_load_before_subscribe_fails() {
        let mut surface = TerminalSurface::new(false);
        let err = surface.load("https://idp.example/a").await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SkolauthError>(),
            Some(SkolauthError::Surface(_))
        ));
    }
}
