//! In-process fake rendering surface for tests
//!
//! [`FakeSurface::new`] returns a `(FakeSurface, FakeSurfaceHandle)` pair.
//! Wire the surface into the code under test; from the test side, use the
//! handle to see which URLs were loaded and to push navigation events.
//!
//! ```text
//! surface.load(url) -----> loaded_tx -----> handle.loaded_rx
//! handle.navigation_tx --> navigation_rx -> surface.subscribe() stream
//! ```
//!
//! A surface can also be scripted up front with
//! [`FakeSurface::scripted`]: the events are released as soon as the first
//! URL is loaded, which mirrors a browser that only starts navigating after
//! it was pointed at the authorization URL. Once loaded, the stream ends when
//! the handle is dropped.
//!
//! # Example
//!
//! ```
//! use futures::StreamExt;
//! use skolauth::redirect::NavigationEvent;
//! use skolauth::surface::fake::FakeSurface;
//! use skolauth::surface::RenderingSurface;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let (mut surface, mut handle) = FakeSurface::new();
//! let mut events = surface.subscribe().unwrap();
//!
//! surface.load("https://idp.example/authorize").await.unwrap();
//! assert_eq!(handle.loaded_rx.recv().await.unwrap(), "https://idp.example/authorize");
//!
//! handle.navigation_tx.send(NavigationEvent::load("https://idp.example/consent")).unwrap();
//! assert_eq!(events.next().await.unwrap().uri, "https://idp.example/consent");
//! # }
//! ```

use tokio::sync::mpsc;
use tokio_stream::wrappers::UnboundedReceiverStream;

use crate::error::{Result, SkolauthError};
use crate::redirect::NavigationEvent;
use crate::surface::{NavigationStream, RenderingSurface};

/// In-process fake surface.
#[derive(Debug)]
pub struct FakeSurface {
    loaded_tx: mpsc::UnboundedSender<String>,
    navigation_tx: Option<mpsc::UnboundedSender<NavigationEvent>>,
    navigation_rx: Option<mpsc::UnboundedReceiver<NavigationEvent>>,
    script: Vec<NavigationEvent>,
}

/// Test-side handle of a [`FakeSurface`].
#[derive(Debug)]
pub struct FakeSurfaceHandle {
    /// URLs passed to [`RenderingSurface::load`], in order.
    pub loaded_rx: mpsc::UnboundedReceiver<String>,
    /// Pushes navigation events into the subscribed stream.
    pub navigation_tx: mpsc::UnboundedSender<NavigationEvent>,
}

impl FakeSurface {
    /// Creates a new `(FakeSurface, FakeSurfaceHandle)` pair.
    pub fn new() -> (Self, FakeSurfaceHandle) {
        let (loaded_tx, loaded_rx) = mpsc::unbounded_channel();
        let (navigation_tx, navigation_rx) = mpsc::unbounded_channel();

        let surface = Self {
            loaded_tx,
            navigation_tx: Some(navigation_tx.clone()),
            navigation_rx: Some(navigation_rx),
            script: Vec::new(),
        };
        let handle = FakeSurfaceHandle {
            loaded_rx,
            navigation_tx,
        };

        (surface, handle)
    }

    /// Creates a surface that emits `events` once a URL is loaded.
    pub fn scripted(events: Vec<NavigationEvent>) -> (Self, FakeSurfaceHandle) {
        let (mut surface, handle) = Self::new();
        surface.script = events;
        (surface, handle)
    }
}

#[async_trait::async_trait]
impl RenderingSurface for FakeSurface {
    fn subscribe(&mut self) -> Result<NavigationStream> {
        let rx = self
            .navigation_rx
            .take()
            .ok_or_else(|| SkolauthError::Surface("fake surface already subscribed".to_string()))?;
        Ok(Box::pin(UnboundedReceiverStream::new(rx)))
    }

    async fn load(&mut self, url: &str) -> Result<()> {
        // The handle may already be gone; loading still succeeds.
        let _ = self.loaded_tx.send(url.to_string());
        // After the first load only the handle keeps the stream open.
        if let Some(tx) = self.navigation_tx.take() {
            for event in self.script.drain(..) {
                let _ = tx.send(event);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use futures::StreamExt;

    #[tokio::test]
    async fn test_scripted_events_released_on_load() {
        let (mut surface, mut handle) = FakeSurface::scripted(vec![
            NavigationEvent::load("https://idp.example/consent"),
            NavigationEvent::redirected("myapp://callback?code=1"),
        ]);
        let mut events = surface.subscribe().unwrap();

        surface.load("https://idp.example/authorize").await.unwrap();
        assert_eq!(
            handle.loaded_rx.recv().await.unwrap(),
            "https://idp.example/authorize"
        );

        assert_eq!(
            events.next().await.unwrap().uri,
            "https://idp.example/consent"
        );
        assert_eq!(
            events.next().await.unwrap(),
            NavigationEvent::redirected("myapp://callback?code=1")
        );
    }

    #[test]
    fn test_second_subscribe_fails() {
        let (mut surface, _handle) = FakeSurface::new();
        assert!(surface.subscribe().is_ok());
        assert!(surface.subscribe().is_err());
    }

    #[tokio::test]
    async fn test_stream_ends_after_load_when_handle_dropped() {
        let (mut surface, handle) =
            FakeSurface::scripted(vec![NavigationEvent::load("https://idp.example/consent")]);
        let mut events = surface.subscribe().unwrap();
        drop(handle);

        surface.load("https://idp.example/authorize").await.unwrap();
        assert!(events.next().await.is_some());
        assert!(events.next().await.is_none());
    }
}
