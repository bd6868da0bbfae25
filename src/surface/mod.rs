//! Consent rendering surfaces
//!
//! A rendering surface shows the identity provider's hosted consent pages
//! and reports where it navigates. The login flow only needs two things from
//! it, captured by the [`RenderingSurface`] trait: load a URL, and a stream
//! of [`NavigationEvent`]s tagged with their target URI and kind.
//!
//! Implementations:
//!
//! - [`terminal::TerminalSurface`] -- prints the authorization URL, tries to
//!   open the system browser and turns callback URLs pasted by the user into
//!   navigation events.
//! - [`fake::FakeSurface`] -- in-process fake driven from tests.

use std::pin::Pin;

use futures::Stream;

use crate::error::Result;
use crate::redirect::NavigationEvent;

pub mod fake;
pub mod terminal;

/// Stream of navigation events emitted by a surface.
pub type NavigationStream = Pin<Box<dyn Stream<Item = NavigationEvent> + Send + 'static>>;

/// Abstraction over anything able to render the consent pages.
///
/// The login flow subscribes before loading so no navigation is lost, then
/// consumes the stream one event at a time and drops it once the redirect
/// URI has been reached.
#[async_trait::async_trait]
pub trait RenderingSurface: Send {
    /// Returns the stream of navigation events for the next load.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot provide another stream.
    fn subscribe(&mut self) -> Result<NavigationStream>;

    /// Starts loading `url`.
    ///
    /// # Errors
    ///
    /// Returns an error if the surface cannot display the URL.
    async fn load(&mut self, url: &str) -> Result<()>;
}
