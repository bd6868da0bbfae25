//! Skolauth - OpenID Connect login for Skolengo schools
//!
//! This library implements the OAuth2 authorization code flow against
//! identity providers found through the Skolengo school directory:
//! directory search, provider discovery, authorization URL construction,
//! redirect observation on a rendering surface, and token exchange.
//!
//! # Architecture
//!
//! The library is organized into the following modules:
//!
//! - `directory`: School directory search and `TenantRecord` normalization
//! - `discovery`: OIDC well-known discovery documents
//! - `authorization`: Authorization URL construction
//! - `redirect`: Redirect observer state machine
//! - `token`: Authorization code exchange and the opaque token set
//! - `surface`: Rendering surfaces (terminal and in-process fake)
//! - `flow`: Orchestration of the whole flow
//! - `config`: Configuration management and validation
//! - `error`: Error types and result aliases
//! - `cli`: Command-line interface definition
//!
//! # Example
//!
//! ```no_run
//! use skolauth::flow::{LoginFlow, SearchOutcome, Selection};
//! use skolauth::surface::terminal::TerminalSurface;
//! use skolauth::Config;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = Config::load("config/config.yaml", &Default::default())?;
//!     config.validate()?;
//!
//!     let mut flow = LoginFlow::from_config(&config)?;
//!     if let SearchOutcome::Matches(_) = flow.search("Lycée").await {
//!         flow.select(Selection::Index(0)).await?;
//!         let tokens = flow.authorize(&mut TerminalSurface::new(true)).await?;
//!         tokens.write_to(std::io::stdout())?;
//!     }
//!     Ok(())
//! }
//! ```

pub mod authorization;
pub mod cli;
pub mod commands;
pub mod config;
pub mod directory;
pub mod discovery;
pub mod error;
pub mod flow;
pub mod http;
pub mod prompt;
pub mod redirect;
pub mod surface;
pub mod token;

// Re-export commonly used types
pub use config::{ClientRegistration, Config};
pub use directory::TenantRecord;
pub use error::{Result, SkolauthError};
pub use flow::{LoginFlow, SearchOutcome, Selection};
pub use token::TokenSet;
