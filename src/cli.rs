//! Command-line interface definition for Skolauth
//!
//! This module defines the CLI structure using clap's derive API,
//! providing commands for directory search, the interactive login flow,
//! and the individual protocol steps.

use clap::{Parser, Subcommand};

/// Skolauth - OpenID Connect login for schools listed in the Skolengo directory
///
/// Finds a school, discovers its identity provider, lets the user consent in
/// a browser, and prints the resulting token set as JSON on stdout.
#[derive(Parser, Debug, Clone)]
#[command(name = "skolauth")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "config/config.yaml")]
    pub config: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Emit logs as JSON lines on stderr
    #[arg(long)]
    pub json_logs: bool,

    /// Override the directory search endpoint
    #[arg(long)]
    pub directory_url: Option<String>,

    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands for Skolauth
#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Search the school directory
    Search {
        /// Free-text search term (school name, city, ...)
        text: String,

        /// Print results as JSON instead of a table
        #[arg(long)]
        json: bool,
    },

    /// Run the full login flow and print the token set
    Login {
        /// Search term; prompted for when omitted
        #[arg(short, long)]
        query: Option<String>,

        /// Result index or tenant id to select; prompted for when omitted
        #[arg(short, long)]
        select: Option<String>,

        /// Do not try to open the system browser
        #[arg(long)]
        no_browser: bool,
    },

    /// Discover a provider and print its authorization URL
    AuthorizeUrl {
        /// OIDC well-known configuration URL of the tenant
        #[arg(short, long)]
        well_known: String,
    },

    /// Exchange an authorization code for a token set
    Exchange {
        /// OIDC well-known configuration URL of the tenant
        #[arg(short, long)]
        well_known: String,

        /// Authorization code returned on the redirect URI
        #[arg(long)]
        code: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

impl Default for Cli {
    fn default() -> Self {
        Self {
            config: Some("config/config.yaml".to_string()),
            verbose: false,
            json_logs: false,
            directory_url: None,
            command: Commands::Login {
                query: None,
                select: None,
                no_browser: false,
            },
        }
    }
}
