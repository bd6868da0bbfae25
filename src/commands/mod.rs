/*!
Command handlers for the CLI

This module provides command handlers invoked by the CLI entrypoint.

It exposes four top-level command modules:

- `search`    - Directory search, printed as a table or JSON
- `login`     - Interactive login flow ending with the token set on stdout
- `authorize` - Discovery and authorization URL for a single provider
- `exchange`  - Authorization code exchange for a single provider

Only the token set and explicitly requested results go to stdout.
*/

use crate::config::Config;
use crate::error::Result;
use crate::flow::LoginFlow;

// Result table rendering
pub mod tenants;

// Directory search command handler
pub mod search {
    //! One-shot directory search.
    //!
    //! Unlike the interactive login, a failed search is an error here.

    use super::tenants;
    use crate::config::Config;
    use crate::directory::DirectoryClient;
    use crate::error::Result;
    use crate::http::build_client;
    use colored::Colorize;
    use std::sync::Arc;

    /// Searches the directory and prints the matching tenants.
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration
    /// * `text` - Free-text filter
    /// * `json` - Print a JSON array instead of a table
    pub async fn run_search(config: Config, text: String, json: bool) -> Result<()> {
        let http = build_client(&config.http)?;
        let directory = DirectoryClient::new(Arc::clone(&http), &config.directory)?;
        let records = directory.search(&text).await?;

        if json {
            println!("{}", serde_json::to_string_pretty(&records)?);
            return Ok(());
        }

        if records.is_empty() {
            eprintln!("{}", format!("No school matches \"{text}\".").yellow());
            return Ok(());
        }

        let mut stdout = std::io::stdout().lock();
        tenants::print_tenants(&records, &mut stdout)?;
        Ok(())
    }
}

// Authorization URL command handler
pub mod authorize {
    //! Prints the authorization URL of a provider given its discovery URL.

    use super::*;

    /// Discovers the provider at `well_known` and prints its authorization
    /// URL on stdout.
    pub async fn run_authorize_url(config: Config, well_known: String) -> Result<()> {
        let mut flow = LoginFlow::from_config(&config)?;
        let active = flow.select_well_known(&well_known).await?;
        println!("{}", active.request);
        Ok(())
    }
}

// Code exchange command handler
pub mod exchange {
    //! Exchanges an authorization code obtained out of band.

    use super::*;

    /// Discovers the provider at `well_known`, exchanges `code` and prints
    /// the token set on stdout.
    pub async fn run_exchange(config: Config, well_known: String, code: String) -> Result<()> {
        let mut flow = LoginFlow::from_config(&config)?;
        flow.select_well_known(&well_known).await?;
        let tokens = flow.exchange(&code).await?;
        tokens.write_to(std::io::stdout().lock())
    }
}

// Interactive login command handler
pub mod login {
    //! Interactive login flow.
    //!
    //! Loops over search, selection and consent until a token set is
    //! obtained. Every failure is reported on stderr and the user is sent
    //! back to the search prompt. When both the query and the selection are
    //! given as flags there is nothing to ask, so the first failure is
    //! returned instead.

    use super::*;
    use crate::flow::{SearchOutcome, Selection};
    use crate::prompt::ask;
    use crate::surface::terminal::TerminalSurface;
    use colored::Colorize;

    /// Runs the login flow on the terminal surface.
    ///
    /// # Arguments
    ///
    /// * `config` - Global configuration
    /// * `query` - Search term; prompted for when `None`
    /// * `select` - Position or tenant id; prompted for when `None`
    /// * `no_browser` - Only print the authorization URL
    pub async fn run_login(
        config: Config,
        query: Option<String>,
        select: Option<String>,
        no_browser: bool,
    ) -> Result<()> {
        let interactive = query.is_none() || select.is_none();
        let mut query = query;
        let mut select = select;

        let mut flow = LoginFlow::from_config(&config)?;
        let mut surface = TerminalSurface::new(!no_browser);

        loop {
            let text = match query.take() {
                Some(text) => text,
                None => match ask("School> ").await? {
                    Some(text) if !text.is_empty() => text,
                    Some(_) => continue,
                    None => {
                        tracing::info!("Login cancelled");
                        return Ok(());
                    }
                },
            };

            match flow.search(&text).await {
                SearchOutcome::Matches(_) => {
                    tenants::print_tenants(flow.last_results(), &mut std::io::stderr())?;
                }
                SearchOutcome::NoMatches => {
                    eprintln!("{}", format!("No school matches \"{text}\".").yellow());
                    if interactive {
                        continue;
                    }
                }
                SearchOutcome::Failed(message) => {
                    eprintln!(
                        "{}",
                        format!("Directory search failed, no results: {message}").red()
                    );
                    if interactive {
                        continue;
                    }
                    return Err(anyhow::anyhow!("directory search failed: {message}"));
                }
            }

            let choice = match select.take() {
                Some(choice) => choice,
                None => match ask("Select # or id (empty to search again)> ").await? {
                    Some(choice) if !choice.is_empty() => choice,
                    Some(_) => continue,
                    None => {
                        tracing::info!("Login cancelled");
                        return Ok(());
                    }
                },
            };

            let outcome = match flow.select(Selection::parse(&choice)).await.map(|_| ()) {
                Ok(()) => flow.authorize(&mut surface).await,
                Err(e) => Err(e),
            };

            match outcome {
                Ok(tokens) => return tokens.write_to(std::io::stdout().lock()),
                Err(e) if interactive => {
                    eprintln!("{}", format!("Login failed: {e}").red());
                }
                Err(e) => return Err(e),
            }
        }
    }
}
