//! Interactive REPL for the study planner
//!
//! A thin driver over the application controller: slash commands and free
//! text become controller events, and the resulting state is printed.

mod session;

pub use session::ReplSession;

use colored::Colorize;
use eyre::Result;

use crate::app::Controller;
use crate::config::Config;
use crate::llm::create_client;
use crate::session::{SessionClient, SessionSettings};

/// Build a controller wired to the configured LLM provider
pub fn build_controller(config: &Config) -> Result<Controller> {
    let llm = create_client(&config.llm).map_err(|e| eyre::eyre!("Failed to create LLM client: {}", e))?;
    let client = SessionClient::new(llm, SessionSettings::from(&config.llm))?;
    Ok(Controller::new(client))
}

/// Run the interactive REPL
///
/// This is the main entry point for `sp` with no subcommand.
pub async fn run_interactive(config: &Config) -> Result<()> {
    if let Err(e) = config.validate() {
        println!("{} {}", "Warning:".yellow(), e);
    }

    let controller = build_controller(config)?;
    let mut session = ReplSession::new(controller, config.export.dir.clone());
    session.run().await
}
