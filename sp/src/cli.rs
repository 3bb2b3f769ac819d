//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

use crate::config::LlmConfig;
use crate::prompts::PlanMode;

/// Metacognitive Study Planner
#[derive(Parser)]
#[command(
    name = "sp",
    about = "Create or enhance study schedules with a metacognitive planning model",
    version = env!("CARGO_PKG_VERSION"),
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Generate a plan in one shot and save it
    Plan {
        /// create (from goals) or enhance (an existing schedule)
        #[arg(short, long)]
        mode: PlanMode,

        /// Goals or schedule text
        #[arg(short, long, conflicts_with = "file")]
        input: Option<String>,

        /// Read the goals or schedule from a document (.txt, .md, .csv, .json, .pdf, .docx)
        #[arg(short, long)]
        file: Option<PathBuf>,

        /// Directory to save metacognitive_study_plan.md into
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Print the plain text extracted from a document
    Extract {
        /// Document to read
        file: PathBuf,

        /// Declared MIME type (sniffed from the file when omitted)
        #[arg(long)]
        mime: Option<String>,
    },
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("studyplanner")
        .join("logs")
        .join("studyplanner.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Find the `--config` value in raw arguments
///
/// The help text is built before clap parses anything, so the config file it
/// reports on has to be located by hand.
pub fn config_path_from_args<I, S>(args: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut args = args.into_iter().map(Into::into);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--" => break,
            "--config" | "-c" => return args.next().map(PathBuf::from),
            other => {
                if let Some(path) = other.strip_prefix("--config=") {
                    return Some(PathBuf::from(path));
                }
            }
        }
    }
    None
}

/// Generate the after_help text with API key status and log location
pub fn generate_after_help(llm: &LlmConfig) -> String {
    debug!(api_key_env = %llm.api_key_env, "generate_after_help: called");
    let mut help = String::new();

    help.push_str("API Key:\n");
    let icon = if llm.api_key().is_some() {
        debug!("generate_after_help: api key present");
        "\u{2705}"
    } else {
        debug!("generate_after_help: api key missing");
        "\u{274C}"
    };
    help.push_str(&format!("  {} {}\n", icon, llm.api_key_env));

    help.push('\n');
    help.push_str(&format!("Logs are written to: {}\n", get_log_path().display()));

    help
}
