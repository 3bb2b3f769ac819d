//! Metacognitive Study Planner
//!
//! CLI entry point: interactive REPL by default, plus one-shot subcommands.

use std::fs;
use std::path::{Path, PathBuf};

use clap::{CommandFactory, FromArgMatches};
use eyre::{Context, Result};
use tracing::{debug, info};

use studyplanner::app::Step;
use studyplanner::cli::{Cli, Command, config_path_from_args, generate_after_help, get_log_path};
use studyplanner::config::Config;
use studyplanner::document;
use studyplanner::export;
use studyplanner::prompts::PlanMode;
use studyplanner::repl;

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    let log_path = get_log_path();
    let log_dir = log_path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));

    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;

    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => match s.to_uppercase().as_str() {
            "TRACE" => tracing::Level::TRACE,
            "DEBUG" => tracing::Level::DEBUG,
            "INFO" => tracing::Level::INFO,
            "WARN" | "WARNING" => tracing::Level::WARN,
            "ERROR" => tracing::Level::ERROR,
            _ => {
                eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
                tracing::Level::INFO
            }
        },
        None => tracing::Level::INFO,
    };

    let log_file = fs::File::create(&log_path).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    let help_config = Config::load(config_path_from_args(std::env::args()).as_ref()).unwrap_or_default();
    let cmd = Cli::command().after_help(generate_after_help(&help_config.llm));
    let cli = Cli::from_arg_matches(&cmd.get_matches())?;

    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;
    info!("Study planner loaded config: provider={} model={}", config.llm.provider, config.llm.model);

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Some(Command::Plan {
            mode,
            input,
            file,
            output,
        }) => {
            debug!(%mode, has_input = input.is_some(), ?file, ?output, "main: matched Plan command");
            let dir = output.unwrap_or_else(|| config.export.dir.clone());
            cmd_plan(&config, mode, input, file.as_deref(), &dir).await
        }
        Some(Command::Extract { file, mime }) => {
            debug!(?file, ?mime, "main: matched Extract command");
            cmd_extract(&file, mime.as_deref()).await
        }
        None => {
            debug!("main: no command specified, launching REPL");
            repl::run_interactive(&config).await
        }
    }
}

/// Generate a plan from text or a document and save it
async fn cmd_plan(config: &Config, mode: PlanMode, input: Option<String>, file: Option<&Path>, dir: &Path) -> Result<()> {
    debug!(%mode, ?file, ?dir, "cmd_plan: called");
    let mut controller = repl::build_controller(config)?;
    controller.select_mode(mode).await;

    match (input, file) {
        (_, Some(path)) => controller.load_file(path, None).await,
        (Some(text), None) => controller.set_input(text).await,
        (None, None) => {}
    }
    if let Some(error) = &controller.state().error {
        return Err(eyre::eyre!("{}", error));
    }

    eprintln!("Consulting the Metacognitive Planner...");
    controller.submit().await;

    let state = controller.state();
    if let Some(error) = &state.error {
        return Err(eyre::eyre!("{}", error));
    }
    if state.step != Step::Result {
        return Err(eyre::eyre!("No plan was produced"));
    }

    println!("{}", state.plan_result);
    let path = export::download(&state.plan_result, dir)?;
    eprintln!("Saved {}", path.display());
    Ok(())
}

/// Print a document's extracted text
async fn cmd_extract(file: &Path, mime: Option<&str>) -> Result<()> {
    debug!(?file, ?mime, "cmd_extract: called");
    let mime = mime.map(str::to_string).or_else(|| document::sniff_mime(file));
    let text = document::extract(file, mime.as_deref()).await?;
    print!("{}", text);
    Ok(())
}
