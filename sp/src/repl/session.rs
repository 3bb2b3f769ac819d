//! REPL session management

use std::future::Future;
use std::path::PathBuf;
use std::time::Duration;

use colored::Colorize;
use eyre::Result;
use rustyline::DefaultEditor;
use rustyline::error::ReadlineError;
use tracing::debug;

use crate::app::{AppState, Controller, LOADING_MESSAGES, Step};
use crate::document::ACCEPTED_EXTENSIONS;
use crate::export;
use crate::prompts::PlanMode;

/// How often the loading line rotates
const LOADING_INTERVAL: Duration = Duration::from_secs(3);

/// Interactive planner session
pub struct ReplSession {
    controller: Controller,
    export_dir: PathBuf,
}

impl ReplSession {
    pub fn new(controller: Controller, export_dir: PathBuf) -> Self {
        Self { controller, export_dir }
    }

    /// Run the REPL main loop
    pub async fn run(&mut self) -> Result<()> {
        self.print_welcome();

        let mut rl = DefaultEditor::new().map_err(|e| eyre::eyre!("Failed to initialize readline: {}", e))?;

        loop {
            let readline = rl.readline(&self.prompt());

            match readline {
                Ok(line) => {
                    let line = line.trim_end_matches(['\r', '\n']);
                    let command = line.trim();

                    if command.starts_with('/') {
                        let _ = rl.add_history_entry(command);
                        match self.handle_slash_command(command).await {
                            SlashResult::Continue => continue,
                            SlashResult::Quit => break,
                        }
                    }

                    if !command.is_empty() {
                        let _ = rl.add_history_entry(line);
                    }
                    self.handle_text(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!();
                    break;
                }
                Err(err) => {
                    return Err(eyre::eyre!("Readline error: {}", err));
                }
            }
        }

        println!("Goodbye!");
        Ok(())
    }

    fn state(&self) -> &AppState {
        self.controller.state()
    }

    fn prompt(&self) -> String {
        let label = match (self.state().step, self.state().mode) {
            (Step::Result, _) => "refine",
            (_, Some(PlanMode::Create)) => "create",
            (_, Some(PlanMode::Enhance)) => "enhance",
            (_, None) => "",
        };
        format!("{}{} ", label.bright_blue(), ">".bright_green())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "Metacognitive Study Planner".bright_cyan().bold());
        println!("Study smarter with plans grounded in how learning works.");
        println!();
        println!("  {:14} Build a new schedule from your goals", "/create".yellow());
        println!("  {:14} Improve an existing schedule", "/enhance".yellow());
        println!();
        println!("Type {} for help, {} to quit", "/help".yellow(), "/quit".yellow());
        println!();
    }

    async fn handle_slash_command(&mut self, input: &str) -> SlashResult {
        let (cmd, arg) = match input.split_once(char::is_whitespace) {
            Some((cmd, rest)) => (cmd, rest.trim()),
            None => (input, ""),
        };
        debug!(%cmd, %arg, step = ?self.state().step, "handle_slash_command: called");

        match cmd {
            "/help" | "/h" => self.print_help(),
            "/quit" | "/q" | "/exit" => return SlashResult::Quit,
            "/create" => self.select_mode(PlanMode::Create).await,
            "/enhance" => self.select_mode(PlanMode::Enhance).await,
            "/reset" => {
                self.controller.reset().await;
                println!("{}", "Started over.".dimmed());
                self.print_welcome();
            }
            "/file" if self.state().step == Step::Input => self.load_file(arg).await,
            "/show" if self.state().step == Step::Input => self.print_input(),
            "/clear" if self.state().step == Step::Input => {
                self.controller.set_input(String::new()).await;
                println!("{}", "Input cleared.".dimmed());
            }
            "/submit" if self.state().step == Step::Input => self.submit().await,
            "/plan" if self.state().step == Step::Result => self.print_plan(),
            "/download" if self.state().step == Step::Result => self.download(arg),
            "/file" | "/show" | "/clear" | "/submit" | "/plan" | "/download" => {
                println!("{} {} is not available right now", "?".yellow(), cmd);
            }
            _ => {
                println!("{} Unknown command: {}", "?".yellow(), cmd);
                println!("Type {} for available commands", "/help".yellow());
            }
        }
        SlashResult::Continue
    }

    /// Handle a non-command line
    ///
    /// In the input step the line is kept exactly as typed, blank lines
    /// included. Elsewhere blank lines are ignored.
    async fn handle_text(&mut self, text: &str) {
        let blank = text.trim().is_empty();
        match self.state().step {
            Step::Input => {
                let input = append_line(&self.state().user_input, text);
                self.controller.set_input(input).await;
            }
            _ if blank => {}
            Step::Welcome => {
                println!("Choose {} or {} to begin.", "/create".yellow(), "/enhance".yellow());
            }
            Step::Processing => {}
            Step::Result => {
                with_loading(self.controller.refine(text)).await;
                self.print_outcome();
            }
        }
    }

    async fn select_mode(&mut self, mode: PlanMode) {
        self.controller.select_mode(mode).await;
        println!();
        println!("{}", mode.input_title().bright_cyan().bold());
        println!("{}", mode.input_hint().dimmed());
        println!(
            "Type lines of text, {} to load a document, then {}",
            "/file <path>".yellow(),
            "/submit".yellow()
        );
        println!();
    }

    async fn load_file(&mut self, arg: &str) {
        if arg.is_empty() {
            println!(
                "{} Usage: /file <path>  ({})",
                "?".yellow(),
                ACCEPTED_EXTENSIONS.iter().map(|e| format!(".{e}")).collect::<Vec<_>>().join(", ")
            );
            return;
        }

        let path = PathBuf::from(arg);
        println!("{}", "Reading file...".dimmed());
        self.controller.load_file(&path, None).await;

        match &self.state().error {
            Some(error) => println!("{} {}", "Error:".red(), error),
            None => println!(
                "{} Loaded {} ({} chars)",
                "\u{2713}".green(),
                path.display(),
                self.state().user_input.chars().count()
            ),
        }
    }

    async fn submit(&mut self) {
        with_loading(self.controller.submit()).await;
        self.print_outcome();
    }

    /// Print the error or the current plan after a request
    fn print_outcome(&self) {
        match &self.state().error {
            Some(error) => println!("{} {}", "Error:".red(), error),
            None if self.state().step == Step::Result => {
                self.print_plan();
                println!(
                    "Type a refinement, {} to save, or {} to start over",
                    "/download".yellow(),
                    "/reset".yellow()
                );
            }
            None => {}
        }
    }

    fn print_input(&self) {
        let input = &self.state().user_input;
        if input.is_empty() {
            println!("{}", "No input yet.".dimmed());
        } else {
            println!();
            println!("{}", input);
            println!();
        }
    }

    fn print_plan(&self) {
        println!();
        println!("{}", "Your Metacognitive Plan".bright_cyan().bold());
        println!();
        println!("{}", self.state().plan_result);
        println!();
    }

    fn download(&self, arg: &str) {
        let dir = if arg.is_empty() {
            self.export_dir.clone()
        } else {
            PathBuf::from(arg)
        };
        match export::download(&self.state().plan_result, &dir) {
            Ok(path) => println!("{} Saved {}", "\u{2713}".green(), path.display()),
            Err(e) => println!("{} {:#}", "Error:".red(), e),
        }
    }

    fn print_help(&self) {
        println!();
        println!("{}", "Available Commands:".bright_cyan());
        println!("  {:18} Build a new schedule from your goals", "/create".yellow());
        println!("  {:18} Improve an existing schedule", "/enhance".yellow());
        println!("  {:18} Load a document into the input", "/file <path>".yellow());
        println!("  {:18} Show the input collected so far", "/show".yellow());
        println!("  {:18} Clear the input", "/clear".yellow());
        println!("  {:18} Send the input to the planner", "/submit".yellow());
        println!("  {:18} Show the current plan", "/plan".yellow());
        println!("  {:18} Save the plan as markdown", "/download [dir]".yellow());
        println!("  {:18} Start over", "/reset".yellow());
        println!("  {:18} Show this help", "/help".yellow());
        println!("  {:18} Exit", "/quit".yellow());
        println!();
        println!("While a plan is shown, any other text is sent as a refinement.");
        println!();
    }
}

/// Drive a request while printing a rotating status line
async fn with_loading<F: Future>(request: F) -> F::Output {
    tokio::pin!(request);
    let mut ticker = tokio::time::interval(LOADING_INTERVAL);
    let mut index = 0;

    loop {
        tokio::select! {
            output = &mut request => return output,
            _ = ticker.tick() => {
                println!("{}", LOADING_MESSAGES[index % LOADING_MESSAGES.len()].dimmed());
                index += 1;
            }
        }
    }
}

/// Append one typed line to the input buffer, newline-separated
fn append_line(buffer: &str, line: &str) -> String {
    if buffer.is_empty() {
        line.to_string()
    } else {
        format!("{}\n{}", buffer, line)
    }
}

/// Result of handling a slash command
enum SlashResult {
    Continue,
    Quit,
}
