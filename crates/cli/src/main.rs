//! Study Buddy CLI
//!
//! Main entry point for the studybuddy command-line tool.
//! Answers questions over uploaded PDFs and notes, and generates
//! question papers exported as PDF and DOCX.

mod commands;
mod session;

use clap::{Parser, Subcommand};
use commands::{AskCommand, ChatCommand, ExportCommand, IndexCommand};
use std::path::PathBuf;
use studybuddy_core::{config::AppConfig, logging, AppResult};

/// Study Buddy - document question answering and question-paper generation
#[derive(Parser, Debug)]
#[command(name = "studybuddy")]
#[command(about = "Ask questions about your study material", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "STUDYBUDDY_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "STUDYBUDDY_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    no_color: bool,

    /// LLM provider (groq, ollama)
    #[arg(short, long, global = true, env = "STUDYBUDDY_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "STUDYBUDDY_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Index documents and report what was extracted
    Index(IndexCommand),

    /// Ask one question, optionally over documents
    Ask(AskCommand),

    /// Interactive chat over uploaded documents
    Chat(ChatCommand),

    /// Render a question-paper text file to PDF and DOCX
    Export(ExportCommand),
}

#[tokio::main]
async fn main() -> AppResult<()> {
    // Parse command-line arguments first (needed for logging config)
    let cli = Cli::parse();

    // Load base configuration from environment and config file
    let mut config = AppConfig::load()?;

    // A --config given only on the command line has not been read yet
    if let Some(path) = cli.config.as_deref() {
        if config.config_file.as_deref() != Some(path) {
            config = config.merge_yaml(path)?;
        }
    }

    // A workspace given only on the command line brings its own config.yaml
    if let (Some(workspace), None) = (cli.workspace.as_ref(), cli.config.as_ref()) {
        config = config.with_workspace(workspace.clone())?;
    }

    // Apply CLI overrides
    let config = config.with_overrides(
        cli.workspace,
        cli.config,
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("Study Buddy CLI starting");
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    let command_name = match &cli.command {
        Commands::Index(_) => "index",
        Commands::Ask(_) => "ask",
        Commands::Chat(_) => "chat",
        Commands::Export(_) => "export",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Index(cmd) => cmd.execute(&config).await,
        Commands::Ask(cmd) => cmd.execute(&config).await,
        Commands::Chat(cmd) => cmd.execute(&config).await,
        Commands::Export(cmd) => cmd.execute(&config).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result
}
