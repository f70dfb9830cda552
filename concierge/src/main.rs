//! Concierge CLI - hotel chatbot session console.
//!
//! Runs an interactive concierge chat in the terminal, saves finished
//! sessions, and inspects downloaded transcripts.

#![allow(clippy::print_stdout)] // CLI program intentionally uses stdout

use clap::{Args, Parser, Subcommand, ValueEnum};
use concierge::error::{ConciergeError, DisplayError, ErrorContext, Result};
use concierge::prelude::*;
use std::io::{self, IsTerminal};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::Level;
use tracing_subscriber::EnvFilter;

/// Concierge - hotel chatbot session console
#[derive(Parser)]
#[command(name = "concierge")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Configuration file path
    #[arg(short, long, env = "CONCIERGE_CONFIG", global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init(InitArgs),

    /// Start an interactive chat session
    Chat(ChatArgs),

    /// Manage configuration
    Config(ConfigArgs),

    /// Parse a downloaded transcript and print its record as JSON
    Transcript(TranscriptArgs),
}

/// Arguments for the init command
#[derive(Args)]
struct InitArgs {
    /// Force overwrite existing configuration
    #[arg(short, long)]
    force: bool,
}

/// Where finished sessions are saved
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum SaveTarget {
    /// POST to the backend's /save-chat endpoint
    Http,
    /// JSON files in the sessions directory
    File,
    /// Keep in memory only
    Memory,
}

/// Arguments for the chat command
#[derive(Args)]
struct ChatArgs {
    /// Answer locally instead of calling the AI gateway
    #[arg(long)]
    offline: bool,

    /// Where to save finished sessions
    #[arg(short, long, value_enum, default_value_t = SaveTarget::Http)]
    save: SaveTarget,

    /// Backend URL (overrides config)
    #[arg(long)]
    api_url: Option<String>,

    /// Do not write transcript files on /end
    #[arg(long)]
    no_download: bool,

    /// Prompt prefix
    #[arg(short, long, default_value = "You: ")]
    prompt: String,
}

/// Arguments for the config command
#[derive(Args)]
struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommands,
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,
    /// Show configuration file path
    Path,
    /// Validate configuration
    Validate,
}

/// Arguments for the transcript command
#[derive(Args)]
struct TranscriptArgs {
    /// Transcript file (chat-<id>.txt)
    file: PathBuf,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to create tokio runtime: {e}");
            return ExitCode::FAILURE;
        }
    };

    match rt.block_on(run(cli)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!("{}", DisplayError(&e));
            ExitCode::FAILURE
        }
    }
}

/// Initialize logging with the given verbosity level.
fn init_logging(verbosity: u8) {
    let level = match verbosity {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "concierge={level},{}",
            if verbosity >= 3 { "debug" } else { "warn" }
        ))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(verbosity >= 2)
        .with_writer(io::stderr)
        .init();
}

/// Main async entry point.
async fn run(cli: Cli) -> Result<()> {
    let config_file = cli.config.unwrap_or_else(config_path);
    match cli.command {
        Commands::Init(args) => cmd_init(args, config_file).await,
        Commands::Chat(args) => cmd_chat(args, config_file).await,
        Commands::Config(args) => cmd_config(args, config_file).await,
        Commands::Transcript(args) => cmd_transcript(args).await,
    }
}

/// Load configuration with environment overrides applied.
async fn load(config_file: &std::path::Path) -> Result<ConciergeConfig> {
    let config = load_config_from(config_file)
        .await
        .with_context(|| format!("failed to load config from {}", config_file.display()))?;
    Ok(config.with_env_overrides())
}

/// Initialize configuration.
async fn cmd_init(args: InitArgs, config_file: PathBuf) -> Result<()> {
    if config_file.exists() && !args.force {
        println!("Configuration already exists at: {}", config_file.display());
        println!("Use --force to overwrite.");
        return Ok(());
    }

    init_config(&config_file)
        .await
        .context("failed to initialize config")?;

    println!("Configuration created: {}", config_file.display());
    println!();
    println!("Next steps:");
    println!("  1. set backend.apiUrl (or export CONCIERGE_API_URL=<url>)");
    println!("  2. concierge chat");

    Ok(())
}

/// Start interactive chat.
async fn cmd_chat(args: ChatArgs, config_file: PathBuf) -> Result<()> {
    let mut config = load(&config_file).await?;
    if let Some(url) = args.api_url {
        config.backend.api_url = url;
    }

    for issue in config.validate() {
        match issue.level {
            IssueLevel::Error => return Err(ConciergeError::config(issue.message)),
            IssueLevel::Warning => tracing::warn!("{issue}"),
        }
    }

    let url = config.backend.api_url.as_str();
    let timeout = config.backend.timeout();

    let completion: Box<dyn ChatCompletion> = if args.offline {
        Box::new(EchoCompletion)
    } else {
        Box::new(HttpCompletion::with_timeout(url, timeout))
    };

    let sink: Box<dyn SessionSink> = match args.save {
        SaveTarget::Http => Box::new(HttpSink::with_timeout(url, timeout)),
        SaveTarget::File => Box::new(FileSink::new(&config.storage.sessions_dir)),
        SaveTarget::Memory => Box::new(MemorySink::new()),
    };

    let mut console_config = ConsoleConfig::new().prompt(args.prompt);
    if !args.no_download {
        console_config = console_config.downloads_dir(&config.storage.downloads_dir);
    }

    tracing::info!(
        completion = completion.name(),
        sink = sink.name(),
        "starting chat"
    );

    if io::stdin().is_terminal() {
        println!("Concierge Chat | /help for commands, /quit to leave\n");
    }

    let mut engine = SessionEngine::new(config.session.engine_config());
    let stdin = io::stdin().lock();
    let stdout = io::stdout().lock();
    let mut console = Console::new(
        stdin,
        stdout,
        console_config,
        completion.as_ref(),
        sink.as_ref(),
    );
    console.run(&mut engine).await
}

/// Configuration management.
async fn cmd_config(args: ConfigArgs, config_file: PathBuf) -> Result<()> {
    match args.command {
        ConfigCommands::Path => {
            println!("{}", config_file.display());
        }
        ConfigCommands::Show => {
            let config = load(&config_file).await?;
            println!("{}", serde_json::to_string_pretty(&config)?);
            if !config_file.exists() {
                println!();
                println!("(defaults; run 'concierge init' to create a file)");
            }
        }
        ConfigCommands::Validate => {
            let config = load(&config_file).await?;
            let issues = config.validate();
            if issues.is_empty() {
                println!("Configuration is valid");
            }
            for issue in &issues {
                println!("{issue}");
            }
        }
    }

    Ok(())
}

/// Print a downloaded transcript as a JSON record.
async fn cmd_transcript(args: TranscriptArgs) -> Result<()> {
    let content = tokio::fs::read_to_string(&args.file)
        .await
        .with_context(|| format!("failed to read {}", args.file.display()))?;
    let record = parse_download(&content)?;
    println!("{}", record.to_json_pretty()?);
    Ok(())
}
