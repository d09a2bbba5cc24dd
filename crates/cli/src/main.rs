//! inkloop CLI: the main entry point.
//!
//! Commands:
//! - `ask`       Tool-loop agent (calculator, dog weights), one-shot or chat
//! - `research`  Function-calling research assistant with web search
//! - `essay`     Plan / research / draft / critique revision loop
//! - `search`    One web search with a synthesized answer
//! - `replay`    Render a saved essay trace
//! - `config`    Create or inspect the config file

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "inkloop",
    about = "inkloop: research and essay agents in your terminal",
    version,
    author
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Ask the action agent; interactive chat when no message is given
    Ask {
        /// Send a single message instead of entering interactive mode
        #[arg(short, long)]
        message: Option<String>,
    },

    /// Answer a question with the web-search research assistant
    Research {
        question: String,

        /// Print every message exchanged, not just the answer
        #[arg(long)]
        transcript: bool,
    },

    /// Write an essay through plan, research, draft and critique rounds
    Essay {
        /// What to write about (omit with --resume)
        task: Option<String>,

        /// Drafts allowed before the loop stops
        #[arg(long)]
        max_revisions: Option<u32>,

        /// Thread id the run is checkpointed under
        #[arg(long)]
        thread: Option<String>,

        /// Continue the run saved under --thread
        #[arg(long, requires = "thread")]
        resume: bool,

        /// Append trace records to this file as JSON lines
        #[arg(long)]
        trace_out: Option<PathBuf>,
    },

    /// Run one web search and print the answer
    Search { query: String },

    /// Render a trace file written by `essay --trace-out`
    Replay { file: PathBuf },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
enum ConfigAction {
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the effective configuration
    Show,
    /// Print the config file path
    Path,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter)),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Ask { message } => commands::ask::run(message).await?,
        Commands::Research {
            question,
            transcript,
        } => commands::research::run(&question, transcript).await?,
        Commands::Essay {
            task,
            max_revisions,
            thread,
            resume,
            trace_out,
        } => {
            commands::essay::run(commands::essay::EssayArgs {
                task,
                max_revisions,
                thread,
                resume,
                trace_out,
            })
            .await?
        }
        Commands::Search { query } => commands::search::run(&query).await?,
        Commands::Replay { file } => commands::replay::run(&file).await?,
        Commands::Config { action } => match action {
            ConfigAction::Init { force } => commands::config_cmd::init(force).await?,
            ConfigAction::Show => commands::config_cmd::show().await?,
            ConfigAction::Path => commands::config_cmd::path().await?,
        },
    }

    Ok(())
}
