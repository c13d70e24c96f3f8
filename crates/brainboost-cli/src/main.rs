//! brainboost CLI: play the training games from a terminal.

use std::path::PathBuf;
use std::process;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "brainboost",
    version,
    about = "Arithmetic and memory training games"
)]
struct Cli {
    /// Config file path
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Data file path (overrides the config)
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a starter brainboost.toml
    Init,

    /// Register a new player
    Register {
        #[arg(long)]
        username: String,

        /// Word-list language: en, pl
        #[arg(long)]
        language: Option<String>,
    },

    /// Play a game
    Play {
        #[command(subcommand)]
        game: PlayCommand,
    },

    /// Show levels, points and recent rounds of a player
    Stats {
        #[arg(long)]
        username: String,

        /// Number of recent rounds to show
        #[arg(long, default_value = "10")]
        limit: usize,

        /// Output format: text, json
        #[arg(long, default_value = "text")]
        format: String,
    },

    /// Check a word-list file
    Words {
        /// One noun per line
        #[arg(long)]
        file: PathBuf,
    },
}

#[derive(Subcommand)]
enum PlayCommand {
    /// Keep the running result in range
    ResultKeeper {
        #[arg(long)]
        username: String,

        /// Seed for a reproducible play
        #[arg(long)]
        seed: Option<u64>,
    },

    /// Memorize nouns, then recall them in order
    Recall {
        #[arg(long)]
        username: String,

        /// Seed for a reproducible play
        #[arg(long)]
        seed: Option<u64>,

        /// Word-list language: en, pl (defaults to the player's)
        #[arg(long)]
        language: Option<String>,
    },
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("brainboost=info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let paths = commands::Paths {
        config: cli.config,
        data: cli.data,
    };

    let result = match cli.command {
        Commands::Init => commands::init::execute(),
        Commands::Register { username, language } => {
            commands::register::execute(&paths, username, language)
        }
        Commands::Play { game } => match game {
            PlayCommand::ResultKeeper { username, seed } => {
                commands::play::result_keeper(&paths, username, seed)
            }
            PlayCommand::Recall {
                username,
                seed,
                language,
            } => commands::play::recall(&paths, username, seed, language),
        },
        Commands::Stats {
            username,
            limit,
            format,
        } => commands::stats::execute(&paths, username, limit, format),
        Commands::Words { file } => commands::words::execute(file),
    };

    if let Err(e) = result {
        eprintln!("Error: {e:#}");
        process::exit(1);
    }
}
