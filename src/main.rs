use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod cli;

use cli::SessionOptions;

#[derive(Parser)]
#[command(name = "illusion-progress")]
#[command(about = "Illusion Buster progress - XP, combos, streaks and badges")]
#[command(version)]
struct Cli {
    /// User whose progress to operate on (defaults to settings.default_user)
    #[arg(short, long, global = true)]
    user: Option<String>,

    /// Path to the progress database (defaults to ~/.illusion-progress/progress.db)
    #[arg(long, global = true)]
    db: Option<PathBuf>,

    /// Path to the config file (defaults to ~/.illusion-progress/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Evaluate the command at this Unix time in milliseconds
    #[arg(long, global = true)]
    at: Option<i64>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a default configuration file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },

    /// Destroy one or more illusions
    Resolve {
        /// Item ids, resolved in order
        #[arg(required = true)]
        items: Vec<String>,

        /// Base XP reward per item (defaults to settings.default_reward)
        #[arg(short, long)]
        reward: Option<i64>,
    },

    /// Reset the combo if it has lapsed
    Expire,

    /// Show level, combo, streak and badges
    Show {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },

    /// Wipe all progress for the user
    Reset {
        /// Confirm the reset
        #[arg(long)]
        yes: bool,
    },

    /// Print or write the stored snapshot as JSON
    Export {
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Replace progress with a previously exported snapshot
    Import { input: PathBuf },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .init();

    let opts = SessionOptions {
        config: cli.config.clone(),
        db: cli.db,
        user: cli.user,
        at: cli.at,
    };

    match cli.command {
        Commands::Init { force } => cli::init::init_command(cli.config, force)?,
        Commands::Resolve { items, reward } => {
            cli::progress::resolve_command(&opts, &items, reward)?
        }
        Commands::Expire => cli::progress::expire_command(&opts)?,
        Commands::Show { json } => cli::progress::show_command(&opts, json)?,
        Commands::Reset { yes } => cli::progress::reset_command(&opts, yes)?,
        Commands::Export { output } => cli::progress::export_command(&opts, output.as_deref())?,
        Commands::Import { input } => cli::progress::import_command(&opts, &input)?,
    }

    Ok(())
}
