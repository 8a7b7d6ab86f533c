mod commands;
mod output;

use auric::{AurApi, ClientConfig};
use clap::{Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "auric")]
#[command(author, version, about = "A fast Arch User Repository client", long_about = None)]
pub(crate) struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Override the User-Agent sent to the AUR
    #[arg(long, global = true, value_name = "AGENT")]
    user_agent: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Search package names and descriptions (^ and $ anchor the match)
    Search {
        /// Query string
        query: String,

        /// Print the results as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show the AUR record of a package
    Info {
        /// Package name
        name: String,

        /// Print the record as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show dependencies declared in package PKGBUILDs
    Deps {
        /// Package names
        #[arg(required = true)]
        names: Vec<String>,

        /// Include build dependencies
        #[arg(long)]
        make: bool,
    },

    /// Show metadata extracted from a PKGBUILD
    Pkgbuild {
        /// Package name
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        name: Option<String>,

        /// Read a local PKGBUILD instead of fetching one
        #[arg(long, value_name = "PATH")]
        file: Option<PathBuf>,

        /// Print the metadata as JSON
        #[arg(long)]
        json: bool,
    },

    /// Generate shell completion scripts
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let default_level = if cli.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    output::init_colors();

    let mut config = ClientConfig::from_env();
    if let Some(agent) = cli.user_agent {
        config = config.with_user_agent(agent);
    }
    tracing::debug!("Using AUR at {}", config.base_url);

    // Create API client
    let api = AurApi::new(config)?;

    match cli.command {
        Commands::Search { query, json } => {
            commands::search(&api, &query, json).await?;
        }
        Commands::Info { name, json } => {
            commands::info(&api, &name, json).await?;
        }
        Commands::Deps { names, make } => {
            commands::deps(&api, &names, make).await?;
        }
        Commands::Pkgbuild { name, file, json } => {
            commands::pkgbuild(&api, name.as_deref(), file.as_deref(), json).await?;
        }
        Commands::Completions { shell } => {
            commands::completions(shell);
        }
    }

    Ok(())
}
