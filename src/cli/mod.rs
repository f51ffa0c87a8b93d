pub mod commands;
pub mod utils;

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};

#[derive(Parser)]
#[command(name = "noteful")]
#[command(about = "Noteful CLI - serve the API and manage its database")]
#[command(version)]
pub struct Cli {
    #[arg(long, global = true, help = "Output in JSON format")]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Run the HTTP server")]
    Serve,

    #[command(about = "Apply pending database migrations")]
    Migrate,

    #[command(about = "Replace notes, folders and tags with seed data")]
    Seed {
        #[arg(long, help = "Directory holding folders.json, tags.json and notes.json (defaults to the bundled set)")]
        dir: Option<std::path::PathBuf>,
    },

    #[command(about = "Print the Argon2id hash of a password")]
    HashPassword {
        #[arg(help = "Plaintext password")]
        password: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Text,
    Json,
}

impl OutputFormat {
    pub fn from_cli(cli: &Cli) -> Self {
        if cli.json {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        }
    }
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let output_format = OutputFormat::from_cli(&cli);
    let config = crate::config::config();

    match cli.command {
        Commands::Serve => crate::server::serve(config).await,
        Commands::Migrate => commands::db::migrate(config, output_format).await,
        Commands::Seed { dir } => commands::db::seed(config, dir, output_format).await,
        Commands::HashPassword { password } => commands::password::hash(password, output_format).await,
    }
}
