use anyhow::Result;
use clap::{Parser, Subcommand};

pub mod init;
pub mod migrate;
pub mod results;
pub mod serve;

use crate::core::AppConfig;

#[derive(Subcommand)]
enum Command {
    /// Create the database and schema
    Init {},
    /// Migrate the db schema
    Migrate {},
    /// Run the API server
    Serve {
        /// Set the server host address
        #[arg(long, default_value = "127.0.0.1")]
        host: String,

        /// Set the server port
        #[arg(long, default_value = "5000")]
        port: String,
    },
    /// Print the aggregated availability of an event as JSON
    Results {
        #[arg(long)]
        event: i64,
    },
}

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

pub async fn run() -> Result<()> {
    let args = Cli::parse();
    let config = AppConfig::default();

    // Handle each sub command
    match args.command {
        Some(Command::Init {}) => {
            init::run(&config.db_path).await?;
        }
        Some(Command::Migrate {}) => {
            migrate::run(&config.db_path).await?;
        }
        Some(Command::Serve { host, port }) => {
            serve::run(host, port, config).await?;
        }
        Some(Command::Results { event }) => {
            results::run(event, &config.db_path).await?;
        }
        None => {}
    }

    Ok(())
}
