//! PeerPass command line client.

mod commands;
mod config;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use config::CliConfig;

#[derive(Parser)]
#[command(name = "peerpass", version, about = "Share files through a PeerPass relay")]
struct Cli {
    /// Relay server base URL (overrides the config file).
    #[arg(long, global = true)]
    server: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Upload a file and print its invite code.
    Send {
        /// File to share.
        file: PathBuf,
    },
    /// Download a file by invite code.
    Receive {
        /// Invite code from the sending side (1-65535).
        code: String,
        /// Directory to save into.
        #[arg(short, long, default_value = ".")]
        output: PathBuf,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("warn,peerpass=info")),
        )
        .init();

    let cli = Cli::parse();
    let config = CliConfig::load().unwrap_or_default();
    let server = cli.server.unwrap_or(config.server_url);

    let result = match cli.command {
        Command::Send { file } => commands::send(&server, &file).await,
        Command::Receive { code, output } => commands::receive(&server, &code, &output).await,
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}
