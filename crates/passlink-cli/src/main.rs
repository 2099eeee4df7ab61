//! Passlink CLI - issue credential share links and run the gateway.
//!
//! Key management and share-link issuance happen locally with the owner's
//! secp256k1 key; `serve` runs the redemption gateway.

#![deny(unsafe_code)]
#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(unreachable_pub)]
#![deny(clippy::unwrap_used)]
#![cfg_attr(test, allow(clippy::unwrap_used))]

use std::path::PathBuf;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod theme;

use commands::{inspect, keys, serve, share};
use theme::Theme;

/// Default page that renders a shared credential.
const DEFAULT_BASE_URL: &str = "http://127.0.0.1:3003/#/verify/access";

/// Passlink - signed, view-capped credential share links
#[derive(Parser)]
#[command(name = "passlink")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Manage signing keys
    Keys {
        #[command(subcommand)]
        command: KeyCommands,
    },

    /// Issue a share link for a credential
    Share {
        /// Owner's key file
        #[arg(short, long)]
        key: PathBuf,

        /// Credential to share
        #[arg(short, long)]
        credential_id: String,

        /// How many times the link may be opened
        #[arg(short, long, value_parser = clap::value_parser!(u32).range(1..))]
        max_views: u32,

        /// Page the link points at
        #[arg(long, default_value = DEFAULT_BASE_URL)]
        base_url: String,
    },

    /// Decode a token or share link without redeeming it
    Inspect {
        /// Token text, or a full share link
        token: String,
    },

    /// Run the gateway
    Serve {
        /// Path to configuration file
        #[arg(short, long, env = "PASSLINK_CONFIG")]
        config: Option<PathBuf>,

        /// Override the bind address
        #[arg(long)]
        bind: Option<String>,

        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },
}

#[derive(Subcommand)]
enum KeyCommands {
    /// Generate a new key file
    Generate {
        /// Where to write the key
        #[arg(short, long)]
        out: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
    /// Print the address of a key file
    Address {
        /// Key file to read
        #[arg(short, long)]
        key: PathBuf,
    },
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Err(e) = dispatch(cli).await {
        eprintln!("{}", Theme::error(&format!("{e:#}")));
        std::process::exit(1);
    }
}

async fn dispatch(cli: Cli) -> Result<()> {
    if cli.verbose && !matches!(cli.command, Commands::Serve { .. }) {
        passlink_telemetry::setup_logging(&passlink_telemetry::LogConfig::new("debug"))?;
    }

    match cli.command {
        Commands::Keys { command } => match command {
            KeyCommands::Generate { out, force } => keys::generate_key(&out, force),
            KeyCommands::Address { key } => keys::show_address(&key),
        },
        Commands::Share {
            key,
            credential_id,
            max_views,
            base_url,
        } => share::issue_link(&key, &credential_id, max_views, &base_url),
        Commands::Inspect { token } => inspect::inspect_token(&token),
        Commands::Serve { config, bind, port } => {
            serve::run_gateway(config.as_deref(), bind, port, cli.verbose).await
        },
    }
}
