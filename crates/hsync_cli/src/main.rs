//! hsync CLI
//!
//! Keeps a directory of plain-text notes in sync across machines through one
//! authoritative server.
//!
//! # Commands
//!
//! - `server` - Hold the authoritative copy and merge client pushes
//! - `client` - Sync a local notes directory with the server

mod commands;

use clap::{Parser, Subcommand};
use std::net::SocketAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Sync plain-text notes through a central server.
#[derive(Parser)]
#[command(name = "hsync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(global = true, short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the sync server
    Server {
        /// Address to listen on (`:8080` binds all interfaces)
        #[arg(short, long, default_value = ":8080", value_parser = commands::server::parse_addr)]
        addr: SocketAddr,

        /// Shared key for authentication
        #[arg(short, long, default_value = hsync_protocol::DEFAULT_KEY)]
        key: String,

        /// Path to the server-side data directory
        #[arg(short, long, default_value = "data")]
        dir: PathBuf,

        /// Largest accepted document, in bytes
        #[arg(long, default_value_t = 10 * 1024 * 1024)]
        max_document_bytes: usize,
    },

    /// Run the sync client
    Client {
        /// Path to the configuration file (default: ~/.config/hsync.toml)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging; RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Server {
            addr,
            key,
            dir,
            max_document_bytes,
        } => commands::server::run(addr, key, dir, max_document_bytes),
        Commands::Client { config } => commands::client::run(config),
    }
}
