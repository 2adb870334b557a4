//! SyncML CLI
//!
//! Command-line tools for inspecting and replaying SyncML management
//! sessions.
//!
//! # Commands
//!
//! - `classify` - Show the phase a message's counters select
//! - `device-info` - List the device info requested at enrollment
//! - `replay` - Run JSON-encoded messages through an in-memory server

mod commands;

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// SyncML device management session tools.
#[derive(Parser)]
#[command(name = "syncml")]
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
    /// Show the phase selected by message and session ids
    Classify {
        /// Message id
        #[arg(short, long)]
        msg_id: u32,

        /// Session id
        #[arg(short, long)]
        session_id: u32,

        /// Alert data carried by the message
        #[arg(short, long)]
        alert: Option<String>,
    },

    /// List the device info operations sent at enrollment
    DeviceInfo {
        /// Output format (text, json)
        #[arg(short, long, default_value = "text")]
        format: String,
    },

    /// Replay JSON-encoded messages through an in-memory server
    Replay {
        /// Message files, in session order
        #[arg(required = true)]
        files: Vec<PathBuf>,

        /// Driver configuration (JSON)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// User the enrollment token is issued to
        #[arg(short, long, requires = "token")]
        user: Option<String>,

        /// Enrollment token to seed into the credential cache
        #[arg(short, long, requires = "user")]
        token: Option<String>,

        /// Operations (JSON array) queued for every device
        #[arg(short, long)]
        pending: Option<PathBuf>,
    },

    /// Show version information
    Version,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match cli.command {
        Commands::Classify {
            msg_id,
            session_id,
            alert,
        } => {
            commands::classify::run(msg_id, session_id, alert.as_deref());
        }
        Commands::DeviceInfo { format } => {
            commands::device_info::run(&format)?;
        }
        Commands::Replay {
            files,
            config,
            user,
            token,
            pending,
        } => {
            let options = commands::replay::ReplayOptions {
                config,
                user,
                token,
                pending,
            };
            commands::replay::run(&files, &options)?;
        }
        Commands::Version => {
            println!("SyncML CLI v{}", env!("CARGO_PKG_VERSION"));
            println!(
                "SyncML {} ({})",
                syncml_protocol::constants::SYNCML_VERSION,
                syncml_protocol::constants::SYNCML_PROTOCOL
            );
        }
    }

    Ok(())
}
