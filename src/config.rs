// src/config.rs

use std::net::SocketAddr;
use std::path::PathBuf;

use clap::Parser;

/// Command-line configuration.
#[derive(Parser, Debug)]
#[command(name = "chat-relay", version, about = "Real-time broadcast chat server")]
pub struct Config {
    /// Address to listen on.
    #[arg(long, default_value = "0.0.0.0:8080")]
    pub bind: SocketAddr,

    /// Path of the durable archive snapshot file.
    #[arg(long, default_value = "archive.json")]
    pub snapshot_path: PathBuf,

    /// Seconds between archive snapshots.
    #[arg(long, default_value_t = 15)]
    pub snapshot_interval: u64,
}
