//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::config::{BackendKind, DEFAULT_CONFIG_PATH};

#[derive(Parser)]
#[command(name = "ipfwd")]
#[command(author, version, about = "Forwarded IP manager for guest network interfaces")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Config file path
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH, global = true)]
    pub config: PathBuf,

    /// Quiet mode (errors only)
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Verbose mode (debug output)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Backend override (auto, iproute, ifconfig)
    #[arg(long, value_enum, global = true)]
    pub backend: Option<BackendKind>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Validate and expand forwarded IP specifications
    Parse {
        /// Addresses (a.b.c.d or a.b.c.d/nn)
        #[arg(required = true)]
        addresses: Vec<String>,

        /// Print a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Show forwarded IPs configured on an interface
    List {
        /// Interface name
        interface: String,

        /// Interface's own address, never reported
        #[arg(long)]
        primary_ip: Option<String>,

        /// Print a JSON array
        #[arg(long)]
        json: bool,
    },

    /// Configure forwarded IPs on an interface
    Add {
        /// Interface name
        interface: String,

        /// Addresses (a.b.c.d or a.b.c.d/nn)
        #[arg(required = true)]
        addresses: Vec<String>,
    },

    /// Remove forwarded IPs from an interface
    Remove {
        /// Interface name
        interface: String,

        /// Addresses (a.b.c.d or a.b.c.d/nn)
        #[arg(required = true)]
        addresses: Vec<String>,
    },

    /// Make an interface carry exactly the given forwarded IPs
    Sync {
        /// Interface name
        interface: String,

        /// Desired addresses; none removes every forwarded IP
        addresses: Vec<String>,

        /// Interface's own address, never removed
        #[arg(long)]
        primary_ip: Option<String>,

        /// Show the changes without applying them
        #[arg(long)]
        dry_run: bool,
    },

    /// Show which backend would be used
    Detect,
}
