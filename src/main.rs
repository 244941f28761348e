//! ipfwd - Forwarded IP manager for guest network interfaces

use anyhow::Result;
use clap::Parser;
use tracing::Level;
use tracing_subscriber::FmtSubscriber;

use ipfwd::cli::{Cli, Commands};
use ipfwd::commands;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    let log_level = if cli.verbose {
        Level::DEBUG
    } else if cli.quiet {
        Level::ERROR
    } else {
        Level::INFO
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .with_thread_ids(false)
        .without_time()
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let config = commands::load_config(&cli.config, cli.backend)?;

    match cli.command {
        Commands::Parse { addresses, json } => commands::parse::run(&addresses, json, &config),
        Commands::List {
            interface,
            primary_ip,
            json,
        } => commands::list::run(&interface, primary_ip.as_deref(), json, &config),
        Commands::Add {
            interface,
            addresses,
        } => commands::add::run(&interface, &addresses, &config),
        Commands::Remove {
            interface,
            addresses,
        } => commands::remove::run(&interface, &addresses, &config),
        Commands::Sync {
            interface,
            addresses,
            primary_ip,
            dry_run,
        } => commands::sync::run(
            &interface,
            &addresses,
            primary_ip.as_deref(),
            dry_run,
            &config,
        ),
        Commands::Detect => commands::detect::run(&config),
    }
}
