//! List command implementation.

use anyhow::Result;

use super::{format_addresses, system_backend};
use crate::config::Config;

/// Run the list command
pub fn run(interface: &str, primary_ip: Option<&str>, json: bool, config: &Config) -> Result<()> {
    let backend = system_backend(config)?;
    let configured = backend.get_forwarded_ips(interface, primary_ip);

    let output = format_addresses(&configured, json)?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}
