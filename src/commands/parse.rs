//! Parse command implementation.

use anyhow::Result;
use std::sync::Arc;

use super::{format_addresses, to_raw};
use crate::config::Config;
use crate::logger::TracingLogger;
use crate::validation::ForwardedIpParser;

/// Run the parse command
///
/// Needs neither root nor a backend: rejected entries are logged as
/// warnings and the rest are printed expanded.
pub fn run(addresses: &[String], json: bool, config: &Config) -> Result<()> {
    let parser = ForwardedIpParser::new(
        Arc::new(TracingLogger::new()),
        config.max_expanded_addresses,
    );
    let expanded = parser.parse_forwarded_ips(to_raw(addresses));

    let output = format_addresses(&expanded, json)?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}
