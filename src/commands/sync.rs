//! Sync command implementation.

use anyhow::Result;

use super::{system_backend, to_raw};
use crate::config::Config;
use crate::forwarding::check_root;
use crate::lock::InterfaceLock;
use crate::logger::TracingLogger;
use crate::reconcile::{plan_interface, reconcile, ReconcilePlan};

/// Human-readable summary of a plan
pub fn summarize(interface: &str, changes: &ReconcilePlan, dry_run: bool) -> String {
    if changes.is_empty() {
        return format!("{}: already up to date", interface);
    }

    let verb = if dry_run { "would add" } else { "added" };
    let verb_remove = if dry_run { "would remove" } else { "removed" };
    let mut lines = vec![format!(
        "{}: {} {}, {} {}",
        interface,
        verb,
        changes.to_add.len(),
        verb_remove,
        changes.to_remove.len()
    )];
    lines.extend(changes.to_add.iter().map(|ip| format!("  + {}", ip)));
    lines.extend(changes.to_remove.iter().map(|ip| format!("  - {}", ip)));
    lines.join("\n")
}

/// Run the sync command
pub fn run(
    interface: &str,
    addresses: &[String],
    primary_ip: Option<&str>,
    dry_run: bool,
    config: &Config,
) -> Result<()> {
    let raw = to_raw(addresses);

    if dry_run {
        let backend = system_backend(config)?;
        let changes = plan_interface(backend.as_ref(), interface, &raw, primary_ip);
        println!("{}", summarize(interface, &changes, true));
        return Ok(());
    }

    check_root()?;
    let _lock = InterfaceLock::acquire(&config.lock_dir, interface)?;

    let backend = system_backend(config)?;
    let logger = TracingLogger::new();
    let changes = reconcile(backend.as_ref(), &logger, interface, &raw, primary_ip);
    println!("{}", summarize(interface, &changes, false));
    Ok(())
}
