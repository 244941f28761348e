//! One-shot reconciliation of an interface against a desired address set.
//!
//! Backends only know how to query, add and remove. This module computes
//! the set difference between what is configured and what is wanted, then
//! drives the backend with it: adds first, removes second.

use serde::Serialize;
use std::collections::BTreeSet;

use crate::forwarding::ForwardingBackend;
use crate::logger::Logger;

/// Changes needed to bring an interface to its desired state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ReconcilePlan {
    /// Desired but not configured, sorted
    pub to_add: Vec<String>,
    /// Configured but not desired, sorted
    pub to_remove: Vec<String>,
}

impl ReconcilePlan {
    pub fn is_empty(&self) -> bool {
        self.to_add.is_empty() && self.to_remove.is_empty()
    }
}

/// Compute the set difference between `desired` and `configured`.
///
/// Both outputs are deduplicated and sorted lexicographically.
pub fn plan(desired: &[String], configured: &[String]) -> ReconcilePlan {
    let desired: BTreeSet<&String> = desired.iter().collect();
    let configured: BTreeSet<&String> = configured.iter().collect();

    ReconcilePlan {
        to_add: desired.difference(&configured).map(|s| s.to_string()).collect(),
        to_remove: configured.difference(&desired).map(|s| s.to_string()).collect(),
    }
}

/// Plan for `interface` without changing anything.
pub fn plan_interface(
    backend: &dyn ForwardingBackend,
    interface: &str,
    raw_desired: &[Option<String>],
    primary_ip: Option<&str>,
) -> ReconcilePlan {
    let desired = backend.parse_forwarded_ips(raw_desired);
    let configured = backend.get_forwarded_ips(interface, primary_ip);
    plan(&desired, &configured)
}

fn describe_list(ips: &[String]) -> String {
    if ips.is_empty() {
        "None".to_string()
    } else {
        ips.join(", ")
    }
}

/// Bring `interface` to the addresses in `raw_desired`.
///
/// Logs one info line when something changes. Individual add/remove
/// failures are absorbed by the backend; the next run retries them.
pub fn reconcile(
    backend: &dyn ForwardingBackend,
    logger: &dyn Logger,
    interface: &str,
    raw_desired: &[Option<String>],
    primary_ip: Option<&str>,
) -> ReconcilePlan {
    let desired = backend.parse_forwarded_ips(raw_desired);
    let configured = backend.get_forwarded_ips(interface, primary_ip);
    let changes = plan(&desired, &configured);

    if changes.is_empty() {
        return changes;
    }

    logger.info(&format!(
        "Changing {} IPs from {} to {} by adding {} and removing {}.",
        interface,
        describe_list(&configured),
        describe_list(&desired),
        describe_list(&changes.to_add),
        describe_list(&changes.to_remove),
    ));

    for address in &changes.to_add {
        backend.add_forwarded_ip(address, interface);
    }

    for address in &changes.to_remove {
        backend.remove_forwarded_ip(address, interface);
    }

    changes
}
