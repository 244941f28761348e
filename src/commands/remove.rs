//! Remove command implementation.

use anyhow::Result;
use tracing::info;

use super::{ensure_well_formed, system_backend};
use crate::config::Config;
use crate::forwarding::{check_root, ForwardingBackend};
use crate::lock::InterfaceLock;

/// Remove every address from `interface`, in the order given
pub fn apply(backend: &dyn ForwardingBackend, interface: &str, addresses: &[String]) {
    for address in addresses {
        backend.remove_forwarded_ip(address, interface);
    }
}

/// Run the remove command
pub fn run(interface: &str, addresses: &[String], config: &Config) -> Result<()> {
    ensure_well_formed(addresses)?;
    check_root()?;
    let _lock = InterfaceLock::acquire(&config.lock_dir, interface)?;

    let backend = system_backend(config)?;
    apply(backend.as_ref(), interface, addresses);

    info!(
        "Requested removal of {} address(es) from {} via {}",
        addresses.len(),
        interface,
        backend.name()
    );
    Ok(())
}
