//! Forwarded IP backends (ip route, ifconfig).

mod addresses;
mod ifconfig;
mod iproute;

use anyhow::Result;
use std::sync::Arc;
use tracing::debug;

pub use addresses::{InterfaceAddress, InterfaceAddresses, PnetInterfaceAddresses};
pub use ifconfig::IfconfigBackend;
pub use iproute::IprouteBackend;

#[cfg(test)]
pub use addresses::MockInterfaceAddresses;

use crate::cmd_abstraction::CommandExecutor;
use crate::config::{BackendKind, Config};
use crate::error::IpfwdError;
use crate::logger::Logger;

/// Strategy for keeping forwarded IPs on an interface.
///
/// None of the operations fail: tool errors are logged through the
/// backend's logger and degrade to an empty or partial result.
pub trait ForwardingBackend: Send + Sync {
    /// Short backend name for display
    fn name(&self) -> &'static str;

    /// Validate and expand a raw forwarded IP list
    fn parse_forwarded_ips(&self, forwarded_ips: &[Option<String>]) -> Vec<String>;

    /// Forwarded IPs currently configured on `interface`, primary address excluded
    fn get_forwarded_ips(&self, interface: &str, interface_ip: Option<&str>) -> Vec<String>;

    /// Configure `address` (plain or CIDR) on `interface`
    fn add_forwarded_ip(&self, address: &str, interface: &str);

    /// Remove `address` (plain or CIDR) from `interface`
    fn remove_forwarded_ip(&self, address: &str, interface: &str);
}

/// Drop the interface's own address from a forwarded IP list.
pub(crate) fn exclude_primary(ips: Vec<String>, interface_ip: Option<&str>) -> Vec<String> {
    match interface_ip {
        Some(primary) => ips.into_iter().filter(|ip| ip != primary).collect(),
        None => ips,
    }
}

/// Detect available forwarding backend
///
/// `ip` is preferred; `ifconfig` is the fallback for systems without
/// iproute2. Only spawnability is checked.
pub fn detect_backend(executor: &dyn CommandExecutor, config: &Config) -> Result<BackendKind> {
    if executor.execute(&config.ip_command, &["-V".to_string()]).is_ok() {
        debug!("Found {}, using iproute backend", config.ip_command);
        return Ok(BackendKind::Iproute);
    }

    if executor
        .execute(&config.ifconfig_command, &["-a".to_string()])
        .is_ok()
    {
        debug!("Found {}, using ifconfig backend", config.ifconfig_command);
        return Ok(BackendKind::Ifconfig);
    }

    Err(IpfwdError::BackendNotAvailable(format!(
        "neither {} nor {} could be started",
        config.ip_command, config.ifconfig_command
    ))
    .into())
}

/// Create a forwarding backend based on configuration
pub fn create_backend(
    config: &Config,
    logger: Arc<dyn Logger>,
    executor: Arc<dyn CommandExecutor>,
) -> Result<Box<dyn ForwardingBackend>> {
    let kind = match config.backend {
        BackendKind::Auto => detect_backend(executor.as_ref(), config)?,
        other => other,
    };

    match kind {
        BackendKind::Iproute => Ok(Box::new(
            IprouteBackend::new(logger, executor, &config.proto_id)
                .with_ip_command(&config.ip_command)
                .with_max_expansion(config.max_expanded_addresses),
        )),
        BackendKind::Ifconfig => Ok(Box::new(
            IfconfigBackend::new(logger, executor)
                .with_ifconfig_command(&config.ifconfig_command)
                .with_max_expansion(config.max_expanded_addresses),
        )),
        BackendKind::Auto => unreachable!(),
    }
}

/// Check if running as root (effective UID == 0)
///
/// Changing routes and aliases needs CAP_NET_ADMIN; UID 0 covers the usual
/// case of running from a system service or sudo.
pub fn check_root() -> Result<()> {
    // SAFETY: geteuid() has no preconditions, never fails and touches no state.
    let euid = unsafe { libc::geteuid() };

    if euid != 0 {
        anyhow::bail!(
            "This operation requires root privileges. Please run with sudo.\n\
             Alternatively, ensure the process has the CAP_NET_ADMIN capability."
        )
    }
    Ok(())
}
