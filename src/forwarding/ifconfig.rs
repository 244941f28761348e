//! ifconfig backend: forwarded IPs are interface aliases.

use std::sync::Arc;
use tracing::debug;

use super::addresses::{InterfaceAddresses, PnetInterfaceAddresses};
use super::{exclude_primary, ForwardingBackend};
use crate::cmd_abstraction::CommandExecutor;
use crate::logger::Logger;
use crate::runner::{ToolOptions, ToolRunner};
use crate::validation::{to_network, ForwardedIpParser, DEFAULT_MAX_EXPANSION};

/// Default alias tool
pub const IFCONFIG_COMMAND: &str = "ifconfig";

/// Interface-alias backend (`ifconfig <iface> alias|-alias`)
///
/// Adding expands a block into one `/32` alias per address; removing only
/// drops the address written in the specification.
pub struct IfconfigBackend {
    runner: ToolRunner,
    parser: ForwardedIpParser,
    addresses: Arc<dyn InterfaceAddresses>,
    ifconfig_command: String,
}

impl IfconfigBackend {
    pub fn new(logger: Arc<dyn Logger>, executor: Arc<dyn CommandExecutor>) -> Self {
        Self {
            runner: ToolRunner::new(executor, logger.clone()),
            parser: ForwardedIpParser::new(logger, DEFAULT_MAX_EXPANSION),
            addresses: Arc::new(PnetInterfaceAddresses),
            ifconfig_command: IFCONFIG_COMMAND.to_string(),
        }
    }

    pub fn with_interface_addresses(mut self, addresses: Arc<dyn InterfaceAddresses>) -> Self {
        self.addresses = addresses;
        self
    }

    pub fn with_ifconfig_command(mut self, ifconfig_command: &str) -> Self {
        self.ifconfig_command = ifconfig_command.to_string();
        self
    }

    pub fn with_max_expansion(mut self, max_expansion: u64) -> Self {
        self.parser = ForwardedIpParser::new(self.runner.logger().clone(), max_expansion);
        self
    }

    fn run_ifconfig(&self, args: Vec<String>) -> String {
        self.runner
            .run(&self.ifconfig_command, &args, &ToolOptions::new())
    }
}

impl ForwardingBackend for IfconfigBackend {
    fn name(&self) -> &'static str {
        "ifconfig"
    }

    fn parse_forwarded_ips(&self, forwarded_ips: &[Option<String>]) -> Vec<String> {
        self.parser.parse_forwarded_ips(forwarded_ips.iter().map(Option::as_deref))
    }

    fn get_forwarded_ips(&self, interface: &str, interface_ip: Option<&str>) -> Vec<String> {
        let Some(configured) = self.addresses.ipv4_addresses(interface) else {
            debug!("Interface {} not found, no forwarded IPs", interface);
            return Vec::new();
        };

        let aliases: Vec<Option<String>> = configured
            .iter()
            .filter(|address| Some(address.addr.to_string().as_str()) != interface_ip)
            .filter_map(|address| {
                let cidr = address.to_cidr();
                if cidr.is_none() {
                    debug!(
                        "Skipping {} on {}: netmask {} is not contiguous",
                        address.addr, interface, address.netmask
                    );
                }
                cidr
            })
            .map(Some)
            .collect();

        exclude_primary(self.parse_forwarded_ips(&aliases), interface_ip)
    }

    fn add_forwarded_ip(&self, address: &str, interface: &str) {
        let ips = match self.parser.expand(address) {
            Ok(ips) => ips,
            Err(e) => {
                self.runner.logger().warning(&e.to_string());
                return;
            }
        };

        for ip in ips {
            self.run_ifconfig(vec![
                interface.to_string(),
                "alias".to_string(),
                format!("{}/32", ip),
            ]);
        }
    }

    fn remove_forwarded_ip(&self, address: &str, interface: &str) {
        let net = match to_network(address) {
            Ok(net) => net,
            Err(e) => {
                self.runner.logger().warning(&e.to_string());
                return;
            }
        };

        self.run_ifconfig(vec![
            interface.to_string(),
            "-alias".to_string(),
            net.addr().to_string(),
        ]);
    }
}
