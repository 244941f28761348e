//! iproute2 backend: forwarded IPs are local routes tagged with our protocol id.

use std::sync::Arc;
use tracing::debug;

use super::{exclude_primary, ForwardingBackend};
use crate::cmd_abstraction::{args_to_strings, CommandExecutor};
use crate::logger::Logger;
use crate::runner::{ToolOptions, ToolRunner};
use crate::validation::{ForwardedIpParser, DEFAULT_MAX_EXPANSION};

/// Default route-management tool
pub const IP_COMMAND: &str = "ip";

/// Route-table backend (`ip route ... table local`)
///
/// Addresses are added and removed exactly as given: a CIDR becomes one
/// local route of that prefix, never one route per host.
pub struct IprouteBackend {
    runner: ToolRunner,
    parser: ForwardedIpParser,
    proto_id: String,
    ip_command: String,
}

impl IprouteBackend {
    pub fn new(
        logger: Arc<dyn Logger>,
        executor: Arc<dyn CommandExecutor>,
        proto_id: &str,
    ) -> Self {
        Self {
            runner: ToolRunner::new(executor, logger.clone()),
            parser: ForwardedIpParser::new(logger, DEFAULT_MAX_EXPANSION),
            proto_id: proto_id.to_string(),
            ip_command: IP_COMMAND.to_string(),
        }
    }

    pub fn with_ip_command(mut self, ip_command: &str) -> Self {
        self.ip_command = ip_command.to_string();
        self
    }

    pub fn with_max_expansion(mut self, max_expansion: u64) -> Self {
        self.parser = ForwardedIpParser::new(self.runner.logger().clone(), max_expansion);
        self
    }

    pub fn proto_id(&self) -> &str {
        &self.proto_id
    }

    /// Route options: `proto <id> scope host`, then `overrides` in order.
    pub fn create_route_options(&self, overrides: &[(&str, &str)]) -> ToolOptions {
        let mut options = ToolOptions::new()
            .with("proto", &self.proto_id)
            .with("scope", "host");
        for (key, value) in overrides {
            options.set(key, value);
        }
        options
    }

    /// Run `ip route <args> <options>` and return stdout, or "" on failure.
    fn run_ip_route(&self, args: &[&str], options: &ToolOptions) -> String {
        let mut full_args = args_to_strings(&["route"]);
        full_args.extend(args_to_strings(args));
        self.runner.run(&self.ip_command, &full_args, options)
    }
}

impl ForwardingBackend for IprouteBackend {
    fn name(&self) -> &'static str {
        "iproute"
    }

    fn parse_forwarded_ips(&self, forwarded_ips: &[Option<String>]) -> Vec<String> {
        self.parser.parse_forwarded_ips(forwarded_ips.iter().map(Option::as_deref))
    }

    fn get_forwarded_ips(&self, interface: &str, interface_ip: Option<&str>) -> Vec<String> {
        let options = self.create_route_options(&[("dev", interface)]);
        let output = self.run_ip_route(&["ls", "table", "local", "type", "local"], &options);

        let tokens = output
            .split_whitespace()
            .filter(|token| *token != "local")
            .map(Some);
        let ips = self.parser.parse_forwarded_ips(tokens);
        debug!("{} forwarded IPs routed to {}", ips.len(), interface);

        exclude_primary(ips, interface_ip)
    }

    fn add_forwarded_ip(&self, address: &str, interface: &str) {
        let options = self.create_route_options(&[("dev", interface)]);
        self.run_ip_route(&["add", "to", "local", address], &options);
    }

    fn remove_forwarded_ip(&self, address: &str, interface: &str) {
        let options = self.create_route_options(&[("dev", interface)]);
        self.run_ip_route(&["delete", "to", "local", address], &options);
    }
}
