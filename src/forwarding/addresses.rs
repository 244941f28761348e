//! Direct network-stack query of interface addresses.

use std::net::{IpAddr, Ipv4Addr};

#[cfg(test)]
use mockall::automock;

/// One IPv4 address configured on an interface
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InterfaceAddress {
    pub addr: Ipv4Addr,
    pub netmask: Ipv4Addr,
}

impl InterfaceAddress {
    pub fn new(addr: Ipv4Addr, netmask: Ipv4Addr) -> Self {
        Self { addr, netmask }
    }

    /// `addr/prefix`, or `None` if the netmask is not contiguous.
    pub fn to_cidr(&self) -> Option<String> {
        ipnet::ipv4_mask_to_prefix(self.netmask)
            .ok()
            .map(|prefix| format!("{}/{}", self.addr, prefix))
    }
}

/// Source of the IPv4 addresses bound to an interface.
#[cfg_attr(test, automock)]
pub trait InterfaceAddresses: Send + Sync {
    /// Addresses on `interface`, or `None` when no such interface exists.
    fn ipv4_addresses(&self, interface: &str) -> Option<Vec<InterfaceAddress>>;
}

/// Reads interface addresses through `pnet::datalink` (getifaddrs).
#[derive(Debug, Clone, Copy, Default)]
pub struct PnetInterfaceAddresses;

impl InterfaceAddresses for PnetInterfaceAddresses {
    fn ipv4_addresses(&self, interface: &str) -> Option<Vec<InterfaceAddress>> {
        let iface = pnet::datalink::interfaces()
            .into_iter()
            .find(|i| i.name == interface)?;

        Some(
            iface
                .ips
                .iter()
                .filter_map(|network| match (network.ip(), network.mask()) {
                    (IpAddr::V4(addr), IpAddr::V4(netmask)) => {
                        Some(InterfaceAddress::new(addr, netmask))
                    }
                    _ => None,
                })
                .collect(),
        )
    }
}
