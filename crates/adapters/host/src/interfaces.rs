//! Network interface lookup using the `network-interface` crate.

use std::net::IpAddr;

use network_interface::{Addr, NetworkInterface, NetworkInterfaceConfig};

use thingsync_app::ports::InterfaceAddresses;

/// [`InterfaceAddresses`] backed by the operating system's interface table.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemInterfaces;

impl InterfaceAddresses for SystemInterfaces {
    fn addresses(&self) -> Vec<IpAddr> {
        match NetworkInterface::show() {
            Ok(interfaces) => flatten(&interfaces),
            Err(err) => {
                tracing::warn!(%err, "failed to enumerate network interfaces");
                Vec::new()
            }
        }
    }
}

fn flatten(interfaces: &[NetworkInterface]) -> Vec<IpAddr> {
    interfaces
        .iter()
        .flat_map(|iface| iface.addr.iter())
        .map(|addr| match addr {
            Addr::V4(v4) => IpAddr::V4(v4.ip),
            Addr::V6(v6) => IpAddr::V6(v6.ip),
        })
        .collect()
}
