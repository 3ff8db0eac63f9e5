//! Interface port — addresses of the publishing host.

use std::net::IpAddr;

/// Enumerates the host's network addresses.
pub trait InterfaceAddresses {
    /// Every address of every interface, loopback included, in the order the
    /// operating system reports them.
    fn addresses(&self) -> Vec<IpAddr>;
}

impl<T: InterfaceAddresses> InterfaceAddresses for std::sync::Arc<T> {
    fn addresses(&self) -> Vec<IpAddr> {
        (**self).addresses()
    }
}
