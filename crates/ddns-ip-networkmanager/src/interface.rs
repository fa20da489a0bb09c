//! OS interface address lookup
//!
//! Resolves an interface by name and returns its first IPv4 address. The
//! result is a bare host address; the netmask reported alongside it is dropped.

use ddns_core::Result;
use if_addrs::{IfAddr, Interface};
use std::net::Ipv4Addr;

/// First IPv4 address configured on `name`, if the interface exists and has one
pub fn first_ipv4(name: &str) -> Result<Option<Ipv4Addr>> {
    let interfaces = if_addrs::get_if_addrs()?;
    Ok(first_ipv4_in(&interfaces, name))
}

fn first_ipv4_in(interfaces: &[Interface], name: &str) -> Option<Ipv4Addr> {
    interfaces
        .iter()
        .filter(|iface| iface.name == name)
        .find_map(|iface| match &iface.addr {
            IfAddr::V4(v4) => Some(v4.ip),
            IfAddr::V6(_) => None,
        })
}
