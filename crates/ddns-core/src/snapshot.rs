//! Address snapshot
//!
//! One [`AddressSnapshot`] is produced per tick and compared against the
//! previous tick's snapshot to decide whether the LAN and VPN records need
//! to be pushed.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::Ipv4Addr;

/// Addresses observed on the host at one polling tick
///
/// Each field is `None` when no matching device carried an address.
/// Equality is field-wise; the all-`None` default is the state before the
/// first tick.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AddressSnapshot {
    /// Address of the (last enumerated) Wi-Fi device
    pub wireless: Option<Ipv4Addr>,
    /// Address of the (last enumerated) Ethernet device
    pub wired: Option<Ipv4Addr>,
    /// Address of the VPN overlay tunnel
    pub tailscale: Option<Ipv4Addr>,
}

impl AddressSnapshot {
    /// Build a snapshot from its three fields
    pub fn new(
        wired: Option<Ipv4Addr>,
        wireless: Option<Ipv4Addr>,
        tailscale: Option<Ipv4Addr>,
    ) -> Self {
        Self {
            wireless,
            wired,
            tailscale,
        }
    }

    /// The LAN address to publish: wired if present, else wireless
    pub fn private_address(&self) -> Option<Ipv4Addr> {
        self.wired.or(self.wireless)
    }

    /// True when no address was observed at all
    pub fn is_empty(&self) -> bool {
        self.wired.is_none() && self.wireless.is_none() && self.tailscale.is_none()
    }
}

impl fmt::Display for AddressSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fn field(addr: &Option<Ipv4Addr>) -> String {
            addr.map(|a| a.to_string()).unwrap_or_else(|| "-".to_string())
        }

        write!(
            f,
            "wired={} wireless={} tailscale={}",
            field(&self.wired),
            field(&self.wireless),
            field(&self.tailscale)
        )
    }
}
