//! D-Bus proxies for the parts of the NetworkManager API the collector reads
//!
//! Reference: https://networkmanager.dev/docs/api/latest/spec.html

use std::collections::HashMap;
use zbus::proxy;
use zbus::zvariant::{OwnedObjectPath, OwnedValue};

/// Object path NetworkManager uses for "no such object"
pub(crate) const NO_OBJECT: &str = "/";

#[proxy(
    gen_blocking = false,
    interface = "org.freedesktop.NetworkManager",
    default_service = "org.freedesktop.NetworkManager",
    default_path = "/org/freedesktop/NetworkManager"
)]
pub(crate) trait NetworkManager {
    /// Realized network devices
    fn get_devices(&self) -> zbus::Result<Vec<OwnedObjectPath>>;
}

#[proxy(
    gen_blocking = false,
    interface = "org.freedesktop.NetworkManager.Device",
    default_service = "org.freedesktop.NetworkManager"
)]
pub(crate) trait Device {
    /// NMDeviceType
    #[zbus(property)]
    fn device_type(&self) -> zbus::Result<u32>;

    /// Interface carrying IP traffic for this device
    #[zbus(property)]
    fn ip_interface(&self) -> zbus::Result<String>;

    /// IPv4 configuration object, `/` when the device has none
    #[zbus(property)]
    fn ip4_config(&self) -> zbus::Result<OwnedObjectPath>;
}

#[proxy(
    gen_blocking = false,
    interface = "org.freedesktop.NetworkManager.IP4Config",
    default_service = "org.freedesktop.NetworkManager"
)]
pub(crate) trait Ip4Config {
    /// One dictionary per address, with at least `address` (s) and `prefix` (u)
    #[zbus(property)]
    fn address_data(&self) -> zbus::Result<Vec<HashMap<String, OwnedValue>>>;
}
