// # NetworkManager Address Collector
//
// This crate reads the host's wired, wireless and VPN overlay addresses from
// NetworkManager over the system D-Bus.
//
// ## How a tick's snapshot is built
//
// 1. Connect to the system bus and call `GetDevices`
//    (failure here fails the whole collection)
// 2. For each device read `DeviceType` and `IpInterface`
//    (a device whose properties cannot be read is skipped)
// 3. Resolve the device's address with the configured strategy:
//    - `interface`: first IPv4 address of the OS interface
//    - `ip4config`: first entry of the device's `IP4Config.AddressData`
// 4. Classify: Ethernet → wired, Wi-Fi → wireless, Tun named `tailscale*` → VPN.
//    When several devices share a class, the last one enumerated wins.

mod dbus;
pub mod interface;

use async_trait::async_trait;
use ddns_core::config::{AddressStrategy, CollectorConfig};
use ddns_core::traits::{AddressCollector, AddressCollectorFactory};
use ddns_core::{AddressSnapshot, Error, ProviderRegistry, Result};
use std::collections::HashMap;
use std::net::Ipv4Addr;
use zbus::Connection;
use zbus::zvariant::{OwnedObjectPath, OwnedValue, Value};

use crate::dbus::{DeviceProxy, Ip4ConfigProxy, NetworkManagerProxy, NO_OBJECT};

/// NetworkManager device classes the collector cares about
///
/// Values follow `NMDeviceType`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeviceClass {
    Ethernet,
    Wifi,
    Tun,
    Other(u32),
}

impl From<u32> for DeviceClass {
    fn from(value: u32) -> Self {
        match value {
            1 => DeviceClass::Ethernet,
            2 => DeviceClass::Wifi,
            16 => DeviceClass::Tun,
            other => DeviceClass::Other(other),
        }
    }
}

impl DeviceClass {
    fn is_relevant(self) -> bool {
        !matches!(self, DeviceClass::Other(_))
    }
}

/// What the collector learned about one device
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    pub class: DeviceClass,
    pub interface: String,
    /// `None` when no address could be resolved
    pub address: Option<Ipv4Addr>,
}

/// Fold devices, in enumeration order, into a snapshot
///
/// Devices without an address never overwrite a field. Later devices of the
/// same class replace earlier ones.
pub fn classify<I>(devices: I, vpn_interface_prefix: &str) -> AddressSnapshot
where
    I: IntoIterator<Item = DeviceInfo>,
{
    let mut snapshot = AddressSnapshot::default();

    for device in devices {
        let Some(address) = device.address else {
            continue;
        };

        match device.class {
            DeviceClass::Ethernet => snapshot.wired = Some(address),
            DeviceClass::Wifi => snapshot.wireless = Some(address),
            DeviceClass::Tun if device.interface.starts_with(vpn_interface_prefix) => {
                snapshot.tailscale = Some(address)
            }
            _ => {}
        }
    }

    snapshot
}

/// The device's IPv4 configuration object, unless NetworkManager reports none
fn ip4_config_path(path: &OwnedObjectPath) -> Option<&str> {
    Some(path.as_str()).filter(|p| *p != NO_OBJECT)
}

/// First IPv4 address in an `AddressData` property value
fn first_address_data(entries: &[HashMap<String, OwnedValue>]) -> Option<Ipv4Addr> {
    let address = entries.first()?.get("address")?;

    match &**address {
        Value::Str(s) => s.as_str().parse().ok(),
        _ => None,
    }
}

/// Address collector backed by NetworkManager
#[derive(Debug, Clone)]
pub struct NetworkManagerCollector {
    strategy: AddressStrategy,
    vpn_interface_prefix: String,
}

impl NetworkManagerCollector {
    pub fn new(strategy: AddressStrategy, vpn_interface_prefix: impl Into<String>) -> Self {
        Self {
            strategy,
            vpn_interface_prefix: vpn_interface_prefix.into(),
        }
    }

    /// Read one device; `None` means "skip it"
    async fn read_device(&self, conn: &Connection, path: &OwnedObjectPath) -> Option<DeviceInfo> {
        let device = match DeviceProxy::builder(conn).path(path.as_str()) {
            Ok(builder) => builder.build().await,
            Err(e) => Err(e),
        };
        let device = device
            .inspect_err(|e| tracing::debug!("Skipping device {}: {}", path.as_str(), e))
            .ok()?;

        let class = DeviceClass::from(
            device
                .device_type()
                .await
                .inspect_err(|e| tracing::debug!("Skipping device {}: {}", path.as_str(), e))
                .ok()?,
        );

        let interface = device
            .ip_interface()
            .await
            .inspect_err(|e| tracing::debug!("Skipping device {}: {}", path.as_str(), e))
            .ok()?;

        if !class.is_relevant() {
            return None;
        }

        let address = match self.strategy {
            AddressStrategy::Interface => interface::first_ipv4(&interface)
                .inspect_err(|e| tracing::debug!("No address for {}: {}", interface, e))
                .ok()
                .flatten(),
            AddressStrategy::Ip4Config => self.ip4_config_address(conn, &device).await,
        };

        tracing::debug!(
            "Device {} ({:?}, {}): {:?}",
            path.as_str(),
            class,
            interface,
            address
        );

        Some(DeviceInfo {
            class,
            interface,
            address,
        })
    }

    async fn ip4_config_address(
        &self,
        conn: &Connection,
        device: &DeviceProxy<'_>,
    ) -> Option<Ipv4Addr> {
        let config_path = device.ip4_config().await.ok()?;
        let config_path = ip4_config_path(&config_path)?;

        let config = Ip4ConfigProxy::builder(conn)
            .path(config_path)
            .ok()?
            .build()
            .await
            .ok()?;

        let entries = config.address_data().await.ok()?;
        first_address_data(&entries)
    }
}

#[async_trait]
impl AddressCollector for NetworkManagerCollector {
    async fn collect(&self) -> Result<AddressSnapshot> {
        let conn = Connection::system()
            .await
            .map_err(|e| Error::collector(format!("Failed to connect to system bus: {}", e)))?;

        let nm = NetworkManagerProxy::new(&conn)
            .await
            .map_err(|e| Error::collector(format!("Failed to reach NetworkManager: {}", e)))?;

        let paths = nm
            .get_devices()
            .await
            .map_err(|e| Error::collector(format!("Failed to enumerate devices: {}", e)))?;

        let mut devices = Vec::with_capacity(paths.len());
        for path in &paths {
            devices.push(self.read_device(&conn, path).await);
        }

        let snapshot = classify(devices.into_iter().flatten(), &self.vpn_interface_prefix);
        tracing::debug!("Collected {} from {} device(s)", snapshot, paths.len());

        Ok(snapshot)
    }

    fn collector_name(&self) -> &'static str {
        "networkmanager"
    }
}

/// Factory for creating NetworkManager collectors
pub struct NetworkManagerFactory;

impl AddressCollectorFactory for NetworkManagerFactory {
    fn create(&self, config: &CollectorConfig) -> Result<Box<dyn AddressCollector>> {
        match config {
            CollectorConfig::NetworkManager {
                strategy,
                vpn_interface_prefix,
            } => Ok(Box::new(NetworkManagerCollector::new(
                *strategy,
                vpn_interface_prefix.clone(),
            ))),
        }
    }
}

/// Register the NetworkManager collector with a registry
pub fn register(registry: &ProviderRegistry) {
    registry.register_collector("networkmanager", Box::new(NetworkManagerFactory));
}
