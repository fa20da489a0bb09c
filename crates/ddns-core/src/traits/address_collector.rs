// # Address Collector Trait
//
// Defines the interface for reading the host's current LAN and VPN addresses.
//
// ## Implementations
//
// - NetworkManager over D-Bus: `ddns-ip-networkmanager` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::AddressCollector;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let collector = /* AddressCollector implementation */;
//
//     let snapshot = collector.collect().await?;
//     println!("addresses: {}", snapshot);
//
//     Ok(())
// }
// ```

use crate::snapshot::AddressSnapshot;
use async_trait::async_trait;

/// Trait for address collector implementations
///
/// A collector is queried once per tick by the engine. It is an
/// **observer**: it reports what it sees and never decides whether a DNS
/// update is needed.
///
/// # Error Semantics
///
/// - Failure to reach the backing service, or to enumerate its devices,
///   is an `Err`. The engine logs it and abandons the tick.
/// - Failure to read a single device is NOT an error. That device is
///   skipped.
/// - A class of device that is absent leaves its snapshot field `None`.
#[async_trait]
pub trait AddressCollector: Send + Sync {
    /// Collect the current addresses
    ///
    /// # Returns
    ///
    /// - `Ok(AddressSnapshot)`: The addresses observed right now
    /// - `Err(Error)`: If the backing service could not be queried
    async fn collect(&self) -> Result<AddressSnapshot, crate::Error>;

    /// Get the collector name (for logging/debugging)
    fn collector_name(&self) -> &'static str;
}

/// Helper trait for constructing collectors from configuration
pub trait AddressCollectorFactory: Send + Sync {
    /// Create an AddressCollector instance from configuration
    fn create(
        &self,
        config: &crate::config::CollectorConfig,
    ) -> Result<Box<dyn AddressCollector>, crate::Error>;
}
