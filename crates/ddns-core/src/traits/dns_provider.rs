// # DNS Provider Trait
//
// Defines the interface for pushing an address to a dynamic-DNS provider.
//
// ## Implementations
//
// - DuckDNS: `ddns-provider-duckdns` crate
//
// ## Usage
//
// ```rust,ignore
// use ddns_core::DnsProvider;
//
// #[tokio::main]
// async fn main() -> anyhow::Result<()> {
//     let provider = /* DnsProvider implementation */;
//
//     // Let the provider use the request's source address
//     provider.update("peeche.duckdns.org", None).await?;
//
//     // Publish an explicit address
//     provider.update(
//         "dekh.duckdns.org",
//         Some(std::net::IpAddr::from([192, 168, 1, 5])),
//     ).await?;
//
//     Ok(())
// }
// ```

use async_trait::async_trait;
use std::net::IpAddr;

/// Trait for DNS provider implementations
///
/// # Single-shot
///
/// Each call issues exactly one request to the provider. Providers do not
/// retry, sleep, or remember previous calls: the engine simply tries again
/// on its next tick.
///
/// # Public Address
///
/// `ip == None` means "use the address the request arrives from". This is
/// how the host's internet-facing address is published.
#[async_trait]
pub trait DnsProvider: Send + Sync {
    /// Update a hostname
    ///
    /// # Parameters
    ///
    /// - `hostname`: The hostname to update (e.g., "dekh.duckdns.org")
    /// - `ip`: The address to set, or `None` for the request's source address
    ///
    /// # Returns
    ///
    /// - `Ok(())`: The provider acknowledged the update
    /// - `Err(Error)`: Transport failure or a non-success answer
    async fn update(&self, hostname: &str, ip: Option<IpAddr>) -> Result<(), crate::Error>;

    /// Get the provider name (for logging/debugging)
    fn provider_name(&self) -> &'static str;
}

/// Helper trait for constructing DNS providers from configuration
pub trait DnsProviderFactory: Send + Sync {
    /// Create a DnsProvider instance from configuration
    ///
    /// # Parameters
    ///
    /// - `config`: Configuration specific to this provider
    ///
    /// # Returns
    ///
    /// A boxed DnsProvider trait object
    fn create(
        &self,
        config: &crate::config::ProviderConfig,
    ) -> Result<Box<dyn DnsProvider>, crate::Error>;
}
