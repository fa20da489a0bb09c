//! Plugin-based provider registry
//!
//! The registry allows DNS providers and address collectors to be registered
//! dynamically at runtime, avoiding hardcoded if-else chains.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ddns_core::registry::ProviderRegistry;
//! use ddns_core::config::ProviderConfig;
//!
//! let registry = ProviderRegistry::new();
//! ddns_provider_duckdns::register(&registry);
//!
//! let provider = registry.create_provider(&ProviderConfig::default())?;
//! ```

use crate::config::{CollectorConfig, ProviderConfig};
use crate::error::{Error, Result};
use crate::traits::{AddressCollector, AddressCollectorFactory, DnsProvider, DnsProviderFactory};
use std::collections::HashMap;
use std::sync::RwLock;

/// Registry for plugin-based provider and collector creation
///
/// ## Thread Safety
///
/// The registry uses interior mutability with RwLock, allowing concurrent
/// reads and exclusive writes.
#[derive(Default)]
pub struct ProviderRegistry {
    /// Registered DNS provider factories
    providers: RwLock<HashMap<String, Box<dyn DnsProviderFactory>>>,

    /// Registered address collector factories
    collectors: RwLock<HashMap<String, Box<dyn AddressCollectorFactory>>>,
}

impl ProviderRegistry {
    /// Create a new empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a DNS provider factory
    ///
    /// # Parameters
    ///
    /// - `name`: Provider type name (e.g., "duckdns")
    /// - `factory`: Factory object for creating provider instances
    pub fn register_provider(&self, name: impl Into<String>, factory: Box<dyn DnsProviderFactory>) {
        let mut providers = self
            .providers
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        providers.insert(name.into(), factory);
    }

    /// Register an address collector factory
    ///
    /// # Parameters
    ///
    /// - `name`: Collector type name (e.g., "networkmanager")
    /// - `factory`: Factory object for creating collector instances
    pub fn register_collector(
        &self,
        name: impl Into<String>,
        factory: Box<dyn AddressCollectorFactory>,
    ) {
        let mut collectors = self
            .collectors
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        collectors.insert(name.into(), factory);
    }

    /// Create a DNS provider from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn DnsProvider>)`: Created provider instance
    /// - `Err(Error)`: If provider type is not registered or creation fails
    pub fn create_provider(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        let provider_type = config.type_name();
        let providers = self
            .providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let factory = providers
            .get(provider_type)
            .ok_or_else(|| Error::config(format!("Unknown provider type: {}", provider_type)))?;

        factory.create(config)
    }

    /// Create an address collector from configuration
    ///
    /// # Returns
    ///
    /// - `Ok(Box<dyn AddressCollector>)`: Created collector instance
    /// - `Err(Error)`: If collector type is not registered or creation fails
    pub fn create_collector(&self, config: &CollectorConfig) -> Result<Box<dyn AddressCollector>> {
        let collector_type = config.type_name();
        let collectors = self
            .collectors
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        let factory = collectors.get(collector_type).ok_or_else(|| {
            Error::config(format!("Unknown address collector type: {}", collector_type))
        })?;

        factory.create(config)
    }

    /// List all registered provider types
    pub fn list_providers(&self) -> Vec<String> {
        let providers = self
            .providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        providers.keys().cloned().collect()
    }

    /// List all registered collector types
    pub fn list_collectors(&self) -> Vec<String> {
        let collectors = self
            .collectors
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        collectors.keys().cloned().collect()
    }

    /// Check if a provider type is registered
    pub fn has_provider(&self, name: &str) -> bool {
        let providers = self
            .providers
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        providers.contains_key(name)
    }

    /// Check if a collector type is registered
    pub fn has_collector(&self, name: &str) -> bool {
        let collectors = self
            .collectors
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        collectors.contains_key(name)
    }
}
