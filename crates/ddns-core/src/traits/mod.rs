//! Core traits for the DDNS updater
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`AddressCollector`]: Read the host's LAN and VPN addresses
//! - [`DnsProvider`]: Push an address to a dynamic-DNS provider

pub mod address_collector;
pub mod dns_provider;

pub use address_collector::{AddressCollector, AddressCollectorFactory};
pub use dns_provider::{DnsProvider, DnsProviderFactory};
