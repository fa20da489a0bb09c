// # ddns-core
//
// Core library for the NetworkManager-driven DuckDNS updater.
//
// ## Architecture Overview
//
// This library provides the core functionality for the poll-and-notify loop:
// - **AddressCollector**: Trait for reading the host's LAN and VPN addresses
// - **DnsProvider**: Trait for pushing one address to one hostname
// - **AddressSnapshot**: The set of addresses observed at one tick
// - **DdnsEngine**: The control loop (tick → compare → update → sleep)
// - **ProviderRegistry**: Plugin-based registry for providers and collectors
//
// ## Design Principles
//
// 1. **Separation of Concerns**: Core logic is separate from the D-Bus and HTTP integrations
// 2. **Explicit State**: The previous snapshot is threaded through each tick, never global
// 3. **Plugin-Based**: Providers and collectors are registered by name
// 4. **Library-First**: All core functionality can be used as a library
// 5. **Never Fatal**: Failures inside a tick are logged and retried next tick

pub mod traits;
pub mod snapshot;
pub mod engine;
pub mod registry;
pub mod config;
pub mod error;

// Re-export core types for convenience
pub use traits::{AddressCollector, DnsProvider};
pub use snapshot::AddressSnapshot;
pub use engine::{DdnsEngine, EngineEvent, PlannedUpdate, TickPlan, plan_updates};
pub use registry::ProviderRegistry;
pub use config::{
    AddressStrategy, CollectorConfig, DdnsConfig, EngineConfig, HostnameSet, ProviderConfig,
    PublicUpdatePolicy,
};
pub use error::{Error, Result};
