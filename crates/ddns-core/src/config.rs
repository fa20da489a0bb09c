//! Configuration types for the DDNS updater
//!
//! This module defines all configuration structures used throughout the workspace.
//! The daemon fills them from environment variables; library users may build
//! them directly or deserialize them.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// Hostname published with the request's own source address
pub const DEFAULT_PUBLIC_HOSTNAME: &str = "peeche.duckdns.org";

/// Hostname published with the wired/wireless LAN address
pub const DEFAULT_PRIVATE_HOSTNAME: &str = "dekh.duckdns.org";

/// Hostname published with the VPN overlay address
pub const DEFAULT_VPN_HOSTNAME: &str = "maut.duckdns.org";

/// Interface name prefix that identifies the VPN overlay tunnel
pub const DEFAULT_VPN_INTERFACE_PREFIX: &str = "tailscale";

/// Main DDNS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DdnsConfig {
    /// Address collector configuration
    #[serde(default)]
    pub collector: CollectorConfig,

    /// DNS provider configuration
    #[serde(default)]
    pub provider: ProviderConfig,

    /// Hostnames to publish
    #[serde(default)]
    pub hostnames: HostnameSet,

    /// Optional engine settings
    #[serde(default)]
    pub engine: EngineConfig,
}

impl DdnsConfig {
    /// Create a new configuration with defaults
    pub fn new() -> Self {
        Self {
            collector: CollectorConfig::default(),
            provider: ProviderConfig::default(),
            hostnames: HostnameSet::default(),
            engine: EngineConfig::default(),
        }
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        self.hostnames.validate()?;
        self.engine.validate()?;
        self.provider.validate()?;
        self.collector.validate()?;

        Ok(())
    }
}

impl Default for DdnsConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// The three hostnames the updater maintains
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostnameSet {
    /// Updated with the request's source address
    pub public: String,
    /// Updated with the wired (else wireless) address
    pub private: String,
    /// Updated with the VPN overlay address
    pub vpn: String,
}

impl HostnameSet {
    fn validate(&self) -> Result<(), crate::Error> {
        for (role, hostname) in [
            ("public", &self.public),
            ("private", &self.private),
            ("vpn", &self.vpn),
        ] {
            if hostname.trim().is_empty() {
                return Err(crate::Error::config(format!(
                    "{} hostname cannot be empty",
                    role
                )));
            }
            if hostname.contains('/') {
                return Err(crate::Error::config(format!(
                    "{} hostname cannot contain '/': {}",
                    role, hostname
                )));
            }
        }
        Ok(())
    }
}

impl Default for HostnameSet {
    fn default() -> Self {
        Self {
            public: DEFAULT_PUBLIC_HOSTNAME.to_string(),
            private: DEFAULT_PRIVATE_HOSTNAME.to_string(),
            vpn: DEFAULT_VPN_HOSTNAME.to_string(),
        }
    }
}

/// How a device's address is resolved
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressStrategy {
    /// Look up the OS interface by name and use its first IPv4 address
    #[default]
    Interface,
    /// Read the device's IPv4 configuration object from NetworkManager
    Ip4Config,
}

impl FromStr for AddressStrategy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "interface" => Ok(Self::Interface),
            "ip4config" => Ok(Self::Ip4Config),
            other => Err(crate::Error::config(format!(
                "Unknown address strategy '{}'. Valid: interface, ip4config",
                other
            ))),
        }
    }
}

/// Address collector configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CollectorConfig {
    /// NetworkManager over the system D-Bus
    NetworkManager {
        /// Address resolution strategy
        #[serde(default)]
        strategy: AddressStrategy,
        /// Tunnel devices whose interface starts with this are the VPN overlay
        #[serde(default = "default_vpn_interface_prefix")]
        vpn_interface_prefix: String,
    },
}

impl CollectorConfig {
    /// Validate the collector configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            CollectorConfig::NetworkManager {
                vpn_interface_prefix,
                ..
            } => {
                if vpn_interface_prefix.is_empty() {
                    return Err(crate::Error::config(
                        "VPN interface prefix cannot be empty",
                    ));
                }
                Ok(())
            }
        }
    }

    /// Get the collector type name
    pub fn type_name(&self) -> &str {
        match self {
            CollectorConfig::NetworkManager { .. } => "networkmanager",
        }
    }
}

impl Default for CollectorConfig {
    fn default() -> Self {
        CollectorConfig::NetworkManager {
            strategy: AddressStrategy::default(),
            vpn_interface_prefix: default_vpn_interface_prefix(),
        }
    }
}

fn default_vpn_interface_prefix() -> String {
    DEFAULT_VPN_INTERFACE_PREFIX.to_string()
}

/// DNS provider configuration
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ProviderConfig {
    /// DuckDNS provider
    Duckdns {
        /// DuckDNS account token
        #[serde(default)]
        api_token: String,
        /// Endpoint base URL (defaults to the public DuckDNS endpoint)
        #[serde(default)]
        base_url: Option<String>,
        /// Optional per-request timeout; the HTTP client default when absent
        #[serde(default)]
        timeout_secs: Option<u64>,
    },
}

impl ProviderConfig {
    /// Validate the provider configuration
    ///
    /// An empty token is accepted: the provider will answer with an error
    /// at update time, which the engine logs like any other failure.
    pub fn validate(&self) -> Result<(), crate::Error> {
        match self {
            ProviderConfig::Duckdns {
                base_url,
                timeout_secs,
                ..
            } => {
                if let Some(url) = base_url
                    && !url.starts_with("https://")
                    && !url.starts_with("http://")
                {
                    return Err(crate::Error::config(format!(
                        "DuckDNS base URL must use HTTP or HTTPS scheme. Got: {}",
                        url
                    )));
                }
                if *timeout_secs == Some(0) {
                    return Err(crate::Error::config("HTTP timeout must be > 0"));
                }
                Ok(())
            }
        }
    }

    /// Get the provider type name
    pub fn type_name(&self) -> &str {
        match self {
            ProviderConfig::Duckdns { .. } => "duckdns",
        }
    }
}

impl Default for ProviderConfig {
    fn default() -> Self {
        ProviderConfig::Duckdns {
            api_token: String::new(),
            base_url: None,
            timeout_secs: None,
        }
    }
}

// The token must never reach a log line through `{:?}`
impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderConfig::Duckdns {
                api_token,
                base_url,
                timeout_secs,
            } => f
                .debug_struct("Duckdns")
                .field(
                    "api_token",
                    &if api_token.is_empty() { "<EMPTY>" } else { "<REDACTED>" },
                )
                .field("base_url", base_url)
                .field("timeout_secs", timeout_secs)
                .finish(),
        }
    }
}

/// When the public hostname is pushed
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PublicUpdatePolicy {
    /// Every tick, before collecting addresses
    #[default]
    Always,
    /// Only on ticks where the address snapshot changed
    OnChange,
}

impl FromStr for PublicUpdatePolicy {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "on-change" | "on_change" => Ok(Self::OnChange),
            other => Err(crate::Error::config(format!(
                "Unknown public update policy '{}'. Valid: always, on-change",
                other
            ))),
        }
    }
}

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Time to sleep between the end of one tick and the start of the next (in seconds)
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,

    /// When the public hostname is pushed
    #[serde(default)]
    pub public_update_policy: PublicUpdatePolicy,

    /// Capacity of the internal event channel
    ///
    /// When full, new engine events are dropped (with a warning log).
    ///
    /// Default: 1000 events
    #[serde(default = "default_event_channel_capacity")]
    pub event_channel_capacity: usize,
}

impl EngineConfig {
    /// Validate the engine configuration
    pub fn validate(&self) -> Result<(), crate::Error> {
        if self.poll_interval_secs == 0 {
            return Err(crate::Error::config("Poll interval must be > 0"));
        }
        if self.event_channel_capacity == 0 {
            return Err(crate::Error::config("Event channel capacity must be > 0"));
        }
        Ok(())
    }

    /// The poll interval as a [`Duration`]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval_secs(),
            public_update_policy: PublicUpdatePolicy::default(),
            event_channel_capacity: default_event_channel_capacity(),
        }
    }
}

fn default_poll_interval_secs() -> u64 {
    30 * 60
}

fn default_event_channel_capacity() -> usize {
    1000
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = DdnsConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.engine.poll_interval(), Duration::from_secs(1800));
        assert_eq!(config.engine.public_update_policy, PublicUpdatePolicy::Always);
        assert_eq!(config.hostnames.vpn, "maut.duckdns.org");
    }

    #[test]
    fn zero_interval_is_rejected() {
        let mut config = DdnsConfig::default();
        config.engine.poll_interval_secs = 0;
        assert!(matches!(config.validate(), Err(crate::Error::Config(_))));
    }

    #[test]
    fn empty_hostname_is_rejected() {
        let mut config = DdnsConfig::default();
        config.hostnames.private = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn policy_and_strategy_parse() {
        assert_eq!("on-change".parse::<PublicUpdatePolicy>().unwrap(), PublicUpdatePolicy::OnChange);
        assert_eq!("ALWAYS".parse::<PublicUpdatePolicy>().unwrap(), PublicUpdatePolicy::Always);
        assert!("sometimes".parse::<PublicUpdatePolicy>().is_err());

        assert_eq!("ip4config".parse::<AddressStrategy>().unwrap(), AddressStrategy::Ip4Config);
        assert_eq!("interface".parse::<AddressStrategy>().unwrap(), AddressStrategy::Interface);
        assert!("netlink".parse::<AddressStrategy>().is_err());
    }

    #[test]
    fn provider_debug_redacts_token() {
        let config = ProviderConfig::Duckdns {
            api_token: "secret-token-1234".to_string(),
            base_url: None,
            timeout_secs: None,
        };
        let debug = format!("{:?}", config);
        assert!(!debug.contains("secret-token-1234"));
        assert!(debug.contains("<REDACTED>"));
    }

    #[test]
    fn non_http_base_url_is_rejected() {
        let config = ProviderConfig::Duckdns {
            api_token: String::new(),
            base_url: Some("ftp://duckdns.org".to_string()),
            timeout_secs: None,
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn config_deserializes_with_defaults() {
        let config: DdnsConfig = serde_json::from_str(
            r#"{
                "collector": { "type": "network_manager", "strategy": "ip4config" },
                "provider": { "type": "duckdns", "api_token": "abc" },
                "engine": { "poll_interval_secs": 300, "public_update_policy": "on-change" }
            }"#,
        )
        .unwrap();

        assert_eq!(
            config.collector,
            CollectorConfig::NetworkManager {
                strategy: AddressStrategy::Ip4Config,
                vpn_interface_prefix: "tailscale".to_string(),
            }
        );
        assert_eq!(config.provider.type_name(), "duckdns");
        assert_eq!(config.engine.poll_interval_secs, 300);
        assert_eq!(config.engine.public_update_policy, PublicUpdatePolicy::OnChange);
        assert_eq!(config.engine.event_channel_capacity, 1000);
        assert_eq!(config.hostnames, HostnameSet::default());
    }
}
