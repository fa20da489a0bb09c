// # ddnsd - DDNS Daemon
//
// Thin integration layer: all update logic lives in ddns-core.
//
// The ddnsd daemon is responsible for:
// 1. Reading configuration from environment variables
// 2. Initializing logging and the runtime
// 3. Registering the NetworkManager collector and the DuckDNS provider
// 4. Running the DDNS engine until SIGINT/SIGTERM
//
// ## Configuration
//
// All configuration is done via environment variables:
//
// - `DUCKDNS_API_TOKEN`: DuckDNS account token (empty is accepted, with a warning)
// - `DDNS_POLL_INTERVAL_SECS`: Seconds between ticks (default 1800)
// - `DDNS_PUBLIC_UPDATE_POLICY`: `always` (default) or `on-change`
// - `DDNS_ADDRESS_STRATEGY`: `interface` (default) or `ip4config`
// - `DDNS_HTTP_TIMEOUT_SECS`: Optional HTTP request timeout
// - `DDNS_LOG_LEVEL`: trace, debug, info (default), warn, error
//
// Hostnames are fixed: public `peeche.duckdns.org`, private
// `dekh.duckdns.org`, VPN `maut.duckdns.org`.
//
// ## Example
//
// ```bash
// export DUCKDNS_API_TOKEN=your_token
// export DDNS_POLL_INTERVAL_SECS=600
//
// ddnsd
// ```

use anyhow::{Context, Result};
use ddns_core::config::{
    AddressStrategy, CollectorConfig, DEFAULT_VPN_INTERFACE_PREFIX, DdnsConfig, EngineConfig,
    HostnameSet, ProviderConfig, PublicUpdatePolicy,
};
use ddns_core::{DdnsEngine, ProviderRegistry};
use std::env;
use std::process::ExitCode;
use std::str::FromStr;
use tracing::{Level, debug, error, info};
use tracing_subscriber::FmtSubscriber;

/// Exit codes for different termination scenarios
///
/// These codes follow systemd conventions:
/// - 0: Clean shutdown
/// - 1: Configuration or startup error
/// - 2: Runtime error (unexpected)
#[derive(Debug, Clone, Copy)]
enum DdnsExitCode {
    /// Clean shutdown (normal exit)
    CleanShutdown = 0,
    /// Configuration error or startup failure
    ConfigError = 1,
    /// Runtime error (unexpected failure)
    RuntimeError = 2,
}

impl From<DdnsExitCode> for ExitCode {
    fn from(code: DdnsExitCode) -> Self {
        ExitCode::from(code as u8)
    }
}

/// Application configuration
struct Config {
    api_token: String,
    poll_interval_secs: u64,
    public_update_policy: PublicUpdatePolicy,
    address_strategy: AddressStrategy,
    http_timeout_secs: Option<u64>,
    log_level: Level,
}

impl Config {
    /// Load configuration from environment variables
    fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Load configuration from any key lookup
    ///
    /// Unset and empty values fall back to defaults.
    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let poll_interval_secs = match get("DDNS_POLL_INTERVAL_SECS") {
            Some(v) => v
                .trim()
                .parse()
                .with_context(|| format!("DDNS_POLL_INTERVAL_SECS is not a number: {:?}", v))?,
            None => EngineConfig::default().poll_interval_secs,
        };

        let public_update_policy = match get("DDNS_PUBLIC_UPDATE_POLICY") {
            Some(v) => PublicUpdatePolicy::from_str(&v)?,
            None => PublicUpdatePolicy::default(),
        };

        let address_strategy = match get("DDNS_ADDRESS_STRATEGY") {
            Some(v) => AddressStrategy::from_str(&v)?,
            None => AddressStrategy::default(),
        };

        let http_timeout_secs = get("DDNS_HTTP_TIMEOUT_SECS")
            .map(|v| {
                v.trim()
                    .parse()
                    .with_context(|| format!("DDNS_HTTP_TIMEOUT_SECS is not a number: {:?}", v))
            })
            .transpose()?;

        let log_level = match get("DDNS_LOG_LEVEL") {
            Some(v) => parse_log_level(&v)?,
            None => Level::INFO,
        };

        Ok(Self {
            api_token: lookup("DUCKDNS_API_TOKEN").unwrap_or_default(),
            poll_interval_secs,
            public_update_policy,
            address_strategy,
            http_timeout_secs,
            log_level,
        })
    }

    /// Build and validate the engine configuration
    fn to_ddns_config(&self) -> Result<DdnsConfig> {
        let config = DdnsConfig {
            collector: CollectorConfig::NetworkManager {
                strategy: self.address_strategy,
                vpn_interface_prefix: DEFAULT_VPN_INTERFACE_PREFIX.to_string(),
            },
            provider: ProviderConfig::Duckdns {
                api_token: self.api_token.clone(),
                base_url: None,
                timeout_secs: self.http_timeout_secs,
            },
            hostnames: HostnameSet::default(),
            engine: EngineConfig {
                poll_interval_secs: self.poll_interval_secs,
                public_update_policy: self.public_update_policy,
                ..EngineConfig::default()
            },
        };

        config.validate()?;
        Ok(config)
    }
}

fn parse_log_level(value: &str) -> Result<Level> {
    match value.trim().to_lowercase().as_str() {
        "trace" => Ok(Level::TRACE),
        "debug" => Ok(Level::DEBUG),
        "info" => Ok(Level::INFO),
        "warn" => Ok(Level::WARN),
        "error" => Ok(Level::ERROR),
        _ => anyhow::bail!(
            "DDNS_LOG_LEVEL '{}' is not valid. \
            Valid levels: trace, debug, info, warn, error",
            value
        ),
    }
}

fn main() -> ExitCode {
    // Load configuration from environment
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let ddns_config = match config.to_ddns_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration validation error: {:#}", e);
            return DdnsExitCode::ConfigError.into();
        }
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();

    if let Err(e) = tracing::subscriber::set_global_default(subscriber) {
        eprintln!("Failed to set tracing subscriber: {}", e);
        return DdnsExitCode::ConfigError.into();
    }

    info!("Starting ddnsd daemon");
    debug!("Configuration: {:?}", ddns_config);

    // Enter tokio runtime
    let rt = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create tokio runtime: {}", e);
            return DdnsExitCode::RuntimeError.into();
        }
    };

    let result = rt.block_on(async {
        match run_daemon(ddns_config).await {
            Ok(()) => DdnsExitCode::CleanShutdown,
            Err(e) => {
                error!("Daemon error: {:#}", e);
                DdnsExitCode::RuntimeError
            }
        }
    });

    result.into()
}

/// Run the daemon until a shutdown signal arrives
async fn run_daemon(config: DdnsConfig) -> Result<()> {
    let registry = ProviderRegistry::new();
    ddns_provider_duckdns::register(&registry);
    ddns_ip_networkmanager::register(&registry);

    let collector = registry
        .create_collector(&config.collector)
        .context("Failed to create address collector")?;
    let provider = registry
        .create_provider(&config.provider)
        .context("Failed to create DNS provider")?;

    info!(
        "Publishing via {} with addresses from {}",
        provider.provider_name(),
        collector.collector_name()
    );
    info!(
        "Hostnames: public={} private={} vpn={}",
        config.hostnames.public, config.hostnames.private, config.hostnames.vpn
    );

    let (engine, mut events) = DdnsEngine::new(collector, provider, config)?;

    // Nothing consumes events in the daemon beyond debug logging
    let drain = tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            debug!("Engine event: {:?}", event);
        }
    });

    engine.run().await?;

    drop(engine);
    let _ = drain.await;

    info!("Shutting down daemon");
    Ok(())
}
