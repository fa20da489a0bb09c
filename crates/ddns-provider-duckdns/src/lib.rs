// # DuckDNS Provider
//
// This crate provides a DuckDNS provider implementation for the DDNS updater.
//
// ## Behavior
//
// - One GET per update, no retry (the engine tries again next tick)
// - The IP path segment is omitted for the public hostname, letting DuckDNS
//   use the request's source address
// - Success is a response body of exactly `OK`; the HTTP status is not inspected
// - No timeout unless one is configured (client default)
//
// ## Security Requirements
//
// - API token NEVER appears in logs, error messages or `Debug` output
// - API token is provided via environment variables only
//
// ## API Reference
//
// - Update: GET `/update/<hostname>/<token>[/<ip>]`, body `OK` or `KO`

use async_trait::async_trait;
use ddns_core::config::ProviderConfig;
use ddns_core::traits::{DnsProvider, DnsProviderFactory};
use ddns_core::{Error, Result};
use std::net::IpAddr;
use std::time::Duration;

/// DuckDNS API base URL
pub const DUCKDNS_API_BASE: &str = "https://duckdns.org";

/// Body DuckDNS returns on success
pub const SUCCESS_MARKER: &str = "OK";

/// DuckDNS provider
///
/// Stateless and single-shot: every [`DnsProvider::update`] call is exactly
/// one HTTP request.
pub struct DuckDnsProvider {
    /// DuckDNS account token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// Endpoint base URL, without trailing slash
    base_url: String,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for DuckDnsProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DuckDnsProvider")
            .field("api_token", &"<REDACTED>")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl DuckDnsProvider {
    /// Create a new DuckDNS provider
    ///
    /// # Parameters
    ///
    /// - `api_token`: DuckDNS account token
    /// - `timeout`: Optional per-request timeout; `None` keeps the client default
    ///
    /// An empty token is accepted with a warning. DuckDNS rejects such
    /// updates and the engine logs the failure every tick.
    pub fn new(api_token: impl Into<String>, timeout: Option<Duration>) -> Result<Self> {
        let api_token = api_token.into();

        if api_token.is_empty() {
            tracing::warn!("DuckDNS API token is empty; updates will be rejected");
        }

        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            api_token,
            base_url: DUCKDNS_API_BASE.to_string(),
            client,
        })
    }

    /// Point the provider at a different endpoint
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Build the update URL for a hostname
    ///
    /// `/<ip>` is appended only when an address is given.
    pub fn update_url(&self, hostname: &str, ip: Option<IpAddr>) -> String {
        build_update_url(&self.base_url, hostname, &self.api_token, ip)
    }

    fn redacted_url(&self, hostname: &str, ip: Option<IpAddr>) -> String {
        build_update_url(&self.base_url, hostname, "<REDACTED>", ip)
    }
}

fn build_update_url(base_url: &str, hostname: &str, token: &str, ip: Option<IpAddr>) -> String {
    let url = format!("{}/update/{}/{}", base_url, hostname, token);

    match ip {
        Some(ip) => format!("{}/{}", url, ip),
        None => url,
    }
}

/// Check a DuckDNS response body
///
/// Only a body byte-equal to `OK` is a success. Anything else, including an
/// empty body, a byte-order mark or trailing whitespace, is an error.
pub fn check_response(hostname: &str, body: &[u8]) -> Result<()> {
    if body == SUCCESS_MARKER.as_bytes() {
        Ok(())
    } else {
        Err(Error::unexpected_response(
            hostname,
            String::from_utf8_lossy(body),
        ))
    }
}

#[async_trait]
impl DnsProvider for DuckDnsProvider {
    async fn update(&self, hostname: &str, ip: Option<IpAddr>) -> Result<()> {
        let ip_label = ip.map(|ip| ip.to_string()).unwrap_or_default();
        tracing::debug!("GET {}", self.redacted_url(hostname, ip));

        // reqwest errors carry the URL, which carries the token
        let response = self
            .client
            .get(self.update_url(hostname, ip))
            .send()
            .await
            .map_err(|e| {
                let e = e.without_url();
                tracing::error!("failed to update {}:{}; err: {}", hostname, ip_label, e);
                Error::http(format!("Request for {} failed: {}", hostname, e))
            })?;

        // Raw bytes: text decoding would strip a leading BOM
        let body = response.bytes().await.map_err(|e| {
            let e = e.without_url();
            tracing::error!("failed to read response for {}:{}; err: {}", hostname, ip_label, e);
            Error::http(format!("Failed to read response for {}: {}", hostname, e))
        })?;

        check_response(hostname, &body).inspect_err(|_| {
            tracing::error!(
                "error response from duckdns API server for {}:{}: {:?}",
                hostname,
                ip_label,
                String::from_utf8_lossy(&body)
            );
        })?;

        match ip {
            Some(ip) => tracing::info!("DuckDNS updated {} -> {}", hostname, ip),
            None => tracing::info!("DuckDNS updated {} -> request source address", hostname),
        }
        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "duckdns"
    }
}

/// Factory for creating DuckDNS providers
pub struct DuckDnsFactory;

impl DnsProviderFactory for DuckDnsFactory {
    fn create(&self, config: &ProviderConfig) -> Result<Box<dyn DnsProvider>> {
        match config {
            ProviderConfig::Duckdns {
                api_token,
                base_url,
                timeout_secs,
            } => {
                let mut provider =
                    DuckDnsProvider::new(api_token.clone(), timeout_secs.map(Duration::from_secs))?;
                if let Some(base_url) = base_url {
                    provider = provider.with_base_url(base_url.clone());
                }
                Ok(Box::new(provider))
            }
        }
    }
}

/// Register the DuckDNS provider with a registry
///
/// # Example
///
/// ```rust
/// use ddns_core::ProviderRegistry;
///
/// let registry = ProviderRegistry::new();
/// ddns_provider_duckdns::register(&registry);
/// assert!(registry.has_provider("duckdns"));
/// ```
pub fn register(registry: &ddns_core::ProviderRegistry) {
    registry.register_provider("duckdns", Box::new(DuckDnsFactory));
}
