//! Core DDNS engine
//!
//! The DdnsEngine is responsible for:
//! - Pushing the public hostname on every tick (or on change, per policy)
//! - Collecting the current address snapshot via AddressCollector
//! - Comparing it with the previous tick's snapshot
//! - Pushing the private and VPN hostnames via DnsProvider when it changed
//!
//! ## Architecture
//!
//! ```text
//!                 ┌──────────────────┐
//!                 │ AddressCollector │
//!                 └──────────────────┘
//!                          │ AddressSnapshot
//!                          ▼
//!  previous ───────▶ ┌──────────────┐ ───────▶ next previous
//!                    │ DdnsEngine   │
//!                    └──────────────┘
//!                          │
//!            ┌─────────────┴─────────────┐
//!            ▼                           ▼
//!    ┌──────────────┐            ┌─────────────┐
//!    │ DnsProvider  │            │   Events    │
//!    │ (update)     │            │  (notify)   │
//!    └──────────────┘            └─────────────┘
//! ```
//!
//! ## Tick Flow
//!
//! 1. Public update (policy `Always`)
//! 2. Collect the snapshot; on failure, keep the previous one and stop here
//! 3. Unchanged snapshot: stop here
//! 4. Changed: the new snapshot becomes "previous", then private and VPN
//!    updates run one after another (public update last under `OnChange`)
//! 5. Sleep for the poll interval, measured from the end of the tick

use crate::config::{DdnsConfig, HostnameSet, PublicUpdatePolicy};
use crate::error::Result;
use crate::snapshot::AddressSnapshot;
use crate::traits::{AddressCollector, DnsProvider};
use std::net::IpAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tracing::{debug, error, info, warn};

/// Events emitted by the DdnsEngine
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    /// Engine started
    Started {
        poll_interval: Duration,
    },

    /// A tick began (ticks are numbered from 1)
    TickStarted {
        tick: u64,
    },

    /// The collector failed; the tick was abandoned
    CollectionFailed {
        error: String,
    },

    /// Snapshot equal to the previous tick's; no updates issued
    SnapshotUnchanged {
        snapshot: AddressSnapshot,
    },

    /// Snapshot differs from the previous tick's
    SnapshotChanged {
        previous: AddressSnapshot,
        current: AddressSnapshot,
    },

    /// The public update was withheld because nothing changed (policy `OnChange`)
    PublicUpdateSkipped,

    /// DNS update succeeded
    UpdateSucceeded {
        hostname: String,
        ip: Option<IpAddr>,
    },

    /// DNS update failed
    UpdateFailed {
        hostname: String,
        ip: Option<IpAddr>,
        error: String,
    },

    /// Engine stopped
    Stopped {
        reason: String,
    },
}

/// One DNS update the engine intends to issue
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlannedUpdate {
    pub hostname: String,
    /// `None` lets the provider use the request's source address
    pub ip: Option<IpAddr>,
}

impl PlannedUpdate {
    fn new(hostname: &str, ip: Option<IpAddr>) -> Self {
        Self {
            hostname: hostname.to_string(),
            ip,
        }
    }
}

/// Updates to issue after collection, in order
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct TickPlan {
    /// Whether the snapshot differs from the previous one
    pub changed: bool,
    pub updates: Vec<PlannedUpdate>,
}

/// Decide which updates follow a successful collection
///
/// Under [`PublicUpdatePolicy::Always`] the public update is not part of
/// the plan: the engine issues it before collecting.
pub fn plan_updates(
    previous: &AddressSnapshot,
    current: &AddressSnapshot,
    hostnames: &HostnameSet,
    policy: PublicUpdatePolicy,
) -> TickPlan {
    if previous == current {
        return TickPlan::default();
    }

    let mut updates = Vec::with_capacity(3);

    if let Some(addr) = current.private_address() {
        updates.push(PlannedUpdate::new(&hostnames.private, Some(IpAddr::V4(addr))));
    }

    if let Some(addr) = current.tailscale {
        updates.push(PlannedUpdate::new(&hostnames.vpn, Some(IpAddr::V4(addr))));
    }

    if policy == PublicUpdatePolicy::OnChange {
        updates.push(PlannedUpdate::new(&hostnames.public, None));
    }

    TickPlan {
        changed: true,
        updates,
    }
}

/// Core DDNS engine
///
/// The engine owns the poll-and-notify loop. It runs until a shutdown
/// signal is received; no error inside a tick stops it.
///
/// ## Lifecycle
///
/// 1. Create with [`DdnsEngine::new()`]
/// 2. Start with [`DdnsEngine::run()`]
/// 3. Engine runs until SIGINT/SIGTERM
///
/// ## Threading
///
/// Everything happens on one task, one step after another. The only state
/// carried between ticks is the previous snapshot, which lives on the
/// loop's stack and is passed into and returned from [`DdnsEngine::tick()`].
pub struct DdnsEngine {
    /// Address collector queried every tick
    collector: Box<dyn AddressCollector>,

    /// DNS provider for updating hostnames
    provider: Box<dyn DnsProvider>,

    /// Hostnames to publish
    hostnames: HostnameSet,

    /// Sleep between ticks
    poll_interval: Duration,

    /// When the public hostname is pushed
    public_update_policy: PublicUpdatePolicy,

    /// Number of ticks started so far
    ticks: AtomicU64,

    /// Event sender for external monitoring
    event_tx: mpsc::Sender<EngineEvent>,
}

impl DdnsEngine {
    /// Create a new DDNS engine
    ///
    /// # Parameters
    ///
    /// - `collector`: Address collector implementation
    /// - `provider`: DNS provider implementation
    /// - `config`: DDNS configuration
    ///
    /// # Returns
    ///
    /// A tuple of (engine, event_receiver) where event_receiver yields engine events
    pub fn new(
        collector: Box<dyn AddressCollector>,
        provider: Box<dyn DnsProvider>,
        config: DdnsConfig,
    ) -> Result<(Self, mpsc::Receiver<EngineEvent>)> {
        config.validate()?;

        let (tx, rx) = mpsc::channel(config.engine.event_channel_capacity);

        let engine = Self {
            collector,
            provider,
            poll_interval: config.engine.poll_interval(),
            public_update_policy: config.engine.public_update_policy,
            hostnames: config.hostnames,
            ticks: AtomicU64::new(0),
            event_tx: tx,
        };

        Ok((engine, rx))
    }

    /// Run the engine
    ///
    /// The first tick runs immediately. Returns once SIGINT or SIGTERM is
    /// received.
    pub async fn run(&self) -> Result<()> {
        self.run_internal(None).await
    }

    /// Test-only helper to run the engine with a controlled shutdown signal
    ///
    /// **TESTING ONLY**: Production daemon code should use `run()` instead,
    /// which stops on OS signals rather than programmatic channels.
    pub async fn run_with_shutdown(&self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        self.run_internal(shutdown_rx).await
    }

    async fn run_internal(&self, shutdown_rx: Option<oneshot::Receiver<()>>) -> Result<()> {
        self.emit_event(EngineEvent::Started {
            poll_interval: self.poll_interval,
        });
        info!(
            "Engine started (interval={:?}, public updates: {:?})",
            self.poll_interval, self.public_update_policy
        );

        let shutdown = async move {
            match shutdown_rx {
                // A dropped sender counts as a shutdown request too
                Some(rx) => {
                    let _ = rx.await;
                    "Shutdown signal"
                }
                None => os_shutdown_signal().await,
            }
        };
        tokio::pin!(shutdown);

        let mut previous = AddressSnapshot::default();

        let reason = loop {
            tokio::select! {
                next = self.tick(previous) => previous = next,
                reason = &mut shutdown => break reason,
            }

            tokio::select! {
                _ = tokio::time::sleep(self.poll_interval) => {}
                reason = &mut shutdown => break reason,
            }
        };

        info!("{} received, engine stopped", reason);
        self.emit_event(EngineEvent::Stopped {
            reason: reason.to_string(),
        });

        Ok(())
    }

    /// Run one tick
    ///
    /// Takes the previous tick's snapshot and returns the snapshot the next
    /// tick must compare against: the freshly collected one when it
    /// changed, `previous` otherwise (including when collection failed).
    pub async fn tick(&self, previous: AddressSnapshot) -> AddressSnapshot {
        let tick = self.ticks.fetch_add(1, Ordering::SeqCst) + 1;
        debug!("Tick {} started", tick);
        self.emit_event(EngineEvent::TickStarted { tick });

        if self.public_update_policy == PublicUpdatePolicy::Always {
            info!("Executing public DNS update");
            self.push(&self.hostnames.public, None).await;
        }

        let current = match self.collector.collect().await {
            Ok(snapshot) => snapshot,
            Err(e) => {
                error!(
                    "Failed to get private IPs from {}: {}",
                    self.collector.collector_name(),
                    e
                );
                self.emit_event(EngineEvent::CollectionFailed {
                    error: e.to_string(),
                });
                return previous;
            }
        };

        let plan = plan_updates(
            &previous,
            &current,
            &self.hostnames,
            self.public_update_policy,
        );

        if !plan.changed {
            info!("IP addresses did not change, skipping execution");
            self.emit_event(EngineEvent::SnapshotUnchanged { snapshot: current });
            if self.public_update_policy == PublicUpdatePolicy::OnChange {
                self.emit_event(EngineEvent::PublicUpdateSkipped);
            }
            return previous;
        }

        info!("Addresses changed: [{}] -> [{}]", previous, current);
        self.emit_event(EngineEvent::SnapshotChanged { previous, current });

        for update in &plan.updates {
            match update.ip {
                Some(ip) => info!("Executing DNS update for {} with {}", update.hostname, ip),
                None => info!("Executing public DNS update"),
            }
            self.push(&update.hostname, update.ip).await;
        }

        current
    }

    /// Issue a single update, reporting the outcome
    ///
    /// Failures are logged and reported as events; they never abort the tick.
    async fn push(&self, hostname: &str, ip: Option<IpAddr>) {
        match self.provider.update(hostname, ip).await {
            Ok(()) => {
                debug!("Updated {} via {}", hostname, self.provider.provider_name());
                self.emit_event(EngineEvent::UpdateSucceeded {
                    hostname: hostname.to_string(),
                    ip,
                });
            }
            Err(e) => {
                warn!(
                    "Failed to update {}:{}: {}",
                    hostname,
                    ip.map(|ip| ip.to_string()).unwrap_or_default(),
                    e
                );
                self.emit_event(EngineEvent::UpdateFailed {
                    hostname: hostname.to_string(),
                    ip,
                    error: e.to_string(),
                });
            }
        }
    }

    /// Emit an engine event
    fn emit_event(&self, event: EngineEvent) {
        // Send event, logging warning if channel is full (backpressure)
        if self.event_tx.try_send(event).is_err() {
            warn!("Event channel full, dropping event. Consider increasing event_channel_capacity.");
        }
    }
}

/// Wait for SIGINT or SIGTERM
#[cfg(unix)]
async fn os_shutdown_signal() -> &'static str {
    use tokio::signal::unix::{SignalKind, signal};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(sigterm) => sigterm,
        Err(e) => {
            warn!("Failed to setup SIGTERM handler: {}", e);
            let _ = tokio::signal::ctrl_c().await;
            return "SIGINT";
        }
    };

    tokio::select! {
        _ = sigterm.recv() => "SIGTERM",
        _ = tokio::signal::ctrl_c() => "SIGINT",
    }
}

/// Wait for SIGINT
///
/// Fallback implementation for non-Unix platforms.
#[cfg(not(unix))]
async fn os_shutdown_signal() -> &'static str {
    let _ = tokio::signal::ctrl_c().await;
    "SIGINT"
}
