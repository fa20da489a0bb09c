//! Test doubles and common utilities for engine contract tests
//!
//! This module provides minimal test doubles that record what the engine
//! asks of them without touching D-Bus or the network.

#![allow(dead_code)]

use ddns_core::config::{DdnsConfig, EngineConfig, PublicUpdatePolicy};
use ddns_core::error::{Error, Result};
use ddns_core::traits::{AddressCollector, DnsProvider};
use ddns_core::AddressSnapshot;
use std::collections::VecDeque;
use std::net::{IpAddr, Ipv4Addr};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

/// Build a snapshot from dotted strings; "" means absent
pub fn snapshot(wired: &str, wireless: &str, tailscale: &str) -> AddressSnapshot {
    let parse = |s: &str| s.parse::<Ipv4Addr>().ok();
    AddressSnapshot::new(parse(wired), parse(wireless), parse(tailscale))
}

/// A collector that replays a script of results, repeating the last one
#[derive(Clone)]
pub struct ScriptedCollector {
    script: Arc<Mutex<VecDeque<std::result::Result<AddressSnapshot, String>>>>,
    last: Arc<Mutex<std::result::Result<AddressSnapshot, String>>>,
    collect_call_count: Arc<AtomicUsize>,
}

impl ScriptedCollector {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            last: Arc::new(Mutex::new(Ok(AddressSnapshot::default()))),
            collect_call_count: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Always return the same snapshot
    pub fn fixed(snapshot: AddressSnapshot) -> Self {
        let collector = Self::new();
        collector.push(snapshot);
        collector
    }

    /// Queue a snapshot
    pub fn push(&self, snapshot: AddressSnapshot) {
        self.script.lock().unwrap().push_back(Ok(snapshot));
    }

    /// Queue a collection failure
    pub fn push_failure(&self, message: &str) {
        self.script.lock().unwrap().push_back(Err(message.to_string()));
    }

    /// Get the number of times collect() was called
    pub fn collect_call_count(&self) -> usize {
        self.collect_call_count.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl AddressCollector for ScriptedCollector {
    async fn collect(&self) -> Result<AddressSnapshot> {
        self.collect_call_count.fetch_add(1, Ordering::SeqCst);

        let next = self.script.lock().unwrap().pop_front();
        let outcome = match next {
            Some(outcome) => {
                *self.last.lock().unwrap() = outcome.clone();
                outcome
            }
            None => self.last.lock().unwrap().clone(),
        };

        outcome.map_err(Error::collector)
    }

    fn collector_name(&self) -> &'static str {
        "scripted"
    }
}

/// A provider that records every call and answers per hostname
#[derive(Clone)]
pub struct RecordingProvider {
    calls: Arc<Mutex<Vec<(String, Option<IpAddr>)>>>,
    failing_hostnames: Arc<Mutex<Vec<String>>>,
}

impl RecordingProvider {
    pub fn new() -> Self {
        Self {
            calls: Arc::new(Mutex::new(Vec::new())),
            failing_hostnames: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Make every update of `hostname` fail with a non-OK body
    pub fn fail_for(&self, hostname: &str) {
        self.failing_hostnames
            .lock()
            .unwrap()
            .push(hostname.to_string());
    }

    /// All calls so far, in order
    pub fn calls(&self) -> Vec<(String, Option<IpAddr>)> {
        self.calls.lock().unwrap().clone()
    }

    /// Calls for one hostname
    pub fn calls_for(&self, hostname: &str) -> Vec<Option<IpAddr>> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .filter(|(h, _)| h == hostname)
            .map(|(_, ip)| *ip)
            .collect()
    }

    pub fn clear(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait::async_trait]
impl DnsProvider for RecordingProvider {
    async fn update(&self, hostname: &str, ip: Option<IpAddr>) -> Result<()> {
        self.calls.lock().unwrap().push((hostname.to_string(), ip));

        if self
            .failing_hostnames
            .lock()
            .unwrap()
            .iter()
            .any(|h| h == hostname)
        {
            return Err(Error::unexpected_response(hostname, "KO"));
        }

        Ok(())
    }

    fn provider_name(&self) -> &'static str {
        "recording"
    }
}

/// Helper to create a minimal DdnsConfig for testing
pub fn minimal_config(policy: PublicUpdatePolicy) -> DdnsConfig {
    DdnsConfig {
        engine: EngineConfig {
            poll_interval_secs: 1800,
            public_update_policy: policy,
            event_channel_capacity: 100,
        },
        ..DdnsConfig::default()
    }
}

pub const PUBLIC: &str = "peeche.duckdns.org";
pub const PRIVATE: &str = "dekh.duckdns.org";
pub const VPN: &str = "maut.duckdns.org";
