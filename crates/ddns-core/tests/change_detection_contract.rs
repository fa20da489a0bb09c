//! Contract Test: Change Detection
//!
//! Verifies that the private and VPN hostnames are only pushed on ticks
//! where the snapshot differs from the previous one, and that the
//! previous snapshot is threaded correctly between ticks.

mod common;

use common::*;
use ddns_core::config::PublicUpdatePolicy;
use ddns_core::{AddressSnapshot, DdnsEngine, EngineEvent};
use std::net::IpAddr;

fn engine_with(
    collector: &ScriptedCollector,
    provider: &RecordingProvider,
) -> (DdnsEngine, tokio::sync::mpsc::Receiver<EngineEvent>) {
    DdnsEngine::new(
        Box::new(collector.clone()),
        Box::new(provider.clone()),
        minimal_config(PublicUpdatePolicy::Always),
    )
    .expect("engine construction succeeds")
}

#[tokio::test]
async fn wired_address_from_empty_triggers_single_private_update() {
    let collector = ScriptedCollector::fixed(snapshot("192.168.1.5", "", ""));
    let provider = RecordingProvider::new();
    let (engine, _events) = engine_with(&collector, &provider);

    let next = engine.tick(AddressSnapshot::default()).await;

    assert_eq!(next, snapshot("192.168.1.5", "", ""), "new snapshot becomes previous");
    assert_eq!(
        provider.calls_for(PRIVATE),
        vec![Some(IpAddr::from([192, 168, 1, 5]))]
    );
    assert!(provider.calls_for(VPN).is_empty(), "no VPN update without a VPN address");
}

#[tokio::test]
async fn unchanged_snapshot_only_issues_public_update() {
    let current = snapshot("10.0.0.2", "10.0.0.3", "100.64.0.1");
    let collector = ScriptedCollector::fixed(current);
    let provider = RecordingProvider::new();
    let (engine, _events) = engine_with(&collector, &provider);

    let next = engine.tick(current).await;

    assert_eq!(next, current);
    assert_eq!(provider.calls(), vec![(PUBLIC.to_string(), None)]);
}

#[tokio::test]
async fn wireless_is_used_when_wired_is_absent() {
    let collector = ScriptedCollector::fixed(snapshot("", "10.0.0.3", ""));
    let provider = RecordingProvider::new();
    let (engine, _events) = engine_with(&collector, &provider);

    engine.tick(AddressSnapshot::default()).await;

    assert_eq!(
        provider.calls_for(PRIVATE),
        vec![Some(IpAddr::from([10, 0, 0, 3]))]
    );
}

#[tokio::test]
async fn wired_wins_over_wireless() {
    let collector = ScriptedCollector::fixed(snapshot("10.0.0.2", "10.0.0.3", ""));
    let provider = RecordingProvider::new();
    let (engine, _events) = engine_with(&collector, &provider);

    engine.tick(AddressSnapshot::default()).await;

    assert_eq!(
        provider.calls_for(PRIVATE),
        vec![Some(IpAddr::from([10, 0, 0, 2]))]
    );
}

#[tokio::test]
async fn only_vpn_address_skips_private_update() {
    let collector = ScriptedCollector::fixed(snapshot("", "", "100.64.0.1"));
    let provider = RecordingProvider::new();
    let (engine, _events) = engine_with(&collector, &provider);

    engine.tick(AddressSnapshot::default()).await;

    assert!(provider.calls_for(PRIVATE).is_empty());
    assert_eq!(
        provider.calls_for(VPN),
        vec![Some(IpAddr::from([100, 64, 0, 1]))]
    );
}

#[tokio::test]
async fn full_change_issues_public_private_vpn_in_order() {
    let collector = ScriptedCollector::fixed(snapshot("10.0.0.2", "10.0.0.3", "100.64.0.1"));
    let provider = RecordingProvider::new();
    let (engine, _events) = engine_with(&collector, &provider);

    engine.tick(AddressSnapshot::default()).await;

    assert_eq!(
        provider.calls(),
        vec![
            (PUBLIC.to_string(), None),
            (PRIVATE.to_string(), Some(IpAddr::from([10, 0, 0, 2]))),
            (VPN.to_string(), Some(IpAddr::from([100, 64, 0, 1]))),
        ]
    );
}

#[tokio::test]
async fn second_identical_tick_is_skipped() {
    let collector = ScriptedCollector::fixed(snapshot("192.168.1.5", "", "100.64.0.1"));
    let provider = RecordingProvider::new();
    let (engine, _events) = engine_with(&collector, &provider);

    let previous = engine.tick(AddressSnapshot::default()).await;
    provider.clear();

    let previous = engine.tick(previous).await;

    assert_eq!(previous, snapshot("192.168.1.5", "", "100.64.0.1"));
    assert_eq!(provider.calls(), vec![(PUBLIC.to_string(), None)]);
}

#[tokio::test]
async fn change_in_any_single_field_triggers_updates() {
    let base = snapshot("10.0.0.2", "10.0.0.3", "100.64.0.1");
    let variants = [
        snapshot("10.0.0.9", "10.0.0.3", "100.64.0.1"),
        snapshot("10.0.0.2", "10.0.0.9", "100.64.0.1"),
        snapshot("10.0.0.2", "10.0.0.3", "100.64.0.9"),
        snapshot("", "10.0.0.3", "100.64.0.1"),
    ];

    for current in variants {
        let collector = ScriptedCollector::fixed(current);
        let provider = RecordingProvider::new();
        let (engine, _events) = engine_with(&collector, &provider);

        let next = engine.tick(base).await;

        assert_eq!(next, current);
        assert!(
            provider.calls().len() > 1,
            "expected private/VPN updates for {} -> {}",
            base,
            current
        );
    }
}

#[tokio::test]
async fn collection_failure_keeps_previous_and_skips_updates() {
    let collector = ScriptedCollector::new();
    collector.push_failure("bus unavailable");
    let provider = RecordingProvider::new();
    let (engine, mut events) = engine_with(&collector, &provider);

    let previous = snapshot("10.0.0.2", "", "");
    let next = engine.tick(previous).await;

    assert_eq!(next, previous, "previous snapshot survives a failed collection");
    assert_eq!(provider.calls(), vec![(PUBLIC.to_string(), None)]);

    let mut saw_failure = false;
    while let Ok(event) = events.try_recv() {
        if let EngineEvent::CollectionFailed { error } = event {
            assert!(error.contains("bus unavailable"));
            saw_failure = true;
        }
    }
    assert!(saw_failure, "CollectionFailed event emitted");
}

#[tokio::test]
async fn failed_update_does_not_stop_later_updates_or_revert_snapshot() {
    let current = snapshot("10.0.0.2", "", "100.64.0.1");
    let collector = ScriptedCollector::fixed(current);
    let provider = RecordingProvider::new();
    provider.fail_for(PRIVATE);
    let (engine, mut events) = engine_with(&collector, &provider);

    let next = engine.tick(AddressSnapshot::default()).await;

    assert_eq!(next, current, "snapshot is stored before updates are issued");
    assert_eq!(provider.calls_for(VPN), vec![Some(IpAddr::from([100, 64, 0, 1]))]);

    let failed: Vec<_> = std::iter::from_fn(|| events.try_recv().ok())
        .filter_map(|event| match event {
            EngineEvent::UpdateFailed { hostname, .. } => Some(hostname),
            _ => None,
        })
        .collect();
    assert_eq!(failed, vec![PRIVATE.to_string()]);
}
